use std::{
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::info;

use super::schema::{BASE_DB_VERSION, VERSIONED_SCHEMAS};
use super::{Account, AccountId, AccountStore, NewAccount, StoreError};
use crate::types::ClientToken;

const ACCOUNT_COLUMNS: &str = "id, email, username, password_hash, spotify_access_token, expiration, date_joined, last_login, is_admin";

#[derive(Clone)]
pub struct SqliteAccountStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteAccountStore {
    /// Opens the database at `db_path`, creating it with the latest schema if
    /// it does not exist and migrating it if it was created by an older version.
    pub fn open<T: AsRef<Path>>(db_path: T) -> Result<Self, StoreError> {
        let db_path = db_path.as_ref();
        let conn = if db_path.exists() {
            Connection::open(db_path)?
        } else {
            if let Some(parent) = db_path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StoreError::Schema(format!("cannot create {:?}: {}", parent, e)))?;
            }
            info!("Creating account database at {:?}", db_path);
            let conn = Connection::open(db_path)?;
            Self::create_schema(&conn)?;
            conn
        };
        Self::prepare(conn)
    }

    /// A fresh store living in memory, used by tests and one-off commands.
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::create_schema(&conn)?;
        Self::prepare(conn)
    }

    fn prepare(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        let stored_version: usize =
            conn.query_row("PRAGMA user_version;", [], |row| row.get::<usize, i64>(0))? as usize;
        let version = stored_version.checked_sub(BASE_DB_VERSION).ok_or_else(|| {
            StoreError::Schema(format!("unknown database version {}", stored_version))
        })?;

        match VERSIONED_SCHEMAS.get(version) {
            Some(schema) => (schema.validate)(&conn)?,
            None => {
                return Err(StoreError::Schema(format!(
                    "database version {} is too new",
                    version
                )));
            }
        }

        Self::migrate_if_needed(&conn, version)?;

        Ok(SqliteAccountStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn create_schema(conn: &Connection) -> Result<(), StoreError> {
        let latest = VERSIONED_SCHEMAS
            .last()
            .ok_or_else(|| StoreError::Schema("no schema defined".to_string()))?;
        (latest.create)(conn, latest)
    }

    fn migrate_if_needed(conn: &Connection, version: usize) -> Result<(), StoreError> {
        let mut latest_from = version;
        for schema in VERSIONED_SCHEMAS.iter().skip(version + 1) {
            if let Some(migration_fn) = schema.migration {
                info!(
                    "Migrating db from version {} to {}",
                    latest_from, schema.version
                );
                migration_fn(conn)?;
                latest_from = schema.version;
            }
        }
        conn.pragma_update(None, "user_version", (BASE_DB_VERSION + latest_from) as i64)?;
        if let Some(schema) = VERSIONED_SCHEMAS.get(latest_from) {
            (schema.validate)(conn)?;
        }
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    fn query_account<P: rusqlite::Params>(
        &self,
        condition: &str,
        params: P,
    ) -> Result<Option<Account>, StoreError> {
        let conn = self.lock()?;
        let account = conn
            .query_row(
                &format!("SELECT {} FROM account WHERE {}", ACCOUNT_COLUMNS, condition),
                params,
                account_from_row,
            )
            .optional()?;
        Ok(account)
    }
}

fn timestamp_from_millis(column: usize, millis: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(column, millis))
}

fn optional_timestamp(row: &Row, column: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    row.get::<usize, Option<i64>>(column)?
        .map(|millis| timestamp_from_millis(column, millis))
        .transpose()
}

fn account_from_row(row: &Row) -> rusqlite::Result<Account> {
    Ok(Account {
        id: row.get(0)?,
        email: row.get(1)?,
        username: row.get(2)?,
        password_hash: row.get(3)?,
        spotify_access_token: row.get(4)?,
        expiration: optional_timestamp(row, 5)?,
        date_joined: timestamp_from_millis(6, row.get(6)?)?,
        last_login: optional_timestamp(row, 7)?,
        is_admin: row.get(8)?,
    })
}

impl AccountStore for SqliteAccountStore {
    fn create_account(&self, account: NewAccount) -> Result<Account, StoreError> {
        let date_joined = Utc::now();
        let id = {
            let conn = self.lock()?;
            conn.execute(
                "INSERT INTO account (email, username, password_hash, date_joined, is_admin) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    account.email,
                    account.username,
                    account.password_hash,
                    date_joined.timestamp_millis(),
                    account.is_admin
                ],
            )?;
            conn.last_insert_rowid()
        };

        self.get_account(id)?.ok_or(StoreError::AccountNotFound(id))
    }

    fn get_account(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        self.query_account("id = ?1", params![id])
    }

    fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        self.query_account("email = ?1", params![email])
    }

    fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
        self.query_account("username = ?1", params![username])
    }

    fn list_accounts(&self) -> Result<Vec<Account>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM account ORDER BY id",
            ACCOUNT_COLUMNS
        ))?;
        let accounts = stmt
            .query_map([], account_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(accounts)
    }

    fn set_spotify_token(&self, id: AccountId, token: &ClientToken) -> Result<(), StoreError> {
        let conn = self.lock()?;
        let updated = conn.execute(
            "UPDATE account SET spotify_access_token = ?1, expiration = ?2 WHERE id = ?3",
            params![token.access_token, token.expiration.timestamp_millis(), id],
        )?;
        if updated == 0 {
            return Err(StoreError::AccountNotFound(id));
        }
        Ok(())
    }

    fn record_login(&self, id: AccountId, at: DateTime<Utc>) -> Result<(), StoreError> {
        let conn = self.lock()?;
        let updated = conn.execute(
            "UPDATE account SET last_login = ?1 WHERE id = ?2",
            params![at.timestamp_millis(), id],
        )?;
        if updated == 0 {
            return Err(StoreError::AccountNotFound(id));
        }
        Ok(())
    }

    // Session timestamps are in seconds, like the column default.
    fn add_session(
        &self,
        token_hash: &str,
        id: AccountId,
        created: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO session (token_hash, account_id, created) VALUES (?1, ?2, ?3)",
            params![token_hash, id, created.timestamp()],
        )?;
        Ok(())
    }

    fn get_session_account(
        &self,
        token_hash: &str,
        not_before: DateTime<Utc>,
    ) -> Result<Option<AccountId>, StoreError> {
        let conn = self.lock()?;
        let account_id = conn
            .query_row(
                "SELECT account_id FROM session WHERE token_hash = ?1 AND created >= ?2",
                params![token_hash, not_before.timestamp()],
                |row| row.get::<usize, AccountId>(0),
            )
            .optional()?;
        Ok(account_id)
    }

    fn prune_sessions(&self, created_before: DateTime<Utc>) -> Result<usize, StoreError> {
        let conn = self.lock()?;
        let removed = conn.execute(
            "DELETE FROM session WHERE created < ?1",
            params![created_before.timestamp()],
        )?;
        Ok(removed)
    }

    fn delete_session(&self, token_hash: &str) -> Result<bool, StoreError> {
        let conn = self.lock()?;
        let removed = conn.execute(
            "DELETE FROM session WHERE token_hash = ?1",
            params![token_hash],
        )?;
        Ok(removed > 0)
    }
}
