use rusqlite::Connection;

use super::StoreError;

pub const BASE_DB_VERSION: usize = 1000;

pub struct Table {
    pub name: &'static str,
    pub schema: &'static str,
    pub indices: &'static [&'static str],
}

pub struct VersionedSchema {
    pub version: usize,
    pub tables: &'static [Table],
    pub create: fn(&Connection, &VersionedSchema) -> Result<(), StoreError>,
    pub migration: Option<fn(&Connection) -> Result<(), StoreError>>,
    pub validate: fn(&Connection) -> Result<(), StoreError>,
}

/// V 0
pub const ACCOUNT_TABLE_V_0: Table = Table {
    name: "account",
    schema: "CREATE TABLE account (id INTEGER NOT NULL UNIQUE, email TEXT NOT NULL UNIQUE, username TEXT NOT NULL UNIQUE, password_hash TEXT NOT NULL, spotify_access_token TEXT, expiration INTEGER, date_joined INTEGER NOT NULL, is_admin INTEGER NOT NULL DEFAULT 0, PRIMARY KEY (id), CHECK ((spotify_access_token IS NULL) = (expiration IS NULL)));",
    indices: &["CREATE INDEX account_email_index ON account (email);"],
};
pub const SESSION_TABLE_V_0: Table = Table {
    name: "session",
    schema: "CREATE TABLE session (token_hash TEXT NOT NULL UNIQUE, account_id INTEGER NOT NULL, created INTEGER DEFAULT (cast(strftime('%s','now') as int)), PRIMARY KEY (token_hash), CONSTRAINT account_id FOREIGN KEY (account_id) REFERENCES account (id) ON DELETE CASCADE);",
    indices: &[],
};

/// V 1
pub const ACCOUNT_TABLE_V_1: Table = Table {
    name: "account",
    schema: "CREATE TABLE account (id INTEGER NOT NULL UNIQUE, email TEXT NOT NULL UNIQUE, username TEXT NOT NULL UNIQUE, password_hash TEXT NOT NULL, spotify_access_token TEXT, expiration INTEGER, date_joined INTEGER NOT NULL, is_admin INTEGER NOT NULL DEFAULT 0, last_login INTEGER, PRIMARY KEY (id), CHECK ((spotify_access_token IS NULL) = (expiration IS NULL)));",
    indices: &["CREATE INDEX account_email_index ON account (email);"],
};

fn create_tables(conn: &Connection, schema: &VersionedSchema) -> Result<(), StoreError> {
    for table in schema.tables {
        conn.execute(table.schema, [])?;
        for index in table.indices {
            conn.execute(index, [])?;
        }
    }
    conn.pragma_update(None, "user_version", (BASE_DB_VERSION + schema.version) as i64)?;
    Ok(())
}

fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>, StoreError> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({});", table))?;
    let columns = stmt
        .query_map([], |row| row.get::<usize, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(columns)
}

fn validate_columns(conn: &Connection, table: &str, expected: &[&str]) -> Result<(), StoreError> {
    let columns = table_columns(conn, table)?;
    for name in expected {
        if !columns.iter().any(|column| column == name) {
            return Err(StoreError::Schema(format!(
                "table {} is missing column {}, found {:?}",
                table, name, columns
            )));
        }
    }
    Ok(())
}

fn validate_schema_0(conn: &Connection) -> Result<(), StoreError> {
    validate_columns(
        conn,
        ACCOUNT_TABLE_V_0.name,
        &[
            "id",
            "email",
            "username",
            "password_hash",
            "spotify_access_token",
            "expiration",
            "date_joined",
            "is_admin",
        ],
    )?;
    validate_columns(conn, SESSION_TABLE_V_0.name, &["token_hash", "account_id"])
}

fn validate_schema_1(conn: &Connection) -> Result<(), StoreError> {
    validate_schema_0(conn)?;
    validate_columns(conn, ACCOUNT_TABLE_V_1.name, &["last_login"])
}

fn migrate_to_1(conn: &Connection) -> Result<(), StoreError> {
    conn.execute("ALTER TABLE account ADD COLUMN last_login INTEGER", [])?;
    Ok(())
}

pub const VERSIONED_SCHEMAS: &[VersionedSchema] = &[
    VersionedSchema {
        version: 0,
        tables: &[ACCOUNT_TABLE_V_0, SESSION_TABLE_V_0],
        create: create_tables,
        migration: None,
        validate: validate_schema_0,
    },
    VersionedSchema {
        version: 1,
        tables: &[ACCOUNT_TABLE_V_1, SESSION_TABLE_V_0],
        create: create_tables,
        migration: Some(migrate_to_1),
        validate: validate_schema_1,
    },
];
