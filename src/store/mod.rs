//! Persistent storage for accounts and login sessions.
//!
//! Every account embeds the cached client-credentials token used for the
//! artist search. The token and its expiration are always written together,
//! so an account either holds both or neither.

mod schema;
mod sqlite;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::types::ClientToken;

pub use sqlite::SqliteAccountStore;

pub type AccountId = i64;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Schema error: {0}")]
    Schema(String),
    #[error("Account {0} not found")]
    AccountNotFound(AccountId),
    #[error("Account store lock was poisoned")]
    Poisoned,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: AccountId,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub spotify_access_token: Option<String>,
    pub expiration: Option<DateTime<Utc>>,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub is_admin: bool,
}

impl Account {
    /// The cached token, if the account holds one.
    pub fn cached_token(&self) -> Option<ClientToken> {
        match (&self.spotify_access_token, self.expiration) {
            (Some(access_token), Some(expiration)) => Some(ClientToken {
                access_token: access_token.clone(),
                expiration,
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub is_admin: bool,
}

pub trait AccountStore: Send + Sync {
    /// Inserts a new account and returns it.
    /// Fails if the email or the username is already taken.
    fn create_account(&self, account: NewAccount) -> Result<Account, StoreError>;

    /// Returns None if the account does not exist.
    fn get_account(&self, id: AccountId) -> Result<Option<Account>, StoreError>;

    /// Looks an account up by its (lowercase) email.
    fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError>;

    /// Returns all accounts ordered by id.
    fn list_accounts(&self) -> Result<Vec<Account>, StoreError>;

    /// Stores the access token and its expiration on the account.
    fn set_spotify_token(&self, id: AccountId, token: &ClientToken) -> Result<(), StoreError>;

    fn record_login(&self, id: AccountId, at: DateTime<Utc>) -> Result<(), StoreError>;

    /// Adds a session given the digest of its token.
    fn add_session(
        &self,
        token_hash: &str,
        id: AccountId,
        created: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Returns the owner of the session, None if the session does not exist
    /// or was created before `not_before`.
    fn get_session_account(
        &self,
        token_hash: &str,
        not_before: DateTime<Utc>,
    ) -> Result<Option<AccountId>, StoreError>;

    /// Deletes the sessions created before `created_before`, returning how many went.
    fn prune_sessions(&self, created_before: DateTime<Utc>) -> Result<usize, StoreError>;

    /// Returns whether a session was removed.
    fn delete_session(&self, token_hash: &str) -> Result<bool, StoreError>;
}
