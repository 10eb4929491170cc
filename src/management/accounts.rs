use std::{sync::Arc, time::Duration};

use chrono::{DateTime, TimeDelta, Utc};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    config::DEFAULT_SESSION_MAX_AGE_SECS,
    store::{Account, AccountStore, NewAccount, StoreError},
    utils,
};

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Email {0} already exists.")]
    EmailTaken(String),
    #[error("Username {0} already exists.")]
    UsernameTaken(String),
    #[error("Passwords don't match")]
    PasswordMismatch,
    #[error("Enter a valid email address.")]
    InvalidEmail,
    #[error("The {0} field is required.")]
    MissingField(&'static str),
    #[error("Invalid Input!")]
    InvalidCredentials,
    #[error("Password hashing failed: {0}")]
    Hashing(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Fields of the signup form.
#[derive(Debug, Clone, Default)]
pub struct Signup {
    pub email: String,
    pub username: String,
    pub password1: String,
    pub password2: String,
}

/// Signup, login and session handling on top of the account store.
#[derive(Clone)]
pub struct AccountManager {
    store: Arc<dyn AccountStore>,
    session_max_age: TimeDelta,
}

impl AccountManager {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        AccountManager {
            store,
            session_max_age: TimeDelta::seconds(DEFAULT_SESSION_MAX_AGE_SECS as i64),
        }
    }

    pub fn with_session_max_age(mut self, max_age: Duration) -> Self {
        self.session_max_age = TimeDelta::from_std(max_age).unwrap_or(TimeDelta::MAX);
        self
    }

    /// Creation time before which a session is stale.
    fn session_cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_signed(self.session_max_age)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Validates the form and creates a regular (non admin) account.
    ///
    /// The email is stored lowercase. Checks run in form order: email,
    /// username, then passwords.
    pub fn register(&self, signup: Signup) -> Result<Account, AccountError> {
        let email = signup.email.trim().to_lowercase();
        let username = signup.username.trim().to_string();

        if email.is_empty() {
            return Err(AccountError::MissingField("email"));
        }
        if !is_plausible_email(&email) {
            return Err(AccountError::InvalidEmail);
        }
        if self.store.find_by_email(&email)?.is_some() {
            return Err(AccountError::EmailTaken(email));
        }

        if username.is_empty() {
            return Err(AccountError::MissingField("username"));
        }
        if self.store.find_by_username(&username)?.is_some() {
            return Err(AccountError::UsernameTaken(username));
        }

        if signup.password1.is_empty() {
            return Err(AccountError::MissingField("password"));
        }
        if signup.password1 != signup.password2 {
            return Err(AccountError::PasswordMismatch);
        }

        let password_hash = hashing::hash(signup.password1.as_bytes())?;
        let account = self.store.create_account(NewAccount {
            email,
            username,
            password_hash,
            is_admin: false,
        })?;
        info!(account_id = account.id, "Created account {}", account.username);
        Ok(account)
    }

    /// Checks email and password. Unknown emails and wrong passwords are
    /// indistinguishable to the caller.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<Account, AccountError> {
        let email = email.trim().to_lowercase();
        let account = self
            .store
            .find_by_email(&email)?
            .ok_or(AccountError::InvalidCredentials)?;

        if !hashing::verify(password.as_bytes(), &account.password_hash)? {
            return Err(AccountError::InvalidCredentials);
        }
        Ok(account)
    }

    /// Authenticates and opens a session, returning the session token to
    /// hand to the browser. Stale sessions of every account are dropped first.
    pub fn login(&self, email: &str, password: &str) -> Result<(Account, String), AccountError> {
        let account = self.authenticate(email, password)?;

        let now = Utc::now();
        let pruned = self.store.prune_sessions(self.session_cutoff(now))?;
        if pruned > 0 {
            debug!(pruned, "Dropped stale sessions");
        }

        let token = utils::generate_session_token();
        self.store
            .add_session(&utils::hash_session_token(&token), account.id, now)?;
        self.store.record_login(account.id, now)?;
        info!(account_id = account.id, "Account logged in");

        // Reload so last_login is current.
        let account = self
            .store
            .get_account(account.id)?
            .ok_or(StoreError::AccountNotFound(account.id))?;
        Ok((account, token))
    }

    /// Resolves the account owning a session token. Stale sessions resolve to None.
    pub fn session_account(&self, token: &str) -> Result<Option<Account>, AccountError> {
        let hash = utils::hash_session_token(token);
        let cutoff = self.session_cutoff(Utc::now());
        match self.store.get_session_account(&hash, cutoff)? {
            Some(id) => Ok(self.store.get_account(id)?),
            None => Ok(None),
        }
    }

    /// Returns whether the session existed.
    pub fn logout(&self, token: &str) -> Result<bool, AccountError> {
        let removed = self
            .store
            .delete_session(&utils::hash_session_token(token))?;
        Ok(removed)
    }

    pub fn list(&self) -> Result<Vec<Account>, AccountError> {
        Ok(self.store.list_accounts()?)
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.contains('@'),
        None => false,
    }
}

mod hashing {
    use argon2::{
        Argon2,
        password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    };
    use rand::Rng;

    use super::AccountError;

    /// Hashes a password into a PHC string carrying its own salt.
    pub fn hash(plain: &[u8]) -> Result<String, AccountError> {
        let mut salt_bytes = [0u8; 16];
        rand::rng().fill(&mut salt_bytes);
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|err| AccountError::Hashing(err.to_string()))?;

        let hash_string = Argon2::default()
            .hash_password(plain, &salt)
            .map_err(|err| AccountError::Hashing(err.to_string()))?
            .to_string();
        Ok(hash_string)
    }

    pub fn verify(plain: &[u8], target_hash: &str) -> Result<bool, AccountError> {
        let password_hash =
            PasswordHash::new(target_hash).map_err(|err| AccountError::Hashing(err.to_string()))?;
        Ok(Argon2::default()
            .verify_password(plain, &password_hash)
            .is_ok())
    }

}
