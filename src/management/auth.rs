use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    config::RetryPolicy,
    spotify::{AuthenticationError, SpotifyApi},
    store::{Account, AccountStore},
    types::ClientToken,
};

/// Keeps the client-credentials token cached on every account fresh.
///
/// Refreshes are not serialized: two requests for the same account may both
/// exchange credentials and both write, the last write wins.
#[derive(Clone)]
pub struct TokenManager {
    spotify: Arc<dyn SpotifyApi>,
    store: Arc<dyn AccountStore>,
    retry: RetryPolicy,
}

impl TokenManager {
    pub fn new(
        spotify: Arc<dyn SpotifyApi>,
        store: Arc<dyn AccountStore>,
        retry: RetryPolicy,
    ) -> Self {
        TokenManager {
            spotify,
            store,
            retry,
        }
    }

    /// Returns a usable token for the account.
    ///
    /// The cached token is returned as is while it has not expired. Otherwise
    /// a new token is exchanged and persisted on the account, token and
    /// expiration together.
    pub async fn ensure_token(&self, account: &Account) -> Result<ClientToken, AuthenticationError> {
        if let Some(token) = account.cached_token() {
            if !Self::is_expired(&token, Utc::now()) {
                return Ok(token);
            }
        }

        let token = self.fetch_valid_token().await?;
        self.store.set_spotify_token(account.id, &token)?;
        info!(
            account_id = account.id,
            expiration = %token.expiration,
            "Refreshed Spotify access token"
        );
        Ok(token)
    }

    fn is_expired(token: &ClientToken, now: DateTime<Utc>) -> bool {
        !token.is_valid_at(now)
    }

    /// Exchanges credentials until the endpoint hands out a token that is
    /// neither empty nor already expired, waiting longer after every attempt.
    async fn fetch_valid_token(&self) -> Result<ClientToken, AuthenticationError> {
        let max_attempts = self.retry.max_attempts.max(1);
        for attempt in 1..=max_attempts {
            let token = self.spotify.request_client_token().await?;
            if !Self::is_expired(&token, Utc::now()) {
                return Ok(token);
            }

            warn!(
                attempt,
                max_attempts, "Token endpoint returned an empty or expired token"
            );
            if attempt < max_attempts {
                sleep(self.retry.backoff_for(attempt)).await;
            }
        }

        Err(AuthenticationError::Exhausted(max_attempts))
    }
}
