use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use reqwest::header::AUTHORIZATION;

use super::{AuthenticationError, SpotifyClient};
use crate::{
    types::{ClientToken, TokenResponse},
    utils,
};

impl SpotifyClient {
    /// Exchanges the application credentials for an access token.
    ///
    /// Sends the client-credentials grant to the token endpoint using HTTP
    /// Basic authentication built from the configured client id and secret.
    ///
    /// # Returns
    ///
    /// - `Ok(ClientToken)` - token with its absolute expiration
    /// - `Err(AuthenticationError::Rejected)` - non-2xx answer
    /// - `Err(AuthenticationError::Transport)` - network or decoding failure
    /// - `Err(AuthenticationError::UnusableToken)` - lifetime out of range
    ///
    /// # API Documentation
    ///
    /// Uses Spotify's token endpoint with the "client_credentials" grant type
    /// defined by OAuth 2.0 (RFC 6749, section 4.4).
    pub async fn exchange_client_credentials(&self) -> Result<ClientToken, AuthenticationError> {
        let res = self
            .http
            .post(&self.config.token_url)
            .header(
                AUTHORIZATION,
                utils::basic_auth_header(&self.config.client_id, &self.config.client_secret),
            )
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(AuthenticationError::Rejected(res.status()));
        }

        let json = res.json::<TokenResponse>().await?;
        token_from_response(json, Utc::now())
    }

    /// Returns the access token of the client's own app session, refreshing
    /// it when missing or expired.
    pub(crate) async fn app_token(&self) -> Result<String, AuthenticationError> {
        let mut session = self.app_session.lock().await;
        if let Some(token) = session.as_ref() {
            if token.is_valid_at(Utc::now()) {
                return Ok(token.access_token.clone());
            }
        }

        let token = self.exchange_client_credentials().await?;
        if !token.is_valid_at(Utc::now()) {
            return Err(AuthenticationError::UnusableToken);
        }
        let access_token = token.access_token.clone();
        *session = Some(token);
        Ok(access_token)
    }
}

/// Turns the token endpoint answer into a token expiring `expires_in` seconds after `now`.
///
/// Expirations are kept at millisecond precision, the precision of the account store.
/// A lifetime that does not fit a timestamp gives [`AuthenticationError::UnusableToken`].
pub fn token_from_response(
    response: TokenResponse,
    now: DateTime<Utc>,
) -> Result<ClientToken, AuthenticationError> {
    let lifetime =
        TimeDelta::try_seconds(response.expires_in).ok_or(AuthenticationError::UnusableToken)?;
    let expiration = now
        .trunc_subsecs(3)
        .checked_add_signed(lifetime)
        .ok_or(AuthenticationError::UnusableToken)?;

    Ok(ClientToken {
        access_token: response.access_token.unwrap_or_default(),
        expiration,
    })
}
