//! # Spotify Integration Module
//!
//! This module provides the interface to the Spotify Web API used by the
//! application: the client-credentials token exchange, the artist search and
//! the per-artist top tracks and albums lookups.
//!
//! ## Architecture
//!
//! ```text
//! Request handlers / CLI
//!          ↓
//! Management Layer (TokenManager, SearchAggregator)
//!          ↓
//! SpotifyApi trait  ←  SpotifyClient (reqwest)
//!          ↓
//! Spotify Web API
//! ```
//!
//! [`SpotifyApi`] is the seam the rest of the crate depends on. The
//! production implementation is [`SpotifyClient`], constructed once at
//! start-up and shared through the application state.
//!
//! ## Authentication
//!
//! Two kinds of tokens are involved:
//! - **Account tokens**: obtained with [`SpotifyApi::request_client_token`],
//!   cached on every account by [`crate::management::TokenManager`] and used as
//!   bearer token for the artist search.
//! - **App session**: a client-credentials token held by the client itself and
//!   refreshed on demand, used for the top tracks and albums lookups.
//!
//! ## Error Handling
//!
//! - [`AuthenticationError`] - the token endpoint refused the credentials,
//!   could not be reached or answered with an unusable token
//! - [`SpotifyError`] - any failure of the data endpoints (transport,
//!   non-2xx status, undecodable body)
//!
//! No request is retried here; the bounded retry of the token exchange lives
//! in the token manager.
//!
//! ## API Coverage
//!
//! - `POST /api/token` - client-credentials grant
//! - `GET /search?type=artist` - artist search
//! - `GET /artists/{id}/top-tracks` - artist top tracks
//! - `GET /artists/{id}/albums` - artist albums

pub mod artists;
pub mod auth;
pub mod releases;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::{
    config::SpotifyConfig,
    store::StoreError,
    types::{Album, Artist, ClientToken, Track},
};

#[derive(Debug, Error)]
pub enum AuthenticationError {
    #[error("Could not authenticate client, token endpoint answered {0}")]
    Rejected(StatusCode),
    #[error("Could not reach token endpoint: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Token endpoint returned an unusable token")]
    UnusableToken,
    #[error("No usable token after {0} attempts")]
    Exhausted(u32),
    #[error("Cannot store token: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum SpotifyError {
    #[error("Request to Spotify failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Spotify answered {status} for {endpoint}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
    },
    #[error("Invalid artist uri \"{0}\"")]
    InvalidArtistUri(String),
    #[error(transparent)]
    Authentication(#[from] AuthenticationError),
}

/// Operations of the Spotify Web API the application relies on.
#[async_trait]
pub trait SpotifyApi: Send + Sync {
    /// Performs one client-credentials exchange.
    ///
    /// The returned token is not validated: callers decide what to do with
    /// an empty or already expired token.
    async fn request_client_token(&self) -> Result<ClientToken, AuthenticationError>;

    /// Searches artists matching `query`, authenticated with `token`.
    async fn search_artists(&self, token: &str, query: &str) -> Result<Vec<Artist>, SpotifyError>;

    /// Top tracks of the artist, authenticated with the client's app session.
    async fn artist_top_tracks(&self, artist_uri: &str) -> Result<Vec<Track>, SpotifyError>;

    /// Albums of the artist, authenticated with the client's app session.
    async fn artist_albums(&self, artist_uri: &str) -> Result<Vec<Album>, SpotifyError>;
}

/// HTTP implementation of [`SpotifyApi`].
pub struct SpotifyClient {
    http: Client,
    config: SpotifyConfig,
    app_session: Mutex<Option<ClientToken>>,
}

impl SpotifyClient {
    pub fn new(config: SpotifyConfig) -> Self {
        SpotifyClient {
            http: Client::new(),
            config,
            app_session: Mutex::new(None),
        }
    }
}

#[async_trait]
impl SpotifyApi for SpotifyClient {
    async fn request_client_token(&self) -> Result<ClientToken, AuthenticationError> {
        self.exchange_client_credentials().await
    }

    async fn search_artists(&self, token: &str, query: &str) -> Result<Vec<Artist>, SpotifyError> {
        self.get_artists_by_query(token, query).await
    }

    async fn artist_top_tracks(&self, artist_uri: &str) -> Result<Vec<Track>, SpotifyError> {
        self.get_top_tracks_for_artist(artist_uri).await
    }

    async fn artist_albums(&self, artist_uri: &str) -> Result<Vec<Album>, SpotifyError> {
        self.get_albums_for_artist(artist_uri).await
    }
}

fn ensure_success(response: Response, endpoint: &'static str) -> Result<Response, SpotifyError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(SpotifyError::Status { endpoint, status })
    }
}
