//! Configuration management for the artist search application.
//!
//! This module handles loading and accessing configuration values from environment
//! variables and `.env` files. It provides a centralized way to manage application
//! configuration including Spotify API credentials, server settings, the account
//! database location and the token refresh policy.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)

use std::{env, net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use thiserror::Error;

pub const DEFAULT_SPOTIFY_API_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SPOTIFY_MARKET: &str = "US";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8000";
pub const DEFAULT_TOKEN_RETRY_ATTEMPTS: u32 = 5;
pub const DEFAULT_TOKEN_RETRY_BACKOFF_MS: u64 = 500;
/// Two weeks, the usual session cookie age.
pub const DEFAULT_SESSION_MAX_AGE_SECS: u64 = 1_209_600;

const APP_DIR: &str = "spotisearch";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{var} has an invalid value \"{value}\"")]
    Invalid { var: &'static str, value: String },
    #[error("Cannot prepare configuration directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cannot read .env file: {0}")]
    Dotenv(#[from] dotenv::Error),
}

/// Controls how albums are collected across the artists of one search.
///
/// `LastArtist` keeps the historical behavior where the album list is reset
/// for every artist, so only the albums of the last processed artist end up
/// in the payload. `PerArtist` keeps one album list per artist, aligned with
/// the way top tracks are grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlbumMode {
    #[default]
    LastArtist,
    PerArtist,
}

impl FromStr for AlbumMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "last-artist" | "last_artist" | "last" => Ok(AlbumMode::LastArtist),
            "per-artist" | "per_artist" => Ok(AlbumMode::PerArtist),
            other => Err(format!("unknown album mode {}", other)),
        }
    }
}

/// Bounded retry policy for the client-credentials exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
}

impl RetryPolicy {
    /// Delay to wait after the given failed attempt (1-based), doubling each time.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.initial_backoff.saturating_mul(1u32 << exponent)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: DEFAULT_TOKEN_RETRY_ATTEMPTS,
            initial_backoff: Duration::from_millis(DEFAULT_TOKEN_RETRY_BACKOFF_MS),
        }
    }
}

/// Spotify application credentials and endpoints.
#[derive(Debug, Clone)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Registered with the Spotify application, not used by the client-credentials flow.
    pub redirect_uri: Option<String>,
    pub token_url: String,
    pub api_url: String,
    pub market: String,
}

/// Complete runtime configuration, built once at start-up.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub spotify: SpotifyConfig,
    pub server_address: SocketAddr,
    pub database_path: PathBuf,
    pub album_mode: AlbumMode,
    pub token_retry: RetryPolicy,
    /// Login sessions older than this are no longer accepted.
    pub session_max_age: Duration,
}

impl AppConfig {
    /// Reads the configuration from the process environment.
    ///
    /// Call [`load_env`] first to merge the values of the `.env` file. Only the
    /// Spotify client id and secret are mandatory, every other setting falls
    /// back to a default.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when a required variable is absent and
    /// [`ConfigError::Invalid`] when a value cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let spotify = SpotifyConfig {
            client_id: required("SPOTIFY_API_AUTH_CLIENT_ID")?,
            client_secret: required("SPOTIFY_API_AUTH_CLIENT_SECRET")?,
            redirect_uri: optional("SPOTIFY_API_REDIRECT_URI"),
            token_url: optional("SPOTIFY_API_TOKEN_URL")
                .unwrap_or_else(|| DEFAULT_SPOTIFY_API_TOKEN_URL.to_string()),
            api_url: optional("SPOTIFY_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_SPOTIFY_API_URL.to_string()),
            market: optional("SPOTIFY_MARKET").unwrap_or_else(|| DEFAULT_SPOTIFY_MARKET.to_string()),
        };

        let server_address = parsed("SERVER_ADDRESS")?
            .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8000)));
        let database_path = optional("SPOTISEARCH_DATABASE")
            .map(PathBuf::from)
            .unwrap_or_else(default_database_path);
        let album_mode = parsed("SPOTISEARCH_ALBUM_MODE")?.unwrap_or_default();

        let max_attempts: u32 =
            parsed("TOKEN_RETRY_ATTEMPTS")?.unwrap_or(DEFAULT_TOKEN_RETRY_ATTEMPTS);
        if max_attempts == 0 {
            return Err(ConfigError::Invalid {
                var: "TOKEN_RETRY_ATTEMPTS",
                value: "0".to_string(),
            });
        }
        let backoff_ms: u64 =
            parsed("TOKEN_RETRY_BACKOFF_MS")?.unwrap_or(DEFAULT_TOKEN_RETRY_BACKOFF_MS);

        let session_max_age: u64 =
            parsed("SESSION_MAX_AGE_SECS")?.unwrap_or(DEFAULT_SESSION_MAX_AGE_SECS);
        if session_max_age == 0 {
            return Err(ConfigError::Invalid {
                var: "SESSION_MAX_AGE_SECS",
                value: "0".to_string(),
            });
        }

        Ok(AppConfig {
            spotify,
            server_address,
            database_path,
            album_mode,
            token_retry: RetryPolicy {
                max_attempts,
                initial_backoff: Duration::from_millis(backoff_ms),
            },
            session_max_age: Duration::from_secs(session_max_age),
        })
    }
}

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the necessary directory structure if it doesn't exist and loads
/// environment variables from a `.env` file located in the platform-specific
/// local data directory under `spotisearch/.env`. A missing file is not an
/// error, the process environment alone may carry the configuration.
///
/// # Directory Structure
///
/// - Linux: `~/.local/share/spotisearch/.env`
/// - macOS: `~/Library/Application Support/spotisearch/.env`
/// - Windows: `%LOCALAPPDATA%/spotisearch/.env`
///
/// # Errors
///
/// This function will return an error if:
/// - The parent directory cannot be created
/// - The `.env` file exists but cannot be read or parsed
pub async fn load_env() -> Result<(), ConfigError> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }

    if path.is_file() {
        dotenv::from_path(&path)?;
    }
    Ok(())
}

/// Platform-specific directory holding the `.env` file and the account database.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path
}

fn default_database_path() -> PathBuf {
    data_dir().join("accounts.db")
}

fn optional(var: &'static str) -> Option<String> {
    env::var(var).ok().filter(|value| !value.trim().is_empty())
}

fn required(var: &'static str) -> Result<String, ConfigError> {
    optional(var).ok_or(ConfigError::Missing(var))
}

fn parsed<T: FromStr>(var: &'static str) -> Result<Option<T>, ConfigError> {
    match optional(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn album_mode_parses_both_spellings() {
        assert_eq!("last-artist".parse::<AlbumMode>(), Ok(AlbumMode::LastArtist));
        assert_eq!("PER_ARTIST".parse::<AlbumMode>(), Ok(AlbumMode::PerArtist));
        assert!("everything".parse::<AlbumMode>().is_err());
        assert_eq!(AlbumMode::default(), AlbumMode::LastArtist);
    }

    #[test]
    fn retry_backoff_doubles() {
        let policy = RetryPolicy {
            max_attempts: 4,
            initial_backoff: Duration::from_millis(100),
        };
        assert_eq!(policy.backoff_for(1), Duration::from_millis(100));
        assert_eq!(policy.backoff_for(2), Duration::from_millis(200));
        assert_eq!(policy.backoff_for(3), Duration::from_millis(400));
    }

    #[test]
    fn default_server_address_matches_constant() {
        let addr: SocketAddr = DEFAULT_SERVER_ADDRESS.parse().unwrap();
        assert_eq!(addr, SocketAddr::from(([127, 0, 0, 1], 8000)));
    }
}
