//! Spotify artist search web application.
//!
//! This library backs a small web application where registered users search
//! Spotify for an artist and browse the artist's top tracks and albums. It
//! keeps a client-credentials access token cached on every account and
//! reshapes the Spotify Web API responses into a compact JSON payload.
//!
//! # Modules
//!
//! - `api` - HTTP handlers, session extraction and page rendering
//! - `cli` - Command-line entry points (`serve`, `search`, `accounts`)
//! - `config` - Configuration management and environment variables
//! - `management` - Token lifecycle, accounts and search aggregation
//! - `server` - Application state, router and HTTP server start-up
//! - `spotify` - Spotify Web API client implementation
//! - `store` - Persistent account and session storage
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use spotisearch::{config, server};
//!
//! #[tokio::main]
//! async fn main() -> spotisearch::Res<()> {
//!     config::load_env().await?;
//!     let config = config::AppConfig::from_env()?;
//!     let state = server::AppState::initialize(config)?;
//!     server::start_api_server(state).await
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod management;
pub mod server;
pub mod spotify;
pub mod store;
pub mod types;
pub mod utils;

/// A convenient Result type alias for operations that may fail.
///
/// Provides a standard error handling pattern for the glue code of the
/// application (CLI commands, server start-up) using a boxed dynamic error
/// trait object. Domain modules return their own typed errors, which convert
/// into this alias through `?`.
///
/// # Type Parameters
///
/// - `T` - The success type returned on successful operations
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// Creates a formatted output line with a distinctive blue "o" indicator
/// followed by the provided message. Used for general information and
/// status updates in the command-line interface.
///
/// # Example
///
/// ```
/// info!("Listening on {}", addr);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Found {} artists", count);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Terminates the program with exit code 1 right after printing. Only used
/// from the command-line layer for errors where recovery is not possible.
///
/// # Example
///
/// ```
/// error!("Missing required environment variable: {}", var_name);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// # Example
///
/// ```
/// warning!("No tracks with a preview for {}", artist);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
