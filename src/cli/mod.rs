//! # CLI Module
//!
//! Command-line entry points of spotisearch. Each command loads the
//! configuration from the environment, builds the pieces it needs and reports
//! progress with the crate's `info!`/`success!`/`warning!`/`error!` macros.
//!
//! ## Commands
//!
//! - [`serve`] - Runs the web application, optionally opening it in the browser
//! - [`search`] - One-off artist search printed as tables, authenticated with
//!   the application's own client-credentials token
//! - [`accounts`] - Lists registered accounts, optionally filtered by email or
//!   username
//!
//! ## Usage Patterns
//!
//! ```bash
//! spotisearch serve --open
//! spotisearch search "Drake"
//! spotisearch accounts --search example.com
//! ```
//!
//! Configuration errors terminate the process with a message naming the
//! missing or invalid variable.

mod accounts;
mod search;
mod serve;

pub use accounts::accounts;
pub use search::search;
pub use serve::serve;
