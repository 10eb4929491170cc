//! # API Module
//!
//! HTTP handlers of the web application, built on [Axum](https://docs.rs/axum).
//!
//! ## Endpoints
//!
//! - [`home`] - `GET /`, the search page; refreshes the account's cached
//!   Spotify token
//! - [`login_page`] / [`login`] - `GET|POST /login`
//! - [`signup_page`] / [`signup`] - `GET|POST /signup`
//! - [`logout`] - `GET /logout`
//! - [`search`] - `GET /search/{query}`, the aggregated search payload as JSON
//! - [`health`] - `GET /health`, status and version for monitoring
//!
//! ## Sessions
//!
//! Browsers authenticate with the `session_token` cookie set on login or
//! signup. Handlers take a [`Session`] when they require a logged-in account
//! (anonymous requests are redirected to `/login`) or an `Option<Session>`
//! when they only behave differently for anonymous visitors.
//!
//! ## Search rejections
//!
//! The search endpoint never redirects. Missing authorization, a missing
//! query and non-GET methods are answered with HTTP 200 and a single-key JSON
//! object, see [`crate::types::SearchRejection`].

mod account;
mod health;
mod home;
mod pages;
mod search;
mod session;

pub use account::{login, login_page, logout, signup, signup_page};
pub use health::health;
pub use home::home;
pub use search::{search, search_not_get, search_without_query};
pub use session::{SESSION_COOKIE, Session, SessionRejection};
