mod accounts;
mod auth;
mod search;

pub use accounts::{AccountError, AccountManager, Signup};
pub use auth::TokenManager;
pub use search::{MAX_ALBUMS, MAX_ARTISTS, MAX_TRACKS, SearchAggregator};
