use std::sync::Arc;

use axum::{Router, routing::get};
use tracing::info;

use crate::{
    Res, api,
    config::AppConfig,
    management::{AccountManager, SearchAggregator, TokenManager},
    spotify::{SpotifyApi, SpotifyClient},
    store::{AccountStore, SqliteAccountStore},
};

/// Everything a request handler may need, built once at start-up.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tokens: TokenManager,
    pub accounts: AccountManager,
    pub search: SearchAggregator,
}

impl AppState {
    /// Opens the account store and builds the Spotify client from `config`.
    pub fn initialize(config: AppConfig) -> Res<Self> {
        let store = SqliteAccountStore::open(&config.database_path)?;
        info!("Using account database {}", config.database_path.display());
        let spotify = SpotifyClient::new(config.spotify.clone());
        Ok(Self::with_parts(config, Arc::new(store), Arc::new(spotify)))
    }

    pub fn with_parts(
        config: AppConfig,
        store: Arc<dyn AccountStore>,
        spotify: Arc<dyn SpotifyApi>,
    ) -> Self {
        AppState {
            tokens: TokenManager::new(spotify.clone(), store.clone(), config.token_retry),
            accounts: AccountManager::new(store).with_session_max_age(config.session_max_age),
            search: SearchAggregator::new(spotify, config.album_mode),
            config: Arc::new(config),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let search = get(api::search).fallback(api::search_not_get);
    let search_root = get(api::search_without_query).fallback(api::search_not_get);

    Router::new()
        .route("/", get(api::home))
        .route("/health", get(api::health))
        .route("/login", get(api::login_page).post(api::login))
        .route("/signup", get(api::signup_page).post(api::signup))
        .route("/logout", get(api::logout))
        .route("/search", search_root.clone())
        .route("/search/", search_root)
        .route("/search/{query}", search.clone())
        .route("/search/{query}/", search)
        .with_state(state)
}

pub async fn start_api_server(state: AppState) -> Res<()> {
    let addr = state.config.server_address;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
