use crate::{config::AppConfig, error, server, success, warning};

pub async fn serve(open: bool) {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => error!("Invalid configuration. Err: {}", e),
    };

    let url = format!("http://{}/", config.server_address);
    let state = match server::AppState::initialize(config) {
        Ok(state) => state,
        Err(e) => error!("Cannot initialize server. Err: {}", e),
    };

    success!("Serving spotisearch on {}", url);
    if open {
        if let Err(e) = webbrowser::open(&url) {
            warning!("Cannot open browser. Err: {}", e);
        }
    }

    if let Err(e) = server::start_api_server(state).await {
        error!("Server stopped. Err: {}", e);
    }
}
