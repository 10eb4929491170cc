use axum::{extract::State, response::Html};
use tracing::warn;

use super::{Session, pages};
use crate::server::AppState;

/// Makes sure the account holds a usable Spotify token before rendering the
/// search page. A failed refresh is reported on the page, not as an error
/// status.
pub async fn home(session: Session, State(state): State<AppState>) -> Html<String> {
    match state.tokens.ensure_token(&session.account).await {
        Ok(_) => Html(pages::home(&session.account, None)),
        Err(err) => {
            warn!(
                account_id = session.account.id,
                "Spotify token refresh failed: {}", err
            );
            Html(pages::home(&session.account, Some(&err.to_string())))
        }
    }
}
