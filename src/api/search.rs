use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{debug, error};

use super::Session;
use crate::{server::AppState, types::SearchRejection};

/// Aggregated artist search with the account's cached token.
///
/// The token is used as stored; an expired one is only refreshed by visiting
/// the home page.
pub async fn search(
    session: Option<Session>,
    State(state): State<AppState>,
    Path(query): Path<String>,
) -> Response {
    let Some(token) = session.and_then(cached_access_token) else {
        return Json(SearchRejection::no_token()).into_response();
    };

    let query = query.trim();
    if query.is_empty() {
        return Json(SearchRejection::no_query()).into_response();
    }

    debug!(query, "Searching artists");
    match state.search.search(query, &token).await {
        Ok(payload) => Json(payload).into_response(),
        Err(err) => {
            error!("Search for {:?} failed: {}", query, err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn cached_access_token(session: Session) -> Option<String> {
    session
        .account
        .spotify_access_token
        .filter(|token| !token.is_empty())
}

/// `/search` without a query segment.
pub async fn search_without_query(session: Option<Session>) -> Json<SearchRejection> {
    if session.and_then(cached_access_token).is_some() {
        Json(SearchRejection::no_query())
    } else {
        Json(SearchRejection::no_token())
    }
}

pub async fn search_not_get() -> Json<SearchRejection> {
    Json(SearchRejection::no_get())
}
