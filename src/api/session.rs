use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::{debug, error};

use crate::{server::AppState, store::Account};

pub const SESSION_COOKIE: &str = "session_token";

/// Logged-in account of the current request.
#[derive(Debug, Clone)]
pub struct Session {
    pub account: Account,
    pub token: String,
}

impl Session {
    /// Cookie handing `token` to the browser.
    pub fn cookie(token: String) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build()
    }

    /// Cookie to pass to `CookieJar::remove`, matching the path it was set on.
    pub fn removal_cookie() -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE).path("/").build()
    }
}

pub enum SessionRejection {
    LoginRequired,
    InternalError,
}

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        match self {
            SessionRejection::LoginRequired => Redirect::to("/login").into_response(),
            SessionRejection::InternalError => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

fn extract_session(parts: &Parts, state: &AppState) -> Result<Option<Session>, SessionRejection> {
    let jar = CookieJar::from_headers(&parts.headers);
    let Some(token) = jar.get(SESSION_COOKIE).map(|cookie| cookie.value().to_string()) else {
        debug!("No session cookie");
        return Ok(None);
    };

    match state.accounts.session_account(&token) {
        Ok(Some(account)) => Ok(Some(Session { account, token })),
        Ok(None) => {
            debug!("Unknown session token");
            Ok(None)
        }
        Err(err) => {
            error!("Failed to resolve session: {}", err);
            Err(SessionRejection::InternalError)
        }
    }
}

impl FromRequestParts<AppState> for Session {
    type Rejection = SessionRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        extract_session(parts, state)?.ok_or(SessionRejection::LoginRequired)
    }
}

impl OptionalFromRequestParts<AppState> for Session {
    type Rejection = SessionRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        extract_session(parts, state)
    }
}
