use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::{error, info};

use super::{Session, pages};
use crate::{
    management::{AccountError, Signup},
    server::AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

impl From<SignupForm> for Signup {
    fn from(form: SignupForm) -> Self {
        Signup {
            email: form.email,
            username: form.username,
            password1: form.password1,
            password2: form.password2,
        }
    }
}

fn is_user_error(err: &AccountError) -> bool {
    !matches!(err, AccountError::Store(_) | AccountError::Hashing(_))
}

fn internal_error(err: AccountError) -> Response {
    error!("Account operation failed: {}", err);
    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}

pub async fn login_page(session: Option<Session>) -> Response {
    if session.is_some() {
        return Redirect::to("/").into_response();
    }
    Html(pages::login("", &[])).into_response()
}

pub async fn login(
    session: Option<Session>,
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    if session.is_some() {
        return Redirect::to("/").into_response();
    }

    match state.accounts.login(&form.email, &form.password) {
        Ok((_, token)) => (jar.add(Session::cookie(token)), Redirect::to("/")).into_response(),
        Err(err) if is_user_error(&err) => {
            Html(pages::login(&form.email, &[err.to_string()])).into_response()
        }
        Err(err) => internal_error(err),
    }
}

pub async fn signup_page(session: Option<Session>) -> Response {
    if session.is_some() {
        return Redirect::to("/").into_response();
    }
    Html(pages::signup("", "", &[])).into_response()
}

/// Creates the account and logs it in right away.
pub async fn signup(
    session: Option<Session>,
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<SignupForm>,
) -> Response {
    if session.is_some() {
        return Redirect::to("/").into_response();
    }

    let email = form.email.clone();
    let username = form.username.clone();
    let password = form.password1.clone();

    match state.accounts.register(form.into()) {
        Ok(account) => match state.accounts.login(&account.email, &password) {
            Ok((_, token)) => {
                (jar.add(Session::cookie(token)), Redirect::to("/")).into_response()
            }
            Err(err) => internal_error(err),
        },
        Err(err) if is_user_error(&err) => {
            Html(pages::signup(&email, &username, &[err.to_string()])).into_response()
        }
        Err(err) => internal_error(err),
    }
}

pub async fn logout(
    session: Option<Session>,
    State(state): State<AppState>,
    jar: CookieJar,
) -> Response {
    if let Some(session) = session {
        match state.accounts.logout(&session.token) {
            Ok(_) => info!(account_id = session.account.id, "Account logged out"),
            Err(err) => return internal_error(err),
        }
    }
    (jar.remove(Session::removal_cookie()), Redirect::to("/login")).into_response()
}
