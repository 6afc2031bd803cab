use super::{now_unix_seconds, redirect, session_cookie, Credentials};
use crate::typer::{account, error::Error, pages, store::UserStore, token::TokenCodec};
use axum::{
    extract::{Extension, Form},
    http::{header::SET_COOKIE, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, error, instrument};

// axum handler for the login form
#[instrument(skip_all)]
pub async fn login(
    store: Extension<Arc<dyn UserStore>>,
    codec: Extension<Arc<TokenCodec>>,
    payload: Option<Form<Credentials>>,
) -> Response {
    let Some(Form(user)) = payload else {
        return (StatusCode::BAD_REQUEST, pages::login("Missing payload", &[])).into_response();
    };

    debug!("login attempt for {}", user.username);

    match account::login(
        store.0.as_ref(),
        &codec,
        &user.username,
        &user.password,
        now_unix_seconds(),
    )
    .await
    {
        Ok(token) => match session_cookie(&token) {
            Ok(cookie) => {
                let mut response = redirect("/user");
                response.headers_mut().insert(SET_COOKIE, cookie);
                response
            }
            Err(e) => {
                error!("Failed to build session cookie: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    pages::login("Sorry, try again", &[]),
                )
                    .into_response()
            }
        },

        Err(Error::NotFound) => pages::register("User does not exist!", &[]).into_response(),

        Err(Error::AuthenticationFailed) => (
            StatusCode::UNAUTHORIZED,
            pages::login("Incorrect password or username!", &[]),
        )
            .into_response(),

        Err(e) => {
            error!("Error logging in: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                pages::login("Sorry, try again", &[]),
            )
                .into_response()
        }
    }
}
