use super::{clear_session_cookie, redirect, redirect_with_cookie, session_claims};
use crate::typer::{pages, token::TokenCodec};
use axum::{extract::Extension, http::HeaderMap, response::IntoResponse};
use std::sync::Arc;
use tracing::debug;

pub async fn start() -> impl IntoResponse {
    pages::start()
}

pub async fn login_page(
    headers: HeaderMap,
    codec: Extension<Arc<TokenCodec>>,
) -> impl IntoResponse {
    if session_claims(&headers, &codec).is_some() {
        debug!("Already logged in");
        return redirect("/user");
    }

    pages::login("", &[]).into_response()
}

pub async fn register_page() -> impl IntoResponse {
    pages::register("", &[])
}

pub async fn logout() -> impl IntoResponse {
    // Always clear the cookie, even without a valid session.
    redirect_with_cookie("/login", clear_session_cookie())
}
