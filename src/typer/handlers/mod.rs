pub mod health;
pub use self::health::{health, ping};

pub mod account;
pub use self::account::{login_page, logout, register_page, start};

pub mod user_login;
pub use self::user_login::login;

pub mod user_register;
pub use self::user_register::register;

pub mod user;
pub use self::user::stats;

pub mod top;
pub use self::top::top;

pub mod quiz;
pub use self::quiz::quiz;

#[cfg(test)]
mod tests;

// common functions for the handlers
use crate::typer::token::{Claims, TokenCodec, TOKEN_TTL_SECONDS};
use axum::{
    http::{
        header::{InvalidHeaderValue, COOKIE, LOCATION, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::time::SystemTime;
use tracing::error;

pub const SESSION_COOKIE_NAME: &str = "token";

#[derive(Deserialize, Debug, Default)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

pub(crate) fn now_unix_seconds() -> i64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

pub(crate) fn now_unix_millis() -> i64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// `302 Found` to `location`.
pub(crate) fn redirect(location: &'static str) -> Response {
    (StatusCode::FOUND, [(LOCATION, location)]).into_response()
}

/// Like [`redirect`], also setting or clearing the session cookie.
pub(crate) fn redirect_with_cookie(location: &'static str, cookie: HeaderValue) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(LOCATION, HeaderValue::from_static(location));
    headers.insert(SET_COOKIE, cookie);
    (StatusCode::FOUND, headers).into_response()
}

pub(crate) fn session_cookie(token: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    HeaderValue::from_str(&format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={TOKEN_TTL_SECONDS}"
    ))
}

pub(crate) fn clear_session_cookie() -> HeaderValue {
    HeaderValue::from_static("token=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Attach the session cookie to a rendered response.
pub(crate) fn with_session(token: &str, response: impl IntoResponse) -> Response {
    let mut response = response.into_response();
    match session_cookie(token) {
        Ok(cookie) => {
            response.headers_mut().insert(SET_COOKIE, cookie);
        }
        Err(e) => error!("Failed to build session cookie: {e}"),
    }
    response
}

pub(crate) fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            let (Some(key), Some(val)) = (parts.next(), parts.next()) else {
                continue;
            };
            if key.trim() == SESSION_COOKIE_NAME && !val.trim().is_empty() {
                return Some(val.trim().to_string());
            }
        }
    }
    None
}

/// Decoded session claims; `None` for missing, invalid or expired tokens.
pub(crate) fn session_claims(headers: &HeaderMap, codec: &TokenCodec) -> Option<Claims> {
    let token = extract_session_token(headers)?;
    codec.decode(&token, now_unix_seconds())
}
