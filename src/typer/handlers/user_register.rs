use super::Credentials;
use crate::typer::{account, error::Error, pages, store::UserStore};
use axum::{
    extract::{Extension, Form},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, error, instrument};

// axum handler for the registration form
#[instrument(skip_all)]
pub async fn register(
    store: Extension<Arc<dyn UserStore>>,
    payload: Option<Form<Credentials>>,
) -> Response {
    let Some(Form(user)) = payload else {
        return (StatusCode::BAD_REQUEST, pages::register("Missing payload", &[])).into_response();
    };

    debug!("registration attempt for {}", user.username);

    match account::register(store.0.as_ref(), &user.username, &user.password).await {
        Ok(_) => (
            StatusCode::CREATED,
            pages::login("You are successfully registered!", &[]),
        )
            .into_response(),

        Err(Error::AlreadyRegistered) => (
            StatusCode::CONFLICT,
            pages::register("", &["User is already registered!".to_string()]),
        )
            .into_response(),

        Err(Error::ValidationFailed(violations)) => {
            let errors: Vec<String> = violations.iter().map(ToString::to_string).collect();
            (StatusCode::BAD_REQUEST, pages::register("", &errors)).into_response()
        }

        Err(e) => {
            error!("Error registering user: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                pages::login("", &["Sorry, try again".to_string()]),
            )
                .into_response()
        }
    }
}
