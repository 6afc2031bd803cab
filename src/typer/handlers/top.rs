use crate::typer::{pages, store::UserStore};
use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{error, instrument};

pub const TOP_SIZE: usize = 10;

// axum handler for the leaderboard
#[instrument(skip_all)]
pub async fn top(store: Extension<Arc<dyn UserStore>>) -> Response {
    match store.top(TOP_SIZE).await {
        Ok(users) => pages::top(&users).into_response(),
        Err(e) => {
            error!("Error getting top users: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, pages::top(&[])).into_response()
        }
    }
}
