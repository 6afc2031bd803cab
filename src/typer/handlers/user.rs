use super::{redirect, session_claims};
use crate::typer::{pages, store::UserStore, token::TokenCodec};
use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, error, instrument};

// axum handler for the personal stats page
#[instrument(skip_all)]
pub async fn stats(
    headers: HeaderMap,
    store: Extension<Arc<dyn UserStore>>,
    codec: Extension<Arc<TokenCodec>>,
) -> Response {
    let Some(claims) = session_claims(&headers, &codec) else {
        return redirect("/login");
    };

    match store.get_stats(&claims.sub).await {
        Ok(Some(stats)) => pages::user(&claims.sub, stats).into_response(),

        Ok(None) => {
            debug!("Stats not found for {}", claims.sub);
            pages::login("Sorry, try again", &[]).into_response()
        }

        Err(e) => {
            error!("Error getting stats: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                pages::login("Sorry, try again", &[]),
            )
                .into_response()
        }
    }
}
