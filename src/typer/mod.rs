pub mod account;
pub mod error;
pub mod handlers;
pub mod pages;
pub mod password;
pub mod questions;
pub mod quiz;
pub mod store;
pub mod token;
pub mod validate;

pub use error::{Error, Result};

use crate::typer::{
    questions::QuestionSet,
    quiz::QuizFlow,
    store::{PgStore, UserStore},
    token::TokenCodec,
};
use anyhow::Context;
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    routing::{get, post},
    Extension, Router,
};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{error, info, info_span, Span};
use ulid::Ulid;

/// Build the application router around an already connected store.
#[must_use]
pub fn router(
    store: Arc<dyn UserStore>,
    codec: Arc<TokenCodec>,
    questions: Arc<QuestionSet>,
) -> Router {
    let flow = Arc::new(QuizFlow::new(questions, codec.clone()));

    Router::new()
        .route("/", get(handlers::start))
        .route("/login", get(handlers::login_page))
        .route("/logout", get(handlers::logout).post(handlers::logout))
        .route("/register", get(handlers::register_page))
        .route("/user-login", post(handlers::login))
        .route("/user-register", post(handlers::register))
        .route("/user", get(handlers::stats))
        .route("/top", get(handlers::top))
        .route("/type", post(handlers::quiz))
        .route("/health", get(handlers::health).options(handlers::health))
        .route("/ping", get(handlers::ping))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(codec))
                .layer(Extension(flow))
                .layer(Extension(store)),
        )
}

/// Start the server
/// # Errors
/// Return error if failed to connect to the database or to start the server
pub async fn new(
    port: u16,
    dsn: &str,
    codec: TokenCodec,
    questions: QuestionSet,
) -> anyhow::Result<()> {
    // Connect to database
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(dsn)
        .await
        .context("Failed to connect to database")?;

    let store = PgStore::new(pool);
    store
        .migrate()
        .await
        .context("Failed to apply database schema")?;

    info!(
        "Signing session tokens with {}, {} questions loaded",
        codec.algorithm(),
        questions.len()
    );

    let app = router(Arc::new(store), Arc::new(codec), Arc::new(questions));

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {e}");
                std::future::pending::<()>().await;
            }
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
