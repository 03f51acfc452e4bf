//! Application setup and server configuration.

use std::time::Duration;

use axum::{extract::Extension, routing::get, Router};
use sqlx::PgPool;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::server::routes::health_handler;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
}

/// Build the Axum application router
///
/// The scheduler's HTTP surface is intentionally small: downstream services
/// report job outcomes through the store directly, so the server only exposes
/// operational endpoints.
pub fn build_app(pool: PgPool) -> Router {
    let app_state = AppState { db_pool: pool };

    Router::new()
        .route("/health", get(health_handler))
        .layer(Extension(app_state))
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(TraceLayer::new_for_http())
}
