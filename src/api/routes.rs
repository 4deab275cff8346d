//! Route definitions for the API.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::SharedState;

/// Create the main API router
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .route("/docs", get(super::openapi::openapi_json))
        .route("/webhooks/tally", post(handlers::tally::receive_tally_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
