//! Core Router
//!
//! Composes the chat routes with health checks and the shared HTTP layers.

use crate::core::AppState;
use axum::{http::StatusCode, routing::get, Router};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

pub fn router(state: AppState) -> Router {
    let request_timeout = state.config.request_timeout;

    crate::chat::router()
        .route("/health", get(health_check))
        .with_state(state)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn health_check() -> &'static str {
    "OK - Bate-Papo Chat Server"
}
