//! Chat Handlers and Router
//!
//! HTTP surface for participants, messages and heartbeats.

use crate::core::AppState;
use axum::{
    http::HeaderMap,
    routing::{get, post},
    Router,
};

pub mod messages;
pub mod participants;
pub mod status;

/// Header carrying the acting participant's name
pub const USER_HEADER: &str = "user";

/// Value of the `User` header, or an empty string when absent or not UTF-8
pub(crate) fn user_from_headers(headers: &HeaderMap) -> String {
    headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/participants",
            get(participants::list_participants).post(participants::create_participant),
        )
        .route(
            "/messages",
            get(messages::list_messages).post(messages::create_message),
        )
        .route("/status", post(status::heartbeat))
}
