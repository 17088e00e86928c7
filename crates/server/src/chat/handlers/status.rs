use super::user_from_headers;
use crate::core::error::Result;
use crate::core::AppState;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
};
use tracing::debug;

/// POST /status - heartbeat for the participant named in `User`
pub async fn heartbeat(State(state): State<AppState>, headers: HeaderMap) -> Result<StatusCode> {
    let name = user_from_headers(&headers);
    debug!("POST /status - {}", name);

    state.presence.heartbeat(&name).await?;
    Ok(StatusCode::OK)
}
