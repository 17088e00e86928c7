use super::user_from_headers;
use crate::core::error::Result;
use crate::core::extract::AppJson;
use crate::core::models::{CreateMessageInput, Message, MessagesQuery};
use crate::core::AppState;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use tracing::info;

/// POST /messages
///
/// Sender comes from the `User` header and must be a live participant.
pub async fn create_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    AppJson(input): AppJson<CreateMessageInput>,
) -> Result<StatusCode> {
    let sender = user_from_headers(&headers);
    info!("POST /messages - from {} to {}", sender, input.to);

    state
        .messages
        .post(&sender, &input.to, &input.text, &input.message_type)
        .await?;
    Ok(StatusCode::CREATED)
}

/// GET /messages?limit=n
pub async fn list_messages(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<MessagesQuery>,
) -> Result<Json<Vec<Message>>> {
    let requester = user_from_headers(&headers);
    info!("GET /messages - {} (limit {:?})", requester, query.limit);

    let messages = state
        .messages
        .query(&requester, query.limit.as_deref())
        .await?;
    Ok(Json(messages))
}
