use crate::core::error::Result;
use crate::core::extract::AppJson;
use crate::core::models::{CreateParticipantInput, Participant};
use crate::core::AppState;
use axum::{extract::State, http::StatusCode, Json};
use tracing::info;

/// POST /participants
pub async fn create_participant(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateParticipantInput>,
) -> Result<StatusCode> {
    info!("POST /participants - {}", input.name);

    state.presence.register(&input.name).await?;
    Ok(StatusCode::CREATED)
}

/// GET /participants
pub async fn list_participants(State(state): State<AppState>) -> Result<Json<Vec<Participant>>> {
    info!("GET /participants");

    let participants = state.presence.list().await?;
    Ok(Json(participants))
}
