use axum::{Json, extract::State};
use storage::{dto::participant::ParticipantSummary, models::Segment};

use crate::state::AppState;

use super::services;

#[utoipa::path(
    get,
    path = "/api/participants",
    responses(
        (status = 200, description = "Registered participants", body = Vec<ParticipantSummary>)
    ),
    tag = "participants"
)]
pub async fn list_participants(State(state): State<AppState>) -> Json<Vec<ParticipantSummary>> {
    Json(services::list_participants(&state).await)
}

#[utoipa::path(
    get,
    path = "/api/segments",
    responses(
        (status = 200, description = "Segments of the competition", body = Vec<Segment>)
    ),
    tag = "participants"
)]
pub async fn list_segments(State(state): State<AppState>) -> Json<Vec<Segment>> {
    Json(services::list_segments(&state).to_vec())
}
