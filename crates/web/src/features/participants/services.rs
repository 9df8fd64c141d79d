use storage::{
    dto::participant::ParticipantSummary, models::Segment, services::ranking::load_participants,
};

use crate::state::AppState;

/// Registered participants, without credentials
pub async fn list_participants(state: &AppState) -> Vec<ParticipantSummary> {
    load_participants(state.kv.as_ref(), &state.competition.participants)
        .await
        .iter()
        .map(ParticipantSummary::from)
        .collect()
}

pub fn list_segments(state: &AppState) -> &[Segment] {
    &state.competition.segments
}
