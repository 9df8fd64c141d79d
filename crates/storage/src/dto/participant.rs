use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Participant;

/// Public view of a participant, without credentials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ParticipantSummary {
    pub name: String,
    pub strava_id: u64,
}

impl From<&Participant> for ParticipantSummary {
    fn from(participant: &Participant) -> Self {
        Self {
            name: participant.display_name.clone(),
            strava_id: participant.strava_id,
        }
    }
}
