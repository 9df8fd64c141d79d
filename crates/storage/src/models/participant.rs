use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A competitor with a linked Strava account.
///
/// The refresh token is a credential: it is stored in the registry but never
/// serialized into API responses (see [`crate::dto::participant::ParticipantSummary`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Participant {
    pub strava_id: u64,
    pub name: String,
    pub display_name: String,
    pub refresh_token: String,
    #[serde(default)]
    pub added_at: Option<DateTime<Utc>>,
}

impl Participant {
    pub fn new(
        strava_id: u64,
        name: impl Into<String>,
        display_name: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            strava_id,
            name: name.into(),
            display_name: display_name.into(),
            refresh_token: refresh_token.into(),
            added_at: None,
        }
    }
}
