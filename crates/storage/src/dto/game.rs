use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::day::GameDay;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct VoteRequest {
    #[validate(length(max = 64, message = "name is too long"))]
    pub from: Option<String>,
    #[serde(alias = "hero")]
    #[validate(length(max = 64, message = "name is too long"))]
    pub target: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VoteResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VoterQuery {
    /// Name of the participant asking
    pub from: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MyVoteResponse {
    pub date: GameDay,
    pub voted_for: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VotersResponse {
    pub date: GameDay,
    pub voters: Vec<String>,
}

/// One row of a day ranking, serialized as `[name, count]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedTally(pub String, pub u64);

/// Top targets of a day by vote count, descending.
pub type DayRanking = Vec<RankedTally>;

/// A day on which at least one vote was cast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct HistoryEntry {
    pub date: GameDay,
    /// Tied winners joined for display
    pub winner: String,
    pub winners: Vec<String>,
    pub votes: u64,
    pub total_votes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct TrophySummary {
    pub trophies: BTreeMap<String, u32>,
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct ModeStats {
    pub today: BTreeMap<String, u64>,
    #[schema(value_type = Vec<Object>)]
    pub ranking: DayRanking,
}

impl ModeStats {
    pub fn from_ranking(ranking: DayRanking) -> Self {
        let today = ranking
            .iter()
            .map(|RankedTally(name, count)| (name.clone(), *count))
            .collect();

        Self { today, ranking }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HeroStats {
    #[serde(flatten)]
    pub day: ModeStats,
    pub my_vote: Option<String>,
    pub trophies: BTreeMap<String, u32>,
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StatsResponse {
    pub date: GameDay,
    pub hero: HeroStats,
    pub cloud: ModeStats,
    pub sleepy: ModeStats,
}
