//! Storage key layout. Every key is built here, from typed values.

use std::time::Duration;

use crate::day::GameDay;
use crate::models::GameMode;

pub const PARTICIPANT_IDS: &str = "participants:ids";

/// How long a vote key lives: the voting day and the next one.
pub const VOTE_TTL: Duration = Duration::from_secs(48 * 60 * 60);

/// Lifetime of derived per-day data (day ranking, voter set, journal).
pub const DAY_DATA_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

pub fn participant(strava_id: u64) -> String {
    format!("participant:{}", strava_id)
}

pub fn vote(mode: GameMode, voter: &str, day: GameDay) -> String {
    format!("{}:vote:{}:{}", mode.key_prefix(), voter, day)
}

pub fn tally(mode: GameMode, day: GameDay, target: &str) -> String {
    format!("{}:count:{}:{}", mode.key_prefix(), day, target)
}

pub fn voters(mode: GameMode, day: GameDay) -> String {
    format!("{}:voters:{}", mode.key_prefix(), day)
}

pub fn day_ranking(mode: GameMode, day: GameDay) -> String {
    format!("{}:ranking:{}", mode.key_prefix(), day)
}

pub fn journal(mode: GameMode, day: GameDay) -> String {
    format!("{}:log:{}", mode.key_prefix(), day)
}
