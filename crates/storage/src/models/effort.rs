use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One completed attempt at a segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Effort {
    pub effort_id: u64,
    /// Elapsed time in seconds
    pub elapsed_time: u32,
    pub start_date: DateTime<Utc>,
}

impl Effort {
    pub fn new(effort_id: u64, elapsed_time: u32, start_date: DateTime<Utc>) -> Self {
        Self {
            effort_id,
            elapsed_time,
            start_date,
        }
    }
}

/// Best effort wins: the minimum elapsed time, first one on ties.
pub fn best_effort(efforts: &[Effort]) -> Option<&Effort> {
    efforts.iter().min_by_key(|effort| effort.elapsed_time)
}
