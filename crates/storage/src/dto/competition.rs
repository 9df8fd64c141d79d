use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{Result, StorageError};
use crate::models::{DateWindow, Participant, Segment};

fn default_cache_ttl_minutes() -> u32 {
    15
}

/// `date_range` bounds take `2025-06-01T00:00:00`, `2025-06-01T00:00:00Z`
/// or a bare `2025-06-01`; a bare end date covers the whole day.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompetitionSettings {
    pub date_range: DateWindow,
    #[serde(default = "default_cache_ttl_minutes")]
    pub cache_ttl_minutes: u32,
}

/// Public competition definition, read from a JSON file at startup.
///
/// `participants` is only a fallback for when the registry cannot be read.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompetitionConfig {
    pub segments: Vec<Segment>,
    pub settings: CompetitionSettings,
    #[serde(default)]
    pub participants: Vec<Participant>,
}

impl CompetitionConfig {
    /// Parses the file and rejects segments without a positive multiplier.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;

        if let Some(segment) = config.segments.iter().find(|s| s.multiplier <= Decimal::ZERO) {
            return Err(StorageError::Configuration(format!(
                "segment {} has multiplier {}, it must be positive",
                segment.id, segment.multiplier
            )));
        }

        Ok(config)
    }
}
