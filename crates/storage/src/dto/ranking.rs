use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Category;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RankingEntry {
    pub rank: u32,
    pub name: String,
    pub strava_id: u64,
    /// Sum of best elapsed times, in seconds
    pub time: u64,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub points: Decimal,
    pub segments_count: u32,
}

/// Rankings for every category, as computed in one pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Rankings {
    pub general: Vec<RankingEntry>,
    pub climb: Vec<RankingEntry>,
    pub sprint: Vec<RankingEntry>,
    pub updated_at: DateTime<Utc>,
}

impl Rankings {
    pub fn empty(updated_at: DateTime<Utc>) -> Self {
        Self {
            general: Vec::new(),
            climb: Vec::new(),
            sprint: Vec::new(),
            updated_at,
        }
    }

    pub fn category(&self, category: Category) -> &[RankingEntry] {
        match category {
            Category::General => &self.general,
            Category::Climb => &self.climb,
            Category::Sprint => &self.sprint,
        }
    }

    pub fn category_mut(&mut self, category: Category) -> &mut Vec<RankingEntry> {
        match category {
            Category::General => &mut self.general,
            Category::Climb => &mut self.climb,
            Category::Sprint => &mut self.sprint,
        }
    }
}

/// Ranking of a single category
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CategoryRankingResponse {
    pub category: Category,
    pub entries: Vec<RankingEntry>,
    pub updated_at: DateTime<Utc>,
}
