use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, de};
use utoipa::ToSchema;

/// Ranking category. `General` is the overall ranking every segment feeds;
/// a segment tagged `Climb` or `Sprint` also feeds that category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    #[serde(alias = "GENERAL")]
    General,
    #[serde(alias = "GORY", alias = "gory")]
    Climb,
    #[serde(alias = "SPRINT")]
    Sprint,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::General, Category::Climb, Category::Sprint];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Climb => "climb",
            Self::Sprint => "sprint",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "general" => Ok(Self::General),
            "climb" | "gory" => Ok(Self::Climb),
            "sprint" => Ok(Self::Sprint),
            other => Err(format!("unknown category '{}'", other)),
        }
    }
}

fn default_multiplier() -> Decimal {
    Decimal::ONE
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Segment {
    pub id: u64,
    pub name: String,
    #[serde(default, alias = "type")]
    pub category: Category,
    #[serde(default = "default_multiplier", with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub multiplier: Decimal,
}

impl Segment {
    pub fn new(id: u64, name: impl Into<String>, category: Category) -> Self {
        Self {
            id,
            name: name.into(),
            category,
            multiplier: Decimal::ONE,
        }
    }

    pub fn with_multiplier(mut self, multiplier: Decimal) -> Self {
        self.multiplier = multiplier;
        self
    }
}

/// Inclusive window in competition-local time within which efforts count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DateWindow {
    #[serde(deserialize_with = "deserialize_start")]
    pub start: NaiveDateTime,
    #[serde(deserialize_with = "deserialize_end")]
    pub end: NaiveDateTime,
}

/// Accepts a naive timestamp, an RFC 3339 timestamp (its wall-clock time is
/// kept) or a bare date, which resolves to `time_of_day`.
fn parse_window_bound(raw: &str, time_of_day: NaiveTime) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    raw.parse::<NaiveDateTime>()
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|t| t.naive_local()))
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(time_of_day))
        })
}

fn deserialize_bound<'de, D>(deserializer: D, time_of_day: NaiveTime) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_window_bound(&raw, time_of_day)
        .ok_or_else(|| de::Error::custom(format!("invalid date window bound '{}'", raw)))
}

fn deserialize_start<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
    deserialize_bound(deserializer, NaiveTime::MIN)
}

fn deserialize_end<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
    let end_of_day = NaiveTime::from_hms_opt(23, 59, 59)
        .ok_or_else(|| de::Error::custom("invalid end of day"))?;
    deserialize_bound(deserializer, end_of_day)
}

impl DateWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_from_legacy_config() {
        let json = r#"{"id": 123, "name": "Przełęcz GORY", "type": "GORY", "multiplier": 1.5}"#;
        let segment: Segment = serde_json::from_str(json).unwrap();

        assert_eq!(segment.category, Category::Climb);
        assert_eq!(segment.multiplier, Decimal::new(15, 1));
    }

    #[test]
    fn test_segment_defaults() {
        let segment: Segment = serde_json::from_str(r#"{"id": 7, "name": "Loop"}"#).unwrap();

        assert_eq!(segment.category, Category::General);
        assert_eq!(segment.multiplier, Decimal::ONE);
    }

    #[test]
    fn test_window_bound_forms() {
        let start = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap().and_hms_opt(6, 30, 0).unwrap();

        for raw in ["2025-06-01T06:30:00", "2025-06-01T06:30:00Z", "2025-06-01T06:30:00+02:00"] {
            assert_eq!(parse_window_bound(raw, NaiveTime::MIN), Some(start), "{raw}");
        }
        assert_eq!(
            parse_window_bound("2025-06-01", NaiveTime::MIN),
            Some(start.date().and_time(NaiveTime::MIN))
        );
        assert_eq!(parse_window_bound("June 1st", NaiveTime::MIN), None);
    }

    #[test]
    fn test_window_rejects_garbage() {
        let json = r#"{"start": "yesterday", "end": "2025-06-30"}"#;
        assert!(serde_json::from_str::<DateWindow>(json).is_err());
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("Climb".parse::<Category>().unwrap(), Category::Climb);
        assert_eq!("gory".parse::<Category>().unwrap(), Category::Climb);
        assert!("downhill".parse::<Category>().is_err());
    }
}
