use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Days, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::clock::Clock;

const DAY_FORMAT: &str = "%Y-%m-%d";

/// A calendar date in the competition's reference timezone.
///
/// All day-partitioned state (votes, tallies, rankings) is keyed by a
/// `GameDay`, never by the server's local date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, example = "2025-06-14")]
pub struct GameDay(NaiveDate);

impl GameDay {
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// The day `n` days earlier, saturating at the earliest representable date.
    pub fn days_before(self, n: u32) -> Self {
        Self(
            self.0
                .checked_sub_days(Days::new(u64::from(n)))
                .unwrap_or(NaiveDate::MIN),
        )
    }

    /// Days strictly before `self`, most recent first.
    pub fn trailing(self, window_days: u32) -> impl Iterator<Item = GameDay> {
        (1..=window_days).map(move |i| self.days_before(i))
    }
}

impl fmt::Display for GameDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DAY_FORMAT))
    }
}

impl FromStr for GameDay {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s, DAY_FORMAT).map(Self)
    }
}

/// Maps instants to game days in a fixed reference timezone.
#[derive(Debug, Clone, Copy)]
pub struct DayBoundary {
    tz: Tz,
}

impl DayBoundary {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn day_of(&self, instant: DateTime<Utc>) -> GameDay {
        GameDay(instant.with_timezone(&self.tz).date_naive())
    }

    pub fn today(&self, clock: &dyn Clock) -> GameDay {
        self.day_of(clock.now())
    }
}

impl Default for DayBoundary {
    fn default() -> Self {
        Self::new(chrono_tz::Europe::Madrid)
    }
}
