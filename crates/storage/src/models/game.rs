use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The daily mini-games. Each mode keeps its own votes, tallies and rankings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Hero,
    #[serde(alias = "clouds")]
    Cloud,
    #[serde(alias = "spioch")]
    Sleepy,
}

impl GameMode {
    /// Prefix of every storage key belonging to this mode
    pub fn key_prefix(&self) -> &'static str {
        match self {
            Self::Hero => "hero",
            Self::Cloud => "cloud",
            Self::Sleepy => "spioch",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hero => "hero",
            Self::Cloud => "cloud",
            Self::Sleepy => "sleepy",
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hero" => Ok(Self::Hero),
            "cloud" | "clouds" => Ok(Self::Cloud),
            "sleepy" | "spioch" => Ok(Self::Sleepy),
            other => Err(format!("unknown game mode '{}'", other)),
        }
    }
}

/// The closed set of names allowed to take part in the daily games.
/// Order matters: it is the tie order of day rankings and trophy winners.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    names: Vec<String>,
}

impl Roster {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let names = names
            .into_iter()
            .map(Into::into)
            .filter(|name: &String| seen.insert(name.clone()))
            .collect();

        Self { names }
    }

    pub fn from_comma_separated(names: &str) -> Self {
        Self::new(
            names
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty()),
        )
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Voter restrictions applied on top of roster membership.
#[derive(Debug, Clone, Default)]
pub struct VotePolicy {
    barred: HashSet<String>,
}

impl VotePolicy {
    pub fn new<I, S>(barred: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            barred: barred.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_comma_separated(names: &str) -> Self {
        Self::new(
            names
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty()),
        )
    }

    pub fn is_barred(&self, voter: &str) -> bool {
        self.barred.contains(voter)
    }
}

/// Why a vote was not recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum VoteRejection {
    MissingFields,
    UnknownParticipant { name: String },
    Barred { voter: String },
    SelfVote,
    AlreadyVoted { voted_for: String },
}

impl fmt::Display for VoteRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFields => write!(f, "missing fields: both voter and target are required"),
            Self::UnknownParticipant { name } => write!(f, "unknown participant: {}", name),
            Self::Barred { voter } => write!(f, "{} is not allowed to vote", voter),
            Self::SelfVote => write!(f, "self-vote is not allowed"),
            Self::AlreadyVoted { voted_for } => {
                write!(f, "already voted today (voted for {})", voted_for)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteOutcome {
    Accepted,
    Rejected(VoteRejection),
}

impl VoteOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Journal line appended for every accepted vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub voter: String,
    pub target: String,
    pub at: DateTime<Utc>,
}
