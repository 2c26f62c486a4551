//! Core ladder records.
//!
//! `Player` and `Challenge` mirror the relational shape of the store;
//! `ChallengeStatus` is a tagged enum with an explicit forward-only
//! transition table. The status progression is linear:
//!
//! ```text
//! Pending -> Accepted -> Completed
//! ```
//!
//! Backward, skipping, and same-state moves are rejected by the engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default maximum rank difference when no config row exists
pub const DEFAULT_MAX_RANK_DIFFERENCE: u32 = 5;

/// A ranked club member. Rank 1 is the top of the ladder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    /// Positive, unique within the active player set; smaller = better
    pub rank: u32,
    /// At most one outstanding challenge as challenger
    pub active_challenge_id: Option<String>,
    /// Informational only; authorization is the caller's concern
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// Challenge state machine position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChallengeStatus {
    Pending,
    Accepted,
    Completed,
}

impl ChallengeStatus {
    /// A challenge in a non-terminal state occupies the challenger's slot.
    pub fn is_terminal(self) -> bool {
        matches!(self, ChallengeStatus::Completed)
    }

    /// True iff `next` is the forward-adjacent state.
    pub fn can_transition_to(self, next: ChallengeStatus) -> bool {
        matches!(
            (self, next),
            (ChallengeStatus::Pending, ChallengeStatus::Accepted)
                | (ChallengeStatus::Accepted, ChallengeStatus::Completed)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChallengeStatus::Pending => "PENDING",
            ChallengeStatus::Accepted => "ACCEPTED",
            ChallengeStatus::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for ChallengeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChallengeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(ChallengeStatus::Pending),
            "ACCEPTED" => Ok(ChallengeStatus::Accepted),
            "COMPLETED" => Ok(ChallengeStatus::Completed),
            other => Err(format!("unknown challenge status: {}", other)),
        }
    }
}

/// A proposed or in-progress match between two ranked players.
///
/// Challenges are append-only: they are transitioned, never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    pub id: String,
    pub challenger_id: String,
    pub challenged_id: String,
    pub status: ChallengeStatus,
    /// Scheduled time; may be set or cleared in any status
    pub match_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    /// Recorded only while the challenge is Accepted
    pub challenger_score: Option<u32>,
    pub challenged_score: Option<u32>,
}

/// Singleton policy row; the one tunable of the ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LadderConfig {
    pub max_rank_difference: u32,
}

impl Default for LadderConfig {
    fn default() -> Self {
        Self {
            max_rank_difference: DEFAULT_MAX_RANK_DIFFERENCE,
        }
    }
}
