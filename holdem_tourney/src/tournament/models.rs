//! Tournament data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::{
    entities::Username,
    stats::{StatKey, StatLine},
};

/// Tournament ID type
pub type TournamentId = Uuid;

/// Tournament state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TournamentState {
    /// Accepting registrations
    Registering,
    /// Start scheduled, still open for joins and cancel votes
    Starting,
    /// Hands are being played
    Running,
}

/// How a tournament ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TournamentOutcome {
    /// Everybody left or busted at once
    Void,
    Winner(Username),
}

/// Result of a single elimination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Elimination {
    pub name: Username,
    /// Finishing place, 2 for the runner-up
    pub placement: usize,
}

/// Record of a finished tournament, handed to the history store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalStandings {
    pub id: TournamentId,
    /// Table (channel) the tournament ran on
    pub table: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub hands_played: u32,
    pub winner: Option<Username>,
    /// Finishing order, first place first
    pub placements: Vec<Username>,
}

impl FinalStandings {
    /// One stat line per participant.
    pub fn to_lines(&self) -> Vec<StatLine> {
        self.placements
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                StatLine::new()
                    .with(StatKey::Handle, name.as_str())
                    .with(StatKey::Placement, i64::try_from(idx + 1).unwrap_or(i64::MAX))
                    .with(StatKey::HandsPlayed, self.hands_played)
                    .with(StatKey::Winner, self.winner.as_ref() == Some(name))
                    .with(StatKey::Void, self.winner.is_none())
            })
            .collect()
    }
}
