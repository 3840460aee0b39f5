//! Persistent per-player statistics.
//!
//! Storage backends see players as a [`StatLine`]: a map from a closed set
//! of [`StatKey`]s to typed [`StatValue`]s. The engine itself works with the
//! typed [`PlayerStats`] struct and converts at the store boundary.

use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

use super::entities::Chips;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKey {
    Handle,
    Cash,
    Bank,
    TournamentsPlayed,
    TournamentsWon,
    Placement,
    HandsPlayed,
    Winner,
    Void,
}

impl fmt::Display for StatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Handle => "handle",
            Self::Cash => "cash",
            Self::Bank => "bank",
            Self::TournamentsPlayed => "tournaments_played",
            Self::TournamentsWon => "tournaments_won",
            Self::Placement => "placement",
            Self::HandsPlayed => "hands_played",
            Self::Winner => "winner",
            Self::Void => "void",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatValue {
    Int(i64),
    Flag(bool),
    Text(String),
}

impl From<i64> for StatValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for StatValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<bool> for StatValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<String> for StatValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for StatValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// One record as handed to a stat store.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StatLine(BTreeMap<StatKey, StatValue>);

impl StatLine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: StatKey, value: impl Into<StatValue>) -> &mut Self {
        self.0.insert(key, value.into());
        self
    }

    #[must_use]
    pub fn with(mut self, key: StatKey, value: impl Into<StatValue>) -> Self {
        self.set(key, value);
        self
    }

    #[must_use]
    pub fn get(&self, key: StatKey) -> Option<&StatValue> {
        self.0.get(&key)
    }

    /// Integer field, `None` when absent or of another type.
    #[must_use]
    pub fn int(&self, key: StatKey) -> Option<i64> {
        match self.0.get(&key) {
            Some(StatValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn flag(&self, key: StatKey) -> Option<bool> {
        match self.0.get(&key) {
            Some(StatValue::Flag(v)) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn text(&self, key: StatKey) -> Option<&str> {
        match self.0.get(&key) {
            Some(StatValue::Text(v)) => Some(v),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StatKey, &StatValue)> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Lifetime counters kept for every handle that ever joined a table.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct PlayerStats {
    pub bank: Chips,
    pub tournaments_played: u32,
    pub tournaments_won: u32,
}

impl PlayerStats {
    /// Render as a store line. `cash` is the live tournament stack and is
    /// recorded alongside the counters.
    #[must_use]
    pub fn to_line(&self, handle: &str, cash: Chips) -> StatLine {
        StatLine::new()
            .with(StatKey::Handle, handle)
            .with(StatKey::Cash, cash)
            .with(StatKey::Bank, self.bank)
            .with(StatKey::TournamentsPlayed, self.tournaments_played)
            .with(StatKey::TournamentsWon, self.tournaments_won)
    }

    /// Missing or malformed fields fall back to zero.
    #[must_use]
    pub fn from_line(line: &StatLine) -> Self {
        let field = |key| {
            line.int(key)
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or_default()
        };
        Self {
            bank: field(StatKey::Bank),
            tournaments_played: field(StatKey::TournamentsPlayed),
            tournaments_won: field(StatKey::TournamentsWon),
        }
    }
}
