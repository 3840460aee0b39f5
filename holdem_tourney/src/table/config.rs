//! Table configuration models.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::game::{constants::MAX_PLAYERS_PER_DECK, entities::Chips};

/// Table configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Table name, usually the chat channel
    pub name: String,

    /// Opening big blind; the small blind is half of it
    pub min_bet: Chips,

    /// Chips each player starts the tournament with
    pub starting_stack: Chips,

    /// Players needed to start (default: 2)
    pub min_players: usize,

    /// Seats at the table (default: 10)
    pub max_players: usize,

    /// Delay between a start request and the first hand
    pub start_delay_secs: u64,

    /// Pause between hands
    pub hand_delay_secs: u64,

    /// Pause between reveals of an all-in run-out
    pub showdown_delay_secs: u64,

    /// Completed hands per blind doubling
    pub blind_doubling_hands: u32,

    /// Double the blinds once more after any hand that knocked someone out
    pub double_on_elimination: bool,

    /// Seconds after a turn starts before the player is warned
    pub idle_warning_secs: u64,

    /// Seconds after a turn starts before the player is timed out
    pub idle_timeout_secs: u64,

    /// Standard decks in the shoe
    pub num_decks: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            name: "#poker".to_string(),
            min_bet: 10,
            starting_stack: 1000,
            min_players: 2,
            max_players: 10,
            start_delay_secs: 30,
            hand_delay_secs: 5,
            showdown_delay_secs: 3,
            blind_doubling_hands: 10,
            double_on_elimination: true,
            idle_warning_secs: 60,
            idle_timeout_secs: 90,
            num_decks: 1,
        }
    }
}

impl TableConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.min_bet < 2 {
            return Err("Minimum bet must be at least 2".to_string());
        }

        if self.starting_stack == 0 {
            return Err("Starting stack must be positive".to_string());
        }

        if self.min_players < 2 {
            return Err("Need at least 2 players to start".to_string());
        }

        if self.max_players < self.min_players {
            return Err("Max players must be at least min players".to_string());
        }

        if self.num_decks == 0 {
            return Err("Need at least one deck".to_string());
        }

        if self.max_players > MAX_PLAYERS_PER_DECK * self.num_decks {
            return Err(format!(
                "{} decks seat at most {} players",
                self.num_decks,
                MAX_PLAYERS_PER_DECK * self.num_decks
            ));
        }

        if self.idle_warning_secs >= self.idle_timeout_secs {
            return Err("Idle warning must come before the idle timeout".to_string());
        }

        if self.blind_doubling_hands == 0 {
            return Err("Blind doubling period must be at least one hand".to_string());
        }

        Ok(())
    }

    pub fn start_delay(&self) -> Duration {
        Duration::from_secs(self.start_delay_secs)
    }

    pub fn hand_delay(&self) -> Duration {
        Duration::from_secs(self.hand_delay_secs)
    }

    pub fn showdown_delay(&self) -> Duration {
        Duration::from_secs(self.showdown_delay_secs)
    }

    pub fn idle_warning(&self) -> Duration {
        Duration::from_secs(self.idle_warning_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}
