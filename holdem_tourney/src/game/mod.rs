//! Poker rules and the per-hand engine.
//!
//! - Cards, deck and player records
//! - Pot ledger with side pots
//! - Hand ranking and the equity oracle
//! - The round state machine that plays one hand

pub mod constants;
pub mod entities;
pub mod errors;
pub mod events;
pub mod functional;
pub mod pot;
pub mod state_machine;
pub mod stats;

pub use entities::{Action, Blinds, Card, Chips, Deck, Player, Username};
pub use errors::{ErrorKind, GameError};
pub use events::GameEvent;
pub use functional::{HandOracle, HandValue, StandardOracle};
pub use pot::{Pot, PotAward, PotLedger};
pub use state_machine::{HandSummary, Phase, Round, Step, Street};
pub use stats::{PlayerStats, StatKey, StatLine, StatValue};
