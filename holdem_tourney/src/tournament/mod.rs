//! Elimination tournament bookkeeping.
//!
//! This module provides:
//! - Blind escalation by hand count and elimination bumps
//! - The active/eliminated player ledger and placements
//! - Cancellation vote tallies
//! - Final standings records

pub mod blinds;
pub mod ledger;
pub mod models;

pub use blinds::{BlindSchedule, blind_level};
pub use ledger::{TournamentLedger, VoteTally};
pub use models::{Elimination, FinalStandings, TournamentId, TournamentOutcome, TournamentState};
