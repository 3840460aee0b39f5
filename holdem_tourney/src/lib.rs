//! # Hold'em Tourney
//!
//! Elimination no-limit hold'em tournaments for chat channels.
//!
//! The engine plays hands from blinds to showdown, settles main and side
//! pots, escalates blinds, tracks eliminations and placements, and runs the
//! timers (start delay, idle warning and idle-out, all-in run-out pacing)
//! that keep a table moving without anyone blocking it.
//!
//! ## Architecture
//!
//! - [`game`]: cards, players, pot ledger, hand ranking and the per-hand
//!   [`Round`](game::Round) state machine
//! - [`tournament`]: blind schedule, elimination ledger, final standings
//! - [`table`]: the synchronous [`TableEngine`](table::TableEngine) and the
//!   tokio actor that serializes commands and timer firings against it
//! - [`store`]: persistence boundary for statistics and history
//!
//! A front-end owns the transport: it parses channel text into
//! [`Command`](table::Command)s, sends them through a
//! [`TableHandle`](table::TableHandle) and renders the
//! [`GameEvent`](game::GameEvent)s it subscribes to.

pub mod game;
pub mod store;
pub mod table;
pub mod tournament;

pub use game::{
    Action, Blinds, Chips, GameError, GameEvent, HandOracle, Player, Round, StandardOracle, Username,
    constants,
};
pub use store::{MemoryStatStore, StatStore, StoreError};
pub use table::{Command, TableActor, TableConfig, TableEngine, TableHandle, TableManager, TableResponse};
pub use tournament::{BlindSchedule, FinalStandings, TournamentLedger};
