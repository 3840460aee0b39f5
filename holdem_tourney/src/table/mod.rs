//! Table module running one tournament table per chat channel.
//!
//! This module implements:
//! - TableEngine: synchronous orchestrator of ledger, blinds and round
//! - TableActor: async actor serializing commands and timers for a table
//! - Scheduler: cancellable one-shot timers posting into the actor inbox
//! - TableManager: one actor per channel
//!
//! ## Architecture
//!
//! Each table runs in a separate Tokio task with an mpsc message inbox.
//! Timers are tasks that sleep and then post back into the same inbox, so a
//! timer and a player command can never touch the table at the same time.
//!
//! ## Example
//!
//! ```no_run
//! use holdem_tourney::game::StandardOracle;
//! use holdem_tourney::store::MemoryStatStore;
//! use holdem_tourney::table::{Command, TableActor, TableConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let (actor, handle) = TableActor::new(
//!         TableConfig::default(),
//!         Arc::new(StandardOracle::default()),
//!         Arc::new(MemoryStatStore::new()),
//!     );
//!     tokio::spawn(actor.run());
//!
//!     let response = handle.command("alice", Command::Join).await;
//!     assert!(response.is_success());
//! }
//! ```

pub mod actor;
pub mod config;
pub mod engine;
pub mod manager;
pub mod messages;
pub mod scheduler;

pub use actor::{TableActor, TableHandle};
pub use config::TableConfig;
pub use engine::{CommandResult, Effect, TableEngine};
pub use manager::TableManager;
pub use messages::{Command, SeatView, TableMessage, TableResponse, TableSnapshot};
pub use scheduler::{Scheduler, TimerFired, TimerHandle, TimerKind, TimerTarget};
