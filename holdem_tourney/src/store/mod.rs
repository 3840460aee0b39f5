//! Persistence boundary for player statistics and tournament history.
//!
//! The table actor talks to a [`StatStore`] only. Failures are logged and
//! play continues with default statistics.

pub mod errors;
pub mod memory;

use async_trait::async_trait;

use crate::game::{entities::Username, stats::StatLine};
use crate::tournament::FinalStandings;

pub use errors::{StoreError, StoreResult};
pub use memory::MemoryStatStore;

/// Trait for player statistics storage
#[async_trait]
pub trait StatStore: Send + Sync {
    /// Load the stored line for a handle, `None` for a handle never seen
    async fn load_player(&self, name: &Username) -> StoreResult<Option<StatLine>>;

    /// Replace the stored line for a handle
    async fn save_player(&self, name: &Username, line: StatLine) -> StoreResult<()>;

    /// Append the final standings of a finished tournament
    async fn record_tournament(&self, standings: &FinalStandings) -> StoreResult<()>;
}
