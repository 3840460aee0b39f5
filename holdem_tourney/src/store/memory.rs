//! In-memory stat store.

use async_trait::async_trait;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;

use crate::game::{entities::Username, stats::StatLine};
use crate::tournament::FinalStandings;

use super::{StatStore, StoreResult};

/// Stat store kept in process memory. Cloning shares the same storage.
#[derive(Clone, Debug, Default)]
pub struct MemoryStatStore {
    players: Arc<RwLock<HashMap<Username, StatLine>>>,
    history: Arc<RwLock<Vec<FinalStandings>>>,
}

impl MemoryStatStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every tournament recorded so far, oldest first
    pub async fn history(&self) -> Vec<FinalStandings> {
        self.history.read().await.clone()
    }

    pub async fn player_count(&self) -> usize {
        self.players.read().await.len()
    }
}

#[async_trait]
impl StatStore for MemoryStatStore {
    async fn load_player(&self, name: &Username) -> StoreResult<Option<StatLine>> {
        Ok(self.players.read().await.get(name).cloned())
    }

    async fn save_player(&self, name: &Username, line: StatLine) -> StoreResult<()> {
        self.players.write().await.insert(name.clone(), line);
        Ok(())
    }

    async fn record_tournament(&self, standings: &FinalStandings) -> StoreResult<()> {
        self.history.write().await.push(standings.clone());
        Ok(())
    }
}
