//! Table manager for spawning and managing one table actor per channel.

use super::{
    actor::{TableActor, TableHandle},
    config::TableConfig,
    messages::{TableMessage, TableResponse},
};
use crate::{game::functional::HandOracle, store::StatStore};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{RwLock, oneshot};

/// Table manager for managing multiple table instances
pub struct TableManager {
    /// Shared hand oracle
    oracle: Arc<dyn HandOracle>,

    /// Shared stat store
    store: Arc<dyn StatStore>,

    /// Active table handles, by table name
    tables: Arc<RwLock<HashMap<String, TableHandle>>>,
}

impl TableManager {
    /// Create a new table manager
    pub fn new(oracle: Arc<dyn HandOracle>, store: Arc<dyn StatStore>) -> Self {
        Self {
            oracle,
            store,
            tables: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a new table and spawn its actor
    ///
    /// # Returns
    ///
    /// * `Result<TableHandle, String>` - Handle of the new table, or error
    pub async fn create_table(&self, config: TableConfig) -> Result<TableHandle, String> {
        config.validate()?;

        let mut tables = self.tables.write().await;
        if tables.contains_key(&config.name) {
            return Err(format!("Table '{}' already exists", config.name));
        }

        let name = config.name.clone();
        let (actor, handle) = TableActor::new(config, Arc::clone(&self.oracle), Arc::clone(&self.store));
        tokio::spawn(actor.run());
        tables.insert(name.clone(), handle.clone());

        log::info!("Created table '{}'", name);
        Ok(handle)
    }

    /// Get table handle by name
    pub async fn get_table(&self, name: &str) -> Option<TableHandle> {
        self.tables.read().await.get(name).cloned()
    }

    /// Close a table
    pub async fn close_table(&self, name: &str) -> Result<(), String> {
        let handle = self
            .tables
            .write()
            .await
            .remove(name)
            .ok_or_else(|| format!("Table '{}' not found", name))?;

        let (response, rx) = oneshot::channel();
        handle.send(TableMessage::Close { response }).await?;

        match rx.await {
            Ok(TableResponse::Success) => {
                log::info!("Closed table '{}'", name);
                Ok(())
            }
            Ok(other) => Err(format!("Unexpected close response: {other:?}")),
            Err(_) => Err("Table did not answer close request".to_string()),
        }
    }

    /// Names of all open tables
    pub async fn list_tables(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// Get active table count
    pub async fn active_table_count(&self) -> usize {
        self.tables.read().await.len()
    }
}
