//! Datastore configuration.

use serde::{Deserialize, Serialize};

/// `[storage]` section.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the SQLite database. Default: `pagescore.db`.
    pub db_path: Option<String>,
    /// Reader connections in the pool. Default: 2.
    pub read_pool_size: Option<usize>,
}

impl StorageConfig {
    pub fn effective_db_path(&self) -> &str {
        self.db_path.as_deref().unwrap_or("pagescore.db")
    }

    pub fn effective_read_pool_size(&self) -> usize {
        self.read_pool_size.unwrap_or(2)
    }
}
