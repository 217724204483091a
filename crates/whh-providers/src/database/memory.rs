//! In-memory history store provider
//!
//! Resolves its database through the engine registry on every `open`, so a
//! store built before the server stops fails cleanly afterwards instead of
//! writing into a detached database.

use crate::constants::MEMORY_SCHEME;
use crate::database::engine::{MemoryDatabase, MemoryEngine, parse_connection_string};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;
use whh_application::ports::registry::{
    HISTORY_STORE_PROVIDERS, HistoryStoreProviderConfig, HistoryStoreProviderEntry,
};
use whh_domain::entities::WeatherData;
use whh_domain::error::{Error, Result};
use whh_domain::repositories::{HistoryRepository, HistoryStoreProvider};

/// History store backed by an in-process [`MemoryEngine`]
#[derive(Debug, Clone)]
pub struct InMemoryHistoryStore {
    engine_id: String,
    database: String,
}

impl InMemoryHistoryStore {
    /// Create a store from a `memory://<engine>/<database>` connection string
    pub fn from_connection_string(connection_string: &str) -> Result<Self> {
        let (engine_id, database) = parse_connection_string(connection_string).ok_or_else(|| {
            Error::configuration(format!(
                "Invalid in-memory connection string '{connection_string}', expected {MEMORY_SCHEME}://<engine>/<database>"
            ))
        })?;
        Ok(Self {
            engine_id: engine_id.to_string(),
            database: database.to_string(),
        })
    }

    fn database(&self) -> Result<Arc<MemoryDatabase>> {
        let engine = MemoryEngine::lookup(&self.engine_id).ok_or_else(|| {
            Error::database(format!(
                "Connection refused: in-memory server '{}' is not running",
                self.engine_id
            ))
        })?;
        engine.database(&self.database).ok_or_else(|| {
            Error::database(format!("Database '{}' does not exist", self.database))
        })
    }
}

#[async_trait]
impl HistoryStoreProvider for InMemoryHistoryStore {
    async fn migrate(&self) -> Result<()> {
        self.database()?.migrate()?;
        debug!(database = %self.database, "Migrated in-memory history store");
        Ok(())
    }

    async fn open(&self) -> Result<Arc<dyn HistoryRepository>> {
        Ok(Arc::new(InMemoryHistoryRepository {
            database: self.database()?,
        }))
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }

    fn provider_name(&self) -> &str {
        "memory"
    }
}

/// Repository handle onto one in-memory database
pub struct InMemoryHistoryRepository {
    database: Arc<MemoryDatabase>,
}

#[async_trait]
impl HistoryRepository for InMemoryHistoryRepository {
    async fn insert(&self, data: WeatherData) -> Result<WeatherData> {
        self.database.insert(data)
    }

    async fn last(&self) -> Result<Option<WeatherData>> {
        self.database.last()
    }

    async fn count(&self) -> Result<u64> {
        self.database.count()
    }
}

// ============================================================================
// Auto-registration via linkme distributed slice
// ============================================================================

fn in_memory_history_store_factory(
    config: &HistoryStoreProviderConfig,
) -> std::result::Result<Arc<dyn HistoryStoreProvider>, String> {
    InMemoryHistoryStore::from_connection_string(&config.connection_string)
        .map(|store| Arc::new(store) as Arc<dyn HistoryStoreProvider>)
        .map_err(|e| e.to_string())
}

#[linkme::distributed_slice(HISTORY_STORE_PROVIDERS)]
static MEMORY_HISTORY_STORE: HistoryStoreProviderEntry = HistoryStoreProviderEntry {
    name: "memory",
    description: "In-process database engine (per-run, non-persistent)",
    schemes: &[MEMORY_SCHEME],
    factory: in_memory_history_store_factory,
};
