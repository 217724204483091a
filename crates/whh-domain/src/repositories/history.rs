//! Historic weather data persistence
//!
//! The store provider manages the database lifecycle (schema, pool); the
//! repository is the per-scope handle business services write through.

use crate::entities::WeatherData;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Database lifecycle for the history store
#[async_trait]
pub trait HistoryStoreProvider: Send + Sync {
    /// Create the schema if it does not exist yet
    async fn migrate(&self) -> Result<()>;

    /// Open a repository handle
    ///
    /// # Errors
    /// `Database` if the underlying database is unreachable.
    async fn open(&self) -> Result<Arc<dyn HistoryRepository>>;

    /// Release pooled connections
    async fn close(&self) -> Result<()>;

    /// Provider name (for logging)
    fn provider_name(&self) -> &str;
}

/// Read/write access to stored data points
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Persist a data point and return it with its assigned id
    async fn insert(&self, data: WeatherData) -> Result<WeatherData>;

    /// Most recently inserted data point, if any
    async fn last(&self) -> Result<Option<WeatherData>>;

    /// Number of stored data points
    async fn count(&self) -> Result<u64>;
}
