//! Weather History Service
//!
//! The subject's one business service. Every call goes through the
//! repository it was constructed with, which is scoped to a single test.

use std::sync::Arc;
use tracing::debug;
use whh_domain::entities::WeatherData;
use whh_domain::error::{Error, Result};
use whh_domain::repositories::HistoryRepository;

/// Appends and reads weather data points
#[derive(Clone)]
pub struct HistoryService {
    repository: Arc<dyn HistoryRepository>,
}

impl HistoryService {
    /// Create a service bound to a repository
    pub fn new(repository: Arc<dyn HistoryRepository>) -> Self {
        Self { repository }
    }

    /// Validate and store a data point
    ///
    /// # Returns
    /// The stored row with its assigned id.
    ///
    /// # Errors
    /// - `Validation` if the summary is too long or the temperature is not finite
    /// - `Database` if the store rejects the write
    pub async fn add_data_point(&self, data: WeatherData) -> Result<WeatherData> {
        data.check()?;
        let stored = self.repository.insert(data).await?;
        debug!(id = stored.id, date = %stored.date, "Stored weather data point");
        Ok(stored)
    }

    /// Most recently stored data point
    ///
    /// # Errors
    /// `NotFound` when nothing has been stored yet.
    pub async fn get_last_data_point(&self) -> Result<WeatherData> {
        self.repository
            .last()
            .await?
            .ok_or_else(|| Error::not_found("weather data point"))
    }

    /// Number of stored data points
    pub async fn count(&self) -> Result<u64> {
        self.repository.count().await
    }
}

impl std::fmt::Debug for HistoryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryService").finish_non_exhaustive()
    }
}
