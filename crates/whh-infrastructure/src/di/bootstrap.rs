//! Weather front-end entry point
//!
//! History stores are resolved through the linkme registry by the scheme of
//! the configured connection string, so the same entry point runs against the
//! in-memory engine and a real Postgres server.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let mut host = SubjectHost::new(WeatherFrontend);
//! host.configure(snapshot)?;
//! host.start().await?;
//!
//! let scope = host.create_scope().await?;
//! let history = scope.get::<HistoryService>()?;
//! ```

use crate::config::AppConfig;
use crate::harness::SubjectEntryPoint;
use async_trait::async_trait;
use dill::{Catalog, CatalogBuilder};
use std::sync::Arc;
use tracing::{debug, info};
use whh_application::HistoryService;
use whh_application::ports::registry::{HistoryStoreProviderConfig, resolve_history_store};
use whh_domain::error::{Error, Result};
use whh_domain::repositories::HistoryStoreProvider;

/// Entry point of the weather front-end service layer
#[derive(Debug, Clone, Copy, Default)]
pub struct WeatherFrontend;

impl WeatherFrontend {
    fn history_store(services: &Catalog) -> Result<Arc<dyn HistoryStoreProvider>> {
        services
            .get_one::<Arc<dyn HistoryStoreProvider>>()
            .map(|store| Arc::clone(store.as_ref()))
            .map_err(|e| Error::internal(format!("History store is not registered: {e}")))
    }
}

#[async_trait]
impl SubjectEntryPoint for WeatherFrontend {
    type Config = AppConfig;

    fn name(&self) -> &str {
        "webfrontend"
    }

    async fn start(&self, config: AppConfig) -> Result<Catalog> {
        let database = &config.database;
        let connection_string = config
            .connection_string(&database.name)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                Error::configuration(format!(
                    "Connection string '{}' is not configured",
                    database.name
                ))
            })?;

        let store = resolve_history_store(
            &HistoryStoreProviderConfig::new(connection_string)
                .with_pool_size(database.pool_size),
        )
        .map_err(Error::configuration)?;

        if database.migrate_on_startup {
            store.migrate().await?;
        }

        info!(
            store = %store.provider_name(),
            database = %database.name,
            "History store ready"
        );

        Ok(CatalogBuilder::new()
            .add_value(config)
            .add_value(store)
            .build())
    }

    async fn begin_scope(&self, services: &Catalog) -> Result<Catalog> {
        let store = Self::history_store(services).map_err(|e| Error::scope_creation(e.to_string()))?;
        let repository = store.open().await.map_err(|e| {
            Error::scope_creation(format!("Failed to open history repository: {e}"))
        })?;
        debug!(store = %store.provider_name(), "Opened scoped history repository");

        Ok(CatalogBuilder::new_chained(services)
            .add_value(Arc::clone(&repository))
            .add_value(HistoryService::new(repository))
            .build())
    }

    async fn stop(&self, services: &Catalog) -> Result<()> {
        let store = Self::history_store(services)?;
        store.close().await?;
        debug!(store = %store.provider_name(), "Closed history store");
        Ok(())
    }
}
