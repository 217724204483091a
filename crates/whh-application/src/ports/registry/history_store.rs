//! History Store Provider Registry
//!
//! Store providers register themselves with the connection-string schemes
//! they handle; the subject picks one from its configured connection string.

use std::sync::Arc;
use whh_domain::repositories::HistoryStoreProvider;

/// Default number of pooled connections per store
pub const DEFAULT_POOL_SIZE: u32 = 4;

/// Configuration for history store creation
#[derive(Debug, Clone)]
pub struct HistoryStoreProviderConfig {
    /// Connection string (`memory://…`, `postgres://…`)
    pub connection_string: String,
    /// Maximum pooled connections
    pub pool_size: u32,
}

impl HistoryStoreProviderConfig {
    /// Create a config for a connection string
    pub fn new(connection_string: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
            pool_size: DEFAULT_POOL_SIZE,
        }
    }

    /// Set the pool size
    pub fn with_pool_size(mut self, pool_size: u32) -> Self {
        self.pool_size = pool_size;
        self
    }
}

/// Registry entry for history store providers
pub struct HistoryStoreProviderEntry {
    /// Unique provider name (e.g., "memory", "postgres")
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Connection-string schemes handled by this provider
    pub schemes: &'static [&'static str],
    /// Factory function to create provider instance
    pub factory: fn(&HistoryStoreProviderConfig) -> Result<Arc<dyn HistoryStoreProvider>, String>,
}

#[linkme::distributed_slice]
pub static HISTORY_STORE_PROVIDERS: [HistoryStoreProviderEntry] = [..];

/// Scheme part of a connection string (`postgres` in `postgres://…`)
pub fn connection_scheme(connection_string: &str) -> Option<&str> {
    connection_string
        .split_once("://")
        .map(|(scheme, _)| scheme)
        .filter(|scheme| !scheme.is_empty())
}

/// Resolve a history store from its connection-string scheme
///
/// # Returns
/// * `Ok(Arc<dyn HistoryStoreProvider>)` - Created provider instance
/// * `Err(String)` - No provider handles the scheme, or creation failed
pub fn resolve_history_store(
    config: &HistoryStoreProviderConfig,
) -> Result<Arc<dyn HistoryStoreProvider>, String> {
    let Some(scheme) = connection_scheme(&config.connection_string) else {
        return Err(format!(
            "Connection string '{}' has no scheme",
            config.connection_string
        ));
    };

    for entry in HISTORY_STORE_PROVIDERS {
        if entry
            .schemes
            .iter()
            .any(|s| s.eq_ignore_ascii_case(scheme))
        {
            return (entry.factory)(config);
        }
    }

    let available: Vec<&str> = HISTORY_STORE_PROVIDERS.iter().map(|e| e.name).collect();
    Err(format!(
        "No history store handles scheme '{}'. Available providers: {:?}",
        scheme, available
    ))
}

/// List all registered history stores as (name, description) pairs
pub fn list_history_stores() -> Vec<(&'static str, &'static str)> {
    HISTORY_STORE_PROVIDERS
        .iter()
        .map(|e| (e.name, e.description))
        .collect()
}
