//! Subject application configuration
//!
//! The weather front-end reads this the same way whether it runs for real or
//! under the harness; under the harness the harvested snapshot is layered on
//! top, so `connection_strings` and `services` come from the runtime.

use super::logging::LoggingConfig;
use crate::config::loader::ConfigSection;
use crate::constants::{
    DEFAULT_DATABASE_NAME, DEFAULT_DATABASE_POOL_SIZE, SUBJECT_CONFIG_FILENAME,
    SUBJECT_ENV_PREFIX,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

/// Where the subject listens
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind URLs (`SERVER__URLS`)
    pub urls: Option<String>,
}

/// A sibling service the subject calls
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceEndpoint {
    /// Base URL of the service
    pub url: String,
}

/// Which connection string the history store uses and how
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Connection string name
    #[validate(length(min = 1))]
    pub name: String,

    /// Pooled connections
    #[validate(range(min = 1))]
    pub pool_size: u32,

    /// Create the schema when the subject starts
    pub migrate_on_startup: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_DATABASE_NAME.to_string(),
            pool_size: DEFAULT_DATABASE_POOL_SIZE,
            migrate_on_startup: true,
        }
    }
}

/// Subject configuration (`weather.toml`, `WEATHER__*`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AppConfig {
    /// Listener settings
    pub server: ServerConfig,

    /// Connection strings by name
    ///
    /// Keys are lower-cased by the loader; look them up through
    /// [`connection_string`](Self::connection_string).
    pub connection_strings: BTreeMap<String, String>,

    /// Sibling services by name, cased like `connection_strings`
    pub services: BTreeMap<String, ServiceEndpoint>,

    /// History store settings
    #[validate(nested)]
    pub database: DatabaseConfig,

    /// Logging settings
    #[validate(nested)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Connection string by name, ignoring case
    pub fn connection_string(&self, name: &str) -> Option<&str> {
        lookup_ignoring_case(&self.connection_strings, name).map(String::as_str)
    }

    /// Base URL of a sibling service by name, ignoring case
    pub fn service_url(&self, name: &str) -> Option<&str> {
        lookup_ignoring_case(&self.services, name).map(|s| s.url.as_str())
    }
}

fn lookup_ignoring_case<'a, V>(map: &'a BTreeMap<String, V>, name: &str) -> Option<&'a V> {
    map.get(&name.to_lowercase()).or_else(|| {
        map.iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    })
}

impl ConfigSection for AppConfig {
    const ENV_PREFIX: &'static str = SUBJECT_ENV_PREFIX;
    const FILE_NAME: &'static str = SUBJECT_CONFIG_FILENAME;
}
