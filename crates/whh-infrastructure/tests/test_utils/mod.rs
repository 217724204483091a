//! Shared test doubles for the infrastructure tests

#![allow(dead_code)]

use async_trait::async_trait;
use dill::{Catalog, CatalogBuilder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use validator::Validate;
use whh_application::AppHostBuilder;
use whh_domain::error::{Error, Result};
use whh_domain::ports::{LaunchContext, ResourceLauncher};
use whh_domain::value_objects::{DatabaseEngine, DeclarationSet};
use whh_infrastructure::config::{ConfigLoader, ConfigSection, HarnessConfig};
use whh_infrastructure::harness::SubjectEntryPoint;

/// Configuration of [`ProbeEntryPoint`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ProbeConfig {
    pub greeting: String,
    #[validate(length(max = 16))]
    pub label: String,
}

impl ConfigSection for ProbeConfig {
    const ENV_PREFIX: &'static str = "WHH_PROBE";
    const FILE_NAME: &'static str = "whh-probe.toml";
}

/// Marker registered in every scope catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeMarker(pub usize);

/// Subject that records its lifecycle calls
#[derive(Clone, Default)]
pub struct ProbeEntryPoint {
    pub starts: Arc<AtomicUsize>,
    pub stops: Arc<AtomicUsize>,
    pub scopes: Arc<AtomicUsize>,
    pub fail_start: bool,
    pub fail_scope: bool,
}

impl ProbeEntryPoint {
    pub fn failing_start() -> Self {
        Self {
            fail_start: true,
            ..Self::default()
        }
    }

    pub fn failing_scope() -> Self {
        Self {
            fail_scope: true,
            ..Self::default()
        }
    }

    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    pub fn start_count(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SubjectEntryPoint for ProbeEntryPoint {
    type Config = ProbeConfig;

    fn name(&self) -> &str {
        "probe"
    }

    async fn start(&self, config: ProbeConfig) -> Result<Catalog> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        if self.fail_start {
            return Err(Error::configuration("probe refused to start"));
        }
        Ok(CatalogBuilder::new().add_value(config).build())
    }

    async fn begin_scope(&self, services: &Catalog) -> Result<Catalog> {
        if self.fail_scope {
            return Err(Error::database("Connection refused"));
        }
        let n = self.scopes.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(CatalogBuilder::new_chained(services)
            .add_value(ScopeMarker(n))
            .build())
    }

    async fn stop(&self, _services: &Catalog) -> Result<()> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Loader that ignores files and environment variables on the test host
pub fn isolated_loader<T: ConfigSection>() -> ConfigLoader<T> {
    ConfigLoader::new()
        .with_config_path("/nonexistent/whh-test.toml")
        .with_env_prefix("WHH_TEST_ISOLATED")
}

/// Harness configuration with a short readiness timeout
pub fn harness_config(timeout_secs: u64) -> HarnessConfig {
    let mut config = HarnessConfig::default();
    config.readiness.timeout_secs = timeout_secs;
    config
}

/// Launcher that never finishes
pub struct Hanging;

#[async_trait]
impl ResourceLauncher for Hanging {
    async fn launch(&self, _context: &LaunchContext) -> Result<()> {
        futures::future::pending::<()>().await;
        Ok(())
    }
}

/// The weather topology on the in-memory engine
pub fn weather_topology() -> DeclarationSet {
    let mut host = AppHostBuilder::new();
    let server = host
        .add_database_server("PostgresServer", DatabaseEngine::InMemory)
        .reference();
    let db = host.add_database(&server, "applicationDb").reference();
    let api = host.add_project("apiservice").reference();
    host.add_project("webfrontend")
        .with_external_http_endpoints()
        .with_reference(&api)
        .wait_for(&api)
        .with_reference(&db)
        .wait_for(&db);
    host.build().expect("valid topology")
}

/// The weather topology plus a resource that never becomes ready
pub fn weather_topology_with_hanging(name: &str) -> DeclarationSet {
    let mut host = AppHostBuilder::new();
    let server = host
        .add_database_server("PostgresServer", DatabaseEngine::InMemory)
        .reference();
    let db = host.add_database(&server, "applicationDb").reference();
    host.add_resource(name, Arc::new(Hanging));
    host.add_project("webfrontend")
        .with_reference(&db)
        .wait_for(&db);
    host.build().expect("valid topology")
}
