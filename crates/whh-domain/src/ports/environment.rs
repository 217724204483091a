//! Environment callbacks and deferred configuration values

use crate::error::Result;
use crate::ports::runtime::OrchestratedRuntime;
use crate::value_objects::ConfigValue;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

/// Ordered key/value pairs a callback contributes; later entries win
pub type EnvironmentVariables = Vec<(String, ConfigValue)>;

/// Produces a configuration value that only exists after provisioning
#[async_trait]
pub trait ValueProvider: Send + Sync {
    /// Resolve the value now
    async fn resolve(&self) -> Result<String>;

    /// Human readable origin of the value (for logs and debug output)
    fn describe(&self) -> String;
}

/// What a callback is invoked with
#[derive(Clone)]
pub struct EnvironmentContext {
    /// Resource whose environment is being built
    pub resource: String,
    /// Runtime the resource belongs to
    pub runtime: Arc<dyn OrchestratedRuntime>,
}

/// Contributes configuration entries to a resource
#[async_trait]
pub trait EnvironmentCallback: Send + Sync {
    /// Produce entries for the resource named in `context`
    async fn environment(&self, context: &EnvironmentContext) -> Result<EnvironmentVariables>;
}

#[async_trait]
impl<F, Fut> EnvironmentCallback for F
where
    F: Fn(EnvironmentContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<EnvironmentVariables>> + Send,
{
    async fn environment(&self, context: &EnvironmentContext) -> Result<EnvironmentVariables> {
        self(context.clone()).await
    }
}
