//! Orchestrated Runtime Port
//!
//! The runtime owns the actual provisioning of declared resources and is the
//! single source of truth for their lifecycle state. The harness never
//! mutates a state itself: it declares, starts, observes and stops.
//!
//! ## Lifecycle
//!
//! ```text
//! declare_resources ──► start ──► await_state* ──► stop
//! ```
//!
//! `start` returns once every resource has been *launched*; it does not wait
//! for any of them to become `Running`. That is what the readiness gate is for.

use crate::error::Result;
use crate::value_objects::{DeclarationSet, ResourceDeclaration, ResourceOutputs, ResourceState};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::time::Duration;
use uuid::Uuid;

/// Identity of one runtime start
#[derive(Debug, Clone)]
pub struct RuntimeHandle {
    /// Unique identifier of this run
    pub run_id: Uuid,
    /// When `start` was called
    pub started_at: DateTime<Utc>,
    /// Snapshot of resource states right after launch
    pub resources: BTreeMap<String, ResourceState>,
}

/// Orchestrated Runtime Port
///
/// Provisions the resources of a [`DeclarationSet`] and reports their states.
///
/// # Implementations
///
/// - **Local**: in-process runtime driving built-in launchers (tests, CLI)
///
/// # Example
///
/// ```ignore
/// runtime.declare_resources(declarations).await?;
/// runtime.start().await?;
/// runtime
///     .await_state("webfrontend", ResourceState::Running, Duration::from_secs(20))
///     .await?;
/// runtime.stop().await?;
/// ```
#[async_trait]
pub trait OrchestratedRuntime: Send + Sync {
    /// Register the resources to provision
    ///
    /// Only valid before `start`.
    async fn declare_resources(&self, declarations: DeclarationSet) -> Result<()>;

    /// Declared resources, if `declare_resources` was called
    fn declarations(&self) -> Option<DeclarationSet>;

    /// Launch every declared resource in dependency order
    ///
    /// # Returns
    /// A handle describing the run. Fails if nothing was declared or the
    /// runtime was already started.
    async fn start(&self) -> Result<RuntimeHandle>;

    /// Current state of a resource
    ///
    /// # Errors
    /// `ResourceNotFound` if the name is not declared.
    fn current_state(&self, name: &str) -> Result<ResourceState>;

    /// Wait until a resource reaches `target`
    ///
    /// # Arguments
    /// * `name` - Declared resource name
    /// * `target` - State to wait for
    /// * `timeout` - Upper bound on the wait
    ///
    /// # Returns
    /// The observed state (equal to `target`).
    ///
    /// # Errors
    /// - `ResourceNotFound` if the name is not declared
    /// - `ResourceFailed` if a terminal state other than `target` is reached
    /// - `ReadinessTimeout` if `timeout` elapses first
    async fn await_state(
        &self,
        name: &str,
        target: ResourceState,
        timeout: Duration,
    ) -> Result<ResourceState>;

    /// Release every resource; calling it more than once is a no-op
    async fn stop(&self) -> Result<()>;

    /// Runtime implementation name (for logging)
    fn runtime_name(&self) -> &str;
}

/// What a launcher gets to work with
#[derive(Debug, Clone)]
pub struct LaunchContext {
    /// Declaration being launched
    pub resource: std::sync::Arc<ResourceDeclaration>,
    /// Where the launcher publishes connection strings and URLs
    pub outputs: ResourceOutputs,
    /// Run this launch belongs to
    pub run_id: Uuid,
}

/// Per-resource provisioning strategy
///
/// The runtime marks the resource `Running` when `launch` returns `Ok` and
/// `FailedToStart` when it returns an error.
#[async_trait]
pub trait ResourceLauncher: Send + Sync {
    /// Provision the resource and publish its outputs
    async fn launch(&self, context: &LaunchContext) -> Result<()>;

    /// Release whatever `launch` acquired
    async fn shutdown(&self, _context: &LaunchContext) -> Result<()> {
        Ok(())
    }

    /// Release in-process state without awaiting
    ///
    /// Called for launched resources when the runtime is dropped without
    /// `stop`. Only what can be freed synchronously is released here.
    fn release(&self, _context: &LaunchContext) {}
}
