//! Test subject host
//!
//! Hosts the subject application in-process with the harvested configuration
//! layered over its normal sources. The host owns the subject's root service
//! catalog for the lifetime of the suite.

use crate::config::{ConfigLoader, ConfigSection, SnapshotSource};
use crate::harness::scope::TestScope;
use async_trait::async_trait;
use dill::Catalog;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};
use whh_domain::error::{Error, Result};
use whh_domain::value_objects::ConfigSnapshot;

/// Entry point of an application that can be hosted under the harness
///
/// The host loads `Config` (defaults, file, environment, then the harvested
/// snapshot), hands it to [`start`](Self::start) and keeps the returned
/// catalog as the subject's root services.
#[async_trait]
pub trait SubjectEntryPoint: Send + Sync + 'static {
    /// The subject's own configuration type
    type Config: ConfigSection + Clone;

    /// Subject name (for logging)
    fn name(&self) -> &str;

    /// Build the subject's root services from its configuration
    ///
    /// # Errors
    /// Any error is reported as a subject initialization failure.
    async fn start(&self, config: Self::Config) -> Result<Catalog>;

    /// Build the services of one unit of work on top of the root services
    ///
    /// # Returns
    /// A catalog chained to `services`.
    async fn begin_scope(&self, services: &Catalog) -> Result<Catalog>;

    /// Release whatever `start` acquired
    async fn stop(&self, services: &Catalog) -> Result<()>;
}

/// Lifecycle of a [`SubjectHost`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectLifecycle {
    /// No configuration injected yet
    Unconfigured,
    /// Snapshot injected, not started
    Configured,
    /// Root services built
    Running,
    /// Released; terminal
    Disposed,
}

impl fmt::Display for SubjectLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

enum SubjectState<C> {
    Unconfigured,
    Configured(ConfigSnapshot),
    Running {
        config: Arc<C>,
        services: Catalog,
    },
    Disposed,
}

impl<C> SubjectState<C> {
    fn lifecycle(&self) -> SubjectLifecycle {
        match self {
            Self::Unconfigured => SubjectLifecycle::Unconfigured,
            Self::Configured(_) => SubjectLifecycle::Configured,
            Self::Running { .. } => SubjectLifecycle::Running,
            Self::Disposed => SubjectLifecycle::Disposed,
        }
    }
}

/// Hosts one subject application for a test suite
pub struct SubjectHost<E: SubjectEntryPoint> {
    entry_point: E,
    loader: ConfigLoader<E::Config>,
    state: SubjectState<E::Config>,
}

impl<E: SubjectEntryPoint> SubjectHost<E> {
    /// Host an entry point with its default configuration sources
    pub fn new(entry_point: E) -> Self {
        Self::with_loader(entry_point, ConfigLoader::new())
    }

    /// Host an entry point with custom configuration sources
    pub fn with_loader(entry_point: E, loader: ConfigLoader<E::Config>) -> Self {
        Self {
            entry_point,
            loader,
            state: SubjectState::Unconfigured,
        }
    }

    /// Current lifecycle stage
    pub fn lifecycle(&self) -> SubjectLifecycle {
        self.state.lifecycle()
    }

    /// Subject name
    pub fn name(&self) -> &str {
        self.entry_point.name()
    }

    /// Inject the harvested configuration
    ///
    /// The snapshot becomes the highest-priority configuration source.
    ///
    /// # Errors
    /// `InvalidState` unless the host is unconfigured.
    pub fn configure(&mut self, snapshot: ConfigSnapshot) -> Result<()> {
        if !matches!(self.state, SubjectState::Unconfigured) {
            return Err(self.invalid_state("configure"));
        }
        debug!(subject = %self.name(), keys = snapshot.len(), "Injected configuration snapshot");
        self.state = SubjectState::Configured(snapshot);
        Ok(())
    }

    /// Load the subject's configuration and build its root services
    ///
    /// # Errors
    /// - `InvalidState` unless the host is configured
    /// - `SubjectInitialization` if configuration or startup fails
    pub async fn start(&mut self) -> Result<()> {
        let SubjectState::Configured(snapshot) = &self.state else {
            return Err(self.invalid_state("start"));
        };

        let config = self
            .loader
            .clone()
            .with_source(SnapshotSource::new(snapshot.clone()))
            .load()
            .map_err(Error::subject_initialization_from)?;

        let services = self
            .entry_point
            .start(config.clone())
            .await
            .map_err(Error::subject_initialization_from)?;

        info!(subject = %self.name(), "Subject started");
        self.state = SubjectState::Running {
            config: Arc::new(config),
            services,
        };
        Ok(())
    }

    /// Configuration the subject was started with
    ///
    /// # Errors
    /// `InvalidState` unless the subject is running.
    pub fn config(&self) -> Result<Arc<E::Config>> {
        match &self.state {
            SubjectState::Running { config, .. } => Ok(Arc::clone(config)),
            _ => Err(self.invalid_state("read configuration")),
        }
    }

    /// Open a per-test unit of work
    ///
    /// # Errors
    /// `ScopeCreation` if the subject is not running or the scope cannot be built.
    pub async fn create_scope(&self) -> Result<TestScope> {
        let SubjectState::Running { services, .. } = &self.state else {
            return Err(Error::scope_creation(format!(
                "subject '{}' is {}, not running",
                self.name(),
                self.lifecycle()
            )));
        };

        let scoped = self
            .entry_point
            .begin_scope(services)
            .await
            .map_err(|e| match e {
                scope @ Error::ScopeCreation { .. } => scope,
                other => Error::scope_creation(other.to_string()),
            })?;

        Ok(TestScope::new(self.name(), scoped))
    }

    /// Release the subject; later calls are no-ops
    pub async fn dispose(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.state, SubjectState::Disposed) {
            SubjectState::Running { services, .. } => {
                let stopped = self.entry_point.stop(&services).await;
                match &stopped {
                    Ok(()) => info!(subject = %self.name(), "Subject disposed"),
                    Err(e) => warn!(subject = %self.name(), error = %e, "Subject stopped with errors"),
                }
                stopped
            }
            SubjectState::Disposed => {
                debug!(subject = %self.name(), "Subject already disposed");
                Ok(())
            }
            SubjectState::Unconfigured | SubjectState::Configured(_) => Ok(()),
        }
    }

    fn invalid_state(&self, operation: &str) -> Error {
        Error::invalid_state(
            format!("subject '{}'", self.name()),
            operation,
            self.lifecycle(),
        )
    }
}
