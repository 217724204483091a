//! Suite fixture
//!
//! Owns the runtime and the hosted subject for one test suite and runs the
//! full pipeline: declare, start, gate, harvest, configure, start subject.
//! The fixture is an explicit object handed to test code by reference.

use crate::config::{ConfigLoader, HarnessConfig, TimeoutPolicy};
use crate::harness::scope::{TestScope, with_scope};
use crate::harness::subject::{SubjectEntryPoint, SubjectHost};
use crate::utils::StageTimings;
use std::future::Future;
use std::sync::Arc;
use tracing::{error, info, warn};
use whh_application::{ConfigHarvester, ReadinessGate};
use whh_domain::error::{Error, Result};
use whh_domain::ports::OrchestratedRuntime;
use whh_domain::value_objects::{ConfigSnapshot, DeclarationSet, ReadinessReport};
use whh_providers::{LocalRuntime, LocalRuntimeOptions};

const STAGE_RUNTIME: &str = "runtime";
const STAGE_READINESS: &str = "readiness";
const STAGE_HARVEST: &str = "harvest";
const STAGE_SUBJECT: &str = "subject";

/// Builder for a [`SuiteFixture`]
pub struct SuiteFixtureBuilder<E: SubjectEntryPoint> {
    entry_point: E,
    declarations: Option<DeclarationSet>,
    runtime: Option<Arc<dyn OrchestratedRuntime>>,
    harness_config: HarnessConfig,
    required: Vec<String>,
    subject_resource: Option<String>,
    exclude_keys: Vec<String>,
    subject_loader: ConfigLoader<E::Config>,
}

impl<E: SubjectEntryPoint> SuiteFixtureBuilder<E> {
    /// Resources to declare on the runtime
    pub fn declarations(mut self, declarations: DeclarationSet) -> Self {
        self.declarations = Some(declarations);
        self
    }

    /// Runtime to drive (defaults to a [`LocalRuntime`] built from the harness config)
    pub fn runtime(mut self, runtime: Arc<dyn OrchestratedRuntime>) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Harness settings (timeouts, subject selection, runtime options)
    pub fn harness_config(mut self, config: HarnessConfig) -> Self {
        self.harness_config = config;
        self
    }

    /// Gate on a resource; without any, every declared resource is awaited
    pub fn require<S: Into<String>>(mut self, name: S) -> Self {
        self.required.push(name.into());
        self
    }

    /// Resource whose configuration is harvested for the subject
    pub fn subject_resource<S: Into<String>>(mut self, name: S) -> Self {
        self.subject_resource = Some(name.into());
        self
    }

    /// Drop a key from the harvested snapshot
    pub fn exclude_key<S: Into<String>>(mut self, key: S) -> Self {
        self.exclude_keys.push(key.into());
        self
    }

    /// Sources of the subject's own configuration
    pub fn subject_config_loader(mut self, loader: ConfigLoader<E::Config>) -> Self {
        self.subject_loader = loader;
        self
    }

    /// Run the pipeline up to a running subject
    ///
    /// # Errors
    /// Any failure tears down whatever was brought up before it is returned.
    /// Readiness failures are `Error::Readiness` unless the timeout policy is
    /// `proceed`.
    pub async fn start(self) -> Result<SuiteFixture<E>> {
        let runtime = self.runtime.unwrap_or_else(|| {
            Arc::new(LocalRuntime::with_options(LocalRuntimeOptions {
                bind_host: self.harness_config.runtime.bind_host.clone(),
                postgres_url: self.harness_config.runtime.postgres_url.clone(),
            }))
        });
        let subject_resource = self
            .subject_resource
            .unwrap_or_else(|| self.harness_config.subject.resource.clone());
        let mut exclude_keys = self.harness_config.subject.exclude_keys.clone();
        exclude_keys.extend(self.exclude_keys);

        let mut fixture = SuiteFixture {
            runtime,
            subject: SubjectHost::with_loader(self.entry_point, self.subject_loader),
            harness_config: self.harness_config,
            snapshot: ConfigSnapshot::empty(),
            readiness: ReadinessReport::default(),
            timings: StageTimings::start(),
            torn_down: false,
        };

        let brought_up = fixture
            .bring_up(
                self.declarations,
                self.required,
                &subject_resource,
                &exclude_keys,
            )
            .await;

        match brought_up {
            Ok(()) => {
                info!(
                    subject = %fixture.subject.name(),
                    resources = fixture.readiness.waits.len(),
                    elapsed_ms = fixture.timings.total_ms(),
                    stages = ?fixture.timings.stages(),
                    "Suite fixture ready"
                );
                Ok(fixture)
            }
            Err(e) => {
                error!(
                    error = %e,
                    fatal = e.is_fatal_to_suite(),
                    elapsed_ms = fixture.timings.total_ms(),
                    "Suite fixture failed to start; tearing down"
                );
                if let Err(teardown) = fixture.teardown().await {
                    warn!(error = %teardown, "Teardown after failed start reported errors");
                }
                Err(e)
            }
        }
    }
}

/// Runtime plus hosted subject for one test suite
pub struct SuiteFixture<E: SubjectEntryPoint> {
    runtime: Arc<dyn OrchestratedRuntime>,
    subject: SubjectHost<E>,
    harness_config: HarnessConfig,
    snapshot: ConfigSnapshot,
    readiness: ReadinessReport,
    timings: StageTimings,
    torn_down: bool,
}

impl<E: SubjectEntryPoint> SuiteFixture<E> {
    /// Start configuring a fixture for `entry_point`
    pub fn builder(entry_point: E) -> SuiteFixtureBuilder<E> {
        SuiteFixtureBuilder {
            entry_point,
            declarations: None,
            runtime: None,
            harness_config: HarnessConfig::default(),
            required: Vec::new(),
            subject_resource: None,
            exclude_keys: Vec::new(),
            subject_loader: ConfigLoader::new(),
        }
    }

    async fn bring_up(
        &mut self,
        declarations: Option<DeclarationSet>,
        required: Vec<String>,
        subject_resource: &str,
        exclude_keys: &[String],
    ) -> Result<()> {
        if let Some(declarations) = declarations {
            self.runtime.declare_resources(declarations).await?;
        }
        let declared = self
            .runtime
            .declarations()
            .ok_or_else(|| Error::invalid_argument("No resources were declared for the suite"))?;
        let subject = declared
            .get(subject_resource)
            .cloned()
            .ok_or_else(|| Error::resource_not_found(subject_resource))?;

        self.runtime.start().await?;
        self.timings.mark(STAGE_RUNTIME);

        let required = if required.is_empty() {
            declared.names()
        } else {
            required
        };
        self.readiness = self.await_ready(required).await?;
        self.timings.mark(STAGE_READINESS);

        let mut exclusions = ConfigHarvester::default_exclusions(&subject);
        exclusions.extend_from_slice(exclude_keys);
        self.snapshot = ConfigHarvester::new(Arc::clone(&self.runtime))
            .harvest(subject_resource, &exclusions)
            .await?;
        self.timings.mark(STAGE_HARVEST);

        self.subject.configure(self.snapshot.clone())?;
        self.subject.start().await?;
        self.timings.mark(STAGE_SUBJECT);
        Ok(())
    }

    async fn await_ready(&self, required: Vec<String>) -> Result<ReadinessReport> {
        let timeout = self.harness_config.readiness.timeout();
        let gate = ReadinessGate::new(Arc::clone(&self.runtime));
        match gate.await_ready(required, timeout).await {
            Ok(report) => Ok(report),
            Err(failure) => match self.harness_config.readiness.on_timeout {
                TimeoutPolicy::Abort => Err(Error::Readiness(failure)),
                TimeoutPolicy::Proceed => {
                    warn!(
                        failed = ?failure.failed_resources(),
                        elapsed_ms = u64::try_from(failure.elapsed.as_millis()).unwrap_or(u64::MAX),
                        "Proceeding although resources are not ready"
                    );
                    Ok(ReadinessReport {
                        elapsed: failure.elapsed,
                        waits: failure.ready,
                        tolerated: failure.failures,
                    })
                }
            },
        }
    }

    /// Hosted subject
    pub fn subject(&self) -> &SubjectHost<E> {
        &self.subject
    }

    /// Runtime the resources live in
    pub fn runtime(&self) -> &Arc<dyn OrchestratedRuntime> {
        &self.runtime
    }

    /// Harness settings in effect
    pub fn harness_config(&self) -> &HarnessConfig {
        &self.harness_config
    }

    /// Configuration harvested for the subject
    pub fn snapshot(&self) -> &ConfigSnapshot {
        &self.snapshot
    }

    /// Outcome of the readiness gate
    pub fn readiness(&self) -> &ReadinessReport {
        &self.readiness
    }

    /// Time spent in each start-up stage that completed
    ///
    /// Stages are `runtime`, `readiness`, `harvest` and `subject`.
    pub fn startup_timings(&self) -> &StageTimings {
        &self.timings
    }

    /// Open a per-test scope
    pub async fn scope(&self) -> Result<TestScope> {
        self.subject.create_scope().await
    }

    /// Run `body` inside a fresh scope, see [`with_scope`]
    pub async fn with_scope<F, Fut, T>(&self, body: F) -> Result<T>
    where
        F: FnOnce(Arc<TestScope>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        with_scope(&self.subject, body).await
    }

    /// Whether [`teardown`](Self::teardown) already ran
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Dispose the subject, then stop the runtime; later calls are no-ops
    ///
    /// Both steps always run. The first error is returned.
    pub async fn teardown(&mut self) -> Result<()> {
        if self.torn_down {
            return Ok(());
        }
        self.torn_down = true;

        let subject = self.subject.dispose().await;
        let runtime = self.runtime.stop().await;
        info!(runtime = %self.runtime.runtime_name(), "Suite fixture torn down");
        subject.and(runtime)
    }
}

impl<E: SubjectEntryPoint> Drop for SuiteFixture<E> {
    fn drop(&mut self) {
        if !self.torn_down {
            warn!(
                subject = %self.subject.name(),
                "Suite fixture dropped without teardown; resources are released on runtime drop"
            );
        }
    }
}
