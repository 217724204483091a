//! Readiness Gate Use Case
//!
//! Blocks until every named resource reports `Running` or its wait fails.
//! Waits run concurrently, so the gate takes as long as the slowest
//! resource, not the sum of all of them.

use futures::future::join_all;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use whh_domain::error::Error;
use whh_domain::ports::OrchestratedRuntime;
use whh_domain::value_objects::{
    ReadinessError, ReadinessFailure, ReadinessFailureReason, ReadinessReport, ResourceState,
};

/// Concurrent readiness waits against an orchestrated runtime
#[derive(Clone)]
pub struct ReadinessGate {
    runtime: Arc<dyn OrchestratedRuntime>,
}

impl ReadinessGate {
    /// Create a gate over a started runtime
    pub fn new(runtime: Arc<dyn OrchestratedRuntime>) -> Self {
        Self { runtime }
    }

    /// Wait for every named resource to reach `Running`
    ///
    /// Duplicate names are awaited once. Each wait is bounded by
    /// `timeout_per_resource`; no retry is attempted.
    ///
    /// # Returns
    /// A report with per-resource wait times when every resource is ready.
    ///
    /// # Errors
    /// A [`ReadinessError`] listing exactly the resources that failed, sorted
    /// by name.
    pub async fn await_ready<I, S>(
        &self,
        names: I,
        timeout_per_resource: Duration,
    ) -> Result<ReadinessReport, ReadinessError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let started = Instant::now();
        let names: BTreeSet<String> = names.into_iter().map(Into::into).collect();

        let outcomes = join_all(
            names
                .iter()
                .map(|name| self.wait_for(name, timeout_per_resource)),
        )
        .await;

        let mut waits = BTreeMap::new();
        let mut failures = Vec::new();
        for (name, outcome) in names.into_iter().zip(outcomes) {
            match outcome {
                Ok(waited) => {
                    waits.insert(name, waited);
                }
                Err(failure) => failures.push(failure),
            }
        }

        let elapsed = started.elapsed();
        if failures.is_empty() {
            info!(
                resources = waits.len(),
                elapsed_ms = elapsed.as_millis() as u64,
                "Readiness gate passed"
            );
            Ok(ReadinessReport {
                elapsed,
                waits,
                tolerated: Vec::new(),
            })
        } else {
            for failure in &failures {
                warn!(resource = %failure.resource, "Readiness wait failed: {failure}");
            }
            warn!(
                failed = failures.len(),
                ready = waits.len(),
                elapsed_ms = elapsed.as_millis() as u64,
                "Readiness gate failed"
            );
            Err(ReadinessError {
                failures,
                ready: waits,
                elapsed,
            })
        }
    }

    async fn wait_for(
        &self,
        name: &str,
        timeout: Duration,
    ) -> Result<Duration, ReadinessFailure> {
        let began = Instant::now();
        let target = ResourceState::Running;
        let outcome =
            tokio::time::timeout(timeout, self.runtime.await_state(name, target, timeout)).await;

        let reason = match outcome {
            Ok(Ok(_)) => {
                let waited = began.elapsed();
                debug!(resource = %name, waited_ms = waited.as_millis() as u64, "Resource ready");
                return Ok(waited);
            }
            Ok(Err(Error::ReadinessTimeout {
                waited, last_state, ..
            })) => ReadinessFailureReason::TimedOut { waited, last_state },
            Ok(Err(Error::ResourceFailed { state, .. })) => {
                ReadinessFailureReason::Failed { state }
            }
            Ok(Err(Error::ResourceNotFound { .. })) => ReadinessFailureReason::NotFound,
            Ok(Err(other)) => ReadinessFailureReason::Unavailable {
                message: other.to_string(),
            },
            Err(_) => ReadinessFailureReason::TimedOut {
                waited: began.elapsed(),
                last_state: self.runtime.current_state(name).unwrap_or_default(),
            },
        };

        Err(ReadinessFailure {
            resource: name.to_string(),
            target,
            reason,
        })
    }
}

impl std::fmt::Debug for ReadinessGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadinessGate")
            .field("runtime", &self.runtime.runtime_name())
            .finish()
    }
}
