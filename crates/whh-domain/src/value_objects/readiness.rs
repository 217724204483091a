//! Readiness gate outcomes

use crate::value_objects::resource::ResourceState;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Why a single resource failed the readiness gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ReadinessFailureReason {
    /// The target state was not observed in time
    TimedOut {
        /// Time spent waiting
        waited: Duration,
        /// Last state seen
        last_state: ResourceState,
    },
    /// The resource reached a terminal state instead
    Failed {
        /// Terminal state reached
        state: ResourceState,
    },
    /// The resource is not declared
    NotFound,
    /// The runtime could not answer (stopped, not started, internal failure)
    Unavailable {
        /// Runtime-provided description
        message: String,
    },
}

/// A single failed wait
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadinessFailure {
    /// Resource that was awaited
    pub resource: String,
    /// State that was awaited
    pub target: ResourceState,
    /// Why the wait failed
    pub reason: ReadinessFailureReason,
}

impl fmt::Display for ReadinessFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            ReadinessFailureReason::TimedOut { waited, last_state } => write!(
                f,
                "'{}' did not reach {} within {} ms (last state: {})",
                self.resource,
                self.target,
                waited.as_millis(),
                last_state
            ),
            ReadinessFailureReason::Failed { state } => {
                write!(f, "'{}' ended in state {}", self.resource, state)
            }
            ReadinessFailureReason::NotFound => {
                write!(f, "'{}' is not a declared resource", self.resource)
            }
            ReadinessFailureReason::Unavailable { message } => {
                write!(f, "'{}' could not be awaited: {}", self.resource, message)
            }
        }
    }
}

/// Aggregated failure of the readiness gate
///
/// Carries every failed resource, not just the first one observed, plus the
/// waits of the resources that made it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadinessError {
    /// Failed waits, sorted by resource name
    pub failures: Vec<ReadinessFailure>,
    /// Resources that did become ready, with their wait times
    pub ready: BTreeMap<String, Duration>,
    /// Wall time spent in the gate
    pub elapsed: Duration,
}

impl ReadinessError {
    /// Names of the resources that failed
    pub fn failed_resources(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.resource.as_str()).collect()
    }

    /// Whether every failure is a timeout
    pub fn only_timeouts(&self) -> bool {
        self.failures
            .iter()
            .all(|f| matches!(f.reason, ReadinessFailureReason::TimedOut { .. }))
    }
}

impl fmt::Display for ReadinessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Readiness gate failed for {} resource(s) after {} ms",
            self.failures.len(),
            self.elapsed.as_millis()
        )?;
        for failure in &self.failures {
            write!(f, "; {failure}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ReadinessError {}

/// Successful (or tolerated) pass through the readiness gate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReadinessReport {
    /// Wall time spent in the gate
    pub elapsed: Duration,
    /// Time each resource took to reach its target
    pub waits: BTreeMap<String, Duration>,
    /// Failures tolerated because the timeout policy is to proceed
    pub tolerated: Vec<ReadinessFailure>,
}

impl ReadinessReport {
    /// Whether every awaited resource reached its target
    pub fn all_ready(&self) -> bool {
        self.tolerated.is_empty()
    }
}
