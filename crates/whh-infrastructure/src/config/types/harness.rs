//! Harness configuration types
//!
//! Settings of the test harness itself, as opposed to the subject's own
//! configuration in [`AppConfig`](super::AppConfig).

use super::logging::LoggingConfig;
use crate::config::loader::ConfigSection;
use crate::constants::{
    DEFAULT_BIND_HOST, DEFAULT_SUBJECT_RESOURCE, HARNESS_CONFIG_FILENAME, HARNESS_ENV_PREFIX,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;
use whh_domain::constants::DEFAULT_READINESS_TIMEOUT_SECS;

/// What the fixture does when the readiness gate fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeoutPolicy {
    /// Tear everything down and fail the suite
    #[default]
    Abort,
    /// Log the failures and continue with whatever is running
    Proceed,
}

/// Readiness gate settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ReadinessConfig {
    /// Per-resource wait bound in seconds
    #[validate(range(min = 1))]
    pub timeout_secs: u64,

    /// Behaviour when a resource is not ready in time
    pub on_timeout: TimeoutPolicy,
}

impl ReadinessConfig {
    /// Per-resource wait bound
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_READINESS_TIMEOUT_SECS,
            on_timeout: TimeoutPolicy::default(),
        }
    }
}

/// Which resource is the subject and what not to harvest from it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SubjectConfig {
    /// Name of the subject's resource declaration
    #[validate(length(min = 1))]
    pub resource: String,

    /// Keys dropped from the harvested snapshot, in addition to the defaults
    pub exclude_keys: Vec<String>,
}

impl Default for SubjectConfig {
    fn default() -> Self {
        Self {
            resource: DEFAULT_SUBJECT_RESOURCE.to_string(),
            exclude_keys: Vec::new(),
        }
    }
}

/// Local runtime settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Host projects bind to
    #[validate(length(min = 1))]
    pub bind_host: String,

    /// Admin URL of a Postgres server for `DatabaseEngine::Postgres`
    pub postgres_url: Option<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bind_host: DEFAULT_BIND_HOST.to_string(),
            postgres_url: None,
        }
    }
}

/// Harness configuration (`whh.toml`, `WHH__*`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct HarnessConfig {
    /// Readiness gate settings
    #[validate(nested)]
    pub readiness: ReadinessConfig,

    /// Subject selection
    #[validate(nested)]
    pub subject: SubjectConfig,

    /// Local runtime settings
    #[validate(nested)]
    pub runtime: RuntimeConfig,

    /// Logging settings
    #[validate(nested)]
    pub logging: LoggingConfig,
}

impl ConfigSection for HarnessConfig {
    const ENV_PREFIX: &'static str = HARNESS_ENV_PREFIX;
    const FILE_NAME: &'static str = HARNESS_CONFIG_FILENAME;
}
