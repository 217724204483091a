//! Logging configuration types

use crate::constants::DEFAULT_LOG_LEVEL;
use crate::logging::parse_log_level;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::{Validate, ValidationError};

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[validate(custom(function = "validate_log_level"))]
    pub level: String,

    /// Enable JSON output format
    pub json_format: bool,

    /// Log to a daily-rolling file in addition to stdout
    pub file_output: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            json_format: false,
            file_output: None,
        }
    }
}

#[allow(clippy::ptr_arg)]
fn validate_log_level(level: &String) -> Result<(), ValidationError> {
    parse_log_level(level)
        .map(|_| ())
        .map_err(|_| ValidationError::new("log_level"))
}
