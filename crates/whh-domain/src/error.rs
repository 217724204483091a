//! Error handling types

use crate::value_objects::{ReadinessError, ResourceState};
use std::time::Duration;
use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the Weather History Harness
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (simple form)
    #[error("I/O error: {source}")]
    IoSimple {
        /// The underlying I/O error
        #[from]
        source: std::io::Error,
    },

    /// I/O operation error (with context)
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// JSON parsing or serialization error
    #[error("JSON parsing error: {source}")]
    Json {
        /// The underlying JSON error
        #[from]
        source: serde_json::Error,
    },

    /// Generic string-based error
    #[error("String error: {0}")]
    String(String),

    /// Entity not found (e.g. no stored data points)
    #[error("Not found: {resource}")]
    NotFound {
        /// The entity that was not found
        resource: String,
    },

    /// Invalid argument provided to a function
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument
        message: String,
    },

    /// Entity validation failed
    #[error("Validation error: {message}")]
    Validation {
        /// Description of the failed validation
        message: String,
    },

    /// Configuration-related error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Database-related error
    #[error("Database error: {message}")]
    Database {
        /// Description of the database error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Infrastructure operation error
    #[error("Infrastructure error: {message}")]
    Infrastructure {
        /// Description of the infrastructure error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal system error
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error
        message: String,
    },

    /// A named resource is not part of the declaration set
    #[error("Resource not found: {name}")]
    ResourceNotFound {
        /// Name that was looked up
        name: String,
    },

    /// A resource did not reach the target state before the timeout
    #[error(
        "Resource '{resource}' did not reach {target} within {} ms (last state: {last_state})",
        .waited.as_millis()
    )]
    ReadinessTimeout {
        /// Resource that was awaited
        resource: String,
        /// State that was awaited
        target: ResourceState,
        /// Time spent waiting
        waited: Duration,
        /// State observed when the wait gave up
        last_state: ResourceState,
    },

    /// A resource reached a terminal state other than the awaited one
    #[error("Resource '{resource}' ended in state {state}")]
    ResourceFailed {
        /// Resource that failed
        resource: String,
        /// Terminal state it reached
        state: ResourceState,
    },

    /// One or more resources failed the readiness gate
    #[error(transparent)]
    Readiness(#[from] ReadinessError),

    /// A deferred configuration value could not be resolved
    #[error("Failed to resolve configuration value '{key}': {message}")]
    ValueResolution {
        /// Configuration key whose value failed
        key: String,
        /// Description of the failure
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A per-test service scope could not be created
    #[error("Failed to create service scope: {message}")]
    ScopeCreation {
        /// Description of the failure
        message: String,
    },

    /// The subject under test could not be initialized
    #[error("Subject initialization failed: {message}")]
    SubjectInitialization {
        /// Description of the failure
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation attempted in a lifecycle state that does not allow it
    #[error("Invalid state for {component}: cannot {operation} while {state}")]
    InvalidState {
        /// Component whose lifecycle was violated
        component: String,
        /// Operation that was attempted
        operation: String,
        /// State the component was in
        state: String,
    },
}

// Basic error creation methods
impl Error {
    /// Create a not found error
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

// I/O error creation methods
impl Error {
    /// Create an I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io {
            message: message.into(),
            source: None,
        }
    }

    /// Create an I/O error with source
    pub fn io_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Configuration error creation methods
impl Error {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with source
    pub fn configuration_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Database error creation methods
impl Error {
    /// Create a database error
    pub fn database<S: Into<String>>(message: S) -> Self {
        Self::Database {
            message: message.into(),
            source: None,
        }
    }

    /// Create a database error with source
    pub fn database_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Database {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Infrastructure error creation methods
impl Error {
    /// Create an infrastructure error
    pub fn infrastructure<S: Into<String>>(message: S) -> Self {
        Self::Infrastructure {
            message: message.into(),
            source: None,
        }
    }

    /// Create an infrastructure error with source
    pub fn infrastructure_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::Infrastructure {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Harness error creation methods
impl Error {
    /// Create a resource not found error
    pub fn resource_not_found<S: Into<String>>(name: S) -> Self {
        Self::ResourceNotFound { name: name.into() }
    }

    /// Create a value resolution error, keeping the failure as its source
    pub fn value_resolution<K: Into<String>>(key: K, cause: Error) -> Self {
        Self::ValueResolution {
            key: key.into(),
            message: cause.to_string(),
            source: Some(Box::new(cause)),
        }
    }

    /// Create a scope creation error
    pub fn scope_creation<S: Into<String>>(message: S) -> Self {
        Self::ScopeCreation {
            message: message.into(),
        }
    }

    /// Create a subject initialization error
    pub fn subject_initialization<S: Into<String>>(message: S) -> Self {
        Self::SubjectInitialization {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap any error raised while bringing the subject up
    pub fn subject_initialization_from(cause: Error) -> Self {
        match cause {
            already @ Self::SubjectInitialization { .. } => already,
            other => Self::SubjectInitialization {
                message: other.to_string(),
                source: Some(Box::new(other)),
            },
        }
    }

    /// Create an invalid lifecycle state error
    pub fn invalid_state<C, O, S>(component: C, operation: O, state: S) -> Self
    where
        C: Into<String>,
        O: Into<String>,
        S: std::fmt::Display,
    {
        Self::InvalidState {
            component: component.into(),
            operation: operation.into(),
            state: state.to_string(),
        }
    }
}

// Classification
impl Error {
    /// Whether the error must abort the whole suite rather than one test case
    pub fn is_fatal_to_suite(&self) -> bool {
        matches!(
            self,
            Self::ResourceNotFound { .. }
                | Self::Readiness(_)
                | Self::ValueResolution { .. }
                | Self::SubjectInitialization { .. }
        )
    }

    /// Name of the resource the error originated from, when there is one
    pub fn resource_name(&self) -> Option<&str> {
        match self {
            Self::ResourceNotFound { name } => Some(name),
            Self::ReadinessTimeout { resource, .. } | Self::ResourceFailed { resource, .. } => {
                Some(resource)
            }
            _ => None,
        }
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}
