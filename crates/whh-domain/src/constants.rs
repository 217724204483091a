//! Domain layer constants
//!
//! Contains constants that are part of the domain model and are shared by
//! the application, provider and infrastructure layers.

// ============================================================================
// CONFIGURATION KEY CONSTANTS
// ============================================================================

/// Nested-path separator used in environment-style keys (`A__B__C`)
pub const NESTED_KEY_SEPARATOR: &str = "__";

/// Separator expected by structured configuration consumers (`A:B:C`)
pub const STRUCTURED_KEY_SEPARATOR: &str = ":";

/// Normalized key holding a project's own bind address
pub const SUBJECT_BIND_URL_KEY: &str = "SERVER:URLS";

/// Environment key prefix for connection strings injected by references
pub const CONNECTION_STRINGS_ENV_PREFIX: &str = "CONNECTION_STRINGS";

/// Environment key prefix for service endpoints injected by references
pub const SERVICES_ENV_PREFIX: &str = "SERVICES";

/// Environment key a project receives for its own bind address
pub const SERVER_URLS_ENV_KEY: &str = "SERVER__URLS";

// ============================================================================
// RESOURCE OUTPUT CONSTANTS
// ============================================================================

/// Output published by database servers and databases
pub const OUTPUT_CONNECTION_STRING: &str = "connection_string";

/// Output published by projects once an endpoint is allocated
pub const OUTPUT_URL: &str = "url";

// ============================================================================
// READINESS CONSTANTS
// ============================================================================

/// Default per-resource readiness timeout in seconds
pub const DEFAULT_READINESS_TIMEOUT_SECS: u64 = 20;

// ============================================================================
// WEATHER HISTORY CONSTANTS
// ============================================================================

/// Maximum length of a weather summary
pub const WEATHER_SUMMARY_MAX_LENGTH: u64 = 100;

/// Table holding historic weather data
pub const HISTORIC_DATA_TABLE: &str = "historic_data";
