//! Infrastructure layer constants
//!
//! Domain-specific constants are defined in `whh_domain::constants`.

// ============================================================================
// CONFIGURATION CONSTANTS
// ============================================================================

/// Harness configuration file name
pub const HARNESS_CONFIG_FILENAME: &str = "whh.toml";

/// Environment variable prefix for harness configuration (`WHH__A__B`)
pub const HARNESS_ENV_PREFIX: &str = "WHH";

/// Subject configuration file name
pub const SUBJECT_CONFIG_FILENAME: &str = "weather.toml";

/// Environment variable prefix for subject configuration (`WEATHER__A__B`)
pub const SUBJECT_ENV_PREFIX: &str = "WEATHER";

/// Configuration directory name under the user config dir
pub const DEFAULT_CONFIG_DIR: &str = "whh";

/// Separator between environment variable path segments
pub const ENV_NESTED_SEPARATOR: &str = "__";

// ============================================================================
// LOGGING CONSTANTS
// ============================================================================

/// Environment variable overriding the log filter
pub const LOG_FILTER_ENV: &str = "WHH_LOG";

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// File name prefix used when the configured log path has none
pub const DEFAULT_LOG_FILE_PREFIX: &str = "whh";

// ============================================================================
// HARNESS CONSTANTS
// ============================================================================

/// Resource whose configuration is harvested by default
pub const DEFAULT_SUBJECT_RESOURCE: &str = "webfrontend";

/// Host projects bind to by default
pub const DEFAULT_BIND_HOST: &str = "127.0.0.1";

// ============================================================================
// SUBJECT CONSTANTS
// ============================================================================

/// Connection string name of the subject's database
pub const DEFAULT_DATABASE_NAME: &str = "applicationDb";

/// Connections kept by the subject's history store
pub const DEFAULT_DATABASE_POOL_SIZE: u32 = 4;
