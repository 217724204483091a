//! Provider Constants

// ============================================================================
// RUNTIME CONSTANTS
// ============================================================================

/// Default host projects bind to
pub const DEFAULT_BIND_HOST: &str = "127.0.0.1";

/// Host projects bind to when external endpoints are requested
pub const EXTERNAL_BIND_HOST: &str = "0.0.0.0";

/// Runtime name reported in logs
pub const LOCAL_RUNTIME_NAME: &str = "local";

// ============================================================================
// DATABASE CONSTANTS
// ============================================================================

/// Scheme of in-memory engine connection strings
pub const MEMORY_SCHEME: &str = "memory";

/// Schemes accepted by the Postgres store
pub const POSTGRES_SCHEMES: &[&str] = &["postgres", "postgresql"];

/// Postgres SQLSTATE for an already existing database
pub const PG_DUPLICATE_DATABASE: &str = "42P04";

/// Schema of the historic data table
pub const HISTORIC_DATA_DDL: &str = "CREATE TABLE IF NOT EXISTS historic_data (
    id SERIAL PRIMARY KEY,
    date DATE NOT NULL,
    temperature DOUBLE PRECISION NOT NULL,
    summary VARCHAR(100) NOT NULL
)";
