//! Configuration types module

pub mod app;
pub mod harness;
pub mod logging;

// Re-export main types
pub use app::{AppConfig, DatabaseConfig, ServerConfig, ServiceEndpoint};
pub use harness::{HarnessConfig, ReadinessConfig, RuntimeConfig, SubjectConfig, TimeoutPolicy};
pub use logging::LoggingConfig;
