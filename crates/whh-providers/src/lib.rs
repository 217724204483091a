//! # Weather History Harness - Provider Implementations
//!
//! Implementations of the domain ports: the in-process orchestrated runtime,
//! the launchers it drives and the history stores the subject writes to.
//!
//! ## Provider Categories
//!
//! | Category | Port | Implementations |
//! |----------|------|-----------------|
//! | Runtime | `OrchestratedRuntime` | LocalRuntime |
//! | Launchers | `ResourceLauncher` | DatabaseServer, Database, Project |
//! | History Store | `HistoryStoreProvider` | InMemory, Postgres |
//!
//! ## Feature Flags
//!
//! ```toml
//! [dependencies]
//! whh-providers = { version = "0.1", features = ["database-postgres"] }
//! ```

pub use whh_domain::error::{Error, Result};
pub use whh_domain::ports::{OrchestratedRuntime, ResourceLauncher};
pub use whh_domain::repositories::{HistoryRepository, HistoryStoreProvider};

/// Provider-specific constants
pub mod constants;

/// In-process orchestrated runtime
pub mod runtime;

/// Built-in resource launchers
pub mod launchers;

/// History store implementations
///
/// Implements `HistoryStoreProvider` for the supported database engines.
pub mod database;

pub use runtime::{LocalRuntime, LocalRuntimeOptions};
