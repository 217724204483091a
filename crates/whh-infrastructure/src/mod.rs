//! # Infrastructure Layer
//!
//! Cross-cutting technical concerns plus the harness that drives the subject
//! under test.
//!
//! ## Module Categories
//!
//! ### Configuration & DI
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | figment layered configuration and snapshot injection |
//! | [`di`] | Subject composition root (dill catalog) |
//! | [`constants`] | Centralized configuration constants |
//!
//! ### Observability
//! | Module | Description |
//! |--------|-------------|
//! | [`logging`] | Structured logging with tracing |
//!
//! ### Harness
//! | Module | Description |
//! |--------|-------------|
//! | [`harness`] | Subject host, per-test scopes and the suite fixture |

pub mod config;
pub mod constants;
pub mod di;
pub mod error_ext;
pub mod harness;
pub mod logging;
pub mod utils;

// Re-export commonly used types
pub use error_ext::ErrorContext;
pub use harness::{SubjectEntryPoint, SubjectHost, SuiteFixture, TestScope, with_scope};
pub use utils::StageTimings;
