//! App Host Declaration DSL
//!
//! Declares the resources of one run and how they reference each other.
//!
//! ## Usage
//!
//! ```ignore
//! let mut host = AppHostBuilder::new();
//! let api = host.add_project("apiservice").reference();
//! let server = host
//!     .add_database_server("PostgresServer", DatabaseEngine::InMemory)
//!     .reference();
//! let db = host.add_database(&server, "applicationDb").reference();
//! host.add_project("webfrontend")
//!     .with_external_http_endpoints()
//!     .with_reference(&api)
//!     .with_reference(&db)
//!     .wait_for(&api);
//! let declarations = host.build()?;
//! ```

pub mod builder;
pub mod references;

pub use builder::{AppHostBuilder, ResourceBuilder};
pub use references::{OutputReference, ReferenceKind, ResourceRef, StaticEnvironment};
