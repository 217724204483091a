//! Application Ports
//!
//! Registries the provider layer plugs into.

pub mod registry;

pub use registry::*;
