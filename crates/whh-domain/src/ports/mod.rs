//! Domain ports
//!
//! Contracts implemented by the provider layer and consumed by the
//! application layer.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`runtime`] | Orchestrated runtime and per-resource launchers |
//! | [`environment`] | Environment callbacks and deferred value providers |

pub mod environment;
pub mod runtime;

pub use environment::{EnvironmentCallback, EnvironmentContext, EnvironmentVariables, ValueProvider};
pub use runtime::{LaunchContext, OrchestratedRuntime, ResourceLauncher, RuntimeHandle};
