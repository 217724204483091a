//! # Domain Layer
//!
//! Core types for the Weather History Harness. Nothing in this crate talks to
//! a database, a socket or a runtime: it only names things and defines the
//! contracts (ports) the outer layers implement.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`entities`] | `WeatherData`, the one persisted row of the subject |
//! | [`value_objects`] | Resource declarations and states, configuration values and snapshots, readiness reports |
//! | [`ports`] | Orchestrated runtime, resource launchers, environment callbacks, deferred value providers |
//! | [`repositories`] | History store and repository contracts |
//! | [`error`] | Domain error type and result alias |

pub mod constants;
pub mod entities;
pub mod error;
pub mod ports;
pub mod repositories;
pub mod value_objects;

pub use entities::*;
pub use error::{Error, Result};
pub use value_objects::*;
