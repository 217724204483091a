//! Configuration management
//!
//! Layered figment configuration for both sides of the harness: the harness
//! itself (`whh.toml`, `WHH__*`) and the subject under test (`weather.toml`,
//! `WEATHER__*`). The subject additionally receives the harvested
//! [`ConfigSnapshot`](whh_domain::value_objects::ConfigSnapshot) through
//! [`SnapshotSource`] as its highest-priority layer.

pub mod case;
pub mod loader;
pub mod snapshot;
pub mod types;

pub use case::LowercaseKeys;
pub use loader::{ConfigLoader, ConfigSection};
pub use snapshot::SnapshotSource;
pub use types::*;
