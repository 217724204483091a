//! Use Cases
//!
//! Harness pipeline stages that run between runtime start and subject start.

pub mod config_harvester;
pub mod readiness_gate;

pub use config_harvester::ConfigHarvester;
pub use readiness_gate::ReadinessGate;
