//! Application Layer - Weather History Harness
//!
//! Orchestrates the domain ports into the harness pipeline and hosts the
//! subject's business service.
//!
//! ## Architecture
//!
//! The application layer:
//! - Declares resources through the app-host builder
//! - Gates on resource readiness and harvests subject configuration
//! - Contains the subject's business service (`HistoryService`)
//! - Declares the provider registry filled in by `whh-providers`
//!
//! ## Pipeline
//!
//! ```text
//! AppHostBuilder ─► DeclarationSet ─► OrchestratedRuntime::start
//!                                             │
//!                       ReadinessGate::await_ready (concurrent waits)
//!                                             │
//!                       ConfigHarvester::harvest ─► ConfigSnapshot
//! ```
//!
//! ## Dependencies
//!
//! This crate depends only on:
//! - `whh-domain`: For entities, value objects and port traits
//! - Pure Rust libraries for async, logging and registration

pub mod apphost;
pub mod domain_services;
pub mod ports;
pub mod use_cases;

pub use apphost::{AppHostBuilder, ReferenceKind, ResourceBuilder, ResourceRef};
pub use domain_services::*;
pub use use_cases::*;
