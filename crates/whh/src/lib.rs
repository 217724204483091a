//! # Weather History Harness
//!
//! A readiness-gated integration test harness for a service whose runtime
//! dependencies are provisioned by an orchestration layer.
//!
//! ## Example
//!
//! ```ignore
//! use whh::apphost::weather_app_host;
//! use whh::infrastructure::{SuiteFixture, di::WeatherFrontend};
//!
//! let mut fixture = SuiteFixture::builder(WeatherFrontend)
//!     .declarations(weather_app_host(DatabaseEngine::InMemory)?)
//!     .start()
//!     .await?;
//!
//! let last = fixture
//!     .with_scope(|scope| async move {
//!         let history = scope.get::<HistoryService>()?;
//!         history.add_data_point(WeatherData::new(today, 21.5, "clear")).await?;
//!         history.get_last_data_point().await
//!     })
//!     .await?;
//!
//! fixture.teardown().await?;
//! ```
//!
//! ## Architecture
//!
//! - `domain` - Resource model, configuration model, ports, errors
//! - `application` - App host builder, readiness gate, configuration harvester, `HistoryService`
//! - `providers` - Local runtime, launchers, history stores
//! - `infrastructure` - Configuration, logging, subject host, scopes, suite fixture
//! - `apphost` - The weather topology

pub mod apphost;

/// Domain layer - core types and ports
///
/// Re-exports from the domain crate for convenience
pub mod domain {
    pub use whh_domain::*;
}

/// Application layer - harness pipeline stages and business service
///
/// Re-exports from the application crate for convenience
pub mod application {
    pub use whh_application::*;
}

/// Provider layer - runtime, launchers and stores
///
/// Re-exports from the providers crate for convenience
pub mod providers {
    pub use whh_providers::*;
}

/// Infrastructure layer - config, logging and the harness
///
/// Re-exports from the infrastructure crate for convenience
pub mod infrastructure {
    pub use whh_infrastructure::*;
}

// Re-export commonly used domain types at the crate root
pub use domain::*;

pub use apphost::weather_app_host;
pub use infrastructure::{SubjectHost, SuiteFixture, TestScope, with_scope};
