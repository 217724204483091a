//! The weather app host
//!
//! ```text
//! PostgresServer ─► applicationDb ┄┐
//!                                  ├─► webfrontend (external http)
//! apiservice ──────────────────────┘
//! ```
//!
//! `webfrontend` references both but only waits for `apiservice`; the
//! readiness gate covers the database.

use whh_application::AppHostBuilder;
use whh_domain::error::Result;
use whh_domain::value_objects::{DatabaseEngine, DeclarationSet};

/// Sibling API service
pub const API_SERVICE: &str = "apiservice";

/// Database server resource
pub const DATABASE_SERVER: &str = "PostgresServer";

/// The front-end's database
pub const APPLICATION_DATABASE: &str = "applicationDb";

/// The subject under test
pub const WEB_FRONTEND: &str = "webfrontend";

/// Declare the weather topology on `engine`
pub fn weather_app_host(engine: DatabaseEngine) -> Result<DeclarationSet> {
    let mut host = AppHostBuilder::new();

    let api = host.add_project(API_SERVICE).reference();
    let server = host.add_database_server(DATABASE_SERVER, engine).reference();
    let database = host.add_database(&server, APPLICATION_DATABASE).reference();

    host.add_project(WEB_FRONTEND)
        .with_external_http_endpoints()
        .with_reference(&api)
        .wait_for(&api)
        .with_reference(&database);

    host.build()
}
