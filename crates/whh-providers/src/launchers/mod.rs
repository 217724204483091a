//! Built-in Resource Launchers
//!
//! | Launcher | Resource kind | Publishes |
//! |----------|---------------|-----------|
//! | [`DatabaseServerLauncher`] | `DatabaseServer` | `connection_string` of the server |
//! | [`DatabaseLauncher`] | `Database` | `connection_string` of the database |
//! | [`ProjectLauncher`] | `Project` | `url` of the allocated endpoint |

pub mod database;
pub mod project;

pub use database::{DatabaseLauncher, DatabaseServerLauncher, database_url};
pub use project::ProjectLauncher;
