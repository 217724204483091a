//! Database server and database launchers

use crate::constants::{MEMORY_SCHEME, POSTGRES_SCHEMES};
use crate::database::engine::MemoryEngine;
use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};
use whh_application::ports::registry::connection_scheme;
use whh_domain::constants::OUTPUT_CONNECTION_STRING;
use whh_domain::error::{Error, Result};
use whh_domain::ports::{LaunchContext, ResourceLauncher};
use whh_domain::value_objects::{DatabaseEngine, ResourceOutputs};

/// Replace the database path of a server URL, keeping credentials and query
///
/// `postgres://u:p@host:5432/postgres?sslmode=disable` with `applicationDb`
/// becomes `postgres://u:p@host:5432/applicationDb?sslmode=disable`.
pub fn database_url(server_url: &str, database: &str) -> Option<String> {
    let (scheme, rest) = server_url.split_once("://")?;
    let (authority, tail) = rest.split_once('/').unwrap_or((rest, ""));
    if authority.is_empty() {
        return None;
    }
    let query = tail
        .split_once('?')
        .map(|(_, q)| format!("?{q}"))
        .unwrap_or_default();
    Some(format!("{scheme}://{authority}/{database}{query}"))
}

/// Provisions a database server
pub struct DatabaseServerLauncher {
    engine: DatabaseEngine,
    admin_url: Option<String>,
    memory_engine: Mutex<Option<Arc<MemoryEngine>>>,
}

impl DatabaseServerLauncher {
    /// Launcher for an engine; `admin_url` is required for Postgres
    pub fn new(engine: DatabaseEngine, admin_url: Option<String>) -> Self {
        Self {
            engine,
            admin_url,
            memory_engine: Mutex::new(None),
        }
    }
}

#[async_trait]
impl ResourceLauncher for DatabaseServerLauncher {
    async fn launch(&self, context: &LaunchContext) -> Result<()> {
        let connection_string = match self.engine {
            DatabaseEngine::InMemory => {
                let engine = MemoryEngine::start();
                let connection_string = engine.connection_string();
                *self
                    .memory_engine
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner) = Some(engine);
                connection_string
            }
            DatabaseEngine::Postgres => {
                let url = self.admin_url.clone().ok_or_else(|| {
                    Error::configuration(format!(
                        "Database server '{}' uses Postgres but no postgres_url is configured",
                        context.resource.name()
                    ))
                })?;
                postgres_admin::verify(&url).await?;
                url
            }
        };

        info!(
            resource = %context.resource.name(),
            engine = ?self.engine,
            "Database server running"
        );
        context
            .outputs
            .publish(OUTPUT_CONNECTION_STRING, connection_string);
        Ok(())
    }

    async fn shutdown(&self, context: &LaunchContext) -> Result<()> {
        self.release(context);
        Ok(())
    }

    fn release(&self, context: &LaunchContext) {
        let engine = self
            .memory_engine
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(engine) = engine {
            engine.shutdown();
            debug!(resource = %context.resource.name(), engine = %engine.id(), "Stopped in-memory engine");
        }
        context.outputs.clear();
    }
}

/// Provisions a database on a running server
pub struct DatabaseLauncher {
    server: String,
    server_outputs: ResourceOutputs,
    database_name: String,
}

impl DatabaseLauncher {
    /// Launcher reading the server's published connection string
    pub fn new<S: Into<String>, D: Into<String>>(
        server: S,
        server_outputs: ResourceOutputs,
        database_name: D,
    ) -> Self {
        Self {
            server: server.into(),
            server_outputs,
            database_name: database_name.into(),
        }
    }
}

#[async_trait]
impl ResourceLauncher for DatabaseLauncher {
    async fn launch(&self, context: &LaunchContext) -> Result<()> {
        let server_url = self
            .server_outputs
            .get(OUTPUT_CONNECTION_STRING)
            .ok_or_else(|| {
                Error::infrastructure(format!(
                    "Database server '{}' has not published a connection string",
                    self.server
                ))
            })?;

        let connection_string = match connection_scheme(&server_url) {
            Some(MEMORY_SCHEME) => {
                let engine_id = &server_url[MEMORY_SCHEME.len() + "://".len()..];
                let engine = MemoryEngine::lookup(engine_id).ok_or_else(|| {
                    Error::infrastructure(format!(
                        "In-memory server '{}' is not running",
                        self.server
                    ))
                })?;
                engine.create_database(&self.database_name)
            }
            Some(scheme) if POSTGRES_SCHEMES.contains(&scheme) => {
                postgres_admin::create_database(&server_url, &self.database_name).await?;
                database_url(&server_url, &self.database_name).ok_or_else(|| {
                    Error::configuration(format!("Invalid server URL for '{}'", self.server))
                })?
            }
            _ => {
                return Err(Error::configuration(format!(
                    "Database server '{}' published an unsupported connection string",
                    self.server
                )));
            }
        };

        info!(
            resource = %context.resource.name(),
            server = %self.server,
            "Database created"
        );
        context
            .outputs
            .publish(OUTPUT_CONNECTION_STRING, connection_string);
        Ok(())
    }

    async fn shutdown(&self, context: &LaunchContext) -> Result<()> {
        context.outputs.clear();
        Ok(())
    }
}

#[cfg(feature = "database-postgres")]
mod postgres_admin {
    use crate::constants::PG_DUPLICATE_DATABASE;
    use r2d2_postgres::postgres::{Client, NoTls};
    use whh_domain::error::{Error, Result};

    async fn blocking<T, F>(work: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        tokio::task::spawn_blocking(work)
            .await
            .map_err(|e| Error::internal(format!("Database task failed: {e}")))?
    }

    pub async fn verify(url: &str) -> Result<()> {
        let url = url.to_string();
        blocking(move || {
            let mut client = Client::connect(&url, NoTls).map_err(|e| {
                Error::database_with_source("Failed to connect to Postgres server", e)
            })?;
            client
                .batch_execute("SELECT 1")
                .map_err(|e| Error::database_with_source("Postgres health check failed", e))
        })
        .await
    }

    pub async fn create_database(url: &str, name: &str) -> Result<()> {
        let url = url.to_string();
        let statement = format!("CREATE DATABASE \"{}\"", name.replace('"', "\"\""));
        blocking(move || {
            let mut client = Client::connect(&url, NoTls).map_err(|e| {
                Error::database_with_source("Failed to connect to Postgres server", e)
            })?;
            match client.batch_execute(&statement) {
                Ok(()) => Ok(()),
                Err(e)
                    if e.code().map(|c| c.code()) == Some(PG_DUPLICATE_DATABASE) =>
                {
                    Ok(())
                }
                Err(e) => Err(Error::database_with_source("Failed to create database", e)),
            }
        })
        .await
    }
}

#[cfg(not(feature = "database-postgres"))]
mod postgres_admin {
    use whh_domain::error::{Error, Result};

    fn unsupported() -> Error {
        Error::configuration("Postgres support requires the `database-postgres` feature")
    }

    pub async fn verify(_url: &str) -> Result<()> {
        Err(unsupported())
    }

    pub async fn create_database(_url: &str, _name: &str) -> Result<()> {
        Err(unsupported())
    }
}
