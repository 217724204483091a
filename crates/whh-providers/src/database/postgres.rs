//! PostgreSQL history store provider
//!
//! Blocking r2d2/postgres calls run on the blocking thread pool.

use crate::constants::{HISTORIC_DATA_DDL, POSTGRES_SCHEMES};
use async_trait::async_trait;
use chrono::NaiveDate;
use r2d2::Pool;
use r2d2_postgres::postgres::{NoTls, Row};
use r2d2_postgres::PostgresConnectionManager;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};
use whh_application::ports::registry::{
    HISTORY_STORE_PROVIDERS, HistoryStoreProviderConfig, HistoryStoreProviderEntry,
};
use whh_domain::entities::WeatherData;
use whh_domain::error::{Error, Result};
use whh_domain::repositories::{HistoryRepository, HistoryStoreProvider};

type PgPool = Pool<PostgresConnectionManager<NoTls>>;

/// History store backed by a PostgreSQL connection pool
pub struct PostgresHistoryStore {
    pool: Mutex<Option<PgPool>>,
}

impl PostgresHistoryStore {
    /// Create a lazily connecting pool for a connection string
    pub fn connect(config: &HistoryStoreProviderConfig) -> Result<Self> {
        let manager = PostgresConnectionManager::new(
            config
                .connection_string
                .parse()
                .map_err(|e| Error::configuration_with_source("Invalid database URL", e))?,
            NoTls,
        );
        let pool = Pool::builder()
            .max_size(config.pool_size.max(1))
            .build_unchecked(manager);
        Ok(Self {
            pool: Mutex::new(Some(pool)),
        })
    }

    fn pool(&self) -> Result<PgPool> {
        self.pool
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| Error::database("History store is closed"))
    }
}

async fn with_connection<T, F>(pool: PgPool, work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&mut r2d2::PooledConnection<PostgresConnectionManager<NoTls>>) -> Result<T>
        + Send
        + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut conn = pool
            .get()
            .map_err(|e| Error::database_with_source("Failed to get database connection", e))?;
        work(&mut conn)
    })
    .await
    .map_err(|e| Error::internal(format!("Database task failed: {e}")))?
}

#[async_trait]
impl HistoryStoreProvider for PostgresHistoryStore {
    async fn migrate(&self) -> Result<()> {
        with_connection(self.pool()?, |conn| {
            conn.batch_execute(HISTORIC_DATA_DDL)
                .map_err(|e| Error::database_with_source("Migration failed", e))
        })
        .await?;
        info!("Migrated postgres history store");
        Ok(())
    }

    async fn open(&self) -> Result<Arc<dyn HistoryRepository>> {
        Ok(Arc::new(PostgresHistoryRepository { pool: self.pool()? }))
    }

    async fn close(&self) -> Result<()> {
        if self
            .pool
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some()
        {
            debug!("Closed postgres history store pool");
        }
        Ok(())
    }

    fn provider_name(&self) -> &str {
        "postgres"
    }
}

/// Repository handle sharing the store's pool
pub struct PostgresHistoryRepository {
    pool: PgPool,
}

fn row_to_weather(row: &Row) -> Result<WeatherData> {
    let date: String = row.get(1);
    let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
        .map_err(|e| Error::database_with_source("Invalid stored date", e))?;
    Ok(WeatherData {
        id: row.get(0),
        date,
        temperature: row.get(2),
        summary: row.get(3),
    })
}

#[async_trait]
impl HistoryRepository for PostgresHistoryRepository {
    async fn insert(&self, data: WeatherData) -> Result<WeatherData> {
        with_connection(self.pool.clone(), move |conn| {
            let row = conn
                .query_one(
                    "INSERT INTO historic_data (date, temperature, summary) \
                     VALUES ($1::text::date, $2, $3) RETURNING id",
                    &[&data.date.to_string(), &data.temperature, &data.summary],
                )
                .map_err(|e| Error::database_with_source("Insert failed", e))?;
            let id: i32 = row.get(0);
            Ok(data.with_id(id))
        })
        .await
    }

    async fn last(&self) -> Result<Option<WeatherData>> {
        with_connection(self.pool.clone(), |conn| {
            let rows = conn
                .query(
                    "SELECT id, date::text, temperature, summary FROM historic_data \
                     ORDER BY id DESC LIMIT 1",
                    &[],
                )
                .map_err(|e| Error::database_with_source("Query failed", e))?;
            rows.first().map(row_to_weather).transpose()
        })
        .await
    }

    async fn count(&self) -> Result<u64> {
        with_connection(self.pool.clone(), |conn| {
            let row = conn
                .query_one("SELECT COUNT(*) FROM historic_data", &[])
                .map_err(|e| Error::database_with_source("Query failed", e))?;
            let count: i64 = row.get(0);
            Ok(count.max(0) as u64)
        })
        .await
    }
}

// ============================================================================
// Auto-registration via linkme distributed slice
// ============================================================================

fn postgres_history_store_factory(
    config: &HistoryStoreProviderConfig,
) -> std::result::Result<Arc<dyn HistoryStoreProvider>, String> {
    PostgresHistoryStore::connect(config)
        .map(|store| Arc::new(store) as Arc<dyn HistoryStoreProvider>)
        .map_err(|e| e.to_string())
}

#[linkme::distributed_slice(HISTORY_STORE_PROVIDERS)]
static POSTGRES_HISTORY_STORE: HistoryStoreProviderEntry = HistoryStoreProviderEntry {
    name: "postgres",
    description: "PostgreSQL server through an r2d2 connection pool",
    schemes: POSTGRES_SCHEMES,
    factory: postgres_history_store_factory,
};
