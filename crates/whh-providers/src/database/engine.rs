//! In-process database engine
//!
//! Engines live in a process-wide registry keyed by id so that a connection
//! string (`memory://<engine>/<database>`) is all a store needs to find its
//! rows. Each runtime start registers a fresh engine, which keeps separate
//! runs from ever sharing data.

use crate::constants::MEMORY_SCHEME;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use whh_domain::constants::HISTORIC_DATA_TABLE;
use whh_domain::entities::WeatherData;
use whh_domain::error::{Error, Result};

static ENGINES: Lazy<DashMap<String, Arc<MemoryEngine>>> = Lazy::new(DashMap::new);

/// One in-memory database server
#[derive(Debug)]
pub struct MemoryEngine {
    id: String,
    databases: DashMap<String, Arc<MemoryDatabase>>,
}

impl MemoryEngine {
    /// Start a new engine and make it reachable by id
    pub fn start() -> Arc<Self> {
        let engine = Arc::new(Self {
            id: uuid::Uuid::new_v4().simple().to_string(),
            databases: DashMap::new(),
        });
        ENGINES.insert(engine.id.clone(), Arc::clone(&engine));
        engine
    }

    /// Find a running engine
    pub fn lookup(id: &str) -> Option<Arc<Self>> {
        ENGINES.get(id).map(|e| Arc::clone(e.value()))
    }

    /// Stop the engine; every database goes offline
    pub fn shutdown(&self) {
        ENGINES.remove(&self.id);
        for database in self.databases.iter() {
            database.online.store(false, Ordering::SeqCst);
        }
    }

    /// Engine id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Connection string of the server itself
    pub fn connection_string(&self) -> String {
        format!("{MEMORY_SCHEME}://{}", self.id)
    }

    /// Create a database (no-op if it exists) and return its connection string
    pub fn create_database(&self, name: &str) -> String {
        self.databases
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(MemoryDatabase::new()));
        format!("{MEMORY_SCHEME}://{}/{name}", self.id)
    }

    /// Find a database on this engine
    pub fn database(&self, name: &str) -> Option<Arc<MemoryDatabase>> {
        self.databases.get(name).map(|d| Arc::clone(d.value()))
    }
}

/// Split `memory://<engine>/<database>` into its parts
pub fn parse_connection_string(connection_string: &str) -> Option<(&str, &str)> {
    let rest = connection_string.strip_prefix(MEMORY_SCHEME)?.strip_prefix("://")?;
    let (engine, database) = rest.split_once('/')?;
    (!engine.is_empty() && !database.is_empty()).then_some((engine, database))
}

/// Rows of one database
#[derive(Debug)]
pub struct MemoryDatabase {
    online: AtomicBool,
    migrated: AtomicBool,
    next_id: AtomicI32,
    rows: Mutex<Vec<WeatherData>>,
}

impl MemoryDatabase {
    fn new() -> Self {
        Self {
            online: AtomicBool::new(true),
            migrated: AtomicBool::new(false),
            next_id: AtomicI32::new(1),
            rows: Mutex::new(Vec::new()),
        }
    }

    /// Create the historic data table
    pub fn migrate(&self) -> Result<()> {
        self.ensure_online()?;
        self.migrated.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Append a row, assigning the next id
    pub fn insert(&self, data: WeatherData) -> Result<WeatherData> {
        self.ensure_table()?;
        let stored = data.with_id(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(stored.clone());
        Ok(stored)
    }

    /// Row with the highest id
    pub fn last(&self) -> Result<Option<WeatherData>> {
        self.ensure_table()?;
        Ok(self
            .rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .max_by_key(|row| row.id)
            .cloned())
    }

    /// Number of rows
    pub fn count(&self) -> Result<u64> {
        self.ensure_table()?;
        Ok(self.rows.lock().unwrap_or_else(PoisonError::into_inner).len() as u64)
    }

    /// Whether the owning engine is still running
    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    fn ensure_online(&self) -> Result<()> {
        if self.is_online() {
            Ok(())
        } else {
            Err(Error::database("Connection refused: database server is stopped"))
        }
    }

    fn ensure_table(&self) -> Result<()> {
        self.ensure_online()?;
        if self.migrated.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(Error::database(format!(
                "relation \"{HISTORIC_DATA_TABLE}\" does not exist"
            )))
        }
    }
}
