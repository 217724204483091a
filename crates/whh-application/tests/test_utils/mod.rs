//! Test doubles for application-layer tests

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Mutex;
use std::time::Duration;
use whh_domain::entities::WeatherData;
use whh_domain::error::{Error, Result};
use whh_domain::ports::{OrchestratedRuntime, RuntimeHandle, ValueProvider};
use whh_domain::repositories::HistoryRepository;
use whh_domain::value_objects::{DeclarationSet, ResourceState};

/// How a scripted resource behaves when awaited
#[derive(Debug, Clone, Copy)]
pub enum Script {
    /// Reaches `Running` after the delay
    ReadyAfter(Duration),
    /// Reaches `FailedToStart` after the delay
    FailAfter(Duration),
    /// Stays `Starting` forever
    Never,
}

/// Runtime whose resources follow fixed scripts
#[derive(Default)]
pub struct ScriptedRuntime {
    scripts: DashMap<String, Script>,
    declarations: Mutex<Option<DeclarationSet>>,
    await_calls: DashMap<String, usize>,
}

impl ScriptedRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, name: &str, script: Script) -> Self {
        self.scripts.insert(name.to_string(), script);
        self
    }

    pub fn with_declarations(self, declarations: DeclarationSet) -> Self {
        for name in declarations.names() {
            self.scripts
                .entry(name)
                .or_insert(Script::ReadyAfter(Duration::ZERO));
        }
        *self.declarations.lock().expect("lock") = Some(declarations);
        self
    }

    pub fn await_calls(&self, name: &str) -> usize {
        self.await_calls.get(name).map(|c| *c).unwrap_or(0)
    }
}

#[async_trait]
impl OrchestratedRuntime for ScriptedRuntime {
    async fn declare_resources(&self, declarations: DeclarationSet) -> Result<()> {
        *self.declarations.lock().expect("lock") = Some(declarations);
        Ok(())
    }

    fn declarations(&self) -> Option<DeclarationSet> {
        self.declarations.lock().expect("lock").clone()
    }

    async fn start(&self) -> Result<RuntimeHandle> {
        Ok(RuntimeHandle {
            run_id: uuid::Uuid::nil(),
            started_at: chrono::Utc::now(),
            resources: Default::default(),
        })
    }

    fn current_state(&self, name: &str) -> Result<ResourceState> {
        self.scripts
            .get(name)
            .map(|_| ResourceState::Starting)
            .ok_or_else(|| Error::resource_not_found(name))
    }

    async fn await_state(
        &self,
        name: &str,
        target: ResourceState,
        timeout: Duration,
    ) -> Result<ResourceState> {
        *self.await_calls.entry(name.to_string()).or_insert(0) += 1;
        let script = self
            .scripts
            .get(name)
            .map(|s| *s)
            .ok_or_else(|| Error::resource_not_found(name))?;

        let timed_out = || Error::ReadinessTimeout {
            resource: name.to_string(),
            target,
            waited: timeout,
            last_state: ResourceState::Starting,
        };

        match script {
            Script::ReadyAfter(delay) if delay <= timeout => {
                tokio::time::sleep(delay).await;
                Ok(ResourceState::Running)
            }
            Script::FailAfter(delay) if delay <= timeout => {
                tokio::time::sleep(delay).await;
                Err(Error::ResourceFailed {
                    resource: name.to_string(),
                    state: ResourceState::FailedToStart,
                })
            }
            _ => {
                tokio::time::sleep(timeout).await;
                Err(timed_out())
            }
        }
    }

    async fn stop(&self) -> Result<()> {
        Ok(())
    }

    fn runtime_name(&self) -> &str {
        "scripted"
    }
}

/// Deferred value that always fails
pub struct FailingValue;

#[async_trait]
impl ValueProvider for FailingValue {
    async fn resolve(&self) -> Result<String> {
        Err(Error::infrastructure("endpoint not allocated"))
    }

    fn describe(&self) -> String {
        "failing".to_string()
    }
}

/// Deferred value that counts resolutions
#[derive(Default)]
pub struct CountingValue {
    pub calls: std::sync::atomic::AtomicUsize,
}

#[async_trait]
impl ValueProvider for CountingValue {
    async fn resolve(&self) -> Result<String> {
        self.calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok("resolved".to_string())
    }

    fn describe(&self) -> String {
        "counting".to_string()
    }
}

/// Repository keeping rows in a vector
#[derive(Default)]
pub struct RecordingRepository {
    rows: Mutex<Vec<WeatherData>>,
}

#[async_trait]
impl HistoryRepository for RecordingRepository {
    async fn insert(&self, data: WeatherData) -> Result<WeatherData> {
        let mut rows = self.rows.lock().expect("lock");
        let stored = data.with_id(rows.len() as i32 + 1);
        rows.push(stored.clone());
        Ok(stored)
    }

    async fn last(&self) -> Result<Option<WeatherData>> {
        Ok(self.rows.lock().expect("lock").last().cloned())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.rows.lock().expect("lock").len() as u64)
    }
}
