//! Local Orchestrated Runtime
//!
//! Drives every declared resource on its own tokio task. A task waits for its
//! dependencies to reach `Running`, then runs the resource's launcher and
//! publishes the resulting state through a `watch` channel.
//!
//! ```text
//! NotStarted ──► Starting ──► Running ──► Stopped
//!      │             │
//!      └─────────────┴──► FailedToStart
//! ```

use crate::constants::{DEFAULT_BIND_HOST, LOCAL_RUNTIME_NAME};
use crate::launchers::{DatabaseLauncher, DatabaseServerLauncher, ProjectLauncher};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;
use whh_domain::error::{Error, Result};
use whh_domain::ports::{LaunchContext, OrchestratedRuntime, ResourceLauncher, RuntimeHandle};
use whh_domain::value_objects::{DeclarationSet, ResourceDeclaration, ResourceKind, ResourceState};

/// Settings of a [`LocalRuntime`]
#[derive(Debug, Clone)]
pub struct LocalRuntimeOptions {
    /// Host projects bind to unless they request external endpoints
    pub bind_host: String,
    /// Admin URL of the Postgres server backing `DatabaseEngine::Postgres`
    pub postgres_url: Option<String>,
}

impl Default for LocalRuntimeOptions {
    fn default() -> Self {
        Self {
            bind_host: DEFAULT_BIND_HOST.to_string(),
            postgres_url: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Idle,
    Declared,
    Started,
    Stopped,
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

type StateMap = Arc<DashMap<String, watch::Sender<ResourceState>>>;
type LaunchedMap = Arc<DashMap<String, (Arc<dyn ResourceLauncher>, LaunchContext)>>;

/// In-process implementation of [`OrchestratedRuntime`]
pub struct LocalRuntime {
    options: LocalRuntimeOptions,
    lifecycle: Mutex<Lifecycle>,
    declarations: Mutex<Option<DeclarationSet>>,
    states: StateMap,
    launched: LaunchedMap,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    cancel: CancellationToken,
}

impl LocalRuntime {
    /// Create a runtime with default options
    pub fn new() -> Self {
        Self::with_options(LocalRuntimeOptions::default())
    }

    /// Create a runtime with explicit options
    pub fn with_options(options: LocalRuntimeOptions) -> Self {
        Self {
            options,
            lifecycle: Mutex::new(Lifecycle::Idle),
            declarations: Mutex::new(None),
            states: Arc::new(DashMap::new()),
            launched: Arc::new(DashMap::new()),
            tasks: Mutex::new(Vec::new()),
            cancel: CancellationToken::new(),
        }
    }

    /// Current state of every declared resource
    pub fn states(&self) -> Vec<(String, ResourceState)> {
        let mut states: Vec<_> = self
            .states
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value().borrow()))
            .collect();
        states.sort_by(|a, b| a.0.cmp(&b.0));
        states
    }

    fn lifecycle(&self) -> Lifecycle {
        *self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_lifecycle(&self, next: Lifecycle) {
        *self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner) = next;
    }

    fn launcher_for(
        &self,
        declaration: &ResourceDeclaration,
        set: &DeclarationSet,
    ) -> Result<Arc<dyn ResourceLauncher>> {
        Ok(match declaration.kind() {
            ResourceKind::DatabaseServer { engine } => Arc::new(DatabaseServerLauncher::new(
                *engine,
                self.options.postgres_url.clone(),
            )),
            ResourceKind::Database {
                server,
                database_name,
            } => {
                let server_decl = set.get(server).ok_or_else(|| {
                    Error::invalid_argument(format!(
                        "Database '{}' references undeclared server '{}'",
                        declaration.name(),
                        server
                    ))
                })?;
                Arc::new(DatabaseLauncher::new(
                    server.clone(),
                    server_decl.outputs().clone(),
                    database_name.clone(),
                ))
            }
            ResourceKind::Project { .. } => {
                Arc::new(ProjectLauncher::new(self.options.bind_host.clone()))
            }
            ResourceKind::Custom(launcher) => Arc::clone(launcher),
        })
    }
}

impl Default for LocalRuntime {
    fn default() -> Self {
        Self::new()
    }
}

fn publish(states: &StateMap, name: &str, state: ResourceState) {
    if let Some(sender) = states.get(name) {
        sender.send_replace(state);
    }
}

struct ResourceTask {
    declaration: Arc<ResourceDeclaration>,
    launcher: Arc<dyn ResourceLauncher>,
    context: LaunchContext,
    states: StateMap,
    launched: LaunchedMap,
    cancel: CancellationToken,
}

async fn run_resource(task: ResourceTask) {
    let ResourceTask {
        declaration,
        launcher,
        context,
        states,
        launched,
        cancel,
    } = task;
    let name = declaration.name();

    for dependency in declaration.depends_on() {
        let Some(mut receiver) = states.get(dependency).map(|s| s.subscribe()) else {
            publish(&states, name, ResourceState::FailedToStart);
            return;
        };
        let observed = tokio::select! {
            () = cancel.cancelled() => return,
            observed = receiver.wait_for(|s| *s == ResourceState::Running || s.is_terminal()) => {
                observed.map(|s| *s).unwrap_or(ResourceState::Stopped)
            }
        };
        if observed != ResourceState::Running {
            warn!(
                resource = %name,
                dependency = %dependency,
                state = %observed,
                "Dependency did not start"
            );
            publish(&states, name, ResourceState::FailedToStart);
            return;
        }
    }

    publish(&states, name, ResourceState::Starting);
    let started = Instant::now();
    let outcome = tokio::select! {
        () = cancel.cancelled() => return,
        outcome = launcher.launch(&context) => outcome,
    };

    match outcome {
        Ok(()) => {
            launched.insert(name.to_string(), (launcher, context));
            publish(&states, name, ResourceState::Running);
            info!(
                resource = %name,
                kind = declaration.kind().label(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Resource running"
            );
        }
        Err(e) => {
            publish(&states, name, ResourceState::FailedToStart);
            warn!(resource = %name, error = %e, "Resource failed to start");
        }
    }
}

#[async_trait]
impl OrchestratedRuntime for LocalRuntime {
    async fn declare_resources(&self, declarations: DeclarationSet) -> Result<()> {
        let lifecycle = self.lifecycle();
        if !matches!(lifecycle, Lifecycle::Idle | Lifecycle::Declared) {
            return Err(Error::invalid_state(
                "local runtime",
                "declare resources",
                lifecycle,
            ));
        }

        self.states.clear();
        for name in declarations.names() {
            let (sender, _) = watch::channel(ResourceState::NotStarted);
            self.states.insert(name, sender);
        }
        debug!(resources = declarations.len(), "Declared resources");
        *self
            .declarations
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(declarations);
        self.set_lifecycle(Lifecycle::Declared);
        Ok(())
    }

    fn declarations(&self) -> Option<DeclarationSet> {
        self.declarations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn start(&self) -> Result<RuntimeHandle> {
        let lifecycle = self.lifecycle();
        if lifecycle != Lifecycle::Declared {
            return Err(Error::invalid_state("local runtime", "start", lifecycle));
        }
        let set = self
            .declarations()
            .ok_or_else(|| Error::invalid_state("local runtime", "start", lifecycle))?;

        let mut launchers = Vec::with_capacity(set.len());
        for name in set.startup_order() {
            let declaration = set
                .get(name)
                .cloned()
                .ok_or_else(|| Error::resource_not_found(name.as_str()))?;
            let launcher = self.launcher_for(&declaration, &set)?;
            launchers.push((declaration, launcher));
        }

        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        self.set_lifecycle(Lifecycle::Started);

        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        for (declaration, launcher) in launchers {
            let context = LaunchContext {
                outputs: declaration.outputs().clone(),
                resource: Arc::clone(&declaration),
                run_id,
            };
            tasks.push(tokio::spawn(run_resource(ResourceTask {
                declaration,
                launcher,
                context,
                states: Arc::clone(&self.states),
                launched: Arc::clone(&self.launched),
                cancel: self.cancel.clone(),
            })));
        }
        drop(tasks);

        info!(
            run_id = %run_id,
            resources = set.len(),
            runtime = LOCAL_RUNTIME_NAME,
            "Runtime started"
        );
        Ok(RuntimeHandle {
            run_id,
            started_at,
            resources: self.states().into_iter().collect(),
        })
    }

    fn current_state(&self, name: &str) -> Result<ResourceState> {
        self.states
            .get(name)
            .map(|sender| *sender.borrow())
            .ok_or_else(|| Error::resource_not_found(name))
    }

    async fn await_state(
        &self,
        name: &str,
        target: ResourceState,
        timeout: Duration,
    ) -> Result<ResourceState> {
        let mut receiver = self
            .states
            .get(name)
            .map(|sender| sender.subscribe())
            .ok_or_else(|| Error::resource_not_found(name))?;

        let started = Instant::now();
        let observed = match tokio::time::timeout(
            timeout,
            receiver.wait_for(|s| *s == target || s.is_terminal()),
        )
        .await
        {
            Ok(Ok(state)) => Some(*state),
            Ok(Err(_)) => Some(ResourceState::Stopped),
            Err(_) => None,
        };

        match observed {
            Some(state) if state == target => Ok(state),
            Some(state) => Err(Error::ResourceFailed {
                resource: name.to_string(),
                state,
            }),
            None => Err(Error::ReadinessTimeout {
                resource: name.to_string(),
                target,
                waited: started.elapsed(),
                last_state: *receiver.borrow(),
            }),
        }
    }

    async fn stop(&self) -> Result<()> {
        if self.lifecycle() == Lifecycle::Stopped {
            return Ok(());
        }
        self.set_lifecycle(Lifecycle::Stopped);
        self.cancel.cancel();

        let tasks: Vec<_> = self
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        for task in &tasks {
            task.abort();
        }
        for task in tasks {
            // Aborted tasks report a cancellation error
            let _ = task.await;
        }

        let order = self
            .declarations()
            .map(|set| set.startup_order().to_vec())
            .unwrap_or_default();
        for name in order.iter().rev() {
            if let Some((_, (launcher, context))) = self.launched.remove(name) {
                if let Err(e) = launcher.shutdown(&context).await {
                    warn!(resource = %name, error = %e, "Resource shutdown failed");
                }
            }
            publish(&self.states, name, ResourceState::Stopped);
        }

        info!(resources = order.len(), "Runtime stopped");
        Ok(())
    }

    fn runtime_name(&self) -> &str {
        LOCAL_RUNTIME_NAME
    }
}

impl Drop for LocalRuntime {
    fn drop(&mut self) {
        self.cancel.cancel();
        let tasks = self.tasks.get_mut().unwrap_or_else(PoisonError::into_inner);
        for task in tasks.drain(..) {
            task.abort();
        }
        for entry in self.launched.iter() {
            let (launcher, context) = entry.value();
            launcher.release(context);
        }
        self.launched.clear();
    }
}
