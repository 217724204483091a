//! Resource declaration model
//!
//! A resource is any externally provisioned dependency of the subject under
//! test (a database server, a database, a sibling service, the subject project
//! itself). Declarations are plain data: the orchestrated runtime decides how to
//! bring them up and is the only writer of their [`ResourceState`].

use crate::error::{Error, Result};
use crate::ports::environment::EnvironmentCallback;
use crate::ports::runtime::ResourceLauncher;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, RwLock};

/// Lifecycle stage of a provisioned resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ResourceState {
    /// Declared but the runtime has not touched it yet
    #[default]
    NotStarted,
    /// The runtime is provisioning it
    Starting,
    /// Provisioned and usable
    Running,
    /// Provisioning failed (terminal)
    FailedToStart,
    /// Released by the runtime (terminal)
    Stopped,
}

impl ResourceState {
    /// Whether no further transition will happen
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::FailedToStart | Self::Stopped)
    }
}

impl fmt::Display for ResourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotStarted => "NotStarted",
            Self::Starting => "Starting",
            Self::Running => "Running",
            Self::FailedToStart => "FailedToStart",
            Self::Stopped => "Stopped",
        };
        f.write_str(name)
    }
}

/// Storage engine backing a database server resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseEngine {
    /// In-process engine, private to one runtime instance
    #[default]
    InMemory,
    /// External PostgreSQL server reached through an admin connection
    Postgres,
}

/// What a resource is, which decides how the runtime provisions it
#[derive(Clone)]
pub enum ResourceKind {
    /// A database server
    DatabaseServer {
        /// Engine backing the server
        engine: DatabaseEngine,
    },
    /// A database hosted on a declared server
    Database {
        /// Name of the server resource
        server: String,
        /// Database name on that server
        database_name: String,
    },
    /// A service project (the subject or a sibling)
    Project {
        /// Bind on all interfaces instead of loopback
        external_http: bool,
    },
    /// Anything else, provisioned by its own launcher
    Custom(Arc<dyn ResourceLauncher>),
}

impl ResourceKind {
    /// Short label used in logs
    pub fn label(&self) -> &'static str {
        match self {
            Self::DatabaseServer { .. } => "database-server",
            Self::Database { .. } => "database",
            Self::Project { .. } => "project",
            Self::Custom(_) => "custom",
        }
    }
}

impl fmt::Debug for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DatabaseServer { engine } => f
                .debug_struct("DatabaseServer")
                .field("engine", engine)
                .finish(),
            Self::Database {
                server,
                database_name,
            } => f
                .debug_struct("Database")
                .field("server", server)
                .field("database_name", database_name)
                .finish(),
            Self::Project { external_http } => f
                .debug_struct("Project")
                .field("external_http", external_http)
                .finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Values a resource publishes once provisioned (connection strings, URLs)
///
/// Shared between the declaration and the runtime: the runtime writes during
/// startup, deferred configuration values read after startup.
#[derive(Debug, Clone, Default)]
pub struct ResourceOutputs {
    values: Arc<RwLock<BTreeMap<String, String>>>,
}

impl ResourceOutputs {
    /// Create an empty output cell
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish (or replace) an output value
    pub fn publish<K: Into<String>, V: Into<String>>(&self, key: K, value: V) {
        let mut values = self
            .values
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        values.insert(key.into(), value.into());
    }

    /// Read a published output
    pub fn get(&self, key: &str) -> Option<String> {
        self.values
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Copy of every published output
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.values
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Forget everything published (the resource was released)
    pub fn clear(&self) {
        self.values
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clear();
    }
}

/// A named external dependency with its readiness target and startup hints
#[derive(Clone)]
pub struct ResourceDeclaration {
    name: String,
    kind: ResourceKind,
    ready_state: ResourceState,
    depends_on: Vec<String>,
    environment: Vec<Arc<dyn EnvironmentCallback>>,
    outputs: ResourceOutputs,
}

impl ResourceDeclaration {
    /// Declare a resource that is ready once `Running`
    pub fn new<S: Into<String>>(name: S, kind: ResourceKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ready_state: ResourceState::Running,
            depends_on: Vec::new(),
            environment: Vec::new(),
            outputs: ResourceOutputs::new(),
        }
    }

    /// Add a startup ordering edge
    pub fn with_dependency<S: Into<String>>(mut self, name: S) -> Self {
        let name = name.into();
        if !self.depends_on.contains(&name) {
            self.depends_on.push(name);
        }
        self
    }

    /// Attach a configuration-producing callback
    pub fn with_environment(mut self, callback: Arc<dyn EnvironmentCallback>) -> Self {
        self.environment.push(callback);
        self
    }

    /// Share an existing output cell (used when references were handed out before declaration)
    pub fn with_outputs(mut self, outputs: ResourceOutputs) -> Self {
        self.outputs = outputs;
        self
    }

    /// Resource name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resource kind
    pub fn kind(&self) -> &ResourceKind {
        &self.kind
    }

    /// State that counts as ready
    pub fn ready_state(&self) -> ResourceState {
        self.ready_state
    }

    /// Resources that must be ready before this one starts
    pub fn depends_on(&self) -> &[String] {
        &self.depends_on
    }

    /// Registered configuration callbacks, in registration order
    pub fn environment(&self) -> &[Arc<dyn EnvironmentCallback>] {
        &self.environment
    }

    /// Published outputs
    pub fn outputs(&self) -> &ResourceOutputs {
        &self.outputs
    }

    /// Whether the resource exposes a configuration surface at all
    pub fn supports_environment(&self) -> bool {
        matches!(
            self.kind,
            ResourceKind::Project { .. } | ResourceKind::Custom(_)
        )
    }

    /// Whether the resource is a service project
    pub fn is_project(&self) -> bool {
        matches!(self.kind, ResourceKind::Project { .. })
    }
}

impl fmt::Debug for ResourceDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceDeclaration")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("ready_state", &self.ready_state)
            .field("depends_on", &self.depends_on)
            .field("environment_callbacks", &self.environment.len())
            .finish_non_exhaustive()
    }
}

/// Ordered, validated set of resource declarations for one run
///
/// Names are unique, every `depends_on` edge points at a declared resource
/// and the dependency graph is acyclic. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct DeclarationSet {
    resources: Arc<Vec<Arc<ResourceDeclaration>>>,
    startup_order: Arc<Vec<String>>,
}

impl DeclarationSet {
    /// Validate and freeze a list of declarations
    pub fn new(declarations: Vec<ResourceDeclaration>) -> Result<Self> {
        let mut seen = HashSet::new();
        for declaration in &declarations {
            if declaration.name.is_empty() {
                return Err(Error::invalid_argument("Resource name cannot be empty"));
            }
            if !seen.insert(declaration.name.as_str()) {
                return Err(Error::invalid_argument(format!(
                    "Resource '{}' is declared more than once",
                    declaration.name
                )));
            }
        }

        for declaration in &declarations {
            for dependency in &declaration.depends_on {
                if !seen.contains(dependency.as_str()) {
                    return Err(Error::invalid_argument(format!(
                        "Resource '{}' depends on undeclared resource '{}'",
                        declaration.name, dependency
                    )));
                }
            }
        }

        let startup_order = topological_order(&declarations)?;

        Ok(Self {
            resources: Arc::new(declarations.into_iter().map(Arc::new).collect()),
            startup_order: Arc::new(startup_order),
        })
    }

    /// Look up a declaration by name
    pub fn get(&self, name: &str) -> Option<&Arc<ResourceDeclaration>> {
        self.resources.iter().find(|r| r.name == name)
    }

    /// Whether a resource with this name is declared
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Declarations in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ResourceDeclaration>> {
        self.resources.iter()
    }

    /// Names in declaration order
    pub fn names(&self) -> Vec<String> {
        self.resources.iter().map(|r| r.name.clone()).collect()
    }

    /// Names ordered so that every resource comes after its dependencies
    pub fn startup_order(&self) -> &[String] {
        &self.startup_order
    }

    /// Number of declared resources
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether nothing is declared
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// Kahn's algorithm, stable with respect to declaration order
fn topological_order(declarations: &[ResourceDeclaration]) -> Result<Vec<String>> {
    let mut remaining: HashMap<&str, usize> = declarations
        .iter()
        .map(|d| (d.name.as_str(), d.depends_on.len()))
        .collect();
    let mut order = Vec::with_capacity(declarations.len());

    while order.len() < declarations.len() {
        let next = declarations
            .iter()
            .find(|d| remaining.get(d.name.as_str()) == Some(&0))
            .map(|d| d.name.as_str());

        let Some(name) = next else {
            let mut cyclic: Vec<&str> = remaining.keys().copied().collect();
            cyclic.sort_unstable();
            return Err(Error::invalid_argument(format!(
                "Dependency cycle between resources: {}",
                cyclic.join(", ")
            )));
        };

        remaining.remove(name);
        for declaration in declarations {
            if declaration.depends_on.iter().any(|d| d == name) {
                if let Some(count) = remaining.get_mut(declaration.name.as_str()) {
                    *count -= 1;
                }
            }
        }
        order.push(name.to_string());
    }

    Ok(order)
}
