//! App host builder

use crate::apphost::references::{OutputReference, ReferenceKind, ResourceRef, StaticEnvironment};
use std::sync::Arc;
use whh_domain::constants::{
    CONNECTION_STRINGS_ENV_PREFIX, NESTED_KEY_SEPARATOR, OUTPUT_URL, SERVER_URLS_ENV_KEY,
    SERVICES_ENV_PREFIX,
};
use whh_domain::error::{Error, Result};
use whh_domain::ports::{EnvironmentCallback, EnvironmentVariables, ResourceLauncher};
use whh_domain::value_objects::{
    ConfigValue, DatabaseEngine, DeclarationSet, ResourceDeclaration, ResourceKind,
    ResourceOutputs,
};

struct PendingResource {
    name: String,
    kind: ResourceKind,
    reference_kind: ReferenceKind,
    depends_on: Vec<String>,
    environment: Vec<Arc<dyn EnvironmentCallback>>,
    outputs: ResourceOutputs,
}

impl PendingResource {
    fn into_declaration(self) -> ResourceDeclaration {
        let declaration = ResourceDeclaration::new(self.name, self.kind).with_outputs(self.outputs);
        let declaration = self
            .depends_on
            .into_iter()
            .fold(declaration, ResourceDeclaration::with_dependency);
        self.environment
            .into_iter()
            .fold(declaration, ResourceDeclaration::with_environment)
    }
}

/// Collects resource declarations for one run
///
/// Misuse (referencing a non-server as a server, environment on a resource
/// that has none) is recorded and reported by [`AppHostBuilder::build`].
#[derive(Default)]
pub struct AppHostBuilder {
    resources: Vec<PendingResource>,
    errors: Vec<String>,
}

impl AppHostBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a database server
    pub fn add_database_server<S: Into<String>>(
        &mut self,
        name: S,
        engine: DatabaseEngine,
    ) -> ResourceBuilder<'_> {
        self.push(
            name.into(),
            ResourceKind::DatabaseServer { engine },
            ReferenceKind::DatabaseServer,
        )
    }

    /// Declare a database on a previously declared server
    ///
    /// The database depends on its server.
    pub fn add_database<S: Into<String>>(
        &mut self,
        server: &ResourceRef,
        name: S,
    ) -> ResourceBuilder<'_> {
        let name = name.into();
        if server.kind() != ReferenceKind::DatabaseServer {
            self.errors.push(format!(
                "Database '{}' must be hosted on a database server, '{}' is {:?}",
                name,
                server.name(),
                server.kind()
            ));
        }
        let kind = ResourceKind::Database {
            server: server.name().to_string(),
            database_name: name.clone(),
        };
        self.push(name, kind, ReferenceKind::Database)
            .wait_for(server)
    }

    /// Declare a service project
    ///
    /// The project receives its own bind URL as `SERVER__URLS`.
    pub fn add_project<S: Into<String>>(&mut self, name: S) -> ResourceBuilder<'_> {
        let name = name.into();
        let builder = self.push(
            name,
            ResourceKind::Project {
                external_http: false,
            },
            ReferenceKind::Project,
        );
        let own_url =
            OutputReference::new(builder.name().to_string(), OUTPUT_URL, builder.outputs());
        builder.push_environment(vec![(
            SERVER_URLS_ENV_KEY.to_string(),
            ConfigValue::Deferred(Arc::new(own_url)),
        )])
    }

    /// Declare a resource provisioned by its own launcher
    pub fn add_resource<S: Into<String>>(
        &mut self,
        name: S,
        launcher: Arc<dyn ResourceLauncher>,
    ) -> ResourceBuilder<'_> {
        self.push(name.into(), ResourceKind::Custom(launcher), ReferenceKind::Custom)
    }

    /// Validate and freeze the declarations
    ///
    /// # Errors
    /// `InvalidArgument` for misuse recorded while declaring, duplicate
    /// names, unknown dependencies or dependency cycles.
    pub fn build(self) -> Result<DeclarationSet> {
        if !self.errors.is_empty() {
            return Err(Error::invalid_argument(self.errors.join("; ")));
        }
        DeclarationSet::new(
            self.resources
                .into_iter()
                .map(PendingResource::into_declaration)
                .collect(),
        )
    }

    fn push(
        &mut self,
        name: String,
        kind: ResourceKind,
        reference_kind: ReferenceKind,
    ) -> ResourceBuilder<'_> {
        self.resources.push(PendingResource {
            name,
            kind,
            reference_kind,
            depends_on: Vec::new(),
            environment: Vec::new(),
            outputs: ResourceOutputs::new(),
        });
        let index = self.resources.len() - 1;
        ResourceBuilder { host: self, index }
    }
}

/// Fluent configuration of the resource just declared
pub struct ResourceBuilder<'a> {
    host: &'a mut AppHostBuilder,
    index: usize,
}

impl ResourceBuilder<'_> {
    /// Inject the referenced resource's connection string or URL
    ///
    /// Databases, servers and custom resources become
    /// `CONNECTION_STRINGS__<name>`; projects become `SERVICES__<name>__URL`.
    pub fn with_reference(self, reference: &ResourceRef) -> Self {
        let key = match reference.kind() {
            ReferenceKind::Project => [SERVICES_ENV_PREFIX, reference.name(), "URL"]
                .join(NESTED_KEY_SEPARATOR),
            _ => [CONNECTION_STRINGS_ENV_PREFIX, reference.name()].join(NESTED_KEY_SEPARATOR),
        };
        let value = ConfigValue::Deferred(Arc::new(reference.output()));
        self.push_environment(vec![(key, value)])
    }

    /// Start only after the referenced resource is running
    pub fn wait_for(mut self, reference: &ResourceRef) -> Self {
        let name = reference.name().to_string();
        let pending = self.pending();
        if !pending.depends_on.contains(&name) {
            pending.depends_on.push(name);
        }
        self
    }

    /// Add one environment entry
    pub fn with_environment<K: Into<String>, V: Into<ConfigValue>>(self, key: K, value: V) -> Self {
        self.push_environment(vec![(key.into(), value.into())])
    }

    /// Add a callback that produces environment entries once the runtime is up
    pub fn with_environment_callback(mut self, callback: Arc<dyn EnvironmentCallback>) -> Self {
        if self.accepts_environment() {
            self.pending().environment.push(callback);
        }
        self
    }

    /// Bind the project on all interfaces
    pub fn with_external_http_endpoints(mut self) -> Self {
        let pending = self.pending();
        if let ResourceKind::Project { external_http } = &mut pending.kind {
            *external_http = true;
        } else {
            let message = format!(
                "Resource '{}' is not a project and has no HTTP endpoints",
                pending.name
            );
            self.host.errors.push(message);
        }
        self
    }

    /// Handle other resources can reference
    pub fn reference(&self) -> ResourceRef {
        let pending = &self.host.resources[self.index];
        ResourceRef::new(
            pending.name.clone(),
            pending.reference_kind,
            pending.outputs.clone(),
        )
    }

    /// Name of the resource being configured
    pub fn name(&self) -> &str {
        &self.host.resources[self.index].name
    }

    fn outputs(&self) -> ResourceOutputs {
        self.host.resources[self.index].outputs.clone()
    }

    fn pending(&mut self) -> &mut PendingResource {
        &mut self.host.resources[self.index]
    }

    fn accepts_environment(&mut self) -> bool {
        let pending = &self.host.resources[self.index];
        let accepts = matches!(
            pending.kind,
            ResourceKind::Project { .. } | ResourceKind::Custom(_)
        );
        if !accepts {
            let message = format!(
                "Resource '{}' ({}) does not accept environment variables",
                pending.name,
                pending.kind.label()
            );
            self.host.errors.push(message);
        }
        accepts
    }

    fn push_environment(mut self, variables: EnvironmentVariables) -> Self {
        if self.accepts_environment() {
            self.pending()
                .environment
                .push(Arc::new(StaticEnvironment::new(variables)));
        }
        self
    }
}
