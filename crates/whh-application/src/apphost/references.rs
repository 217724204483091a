//! References between declared resources

use async_trait::async_trait;
use whh_domain::constants::{OUTPUT_CONNECTION_STRING, OUTPUT_URL};
use whh_domain::error::{Error, Result};
use whh_domain::ports::{EnvironmentCallback, EnvironmentContext, EnvironmentVariables, ValueProvider};
use whh_domain::value_objects::ResourceOutputs;

/// Kind of resource a [`ResourceRef`] points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// Database server
    DatabaseServer,
    /// Database on a server
    Database,
    /// Service project
    Project,
    /// Custom launcher
    Custom,
}

impl ReferenceKind {
    /// Output the referencing resource receives
    pub fn output_key(&self) -> &'static str {
        match self {
            Self::Project => OUTPUT_URL,
            _ => OUTPUT_CONNECTION_STRING,
        }
    }
}

/// Cloneable handle to a declared resource
#[derive(Debug, Clone)]
pub struct ResourceRef {
    name: String,
    kind: ReferenceKind,
    outputs: ResourceOutputs,
}

impl ResourceRef {
    pub(crate) fn new(name: String, kind: ReferenceKind, outputs: ResourceOutputs) -> Self {
        Self {
            name,
            kind,
            outputs,
        }
    }

    /// Referenced resource name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Referenced resource kind
    pub fn kind(&self) -> ReferenceKind {
        self.kind
    }

    /// Outputs the runtime publishes for the referenced resource
    pub fn outputs(&self) -> &ResourceOutputs {
        &self.outputs
    }

    /// Deferred value reading the output a reference injects
    pub fn output(&self) -> OutputReference {
        OutputReference {
            resource: self.name.clone(),
            key: self.kind.output_key(),
            outputs: self.outputs.clone(),
        }
    }
}

/// Deferred value read from a resource's published outputs
#[derive(Debug, Clone)]
pub struct OutputReference {
    resource: String,
    key: &'static str,
    outputs: ResourceOutputs,
}

impl OutputReference {
    pub(crate) fn new(resource: String, key: &'static str, outputs: ResourceOutputs) -> Self {
        Self {
            resource,
            key,
            outputs,
        }
    }
}

#[async_trait]
impl ValueProvider for OutputReference {
    async fn resolve(&self) -> Result<String> {
        self.outputs.get(self.key).ok_or_else(|| {
            Error::not_found(format!(
                "output '{}' of resource '{}' (not published yet)",
                self.key, self.resource
            ))
        })
    }

    fn describe(&self) -> String {
        format!("{}.{}", self.resource, self.key)
    }
}

/// Environment known at declaration time (literals or output references)
pub struct StaticEnvironment {
    variables: EnvironmentVariables,
}

impl StaticEnvironment {
    /// Wrap a fixed list of entries
    pub fn new(variables: EnvironmentVariables) -> Self {
        Self { variables }
    }
}

#[async_trait]
impl EnvironmentCallback for StaticEnvironment {
    async fn environment(&self, _context: &EnvironmentContext) -> Result<EnvironmentVariables> {
        Ok(self.variables.clone())
    }
}
