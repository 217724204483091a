//! Configuration Harvester Use Case
//!
//! Collects the configuration the orchestrator would have injected into the
//! subject resource, resolving deferred values against the running runtime.

use std::sync::Arc;
use tracing::{debug, info};
use whh_domain::constants::SUBJECT_BIND_URL_KEY;
use whh_domain::error::{Error, Result};
use whh_domain::ports::{EnvironmentContext, OrchestratedRuntime};
use whh_domain::value_objects::{
    ConfigEntry, ConfigSnapshot, ConfigValue, ResourceDeclaration, normalize_key,
};

/// Builds a [`ConfigSnapshot`] for one declared resource
#[derive(Clone)]
pub struct ConfigHarvester {
    runtime: Arc<dyn OrchestratedRuntime>,
}

impl ConfigHarvester {
    /// Create a harvester over a started runtime
    pub fn new(runtime: Arc<dyn OrchestratedRuntime>) -> Self {
        Self { runtime }
    }

    /// Keys a subject should never receive from its orchestrator
    ///
    /// A project's own bind URL belongs to the orchestrator's process model;
    /// the subject host binds wherever it likes.
    pub fn default_exclusions(declaration: &ResourceDeclaration) -> Vec<String> {
        if declaration.is_project() {
            vec![SUBJECT_BIND_URL_KEY.to_string()]
        } else {
            Vec::new()
        }
    }

    /// Harvest and freeze the subject's configuration
    ///
    /// # Errors
    /// - `ResourceNotFound` if `subject` is not declared
    /// - `ValueResolution` if a deferred value fails to resolve
    pub async fn harvest(&self, subject: &str, exclude_keys: &[String]) -> Result<ConfigSnapshot> {
        let entries = self.harvest_entries(subject, exclude_keys).await?;
        let snapshot: ConfigSnapshot = entries
            .into_iter()
            .filter_map(|entry| entry.value.map(|value| (entry.key, value)))
            .collect();
        info!(
            resource = %subject,
            keys = snapshot.len(),
            "Harvested subject configuration"
        );
        Ok(snapshot)
    }

    /// Harvest entries in emission order, keeping explicit nulls as `None`
    pub async fn harvest_entries(
        &self,
        subject: &str,
        exclude_keys: &[String],
    ) -> Result<Vec<ConfigEntry>> {
        let declaration = self
            .runtime
            .declarations()
            .and_then(|set| set.get(subject).cloned())
            .ok_or_else(|| Error::resource_not_found(subject))?;

        if !declaration.supports_environment() {
            debug!(
                resource = %subject,
                kind = declaration.kind().label(),
                "Resource has no environment surface"
            );
            return Ok(Vec::new());
        }

        let excluded: Vec<String> = exclude_keys.iter().map(|k| normalize_key(k)).collect();
        let context = EnvironmentContext {
            resource: subject.to_string(),
            runtime: Arc::clone(&self.runtime),
        };

        let mut entries = Vec::new();
        for callback in declaration.environment() {
            for (raw_key, value) in callback.environment(&context).await? {
                let key = normalize_key(&raw_key);
                if is_excluded(&key, &excluded) {
                    debug!(resource = %subject, key = %key, "Skipping excluded key");
                    continue;
                }

                let value = match value {
                    ConfigValue::Literal(value) => Some(value),
                    ConfigValue::Deferred(provider) => Some(
                        provider
                            .resolve()
                            .await
                            .map_err(|e| Error::value_resolution(key.clone(), e))?,
                    ),
                    ConfigValue::Null => None,
                };
                entries.push(ConfigEntry { key, value });
            }
        }

        Ok(entries)
    }
}

fn is_excluded(key: &str, excluded: &[String]) -> bool {
    excluded.iter().any(|k| k.eq_ignore_ascii_case(key))
}

impl std::fmt::Debug for ConfigHarvester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigHarvester")
            .field("runtime", &self.runtime.runtime_name())
            .finish()
    }
}
