//! Configuration loader
//!
//! Handles loading configuration from various sources including
//! TOML files, environment variables, default values and extra providers
//! such as the harvested snapshot.

use crate::config::case::LowercaseKeys;
use crate::constants::{DEFAULT_CONFIG_DIR, ENV_NESTED_SEPARATOR};
use crate::error_ext::ErrorContext;
use crate::logging::log_config_loaded;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::{Figment, Provider};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::env;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use validator::Validate;
use whh_domain::error::{Error, Result};

/// A configuration type the loader knows how to find
pub trait ConfigSection:
    Default + Serialize + DeserializeOwned + Validate + Send + Sync + 'static
{
    /// Environment variable prefix, without the trailing separator
    const ENV_PREFIX: &'static str;

    /// Default TOML file name
    const FILE_NAME: &'static str;
}

/// Configuration loader service
pub struct ConfigLoader<T> {
    /// Configuration file path
    config_path: Option<PathBuf>,

    /// Environment prefix
    env_prefix: String,

    /// Providers merged after the environment, in order
    sources: Vec<Figment>,

    _section: PhantomData<fn() -> T>,
}

impl<T: ConfigSection> ConfigLoader<T> {
    /// Create a new configuration loader with default settings
    pub fn new() -> Self {
        Self {
            config_path: None,
            env_prefix: T::ENV_PREFIX.to_string(),
            sources: Vec::new(),
            _section: PhantomData,
        }
    }

    /// Set the configuration file path
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the environment variable prefix
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Append a provider that overrides every source added before it
    pub fn with_source<P: Provider>(mut self, provider: P) -> Self {
        self.sources.push(Figment::from(provider));
        self
    }

    /// Get the current configuration file path
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Load configuration from all sources
    ///
    /// Configuration sources are merged in this order (later sources override earlier):
    /// 1. Default values from `T::default()`
    /// 2. TOML configuration file (explicit path, else the first default location found)
    /// 3. Environment variables with prefix (e.g., `WHH__READINESS__TIMEOUT_SECS`)
    /// 4. Providers added with [`with_source`](Self::with_source)
    pub fn load(&self) -> Result<T> {
        let config: T = self
            .figment()
            .extract()
            .config_context("Failed to extract configuration")?;

        config.validate().map_err(|e| {
            Error::configuration_with_source(format!("Invalid configuration: {e}"), e)
        })?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, config: &T, path: P) -> Result<()> {
        let toml_string =
            toml::to_string_pretty(config).config_context("Failed to serialize config to TOML")?;

        std::fs::write(path.as_ref(), toml_string)
            .with_context(|| format!("Failed to write {}", path.as_ref().display()))?;

        Ok(())
    }

    fn figment(&self) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(T::default()));

        match &self.config_path {
            Some(config_path) if config_path.exists() => {
                figment = figment.merge(LowercaseKeys::new(Toml::file(config_path)));
                log_config_loaded(config_path, true);
            }
            Some(config_path) => log_config_loaded(config_path, false),
            None => {
                if let Some(default_path) = Self::find_default_config_path() {
                    figment = figment.merge(LowercaseKeys::new(Toml::file(&default_path)));
                    log_config_loaded(&default_path, true);
                }
            }
        }

        // Double underscore separates nested keys (e.g. WEATHER__DATABASE__NAME)
        figment = figment.merge(
            Env::prefixed(&format!("{}{ENV_NESTED_SEPARATOR}", self.env_prefix))
                .split(ENV_NESTED_SEPARATOR),
        );

        for source in &self.sources {
            figment = figment.merge(source.clone());
        }

        figment
    }

    fn find_default_config_path() -> Option<PathBuf> {
        let current_dir = env::current_dir().ok()?;

        let candidates = [
            Some(current_dir.join(T::FILE_NAME)),
            Some(current_dir.join(DEFAULT_CONFIG_DIR).join(T::FILE_NAME)),
            dirs::config_dir().map(|d| d.join(DEFAULT_CONFIG_DIR).join(T::FILE_NAME)),
        ];

        candidates.into_iter().flatten().find(|path| path.exists())
    }
}

impl<T: ConfigSection> Default for ConfigLoader<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ConfigLoader<T> {
    fn clone(&self) -> Self {
        Self {
            config_path: self.config_path.clone(),
            env_prefix: self.env_prefix.clone(),
            sources: self.sources.clone(),
            _section: PhantomData,
        }
    }
}
