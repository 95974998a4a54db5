//! Application configuration schemas.
//!
//! The configuration file is deserialized via the `config` crate. Besides
//! the `logging` and `job` sections it carries the `plugin` tree that seeds
//! the plugin registry.

pub mod job;
pub mod logging;

use serde::{Deserialize, Serialize};

use self::job::JobConfig;
use self::logging::LoggingConfig;

use crate::error::AppError;
use crate::types::configuration::Configuration;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// The job to run, if any.
    #[serde(default)]
    pub job: Option<JobConfig>,
    /// Declared plugins, keyed `<type>.<name>`.
    #[serde(default)]
    pub plugin: Configuration,
}

impl AppConfig {
    /// Load configuration from a file.
    ///
    /// The file format is inferred from its extension. Environment variables
    /// prefixed with `DATASYNC__` override file values (`DATASYNC__LOGGING__LEVEL`).
    pub fn load(path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(
                config::Environment::with_prefix("DATASYNC")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| {
                AppError::with_source(
                    crate::error::ErrorKind::Configuration,
                    format!("Failed to build config from '{path}'"),
                    e,
                )
            })?;

        config.try_deserialize().map_err(|e| {
            AppError::with_source(
                crate::error::ErrorKind::Configuration,
                format!("Failed to deserialize config from '{path}'"),
                e,
            )
        })
    }

    /// The registry input document: the `plugin` section re-rooted under `plugin`.
    pub fn registry_document(&self) -> Configuration {
        let mut doc = Configuration::new();
        doc.set("plugin", self.plugin.clone().into_value());
        doc
    }
}
