//! Unified application error types for DataSync.
//!
//! Every failure raised while resolving, instantiating, or running a plugin
//! is an [`AppError`]. The [`ErrorKind`] carries a stable framework code so
//! the enclosing job can report it without inspecting messages.

use std::fmt;
use thiserror::Error;

/// Error category with a stable framework code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// No registry entry exists for the requested plugin key.
    ConfigurationMissing,
    /// A registry entry exists but lacks a required field such as `class`.
    MalformedPluginConfig,
    /// The implementation symbol could not be resolved to a usable plugin type.
    PluginLoad,
    /// The resolved factory failed to construct an instance.
    RuntimeInstantiation,
    /// A runner was requested for a plugin type that has no runner mapping.
    UnsupportedPluginType,
    /// The application configuration could not be loaded.
    Configuration,
    /// A plugin lifecycle hook reported a failure.
    PluginRuntime,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal error occurred.
    Internal,
}

impl ErrorKind {
    /// Framework error code reported to the user.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Configuration => "Framework-02",
            Self::ConfigurationMissing => "Framework-12",
            Self::MalformedPluginConfig => "Framework-13",
            Self::PluginLoad => "Framework-14",
            Self::RuntimeInstantiation => "Framework-15",
            Self::UnsupportedPluginType => "Framework-16",
            Self::PluginRuntime => "Framework-20",
            Self::Serialization => "Framework-30",
            Self::Internal => "Framework-99",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigurationMissing => write!(f, "CONFIGURATION_MISSING"),
            Self::MalformedPluginConfig => write!(f, "MALFORMED_PLUGIN_CONFIG"),
            Self::PluginLoad => write!(f, "PLUGIN_LOAD"),
            Self::RuntimeInstantiation => write!(f, "RUNTIME_INSTANTIATION"),
            Self::UnsupportedPluginType => write!(f, "UNSUPPORTED_PLUGIN_TYPE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::PluginRuntime => write!(f, "PLUGIN_RUNTIME"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout DataSync.
#[derive(Debug, Error)]
#[error("[{}] {kind}: {message}", .kind.code())]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a configuration-missing error.
    pub fn configuration_missing(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigurationMissing, message)
    }

    /// Create a malformed-plugin-config error.
    pub fn malformed_plugin_config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedPluginConfig, message)
    }

    /// Create a plugin load error.
    pub fn plugin_load(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PluginLoad, message)
    }

    /// Create an unsupported-plugin-type error.
    pub fn unsupported_plugin_type(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnsupportedPluginType, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create a plugin runtime error.
    pub fn plugin_runtime(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PluginRuntime, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Re-wrap this error under a new kind, keeping it as the cause.
    pub fn wrap(self, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::with_source(kind, message, self)
    }

    /// Returns the framework code of this error.
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Internal, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
