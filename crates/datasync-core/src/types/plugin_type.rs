//! Plugin identity types: plugin type, execution context, and composite key.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Kind of plugin declared in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginType {
    /// Source side: produces records.
    Reader,
    /// Sink side: consumes records.
    Writer,
    /// Record transformation stage. Declared only; no runner exists for it.
    Transformer,
}

impl PluginType {
    /// Returns the canonical lowercase name used in registry paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reader => "reader",
            Self::Writer => "writer",
            Self::Transformer => "transformer",
        }
    }

    /// All known plugin types.
    pub fn all() -> [PluginType; 3] {
        [Self::Reader, Self::Writer, Self::Transformer]
    }
}

impl fmt::Display for PluginType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PluginType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reader" => Ok(Self::Reader),
            "writer" => Ok(Self::Writer),
            "transformer" => Ok(Self::Transformer),
            other => Err(AppError::configuration(format!(
                "Unknown plugin type '{other}'"
            ))),
        }
    }
}

/// Which of the two cooperating implementations of a plugin to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExecutionContext {
    /// Orchestration-time: one-time setup, split, and teardown.
    Job,
    /// Execution-time: per-worker record transfer.
    Task,
}

impl ExecutionContext {
    /// Suffix appended to a base implementation symbol.
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Job => "Job",
            Self::Task => "Task",
        }
    }

    /// Derives the context-specific symbol for a base implementation symbol.
    pub fn derive_symbol(&self, base: &str) -> String {
        format!("{base}${}", self.suffix())
    }
}

impl fmt::Display for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Composite plugin identity: `(type, name)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PluginKey {
    /// Plugin type.
    pub plugin_type: PluginType,
    /// Plugin name, unique within its type.
    pub name: String,
}

impl PluginKey {
    /// Creates a new key.
    pub fn new(plugin_type: PluginType, name: impl Into<String>) -> Self {
        Self {
            plugin_type,
            name: name.into(),
        }
    }
}

impl fmt::Display for PluginKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.plugin_type, self.name)
    }
}
