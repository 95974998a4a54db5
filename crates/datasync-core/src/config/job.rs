//! Job configuration: which reader feeds which writer, and how wide.

use serde::{Deserialize, Serialize};

use crate::types::configuration::Configuration;

/// One side of a job: a plugin name plus its job parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobStepConfig {
    /// Plugin name, looked up under `plugin.<type>.<name>`.
    pub name: String,
    /// Parameters handed to the plugin's Job instance.
    #[serde(default)]
    pub parameter: Configuration,
}

/// A single reader → writer transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    /// Desired number of parallel task pairs.
    #[serde(default = "default_channel")]
    pub channel: usize,
    /// Capacity of each reader → writer record channel.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
    /// Source side.
    pub reader: JobStepConfig,
    /// Sink side.
    pub writer: JobStepConfig,
}

fn default_channel() -> usize {
    1
}

fn default_buffer_size() -> usize {
    1024
}
