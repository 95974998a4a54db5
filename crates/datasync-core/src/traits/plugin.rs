//! Plugin lifecycle traits.
//!
//! Every plugin ships two cooperating implementations sharing one base
//! identity: a [`JobPlugin`] that runs once per job (setup, split, teardown)
//! and a task implementation that runs once per worker and moves records.
//! Readers implement [`ReaderTask`], writers implement [`WriterTask`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::result::AppResult;
use crate::traits::channel::{RecordReceiver, RecordSender};
use crate::types::configuration::Configuration;
use crate::types::plugin_type::{ExecutionContext, PluginKey, PluginType};

/// Everything a plugin instance learns about itself when it is initialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginContext {
    /// Plugin identity.
    pub key: PluginKey,
    /// Context the instance was resolved for.
    pub execution_context: ExecutionContext,
    /// Unique per-instance identifier.
    pub instance_id: Uuid,
    /// The plugin's registry subtree, passed through unmodified.
    pub plugin_conf: Configuration,
    /// Job (or split task) parameters for this instance.
    pub job_conf: Configuration,
}

impl PluginContext {
    /// Creates a context for a freshly constructed instance.
    pub fn new(
        key: PluginKey,
        execution_context: ExecutionContext,
        plugin_conf: Configuration,
    ) -> Self {
        Self {
            key,
            execution_context,
            instance_id: Uuid::new_v4(),
            plugin_conf,
            job_conf: Configuration::new(),
        }
    }

    /// Plugin name.
    pub fn plugin_name(&self) -> &str {
        &self.key.name
    }

    /// Plugin type.
    pub fn plugin_type(&self) -> PluginType {
        self.key.plugin_type
    }
}

/// Job-context implementation: one-time orchestration logic.
#[async_trait]
pub trait JobPlugin: Send + Sync {
    /// Called once before anything else.
    async fn init(&mut self, ctx: &PluginContext) -> AppResult<()>;

    /// Global preparation (e.g. truncating a target table).
    async fn prepare(&mut self) -> AppResult<()> {
        Ok(())
    }

    /// Splits the job into task parameter documents.
    ///
    /// `advice_number` is the desired degree of parallelism; plugins may
    /// return fewer or more slices.
    async fn split(&mut self, advice_number: usize) -> AppResult<Vec<Configuration>>;

    /// Global post-processing after all tasks have finished.
    async fn post(&mut self) -> AppResult<()> {
        Ok(())
    }

    /// Releases resources. Called even if an earlier phase failed.
    async fn destroy(&mut self) -> AppResult<()>;
}

/// Task-context implementation of a reader.
#[async_trait]
pub trait ReaderTask: Send + Sync {
    /// Called once before the transfer.
    async fn init(&mut self, ctx: &PluginContext) -> AppResult<()>;

    /// Per-task preparation.
    async fn prepare(&mut self) -> AppResult<()> {
        Ok(())
    }

    /// Reads records from the source and pushes them into `sender`.
    async fn start_read(&mut self, sender: &mut dyn RecordSender) -> AppResult<()>;

    /// Per-task post-processing.
    async fn post(&mut self) -> AppResult<()> {
        Ok(())
    }

    /// Releases resources. Called even if an earlier phase failed.
    async fn destroy(&mut self) -> AppResult<()>;
}

/// Task-context implementation of a writer.
#[async_trait]
pub trait WriterTask: Send + Sync {
    /// Called once before the transfer.
    async fn init(&mut self, ctx: &PluginContext) -> AppResult<()>;

    /// Per-task preparation.
    async fn prepare(&mut self) -> AppResult<()> {
        Ok(())
    }

    /// Drains `receiver` and writes every record to the sink.
    async fn start_write(&mut self, receiver: &mut dyn RecordReceiver) -> AppResult<()>;

    /// Per-task post-processing.
    async fn post(&mut self) -> AppResult<()> {
        Ok(())
    }

    /// Releases resources. Called even if an earlier phase failed.
    async fn destroy(&mut self) -> AppResult<()>;
}
