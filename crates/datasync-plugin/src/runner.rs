//! Task runners — uniform execution shells around Task-context instances.
//!
//! A [`ReaderRunner`] produces records into a sender, a [`WriterRunner`]
//! consumes them from a receiver. Both drive the full task lifecycle
//! (init, prepare, transfer, post) and always call `destroy` afterwards.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use datasync_core::error::AppError;
use datasync_core::result::AppResult;
use datasync_core::traits::{PluginContext, ReaderTask, RecordReceiver, RecordSender, WriterTask};
use datasync_core::types::{Configuration, PluginKey, PluginType, Record};

use crate::loader::{PluginLoader, TaskInstance};

/// Outcome of one successful task run.
#[derive(Debug, Clone, Serialize)]
pub struct TransferReport {
    /// Plugin that ran.
    pub key: PluginKey,
    /// Records sent (reader) or received (writer).
    pub records: u64,
    /// Wall time of the whole lifecycle.
    pub elapsed: Duration,
}

/// Producer-side runner.
pub struct ReaderRunner {
    ctx: PluginContext,
    task: Box<dyn ReaderTask>,
}

impl ReaderRunner {
    /// Plugin identity.
    pub fn key(&self) -> &PluginKey {
        &self.ctx.key
    }

    /// Unique instance identifier of the wrapped task.
    pub fn instance_id(&self) -> Uuid {
        self.ctx.instance_id
    }

    /// The wrapped task's registry subtree.
    pub fn plugin_conf(&self) -> &Configuration {
        &self.ctx.plugin_conf
    }

    /// Sets the task parameters for this run.
    pub fn set_job_conf(&mut self, conf: Configuration) {
        self.ctx.job_conf = conf;
    }

    /// Runs the reader task, pushing every record into `sender`.
    pub async fn produce(&mut self, sender: &mut dyn RecordSender) -> AppResult<TransferReport> {
        let started = Instant::now();
        info!(plugin = %self.ctx.key, instance = %self.ctx.instance_id, "Reader task starting");

        let mut counting = CountingSender {
            inner: sender,
            records: 0,
        };
        let outcome = self.run_phases(&mut counting).await;
        let records = counting.records;
        let destroyed = self.task.destroy().await;

        finish(&self.ctx, outcome, destroyed, records, started)
    }

    async fn run_phases(&mut self, sender: &mut CountingSender<'_>) -> AppResult<()> {
        debug!(plugin = %self.ctx.key, "Reader task init");
        self.task.init(&self.ctx).await?;
        debug!(plugin = %self.ctx.key, "Reader task prepare");
        self.task.prepare().await?;
        debug!(plugin = %self.ctx.key, "Reader task start_read");
        self.task.start_read(sender).await?;
        sender.flush().await?;
        sender.terminate().await?;
        debug!(plugin = %self.ctx.key, "Reader task post");
        self.task.post().await
    }
}

/// Consumer-side runner.
pub struct WriterRunner {
    ctx: PluginContext,
    task: Box<dyn WriterTask>,
}

impl WriterRunner {
    /// Plugin identity.
    pub fn key(&self) -> &PluginKey {
        &self.ctx.key
    }

    /// Unique instance identifier of the wrapped task.
    pub fn instance_id(&self) -> Uuid {
        self.ctx.instance_id
    }

    /// The wrapped task's registry subtree.
    pub fn plugin_conf(&self) -> &Configuration {
        &self.ctx.plugin_conf
    }

    /// Sets the task parameters for this run.
    pub fn set_job_conf(&mut self, conf: Configuration) {
        self.ctx.job_conf = conf;
    }

    /// Runs the writer task, draining `receiver`.
    pub async fn consume(
        &mut self,
        receiver: &mut dyn RecordReceiver,
    ) -> AppResult<TransferReport> {
        let started = Instant::now();
        info!(plugin = %self.ctx.key, instance = %self.ctx.instance_id, "Writer task starting");

        let mut counting = CountingReceiver {
            inner: receiver,
            records: 0,
        };
        let outcome = self.run_phases(&mut counting).await;
        let records = counting.records;
        let destroyed = self.task.destroy().await;

        finish(&self.ctx, outcome, destroyed, records, started)
    }

    async fn run_phases(&mut self, receiver: &mut CountingReceiver<'_>) -> AppResult<()> {
        debug!(plugin = %self.ctx.key, "Writer task init");
        self.task.init(&self.ctx).await?;
        debug!(plugin = %self.ctx.key, "Writer task prepare");
        self.task.prepare().await?;
        debug!(plugin = %self.ctx.key, "Writer task start_write");
        self.task.start_write(receiver).await?;
        debug!(plugin = %self.ctx.key, "Writer task post");
        self.task.post().await
    }
}

/// A direction-typed runner handed to the scheduler.
pub enum Runner {
    /// Produces records.
    Reader(ReaderRunner),
    /// Consumes records.
    Writer(WriterRunner),
}

impl Runner {
    /// Plugin identity.
    pub fn key(&self) -> &PluginKey {
        match self {
            Self::Reader(runner) => runner.key(),
            Self::Writer(runner) => runner.key(),
        }
    }

    /// Direction of the runner.
    pub fn plugin_type(&self) -> PluginType {
        match self {
            Self::Reader(_) => PluginType::Reader,
            Self::Writer(_) => PluginType::Writer,
        }
    }

    /// Sets the task parameters for this run.
    pub fn set_job_conf(&mut self, conf: Configuration) {
        match self {
            Self::Reader(runner) => runner.set_job_conf(conf),
            Self::Writer(runner) => runner.set_job_conf(conf),
        }
    }

    /// Unwraps a producer runner.
    pub fn into_reader(self) -> AppResult<ReaderRunner> {
        match self {
            Self::Reader(runner) => Ok(runner),
            Self::Writer(runner) => Err(AppError::internal(format!(
                "Runner for [{}] is a consumer, not a producer",
                runner.key()
            ))),
        }
    }

    /// Unwraps a consumer runner.
    pub fn into_writer(self) -> AppResult<WriterRunner> {
        match self {
            Self::Writer(runner) => Ok(runner),
            Self::Reader(runner) => Err(AppError::internal(format!(
                "Runner for [{}] is a producer, not a consumer",
                runner.key()
            ))),
        }
    }
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("key", self.key())
            .field("plugin_type", &self.plugin_type())
            .finish()
    }
}

/// Builds runners from Task-context plugin instances.
#[derive(Debug, Clone)]
pub struct RunnerFactory {
    loader: Arc<PluginLoader>,
}

impl RunnerFactory {
    /// Creates a factory over `loader`.
    pub fn new(loader: Arc<PluginLoader>) -> Self {
        Self { loader }
    }

    /// Loads a fresh Task-context instance of `(plugin_type, name)` and wraps
    /// it in the runner matching its type.
    pub fn create_runner(&self, plugin_type: PluginType, name: &str) -> AppResult<Runner> {
        if !matches!(plugin_type, PluginType::Reader | PluginType::Writer) {
            return Err(AppError::unsupported_plugin_type(format!(
                "Plugin [{}] must be a reader or a writer to run, got {plugin_type}",
                PluginKey::new(plugin_type, name)
            )));
        }

        let (ctx, instance) = self.loader.load_task_plugin(plugin_type, name)?.into_parts();
        match (plugin_type, instance) {
            (PluginType::Reader, TaskInstance::Reader(task)) => {
                Ok(Runner::Reader(ReaderRunner { ctx, task }))
            }
            (PluginType::Writer, TaskInstance::Writer(task)) => {
                Ok(Runner::Writer(WriterRunner { ctx, task }))
            }
            (expected, instance) => Err(AppError::plugin_load(format!(
                "Plugin [{}] resolved to a {} task but a {expected} was requested",
                ctx.key,
                instance.direction()
            ))),
        }
    }
}

struct CountingSender<'a> {
    inner: &'a mut dyn RecordSender,
    records: u64,
}

#[async_trait]
impl RecordSender for CountingSender<'_> {
    async fn send_record(&mut self, record: Record) -> AppResult<()> {
        self.inner.send_record(record).await?;
        self.records += 1;
        Ok(())
    }

    async fn flush(&mut self) -> AppResult<()> {
        self.inner.flush().await
    }

    async fn terminate(&mut self) -> AppResult<()> {
        self.inner.terminate().await
    }
}

struct CountingReceiver<'a> {
    inner: &'a mut dyn RecordReceiver,
    records: u64,
}

#[async_trait]
impl RecordReceiver for CountingReceiver<'_> {
    async fn receive_record(&mut self) -> AppResult<Option<Record>> {
        let record = self.inner.receive_record().await?;
        if record.is_some() {
            self.records += 1;
        }
        Ok(record)
    }
}

fn finish(
    ctx: &PluginContext,
    outcome: AppResult<()>,
    destroyed: AppResult<()>,
    records: u64,
    started: Instant,
) -> AppResult<TransferReport> {
    match (outcome, destroyed) {
        (Ok(()), Ok(())) => {
            let report = TransferReport {
                key: ctx.key.clone(),
                records,
                elapsed: started.elapsed(),
            };
            info!(
                plugin = %ctx.key,
                instance = %ctx.instance_id,
                records = report.records,
                elapsed_ms = report.elapsed.as_millis() as u64,
                "Task finished"
            );
            Ok(report)
        }
        (Err(e), destroyed) => {
            error!(plugin = %ctx.key, instance = %ctx.instance_id, error = %e, "Task failed");
            if let Err(d) = destroyed {
                warn!(plugin = %ctx.key, error = %d, "Task destroy returned error");
            }
            Err(e)
        }
        (Ok(()), Err(d)) => {
            error!(plugin = %ctx.key, instance = %ctx.instance_id, error = %d, "Task destroy failed");
            Err(d)
        }
    }
}
