//! Job container: drives Job-context plugins and schedules task runners.
//!
//! Lifecycle: init → prepare → split (reader first, writer matched to the
//! reader's slice count) → run task pairs → post. Both Job instances are
//! destroyed whether or not the run succeeded.

use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use datasync_core::config::job::JobConfig;
use datasync_core::error::AppError;
use datasync_core::types::{PluginType, Record};
use datasync_plugin::{JobPluginHandle, PluginManager, TransferReport};

/// Totals of a finished job.
#[derive(Debug, Clone, Serialize)]
pub struct JobSummary {
    /// Number of reader/writer task pairs that ran.
    pub tasks: usize,
    /// Records produced by all readers.
    pub records_read: u64,
    /// Records consumed by all writers.
    pub records_written: u64,
    /// Wall time of the whole job.
    pub elapsed: Duration,
}

/// Runs one configured job to completion.
pub struct JobContainer<'a> {
    manager: &'a PluginManager,
    config: &'a JobConfig,
}

impl<'a> JobContainer<'a> {
    /// Creates a container for `config`.
    pub fn new(manager: &'a PluginManager, config: &'a JobConfig) -> Self {
        Self { manager, config }
    }

    /// Runs the job.
    pub async fn start(&self) -> Result<JobSummary, AppError> {
        let started = Instant::now();
        info!(
            reader = %self.config.reader.name,
            writer = %self.config.writer.name,
            channel = self.config.channel,
            "Job starting"
        );

        let mut reader = self
            .manager
            .load_job_plugin(PluginType::Reader, &self.config.reader.name)?;
        let mut writer = self
            .manager
            .load_job_plugin(PluginType::Writer, &self.config.writer.name)?;
        reader.set_job_conf(self.config.reader.parameter.clone());
        writer.set_job_conf(self.config.writer.parameter.clone());

        let outcome = self.run_with(&mut reader, &mut writer).await;

        for handle in [&mut reader, &mut writer] {
            if let Err(e) = handle.destroy().await {
                warn!(plugin = %handle.key(), error = %e, "Job plugin destroy returned error");
            }
        }

        let (reports_read, reports_written) = outcome?;
        let summary = JobSummary {
            tasks: reports_read.len(),
            records_read: reports_read.iter().map(|r| r.records).sum(),
            records_written: reports_written.iter().map(|r| r.records).sum(),
            elapsed: started.elapsed(),
        };
        info!(
            tasks = summary.tasks,
            records_read = summary.records_read,
            records_written = summary.records_written,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "Job finished"
        );
        Ok(summary)
    }

    async fn run_with(
        &self,
        reader: &mut JobPluginHandle,
        writer: &mut JobPluginHandle,
    ) -> Result<(Vec<TransferReport>, Vec<TransferReport>), AppError> {
        reader.init().await?;
        writer.init().await?;
        reader.prepare().await?;
        writer.prepare().await?;

        let reader_slices = reader.split(self.config.channel.max(1)).await?;
        let writer_slices = writer.split(reader_slices.len()).await?;
        if reader_slices.len() != writer_slices.len() {
            return Err(AppError::plugin_runtime(format!(
                "Reader split into {} task(s) but writer split into {}",
                reader_slices.len(),
                writer_slices.len()
            )));
        }
        info!(tasks = reader_slices.len(), "Job split");

        // Every pair is created before any task starts, so a failed creation
        // leaves nothing running.
        let mut pairs = Vec::with_capacity(reader_slices.len());
        for (reader_conf, writer_conf) in reader_slices.into_iter().zip(writer_slices) {
            let mut producer = self
                .manager
                .create_runner(PluginType::Reader, &self.config.reader.name)?
                .into_reader()?;
            let mut consumer = self
                .manager
                .create_runner(PluginType::Writer, &self.config.writer.name)?
                .into_writer()?;
            producer.set_job_conf(reader_conf);
            consumer.set_job_conf(writer_conf);
            pairs.push((producer, consumer));
        }

        let mut handles = Vec::with_capacity(pairs.len() * 2);
        for (mut producer, mut consumer) in pairs {
            let (mut tx, mut rx) = mpsc::channel::<Record>(self.config.buffer_size.max(1));
            handles.push(tokio::spawn(async move { producer.produce(&mut tx).await }));
            handles.push(tokio::spawn(async move { consumer.consume(&mut rx).await }));
        }

        let mut read = Vec::new();
        let mut written = Vec::new();
        let mut first_error = None;
        for joined in futures::future::join_all(handles).await {
            let result = joined.map_err(|e| {
                AppError::with_source(
                    datasync_core::error::ErrorKind::Internal,
                    "Task panicked or was cancelled",
                    e,
                )
            });
            match result.and_then(|r| r) {
                Ok(report) if report.key.plugin_type == PluginType::Reader => read.push(report),
                Ok(report) => written.push(report),
                Err(e) => {
                    error!(error = %e, "Task failed");
                    first_error.get_or_insert(e);
                }
            }
        }
        if let Some(e) = first_error {
            return Err(e);
        }

        reader.post().await?;
        writer.post().await?;
        Ok((read, written))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::json;

    use datasync_core::config::job::JobStepConfig;
    use datasync_core::error::ErrorKind;
    use datasync_core::result::AppResult;
    use datasync_core::traits::{JobPlugin, PluginContext, ReaderTask, RecordSender, WriterTask};
    use datasync_core::types::Configuration;
    use datasync_plugin::{PluginCatalog, PluginEntry, PluginRegistry};
    use plugin_stream::StreamWriterTask;

    /// Job side that counts `destroy` calls and optionally forces a slice count.
    struct CountingJob {
        slices: Option<usize>,
        destroyed: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl JobPlugin for CountingJob {
        async fn init(&mut self, _ctx: &PluginContext) -> AppResult<()> {
            Ok(())
        }

        async fn split(&mut self, advice_number: usize) -> AppResult<Vec<Configuration>> {
            Ok(vec![Configuration::new(); self.slices.unwrap_or(advice_number)])
        }

        async fn destroy(&mut self) -> AppResult<()> {
            self.destroyed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Emits two records, or fails once started when `fail` is set.
    struct CountedReader {
        started: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl ReaderTask for CountedReader {
        async fn init(&mut self, _ctx: &PluginContext) -> AppResult<()> {
            self.started.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn start_read(&mut self, sender: &mut dyn RecordSender) -> AppResult<()> {
            if self.fail {
                return Err(AppError::plugin_runtime("source went away"));
            }
            for i in 0..2 {
                sender.send_record(Record::with_columns(vec![json!(i)])).await?;
            }
            Ok(())
        }

        async fn destroy(&mut self) -> AppResult<()> {
            Ok(())
        }
    }

    struct Fixture {
        destroyed: Arc<AtomicUsize>,
        started: Arc<AtomicUsize>,
        writer_slices: Option<usize>,
        fail_reader: bool,
        writer_tasks_allowed: usize,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                destroyed: Arc::new(AtomicUsize::new(0)),
                started: Arc::new(AtomicUsize::new(0)),
                writer_slices: None,
                fail_reader: false,
                writer_tasks_allowed: usize::MAX,
            }
        }

        fn manager(&self) -> PluginManager {
            let mut catalog = PluginCatalog::new();

            let (destroyed, started, fail) =
                (self.destroyed.clone(), self.started.clone(), self.fail_reader);
            let job_destroyed = destroyed.clone();
            catalog
                .register(
                    PluginEntry::new("test.Reader")
                        .with_job_factory(move || {
                            Ok(Box::new(CountingJob {
                                slices: None,
                                destroyed: job_destroyed.clone(),
                            }) as Box<dyn JobPlugin>)
                        })
                        .with_reader_task_factory(move || {
                            Ok(Box::new(CountedReader {
                                started: started.clone(),
                                fail,
                            }) as Box<dyn ReaderTask>)
                        }),
                )
                .unwrap();

            let slices = self.writer_slices;
            let allowed = self.writer_tasks_allowed;
            let created = Arc::new(AtomicUsize::new(0));
            catalog
                .register(
                    PluginEntry::new("test.Writer")
                        .with_job_factory(move || {
                            Ok(Box::new(CountingJob {
                                slices,
                                destroyed: destroyed.clone(),
                            }) as Box<dyn JobPlugin>)
                        })
                        .with_writer_task_factory(move || {
                            if created.fetch_add(1, Ordering::SeqCst) >= allowed {
                                return Err(AppError::internal("writer pool exhausted"));
                            }
                            Ok(Box::new(StreamWriterTask::default()) as Box<dyn WriterTask>)
                        }),
                )
                .unwrap();

            let registry = PluginRegistry::from_document(Configuration::from_flat([
                ("plugin.reader.source.class", "test.Reader"),
                ("plugin.writer.sink.class", "test.Writer"),
            ]));
            PluginManager::new(registry, catalog)
        }
    }

    fn job_config(reader: &str, writer: &str, channel: usize) -> JobConfig {
        JobConfig {
            channel,
            buffer_size: 4,
            reader: JobStepConfig {
                name: reader.to_string(),
                parameter: Configuration::new(),
            },
            writer: JobStepConfig {
                name: writer.to_string(),
                parameter: Configuration::new(),
            },
        }
    }

    #[tokio::test]
    async fn test_stream_job_moves_every_record() {
        let mut catalog = PluginCatalog::new();
        plugin_stream::register(&mut catalog).unwrap();
        let registry = PluginRegistry::from_document(Configuration::from_flat([
            ("plugin.reader.streamreader.class", plugin_stream::STREAM_READER_CLASS),
            ("plugin.writer.streamwriter.class", plugin_stream::STREAM_WRITER_CLASS),
        ]));
        let manager = PluginManager::new(registry, catalog);

        let mut config = job_config("streamreader", "streamwriter", 3);
        config.reader.parameter = Configuration::from_value(json!({
            "sliceRecordCount": 4,
            "column": [{ "value": "a" }, { "value": 1 }],
        }));

        let summary = JobContainer::new(&manager, &config).start().await.unwrap();
        assert_eq!(summary.tasks, 3);
        assert_eq!(summary.records_read, 12);
        assert_eq!(summary.records_written, 12);
    }

    #[tokio::test]
    async fn test_job_plugins_destroyed_after_success() {
        let fixture = Fixture::new();
        let manager = fixture.manager();
        let config = job_config("source", "sink", 2);

        let summary = JobContainer::new(&manager, &config).start().await.unwrap();
        assert_eq!(summary.records_read, 4);
        assert_eq!(summary.records_written, 4);
        assert_eq!(fixture.destroyed.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_split_mismatch_fails_and_destroys() {
        let mut fixture = Fixture::new();
        fixture.writer_slices = Some(1);
        let manager = fixture.manager();
        let config = job_config("source", "sink", 2);

        let err = JobContainer::new(&manager, &config).start().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::PluginRuntime);
        assert!(err.message.contains("split into 2"));
        assert_eq!(fixture.started.load(Ordering::SeqCst), 0);
        assert_eq!(fixture.destroyed.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failing_task_fails_job() {
        let mut fixture = Fixture::new();
        fixture.fail_reader = true;
        let manager = fixture.manager();
        let config = job_config("source", "sink", 2);

        let err = JobContainer::new(&manager, &config).start().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::PluginRuntime);
        assert!(err.message.contains("source went away"));
        assert_eq!(fixture.started.load(Ordering::SeqCst), 2);
        assert_eq!(fixture.destroyed.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_runner_creation_failure_starts_no_task() {
        let mut fixture = Fixture::new();
        fixture.writer_tasks_allowed = 1;
        let manager = fixture.manager();
        let config = job_config("source", "sink", 3);

        let err = JobContainer::new(&manager, &config).start().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::RuntimeInstantiation);
        tokio::task::yield_now().await;
        assert_eq!(fixture.started.load(Ordering::SeqCst), 0);
        assert_eq!(fixture.destroyed.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_undeclared_plugin_fails_before_run() {
        let fixture = Fixture::new();
        let manager = fixture.manager();
        let config = job_config("source", "kafka", 1);

        let err = JobContainer::new(&manager, &config).start().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::ConfigurationMissing);
        assert_eq!(fixture.destroyed.load(Ordering::SeqCst), 0);
    }
}
