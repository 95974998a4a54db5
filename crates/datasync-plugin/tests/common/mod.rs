//! Shared fixtures for plugin integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::json;

use datasync_plugin::prelude::*;
use datasync_plugin::{PluginManager, PluginRegistry};

/// Ordered lifecycle events recorded by instrumented plugins.
pub type EventLog = Arc<Mutex<Vec<String>>>;

#[derive(Debug, Default)]
pub struct MysqlReaderJob {
    rows: u64,
}

#[async_trait]
impl JobPlugin for MysqlReaderJob {
    async fn init(&mut self, ctx: &PluginContext) -> AppResult<()> {
        self.rows = ctx.job_conf.get_u64("rows").unwrap_or(0);
        Ok(())
    }

    async fn split(&mut self, advice_number: usize) -> AppResult<Vec<Configuration>> {
        let per_slice = self.rows / advice_number.max(1) as u64;
        Ok((0..advice_number.max(1))
            .map(|_| Configuration::from_value(json!({ "rows": per_slice })))
            .collect())
    }

    async fn destroy(&mut self) -> AppResult<()> {
        Ok(())
    }
}

/// Emits `rows` records, each tagged with the declared class it was bound to.
#[derive(Debug, Default)]
pub struct MysqlReaderTask {
    class: String,
    rows: u64,
}

#[async_trait]
impl ReaderTask for MysqlReaderTask {
    async fn init(&mut self, ctx: &PluginContext) -> AppResult<()> {
        self.class = ctx
            .plugin_conf
            .get_string("class")
            .unwrap_or_default()
            .to_string();
        self.rows = ctx.job_conf.get_u64("rows").unwrap_or(1);
        Ok(())
    }

    async fn start_read(&mut self, sender: &mut dyn RecordSender) -> AppResult<()> {
        for i in 0..self.rows {
            sender
                .send_record(Record::with_columns(vec![json!(i), json!(self.class)]))
                .await?;
        }
        Ok(())
    }

    async fn destroy(&mut self) -> AppResult<()> {
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct HdfsWriterJob;

#[async_trait]
impl JobPlugin for HdfsWriterJob {
    async fn init(&mut self, _ctx: &PluginContext) -> AppResult<()> {
        Ok(())
    }

    async fn split(&mut self, advice_number: usize) -> AppResult<Vec<Configuration>> {
        Ok(vec![Configuration::new(); advice_number])
    }

    async fn destroy(&mut self) -> AppResult<()> {
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct HdfsWriterTask {
    pub received: Vec<Record>,
}

#[async_trait]
impl WriterTask for HdfsWriterTask {
    async fn init(&mut self, _ctx: &PluginContext) -> AppResult<()> {
        Ok(())
    }

    async fn start_write(&mut self, receiver: &mut dyn RecordReceiver) -> AppResult<()> {
        while let Some(record) = receiver.receive_record().await? {
            self.received.push(record);
        }
        Ok(())
    }

    async fn destroy(&mut self) -> AppResult<()> {
        Ok(())
    }
}

/// Reader task that records every lifecycle call and can fail in one phase.
pub struct InstrumentedReader {
    pub events: EventLog,
    pub fail_in: Option<&'static str>,
}

impl InstrumentedReader {
    fn step(&self, phase: &'static str) -> AppResult<()> {
        self.events.lock().push(phase.to_string());
        if self.fail_in == Some(phase) {
            return Err(AppError::plugin_runtime(format!("{phase} failed")));
        }
        Ok(())
    }
}

#[async_trait]
impl ReaderTask for InstrumentedReader {
    async fn init(&mut self, _ctx: &PluginContext) -> AppResult<()> {
        self.step("init")
    }

    async fn prepare(&mut self) -> AppResult<()> {
        self.step("prepare")
    }

    async fn start_read(&mut self, sender: &mut dyn RecordSender) -> AppResult<()> {
        self.step("start_read")?;
        sender.send_record(Record::with_columns(vec![json!("x")])).await
    }

    async fn post(&mut self) -> AppResult<()> {
        self.step("post")
    }

    async fn destroy(&mut self) -> AppResult<()> {
        self.step("destroy")
    }
}

/// Catalog with the example reader/writer implementations.
pub fn example_catalog() -> PluginCatalog {
    let mut catalog = PluginCatalog::new();
    register_plugins!(&mut catalog;
        reader "example.MysqlReader" => MysqlReaderJob, MysqlReaderTask;
        writer "example.HdfsWriter" => HdfsWriterJob, HdfsWriterTask;
    )
    .expect("register example plugins");
    catalog
}

/// Registry bound with the two example plugins.
pub fn example_registry() -> PluginRegistry {
    PluginRegistry::from_document(Configuration::from_flat([
        ("plugin.reader.mysql.class", "example.MysqlReader"),
        ("plugin.writer.hdfs.class", "example.HdfsWriter"),
    ]))
}

/// Manager over the example registry and catalog.
pub fn example_manager() -> PluginManager {
    PluginManager::new(example_registry(), example_catalog())
}
