//! No-op plugin implementations shared by unit tests.

use async_trait::async_trait;

use datasync_core::result::AppResult;
use datasync_core::traits::{
    JobPlugin, PluginContext, ReaderTask, RecordReceiver, RecordSender, WriterTask,
};
use datasync_core::types::Configuration;

#[derive(Debug, Default)]
pub struct NoopJob;

#[async_trait]
impl JobPlugin for NoopJob {
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
pub struct NoopReaderTask;

#[async_trait]
impl ReaderTask for NoopReaderTask {
    async fn init(&mut self, _ctx: &PluginContext) -> AppResult<()> {
        Ok(())
    }

    async fn start_read(&mut self, _sender: &mut dyn RecordSender) -> AppResult<()> {
        Ok(())
    }

    async fn destroy(&mut self) -> AppResult<()> {
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct NoopWriterTask;

#[async_trait]
impl WriterTask for NoopWriterTask {
    async fn init(&mut self, _ctx: &PluginContext) -> AppResult<()> {
        Ok(())
    }

    async fn start_write(&mut self, receiver: &mut dyn RecordReceiver) -> AppResult<()> {
        while receiver.receive_record().await?.is_some() {}
        Ok(())
    }

    async fn destroy(&mut self) -> AppResult<()> {
        Ok(())
    }
}
