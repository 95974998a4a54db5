//! Stream writer: drains records, optionally printing them to stdout.

use async_trait::async_trait;
use tracing::info;

use datasync_plugin::prelude::*;

/// Job side: nothing to set up, one task per reader slice.
#[derive(Debug, Default)]
pub struct StreamWriterJob {
    job_conf: Configuration,
}

#[async_trait]
impl JobPlugin for StreamWriterJob {
    async fn init(&mut self, ctx: &PluginContext) -> AppResult<()> {
        self.job_conf = ctx.job_conf.clone();
        Ok(())
    }

    async fn split(&mut self, advice_number: usize) -> AppResult<Vec<Configuration>> {
        Ok(vec![self.job_conf.clone(); advice_number.max(1)])
    }

    async fn destroy(&mut self) -> AppResult<()> {
        Ok(())
    }
}

/// Task side: counts and optionally prints each record.
#[derive(Debug, Default)]
pub struct StreamWriterTask {
    print: bool,
    field_delimiter: String,
    written: u64,
}

impl StreamWriterTask {
    /// Records written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    fn render(&self, record: &Record) -> String {
        record
            .columns
            .iter()
            .map(|value| match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(&self.field_delimiter)
    }
}

#[async_trait]
impl WriterTask for StreamWriterTask {
    async fn init(&mut self, ctx: &PluginContext) -> AppResult<()> {
        self.print = ctx.job_conf.get_bool("print").unwrap_or(false);
        self.field_delimiter = ctx
            .job_conf
            .get_string("fieldDelimiter")
            .unwrap_or("\t")
            .to_string();
        Ok(())
    }

    async fn start_write(&mut self, receiver: &mut dyn RecordReceiver) -> AppResult<()> {
        while let Some(record) = receiver.receive_record().await? {
            if self.print {
                println!("{}", self.render(&record));
            }
            self.written += 1;
        }
        Ok(())
    }

    async fn post(&mut self) -> AppResult<()> {
        info!(records = self.written, "Stream writer drained");
        Ok(())
    }

    async fn destroy(&mut self) -> AppResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::VecDeque;

    #[tokio::test]
    async fn test_drains_receiver() {
        let mut ctx = PluginContext::new(
            PluginKey::new(PluginType::Writer, "streamwriter"),
            ExecutionContext::Task,
            Configuration::new(),
        );
        ctx.job_conf = Configuration::from_value(json!({"fieldDelimiter": ","}));

        let mut task = StreamWriterTask::default();
        task.init(&ctx).await.unwrap();

        let mut input: VecDeque<Record> = (0..5)
            .map(|i| Record::with_columns(vec![json!(i), json!("x")]))
            .collect();
        task.start_write(&mut input).await.unwrap();

        assert_eq!(task.written(), 5);
        assert!(input.is_empty());
        assert_eq!(task.render(&Record::with_columns(vec![json!(1), json!("x")])), "1,x");
    }
}
