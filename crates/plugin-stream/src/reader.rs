//! Stream reader: emits `sliceRecordCount` copies of a constant record.
//!
//! Job parameters:
//!
//! ```toml
//! [job.reader.parameter]
//! sliceRecordCount = 10
//! column = [{ value = "hello" }, { value = 42 }]
//! ```

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use datasync_plugin::prelude::*;

const SLICE_RECORD_COUNT: &str = "sliceRecordCount";
const COLUMN: &str = "column";

fn parse_columns(conf: &Configuration) -> AppResult<Vec<Value>> {
    let columns = conf
        .get(COLUMN)
        .and_then(Value::as_array)
        .filter(|columns| !columns.is_empty())
        .ok_or_else(|| {
            AppError::configuration(format!("streamreader requires a non-empty '{COLUMN}' list"))
        })?;

    Ok(columns
        .iter()
        .map(|column| match column {
            Value::Object(map) => map.get("value").cloned().unwrap_or(Value::Null),
            other => other.clone(),
        })
        .collect())
}

fn parse_slice_record_count(conf: &Configuration) -> AppResult<u64> {
    conf.get_u64(SLICE_RECORD_COUNT).ok_or_else(|| {
        AppError::configuration(format!(
            "streamreader requires a numeric '{SLICE_RECORD_COUNT}'"
        ))
    })
}

/// Job side: validates parameters and fans them out to every task.
#[derive(Debug, Default)]
pub struct StreamReaderJob {
    job_conf: Configuration,
}

#[async_trait]
impl JobPlugin for StreamReaderJob {
    async fn init(&mut self, ctx: &PluginContext) -> AppResult<()> {
        self.job_conf = ctx.job_conf.clone();
        parse_columns(&self.job_conf)?;
        parse_slice_record_count(&self.job_conf)?;
        Ok(())
    }

    async fn split(&mut self, advice_number: usize) -> AppResult<Vec<Configuration>> {
        let slices = advice_number.max(1);
        debug!(slices, "Splitting stream reader job");
        Ok(vec![self.job_conf.clone(); slices])
    }

    async fn destroy(&mut self) -> AppResult<()> {
        Ok(())
    }
}

/// Task side: generates the records.
#[derive(Debug, Default)]
pub struct StreamReaderTask {
    columns: Vec<Value>,
    slice_record_count: u64,
}

#[async_trait]
impl ReaderTask for StreamReaderTask {
    async fn init(&mut self, ctx: &PluginContext) -> AppResult<()> {
        self.columns = parse_columns(&ctx.job_conf)?;
        self.slice_record_count = parse_slice_record_count(&ctx.job_conf)?;
        Ok(())
    }

    async fn start_read(&mut self, sender: &mut dyn RecordSender) -> AppResult<()> {
        for _ in 0..self.slice_record_count {
            sender
                .send_record(Record::with_columns(self.columns.clone()))
                .await?;
        }
        info!(records = self.slice_record_count, "Stream reader slice done");
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

    fn ctx(job_conf: Value) -> PluginContext {
        let mut ctx = PluginContext::new(
            PluginKey::new(PluginType::Reader, "streamreader"),
            ExecutionContext::Task,
            Configuration::new(),
        );
        ctx.job_conf = Configuration::from_value(job_conf);
        ctx
    }

    #[tokio::test]
    async fn test_emits_slice_record_count_records() {
        let mut task = StreamReaderTask::default();
        task.init(&ctx(json!({
            "sliceRecordCount": 3,
            "column": [{"value": "a"}, {"value": 1}, true]
        })))
        .await
        .unwrap();

        let mut out: Vec<Record> = Vec::new();
        task.start_read(&mut out).await.unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].columns, vec![json!("a"), json!(1), json!(true)]);
    }

    #[tokio::test]
    async fn test_job_rejects_missing_columns() {
        let mut job = StreamReaderJob::default();
        let err = job
            .init(&ctx(json!({"sliceRecordCount": 3})))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_split_copies_parameters() {
        let mut job = StreamReaderJob::default();
        job.init(&ctx(json!({"sliceRecordCount": "2", "column": [1]})))
            .await
            .unwrap();
        let slices = job.split(4).await.unwrap();
        assert_eq!(slices.len(), 4);
        assert_eq!(slices[3].get_u64("sliceRecordCount"), Some(2));
    }
}
