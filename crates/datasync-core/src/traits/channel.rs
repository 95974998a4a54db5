//! Record channel endpoints handed to reader and writer tasks.
//!
//! Buffering and back-pressure belong to whoever owns the channel; these
//! traits only describe the two ends.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::AppError;
use crate::result::AppResult;
use crate::types::record::Record;

/// Producer end, written to by reader tasks.
#[async_trait]
pub trait RecordSender: Send {
    /// Sends one record downstream.
    async fn send_record(&mut self, record: Record) -> AppResult<()>;

    /// Flushes any records held by the endpoint.
    async fn flush(&mut self) -> AppResult<()> {
        Ok(())
    }

    /// Signals that no more records will be sent.
    async fn terminate(&mut self) -> AppResult<()> {
        Ok(())
    }
}

/// Consumer end, read from by writer tasks.
#[async_trait]
pub trait RecordReceiver: Send {
    /// Receives the next record, or `None` once the producer has terminated.
    async fn receive_record(&mut self) -> AppResult<Option<Record>>;
}

#[async_trait]
impl RecordSender for mpsc::Sender<Record> {
    async fn send_record(&mut self, record: Record) -> AppResult<()> {
        self.send(record)
            .await
            .map_err(|_| AppError::plugin_runtime("Record channel closed by the consumer"))
    }
}

#[async_trait]
impl RecordReceiver for mpsc::Receiver<Record> {
    async fn receive_record(&mut self) -> AppResult<Option<Record>> {
        Ok(self.recv().await)
    }
}

#[async_trait]
impl RecordSender for Vec<Record> {
    async fn send_record(&mut self, record: Record) -> AppResult<()> {
        self.push(record);
        Ok(())
    }
}

#[async_trait]
impl RecordReceiver for VecDeque<Record> {
    async fn receive_record(&mut self) -> AppResult<Option<Record>> {
        Ok(self.pop_front())
    }
}
