//! Prelude for plugin crates.

pub use async_trait::async_trait;

pub use datasync_core::error::{AppError, ErrorKind};
pub use datasync_core::result::AppResult;
pub use datasync_core::traits::{
    JobPlugin, PluginContext, ReaderTask, RecordReceiver, RecordSender, WriterTask,
};
pub use datasync_core::types::{Configuration, ExecutionContext, PluginKey, PluginType, Record};

pub use crate::catalog::{PluginCatalog, PluginEntry};

pub use crate::register_plugins;
