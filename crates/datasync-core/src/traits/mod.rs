//! Core traits defined in `datasync-core` and implemented by plugin crates.

pub mod channel;
pub mod plugin;

pub use channel::{RecordReceiver, RecordSender};
pub use plugin::{JobPlugin, PluginContext, ReaderTask, WriterTask};
