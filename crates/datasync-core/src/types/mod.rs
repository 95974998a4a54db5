//! Shared value types: plugin identities, configuration documents, records.

pub mod configuration;
pub mod plugin_type;
pub mod record;

pub use configuration::Configuration;
pub use plugin_type::{ExecutionContext, PluginKey, PluginType};
pub use record::Record;
