//! # datasync-core
//!
//! Core crate for DataSync. Contains the plugin lifecycle traits, the
//! configuration document type, record channel abstractions, application
//! configuration schemas, and the unified error system.
//!
//! This crate has **no** internal dependencies on other DataSync crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
pub use types::configuration::Configuration;
pub use types::plugin_type::{ExecutionContext, PluginKey, PluginType};
pub use types::record::Record;
