//! # datasync-plugin
//!
//! Plugin resolution and instantiation for DataSync. Provides:
//!
//! - An immutable registry of declared plugins (`plugin.<type>.<name>`)
//! - A catalog of linked-in implementations, each with a Job and a Task factory
//! - A caching resolver guarded by a single critical section
//! - A loader that instantiates plugins and attaches their configuration
//! - Direction-typed runners wrapping Task-context instances

pub mod catalog;
pub mod loader;
pub mod macros;
pub mod manager;
pub mod prelude;
pub mod registry;
pub mod resolver;
pub mod runner;

#[cfg(test)]
mod testing;

pub use catalog::{PluginCatalog, PluginEntry};
pub use loader::{JobPluginHandle, PluginLoader, TaskPluginHandle};
pub use manager::PluginManager;
pub use registry::{PluginDescriptor, PluginRegistry, PluginRegistryBuilder};
pub use resolver::{DescriptorResolver, LoadFailure, ResolvedPlugin};
pub use runner::{ReaderRunner, Runner, RunnerFactory, TransferReport, WriterRunner};
