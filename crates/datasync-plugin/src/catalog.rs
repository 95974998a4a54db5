//! Plugin catalog — the explicit registration table of implementations.
//!
//! Each entry maps a base implementation symbol (the `class` declared in the
//! registry) to the factories of its two cooperating implementations: one for
//! the Job context and one for the Task context.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::info;

use datasync_core::error::AppError;
use datasync_core::result::AppResult;
use datasync_core::traits::{JobPlugin, ReaderTask, WriterTask};
use datasync_core::types::{ExecutionContext, PluginType};

/// Constructs a Job-context instance.
pub type JobFactory = Arc<dyn Fn() -> AppResult<Box<dyn JobPlugin>> + Send + Sync>;

/// Constructs a reader Task-context instance.
pub type ReaderTaskFactory = Arc<dyn Fn() -> AppResult<Box<dyn ReaderTask>> + Send + Sync>;

/// Constructs a writer Task-context instance.
pub type WriterTaskFactory = Arc<dyn Fn() -> AppResult<Box<dyn WriterTask>> + Send + Sync>;

/// Task-context factory, typed by transfer direction.
#[derive(Clone)]
pub enum TaskFactory {
    /// Produces records.
    Reader(ReaderTaskFactory),
    /// Consumes records.
    Writer(WriterTaskFactory),
}

impl TaskFactory {
    /// The plugin type this factory's instances can serve.
    pub fn direction(&self) -> PluginType {
        match self {
            Self::Reader(_) => PluginType::Reader,
            Self::Writer(_) => PluginType::Writer,
        }
    }
}

impl fmt::Debug for TaskFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TaskFactory").field(&self.direction()).finish()
    }
}

/// A registered implementation: base symbol plus its factories.
#[derive(Clone)]
pub struct PluginEntry {
    symbol: String,
    job: Option<JobFactory>,
    task: Option<TaskFactory>,
    enabled: bool,
}

impl PluginEntry {
    /// Creates an entry with no factories.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            job: None,
            task: None,
            enabled: true,
        }
    }

    /// Entry for a reader whose Job and Task types are default-constructible.
    pub fn reader<J, T>(symbol: impl Into<String>) -> Self
    where
        J: JobPlugin + Default + 'static,
        T: ReaderTask + Default + 'static,
    {
        Self::new(symbol)
            .with_job_factory(|| Ok(Box::new(J::default()) as Box<dyn JobPlugin>))
            .with_reader_task_factory(|| Ok(Box::new(T::default()) as Box<dyn ReaderTask>))
    }

    /// Entry for a writer whose Job and Task types are default-constructible.
    pub fn writer<J, T>(symbol: impl Into<String>) -> Self
    where
        J: JobPlugin + Default + 'static,
        T: WriterTask + Default + 'static,
    {
        Self::new(symbol)
            .with_job_factory(|| Ok(Box::new(J::default()) as Box<dyn JobPlugin>))
            .with_writer_task_factory(|| Ok(Box::new(T::default()) as Box<dyn WriterTask>))
    }

    /// Sets the Job-context factory.
    pub fn with_job_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> AppResult<Box<dyn JobPlugin>> + Send + Sync + 'static,
    {
        self.job = Some(Arc::new(factory));
        self
    }

    /// Sets a reader Task-context factory.
    pub fn with_reader_task_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> AppResult<Box<dyn ReaderTask>> + Send + Sync + 'static,
    {
        self.task = Some(TaskFactory::Reader(Arc::new(factory)));
        self
    }

    /// Sets a writer Task-context factory.
    pub fn with_writer_task_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> AppResult<Box<dyn WriterTask>> + Send + Sync + 'static,
    {
        self.task = Some(TaskFactory::Writer(Arc::new(factory)));
        self
    }

    /// Marks the entry as not loadable.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Base implementation symbol.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Whether the entry may be resolved.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Job-context factory, if provided.
    pub fn job_factory(&self) -> Option<&JobFactory> {
        self.job.as_ref()
    }

    /// Task-context factory, if provided.
    pub fn task_factory(&self) -> Option<&TaskFactory> {
        self.task.as_ref()
    }

    /// Whether the entry provides an implementation for `context`.
    pub fn provides(&self, context: ExecutionContext) -> bool {
        match context {
            ExecutionContext::Job => self.job.is_some(),
            ExecutionContext::Task => self.task.is_some(),
        }
    }
}

impl fmt::Debug for PluginEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginEntry")
            .field("symbol", &self.symbol)
            .field("job", &self.job.is_some())
            .field("task", &self.task)
            .field("enabled", &self.enabled)
            .finish()
    }
}

/// Registration table of all implementations linked into the process.
#[derive(Debug, Default)]
pub struct PluginCatalog {
    entries: HashMap<String, PluginEntry>,
}

impl PluginCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an entry. Symbols must be unique.
    pub fn register(&mut self, entry: PluginEntry) -> AppResult<()> {
        if self.entries.contains_key(entry.symbol()) {
            return Err(AppError::plugin_load(format!(
                "Implementation '{}' is already registered",
                entry.symbol()
            )));
        }

        info!(
            symbol = %entry.symbol(),
            job = entry.provides(ExecutionContext::Job),
            task = entry.provides(ExecutionContext::Task),
            "Registering plugin implementation"
        );

        self.entries.insert(entry.symbol.clone(), entry);
        Ok(())
    }

    /// Returns the entry for a base symbol.
    pub fn get(&self, symbol: &str) -> Option<&PluginEntry> {
        self.entries.get(symbol)
    }

    /// All registered symbols, sorted.
    pub fn symbols(&self) -> Vec<&str> {
        let mut symbols: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        symbols.sort_unstable();
        symbols
    }

    /// Number of registered implementations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
