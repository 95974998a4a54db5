//! Descriptor resolver — turns `(type, name, context)` into a cached
//! implementation handle.
//!
//! Resolution runs entirely inside one critical section guarding the cache
//! and the catalog load, so concurrent first-time resolutions of the same
//! plugin perform exactly one load.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, info};

use datasync_core::error::{AppError, ErrorKind};
use datasync_core::result::AppResult;
use datasync_core::types::{ExecutionContext, PluginKey, PluginType};

use crate::catalog::{JobFactory, PluginCatalog, TaskFactory};
use crate::registry::{CLASS_FIELD, PluginRegistry};

/// Why a derived symbol could not be turned into a usable implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadFailure {
    /// No catalog entry for the base symbol.
    #[error("implementation '{0}' is not registered")]
    SymbolNotFound(String),
    /// The entry has no factory for the requested context.
    #[error("implementation '{symbol}' does not provide a {context} implementation")]
    MissingContext {
        /// Base symbol.
        symbol: String,
        /// Requested context.
        context: ExecutionContext,
    },
    /// The Task factory transfers in the wrong direction for the plugin type.
    #[error("implementation '{symbol}' is a {actual} task but was declared as a {expected}")]
    DirectionMismatch {
        /// Base symbol.
        symbol: String,
        /// Declared plugin type.
        expected: PluginType,
        /// Direction the factory actually serves.
        actual: PluginType,
    },
    /// The entry is registered but disabled.
    #[error("implementation '{0}' is disabled")]
    AccessDenied(String),
}

/// Factory selected for one context.
#[derive(Clone)]
pub enum ResolvedFactory {
    /// Job-context factory.
    Job(JobFactory),
    /// Task-context factory.
    Task(TaskFactory),
}

impl fmt::Debug for ResolvedFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Job(_) => f.write_str("Job"),
            Self::Task(task) => write!(f, "Task({})", task.direction()),
        }
    }
}

/// A resolved implementation: derived symbol plus its factory.
pub struct ResolvedPlugin {
    symbol: String,
    context: ExecutionContext,
    factory: ResolvedFactory,
}

impl ResolvedPlugin {
    /// Context-specific symbol, e.g. `example.MysqlReader$Task`.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Context the handle was resolved for.
    pub fn context(&self) -> ExecutionContext {
        self.context
    }

    /// The factory producing instances.
    pub fn factory(&self) -> &ResolvedFactory {
        &self.factory
    }

    fn ensure_serves(&self, plugin_type: PluginType) -> Result<(), LoadFailure> {
        match &self.factory {
            ResolvedFactory::Task(task) if task.direction() != plugin_type => {
                Err(LoadFailure::DirectionMismatch {
                    symbol: self.symbol.clone(),
                    expected: plugin_type,
                    actual: task.direction(),
                })
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Debug for ResolvedPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedPlugin")
            .field("symbol", &self.symbol)
            .field("context", &self.context)
            .finish()
    }
}

/// Resolves declared plugins against the catalog, caching the result.
pub struct DescriptorResolver {
    registry: Arc<PluginRegistry>,
    catalog: Arc<PluginCatalog>,
    /// Derived symbol → resolved handle. Never evicted.
    cache: Mutex<HashMap<String, Arc<ResolvedPlugin>>>,
    loads: AtomicUsize,
}

impl DescriptorResolver {
    /// Creates a resolver over a bound registry and a catalog.
    pub fn new(registry: Arc<PluginRegistry>, catalog: Arc<PluginCatalog>) -> Self {
        Self {
            registry,
            catalog,
            cache: Mutex::new(HashMap::new()),
            loads: AtomicUsize::new(0),
        }
    }

    /// Resolves `(plugin_type, name)` for `context`.
    ///
    /// Repeated calls return the same `Arc` for the same derived symbol.
    pub fn resolve(
        &self,
        plugin_type: PluginType,
        name: &str,
        context: ExecutionContext,
    ) -> AppResult<Arc<ResolvedPlugin>> {
        let key = PluginKey::new(plugin_type, name);
        let mut cache = self.cache.lock();

        let conf = self.registry.lookup(plugin_type, name)?;
        let class = conf
            .get_string(CLASS_FIELD)
            .map(str::trim)
            .filter(|class| !class.is_empty())
            .ok_or_else(|| {
                AppError::malformed_plugin_config(format!(
                    "Plugin [{key}] does not declare a '{CLASS_FIELD}'"
                ))
            })?;
        let symbol = context.derive_symbol(class);

        let resolved = match cache.get(&symbol) {
            Some(hit) => {
                debug!(plugin = %key, symbol = %symbol, "Resolved plugin from cache");
                hit.clone()
            }
            None => {
                self.loads.fetch_add(1, Ordering::SeqCst);
                let loaded = self
                    .load(class, &symbol, context)
                    .map_err(|failure| load_error(&key, &symbol, failure))?;
                info!(plugin = %key, symbol = %symbol, "Loaded plugin implementation");
                let loaded = Arc::new(loaded);
                cache.insert(symbol.clone(), loaded.clone());
                loaded
            }
        };

        resolved
            .ensure_serves(plugin_type)
            .map_err(|failure| load_error(&key, &symbol, failure))?;
        Ok(resolved)
    }

    fn load(
        &self,
        class: &str,
        symbol: &str,
        context: ExecutionContext,
    ) -> Result<ResolvedPlugin, LoadFailure> {
        let entry = self
            .catalog
            .get(class)
            .ok_or_else(|| LoadFailure::SymbolNotFound(class.to_string()))?;

        if !entry.is_enabled() {
            return Err(LoadFailure::AccessDenied(class.to_string()));
        }

        let missing = || LoadFailure::MissingContext {
            symbol: class.to_string(),
            context,
        };
        let factory = match context {
            ExecutionContext::Job => {
                ResolvedFactory::Job(entry.job_factory().ok_or_else(missing)?.clone())
            }
            ExecutionContext::Task => {
                ResolvedFactory::Task(entry.task_factory().ok_or_else(missing)?.clone())
            }
        };

        Ok(ResolvedPlugin {
            symbol: symbol.to_string(),
            context,
            factory,
        })
    }

    /// Number of catalog loads performed (cache misses).
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Number of cached handles.
    pub fn cached(&self) -> usize {
        self.cache.lock().len()
    }

    /// The registry this resolver reads from.
    pub fn registry(&self) -> &Arc<PluginRegistry> {
        &self.registry
    }
}

impl fmt::Debug for DescriptorResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DescriptorResolver")
            .field("cached", &self.cached())
            .field("loads", &self.load_count())
            .finish()
    }
}

fn load_error(key: &PluginKey, symbol: &str, failure: LoadFailure) -> AppError {
    AppError::with_source(
        ErrorKind::PluginLoad,
        format!("Cannot load plugin [{key}] as '{symbol}': {failure}"),
        failure,
    )
}
