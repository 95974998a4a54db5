//! Plugin manager — wires registry, catalog, resolver, loader, and runner
//! factory into one value shared by the orchestrator and task executors.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use datasync_core::result::AppResult;
use datasync_core::types::{ExecutionContext, PluginKey, PluginType};

use crate::catalog::PluginCatalog;
use crate::loader::{JobPluginHandle, PluginLoader, TaskPluginHandle};
use crate::registry::{PluginDescriptor, PluginRegistry};
use crate::resolver::{DescriptorResolver, ResolvedPlugin};
use crate::runner::{Runner, RunnerFactory};

/// Resolution status of one declared plugin in one context.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationEntry {
    /// Plugin identity.
    pub key: PluginKey,
    /// Context that was resolved.
    pub context: ExecutionContext,
    /// Derived symbol on success.
    pub symbol: Option<String>,
    /// Error message on failure.
    pub error: Option<String>,
}

impl ValidationEntry {
    /// Whether the plugin resolved.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Entry point to the plugin subsystem.
#[derive(Debug, Clone)]
pub struct PluginManager {
    registry: Arc<PluginRegistry>,
    catalog: Arc<PluginCatalog>,
    resolver: Arc<DescriptorResolver>,
    loader: Arc<PluginLoader>,
    runners: RunnerFactory,
}

impl PluginManager {
    /// Creates a manager over a bound registry and a catalog.
    pub fn new(registry: PluginRegistry, catalog: PluginCatalog) -> Self {
        let registry = Arc::new(registry);
        let catalog = Arc::new(catalog);
        let resolver = Arc::new(DescriptorResolver::new(registry.clone(), catalog.clone()));
        let loader = Arc::new(PluginLoader::new(resolver.clone()));
        let runners = RunnerFactory::new(loader.clone());

        info!(
            declared = registry.len(),
            implementations = catalog.len(),
            "Plugin manager ready"
        );

        Self {
            registry,
            catalog,
            resolver,
            loader,
            runners,
        }
    }

    /// Resolves `(plugin_type, name)` for `context`.
    pub fn resolve(
        &self,
        plugin_type: PluginType,
        name: &str,
        context: ExecutionContext,
    ) -> AppResult<Arc<ResolvedPlugin>> {
        self.resolver.resolve(plugin_type, name, context)
    }

    /// Loads a fresh Job-context instance.
    pub fn load_job_plugin(
        &self,
        plugin_type: PluginType,
        name: &str,
    ) -> AppResult<JobPluginHandle> {
        self.loader.load_job_plugin(plugin_type, name)
    }

    /// Loads a fresh Task-context instance.
    pub fn load_task_plugin(
        &self,
        plugin_type: PluginType,
        name: &str,
    ) -> AppResult<TaskPluginHandle> {
        self.loader.load_task_plugin(plugin_type, name)
    }

    /// Creates a direction-typed runner for `(plugin_type, name)`.
    pub fn create_runner(&self, plugin_type: PluginType, name: &str) -> AppResult<Runner> {
        self.runners.create_runner(plugin_type, name)
    }

    /// All declared plugins.
    pub fn descriptors(&self) -> Vec<PluginDescriptor> {
        self.registry.descriptors()
    }

    /// Resolves every declared reader and writer in both contexts.
    pub fn validate(&self) -> Vec<ValidationEntry> {
        let mut entries = Vec::new();
        for descriptor in self.descriptors() {
            if descriptor.plugin_type == PluginType::Transformer {
                continue;
            }
            for context in [ExecutionContext::Job, ExecutionContext::Task] {
                let key = descriptor.key();
                let entry = match self.resolve(descriptor.plugin_type, &descriptor.name, context) {
                    Ok(resolved) => ValidationEntry {
                        key,
                        context,
                        symbol: Some(resolved.symbol().to_string()),
                        error: None,
                    },
                    Err(e) => {
                        warn!(
                            plugin = %key,
                            context = %context,
                            error = %e,
                            "Plugin does not resolve"
                        );
                        ValidationEntry {
                            key,
                            context,
                            symbol: None,
                            error: Some(e.to_string()),
                        }
                    }
                };
                entries.push(entry);
            }
        }
        entries
    }

    /// The bound registry.
    pub fn registry(&self) -> &Arc<PluginRegistry> {
        &self.registry
    }

    /// The implementation catalog.
    pub fn catalog(&self) -> &Arc<PluginCatalog> {
        &self.catalog
    }

    /// The shared resolver.
    pub fn resolver(&self) -> &Arc<DescriptorResolver> {
        &self.resolver
    }

    /// The shared loader.
    pub fn loader(&self) -> &Arc<PluginLoader> {
        &self.loader
    }

    /// The runner factory.
    pub fn runner_factory(&self) -> &RunnerFactory {
        &self.runners
    }
}
