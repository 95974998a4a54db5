//! Plugin registry — the bound configuration tree of declared plugins.
//!
//! The registry is assembled once through [`PluginRegistryBuilder`] and is
//! immutable afterwards. Consumers share it behind an `Arc`; there is no way
//! to rebind a registry that resolvers already hold.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use datasync_core::error::AppError;
use datasync_core::result::AppResult;
use datasync_core::types::{Configuration, PluginKey, PluginType};

/// Field naming the base implementation symbol of a plugin.
pub const CLASS_FIELD: &str = "class";

/// A declared plugin as seen in the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginDescriptor {
    /// Plugin name.
    pub name: String,
    /// Plugin type.
    pub plugin_type: PluginType,
    /// Base implementation symbol (`class`), if declared.
    pub class: Option<String>,
    /// The plugin's configuration subtree.
    pub conf: Configuration,
}

impl PluginDescriptor {
    /// Composite key of this descriptor.
    pub fn key(&self) -> PluginKey {
        PluginKey::new(self.plugin_type, self.name.clone())
    }
}

/// Immutable store of plugin configuration keyed by `plugin.<type>.<name>`.
#[derive(Debug, Clone)]
pub struct PluginRegistry {
    document: Configuration,
}

impl PluginRegistry {
    /// Starts assembling a registry.
    pub fn builder() -> PluginRegistryBuilder {
        PluginRegistryBuilder::new()
    }

    /// Builds a registry directly from a configuration tree.
    pub fn from_document(document: Configuration) -> Self {
        Self::builder().bind(document).build()
    }

    /// Returns the configuration subtree for `(plugin_type, name)`.
    ///
    /// `name` is a single key under `plugin.<type>`; dots in it are not
    /// path separators.
    pub fn lookup(&self, plugin_type: PluginType, name: &str) -> AppResult<Configuration> {
        self.entry(plugin_type, name)
            .map(|value| Configuration::from_value(value.clone()))
            .ok_or_else(|| {
                AppError::configuration_missing(format!(
                    "Cannot find configuration for plugin [{}]",
                    PluginKey::new(plugin_type, name)
                ))
            })
    }

    /// Whether `(plugin_type, name)` is declared.
    pub fn contains(&self, plugin_type: PluginType, name: &str) -> bool {
        self.entry(plugin_type, name).is_some()
    }

    fn entry(&self, plugin_type: PluginType, name: &str) -> Option<&Value> {
        self.document
            .get(&format!("plugin.{plugin_type}"))?
            .as_object()?
            .get(name)
    }

    /// Returns the descriptor for `(plugin_type, name)`.
    pub fn descriptor(&self, plugin_type: PluginType, name: &str) -> AppResult<PluginDescriptor> {
        let conf = self.lookup(plugin_type, name)?;
        Ok(PluginDescriptor {
            name: name.to_string(),
            plugin_type,
            class: conf.get_string(CLASS_FIELD).map(str::to_string),
            conf,
        })
    }

    /// All declared plugins, ordered by type then name.
    pub fn descriptors(&self) -> Vec<PluginDescriptor> {
        let mut descriptors = Vec::new();
        for plugin_type in PluginType::all() {
            let path = format!("plugin.{plugin_type}");
            for name in self.document.keys(&path) {
                if let Ok(descriptor) = self.descriptor(plugin_type, &name) {
                    descriptors.push(descriptor);
                }
            }
        }
        descriptors
    }

    /// Number of declared plugins.
    pub fn len(&self) -> usize {
        PluginType::all()
            .iter()
            .map(|t| self.document.keys(&format!("plugin.{t}")).len())
            .sum()
    }

    /// Whether no plugin is declared.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The whole bound document.
    pub fn document(&self) -> &Configuration {
        &self.document
    }
}

/// One-shot assembly of a [`PluginRegistry`].
#[derive(Debug, Default)]
pub struct PluginRegistryBuilder {
    document: Configuration,
}

impl PluginRegistryBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a configuration tree. Binding again deep-merges the new tree,
    /// later values winning.
    pub fn bind(mut self, tree: Configuration) -> Self {
        if !self.document.is_empty() {
            debug!("Merging additional configuration tree into plugin registry");
        }
        self.document.merge(&tree, true);
        self
    }

    /// Sets a single dotted key, e.g. `plugin.reader.mysql.class`.
    pub fn set(mut self, path: &str, value: impl Into<Value>) -> Self {
        self.document.set(path, value);
        self
    }

    /// Finishes assembly. Entries under an unknown plugin type are ignored
    /// with a warning.
    pub fn build(self) -> PluginRegistry {
        let known: Vec<&str> = PluginType::all().iter().map(PluginType::as_str).collect();
        for section in self.document.keys("plugin") {
            if !known.contains(&section.as_str()) {
                warn!(section = %section, "Ignoring plugin section with unknown type");
            }
        }

        let registry = PluginRegistry {
            document: self.document,
        };
        info!(plugins = registry.len(), "Plugin registry bound");
        registry
    }
}
