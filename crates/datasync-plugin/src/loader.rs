//! Plugin loader — builds live plugin instances from resolved handles.
//!
//! Every call constructs a fresh instance and attaches the plugin's
//! registry subtree before returning it. The caller owns the returned handle
//! and drives its lifecycle hooks.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error};
use uuid::Uuid;

use datasync_core::error::{AppError, ErrorKind};
use datasync_core::result::AppResult;
use datasync_core::traits::{JobPlugin, PluginContext, ReaderTask, WriterTask};
use datasync_core::types::{Configuration, ExecutionContext, PluginKey, PluginType};

use crate::catalog::TaskFactory;
use crate::registry::PluginRegistry;
use crate::resolver::{DescriptorResolver, ResolvedFactory};

/// A Job-context instance with its attached configuration.
pub struct JobPluginHandle {
    ctx: PluginContext,
    plugin: Box<dyn JobPlugin>,
}

impl JobPluginHandle {
    /// Plugin identity.
    pub fn key(&self) -> &PluginKey {
        &self.ctx.key
    }

    /// Unique instance identifier.
    pub fn instance_id(&self) -> Uuid {
        self.ctx.instance_id
    }

    /// The attached registry subtree.
    pub fn plugin_conf(&self) -> &Configuration {
        &self.ctx.plugin_conf
    }

    /// The job parameters the instance will see on `init`.
    pub fn job_conf(&self) -> &Configuration {
        &self.ctx.job_conf
    }

    /// Sets the job parameters. Must happen before `init`.
    pub fn set_job_conf(&mut self, conf: Configuration) {
        self.ctx.job_conf = conf;
    }

    /// Full context handed to the plugin.
    pub fn context(&self) -> &PluginContext {
        &self.ctx
    }

    /// Runs the plugin's `init` hook.
    pub async fn init(&mut self) -> AppResult<()> {
        self.plugin.init(&self.ctx).await
    }

    /// Runs the plugin's `prepare` hook.
    pub async fn prepare(&mut self) -> AppResult<()> {
        self.plugin.prepare().await
    }

    /// Runs the plugin's `split` hook.
    pub async fn split(&mut self, advice_number: usize) -> AppResult<Vec<Configuration>> {
        self.plugin.split(advice_number).await
    }

    /// Runs the plugin's `post` hook.
    pub async fn post(&mut self) -> AppResult<()> {
        self.plugin.post().await
    }

    /// Runs the plugin's `destroy` hook.
    pub async fn destroy(&mut self) -> AppResult<()> {
        self.plugin.destroy().await
    }
}

impl fmt::Debug for JobPluginHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobPluginHandle")
            .field("key", &self.ctx.key)
            .field("instance_id", &self.ctx.instance_id)
            .finish()
    }
}

/// A Task-context instance, typed by transfer direction.
pub enum TaskInstance {
    /// Reader task.
    Reader(Box<dyn ReaderTask>),
    /// Writer task.
    Writer(Box<dyn WriterTask>),
}

impl TaskInstance {
    /// Direction this instance transfers in.
    pub fn direction(&self) -> PluginType {
        match self {
            Self::Reader(_) => PluginType::Reader,
            Self::Writer(_) => PluginType::Writer,
        }
    }
}

/// A Task-context instance with its attached configuration.
pub struct TaskPluginHandle {
    ctx: PluginContext,
    instance: TaskInstance,
}

impl TaskPluginHandle {
    /// Plugin identity.
    pub fn key(&self) -> &PluginKey {
        &self.ctx.key
    }

    /// Unique instance identifier.
    pub fn instance_id(&self) -> Uuid {
        self.ctx.instance_id
    }

    /// The attached registry subtree.
    pub fn plugin_conf(&self) -> &Configuration {
        &self.ctx.plugin_conf
    }

    /// Sets the task parameters. Must happen before `init`.
    pub fn set_job_conf(&mut self, conf: Configuration) {
        self.ctx.job_conf = conf;
    }

    /// Direction of the wrapped instance.
    pub fn direction(&self) -> PluginType {
        self.instance.direction()
    }

    /// Runs the instance's `init` hook.
    pub async fn init(&mut self) -> AppResult<()> {
        match &mut self.instance {
            TaskInstance::Reader(task) => task.init(&self.ctx).await,
            TaskInstance::Writer(task) => task.init(&self.ctx).await,
        }
    }

    /// Runs the instance's `destroy` hook.
    pub async fn destroy(&mut self) -> AppResult<()> {
        match &mut self.instance {
            TaskInstance::Reader(task) => task.destroy().await,
            TaskInstance::Writer(task) => task.destroy().await,
        }
    }

    /// Splits the handle into its context and instance.
    pub fn into_parts(self) -> (PluginContext, TaskInstance) {
        (self.ctx, self.instance)
    }
}

impl fmt::Debug for TaskPluginHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskPluginHandle")
            .field("key", &self.ctx.key)
            .field("direction", &self.direction())
            .field("instance_id", &self.ctx.instance_id)
            .finish()
    }
}

/// Instantiates resolved plugins.
#[derive(Debug, Clone)]
pub struct PluginLoader {
    registry: Arc<PluginRegistry>,
    resolver: Arc<DescriptorResolver>,
}

impl PluginLoader {
    /// Creates a loader backed by `resolver`.
    pub fn new(resolver: Arc<DescriptorResolver>) -> Self {
        Self {
            registry: resolver.registry().clone(),
            resolver,
        }
    }

    /// Loads a fresh Job-context instance of `(plugin_type, name)`.
    pub fn load_job_plugin(
        &self,
        plugin_type: PluginType,
        name: &str,
    ) -> AppResult<JobPluginHandle> {
        let resolved = self
            .resolver
            .resolve(plugin_type, name, ExecutionContext::Job)?;
        let ResolvedFactory::Job(factory) = resolved.factory() else {
            return Err(AppError::internal(format!(
                "'{}' did not resolve to a Job factory",
                resolved.symbol()
            )));
        };

        let plugin = factory()
            .map_err(|e| instantiation_error(plugin_type, name, resolved.symbol(), e))?;
        let ctx = self.context_for(plugin_type, name, ExecutionContext::Job)?;

        debug!(plugin = %ctx.key, instance = %ctx.instance_id, "Job plugin instantiated");
        Ok(JobPluginHandle { ctx, plugin })
    }

    /// Loads a fresh Task-context instance of `(plugin_type, name)`.
    pub fn load_task_plugin(
        &self,
        plugin_type: PluginType,
        name: &str,
    ) -> AppResult<TaskPluginHandle> {
        let resolved = self
            .resolver
            .resolve(plugin_type, name, ExecutionContext::Task)?;
        let ResolvedFactory::Task(factory) = resolved.factory() else {
            return Err(AppError::internal(format!(
                "'{}' did not resolve to a Task factory",
                resolved.symbol()
            )));
        };

        let instance = match factory {
            TaskFactory::Reader(factory) => factory().map(TaskInstance::Reader),
            TaskFactory::Writer(factory) => factory().map(TaskInstance::Writer),
        }
        .map_err(|e| instantiation_error(plugin_type, name, resolved.symbol(), e))?;
        let ctx = self.context_for(plugin_type, name, ExecutionContext::Task)?;

        debug!(plugin = %ctx.key, instance = %ctx.instance_id, "Task plugin instantiated");
        Ok(TaskPluginHandle { ctx, instance })
    }

    fn context_for(
        &self,
        plugin_type: PluginType,
        name: &str,
        context: ExecutionContext,
    ) -> AppResult<PluginContext> {
        let plugin_conf = self.registry.lookup(plugin_type, name)?;
        Ok(PluginContext::new(
            PluginKey::new(plugin_type, name),
            context,
            plugin_conf,
        ))
    }
}

fn instantiation_error(
    plugin_type: PluginType,
    name: &str,
    symbol: &str,
    cause: AppError,
) -> AppError {
    let key = PluginKey::new(plugin_type, name);
    error!(plugin = %key, symbol = %symbol, error = %cause, "Plugin construction failed");
    cause.wrap(
        ErrorKind::RuntimeInstantiation,
        format!("Cannot instantiate plugin [{key}] from '{symbol}'"),
    )
}
