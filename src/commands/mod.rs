//! CLI command definitions and dispatch.

pub mod plugins;
pub mod run;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use datasync_core::config::AppConfig;
use datasync_core::error::AppError;

/// DataSync — batch data synchronization between reader and writer plugins
#[derive(Debug, Parser)]
#[command(name = "datasync", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/job.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the configured job
    Run(run::RunArgs),
    /// List declared plugins
    Plugins,
    /// Resolve every declared plugin in both Job and Task contexts
    Validate,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Run(args) => run::execute(args, config, self.format).await,
            Commands::Plugins => plugins::list(&config, self.format),
            Commands::Validate => plugins::validate(&config, self.format),
        }
    }
}
