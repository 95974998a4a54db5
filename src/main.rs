//! DataSync — configuration-driven batch data synchronization.
//!
//! Entry point: parses the command line, loads configuration, sets up
//! logging, and dispatches to the selected command.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use datasync_core::config::AppConfig;
use datasync_core::config::logging::LoggingConfig;
use datasync_core::error::AppError;
use datasync_plugin::{PluginCatalog, PluginManager, PluginRegistry};

mod commands;
mod job;
mod output;

use commands::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config.logging);

    if let Err(e) = cli.execute(config).await {
        tracing::error!(code = e.code(), "{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

/// Builds the plugin manager from the configured registry and the built-in catalog.
pub fn build_manager(config: &AppConfig) -> Result<PluginManager, AppError> {
    let mut catalog = PluginCatalog::new();
    plugin_stream::register(&mut catalog)?;

    let registry = PluginRegistry::from_document(config.registry_document());
    Ok(PluginManager::new(registry, catalog))
}
