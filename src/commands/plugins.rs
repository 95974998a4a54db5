//! Plugin inspection commands.

use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use datasync_core::config::AppConfig;
use datasync_core::error::AppError;

/// Declared plugin display row
#[derive(Debug, Serialize, Tabled)]
struct PluginRow {
    /// Type
    #[tabled(rename = "type")]
    plugin_type: String,
    /// Name
    name: String,
    /// Implementation symbol
    class: String,
}

/// Resolution display row
#[derive(Debug, Serialize, Tabled)]
struct ValidationRow {
    /// Plugin key
    plugin: String,
    /// Context
    context: String,
    /// Outcome
    result: String,
}

/// List every plugin declared in the configuration.
pub fn list(config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let manager = crate::build_manager(config)?;
    let rows: Vec<PluginRow> = manager
        .descriptors()
        .into_iter()
        .map(|d| PluginRow {
            plugin_type: d.plugin_type.to_string(),
            name: d.name,
            class: d.class.unwrap_or_else(|| "<missing>".to_string()),
        })
        .collect();

    output::print_list(&rows, format, "No plugins declared")
}

/// Resolve every declared reader and writer in both contexts.
pub fn validate(config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let manager = crate::build_manager(config)?;
    let entries = manager.validate();
    let failures = entries.iter().filter(|e| !e.is_ok()).count();

    let rows: Vec<ValidationRow> = entries
        .into_iter()
        .map(|e| ValidationRow {
            plugin: e.key.to_string(),
            context: e.context.to_string(),
            result: match (e.symbol, e.error) {
                (Some(symbol), None) => symbol,
                (_, Some(error)) => error,
                (None, None) => String::new(),
            },
        })
        .collect();
    output::print_list(&rows, format, "No readers or writers declared")?;

    if failures > 0 {
        output::print_error(&format!("{failures} plugin resolution(s) failed"));
        return Err(AppError::configuration(format!(
            "{failures} plugin resolution(s) failed"
        )));
    }

    output::print_success("All declared plugins resolve", format);
    Ok(())
}
