//! Job execution command.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::job::JobContainer;
use crate::output::{self, OutputFormat};
use datasync_core::config::AppConfig;
use datasync_core::error::AppError;

/// Arguments for the run command
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Override the configured number of parallel task pairs
    #[arg(long)]
    pub channel: Option<usize>,
}

/// Job summary display row
#[derive(Debug, Serialize, Tabled)]
struct SummaryRow {
    /// Task pairs
    tasks: usize,
    /// Records read
    records_read: u64,
    /// Records written
    records_written: u64,
    /// Elapsed milliseconds
    elapsed_ms: u128,
}

/// Execute the configured job
pub async fn execute(
    args: &RunArgs,
    config: AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let mut job = config
        .job
        .clone()
        .ok_or_else(|| AppError::configuration("Configuration has no [job] section"))?;
    if let Some(channel) = args.channel {
        job.channel = channel;
    }

    let manager = crate::build_manager(&config)?;
    let summary = JobContainer::new(&manager, &job).start().await?;

    output::print_list(
        &[SummaryRow {
            tasks: summary.tasks,
            records_read: summary.records_read,
            records_written: summary.records_written,
            elapsed_ms: summary.elapsed.as_millis(),
        }],
        format,
        "No tasks ran",
    )?;
    output::print_success("Job completed", format);
    Ok(())
}
