use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

use crate::cli::OutputFormat;
use crate::commands::{open_executor, read_desired};
use crate::config::CliConfig;
use crate::output;

pub async fn execute(
    config: CliConfig,
    prompt_id: String,
    file: PathBuf,
    format: OutputFormat,
) -> Result<()> {
    let incoming = read_desired(&file)?;
    let executor = open_executor(&config)?;

    let rows = executor.reconcile(&prompt_id, &incoming).await?;
    info!(prompt_id = %prompt_id, variables = rows.len(), "Reconciled variables");

    output::print_variables(&rows, format)
}
