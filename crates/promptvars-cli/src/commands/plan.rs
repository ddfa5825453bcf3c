use anyhow::Result;
use std::path::PathBuf;

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

    let diff = executor.plan(&prompt_id, &incoming).await?;
    output::print_plan(&diff, format)
}
