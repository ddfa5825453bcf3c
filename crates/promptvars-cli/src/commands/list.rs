use anyhow::{Context, Result};
use promptvars_core::VariableStore;

use crate::cli::OutputFormat;
use crate::commands::open_executor;
use crate::config::CliConfig;
use crate::output;

pub async fn execute(config: CliConfig, prompt_id: String, format: OutputFormat) -> Result<()> {
    let executor = open_executor(&config)?;
    let rows = executor
        .store()
        .fetch_by_parent(&prompt_id)
        .await
        .with_context(|| format!("Failed to list variables of prompt '{}'", prompt_id))?;

    output::print_variables(&rows, format)
}
