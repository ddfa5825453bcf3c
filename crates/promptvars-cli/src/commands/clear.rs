use anyhow::Result;
use tracing::info;

use crate::commands::open_executor;
use crate::config::CliConfig;

pub async fn execute(config: CliConfig, prompt_id: String) -> Result<()> {
    let executor = open_executor(&config)?;
    executor.reconcile(&prompt_id, &[]).await?;

    info!(prompt_id = %prompt_id, "Cleared variables");
    println!("Cleared variables of prompt '{}'.", prompt_id);
    Ok(())
}
