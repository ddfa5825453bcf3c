use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use promptvars_cli::{
    cli::{Cli, Commands},
    commands,
    config::CliConfig,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging (stderr, so JSON output stays clean)
    let env_filter = match cli.level_filter() {
        Some(level) => EnvFilter::new(format!(
            "promptvars_cli={level},promptvars_core={level},promptvars_sqlite={level}"
        )),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let config = CliConfig::load(cli.config, cli.db_path)?;
    let format = cli.format;

    match cli.command {
        Commands::Reconcile { prompt_id, file } => {
            commands::reconcile::execute(config, prompt_id, file, format).await?
        }
        Commands::Plan { prompt_id, file } => {
            commands::plan::execute(config, prompt_id, file, format).await?
        }
        Commands::List { prompt_id } => commands::list::execute(config, prompt_id, format).await?,
        Commands::Clear { prompt_id } => commands::clear::execute(config, prompt_id).await?,
        Commands::Config => println!("{}", config.display_as_toml()?),
    }

    Ok(())
}
