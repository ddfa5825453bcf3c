pub mod clear;
pub mod list;
pub mod plan;
pub mod reconcile;

use anyhow::{Context, Result};
use promptvars_core::{DesiredVariable, ReconciliationExecutor};
use promptvars_sqlite::{SqlitePool, SqliteVariableStore};
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::config::CliConfig;

/// Open the configured database and wrap it in an executor
pub fn open_executor(config: &CliConfig) -> Result<ReconciliationExecutor<SqliteVariableStore>> {
    debug!(path = ?config.database.path, "Opening variable store");
    let pool = SqlitePool::new(config.database.clone()).with_context(|| {
        format!(
            "Failed to open database: {}",
            config.database.path.display()
        )
    })?;
    Ok(ReconciliationExecutor::new(SqliteVariableStore::new(pool)))
}

/// Read a JSON array of variables from `path`, or stdin for "-"
pub fn read_desired(path: &Path) -> Result<Vec<DesiredVariable>> {
    let contents = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read variables from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read variables file: {}", path.display()))?
    };

    parse_desired(&contents)
        .with_context(|| format!("Invalid variables file: {}", path.display()))
}

/// Parse a JSON array of variables
pub fn parse_desired(json: &str) -> Result<Vec<DesiredVariable>> {
    serde_json::from_str(json).context("Expected a JSON array of variables")
}
