use anyhow::{Context, Result};
use promptvars_sqlite::SqliteConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the database path
pub const DB_PATH_ENV: &str = "PROMPTVARS_DB_PATH";

/// CLI configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Database settings
    #[serde(default = "default_database")]
    pub database: SqliteConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
        }
    }
}

fn default_database() -> SqliteConfig {
    let path = dirs::data_dir()
        .map(|dir| dir.join("promptvars").join("promptvars.db"))
        .unwrap_or_else(|| PathBuf::from("promptvars.db"));
    SqliteConfig::new(path)
}

impl CliConfig {
    /// Load configuration: file (or defaults), then env, then CLI flag
    pub fn load(config_file: Option<PathBuf>, db_path: Option<PathBuf>) -> Result<Self> {
        let mut config = Self::from_file_or_default(config_file)?;

        if let Ok(path) = std::env::var(DB_PATH_ENV) {
            if !path.is_empty() {
                config.database.path = PathBuf::from(path);
            }
        }

        if let Some(path) = db_path {
            config.database.path = path;
        }

        Ok(config)
    }

    /// Default config file location
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("promptvars").join("config.toml"))
    }

    fn from_file_or_default(config_file: Option<PathBuf>) -> Result<Self> {
        match config_file {
            // An explicit path must exist
            Some(path) => Self::from_file(&path),
            None => match Self::default_config_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path),
                None => Ok(Self::default()),
            },
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Display the current configuration as TOML
    pub fn display_as_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config as TOML")
    }
}
