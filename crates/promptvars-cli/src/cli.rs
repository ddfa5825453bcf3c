use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

/// Log level options for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    Off,
    /// Error messages only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages
    Info,
    /// Debug messages
    Debug,
    /// Trace-level messages (most verbose)
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "pv")]
#[command(about = "pv - reconcile prompt template variables with their stored state")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Set log level (off, error, warn, info, debug, trace)
    /// If not specified, RUST_LOG is used, else 'warn'
    #[arg(short = 'l', long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Enable verbose logging (shortcut for --log-level=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (defaults to ~/.config/promptvars/config.toml)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Database file (overrides config file and PROMPTVARS_DB_PATH)
    #[arg(long = "db", global = true)]
    pub db_path: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

impl Cli {
    /// Effective log level; `None` defers to RUST_LOG
    pub fn level_filter(&self) -> Option<LevelFilter> {
        if self.verbose {
            return Some(LevelFilter::DEBUG);
        }
        self.log_level.map(Into::into)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Make a prompt's stored variables match a JSON file
    Reconcile {
        /// Prompt identifier
        prompt_id: String,

        /// JSON array of variables ("-" reads stdin)
        file: PathBuf,
    },

    /// Show what `reconcile` would change, without writing
    Plan {
        /// Prompt identifier
        prompt_id: String,

        /// JSON array of variables ("-" reads stdin)
        file: PathBuf,
    },

    /// List a prompt's stored variables in order
    List {
        /// Prompt identifier
        prompt_id: String,
    },

    /// Delete every variable of a prompt
    Clear {
        /// Prompt identifier
        prompt_id: String,
    },

    /// Print the effective configuration as TOML
    Config,
}
