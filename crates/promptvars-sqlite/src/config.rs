//! SQLite connection settings

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const MEMORY_PATH: &str = ":memory:";

/// Settings applied when opening the database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqliteConfig {
    /// Database file, or `:memory:`
    pub path: PathBuf,

    /// Enable write-ahead logging (ignored for in-memory databases)
    pub wal_mode: bool,

    /// Enforce foreign key constraints
    pub foreign_keys: bool,

    /// How long a writer waits on a locked database
    pub busy_timeout_ms: u32,

    /// SQLite `cache_size` pragma (negative values are KiB)
    pub cache_size: i64,

    /// Memory-mapped I/O size in bytes, 0 disables it
    pub mmap_size: u64,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("promptvars.db"),
            wal_mode: true,
            foreign_keys: true,
            busy_timeout_ms: 5_000,
            cache_size: -16_000,
            mmap_size: 0,
        }
    }
}

impl SqliteConfig {
    /// File-backed database at `path` with default settings
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Private in-memory database
    pub fn memory() -> Self {
        Self {
            path: PathBuf::from(MEMORY_PATH),
            wal_mode: false,
            ..Self::default()
        }
    }

    pub fn is_memory(&self) -> bool {
        self.path.to_str() == Some(MEMORY_PATH)
    }

    #[must_use]
    pub fn with_wal_mode(mut self, enabled: bool) -> Self {
        self.wal_mode = enabled;
        self
    }

    #[must_use]
    pub fn with_busy_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.busy_timeout_ms = timeout_ms;
        self
    }
}
