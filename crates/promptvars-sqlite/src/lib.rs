//! SQLite storage backend for prompt variables
//!
//! Implements [`promptvars_core::VariableStore`] on a single SQLite file.
//!
//! ## Features
//!
//! - **Unique names**: `(prompt_id, name)` is enforced by the schema
//! - **Atomic batches**: each upsert or delete batch runs in one transaction
//! - **WAL Mode**: concurrent readers alongside the single writer
//! - **Thread Safety**: Arc<Mutex<Connection>> pattern for concurrent access
//!
//! ## Usage
//!
//! ```rust,ignore
//! use promptvars_core::{DesiredVariable, ReconciliationExecutor};
//! use promptvars_sqlite::{SqliteConfig, SqlitePool, SqliteVariableStore};
//!
//! let pool = SqlitePool::new(SqliteConfig::new("./promptvars.db"))?;
//! let executor = ReconciliationExecutor::new(SqliteVariableStore::new(pool));
//! let rows = executor.reconcile("prompt-1", &[DesiredVariable::new("topic")]).await?;
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod schema;
pub mod variable_store;

// Re-exports
pub use config::SqliteConfig;
pub use connection::SqlitePool;
pub use error::{SqliteError, SqliteResult};
pub use variable_store::SqliteVariableStore;
