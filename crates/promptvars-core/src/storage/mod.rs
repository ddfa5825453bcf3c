//! Persistence abstraction for prompt variables
//!
//! The reconciliation engine talks to storage only through [`VariableStore`].
//! Backends live in their own crates (SQLite in `promptvars-sqlite`); an
//! in-memory implementation ships here for tests and embedding.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{StorageError, StorageResult};
pub use memory::{InMemoryVariableStore, StoreOp, StoreOpKind};
pub use traits::{ConflictKey, VariableStore};
