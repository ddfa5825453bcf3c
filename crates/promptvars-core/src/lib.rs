//! Prompt variable reconciliation
//!
//! A prompt template owns an ordered list of named variables. Editors submit
//! the full desired list on every save; this crate turns that list into the
//! minimal set of inserts, updates and deletes against storage while keeping
//! variable ids stable across renames.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use promptvars_core::{DesiredVariable, InMemoryVariableStore, ReconciliationExecutor};
//!
//! let executor = ReconciliationExecutor::new(InMemoryVariableStore::new());
//! let rows = executor
//!     .reconcile("prompt-1", &[DesiredVariable::new("topic").required(true)])
//!     .await?;
//! ```

pub mod reconcile;
pub mod storage;
pub mod variable;

pub use reconcile::{
    DiffCalculator, DiffSummary, RecordAction, ReconcileError, ReconcileResult, ReconcileStep,
    ReconciliationExecutor, VariableDiff,
};
pub use storage::{
    ConflictKey, InMemoryVariableStore, StorageError, StorageResult, StoreOp, StoreOpKind,
    VariableStore,
};
pub use variable::{DesiredVariable, PersistedVariable, UpsertRecord, VariableType};
