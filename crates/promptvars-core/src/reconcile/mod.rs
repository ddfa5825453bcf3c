//! Variable state reconciliation
//!
//! - [`DiffCalculator`] - pure diff of stored vs desired variables
//! - [`ReconciliationExecutor`] - fetch, diff, delete, upsert against a
//!   [`VariableStore`](crate::storage::VariableStore)

pub mod diff;
pub mod error;
pub mod executor;

pub use diff::{DiffCalculator, DiffSummary, RecordAction, VariableDiff};
pub use error::{ReconcileError, ReconcileResult, ReconcileStep};
pub use executor::ReconciliationExecutor;
