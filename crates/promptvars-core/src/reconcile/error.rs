//! Reconciliation error types

use std::fmt;

use thiserror::Error;

use crate::storage::StorageError;

/// Persistence step of a reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileStep {
    Fetch,
    Delete,
    Upsert,
    /// Full purge for an empty target list
    Purge,
}

impl fmt::Display for ReconcileStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReconcileStep::Fetch => "fetch",
            ReconcileStep::Delete => "delete",
            ReconcileStep::Upsert => "upsert",
            ReconcileStep::Purge => "purge",
        };
        f.write_str(name)
    }
}

/// Error returned by [`ReconciliationExecutor`](super::ReconciliationExecutor)
#[derive(Error, Debug, Clone)]
pub enum ReconcileError {
    /// Rejected before any storage call
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Storage failure during {step} for prompt '{parent_id}': {source}")]
    Storage {
        parent_id: String,
        step: ReconcileStep,
        #[source]
        source: StorageError,
    },
}

pub type ReconcileResult<T> = Result<T, ReconcileError>;

impl ReconcileError {
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// The underlying storage error, if this is a storage failure
    pub fn storage_error(&self) -> Option<&StorageError> {
        match self {
            Self::Storage { source, .. } => Some(source),
            Self::InvalidArgument(_) => None,
        }
    }

    /// True when retrying the whole reconcile call may succeed
    pub fn is_retryable(&self) -> bool {
        self.storage_error().is_some_and(StorageError::is_retryable)
    }
}
