//! Applies a variable diff to storage
//!
//! One reconcile call is a single attempt: fetch the stored rows, diff them
//! against the target list, delete obsolete rows, then upsert. Obsolete rows
//! are always gone before the upsert batch is written.
//!
//! Nothing is cached between calls. A failed call can be retried as a whole
//! with the same input; the diff is recomputed from whatever storage holds at
//! that point and converges on the same final state.
//!
//! Concurrent calls for the same prompt are not serialized here. Callers that
//! need that guarantee must hold a per-prompt lock around `reconcile`.

use std::collections::HashSet;

use tracing::{debug, error};

use crate::reconcile::diff::{DiffCalculator, VariableDiff};
use crate::reconcile::error::{ReconcileError, ReconcileResult, ReconcileStep};
use crate::storage::{ConflictKey, StorageError, VariableStore};
use crate::variable::{DesiredVariable, PersistedVariable};

/// Reconciles a prompt's stored variables with a desired list
#[derive(Debug, Clone)]
pub struct ReconciliationExecutor<S> {
    store: S,
}

impl<S: VariableStore> ReconciliationExecutor<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Make storage for `parent_id` match `incoming` and return the stored rows
    ///
    /// The result is ordered by `order_index`, which equals each entry's
    /// position in `incoming`. An empty `incoming` deletes every variable of
    /// the prompt without fetching first.
    ///
    /// # Errors
    ///
    /// - [`ReconcileError::InvalidArgument`] for an empty `parent_id`, an empty
    ///   variable name, or duplicate names or ids in `incoming`; no storage
    ///   call is made
    /// - [`ReconcileError::Storage`] when any storage call fails
    pub async fn reconcile(
        &self,
        parent_id: &str,
        incoming: &[DesiredVariable],
    ) -> ReconcileResult<Vec<PersistedVariable>> {
        validate(parent_id, incoming)?;

        if incoming.is_empty() {
            debug!(parent_id, "Clearing all variables");
            self.store
                .delete_by_parent(parent_id)
                .await
                .map_err(|e| failure(parent_id, ReconcileStep::Purge, 0, 0, e))?;
            return Ok(Vec::new());
        }

        let diff = self.diff(parent_id, incoming).await?;
        debug!(
            parent_id,
            inserted = diff.summary.inserted,
            updated = diff.summary.updated,
            unchanged = diff.summary.unchanged,
            deleted = diff.summary.deleted,
            "Computed variable diff"
        );

        if !diff.to_delete_ids.is_empty() {
            self.store
                .delete_by_ids(&diff.to_delete_ids)
                .await
                .map_err(|e| {
                    failure(
                        parent_id,
                        ReconcileStep::Delete,
                        incoming.len(),
                        diff.to_delete_ids.len(),
                        e,
                    )
                })?;
        }

        let records = diff.to_upsert.len();
        let mut rows = self
            .store
            .upsert_batch(diff.to_upsert, ConflictKey::Id)
            .await
            .map_err(|e| failure(parent_id, ReconcileStep::Upsert, incoming.len(), records, e))?;

        rows.sort_by_key(|row| row.order_index);
        Ok(rows)
    }

    /// Compute the diff `reconcile` would apply, without applying it
    pub async fn plan(
        &self,
        parent_id: &str,
        incoming: &[DesiredVariable],
    ) -> ReconcileResult<VariableDiff> {
        validate(parent_id, incoming)?;
        self.diff(parent_id, incoming).await
    }

    async fn diff(
        &self,
        parent_id: &str,
        incoming: &[DesiredVariable],
    ) -> ReconcileResult<VariableDiff> {
        let existing = self
            .store
            .fetch_by_parent(parent_id)
            .await
            .map_err(|e| failure(parent_id, ReconcileStep::Fetch, incoming.len(), 0, e))?;

        Ok(DiffCalculator::calculate(parent_id, &existing, incoming))
    }
}

/// Reject input that cannot reconcile cleanly
fn validate(parent_id: &str, incoming: &[DesiredVariable]) -> ReconcileResult<()> {
    if parent_id.trim().is_empty() {
        return Err(ReconcileError::invalid_argument("parent id must not be empty"));
    }

    let mut names = HashSet::with_capacity(incoming.len());
    let mut ids = HashSet::new();

    for (index, desired) in incoming.iter().enumerate() {
        if desired.name.trim().is_empty() {
            return Err(ReconcileError::invalid_argument(format!(
                "variable at position {index} has an empty name"
            )));
        }
        if !names.insert(desired.name.as_str()) {
            return Err(ReconcileError::invalid_argument(format!(
                "duplicate variable name '{}'",
                desired.name
            )));
        }
        if let Some(id) = desired.id.as_deref() {
            if !ids.insert(id) {
                return Err(ReconcileError::invalid_argument(format!(
                    "variable id '{id}' is referenced more than once"
                )));
            }
        }
    }

    Ok(())
}

fn failure(
    parent_id: &str,
    step: ReconcileStep,
    incoming: usize,
    records: usize,
    source: StorageError,
) -> ReconcileError {
    error!(
        parent_id,
        %step,
        incoming,
        records,
        error = %source,
        "Variable reconciliation failed"
    );
    ReconcileError::Storage {
        parent_id: parent_id.to_string(),
        step,
        source,
    }
}
