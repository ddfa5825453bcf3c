//! In-memory VariableStore
//!
//! Behaves like a table with a primary key on `id` and a unique index on
//! `(parent_id, name)`. Every call is recorded, and a failure can be armed
//! for the next call of a given kind, which makes partial-failure scenarios
//! reproducible in tests.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use tracing::trace;
use uuid::Uuid;

use crate::storage::{ConflictKey, StorageError, StorageResult, VariableStore};
use crate::variable::{PersistedVariable, UpsertRecord};

/// A recorded call against the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    FetchByParent(String),
    /// Number of records in the batch
    UpsertBatch(usize),
    DeleteByIds(Vec<String>),
    DeleteByParent(String),
}

impl StoreOp {
    pub fn kind(&self) -> StoreOpKind {
        match self {
            StoreOp::FetchByParent(_) => StoreOpKind::FetchByParent,
            StoreOp::UpsertBatch(_) => StoreOpKind::UpsertBatch,
            StoreOp::DeleteByIds(_) => StoreOpKind::DeleteByIds,
            StoreOp::DeleteByParent(_) => StoreOpKind::DeleteByParent,
        }
    }
}

/// Operation kinds, used to arm failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOpKind {
    FetchByParent,
    UpsertBatch,
    DeleteByIds,
    DeleteByParent,
}

#[derive(Default)]
struct State {
    rows: HashMap<String, PersistedVariable>,
    ops: Vec<StoreOp>,
    armed: HashMap<StoreOpKind, StorageError>,
}

/// VariableStore backed by a `HashMap` behind a mutex
#[derive(Default)]
pub struct InMemoryVariableStore {
    state: Mutex<State>,
}

impl InMemoryVariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `rows`
    ///
    /// Seeding is not recorded as an operation.
    pub fn with_rows(rows: impl IntoIterator<Item = PersistedVariable>) -> Self {
        let store = Self::new();
        {
            let mut state = store.state.lock();
            for row in rows {
                state.rows.insert(row.id.clone(), row);
            }
        }
        store
    }

    /// Fail the next call of `kind` with `error` (one shot)
    pub fn fail_next(&self, kind: StoreOpKind, error: StorageError) {
        self.state.lock().armed.insert(kind, error);
    }

    /// Calls made so far, in order
    pub fn operations(&self) -> Vec<StoreOp> {
        self.state.lock().ops.clone()
    }

    pub fn clear_operations(&self) {
        self.state.lock().ops.clear();
    }

    /// Snapshot of a prompt's rows ordered by `order_index`, without recording a call
    pub fn rows_for(&self, parent_id: &str) -> Vec<PersistedVariable> {
        let state = self.state.lock();
        sorted_rows(&state.rows, parent_id)
    }

    /// Total rows across all prompts
    pub fn len(&self) -> usize {
        self.state.lock().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Record `op` and return the armed failure for its kind, if any
    fn begin(state: &mut State, op: StoreOp) -> StorageResult<()> {
        trace!(?op, "in-memory store call");
        let kind = op.kind();
        state.ops.push(op);
        match state.armed.remove(&kind) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn sorted_rows(rows: &HashMap<String, PersistedVariable>, parent_id: &str) -> Vec<PersistedVariable> {
    let mut out: Vec<PersistedVariable> = rows
        .values()
        .filter(|row| row.parent_id == parent_id)
        .cloned()
        .collect();
    out.sort_by(|a, b| a.order_index.cmp(&b.order_index).then_with(|| a.name.cmp(&b.name)));
    out
}

/// Check the unique `(parent_id, name)` rule over a full table image
fn check_unique_names(rows: &HashMap<String, PersistedVariable>) -> StorageResult<()> {
    let mut seen = HashSet::with_capacity(rows.len());
    for row in rows.values() {
        if !seen.insert((row.parent_id.as_str(), row.name.as_str())) {
            return Err(StorageError::constraint(format!(
                "duplicate variable name '{}' for prompt '{}'",
                row.name, row.parent_id
            )));
        }
    }
    Ok(())
}

#[async_trait]
impl VariableStore for InMemoryVariableStore {
    async fn fetch_by_parent(&self, parent_id: &str) -> StorageResult<Vec<PersistedVariable>> {
        let mut state = self.state.lock();
        Self::begin(&mut state, StoreOp::FetchByParent(parent_id.to_string()))?;
        Ok(sorted_rows(&state.rows, parent_id))
    }

    async fn upsert_batch(
        &self,
        records: Vec<UpsertRecord>,
        _conflict_key: ConflictKey,
    ) -> StorageResult<Vec<PersistedVariable>> {
        let mut state = self.state.lock();
        Self::begin(&mut state, StoreOp::UpsertBatch(records.len()))?;

        // Apply to a copy so a rejected batch leaves nothing behind
        let mut next = state.rows.clone();
        let now = Utc::now();
        let mut written = Vec::with_capacity(records.len());

        for record in records {
            let (id, created_at) = match record.id.clone() {
                Some(id) => {
                    let created_at = next.get(&id).map(|row| row.created_at).unwrap_or(now);
                    (id, created_at)
                }
                None => (Uuid::new_v4().to_string(), now),
            };
            next.insert(id.clone(), record.into_persisted(id.clone(), created_at));
            if !written.contains(&id) {
                written.push(id);
            }
        }

        check_unique_names(&next)?;
        state.rows = next;

        let mut out: Vec<PersistedVariable> = written
            .iter()
            .filter_map(|id| state.rows.get(id).cloned())
            .collect();
        out.sort_by_key(|row| row.order_index);
        Ok(out)
    }

    async fn delete_by_ids(&self, ids: &[String]) -> StorageResult<()> {
        let mut state = self.state.lock();
        Self::begin(&mut state, StoreOp::DeleteByIds(ids.to_vec()))?;
        for id in ids {
            state.rows.remove(id);
        }
        Ok(())
    }

    async fn delete_by_parent(&self, parent_id: &str) -> StorageResult<()> {
        let mut state = self.state.lock();
        Self::begin(&mut state, StoreOp::DeleteByParent(parent_id.to_string()))?;
        state.rows.retain(|_, row| row.parent_id != parent_id);
        Ok(())
    }
}
