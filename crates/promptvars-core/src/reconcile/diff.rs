//! Pure diff between stored and desired variables
//!
//! No I/O happens here. Given the rows a prompt currently owns and the list
//! the caller wants, [`DiffCalculator::calculate`] decides which records to
//! upsert (keeping ids where a row continues) and which ids to delete.
//!
//! Matching per incoming entry at position `i`:
//!
//! 1. explicit `id` that exists in storage: update or rename that row
//! 2. otherwise a stored row with the same `name`: update that row
//! 3. otherwise: insert, storage assigns the id
//!
//! Every record gets `order_index = i`. A stored row is deleted only when
//! neither its id nor its name appears in the incoming list.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::variable::{DesiredVariable, PersistedVariable, UpsertRecord};

/// Counts describing a diff, by effect on storage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffSummary {
    /// Records without an id
    pub inserted: usize,
    /// Records that change an existing row
    pub updated: usize,
    /// Records identical to the row they target
    pub unchanged: usize,
    pub deleted: usize,
}

impl DiffSummary {
    /// True when applying the diff changes nothing
    pub fn is_noop(&self) -> bool {
        self.inserted == 0 && self.updated == 0 && self.deleted == 0
    }
}

/// What a single upsert record does to the row it targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordAction {
    Insert,
    Update,
    Unchanged,
}

impl RecordAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Unchanged => "keep",
        }
    }
}

/// Output of [`DiffCalculator::calculate`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VariableDiff {
    /// One record per incoming entry, in incoming order
    pub to_upsert: Vec<UpsertRecord>,
    /// Classification of each `to_upsert` record, index for index
    pub actions: Vec<RecordAction>,
    /// Obsolete row ids, in the order the rows were supplied
    pub to_delete_ids: Vec<String>,
    pub summary: DiffSummary,
}

impl VariableDiff {
    /// True when applying this diff would not change storage
    ///
    /// Reconciling a prompt against a re-read of its own stored rows always
    /// yields a no-op diff.
    pub fn is_noop(&self) -> bool {
        self.summary.is_noop()
    }

    /// Records that will be inserted
    pub fn inserts(&self) -> impl Iterator<Item = &UpsertRecord> {
        self.to_upsert.iter().filter(|r| r.is_insert())
    }

    /// Records that target an existing row
    pub fn updates(&self) -> impl Iterator<Item = &UpsertRecord> {
        self.to_upsert.iter().filter(|r| !r.is_insert())
    }

    /// Upsert records paired with their classification
    pub fn planned(&self) -> impl Iterator<Item = (RecordAction, &UpsertRecord)> {
        self.actions.iter().copied().zip(&self.to_upsert)
    }
}

/// Computes [`VariableDiff`]s
///
/// Stateless; safe to call from any number of threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiffCalculator;

impl DiffCalculator {
    /// Diff `existing` rows of `parent_id` against the `incoming` target list
    ///
    /// Runs in O(existing + incoming) using one index by id and one by name.
    /// Duplicate names in `incoming` are a caller error; the calculator does
    /// not reject them (later entries win the name index).
    pub fn calculate(
        parent_id: &str,
        existing: &[PersistedVariable],
        incoming: &[DesiredVariable],
    ) -> VariableDiff {
        let by_id: HashMap<&str, &PersistedVariable> =
            existing.iter().map(|row| (row.id.as_str(), row)).collect();
        let by_name: HashMap<&str, &PersistedVariable> =
            existing.iter().map(|row| (row.name.as_str(), row)).collect();

        let referenced_ids: HashSet<&str> =
            incoming.iter().filter_map(|d| d.id.as_deref()).collect();
        let incoming_names: HashSet<&str> = incoming.iter().map(|d| d.name.as_str()).collect();

        // Rows claimed through an explicit id cannot also be claimed by name
        let claimed: HashSet<&str> = referenced_ids
            .iter()
            .copied()
            .filter(|id| by_id.contains_key(id))
            .collect();

        let mut summary = DiffSummary::default();
        let mut to_upsert = Vec::with_capacity(incoming.len());
        let mut actions = Vec::with_capacity(incoming.len());

        for (index, desired) in incoming.iter().enumerate() {
            let target = desired
                .id
                .as_deref()
                .and_then(|id| by_id.get(id))
                .or_else(|| {
                    by_name
                        .get(desired.name.as_str())
                        .filter(|row| !claimed.contains(row.id.as_str()))
                })
                .copied();

            let record = UpsertRecord::from_desired(
                target.map(|row| row.id.clone()),
                parent_id,
                desired,
                order_index(index),
            );

            let action = match target {
                None => {
                    summary.inserted += 1;
                    RecordAction::Insert
                }
                Some(row) if record.matches_persisted(row) => {
                    summary.unchanged += 1;
                    RecordAction::Unchanged
                }
                Some(_) => {
                    summary.updated += 1;
                    RecordAction::Update
                }
            };
            actions.push(action);
            to_upsert.push(record);
        }

        let to_delete_ids: Vec<String> = existing
            .iter()
            .filter(|row| {
                !referenced_ids.contains(row.id.as_str())
                    && !incoming_names.contains(row.name.as_str())
            })
            .map(|row| row.id.clone())
            .collect();
        summary.deleted = to_delete_ids.len();

        VariableDiff {
            to_upsert,
            actions,
            to_delete_ids,
            summary,
        }
    }
}

fn order_index(position: usize) -> u32 {
    u32::try_from(position).unwrap_or(u32::MAX)
}
