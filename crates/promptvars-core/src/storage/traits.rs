//! VariableStore trait

use async_trait::async_trait;

use crate::storage::StorageResult;
use crate::variable::{PersistedVariable, UpsertRecord};

/// Column used to detect an existing row during a batch upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictKey {
    #[default]
    Id,
}

/// Storage for the variables of each prompt
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`. The trait makes no promise about
/// isolation between concurrent writers to the same prompt.
#[async_trait]
pub trait VariableStore: Send + Sync {
    /// All rows owned by `parent_id`, ordered by `order_index`
    async fn fetch_by_parent(&self, parent_id: &str) -> StorageResult<Vec<PersistedVariable>>;

    /// Insert records lacking an id, update records whose id exists
    ///
    /// Returns the written rows ordered by `order_index`. A violation of the
    /// unique `(parent_id, name)` rule fails the whole batch with
    /// `StorageError::Constraint`.
    async fn upsert_batch(
        &self,
        records: Vec<UpsertRecord>,
        conflict_key: ConflictKey,
    ) -> StorageResult<Vec<PersistedVariable>>;

    /// Delete rows by id; unknown ids are ignored
    async fn delete_by_ids(&self, ids: &[String]) -> StorageResult<()>;

    /// Delete every row owned by `parent_id`
    async fn delete_by_parent(&self, parent_id: &str) -> StorageResult<()>;
}

/// Blanket implementation of VariableStore for Arc<T>
#[async_trait]
impl<T: VariableStore + ?Sized> VariableStore for std::sync::Arc<T> {
    async fn fetch_by_parent(&self, parent_id: &str) -> StorageResult<Vec<PersistedVariable>> {
        (**self).fetch_by_parent(parent_id).await
    }

    async fn upsert_batch(
        &self,
        records: Vec<UpsertRecord>,
        conflict_key: ConflictKey,
    ) -> StorageResult<Vec<PersistedVariable>> {
        (**self).upsert_batch(records, conflict_key).await
    }

    async fn delete_by_ids(&self, ids: &[String]) -> StorageResult<()> {
        (**self).delete_by_ids(ids).await
    }

    async fn delete_by_parent(&self, parent_id: &str) -> StorageResult<()> {
        (**self).delete_by_parent(parent_id).await
    }
}
