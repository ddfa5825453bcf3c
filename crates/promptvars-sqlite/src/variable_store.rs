//! VariableStore implementation for SQLite

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use promptvars_core::{
    ConflictKey, PersistedVariable, StorageError, StorageResult, UpsertRecord, VariableStore,
    VariableType,
};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;
use uuid::Uuid;

use crate::connection::SqlitePool;
use crate::error::SqliteResult;

const SELECT_COLUMNS: &str = "id, prompt_id, name, type, required, default_value, help, \
                              pattern, options, order_index, created_at";

/// SQLite implementation of VariableStore
#[derive(Clone)]
pub struct SqliteVariableStore {
    pool: SqlitePool,
}

impl SqliteVariableStore {
    /// Create a store over the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run blocking database work off the async executor
    async fn blocking<F, T>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&SqlitePool) -> SqliteResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || f(&pool))
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?
            .map_err(Into::into)
    }
}

#[async_trait]
impl VariableStore for SqliteVariableStore {
    async fn fetch_by_parent(&self, parent_id: &str) -> StorageResult<Vec<PersistedVariable>> {
        let parent_id = parent_id.to_string();

        self.blocking(move |pool| {
            pool.with_connection(|conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {SELECT_COLUMNS} FROM prompt_variables
                     WHERE prompt_id = ?1
                     ORDER BY order_index, name"
                ))?;

                let rows = stmt
                    .query_map([&parent_id], row_to_variable)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;

                Ok(rows)
            })
        })
        .await
    }

    async fn upsert_batch(
        &self,
        records: Vec<UpsertRecord>,
        _conflict_key: ConflictKey,
    ) -> StorageResult<Vec<PersistedVariable>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        self.blocking(move |pool| {
            pool.with_transaction(|tx| {
                let now = Utc::now().to_rfc3339();
                let mut written: Vec<String> = Vec::with_capacity(records.len());
                let mut seen = HashSet::with_capacity(records.len());

                // UNIQUE(prompt_id, name) is checked per statement, so names of
                // rows rewritten by this batch must not block each other
                let parked = park_names(tx, &records)?;

                for record in &records {
                    let id = record
                        .id
                        .clone()
                        .unwrap_or_else(|| Uuid::new_v4().to_string());
                    let options = record
                        .options
                        .as_ref()
                        .map(serde_json::to_string)
                        .transpose()?;

                    tx.execute(
                        r#"
                        INSERT INTO prompt_variables (
                            id, prompt_id, name, type, required, default_value, help,
                            pattern, options, order_index, created_at, updated_at
                        )
                        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)
                        ON CONFLICT(id) DO UPDATE SET
                            prompt_id = excluded.prompt_id,
                            name = excluded.name,
                            type = excluded.type,
                            required = excluded.required,
                            default_value = excluded.default_value,
                            help = excluded.help,
                            pattern = excluded.pattern,
                            options = excluded.options,
                            order_index = excluded.order_index,
                            updated_at = excluded.updated_at
                        "#,
                        params![
                            id,
                            record.parent_id,
                            record.name,
                            record.var_type.as_str(),
                            record.required,
                            record.default_value,
                            record.help,
                            record.pattern,
                            options,
                            record.order_index,
                            now,
                        ],
                    )?;

                    if seen.insert(id.clone()) {
                        written.push(id);
                    }
                }

                let mut rows = Vec::with_capacity(written.len());
                for id in &written {
                    if let Some(row) = fetch_by_id(tx, id)? {
                        rows.push(row);
                    }
                }
                rows.sort_by_key(|row| row.order_index);

                debug!(
                    records = records.len(),
                    written = rows.len(),
                    parked,
                    "Upserted variables"
                );
                Ok(rows)
            })
        })
        .await
    }

    async fn delete_by_ids(&self, ids: &[String]) -> StorageResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let ids = ids.to_vec();

        self.blocking(move |pool| {
            pool.with_transaction(|tx| {
                let mut stmt = tx.prepare("DELETE FROM prompt_variables WHERE id = ?1")?;
                let mut deleted = 0;
                for id in &ids {
                    deleted += stmt.execute([id])?;
                }
                debug!(requested = ids.len(), deleted, "Deleted variables by id");
                Ok(())
            })
        })
        .await
    }

    async fn delete_by_parent(&self, parent_id: &str) -> StorageResult<()> {
        let parent_id = parent_id.to_string();

        self.blocking(move |pool| {
            pool.with_connection(|conn| {
                let deleted = conn.execute(
                    "DELETE FROM prompt_variables WHERE prompt_id = ?1",
                    [&parent_id],
                )?;
                debug!(parent_id = %parent_id, deleted, "Deleted all variables of prompt");
                Ok(())
            })
        })
        .await
    }
}

/// Move the names of rows targeted by `records` to a placeholder unique per id
///
/// Every parked row is overwritten by its record later in the same
/// transaction, so no placeholder is ever committed.
fn park_names(conn: &Connection, records: &[UpsertRecord]) -> SqliteResult<usize> {
    let mut stmt = conn.prepare_cached(
        "UPDATE prompt_variables SET name = char(0) || id WHERE id = ?1",
    )?;
    let mut parked = 0;
    for id in records.iter().filter_map(|r| r.id.as_deref()) {
        parked += stmt.execute([id])?;
    }
    Ok(parked)
}

fn fetch_by_id(conn: &Connection, id: &str) -> SqliteResult<Option<PersistedVariable>> {
    let row = conn
        .query_row(
            &format!("SELECT {SELECT_COLUMNS} FROM prompt_variables WHERE id = ?1"),
            [id],
            row_to_variable,
        )
        .optional()?;
    Ok(row)
}

/// Convert a database row to a PersistedVariable
fn row_to_variable(row: &rusqlite::Row) -> rusqlite::Result<PersistedVariable> {
    let var_type: String = row.get(3)?;
    let var_type: VariableType = var_type
        .parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;

    let options: Option<String> = row.get(8)?;
    let options = options
        .map(|json| serde_json::from_str::<Vec<String>>(&json))
        .transpose()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(8, Type::Text, Box::new(e)))?;

    let created_at: String = row.get(10)?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(10, Type::Text, Box::new(e)))?;

    Ok(PersistedVariable {
        id: row.get(0)?,
        parent_id: row.get(1)?,
        name: row.get(2)?,
        var_type,
        required: row.get(4)?,
        default_value: row.get(5)?,
        help: row.get(6)?,
        pattern: row.get(7)?,
        options,
        order_index: row.get(9)?,
        created_at,
    })
}
