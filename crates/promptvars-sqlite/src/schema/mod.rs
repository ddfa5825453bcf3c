//! Schema management and migrations

use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::{SqliteError, SqliteResult};

/// Schema version - increment when making schema changes
const SCHEMA_VERSION: i32 = 1;

/// Apply all pending migrations
pub fn apply_migrations(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    let current_version = get_current_version(conn)?;
    debug!(current_version, target_version = SCHEMA_VERSION, "Checking migrations");

    if current_version < SCHEMA_VERSION {
        info!(from = current_version, to = SCHEMA_VERSION, "Applying schema migrations");
        apply_migration_v1(conn)?;
    }

    Ok(())
}

/// Get current schema version
pub fn get_current_version(conn: &Connection) -> SqliteResult<i32> {
    let version: Option<i32> =
        conn.query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
            row.get(0)
        })?;

    Ok(version.unwrap_or(0))
}

fn record_migration(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("INSERT INTO schema_migrations (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Migration v1: prompt variables table
fn apply_migration_v1(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(SCHEMA_V1)
        .map_err(|e| SqliteError::Schema(format!("Failed to apply v1 schema: {}", e)))?;

    record_migration(conn, 1)?;
    info!("Migration v1 applied");
    Ok(())
}

const SCHEMA_V1: &str = r#"
-- ============================================================================
-- TABLE: prompt_variables
-- ============================================================================
-- Named inputs of a prompt template. Prompts themselves live elsewhere;
-- prompt_id is an opaque reference.

CREATE TABLE IF NOT EXISTS prompt_variables (
    id TEXT PRIMARY KEY NOT NULL,
    prompt_id TEXT NOT NULL,
    name TEXT NOT NULL,
    type TEXT NOT NULL CHECK (type IN (
        'STRING', 'NUMBER', 'BOOLEAN', 'ENUM', 'DATE', 'MULTISTRING'
    )),
    required INTEGER NOT NULL DEFAULT 0,
    default_value TEXT,
    help TEXT,
    pattern TEXT,
    options TEXT,  -- JSON array of strings
    order_index INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE(prompt_id, name)
);

CREATE INDEX IF NOT EXISTS idx_prompt_variables_prompt
    ON prompt_variables(prompt_id, order_index);
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_applies_cleanly() {
        let conn = Connection::open_in_memory().unwrap();
        apply_migrations(&conn).unwrap();

        assert_eq!(get_current_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_schema_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        apply_migrations(&conn).unwrap();
        apply_migrations(&conn).unwrap();

        assert_eq!(get_current_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_unique_name_per_prompt() {
        let conn = Connection::open_in_memory().unwrap();
        apply_migrations(&conn).unwrap();

        let insert = "INSERT INTO prompt_variables (id, prompt_id, name, type, created_at, updated_at)
                      VALUES (?1, ?2, ?3, 'STRING', datetime('now'), datetime('now'))";
        conn.execute(insert, ["v1", "p1", "topic"]).unwrap();
        conn.execute(insert, ["v2", "p2", "topic"]).unwrap();

        let err = conn.execute(insert, ["v3", "p1", "topic"]).unwrap_err();
        assert_eq!(
            err.sqlite_error_code(),
            Some(rusqlite::ErrorCode::ConstraintViolation)
        );
    }

    #[test]
    fn test_type_check() {
        let conn = Connection::open_in_memory().unwrap();
        apply_migrations(&conn).unwrap();

        let result = conn.execute(
            "INSERT INTO prompt_variables (id, prompt_id, name, type, created_at, updated_at)
             VALUES ('v1', 'p1', 'x', 'TEXT', datetime('now'), datetime('now'))",
            [],
        );
        assert!(result.is_err());
    }
}
