//! Error types for SQLite storage

use promptvars_core::StorageError;
use rusqlite::ErrorCode;
use thiserror::Error;

/// SQLite storage error type
#[derive(Error, Debug)]
pub enum SqliteError {
    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Schema/migration error
    #[error("Schema error: {0}")]
    Schema(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Underlying rusqlite error
    #[error("SQLite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
}

/// Result type for SQLite operations
pub type SqliteResult<T> = Result<T, SqliteError>;

impl From<SqliteError> for StorageError {
    fn from(err: SqliteError) -> Self {
        match err {
            SqliteError::Connection(msg) => Self::Unavailable(msg),
            SqliteError::Schema(msg) => Self::Backend(msg),
            SqliteError::Serialization(e) => Self::Serialization(e.to_string()),
            SqliteError::Rusqlite(e) => match e.sqlite_error_code() {
                Some(ErrorCode::ConstraintViolation) => Self::Constraint(e.to_string()),
                Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked) => {
                    Self::Unavailable(e.to_string())
                }
                _ => match e {
                    rusqlite::Error::FromSqlConversionFailure(..)
                    | rusqlite::Error::InvalidColumnType(..) => {
                        Self::Deserialization(e.to_string())
                    }
                    other => Self::Backend(other.to_string()),
                },
            },
        }
    }
}
