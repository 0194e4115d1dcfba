//! Error types for sl-db

use thiserror::Error;

/// Changelog adapter errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Statement execution error (D002)
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// BEGIN/COMMIT/ROLLBACK failure (D003)
    #[error("[D003] Transaction failed: {0}")]
    TransactionError(String),

    /// Constraint violation reported by the store (D004)
    #[error("[D004] Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Tag already carried by another entry (D005)
    #[error("[D005] Tag already found in changelog: {tag}")]
    TagInUse { tag: String },

    /// No changelog entry with the given identity (D006)
    #[error("[D006] Changelog entry not found: {identity}")]
    EntryNotFound { identity: String },

    /// Stored record could not be decoded (D007)
    #[error("[D007] Corrupt changelog record: {0}")]
    CorruptRecord(String),

    /// Changelog table name is not a plain identifier (D008)
    #[error("[D008] Invalid changelog table name: {0}")]
    InvalidTableName(String),

    /// IO error on a changelog file (D009)
    #[error("[D009] Failed to access '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// JSON changelog encode/decode error (D010)
    #[error("[D010] Invalid JSON changelog '{path}': {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        // duckdb::Error does not expose structured constraint variants, so
        // classify by message.
        let msg = err.to_string();
        if msg.contains("Constraint Error") || msg.contains("Duplicate key") {
            DbError::ConstraintViolation(msg)
        } else {
            DbError::ExecutionError(msg)
        }
    }
}
