//! Error types for sl-engine

use sl_core::CoreError;
use sl_db::DbError;
use std::fmt;
use thiserror::Error;

/// Step of a changeset transaction that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStage {
    Begin,
    Exec,
    Commit,
}

impl fmt::Display for TxStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxStage::Begin => write!(f, "begin"),
            TxStage::Exec => write!(f, "exec"),
            TxStage::Commit => write!(f, "commit"),
        }
    }
}

/// Migration engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Source could not be parsed (M001)
    #[error("[M001] Failed to load changesets: {0}")]
    Parse(#[from] CoreError),

    /// Changelog references a changeset the source no longer has (M002)
    #[error("[M002] Changeset is missing from source: {identity}")]
    MissingChangeset { identity: String },

    /// Stored checksum differs from the source (M003)
    #[error("[M003] Checksum does not match - existing changeset {identity} has checksum {stored}, but new changeset has checksum {computed}")]
    ChecksumMismatch {
        identity: String,
        stored: String,
        computed: String,
    },

    /// Begin/exec/commit failure, with the rollback failure if any (M004)
    #[error(
        "[M004] Transaction {} failed on changeset {}{}",
        .stage,
        .identity,
        rollback_note(.rollback_error)
    )]
    Transaction {
        identity: String,
        stage: TxStage,
        source: DbError,
        rollback_error: Option<DbError>,
    },

    /// Empty, duplicate, or unknown tag; nothing to tag or roll back (M005)
    #[error("[M005] Tag error for '{tag}': {reason}")]
    TagError { tag: String, reason: String },

    /// Changelog adapter failure outside a changeset transaction (M006)
    #[error("[M006] Changelog error: {0}")]
    Changelog(#[from] DbError),
}

fn rollback_note(err: &Option<DbError>) -> String {
    match err {
        Some(e) => format!(" (rollback also failed: {e})"),
        None => String::new(),
    }
}

impl EngineError {
    pub(crate) fn tag(tag: &str, reason: impl Into<String>) -> Self {
        EngineError::TagError {
            tag: tag.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for EngineError
pub type EngineResult<T> = Result<T, EngineError>;
