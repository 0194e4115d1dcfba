//! Error types for sl-core

use thiserror::Error;

/// Core error type for Shiftlog
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Content before the first changeset header
    #[error("[E001] Invalid changeset format in {source_name} at line {line}: content appears before the first --changeset header")]
    InvalidFormat { source_name: String, line: usize },

    /// E002: Header is not `author:id`
    #[error("[E002] Invalid changeset header in {source_name} at line {line}: '{header}' (expected author:id)")]
    InvalidHeader {
        source_name: String,
        line: usize,
        header: String,
    },

    /// E003: Two changesets share one identity
    #[error("[E003] Duplicate changeset found: {identity}")]
    DuplicateChangeset { identity: String },

    /// E004: An include chain re-enters a file that is still being parsed
    #[error("[E004] Include cycle detected: {chain}")]
    IncludeCycle { chain: String },

    /// E005: IO error with file path context
    #[error("[E005] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// E006: Configuration file not found
    #[error("[E006] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E007: Invalid configuration value
    #[error("[E007] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E008: Config YAML parse error
    #[error("[E008] Failed to parse config: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
