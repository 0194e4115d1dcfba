//! Configuration types and parsing for shiftlog.yml

use crate::error::{CoreError, CoreResult};
use crate::parser::DEFAULT_FORMAT_VERSION;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Config file names looked up in a project directory, in order
pub const CONFIG_FILE_NAMES: &[&str] = &["shiftlog.yml", "shiftlog.yaml"];

/// Default name of the changelog table
pub const DEFAULT_CHANGELOG_TABLE: &str = "shiftlog_changelog";

/// DuckDB path that selects a throwaway in-memory database
pub const MEMORY_DATABASE: &str = ":memory:";

/// Main project configuration from shiftlog.yml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Changelog storage configuration
    #[serde(default)]
    pub changelog: ChangelogConfig,

    /// How drift in already-applied changesets is handled
    #[serde(default)]
    pub checksum_mode: ChecksumMode,

    /// Source-format version tag recorded with each changelog entry
    #[serde(default = "default_format_version")]
    pub format_version: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            changelog: ChangelogConfig::default(),
            checksum_mode: ChecksumMode::default(),
            format_version: default_format_version(),
        }
    }
}

/// Changelog backend selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChangelogBackend {
    /// Ledger table inside the DuckDB target database (default)
    #[default]
    DuckDb,
    /// Ledger kept in a JSON file next to the project
    JsonFile,
}

impl fmt::Display for ChangelogBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangelogBackend::DuckDb => write!(f, "duckdb"),
            ChangelogBackend::JsonFile => write!(f, "jsonfile"),
        }
    }
}

/// Changelog storage configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChangelogConfig {
    /// Backend type (duckdb or jsonfile)
    #[serde(rename = "type", default)]
    pub backend: ChangelogBackend,

    /// DuckDB database path (file or :memory:); changesets run against it
    #[serde(default = "default_db_path")]
    pub path: String,

    /// Changelog table name for the duckdb backend
    #[serde(default = "default_table")]
    pub table: String,

    /// Ledger file for the jsonfile backend
    #[serde(default)]
    pub json_path: Option<String>,
}

impl ChangelogConfig {
    /// Whether changesets run against a throwaway in-memory database
    pub fn is_in_memory(&self) -> bool {
        self.path.trim() == MEMORY_DATABASE
    }
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        Self {
            backend: ChangelogBackend::default(),
            path: default_db_path(),
            table: default_table(),
            json_path: None,
        }
    }
}

/// Drift policy for changesets whose stored checksum no longer matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumMode {
    /// Abort the run on the first mismatch (default)
    #[default]
    Error,
    /// Report the mismatch and keep going
    Ignore,
    /// Overwrite the stored checksum and keep going
    Update,
}

impl fmt::Display for ChecksumMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChecksumMode::Error => write!(f, "error"),
            ChecksumMode::Ignore => write!(f, "ignore"),
            ChecksumMode::Update => write!(f, "update"),
        }
    }
}

impl FromStr for ChecksumMode {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(ChecksumMode::Error),
            "ignore" => Ok(ChecksumMode::Ignore),
            "update" => Ok(ChecksumMode::Update),
            other => Err(CoreError::ConfigInvalid {
                message: format!(
                    "unknown checksum mode '{other}' (expected error, ignore, or update)"
                ),
            }),
        }
    }
}

fn default_format_version() -> String {
    DEFAULT_FORMAT_VERSION.to_string()
}

fn default_db_path() -> String {
    MEMORY_DATABASE.to_string()
}

fn default_table() -> String {
    DEFAULT_CHANGELOG_TABLE.to_string()
}

impl Config {
    /// Load configuration from a file path.
    ///
    /// The result is not validated; callers apply their overrides first and
    /// then call [`Config::validate`].
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Find the config file in a project directory, if there is one
    pub fn find_in_dir(dir: &Path) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|p| p.exists())
    }

    /// Load configuration from a project directory, falling back to the
    /// defaults when no config file exists
    pub fn load_or_default(dir: &Path) -> CoreResult<Self> {
        match Self::find_in_dir(dir) {
            Some(path) => Self::load(&path),
            None => {
                log::debug!("No config file in {}, using defaults", dir.display());
                Ok(Self::default())
            }
        }
    }

    /// Resolve the JSON ledger path against the project directory
    pub fn json_path_absolute(&self, root: &Path) -> Option<PathBuf> {
        self.changelog.json_path.as_ref().map(|p| root.join(p))
    }

    /// Validate the configuration
    pub fn validate(&self) -> CoreResult<()> {
        if self.format_version.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "format_version cannot be empty".to_string(),
            });
        }

        if !is_valid_table_name(&self.changelog.table) {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "changelog table '{}' must be an identifier, optionally schema-qualified",
                    self.changelog.table
                ),
            });
        }

        if self.changelog.backend == ChangelogBackend::JsonFile
            && self
                .changelog
                .json_path
                .as_deref()
                .map_or(true, |p| p.trim().is_empty())
        {
            return Err(CoreError::ConfigInvalid {
                message: "changelog.json_path is required for the jsonfile backend".to_string(),
            });
        }

        if self.changelog.backend == ChangelogBackend::JsonFile && self.changelog.is_in_memory() {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "the jsonfile backend needs a persistent changelog.path, not {MEMORY_DATABASE}"
                ),
            });
        }

        Ok(())
    }
}

/// `name` or `schema.name`, each part `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_valid_table_name(name: &str) -> bool {
    let parts: Vec<&str> = name.split('.').collect();
    if parts.is_empty() || parts.len() > 2 {
        return false;
    }
    parts.iter().all(|part| {
        let mut chars = part.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            _ => false,
        }
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
