//! Parsed changeset model.
//!
//! A [`Changeset`] is produced by the [`Parser`](crate::parser::Parser) and
//! never mutated afterwards. Its checksum is computed once, over the forward
//! body only.

use crate::checksum::compute_checksum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Composite identity of a changeset: `(author, id, filename)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChangesetId {
    pub author: String,
    pub id: String,
    pub filename: String,
}

impl ChangesetId {
    /// Create a new identity
    pub fn new(
        author: impl Into<String>,
        id: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            author: author.into(),
            id: id.into(),
            filename: filename.into(),
        }
    }

    /// Short `author:id` form used in user-facing messages
    pub fn short(&self) -> String {
        format!("{}:{}", self.author, self.id)
    }
}

impl fmt::Display for ChangesetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.author, self.id, self.filename)
    }
}

/// A single parsed changeset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Changeset {
    identity: ChangesetId,
    changes: Vec<String>,
    rollbacks: Vec<String>,
    description: Vec<String>,
    version: String,
    checksum: String,
}

impl Changeset {
    /// Composite identity
    pub fn identity(&self) -> &ChangesetId {
        &self.identity
    }

    pub fn author(&self) -> &str {
        &self.identity.author
    }

    pub fn id(&self) -> &str {
        &self.identity.id
    }

    pub fn filename(&self) -> &str {
        &self.identity.filename
    }

    /// Source-format version tag recorded with the changelog entry
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Forward body, lines joined with `\n`
    pub fn changes(&self) -> String {
        self.changes.join("\n")
    }

    /// Rollback body, lines joined with `\n`
    pub fn rollbacks(&self) -> String {
        self.rollbacks.join("\n")
    }

    /// Description, lines joined with `\n` (empty when none was given)
    pub fn description(&self) -> String {
        self.description.join("\n")
    }

    /// MD5 hex digest of the forward body
    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    /// Forward statements in execution order
    pub fn change_statements(&self) -> Vec<String> {
        split_statements(&self.changes())
    }

    /// Rollback statements in execution order
    pub fn rollback_statements(&self) -> Vec<String> {
        split_statements(&self.rollbacks())
    }
}

/// Accumulates lines for the changeset currently open in the parser.
#[derive(Debug)]
pub(crate) struct ChangesetBuilder {
    identity: ChangesetId,
    version: String,
    changes: Vec<String>,
    rollbacks: Vec<String>,
    description: Vec<String>,
}

impl ChangesetBuilder {
    pub(crate) fn new(identity: ChangesetId, version: &str) -> Self {
        Self {
            identity,
            version: version.to_string(),
            changes: Vec::new(),
            rollbacks: Vec::new(),
            description: Vec::new(),
        }
    }

    pub(crate) fn add_change(&mut self, line: &str) {
        self.changes.push(line.to_string());
    }

    pub(crate) fn add_rollback(&mut self, line: &str) {
        self.rollbacks.push(line.to_string());
    }

    pub(crate) fn add_description(&mut self, line: &str) {
        self.description.push(line.to_string());
    }

    pub(crate) fn build(self) -> Changeset {
        let checksum = compute_checksum(&self.changes.join("\n"));
        Changeset {
            identity: self.identity,
            changes: self.changes,
            rollbacks: self.rollbacks,
            description: self.description,
            version: self.version,
            checksum,
        }
    }
}

/// Split a body into individual statements on `;`.
///
/// Fragments that are empty after trimming are dropped; the rest are
/// returned trimmed. Semicolons inside string literals are not special.
pub fn split_statements(body: &str) -> Vec<String> {
    body.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
#[path = "changeset_test.rs"]
mod tests;
