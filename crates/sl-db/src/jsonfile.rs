//! JSON file changelog.
//!
//! The ledger is a JSON array of entries in a single file. Changeset
//! statements still run against a separate [`TransactionalStore`], so the
//! target database does not need to host the changelog.

use crate::error::{DbError, DbResult};
use crate::traits::{Changelog, Transaction, TransactionalStore};
use sl_core::{ChangelogEntry, ChangesetId};
use std::fs;
use std::path::{Path, PathBuf};

/// Changelog stored as a JSON file, executing changesets against `S`
pub struct JsonFileChangelog<S> {
    path: PathBuf,
    store: S,
}

impl<S: TransactionalStore> JsonFileChangelog<S> {
    /// Keep the ledger at `path`; changesets run against `store`
    pub fn new(path: impl Into<PathBuf>, store: S) -> Self {
        Self {
            path: path.into(),
            store,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The target store
    pub fn store(&self) -> &S {
        &self.store
    }

    fn io_err(&self, source: std::io::Error) -> DbError {
        DbError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }

    /// Read all entries in ascending order; a missing file is empty
    fn read(&self) -> DbResult<Vec<ChangelogEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path).map_err(|e| self.io_err(e))?;
        let mut entries: Vec<ChangelogEntry> =
            serde_json::from_str(&content).map_err(|e| DbError::Json {
                path: self.path.display().to_string(),
                source: e,
            })?;
        entries.sort_by_key(|e| e.order_executed);
        Ok(entries)
    }

    /// Replace the file contents via a temp file and rename
    fn write(&self, entries: &[ChangelogEntry]) -> DbResult<()> {
        let content = serde_json::to_string_pretty(entries).map_err(|e| DbError::Json {
            path: self.path.display().to_string(),
            source: e,
        })?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).map_err(|e| self.io_err(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_err(e))
    }

    fn modify<F>(&self, f: F) -> DbResult<()>
    where
        F: FnOnce(&mut Vec<ChangelogEntry>) -> DbResult<()>,
    {
        let mut entries = self.read()?;
        f(&mut entries)?;
        self.write(&entries)
    }
}

impl<S: TransactionalStore> TransactionalStore for JsonFileChangelog<S> {
    fn begin_transaction(&self) -> DbResult<Box<dyn Transaction + '_>> {
        self.store.begin_transaction()
    }

    fn store_type(&self) -> &'static str {
        self.store.store_type()
    }
}

impl<S: TransactionalStore> Changelog for JsonFileChangelog<S> {
    fn initialize(&self) -> DbResult<()> {
        if self.path.exists() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }
        log::debug!("Creating changelog file {}", self.path.display());
        self.write(&[])
    }

    fn changeset_applied(&self, identity: &ChangesetId) -> DbResult<Option<ChangelogEntry>> {
        Ok(self.read()?.into_iter().find(|e| e.matches(identity)))
    }

    fn count(&self) -> DbResult<usize> {
        Ok(self.read()?.len())
    }

    fn insert(&self, entry: &ChangelogEntry) -> DbResult<()> {
        self.modify(|entries| {
            if entries.iter().any(|e| e.matches(&entry.identity())) {
                return Err(DbError::ConstraintViolation(format!(
                    "duplicate changelog entry {}",
                    entry.identity()
                )));
            }
            entries.push(entry.clone());
            Ok(())
        })
    }

    fn update(&self, entry: &ChangelogEntry) -> DbResult<()> {
        self.modify(|entries| {
            let identity = entry.identity();
            let slot = entries
                .iter_mut()
                .find(|e| e.matches(&identity))
                .ok_or_else(|| DbError::EntryNotFound {
                    identity: identity.to_string(),
                })?;
            *slot = entry.clone();
            Ok(())
        })
    }

    fn delete(&self, identity: &ChangesetId) -> DbResult<()> {
        self.modify(|entries| {
            entries.retain(|e| !e.matches(identity));
            Ok(())
        })
    }

    fn changesets(&self, reverse: bool) -> DbResult<Vec<ChangelogEntry>> {
        let mut entries = self.read()?;
        if reverse {
            entries.reverse();
        }
        Ok(entries)
    }

    fn tag(&self, identity: &ChangesetId, tag: &str) -> DbResult<()> {
        self.modify(|entries| {
            if entries
                .iter()
                .any(|e| e.tag.as_deref() == Some(tag) && !e.matches(identity))
            {
                return Err(DbError::TagInUse {
                    tag: tag.to_string(),
                });
            }
            let slot = entries
                .iter_mut()
                .find(|e| e.matches(identity))
                .ok_or_else(|| DbError::EntryNotFound {
                    identity: identity.to_string(),
                })?;
            slot.tag = Some(tag.to_string());
            Ok(())
        })
    }

    fn rollback(&self, tag: &str) -> DbResult<Option<usize>> {
        let entries = self.read()?;
        let Some(tagged) = entries.iter().find(|e| e.tag.as_deref() == Some(tag)) else {
            return Ok(None);
        };
        Ok(Some(
            entries
                .iter()
                .filter(|e| e.order_executed > tagged.order_executed)
                .count(),
        ))
    }
}

#[cfg(test)]
#[path = "jsonfile_test.rs"]
mod tests;
