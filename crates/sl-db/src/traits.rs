//! Changelog adapter traits

use crate::error::DbResult;
use sl_core::{ChangelogEntry, ChangesetId};

/// A transaction scoped to a single changeset.
///
/// Dropping a transaction that was neither committed nor rolled back must
/// roll it back.
pub trait Transaction {
    /// Execute one statement inside the transaction
    fn exec(&mut self, statement: &str) -> DbResult<()>;

    /// Commit the transaction
    fn commit(&mut self) -> DbResult<()>;

    /// Undo the transaction after a failed exec or commit
    fn rollback(&mut self) -> DbResult<()>;
}

/// A store that changeset statements are executed against
pub trait TransactionalStore {
    /// Start a new transaction
    fn begin_transaction(&self) -> DbResult<Box<dyn Transaction + '_>>;

    /// Store type identifier for logging
    fn store_type(&self) -> &'static str;
}

/// Persistence contract for the ledger of applied changesets.
///
/// Reads against storage that was never initialized behave as an empty
/// changelog.
pub trait Changelog: TransactionalStore {
    /// Idempotently create the underlying storage
    fn initialize(&self) -> DbResult<()>;

    /// Entry for the given identity, if it was applied
    fn changeset_applied(&self, identity: &ChangesetId) -> DbResult<Option<ChangelogEntry>>;

    /// Number of entries in the changelog
    fn count(&self) -> DbResult<usize>;

    /// Add a new entry
    fn insert(&self, entry: &ChangelogEntry) -> DbResult<()>;

    /// Overwrite the mutable fields of an existing entry
    fn update(&self, entry: &ChangelogEntry) -> DbResult<()>;

    /// Remove the entry for the given identity
    fn delete(&self, identity: &ChangesetId) -> DbResult<()>;

    /// All entries ordered by `order_executed`, descending when `reverse`
    fn changesets(&self, reverse: bool) -> DbResult<Vec<ChangelogEntry>>;

    /// Label an entry; fails with `DbError::TagInUse` if another entry
    /// already carries `tag`
    fn tag(&self, identity: &ChangesetId, tag: &str) -> DbResult<()>;

    /// Number of entries applied after the entry tagged `tag`, or `None`
    /// when no entry carries the tag
    fn rollback(&self, tag: &str) -> DbResult<Option<usize>>;
}

impl<T: TransactionalStore + ?Sized> TransactionalStore for Box<T> {
    fn begin_transaction(&self) -> DbResult<Box<dyn Transaction + '_>> {
        (**self).begin_transaction()
    }

    fn store_type(&self) -> &'static str {
        (**self).store_type()
    }
}

impl<T: Changelog + ?Sized> Changelog for Box<T> {
    fn initialize(&self) -> DbResult<()> {
        (**self).initialize()
    }

    fn changeset_applied(&self, identity: &ChangesetId) -> DbResult<Option<ChangelogEntry>> {
        (**self).changeset_applied(identity)
    }

    fn count(&self) -> DbResult<usize> {
        (**self).count()
    }

    fn insert(&self, entry: &ChangelogEntry) -> DbResult<()> {
        (**self).insert(entry)
    }

    fn update(&self, entry: &ChangelogEntry) -> DbResult<()> {
        (**self).update(entry)
    }

    fn delete(&self, identity: &ChangesetId) -> DbResult<()> {
        (**self).delete(identity)
    }

    fn changesets(&self, reverse: bool) -> DbResult<Vec<ChangelogEntry>> {
        (**self).changesets(reverse)
    }

    fn tag(&self, identity: &ChangesetId, tag: &str) -> DbResult<()> {
        (**self).tag(identity, tag)
    }

    fn rollback(&self, tag: &str) -> DbResult<Option<usize>> {
        (**self).rollback(tag)
    }
}
