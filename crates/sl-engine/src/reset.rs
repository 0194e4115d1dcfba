//! Reverting applied changesets, newest first.

use crate::error::{EngineError, EngineResult};
use crate::migrator::Migrator;
use sl_db::Changelog;

impl<C: Changelog> Migrator<C> {
    /// Roll back up to `max` applied changesets (0 = all), newest first.
    ///
    /// Every changelog entry must still resolve to a changeset in the
    /// source; the rollback body comes from there. Returns the number of
    /// changesets rolled back.
    pub fn reset(&self, max: usize) -> EngineResult<usize> {
        let result = self.roll_back(max);
        self.finish(result)
    }

    pub(crate) fn roll_back(&self, max: usize) -> EngineResult<usize> {
        let parsed = self.load()?;
        let entries = self.changelog().changesets(true)?;

        if entries.is_empty() {
            self.report(format_args!("No rollbacks to perform."));
            return Ok(0);
        }

        let limit = if max == 0 { entries.len() } else { max };
        let mut rolled_back = 0;
        for entry in entries.iter().take(limit) {
            let identity = entry.identity();
            let changeset = parsed
                .get(&identity)
                .ok_or_else(|| EngineError::MissingChangeset {
                    identity: identity.to_string(),
                })?;

            self.run_in_transaction(changeset, &changeset.rollback_statements())?;
            self.changelog().delete(&identity)?;
            self.report(format_args!("Rollback applied: {}", identity.short()));
            rolled_back += 1;
        }

        Ok(rolled_back)
    }
}
