//! Forward application of pending changesets.

use crate::error::{EngineError, EngineResult};
use crate::migrator::Migrator;
use chrono::Utc;
use sl_core::{Changeset, ChangelogEntry, ChecksumMode};
use sl_db::Changelog;

impl<C: Changelog> Migrator<C> {
    /// Apply pending changesets in source order.
    ///
    /// `max == 0` applies everything pending; otherwise the run stops after
    /// `max` changesets were newly applied. Already-applied changesets never
    /// count toward `max`. Returns the number of changesets applied.
    pub fn migrate(&self, max: usize) -> EngineResult<usize> {
        let result = self.apply_pending(max);
        self.finish(result)
    }

    fn apply_pending(&self, max: usize) -> EngineResult<usize> {
        self.changelog().initialize()?;
        let parsed = self.load()?;

        let mut applied = 0;
        for changeset in &parsed {
            match self.changelog().changeset_applied(changeset.identity())? {
                Some(entry) if entry.checksum == changeset.checksum() => {
                    self.report(format_args!(
                        "Changeset already applied: {}",
                        changeset.identity().short()
                    ));
                    continue;
                }
                Some(entry) => {
                    self.handle_drift(changeset, entry)?;
                    continue;
                }
                None => {}
            }

            self.run_in_transaction(changeset, &changeset.change_statements())?;

            let order_executed = self.changelog().count()? + 1;
            self.changelog().insert(&ChangelogEntry::from_changeset(
                changeset,
                order_executed,
                Utc::now(),
            ))?;
            log::debug!(
                "Recorded {} as entry {order_executed}",
                changeset.identity()
            );
            self.report(format_args!(
                "Changeset applied: {}",
                changeset.identity().short()
            ));

            applied += 1;
            if max != 0 && applied >= max {
                break;
            }
        }

        Ok(applied)
    }

    /// Apply the configured policy to a changeset whose stored checksum
    /// differs from the source. Never executes the changeset.
    fn handle_drift(&self, changeset: &Changeset, mut entry: ChangelogEntry) -> EngineResult<()> {
        let short = changeset.identity().short();
        match self.checksum_mode() {
            ChecksumMode::Error => Err(EngineError::ChecksumMismatch {
                identity: short,
                stored: entry.checksum,
                computed: changeset.checksum().to_string(),
            }),
            ChecksumMode::Ignore => {
                log::warn!(
                    "Checksum mismatch ignored for {short}: stored {}, current {}",
                    entry.checksum,
                    changeset.checksum()
                );
                self.report(format_args!(
                    "Checksum mismatch ignored: {short} (stored {}, current {})",
                    entry.checksum,
                    changeset.checksum()
                ));
                Ok(())
            }
            ChecksumMode::Update => {
                log::warn!(
                    "Updating checksum for {short}: {} -> {}",
                    entry.checksum,
                    changeset.checksum()
                );
                entry.checksum = changeset.checksum().to_string();
                entry.description = changeset.description();
                entry.version = changeset.version().to_string();
                self.changelog().update(&entry)?;
                self.report(format_args!("Checksum updated: {short}"));
                Ok(())
            }
        }
    }
}
