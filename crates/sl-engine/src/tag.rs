//! Tagging and rolling back to tags.

use crate::error::{EngineError, EngineResult};
use crate::migrator::Migrator;
use sl_db::{Changelog, DbError};

impl<C: Changelog> Migrator<C> {
    /// Label the most recently applied changelog entry with `name`
    pub fn tag(&self, name: &str) -> EngineResult<()> {
        let result = self.tag_latest(name);
        self.finish(result)
    }

    fn tag_latest(&self, name: &str) -> EngineResult<()> {
        if name.trim().is_empty() {
            return Err(EngineError::tag(name, "tag cannot be empty"));
        }

        let entries = self.changelog().changesets(true)?;
        let parsed = self.load()?;

        let Some(latest) = entries.first() else {
            return Err(EngineError::tag(name, "no changesets to tag"));
        };

        let identity = latest.identity();
        if parsed.get(&identity).is_none() {
            return Err(EngineError::tag(
                name,
                format!("changeset is missing from source: {identity}"),
            ));
        }

        self.changelog()
            .tag(&identity, name)
            .map_err(|e| match e {
                DbError::TagInUse { .. } => EngineError::tag(name, e.to_string()),
                other => EngineError::Changelog(other),
            })?;

        self.report(format_args!("Tag applied: {name} on {}", identity.short()));
        Ok(())
    }

    /// Roll back every changeset applied after the entry tagged `tag`.
    ///
    /// The tagged entry itself stays applied. Returns the number of
    /// changesets rolled back.
    pub fn rollback(&self, tag: &str) -> EngineResult<usize> {
        let result = self.roll_back_to(tag);
        self.finish(result)
    }

    fn roll_back_to(&self, tag: &str) -> EngineResult<usize> {
        if tag.trim().is_empty() {
            return Err(EngineError::tag(tag, "rollback tag cannot be empty"));
        }

        let count = match self.changelog().rollback(tag)? {
            Some(count) if count > 0 => count,
            _ => {
                return Err(EngineError::tag(
                    tag,
                    "tag not found or nothing to roll back",
                ))
            }
        };

        self.report(format_args!(
            "Found tag ({tag}), will rollback ({count}) changeset(s)"
        ));
        let rolled_back = self.roll_back(count)?;
        self.report(format_args!("Rollback complete"));
        Ok(rolled_back)
    }
}
