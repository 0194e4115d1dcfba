//! The migration engine.

use crate::error::{EngineError, EngineResult, TxStage};
use sl_core::{Changeset, ChangelogEntry, ChecksumMode, ParsedSource, Parser, Source};
use sl_db::{Changelog, DbError};
use std::cell::RefCell;
use std::io::Write;
use std::path::PathBuf;

/// Applies and reverts changesets from one source against one changelog.
///
/// The source is parsed afresh by every operation, so edits between calls
/// are always seen. Verbose lines go to stdout unless another writer is
/// set with [`Migrator::with_output`].
pub struct Migrator<C> {
    changelog: C,
    source: Source,
    parser: Parser,
    verbose: bool,
    checksum_mode: ChecksumMode,
    output: RefCell<Box<dyn Write>>,
}

impl<C: Changelog> Migrator<C> {
    /// Engine bound to an arbitrary source
    pub fn new(changelog: C, source: Source) -> Self {
        Self {
            changelog,
            source,
            parser: Parser::default(),
            verbose: false,
            checksum_mode: ChecksumMode::default(),
            output: RefCell::new(Box::new(std::io::stdout())),
        }
    }

    /// Engine bound to a changeset file
    pub fn from_file(changelog: C, path: impl Into<PathBuf>) -> Self {
        Self::new(changelog, Source::File(path.into()))
    }

    /// Engine bound to in-memory changeset text
    pub fn from_text(changelog: C, text: impl Into<String>) -> Self {
        Self::new(changelog, Source::Text(text.into()))
    }

    /// Print one line per changeset outcome
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Write verbose lines to `output` instead of stdout
    pub fn with_output(mut self, output: Box<dyn Write>) -> Self {
        self.output = RefCell::new(output);
        self
    }

    /// Select the drift policy
    pub fn with_checksum_mode(mut self, mode: ChecksumMode) -> Self {
        self.checksum_mode = mode;
        self
    }

    /// Version tag stamped on newly recorded changelog entries
    pub fn with_format_version(mut self, version: impl Into<String>) -> Self {
        self.parser = Parser::new(version);
        self
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    pub fn set_checksum_mode(&mut self, mode: ChecksumMode) {
        self.checksum_mode = mode;
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn checksum_mode(&self) -> ChecksumMode {
        self.checksum_mode
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn changelog(&self) -> &C {
        &self.changelog
    }

    /// Give the changelog back, e.g. to bind it to another source
    pub fn into_changelog(self) -> C {
        self.changelog
    }

    /// Latest applied entry, or `None` when nothing has been applied.
    ///
    /// Read-only: storage is not created.
    pub fn status(&self) -> EngineResult<Option<ChangelogEntry>> {
        let entries = self.changelog.changesets(false)?;

        if entries.is_empty() {
            self.report(format_args!("No changesets applied to the database."));
            return Ok(None);
        }

        self.report(format_args!("Changesets applied:"));
        for entry in &entries {
            self.report(format_args!("{entry}"));
        }
        Ok(entries.into_iter().last())
    }

    /// Every applied entry in apply order
    pub fn history(&self) -> EngineResult<Vec<ChangelogEntry>> {
        Ok(self.changelog.changesets(false)?)
    }

    pub(crate) fn load(&self) -> EngineResult<ParsedSource> {
        Ok(self.parser.parse(&self.source)?)
    }

    pub(crate) fn report(&self, line: std::fmt::Arguments<'_>) {
        if !self.verbose {
            return;
        }
        let mut output = self.output.borrow_mut();
        if let Err(e) = writeln!(output, "{line}").and_then(|_| output.flush()) {
            log::warn!("Failed to write progress line: {e}");
        }
    }

    /// Report an aborted operation before handing the error back
    pub(crate) fn finish<T>(&self, result: EngineResult<T>) -> EngineResult<T> {
        if let Err(e) = &result {
            self.report(format_args!("Aborted: {e}"));
        }
        result
    }

    /// Run `statements` for `changeset` inside one transaction.
    ///
    /// A failed exec or commit is followed by a rollback attempt; both
    /// failures are reported together.
    pub(crate) fn run_in_transaction(
        &self,
        changeset: &Changeset,
        statements: &[String],
    ) -> EngineResult<()> {
        let identity = changeset.identity().to_string();
        let fail = |stage: TxStage, source: DbError, rollback_error: Option<DbError>| {
            EngineError::Transaction {
                identity: identity.clone(),
                stage,
                source,
                rollback_error,
            }
        };

        let mut tx = self
            .changelog
            .begin_transaction()
            .map_err(|e| fail(TxStage::Begin, e, None))?;

        for statement in statements {
            if let Err(e) = tx.exec(statement) {
                let rollback_error = tx.rollback().err();
                return Err(fail(TxStage::Exec, e, rollback_error));
            }
        }

        if let Err(e) = tx.commit() {
            let rollback_error = tx.rollback().err();
            return Err(fail(TxStage::Commit, e, rollback_error));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "migrator_test.rs"]
mod tests;
