//! Changeset source parser.
//!
//! Turns changeset text into an ordered [`ParsedSource`]. The grammar is line
//! based; every line is trimmed before it is classified:
//!
//! - blank lines are ignored
//! - `--changeset author:id` opens a new changeset
//! - `--rollback <stmt>` appends to the open changeset's rollback body
//! - `--description <text>` appends to the open changeset's description
//! - `--include <path>` splices the changesets of another file inline
//! - any other `--` line is a comment
//! - anything else is forward-change text for the open changeset
//!
//! Includes are resolved relative to the directory of the including file and
//! expanded depth-first at the position of the directive. An include closes
//! the open changeset: text after it needs a new `--changeset` header.

use crate::changeset::{Changeset, ChangesetBuilder, ChangesetId};
use crate::error::{CoreError, CoreResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Pseudo file name recorded for changesets parsed from in-memory text
pub const MEMORY_SOURCE_NAME: &str = "memory";

/// Source-format version tag recorded with each changeset by default
pub const DEFAULT_FORMAT_VERSION: &str = "1.0";

const COMMENT_MARKER: &str = "--";

/// Where changeset text comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// A changeset file on disk
    File(PathBuf),
    /// Changeset text held in memory
    Text(String),
}

/// Ordered changesets plus an identity index built from the same traversal.
#[derive(Debug, Clone, Default)]
pub struct ParsedSource {
    changesets: Vec<Changeset>,
    index: HashMap<ChangesetId, usize>,
}

impl ParsedSource {
    /// Build the index, rejecting duplicate identities
    fn from_changesets(changesets: Vec<Changeset>) -> CoreResult<Self> {
        let mut index = HashMap::with_capacity(changesets.len());
        for (pos, cs) in changesets.iter().enumerate() {
            if index.insert(cs.identity().clone(), pos).is_some() {
                return Err(CoreError::DuplicateChangeset {
                    identity: cs.identity().to_string(),
                });
            }
        }
        Ok(Self { changesets, index })
    }

    /// Changesets in apply order
    pub fn iter(&self) -> std::slice::Iter<'_, Changeset> {
        self.changesets.iter()
    }

    /// Look up a changeset by identity
    pub fn get(&self, identity: &ChangesetId) -> Option<&Changeset> {
        self.index.get(identity).map(|&pos| &self.changesets[pos])
    }

    pub fn len(&self) -> usize {
        self.changesets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changesets.is_empty()
    }
}

impl<'a> IntoIterator for &'a ParsedSource {
    type Item = &'a Changeset;
    type IntoIter = std::slice::Iter<'a, Changeset>;

    fn into_iter(self) -> Self::IntoIter {
        self.changesets.iter()
    }
}

/// A classified source line
enum Line<'a> {
    Blank,
    Changeset(&'a str),
    Rollback(&'a str),
    Description(&'a str),
    Include(&'a str),
    Comment,
    Body(&'a str),
}

fn classify(raw: &str) -> Line<'_> {
    let line = raw.trim();
    if line.is_empty() {
        return Line::Blank;
    }
    let Some(rest) = line.strip_prefix(COMMENT_MARKER) else {
        return Line::Body(line);
    };

    let (keyword, value) = match rest.find(char::is_whitespace) {
        Some(pos) => (&rest[..pos], rest[pos..].trim()),
        None => (rest, ""),
    };
    match keyword {
        "changeset" => Line::Changeset(value),
        "rollback" => Line::Rollback(value),
        "description" => Line::Description(value),
        "include" => Line::Include(value),
        _ => Line::Comment,
    }
}

/// Parses changeset sources into [`ParsedSource`]
#[derive(Debug, Clone)]
pub struct Parser {
    format_version: String,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new(DEFAULT_FORMAT_VERSION)
    }
}

impl Parser {
    /// Create a parser that stamps changesets with `format_version`
    pub fn new(format_version: impl Into<String>) -> Self {
        Self {
            format_version: format_version.into(),
        }
    }

    pub fn format_version(&self) -> &str {
        &self.format_version
    }

    /// Parse either kind of source
    pub fn parse(&self, source: &Source) -> CoreResult<ParsedSource> {
        match source {
            Source::File(path) => self.parse_file(path),
            Source::Text(text) => self.parse_str(text),
        }
    }

    /// Parse a changeset file, expanding includes
    pub fn parse_file(&self, path: &Path) -> CoreResult<ParsedSource> {
        let mut out = Vec::new();
        let mut stack = Vec::new();
        self.collect_file(path, &mut stack, &mut out)?;
        ParsedSource::from_changesets(out)
    }

    /// Parse in-memory changeset text; includes resolve against the working
    /// directory
    pub fn parse_str(&self, text: &str) -> CoreResult<ParsedSource> {
        let mut out = Vec::new();
        let mut stack = Vec::new();
        self.collect_text(
            text,
            MEMORY_SOURCE_NAME,
            Path::new("."),
            &mut stack,
            &mut out,
        )?;
        ParsedSource::from_changesets(out)
    }

    fn collect_file(
        &self,
        path: &Path,
        stack: &mut Vec<PathBuf>,
        out: &mut Vec<Changeset>,
    ) -> CoreResult<()> {
        let canonical = path.canonicalize().map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        if stack.contains(&canonical) {
            let mut chain: Vec<String> = stack.iter().map(|p| p.display().to_string()).collect();
            chain.push(canonical.display().to_string());
            return Err(CoreError::IncludeCycle {
                chain: chain.join(" -> "),
            });
        }

        let text = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

        log::debug!("Parsing changeset file {}", path.display());
        stack.push(canonical);
        let result = self.collect_text(&text, &filename, base_dir, stack, out);
        stack.pop();
        result
    }

    fn collect_text(
        &self,
        text: &str,
        filename: &str,
        base_dir: &Path,
        stack: &mut Vec<PathBuf>,
        out: &mut Vec<Changeset>,
    ) -> CoreResult<()> {
        let mut current: Option<ChangesetBuilder> = None;

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            match classify(raw) {
                Line::Blank | Line::Comment => {}
                Line::Include(rel) => {
                    // An include closes the open changeset; its changesets
                    // land after it in apply order.
                    if let Some(builder) = current.take() {
                        out.push(builder.build());
                    }
                    self.collect_file(&base_dir.join(rel), stack, out)?;
                }
                Line::Changeset(header) => {
                    let identity = parse_header(header, filename, line_no)?;
                    if let Some(builder) = current.replace(ChangesetBuilder::new(
                        identity,
                        &self.format_version,
                    )) {
                        out.push(builder.build());
                    }
                }
                Line::Rollback(stmt) => {
                    open_changeset(&mut current, filename, line_no)?.add_rollback(stmt)
                }
                Line::Description(desc) => {
                    open_changeset(&mut current, filename, line_no)?.add_description(desc)
                }
                Line::Body(stmt) => {
                    open_changeset(&mut current, filename, line_no)?.add_change(stmt)
                }
            }
        }

        if let Some(builder) = current {
            out.push(builder.build());
        }
        Ok(())
    }
}

fn open_changeset<'a>(
    current: &'a mut Option<ChangesetBuilder>,
    filename: &str,
    line: usize,
) -> CoreResult<&'a mut ChangesetBuilder> {
    current.as_mut().ok_or_else(|| CoreError::InvalidFormat {
        source_name: filename.to_string(),
        line,
    })
}

/// Split `author:id`; anything but exactly two non-empty parts is rejected.
fn parse_header(header: &str, filename: &str, line: usize) -> CoreResult<ChangesetId> {
    let parts: Vec<&str> = header.split(':').collect();
    match parts.as_slice() {
        [author, id] if !author.is_empty() && !id.is_empty() => {
            Ok(ChangesetId::new(*author, *id, filename))
        }
        _ => Err(CoreError::InvalidHeader {
            source_name: filename.to_string(),
            line,
            header: header.to_string(),
        }),
    }
}

#[cfg(test)]
#[path = "parser_test.rs"]
mod tests;
