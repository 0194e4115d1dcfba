//! sl-core - Core library for Shiftlog
//!
//! This crate provides the changeset model, the changeset source parser,
//! checksum computation, changelog entry types, and configuration parsing
//! shared by the adapter, engine, and CLI crates.

pub mod changelog;
pub mod changeset;
pub mod checksum;
pub mod config;
pub mod error;
pub mod parser;

pub use changelog::ChangelogEntry;
pub use changeset::{split_statements, Changeset, ChangesetId};
pub use checksum::compute_checksum;
pub use config::{ChangelogBackend, ChangelogConfig, ChecksumMode, Config, MEMORY_DATABASE};
pub use error::{CoreError, CoreResult};
pub use parser::{ParsedSource, Parser, Source, DEFAULT_FORMAT_VERSION, MEMORY_SOURCE_NAME};
