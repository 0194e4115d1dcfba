//! sl-engine - Migration engine for Shiftlog
//!
//! [`Migrator`] binds a changeset source to a [`Changelog`](sl_db::Changelog)
//! and runs the migrate, reset, tag, rollback, and status operations. Every
//! operation re-parses the source, and every changeset runs inside its own
//! transaction.

pub mod error;
mod migrate;
pub mod migrator;
mod reset;
mod tag;

pub use error::{EngineError, EngineResult, TxStage};
pub use migrator::Migrator;
pub use sl_core::ChecksumMode;
