//! sl-db - Changelog adapters for Shiftlog
//!
//! This crate provides the `Changelog` and `TransactionalStore` traits the
//! migration engine runs against, plus a DuckDB implementation (ledger table
//! inside the target database) and a JSON file ledger that delegates
//! transactions to a separate target store.

pub mod duckdb;
pub mod error;
pub mod jsonfile;
pub mod traits;

pub use duckdb::{DuckDbChangelog, DuckDbStore};
pub use error::{DbError, DbResult};
pub use jsonfile::JsonFileChangelog;
pub use traits::{Changelog, Transaction, TransactionalStore};
