//! DuckDB store and changelog implementation

use crate::error::{DbError, DbResult};
use crate::traits::{Changelog, Transaction, TransactionalStore};
use chrono::{DateTime, Utc};
use duckdb::{params, Connection};
use sl_core::config::{is_valid_table_name, DEFAULT_CHANGELOG_TABLE};
use sl_core::{ChangelogEntry, ChangesetId};
use std::path::Path;

const ENTRY_COLUMNS: &str =
    "id, author, filename, dateexecuted, orderexecuted, checksum, description, tag, version";

/// DuckDB database that changeset statements run against
pub struct DuckDbStore {
    conn: Connection,
}

impl DuckDbStore {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;
        Ok(Self { conn })
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    /// Borrow the underlying DuckDB connection
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Execute one or more statements outside of any changeset transaction
    pub fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.conn
            .execute_batch(sql)
            .map_err(|e| DbError::ExecutionError(format!("{e}: {sql}")))
    }

    /// Check if a table or view exists
    pub fn relation_exists(&self, name: &str) -> DbResult<bool> {
        let (schema, table) = match name.rfind('.') {
            Some(pos) => (&name[..pos], &name[pos + 1..]),
            None => ("main", name),
        };

        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = ? AND table_name = ?",
            params![schema, table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

impl TransactionalStore for DuckDbStore {
    fn begin_transaction(&self) -> DbResult<Box<dyn Transaction + '_>> {
        self.conn
            .execute_batch("BEGIN TRANSACTION")
            .map_err(|e| DbError::TransactionError(format!("BEGIN failed: {e}")))?;
        Ok(Box::new(DuckDbTransaction {
            conn: &self.conn,
            open: true,
        }))
    }

    fn store_type(&self) -> &'static str {
        "duckdb"
    }
}

/// Explicit BEGIN/COMMIT transaction on a borrowed connection
struct DuckDbTransaction<'a> {
    conn: &'a Connection,
    open: bool,
}

impl Transaction for DuckDbTransaction<'_> {
    fn exec(&mut self, statement: &str) -> DbResult<()> {
        if !self.open {
            return Err(DbError::TransactionError(
                "transaction already finished".to_string(),
            ));
        }
        log::debug!("Executing: {statement}");
        self.conn
            .execute_batch(statement)
            .map_err(|e| DbError::ExecutionError(format!("{e}: {statement}")))
    }

    fn commit(&mut self) -> DbResult<()> {
        self.conn
            .execute_batch("COMMIT")
            .map_err(|e| DbError::TransactionError(format!("COMMIT failed: {e}")))?;
        self.open = false;
        Ok(())
    }

    fn rollback(&mut self) -> DbResult<()> {
        self.open = false;
        self.conn
            .execute_batch("ROLLBACK")
            .map_err(|e| DbError::TransactionError(format!("ROLLBACK failed: {e}")))
    }
}

impl Drop for DuckDbTransaction<'_> {
    fn drop(&mut self) {
        if self.open {
            let _ = self.conn.execute_batch("ROLLBACK");
        }
    }
}

/// Changelog kept as a table inside the DuckDB target database
pub struct DuckDbChangelog {
    store: DuckDbStore,
    table: String,
}

/// Row as read from the changelog table, before date decoding
struct RawEntry {
    id: String,
    author: String,
    filename: String,
    date_executed: String,
    order_executed: i64,
    checksum: String,
    description: String,
    tag: Option<String>,
    version: String,
}

impl RawEntry {
    fn from_row(row: &duckdb::Row<'_>) -> duckdb::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            author: row.get(1)?,
            filename: row.get(2)?,
            date_executed: row.get(3)?,
            order_executed: row.get(4)?,
            checksum: row.get(5)?,
            description: row.get(6)?,
            tag: row.get(7)?,
            version: row.get(8)?,
        })
    }

    fn into_entry(self) -> DbResult<ChangelogEntry> {
        let date_executed = DateTime::parse_from_rfc3339(&self.date_executed)
            .map_err(|e| {
                DbError::CorruptRecord(format!(
                    "bad dateexecuted '{}' for {}:{}: {e}",
                    self.date_executed, self.author, self.id
                ))
            })?
            .with_timezone(&Utc);
        let order_executed = usize::try_from(self.order_executed).map_err(|_| {
            DbError::CorruptRecord(format!(
                "negative orderexecuted {} for {}:{}",
                self.order_executed, self.author, self.id
            ))
        })?;
        Ok(ChangelogEntry {
            id: self.id,
            author: self.author,
            filename: self.filename,
            date_executed,
            order_executed,
            checksum: self.checksum,
            description: self.description,
            tag: self.tag,
            version: self.version,
        })
    }
}

fn order_param(order_executed: usize) -> DbResult<i64> {
    i64::try_from(order_executed)
        .map_err(|_| DbError::CorruptRecord(format!("orderexecuted {order_executed} too large")))
}

impl DuckDbChangelog {
    /// Wrap a store, keeping the changelog in `table`
    pub fn new(store: DuckDbStore, table: &str) -> DbResult<Self> {
        if !is_valid_table_name(table) {
            return Err(DbError::InvalidTableName(table.to_string()));
        }
        Ok(Self {
            store,
            table: table.to_string(),
        })
    }

    /// Wrap a store using the default changelog table name
    pub fn with_default_table(store: DuckDbStore) -> Self {
        Self {
            store,
            table: DEFAULT_CHANGELOG_TABLE.to_string(),
        }
    }

    /// In-memory database with the default changelog table
    pub fn in_memory() -> DbResult<Self> {
        Ok(Self::with_default_table(DuckDbStore::in_memory()?))
    }

    /// The target store
    pub fn store(&self) -> &DuckDbStore {
        &self.store
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    fn exists(&self) -> DbResult<bool> {
        self.store.relation_exists(&self.table)
    }

    fn query_entries(&self, sql: &str, args: &[&dyn duckdb::ToSql]) -> DbResult<Vec<ChangelogEntry>> {
        let mut stmt = self.store.conn().prepare(sql)?;
        let raw: Vec<RawEntry> = stmt
            .query_map(args, RawEntry::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        raw.into_iter().map(RawEntry::into_entry).collect()
    }
}

impl TransactionalStore for DuckDbChangelog {
    fn begin_transaction(&self) -> DbResult<Box<dyn Transaction + '_>> {
        self.store.begin_transaction()
    }

    fn store_type(&self) -> &'static str {
        self.store.store_type()
    }
}

impl Changelog for DuckDbChangelog {
    fn initialize(&self) -> DbResult<()> {
        if let Some(pos) = self.table.find('.') {
            let schema = &self.table[..pos];
            self.store
                .execute_batch(&format!("CREATE SCHEMA IF NOT EXISTS {schema}"))?;
        }
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id            VARCHAR NOT NULL,
                author        VARCHAR NOT NULL,
                filename      VARCHAR NOT NULL,
                dateexecuted  VARCHAR NOT NULL,
                orderexecuted BIGINT  NOT NULL,
                checksum      VARCHAR NOT NULL,
                description   VARCHAR NOT NULL,
                tag           VARCHAR,
                version       VARCHAR NOT NULL,
                PRIMARY KEY (id, author, filename)
            )",
            self.table
        );
        log::debug!("Ensuring changelog table {}", self.table);
        self.store.execute_batch(&sql)
    }

    fn changeset_applied(&self, identity: &ChangesetId) -> DbResult<Option<ChangelogEntry>> {
        if !self.exists()? {
            return Ok(None);
        }
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM {} WHERE id = ? AND author = ? AND filename = ?",
            self.table
        );
        let mut entries = self.query_entries(
            &sql,
            &[&identity.id, &identity.author, &identity.filename],
        )?;
        Ok(entries.pop())
    }

    fn count(&self) -> DbResult<usize> {
        if !self.exists()? {
            return Ok(0);
        }
        let count: i64 = self.store.conn().query_row(
            &format!("SELECT COUNT(*) FROM {}", self.table),
            [],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    fn insert(&self, entry: &ChangelogEntry) -> DbResult<()> {
        let sql = format!(
            "INSERT INTO {} ({ENTRY_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            self.table
        );
        self.store.conn().execute(
            &sql,
            params![
                entry.id,
                entry.author,
                entry.filename,
                entry.date_executed.to_rfc3339(),
                order_param(entry.order_executed)?,
                entry.checksum,
                entry.description,
                entry.tag,
                entry.version,
            ],
        )?;
        Ok(())
    }

    fn update(&self, entry: &ChangelogEntry) -> DbResult<()> {
        let sql = format!(
            "UPDATE {} SET dateexecuted = ?, orderexecuted = ?, checksum = ?, description = ?, tag = ?, version = ?
             WHERE id = ? AND author = ? AND filename = ?",
            self.table
        );
        let changed = self.store.conn().execute(
            &sql,
            params![
                entry.date_executed.to_rfc3339(),
                order_param(entry.order_executed)?,
                entry.checksum,
                entry.description,
                entry.tag,
                entry.version,
                entry.id,
                entry.author,
                entry.filename,
            ],
        )?;
        if changed == 0 {
            return Err(DbError::EntryNotFound {
                identity: entry.identity().to_string(),
            });
        }
        Ok(())
    }

    fn delete(&self, identity: &ChangesetId) -> DbResult<()> {
        let sql = format!(
            "DELETE FROM {} WHERE id = ? AND author = ? AND filename = ?",
            self.table
        );
        self.store.conn().execute(
            &sql,
            params![identity.id, identity.author, identity.filename],
        )?;
        Ok(())
    }

    fn changesets(&self, reverse: bool) -> DbResult<Vec<ChangelogEntry>> {
        if !self.exists()? {
            return Ok(Vec::new());
        }
        let order = if reverse { "DESC" } else { "ASC" };
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM {} ORDER BY orderexecuted {order}",
            self.table
        );
        self.query_entries(&sql, &[])
    }

    fn tag(&self, identity: &ChangesetId, tag: &str) -> DbResult<()> {
        let taken: i64 = self.store.conn().query_row(
            &format!(
                "SELECT COUNT(*) FROM {} WHERE tag = ? AND NOT (id = ? AND author = ? AND filename = ?)",
                self.table
            ),
            params![tag, identity.id, identity.author, identity.filename],
            |row| row.get(0),
        )?;
        if taken > 0 {
            return Err(DbError::TagInUse {
                tag: tag.to_string(),
            });
        }

        let changed = self.store.conn().execute(
            &format!(
                "UPDATE {} SET tag = ? WHERE id = ? AND author = ? AND filename = ?",
                self.table
            ),
            params![tag, identity.id, identity.author, identity.filename],
        )?;
        if changed == 0 {
            return Err(DbError::EntryNotFound {
                identity: identity.to_string(),
            });
        }
        Ok(())
    }

    fn rollback(&self, tag: &str) -> DbResult<Option<usize>> {
        if !self.exists()? {
            return Ok(None);
        }
        let mut stmt = self.store.conn().prepare(&format!(
            "SELECT orderexecuted FROM {} WHERE tag = ?",
            self.table
        ))?;
        let tagged: Vec<i64> = stmt
            .query_map(params![tag], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        let Some(&tagged_order) = tagged.first() else {
            return Ok(None);
        };

        let after: i64 = self.store.conn().query_row(
            &format!(
                "SELECT COUNT(*) FROM {} WHERE orderexecuted > ?",
                self.table
            ),
            params![tagged_order],
            |row| row.get(0),
        )?;
        Ok(Some(usize::try_from(after).unwrap_or(0)))
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
