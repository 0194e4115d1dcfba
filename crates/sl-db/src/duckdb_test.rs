use super::*;
use chrono::TimeZone;

fn entry(id: &str, order: usize) -> ChangelogEntry {
    ChangelogEntry {
        id: id.to_string(),
        author: "jane".to_string(),
        filename: "success.sql".to_string(),
        date_executed: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        order_executed: order,
        checksum: format!("sum-{id}"),
        description: String::new(),
        tag: None,
        version: "1.0".to_string(),
    }
}

fn identity(id: &str) -> ChangesetId {
    ChangesetId::new("jane", id, "success.sql")
}

fn seeded() -> DuckDbChangelog {
    let log = DuckDbChangelog::in_memory().unwrap();
    log.initialize().unwrap();
    for (i, id) in ["1", "2", "3"].iter().enumerate() {
        log.insert(&entry(id, i + 1)).unwrap();
    }
    log
}

#[test]
fn test_store_type() {
    let log = DuckDbChangelog::in_memory().unwrap();
    assert_eq!(log.store_type(), "duckdb");
    assert_eq!(log.table(), DEFAULT_CHANGELOG_TABLE);
}

#[test]
fn test_initialize_is_idempotent() {
    let log = DuckDbChangelog::in_memory().unwrap();
    log.initialize().unwrap();
    log.initialize().unwrap();
    assert!(log.store().relation_exists(DEFAULT_CHANGELOG_TABLE).unwrap());
}

#[test]
fn test_uninitialized_reads_as_empty() {
    let log = DuckDbChangelog::in_memory().unwrap();
    assert_eq!(log.count().unwrap(), 0);
    assert!(log.changesets(false).unwrap().is_empty());
    assert!(log.changeset_applied(&identity("1")).unwrap().is_none());
    assert!(log.rollback("v1").unwrap().is_none());
    assert!(!log.store().relation_exists(DEFAULT_CHANGELOG_TABLE).unwrap());
}

#[test]
fn test_schema_qualified_table() {
    let log = DuckDbChangelog::new(DuckDbStore::in_memory().unwrap(), "ops.changelog").unwrap();
    log.initialize().unwrap();
    log.insert(&entry("1", 1)).unwrap();
    assert_eq!(log.count().unwrap(), 1);
    assert!(log.store().relation_exists("ops.changelog").unwrap());
}

#[test]
fn test_invalid_table_name_rejected() {
    let result = DuckDbChangelog::new(DuckDbStore::in_memory().unwrap(), "x; DROP TABLE y");
    assert!(matches!(result, Err(DbError::InvalidTableName(_))));
}

#[test]
fn test_insert_and_lookup_round_trip() {
    let log = seeded();
    let found = log.changeset_applied(&identity("2")).unwrap().unwrap();
    assert_eq!(found, entry("2", 2));
    assert!(log
        .changeset_applied(&ChangesetId::new("jane", "2", "other.sql"))
        .unwrap()
        .is_none());
}

#[test]
fn test_duplicate_insert_is_constraint_violation() {
    let log = seeded();
    let err = log.insert(&entry("1", 4)).unwrap_err();
    assert!(matches!(err, DbError::ConstraintViolation(_)), "got {err}");
}

#[test]
fn test_changesets_ordering() {
    let log = seeded();
    let asc: Vec<usize> = log
        .changesets(false)
        .unwrap()
        .iter()
        .map(|e| e.order_executed)
        .collect();
    let desc: Vec<usize> = log
        .changesets(true)
        .unwrap()
        .iter()
        .map(|e| e.order_executed)
        .collect();
    assert_eq!(asc, vec![1, 2, 3]);
    assert_eq!(desc, vec![3, 2, 1]);
}

#[test]
fn test_update_overwrites_checksum() {
    let log = seeded();
    let mut e = log.changeset_applied(&identity("1")).unwrap().unwrap();
    e.checksum = "bad".to_string();
    log.update(&e).unwrap();
    assert_eq!(
        log.changeset_applied(&identity("1")).unwrap().unwrap().checksum,
        "bad"
    );
}

#[test]
fn test_update_missing_entry() {
    let log = seeded();
    let err = log.update(&entry("9", 9)).unwrap_err();
    assert!(matches!(err, DbError::EntryNotFound { .. }));
}

#[test]
fn test_delete() {
    let log = seeded();
    log.delete(&identity("3")).unwrap();
    assert_eq!(log.count().unwrap(), 2);
    assert!(log.changeset_applied(&identity("3")).unwrap().is_none());
}

#[test]
fn test_tag_uniqueness() {
    let log = seeded();
    log.tag(&identity("1"), "v1").unwrap();
    // Re-tagging the same entry with its own tag is allowed.
    log.tag(&identity("1"), "v1").unwrap();

    let err = log.tag(&identity("2"), "v1").unwrap_err();
    assert!(matches!(err, DbError::TagInUse { ref tag } if tag == "v1"));

    let tagged = log.changeset_applied(&identity("1")).unwrap().unwrap();
    assert_eq!(tagged.tag.as_deref(), Some("v1"));
}

#[test]
fn test_tag_missing_entry() {
    let log = seeded();
    let err = log.tag(&identity("9"), "v9").unwrap_err();
    assert!(matches!(err, DbError::EntryNotFound { .. }));
}

#[test]
fn test_rollback_counts_entries_after_tag() {
    let log = seeded();
    log.tag(&identity("1"), "first").unwrap();
    log.tag(&identity("3"), "last").unwrap();

    assert_eq!(log.rollback("first").unwrap(), Some(2));
    assert_eq!(log.rollback("last").unwrap(), Some(0));
    assert_eq!(log.rollback("missing").unwrap(), None);
}

#[test]
fn test_transaction_commit_persists() {
    let store = DuckDbStore::in_memory().unwrap();
    {
        let mut tx = store.begin_transaction().unwrap();
        tx.exec("CREATE TABLE t (id INT)").unwrap();
        tx.exec("INSERT INTO t VALUES (1)").unwrap();
        tx.commit().unwrap();
    }
    assert!(store.relation_exists("t").unwrap());
}

#[test]
fn test_transaction_rollback_discards() {
    let store = DuckDbStore::in_memory().unwrap();
    {
        let mut tx = store.begin_transaction().unwrap();
        tx.exec("CREATE TABLE t (id INT)").unwrap();
        tx.rollback().unwrap();
    }
    assert!(!store.relation_exists("t").unwrap());
}

#[test]
fn test_dropped_transaction_rolls_back() {
    let store = DuckDbStore::in_memory().unwrap();
    {
        let mut tx = store.begin_transaction().unwrap();
        tx.exec("CREATE TABLE t (id INT)").unwrap();
    }
    assert!(!store.relation_exists("t").unwrap());

    // The connection is usable again after the implicit rollback.
    let mut tx = store.begin_transaction().unwrap();
    tx.exec("CREATE TABLE u (id INT)").unwrap();
    tx.commit().unwrap();
    assert!(store.relation_exists("u").unwrap());
}

#[test]
fn test_exec_error_reports_statement() {
    let store = DuckDbStore::in_memory().unwrap();
    let mut tx = store.begin_transaction().unwrap();
    let err = tx.exec("INSERT bad query").unwrap_err();
    match err {
        DbError::ExecutionError(msg) => assert!(msg.contains("INSERT bad query")),
        other => panic!("unexpected error: {other}"),
    }
    tx.rollback().unwrap();
}

#[test]
fn test_file_backed_store_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("target.duckdb");
    {
        let log = DuckDbChangelog::with_default_table(DuckDbStore::from_path(&path).unwrap());
        log.initialize().unwrap();
        log.insert(&entry("1", 1)).unwrap();
    }
    let log = DuckDbChangelog::with_default_table(
        DuckDbStore::new(path.to_str().unwrap()).unwrap(),
    );
    assert_eq!(log.count().unwrap(), 1);
}
