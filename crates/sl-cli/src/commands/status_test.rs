use super::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_status_reads_without_creating_storage() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("shiftlog.yml"),
        "changelog:\n  type: jsonfile\n  path: target.duckdb\n  json_path: changelog.json\n",
    )
    .unwrap();
    let global = GlobalArgs {
        verbose: false,
        project_dir: dir.path().to_path_buf(),
        config: None,
        database: None,
        checksum_mode: None,
    };

    assert!(latest_entry(&global).unwrap().is_none());
    execute(&global).unwrap();
    assert!(!dir.path().join("changelog.json").exists());
}

#[test]
fn test_status_reports_latest() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("changes.sql");
    fs::write(
        &file,
        "--changeset ops:1\nCREATE TABLE a (id INTEGER);\n--changeset ops:2\nCREATE TABLE b (id INTEGER);\n",
    )
    .unwrap();
    let global = GlobalArgs {
        verbose: false,
        project_dir: dir.path().to_path_buf(),
        config: None,
        database: Some("state.duckdb".to_string()),
        checksum_mode: None,
    };

    let migrator = crate::commands::common::build_migrator(&global, &file).unwrap();
    migrator.migrate(0).unwrap();
    drop(migrator);

    let latest = latest_entry(&global).unwrap().unwrap();
    assert_eq!(latest.id, "2");
    assert_eq!(latest.order_executed, 2);
}
