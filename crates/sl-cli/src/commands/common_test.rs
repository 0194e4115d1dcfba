use super::*;
use crate::cli::ChecksumModeArg;
use sl_core::ChecksumMode;
use std::fs;
use tempfile::tempdir;

fn global(project_dir: &Path) -> GlobalArgs {
    GlobalArgs {
        verbose: false,
        project_dir: project_dir.to_path_buf(),
        config: None,
        database: None,
        checksum_mode: None,
    }
}

#[test]
fn test_missing_config_uses_defaults() {
    let dir = tempdir().unwrap();
    let config = load_config(&global(dir.path())).unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(database_path(&config, dir.path()), ":memory:");
}

#[test]
fn test_flags_override_config_file() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("shiftlog.yml"),
        r#"
changelog:
  path: from_file.duckdb
checksum_mode: ignore
"#,
    )
    .unwrap();

    let config = load_config(&global(dir.path())).unwrap();
    assert_eq!(config.checksum_mode, ChecksumMode::Ignore);
    assert_eq!(
        database_path(&config, dir.path()),
        dir.path().join("from_file.duckdb").display().to_string()
    );

    let mut args = global(dir.path());
    args.database = Some("override.duckdb".to_string());
    args.checksum_mode = Some(ChecksumModeArg::Update);
    let config = load_config(&args).unwrap();
    assert_eq!(config.changelog.path, "override.duckdb");
    assert_eq!(config.checksum_mode, ChecksumMode::Update);
}

#[test]
fn test_explicit_config_must_exist() {
    let dir = tempdir().unwrap();
    let mut args = global(dir.path());
    args.config = Some(dir.path().join("nope.yml"));
    let err = load_config(&args).unwrap_err();
    assert!(format!("{err:#}").contains("[E006]"));
}

#[test]
fn test_open_duckdb_changelog() {
    let dir = tempdir().unwrap();
    let mut args = global(dir.path());
    args.database = Some("state.duckdb".to_string());
    let config = load_config(&args).unwrap();

    let changelog = open_changelog(&config, dir.path()).unwrap();
    changelog.initialize().unwrap();
    assert_eq!(changelog.store_type(), "duckdb");
    assert_eq!(changelog.count().unwrap(), 0);
    assert!(dir.path().join("state.duckdb").exists());
}

#[test]
fn test_open_json_changelog() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("shiftlog.yml"),
        r#"
changelog:
  type: jsonfile
  path: target.duckdb
  json_path: ledger/changelog.json
"#,
    )
    .unwrap();

    let config = load_config(&global(dir.path())).unwrap();
    let changelog = open_changelog(&config, dir.path()).unwrap();
    changelog.initialize().unwrap();
    assert!(dir.path().join("ledger").join("changelog.json").exists());
}

#[test]
fn test_jsonfile_without_path_is_rejected() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("shiftlog.yml"),
        "changelog:\n  type: jsonfile\n",
    )
    .unwrap();
    assert!(load_config(&global(dir.path())).is_err());
}

#[test]
fn test_jsonfile_needs_persistent_database() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("shiftlog.yml"),
        "changelog:\n  type: jsonfile\n  json_path: changelog.json\n",
    )
    .unwrap();

    let err = load_config(&global(dir.path())).unwrap_err();
    assert!(format!("{err:#}").contains(":memory:"));

    let mut args = global(dir.path());
    args.database = Some("target.duckdb".to_string());
    let config = load_config(&args).unwrap();
    assert_eq!(config.changelog.path, "target.duckdb");
}

#[test]
fn test_plural() {
    assert_eq!(plural(0), "changesets");
    assert_eq!(plural(1), "changeset");
    assert_eq!(plural(2), "changesets");
}
