//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use sl_core::{ChangelogBackend, Config, MEMORY_DATABASE};
use sl_db::{Changelog, DuckDbChangelog, DuckDbStore, JsonFileChangelog};
use sl_engine::Migrator;
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;

/// Changelog chosen at runtime from the config
pub(crate) type DynChangelog = Box<dyn Changelog>;

/// Load the project config and apply command-line overrides.
///
/// An explicit `--config` must exist; otherwise a missing config file in the
/// project directory means defaults.
pub(crate) fn load_config(global: &GlobalArgs) -> Result<Config> {
    let mut config = match &global.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::load_or_default(&global.project_dir).with_context(|| {
            format!(
                "Failed to load config from {}",
                global.project_dir.display()
            )
        })?,
    };

    if let Some(database) = &global.database {
        config.changelog.path = database.clone();
    }
    if let Some(mode) = global.checksum_mode {
        config.checksum_mode = mode.into();
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Resolve the DuckDB path against the project directory
pub(crate) fn database_path(config: &Config, root: &Path) -> String {
    let path = &config.changelog.path;
    if config.changelog.is_in_memory() {
        MEMORY_DATABASE.to_string()
    } else if Path::new(path).is_absolute() {
        path.clone()
    } else {
        root.join(path).display().to_string()
    }
}

/// Open the target store and the configured changelog on top of it
pub(crate) fn open_changelog(config: &Config, root: &Path) -> Result<DynChangelog> {
    let db_path = database_path(config, root);
    if db_path == MEMORY_DATABASE {
        log::warn!("Using an in-memory database; nothing will persist after this command");
    }
    let store = DuckDbStore::new(&db_path)
        .with_context(|| format!("Failed to open database {db_path}"))?;

    log::debug!("Opening {} changelog", config.changelog.backend);
    match config.changelog.backend {
        ChangelogBackend::DuckDb => {
            let changelog = DuckDbChangelog::new(store, &config.changelog.table)
                .context("Failed to set up changelog table")?;
            Ok(Box::new(changelog))
        }
        ChangelogBackend::JsonFile => {
            let json_path = config
                .json_path_absolute(root)
                .context("changelog.json_path is required for the jsonfile backend")?;
            log::debug!("Using JSON changelog {}", json_path.display());
            Ok(Box::new(JsonFileChangelog::new(json_path, store)))
        }
    }
}

/// Build a migrator for `file` from the global options
pub(crate) fn build_migrator(global: &GlobalArgs, file: &Path) -> Result<Migrator<DynChangelog>> {
    let config = load_config(global)?;
    let changelog = open_changelog(&config, &global.project_dir)?;
    Ok(migrator_for(changelog, file, &config, global.verbose))
}

pub(crate) fn migrator_for(
    changelog: DynChangelog,
    file: &Path,
    config: &Config,
    verbose: bool,
) -> Migrator<DynChangelog> {
    Migrator::from_file(changelog, PathBuf::from(file))
        .with_verbose(verbose)
        .with_checksum_mode(config.checksum_mode)
        .with_format_version(config.format_version.clone())
}

/// "changeset" or "changesets"
pub(crate) fn plural(count: usize) -> &'static str {
    if count == 1 {
        "changeset"
    } else {
        "changesets"
    }
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
