//! Status command implementation

use anyhow::{Context, Result};
use sl_core::ChangelogEntry;
use sl_engine::Migrator;

use crate::cli::GlobalArgs;
use crate::commands::common::{load_config, open_changelog};

/// Execute the status command
pub fn execute(global: &GlobalArgs) -> Result<()> {
    let latest = latest_entry(global)?;

    match latest {
        Some(entry) => println!(
            "Latest: {}:{} ({}) applied {}",
            entry.author,
            entry.id,
            entry.filename,
            entry.date_executed.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        None => println!("Nothing applied yet"),
    }
    Ok(())
}

/// Print every applied entry and return the most recent one
fn latest_entry(global: &GlobalArgs) -> Result<Option<ChangelogEntry>> {
    let config = load_config(global)?;
    let changelog = open_changelog(&config, &global.project_dir)?;

    // Status never parses a source, so the engine is bound to empty text
    let migrator = Migrator::from_text(changelog, String::new()).with_verbose(true);
    migrator.status().context("Failed to read changelog")
}

#[cfg(test)]
#[path = "status_test.rs"]
mod tests;
