//! All / up command implementation

use anyhow::{Context, Result};
use std::path::Path;

use crate::cli::{CountArgs, GlobalArgs, SourceArgs};
use crate::commands::common::{build_migrator, plural};

/// Execute the all command
pub fn execute_all(args: &SourceArgs, global: &GlobalArgs) -> Result<()> {
    run(&args.file, 0, global).map(|_| ())
}

/// Execute the up command
pub fn execute_up(args: &CountArgs, global: &GlobalArgs) -> Result<()> {
    run(&args.file, args.count, global).map(|_| ())
}

fn run(file: &Path, max: usize, global: &GlobalArgs) -> Result<usize> {
    let migrator = build_migrator(global, file)?;
    let applied = migrator
        .migrate(max)
        .with_context(|| format!("Failed to apply changesets from {}", file.display()))?;

    println!("Applied {applied} {}", plural(applied));
    Ok(applied)
}

#[cfg(test)]
#[path = "migrate_test.rs"]
mod tests;
