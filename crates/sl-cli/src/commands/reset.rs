//! Reset / down command implementation

use anyhow::{Context, Result};
use std::path::Path;

use crate::cli::{CountArgs, GlobalArgs, SourceArgs};
use crate::commands::common::{build_migrator, plural};

/// Execute the reset command
pub fn execute_all(args: &SourceArgs, global: &GlobalArgs) -> Result<()> {
    run(&args.file, 0, global).map(|_| ())
}

/// Execute the down command
pub fn execute_down(args: &CountArgs, global: &GlobalArgs) -> Result<()> {
    run(&args.file, args.count, global).map(|_| ())
}

fn run(file: &Path, max: usize, global: &GlobalArgs) -> Result<usize> {
    let migrator = build_migrator(global, file)?;
    let rolled_back = migrator
        .reset(max)
        .with_context(|| format!("Failed to roll back changesets from {}", file.display()))?;

    println!("Rolled back {rolled_back} {}", plural(rolled_back));
    Ok(rolled_back)
}
