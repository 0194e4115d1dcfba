//! Rollback command implementation

use anyhow::{Context, Result};

use crate::cli::{GlobalArgs, TagArgs};
use crate::commands::common::{build_migrator, plural};

/// Execute the rollback command
pub fn execute(args: &TagArgs, global: &GlobalArgs) -> Result<()> {
    let migrator = build_migrator(global, &args.file)?;
    let rolled_back = migrator
        .rollback(&args.name)
        .with_context(|| format!("Failed to roll back to tag '{}'", args.name))?;

    println!(
        "Rolled back {rolled_back} {} to tag '{}'",
        plural(rolled_back),
        args.name
    );
    Ok(())
}
