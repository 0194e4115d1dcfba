//! Tag command implementation

use anyhow::{Context, Result};

use crate::cli::{GlobalArgs, TagArgs};
use crate::commands::common::build_migrator;

/// Execute the tag command
pub fn execute(args: &TagArgs, global: &GlobalArgs) -> Result<()> {
    let migrator = build_migrator(global, &args.file)?;
    migrator
        .tag(&args.name)
        .with_context(|| format!("Failed to apply tag '{}'", args.name))?;

    println!("Tagged latest changeset as '{}'", args.name);
    Ok(())
}
