//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use sl_core::ChecksumMode;
use std::path::PathBuf;

/// Shiftlog - apply and roll back SQL changesets tracked in a changelog
#[derive(Parser, Debug)]
#[command(name = "shiftlog")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Print one line per changeset outcome
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: PathBuf,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the DuckDB database path (file or :memory:)
    #[arg(long, global = true, env = "SHIFTLOG_DATABASE")]
    pub database: Option<String>,

    /// Override how drift in applied changesets is handled
    #[arg(long, global = true, value_enum, env = "SHIFTLOG_CHECKSUM_MODE")]
    pub checksum_mode: Option<ChecksumModeArg>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply every pending changeset
    All(SourceArgs),

    /// Apply the next COUNT pending changesets
    Up(CountArgs),

    /// Roll back every applied changeset
    Reset(SourceArgs),

    /// Roll back the COUNT most recently applied changesets
    Down(CountArgs),

    /// Tag the most recently applied changeset
    Tag(TagArgs),

    /// Roll back every changeset applied after a tag
    Rollback(TagArgs),

    /// List applied changesets
    Status,
}

/// Arguments for commands that only need a changeset file
#[derive(Args, Debug)]
pub struct SourceArgs {
    /// Changeset file
    pub file: PathBuf,
}

/// Arguments for the up and down commands
#[derive(Args, Debug)]
pub struct CountArgs {
    /// Number of changesets (0 means all)
    pub count: usize,

    /// Changeset file
    pub file: PathBuf,
}

/// Arguments for the tag and rollback commands
#[derive(Args, Debug)]
pub struct TagArgs {
    /// Tag name
    pub name: String,

    /// Changeset file
    pub file: PathBuf,
}

/// Drift policy as accepted on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumModeArg {
    /// Abort on the first mismatch
    Error,
    /// Report mismatches and continue
    Ignore,
    /// Overwrite stored checksums and continue
    Update,
}

impl From<ChecksumModeArg> for ChecksumMode {
    fn from(arg: ChecksumModeArg) -> Self {
        match arg {
            ChecksumModeArg::Error => ChecksumMode::Error,
            ChecksumModeArg::Ignore => ChecksumMode::Ignore,
            ChecksumModeArg::Update => ChecksumMode::Update,
        }
    }
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
