//! Shiftlog CLI - apply and roll back SQL changesets tracked in a changelog

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::Cli;
use commands::{migrate, reset, rollback, status, tag};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        cli::Commands::All(args) => migrate::execute_all(args, &cli.global),
        cli::Commands::Up(args) => migrate::execute_up(args, &cli.global),
        cli::Commands::Reset(args) => reset::execute_all(args, &cli.global),
        cli::Commands::Down(args) => reset::execute_down(args, &cli.global),
        cli::Commands::Tag(args) => tag::execute(args, &cli.global),
        cli::Commands::Rollback(args) => rollback::execute(args, &cli.global),
        cli::Commands::Status => status::execute(&cli.global),
    }
}
