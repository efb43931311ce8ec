//! vstore CLI
//!
//! Reads and writes files in a Git or Subversion repository through one
//! set of commands, whatever the backend.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::Cli;
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.global.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .map_err(|e| CliError::user(format!("failed to set up logging: {e}")))?;
        tracing::debug!("Verbose mode enabled");
    }

    let mut client = commands::open_client(&cli.global)?;
    let mut stdout = std::io::stdout().lock();
    commands::execute(&mut client, &cli.command, cli.global.json, &mut stdout)
}
