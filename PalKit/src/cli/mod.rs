//! `PalKit` CLI - sprite extraction tools for PAL1 resource archives

pub mod commands;
pub mod progress;

use clap::Parser;
use commands::Commands;

#[derive(Parser)]
#[command(name = "palkit", version)]
#[command(about = "PalKit: sprite extraction for PAL1 MKF archives", long_about = None)]
struct Cli {
    /// Runs `extract` with the built-in configuration when omitted
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Run the `PalKit` CLI
pub fn run_cli() -> anyhow::Result<()> {
    // Setup logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Some(command) => command.execute(),
        None => commands::extract::execute(None, false),
    }
}
