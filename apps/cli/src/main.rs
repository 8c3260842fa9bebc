//! worldcruise CLI. Extracts the world cruise article into a JSON catalog.
//!
//! Running with no subcommand reads the saved article from the working
//! directory and writes `world-cruises.json` next to it.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
