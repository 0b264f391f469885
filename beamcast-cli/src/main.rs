//! Beamcast CLI - Command-line interface
//!
//! Inspects playlists, exports favorites, and drives a simulated playback
//! run for debugging.

mod commands;

use clap::Parser;

use beamcast_core::tracing_setup::{CliLogLevel, init_tracing};

#[derive(Parser)]
#[command(name = "beamcast")]
#[command(about = "An IPTV playlist player")]
struct Cli {
    /// Console log level
    #[arg(long, global = true, default_value = "warn")]
    log_level: CliLogLevel,

    #[command(subcommand)]
    command: commands::Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_tracing_level(), None)
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing: {error}"))?;

    commands::handle_command(cli.command).await
}
