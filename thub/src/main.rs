use std::path::PathBuf;

use clap::{Parser, Subcommand};
use thub::{hub, monitor};

#[derive(Parser)]
#[command(name = "thub")]
#[command(about = "Interactive hub for treasure hunts with a background monitor", long_about = None)]
struct Cli {
    /// Base directory holding the hunt directories
    #[arg(long, default_value = ".")]
    base: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run as the monitor worker. Spawned by the hub, not meant for direct use.
    #[command(hide = true)]
    Monitor,
}

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Monitor) => monitor::run(&cli.base).map_err(Into::into),
        None => hub::run(&cli.base),
    }
}
