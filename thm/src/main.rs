use std::path::PathBuf;

use clap::{Parser, Subcommand};
use libhunt::HuntStore;

mod commands;

#[derive(Parser)]
#[command(name = "thm")]
#[command(about = "Manage treasure records inside hunt directories", long_about = None)]
struct Cli {
    /// Base directory holding the hunt directories
    #[arg(long, default_value = ".")]
    base: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a treasure to a hunt, prompting for its fields
    Add {
        #[arg(value_name = "HUNT_ID")]
        hunt: String,
    },
    /// List every treasure in a hunt
    List {
        #[arg(value_name = "HUNT_ID")]
        hunt: String,
    },
    /// Show one treasure by id
    View {
        #[arg(value_name = "HUNT_ID")]
        hunt: String,
        #[arg(value_name = "TREASURE_ID")]
        id: u32,
    },
    /// Remove one treasure, renumbering the survivors
    RemoveTreasure {
        #[arg(value_name = "HUNT_ID")]
        hunt: String,
        #[arg(value_name = "TREASURE_ID")]
        id: u32,
    },
    /// Remove a hunt and everything it owns
    RemoveHunt {
        #[arg(value_name = "HUNT_ID")]
        hunt: String,
    },
}

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    let store = HuntStore::new(&cli.base);
    let mut output = std::io::stdout();

    match cli.command {
        Commands::Add { hunt } => {
            let stdin = std::io::stdin();
            commands::add(&store, &hunt, &mut stdin.lock(), &mut output)
        }
        Commands::List { hunt } => commands::list(&store, &hunt, &mut output),
        Commands::View { hunt, id } => commands::view(&store, &hunt, id, &mut output),
        Commands::RemoveTreasure { hunt, id } => {
            commands::remove_treasure(&store, &hunt, id, &mut output)
        }
        Commands::RemoveHunt { hunt } => commands::remove_hunt(&store, &hunt, &mut output),
    }
}
