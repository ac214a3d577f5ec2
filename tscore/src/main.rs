use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use libhunt::HuntStore;
use libhunt::score;

#[derive(Parser)]
#[command(name = "tscore")]
#[command(about = "Print per-user score totals and the winner for a hunt", long_about = None)]
struct Cli {
    /// Base directory holding the hunt directories
    #[arg(long, default_value = ".")]
    base: PathBuf,

    #[arg(value_name = "HUNT_ID")]
    hunt: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    let store = HuntStore::new(&cli.base);
    report(&store, &cli.hunt, &mut std::io::stdout())
}

fn report(store: &HuntStore, hunt: &str, output: &mut impl Write) -> Result<()> {
    writeln!(output, "Score calculation for hunt: {hunt}")?;
    writeln!(output, "-----------------------------------")?;

    let scores = score::tally(store, hunt)?;
    if scores.is_empty() {
        writeln!(output, "No treasures found in this hunt.")?;
        return Ok(());
    }

    writeln!(output, "User Scores:")?;
    writeln!(output, "------------")?;
    for s in &scores {
        writeln!(output, "User: {:<15} Score: {}", s.user, s.total)?;
    }

    // tally returned a non-empty list, so a winner exists
    if let Some(w) = score::winner(&scores) {
        writeln!(output, "\nWinner: {} with score {}", w.user, w.total)?;
    }
    writeln!(output, "-----------------------------------")?;
    Ok(())
}
