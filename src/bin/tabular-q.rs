//! tabular-q CLI - train and inspect tabular Q-learning runs

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tabular-q")]
#[command(version, about = "Tabular Q-learning trainer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a Q-table on the corridor environment
    Train(tabular_q::cli::commands::train::TrainArgs),

    /// Inspect a saved checkpoint
    Inspect(tabular_q::cli::commands::inspect::InspectArgs),
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Train(args) => tabular_q::cli::commands::train::execute(args),
        Commands::Inspect(args) => tabular_q::cli::commands::inspect::execute(args),
    }
}
