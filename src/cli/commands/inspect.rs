//! Inspect command - Summarize a saved checkpoint

use std::{collections::BTreeMap, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    adapters::MsgPackRepository,
    cli::output::{format_number, print_kv, print_section},
    ports::CheckpointRepository,
    q_learning::QTable,
    types::{ActionKey, StateKey},
};

#[derive(Parser, Debug)]
#[command(about = "Inspect a saved checkpoint")]
pub struct InspectArgs {
    /// Checkpoint file written by `train`
    pub checkpoint: PathBuf,

    /// Maximum number of states to list
    #[arg(long, short = 'l', default_value_t = 20)]
    pub limit: usize,
}

/// Best stored action per state, ordered by state.
///
/// Only entries present in the table are considered; unseen actions would
/// read as 0.0.
pub fn stored_policy(table: &QTable) -> Vec<(StateKey, ActionKey, f64)> {
    let mut best: BTreeMap<&StateKey, (&ActionKey, f64)> = BTreeMap::new();
    for (state, action, value) in table.iter() {
        match best.get(state) {
            Some(&(current, current_value))
                if current_value > value || (current_value == value && current <= action) => {}
            _ => {
                best.insert(state, (action, value));
            }
        }
    }
    best.into_iter()
        .map(|(state, (action, value))| (state.clone(), action.clone(), value))
        .collect()
}

pub fn execute(args: InspectArgs) -> Result<()> {
    let checkpoint = MsgPackRepository::new()
        .load(&args.checkpoint)
        .with_context(|| format!("Failed to load checkpoint {}", args.checkpoint.display()))?;

    print_section("Checkpoint");
    print_kv("Format version", &checkpoint.version.to_string());
    print_kv("Episodes completed", &format_number(checkpoint.episode as usize));
    print_kv(
        "Exploration rate",
        &format!("{:.6}", checkpoint.exploration_rate),
    );
    print_kv("Table entries", &format_number(checkpoint.table.len()));
    print_kv("States", &format_number(checkpoint.table.state_count()));

    let policy = stored_policy(&checkpoint.table);
    if !policy.is_empty() {
        print_section("Greedy policy over stored entries");
        for (state, action, value) in policy.iter().take(args.limit) {
            println!(
                "  {:<24} -> {:<12} Q={value:.4}",
                state.to_string(),
                action.to_string()
            );
        }
        if policy.len() > args.limit {
            println!("  ... {} more states", policy.len() - args.limit);
        }
    }

    Ok(())
}
