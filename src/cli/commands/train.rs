//! Train command - Train a Q-table on the corridor environment

use std::{fs, path::PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::Parser;

use crate::{
    action_space::ActionSpace,
    adapters::MsgPackRepository,
    cli::output::{format_number, print_kv, print_section},
    config::TrainerConfig,
    envs::{Corridor, corridor_actions},
    pipeline::{JsonlObserver, MetricsObserver, ProgressObserver, Trainer},
    ports::CheckpointRepository,
};

const CHECKPOINT_FILE: &str = "qtable.msgpack";

#[derive(Parser, Debug)]
#[command(about = "Train a Q-table", allow_negative_numbers = true)]
pub struct TrainArgs {
    /// JSON configuration file
    #[arg(long, short = 'c')]
    pub config: PathBuf,

    /// Override the configured number of episodes
    #[arg(long, short = 'e')]
    pub episodes: Option<u64>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Directory for periodic checkpoints
    #[arg(long)]
    pub checkpoint_dir: Option<PathBuf>,

    /// Continue from the checkpoint in --checkpoint-dir if one exists
    #[arg(long, default_value_t = false, requires = "checkpoint_dir")]
    pub resume: bool,

    /// Optional JSONL file receiving one metric record per reported episode
    #[arg(long)]
    pub metrics: Option<PathBuf>,

    /// Optional path for writing a summary JSON file
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(long, default_value_t = false)]
    pub no_progress: bool,

    /// Corridor stage whose terminal steps are flagged exceptional
    #[arg(long)]
    pub fault_stage: Option<i64>,
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let mut config = TrainerConfig::from_file(&args.config)
        .with_context(|| format!("Failed to load config {}", args.config.display()))?;
    if let Some(episodes) = args.episodes {
        config.episodes = episodes;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    config.validate()?;
    log::info!("{}", serde_json::to_string_pretty(&config)?);

    let space = ActionSpace::new(&corridor_actions, config.n, config.training_stage_last)?;
    let repository = MsgPackRepository::new();

    let checkpoint_path = match &args.checkpoint_dir {
        Some(dir) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            Some(dir.join(CHECKPOINT_FILE))
        }
        None => None,
    };

    let mut trainer = match &checkpoint_path {
        Some(path) if args.resume && path.exists() => {
            let checkpoint = repository
                .load(path)
                .with_context(|| format!("Failed to load checkpoint {}", path.display()))?;
            println!(
                "Resuming from episode {} (epsilon {:.4})",
                checkpoint.episode, checkpoint.exploration_rate
            );
            Trainer::resume(config.clone(), space, checkpoint)?
        }
        Some(path) if args.resume => {
            return Err(anyhow!("No checkpoint to resume at {}", path.display()));
        }
        _ => Trainer::new(config.clone(), space)?,
    };

    if let Some(path) = checkpoint_path {
        trainer = trainer.with_checkpoints(Box::new(repository), path);
    }
    if !args.no_progress {
        trainer = trainer.with_observer(Box::new(ProgressObserver::new()));
    }
    if let Some(path) = &args.metrics {
        let observer = JsonlObserver::new(path)
            .with_context(|| format!("Failed to open metrics file {}", path.display()))?;
        trainer = trainer.with_observer(Box::new(observer));
    }
    let metrics = MetricsObserver::new();
    trainer = trainer.with_observer(Box::new(metrics.clone()));

    let mut env = Corridor::new(config.n);
    if let Some(stage) = args.fault_stage {
        env = env.with_fault_stage(stage);
    }

    let summary = trainer.run(&mut env).context("Training failed")?;
    let stats = metrics.summary();

    print_section("Training Summary");
    print_kv("Episodes", &format_number(summary.episodes as usize));
    print_kv("Total episodes", &format_number(summary.total_episodes as usize));
    print_kv("Exceptional", &summary.exceptional_episodes.to_string());
    print_kv("Mean reward", &format!("{:.4}", summary.mean_reward));
    print_kv("Mean steps", &format!("{:.2}", stats.mean_steps));
    print_kv(
        "Final epsilon",
        &format!("{:.6}", summary.final_exploration_rate),
    );
    print_kv("Table entries", &format_number(summary.table_size));
    if summary.checkpoint_failures > 0 {
        print_kv(
            "Checkpoint failures",
            &summary.checkpoint_failures.to_string(),
        );
    }

    if let Some(path) = &args.summary {
        summary
            .save(path)
            .with_context(|| format!("Failed to write summary {}", path.display()))?;
        println!("\nSummary written to {}", path.display());
    }

    Ok(())
}
