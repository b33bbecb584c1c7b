//! Checkpoint persistence through the MessagePack repository

use tabular_q::{
    ActionSpace, Trainer, TrainerConfig,
    adapters::MsgPackRepository,
    envs::{Corridor, corridor_actions},
    ports::CheckpointRepository,
};
use tempfile::TempDir;

fn config(episodes: u64) -> TrainerConfig {
    TrainerConfig::new(4)
        .with_learning_rate(0.3)
        .with_discount_factor(0.95)
        .with_exploration(0.9, 0.98, 25)
        .with_episodes(episodes)
        .with_checkpoint_interval(40)
        .with_seed(17)
}

#[test]
fn test_trained_table_survives_disk_roundtrip() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("qtable.msgpack");
    let space = ActionSpace::new(&corridor_actions, 4, false).unwrap();

    let mut trainer = Trainer::new(config(100), space)
        .unwrap()
        .with_checkpoints(Box::new(MsgPackRepository::new()), &path);
    trainer.run(&mut Corridor::new(4)).unwrap();
    assert!(path.exists());

    let loaded = MsgPackRepository::new().load(&path).unwrap();
    assert_eq!(loaded.episode, 100);
    assert_eq!(loaded.exploration_rate, trainer.exploration_rate());
    assert_eq!(loaded.table.len(), trainer.q_table().len());
    for (state, action, value) in trainer.q_table().iter() {
        assert_eq!(loaded.table.get(state, action), value);
    }
    // Pairs never visited read as zero on both sides.
    assert_eq!(loaded.table.get([99], [1]), 0.0);
}

#[test]
fn test_resumed_run_matches_checkpointed_progress() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("qtable.msgpack");
    let space = ActionSpace::new(&corridor_actions, 4, false).unwrap();

    let mut first = Trainer::new(config(80), space.clone())
        .unwrap()
        .with_checkpoints(Box::new(MsgPackRepository::new()), &path);
    first.run(&mut Corridor::new(4)).unwrap();

    let checkpoint = MsgPackRepository::new().load(&path).unwrap();
    let mut resumed = Trainer::resume(config(120), space, checkpoint)
        .unwrap()
        .with_checkpoints(Box::new(MsgPackRepository::new()), &path);
    assert_eq!(resumed.q_table(), first.q_table());

    let summary = resumed.run(&mut Corridor::new(4)).unwrap();
    assert_eq!(summary.episodes, 40);
    assert_eq!(MsgPackRepository::new().load(&path).unwrap().episode, 120);
}

#[test]
fn test_missing_checkpoint_is_an_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let result = MsgPackRepository::new().load(&temp_dir.path().join("absent.msgpack"));
    assert!(result.is_err());
}
