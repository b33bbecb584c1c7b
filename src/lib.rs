//! Tabular Q-learning trainer
//!
//! This crate provides:
//! - A sparse Q-table over discrete state/action vectors with zero defaults
//! - Stage-keyed legal action sets produced by an external generator
//! - An episodic trainer with ε-greedy exploration, terminal reward
//!   reshaping over the trajectory, and accelerating ε decay
//! - Ports for the environment, metric observers and checkpoint storage,
//!   with MessagePack and in-memory checkpoint adapters
//! - A small reference environment and a CLI for training and inspection

pub mod action_space;
pub mod adapters;
pub mod cli;
pub mod config;
pub mod envs;
pub mod error;
pub mod pipeline;
pub mod ports;
pub mod q_learning;
pub mod types;

pub use action_space::{ActionGenerator, ActionMap, ActionSpace};
pub use config::{DeviceSpec, TrainerConfig};
pub use error::{Error, Result};
pub use pipeline::{Trainer, TrainingSummary};
pub use q_learning::{Checkpoint, QTable};
pub use types::{ActionKey, StageKey, StateKey};
