//! Observer port - abstraction for training observation and metric emission
//!
//! This port decouples the training loop from wherever its numbers end up
//! (progress bars, JSONL files, logs, in-memory recorders for tests). The
//! trainer owns a list of boxed observers and drives them in a fixed order.

use serde::{Deserialize, Serialize};

use crate::Result;

/// Metric record emitted for each non-exceptional episode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    /// Zero-based episode index
    pub episode: u64,
    /// Reshaped per-step reward of the episode
    pub reward: f64,
    /// Exploration rate the episode was played with
    pub epsilon: f64,
}

/// Full account of a finished episode, exceptional or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeReport {
    /// Zero-based episode index
    pub episode: u64,
    /// Number of transitions in the trajectory
    pub steps: usize,
    /// Raw reward of the terminal step
    pub terminal_reward: f64,
    /// Reshaped per-step reward
    pub reward: f64,
    /// Exploration rate the episode was played with
    pub epsilon: f64,
    /// Whether the terminal step was flagged exceptional
    pub exception_flag: bool,
    /// Steps that took the greedy action
    pub greedy_steps: usize,
}

impl EpisodeReport {
    /// Metric record for this episode, unless it was exceptional.
    pub fn record(&self) -> Option<EpisodeRecord> {
        (!self.exception_flag).then_some(EpisodeRecord {
            episode: self.episode,
            reward: self.reward,
            epsilon: self.epsilon,
        })
    }
}

/// Observer trait for monitoring training
///
/// # Event Sequence
///
/// 1. `on_training_start(total_episodes)` - Once at the beginning
/// 2. For each episode:
///    - `on_metrics(record)` - Only when the episode was not exceptional
///    - `on_episode_end(report)` - Every episode, including exceptional ones,
///      after the backup and any checkpoint
/// 3. `on_training_end()` - Once at the end
///
/// # Examples
///
/// ```no_run
/// use tabular_q::ports::{EpisodeRecord, Observer};
///
/// struct Counter {
///     reported: usize,
/// }
///
/// impl Observer for Counter {
///     fn on_metrics(&mut self, _record: &EpisodeRecord) -> tabular_q::Result<()> {
///         self.reported += 1;
///         Ok(())
///     }
/// }
/// ```
pub trait Observer: Send {
    /// Called when training starts.
    fn on_training_start(&mut self, _total_episodes: u64) -> Result<()> {
        Ok(())
    }

    /// Called after every episode has been learned from.
    fn on_episode_end(&mut self, _report: &EpisodeReport) -> Result<()> {
        Ok(())
    }

    /// Called with the metric record of a non-exceptional episode.
    fn on_metrics(&mut self, _record: &EpisodeRecord) -> Result<()> {
        Ok(())
    }

    /// Called when training completes.
    fn on_training_end(&mut self) -> Result<()> {
        Ok(())
    }
}
