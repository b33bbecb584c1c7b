//! Serializable snapshot of a training run.

use serde::{Deserialize, Serialize};

use crate::{Error, Result, q_learning::q_table::QTable};

/// Durable snapshot of the value table and the exploration bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub version: u32,
    /// Episodes completed when the snapshot was taken
    pub episode: u64,
    /// Exploration rate after the last completed episode
    pub exploration_rate: f64,
    pub table: QTable,
}

impl Checkpoint {
    pub const VERSION: u32 = 1;

    pub fn new(episode: u64, exploration_rate: f64, table: QTable) -> Self {
        Self {
            version: Self::VERSION,
            episode,
            exploration_rate,
            table,
        }
    }

    /// Reject snapshots written by another format version.
    pub fn validate_version(&self) -> Result<()> {
        if self.version != Self::VERSION {
            return Err(Error::UnsupportedCheckpointVersion {
                found: self.version,
                expected: Self::VERSION,
            });
        }
        Ok(())
    }
}
