//! Repository port for checkpoint persistence.
//!
//! This module defines the trait boundary between the trainer and the
//! storage used for periodic value-table snapshots.

use std::path::Path;

use crate::{Result, q_learning::Checkpoint};

/// Port for persisting and loading training checkpoints.
///
/// This trait abstracts the storage mechanism, allowing different
/// implementations (MessagePack files, in-memory maps for tests) without
/// coupling the training loop to a serialization format.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
///
/// use tabular_q::{ports::CheckpointRepository, q_learning::Checkpoint};
///
/// fn snapshot<R: CheckpointRepository>(
///     repo: &R,
///     checkpoint: &Checkpoint,
///     path: &Path,
/// ) -> tabular_q::Result<()> {
///     repo.save(checkpoint, path)
/// }
/// ```
pub trait CheckpointRepository: Send {
    /// Save a checkpoint to persistent storage, replacing any previous one at
    /// `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the location cannot be written or serialization
    /// fails.
    fn save(&self, checkpoint: &Checkpoint, path: &Path) -> Result<()>;

    /// Load a checkpoint from persistent storage.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Nothing is stored at `path`
    /// - The stored data cannot be decoded
    /// - The checkpoint was written by an unsupported format version
    fn load(&self, path: &Path) -> Result<Checkpoint>;
}
