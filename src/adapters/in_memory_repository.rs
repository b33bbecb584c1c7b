//! In-memory checkpoint repository for testing.
//!
//! This adapter provides a pure in-memory implementation of
//! CheckpointRepository, enabling fast tests without any file system I/O.

use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};

use crate::{Result, error::Error, ports::CheckpointRepository, q_learning::Checkpoint};

#[derive(Debug, Default)]
struct Storage {
    snapshots: HashMap<String, Vec<u8>>,
    saved_episodes: Vec<u64>,
}

/// In-memory repository for testing.
///
/// Checkpoints are encoded with rmp_serde exactly as on disk, so round-trip
/// behaviour matches the file-backed repository. All clones share the same
/// storage, which lets a test keep a handle after boxing one into a trainer.
///
/// # Examples
///
/// ```
/// use std::path::Path;
///
/// use tabular_q::{
///     adapters::InMemoryRepository,
///     ports::CheckpointRepository,
///     q_learning::{Checkpoint, QTable},
/// };
///
/// let repo = InMemoryRepository::new();
/// repo.save(&Checkpoint::new(100, 0.5, QTable::new()), Path::new("run"))?;
/// assert_eq!(repo.saved_episodes(), vec![100]);
/// # Ok::<(), tabular_q::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    storage: Arc<Mutex<Storage>>,
}

impl InMemoryRepository {
    /// Create a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn storage(&self) -> MutexGuard<'_, Storage> {
        self.storage
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Number of distinct paths holding a checkpoint.
    pub fn count(&self) -> usize {
        self.storage().snapshots.len()
    }

    /// Episode counters of every save, in call order.
    pub fn saved_episodes(&self) -> Vec<u64> {
        self.storage().saved_episodes.clone()
    }

    /// Check if a checkpoint exists at the given path.
    pub fn contains(&self, path: &Path) -> bool {
        let key = path.to_string_lossy().to_string();
        self.storage().snapshots.contains_key(&key)
    }

    /// Clear all stored checkpoints.
    pub fn clear(&self) {
        let mut storage = self.storage();
        storage.snapshots.clear();
        storage.saved_episodes.clear();
    }
}

impl CheckpointRepository for InMemoryRepository {
    fn save(&self, checkpoint: &Checkpoint, path: &Path) -> Result<()> {
        let key = path.to_string_lossy().to_string();

        let bytes = rmp_serde::to_vec(checkpoint).map_err(|e| Error::SerializationContext {
            operation: "serialize checkpoint for in-memory storage".to_string(),
            message: e.to_string(),
        })?;

        let mut storage = self.storage();
        storage.snapshots.insert(key, bytes);
        storage.saved_episodes.push(checkpoint.episode);
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<Checkpoint> {
        let key = path.to_string_lossy().to_string();
        let storage = self.storage();

        let bytes = storage.snapshots.get(&key).ok_or_else(|| Error::Io {
            operation: format!("load checkpoint from in-memory storage at {path:?}"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "key not found in memory"),
        })?;

        let checkpoint: Checkpoint =
            rmp_serde::from_slice(bytes).map_err(|e| Error::SerializationContext {
                operation: "deserialize checkpoint from in-memory storage".to_string(),
                message: e.to_string(),
            })?;
        checkpoint.validate_version()?;
        Ok(checkpoint)
    }
}
