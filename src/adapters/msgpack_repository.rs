//! MessagePack implementation of checkpoint repository.
//!
//! This adapter implements the CheckpointRepository port using rmp_serde for
//! compact binary serialization.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use crate::{Result, error::Error, ports::CheckpointRepository, q_learning::Checkpoint};

/// MessagePack-based checkpoint repository.
///
/// Each save overwrites the file at the given path, so a run keeps exactly
/// one current snapshot per path.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
///
/// use tabular_q::{
///     adapters::MsgPackRepository,
///     ports::CheckpointRepository,
///     q_learning::{Checkpoint, QTable},
/// };
///
/// let repo = MsgPackRepository;
/// let checkpoint = Checkpoint::new(100, 0.5, QTable::new());
///
/// repo.save(&checkpoint, Path::new("qtable.msgpack"))?;
/// let loaded = repo.load(Path::new("qtable.msgpack"))?;
/// # Ok::<(), tabular_q::Error>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackRepository;

impl MsgPackRepository {
    /// Create a new MessagePack repository.
    pub fn new() -> Self {
        Self
    }
}

impl CheckpointRepository for MsgPackRepository {
    fn save(&self, checkpoint: &Checkpoint, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create file {path:?}"),
            source,
        })?;
        let mut writer = BufWriter::new(file);

        rmp_serde::encode::write(&mut writer, checkpoint).map_err(|e| {
            Error::SerializationContext {
                operation: "serialize checkpoint to MessagePack".to_string(),
                message: e.to_string(),
            }
        })?;

        writer.flush().map_err(|source| Error::Io {
            operation: format!("flush file {path:?}"),
            source,
        })?;

        Ok(())
    }

    fn load(&self, path: &Path) -> Result<Checkpoint> {
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open file {path:?}"),
            source,
        })?;

        let checkpoint: Checkpoint = rmp_serde::decode::from_read(BufReader::new(file))
            .map_err(|e| Error::SerializationContext {
                operation: "deserialize checkpoint from MessagePack".to_string(),
                message: e.to_string(),
            })?;

        checkpoint.validate_version()?;
        Ok(checkpoint)
    }
}
