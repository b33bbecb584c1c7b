//! Ports (trait boundaries) for external collaborators.
//!
//! This module defines the interfaces between the learning core and the
//! outside world. Following hexagonal architecture, these traits are owned by
//! the core and implemented by adapters or by the caller.

pub mod environment;
pub mod observer;
pub mod repository;

pub use environment::{Environment, StepInfo, StepOutcome};
pub use observer::{EpisodeRecord, EpisodeReport, Observer};
pub use repository::CheckpointRepository;
