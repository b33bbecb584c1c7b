//! Error types for the tabular Q-learning crate

use thiserror::Error;

use crate::types::StageKey;

/// Main error type for the tabular Q-learning crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("unknown stage {stage}: no actions were generated for it")]
    UnknownStage { stage: StageKey },

    #[error("no legal actions for state {state} (stage {stage})")]
    NoLegalActions { state: String, stage: StageKey },

    #[error("state has no coordinates, cannot derive a stage key")]
    EmptyState,

    #[error("trajectory has no transitions")]
    EmptyTrajectory,

    #[error("environment failure: {message}")]
    Environment { message: String },

    #[error("unsupported checkpoint format version {found} (expected {expected})")]
    UnsupportedCheckpointVersion { found: u32, expected: u32 },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to {operation}: {message}")]
    SerializationContext { operation: String, message: String },

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },
}

impl Error {
    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Error::InvalidConfiguration {
            message: message.into(),
        }
    }
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}
