//! Training pipeline
//!
//! [`Trainer`] drives episodes against an [`crate::ports::Environment`] and
//! reports to composable observers:
//! - [`ProgressObserver`] for interactive runs
//! - [`MetricsObserver`] to collect records in memory
//! - [`JsonlObserver`] to export records for later analysis

pub mod observers;
pub mod training;

pub use observers::{JsonlObserver, MetricsObserver, MetricsSummary, ProgressObserver};
pub use training::{ActionChoice, Trainer, TrainingSummary};
