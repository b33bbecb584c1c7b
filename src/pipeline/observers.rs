//! Observer implementations for the training loop
//!
//! Observers allow composable data collection during training without coupling
//! the loop to specific output formats.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    ports::{EpisodeRecord, EpisodeReport, Observer},
};

/// Progress bar observer - Shows training progress
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    exceptional: u64,
}

impl ProgressObserver {
    /// Create a new progress observer
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            exceptional: 0,
        }
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_training_start(&mut self, total_episodes: u64) -> Result<()> {
        let pb = ProgressBar::new(total_episodes);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes ({msg})")
                .map_err(|e| Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_episode_end(&mut self, report: &EpisodeReport) -> Result<()> {
        if report.exception_flag {
            self.exceptional += 1;
        }
        if let Some(pb) = &self.progress_bar {
            pb.inc(1);
            pb.set_message(format!(
                "r:{:.3} eps:{:.3} exc:{}",
                report.reward, report.epsilon, self.exceptional
            ));
        }
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(format!("done, exc:{}", self.exceptional));
        }
        Ok(())
    }
}

/// Summary of reported metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub episodes: u64,
    pub reported: u64,
    pub exceptional: u64,
    pub mean_reward: f64,
    pub mean_steps: f64,
}

#[derive(Debug, Default)]
struct MetricsLog {
    records: Vec<EpisodeRecord>,
    episodes: u64,
    exceptional: u64,
    total_steps: u64,
}

/// Metrics observer - Records every reported episode in memory
///
/// Clones share the same log, so a handle kept by the caller sees what the
/// boxed copy inside the trainer recorded.
#[derive(Debug, Clone, Default)]
pub struct MetricsObserver {
    log: Arc<Mutex<MetricsLog>>,
}

impl MetricsObserver {
    /// Create a new metrics observer
    pub fn new() -> Self {
        Self::default()
    }

    fn log(&self) -> MutexGuard<'_, MetricsLog> {
        self.log
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Records passed to the metrics sink, in episode order
    pub fn records(&self) -> Vec<EpisodeRecord> {
        self.log().records.clone()
    }

    /// Get metrics summary
    pub fn summary(&self) -> MetricsSummary {
        let log = self.log();
        let reported = log.records.len() as u64;
        MetricsSummary {
            episodes: log.episodes,
            reported,
            exceptional: log.exceptional,
            mean_reward: if reported == 0 {
                0.0
            } else {
                log.records.iter().map(|r| r.reward).sum::<f64>() / reported as f64
            },
            mean_steps: if log.episodes == 0 {
                0.0
            } else {
                log.total_steps as f64 / log.episodes as f64
            },
        }
    }
}

impl Observer for MetricsObserver {
    fn on_episode_end(&mut self, report: &EpisodeReport) -> Result<()> {
        let mut log = self.log();
        log.episodes += 1;
        log.total_steps += report.steps as u64;
        if report.exception_flag {
            log.exceptional += 1;
        }
        Ok(())
    }

    fn on_metrics(&mut self, record: &EpisodeRecord) -> Result<()> {
        self.log().records.push(*record);
        Ok(())
    }
}

/// JSONL observer - Exports metric records to JSON Lines format
pub struct JsonlObserver {
    writer: BufWriter<File>,
}

impl JsonlObserver {
    /// Create a new JSONL observer
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create metrics file {path:?}"),
            source,
        })?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl Observer for JsonlObserver {
    fn on_metrics(&mut self, record: &EpisodeRecord) -> Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        writeln!(&mut self.writer)?;
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
