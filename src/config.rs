//! Trainer configuration.
//!
//! Configurations are plain JSON objects. The legacy key names `DQN_lr`,
//! `exploration` and `gamma` are accepted as aliases. The optimizer name
//! (`opt`) is carried but unused, the device selection (`ctx`, alias `device`)
//! is checked at startup, and any other key is rejected.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

fn default_checkpoint_interval() -> u64 {
    100
}

/// Device selection of a legacy configuration.
///
/// Accelerator indices (single or list) and `"cpu"` are recognized; the
/// table always lives in host memory, so the choice has no effect beyond
/// validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeviceSpec {
    Index(u32),
    Indices(Vec<u32>),
    Named(String),
}

impl DeviceSpec {
    fn validate(&self) -> Result<()> {
        match self {
            DeviceSpec::Named(name) if !name.eq_ignore_ascii_case("cpu") => Err(
                Error::invalid_config(format!("unrecognized device specification {name:?}")),
            ),
            DeviceSpec::Indices(indices) if indices.is_empty() => Err(Error::invalid_config(
                "device specification lists no devices",
            )),
            _ => Ok(()),
        }
    }
}

/// Hyperparameters and run settings for [`crate::pipeline::Trainer`].
///
/// # Examples
///
/// ```
/// use tabular_q::config::TrainerConfig;
///
/// let config = TrainerConfig::new(4)
///     .with_episodes(500)
///     .with_learning_rate(0.1)
///     .with_seed(42);
/// config.validate()?;
/// # Ok::<(), tabular_q::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrainerConfig {
    /// Learning rate α of the backup
    #[serde(alias = "DQN_lr")]
    pub learning_rate: f64,

    /// Number of episodes to train for
    pub episodes: u64,

    /// Exploration rate ε at the first episode
    #[serde(alias = "exploration")]
    pub initial_exploration_rate: f64,

    /// Discount factor γ
    #[serde(alias = "gamma")]
    pub discount_factor: f64,

    /// Structural size parameter passed to the action generator
    pub n: usize,

    /// Must be false; the tabular learner only handles the non-final stage
    #[serde(default)]
    pub training_stage_last: bool,

    /// Episode scale of the decay exponent
    pub exploration_decay_step: u64,

    /// Base of the geometric ε decay
    pub exploration_decay_rate: f64,

    /// Episodes between checkpoints
    #[serde(default = "default_checkpoint_interval")]
    pub checkpoint_interval: u64,

    /// Random seed for reproducibility
    #[serde(default)]
    pub seed: Option<u64>,

    /// Optimizer name of legacy configurations; not used by the tabular learner
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opt: Option<String>,

    /// Device selection of legacy configurations
    #[serde(default, alias = "device", skip_serializing_if = "Option::is_none")]
    pub ctx: Option<DeviceSpec>,
}

impl TrainerConfig {
    /// Create a configuration for size `n` with default hyperparameters.
    pub fn new(n: usize) -> Self {
        Self {
            learning_rate: 0.1,
            episodes: 1000,
            initial_exploration_rate: 1.0,
            discount_factor: 0.99,
            n,
            training_stage_last: false,
            exploration_decay_step: 1000,
            exploration_decay_rate: 0.99,
            checkpoint_interval: default_checkpoint_interval(),
            seed: None,
            opt: None,
            ctx: None,
        }
    }

    /// Load and validate a JSON configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| Error::Io {
            operation: format!("read config {path:?}"),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration before any training starts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] describing the first bad field.
    pub fn validate(&self) -> Result<()> {
        if self.training_stage_last {
            return Err(Error::invalid_config(
                "training_stage_last must be false for the tabular learner",
            ));
        }
        for (name, value) in [
            ("learning_rate", self.learning_rate),
            ("initial_exploration_rate", self.initial_exploration_rate),
            ("discount_factor", self.discount_factor),
            ("exploration_decay_rate", self.exploration_decay_rate),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(Error::invalid_config(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        if self.exploration_decay_step == 0 {
            return Err(Error::invalid_config(
                "exploration_decay_step must be positive",
            ));
        }
        if self.checkpoint_interval == 0 {
            return Err(Error::invalid_config("checkpoint_interval must be positive"));
        }
        if let Some(ctx) = &self.ctx {
            ctx.validate()?;
        }
        Ok(())
    }

    pub fn with_episodes(mut self, episodes: u64) -> Self {
        self.episodes = episodes;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_discount_factor(mut self, discount_factor: f64) -> Self {
        self.discount_factor = discount_factor;
        self
    }

    pub fn with_exploration(mut self, initial_rate: f64, decay_rate: f64, decay_step: u64) -> Self {
        self.initial_exploration_rate = initial_rate;
        self.exploration_decay_rate = decay_rate;
        self.exploration_decay_step = decay_step;
        self
    }

    pub fn with_checkpoint_interval(mut self, interval: u64) -> Self {
        self.checkpoint_interval = interval;
        self
    }

    /// Set the random seed for deterministic behavior.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_legacy_keys() {
        let config = TrainerConfig::from_json(
            r#"{
                "opt": "adam",
                "ctx": 0,
                "DQN_lr": 0.05,
                "episodes": 3000,
                "exploration": 1.0,
                "gamma": 0.9,
                "n": 6,
                "training_stage_last": false,
                "exploration_decay_step": 500,
                "exploration_decay_rate": 0.95
            }"#,
        )
        .unwrap();

        assert_eq!(config.learning_rate, 0.05);
        assert_eq!(config.initial_exploration_rate, 1.0);
        assert_eq!(config.discount_factor, 0.9);
        assert_eq!(config.n, 6);
        assert_eq!(config.checkpoint_interval, 100);
        assert_eq!(config.seed, None);
        assert_eq!(config.opt.as_deref(), Some("adam"));
        assert_eq!(config.ctx, Some(DeviceSpec::Index(0)));
    }

    fn legacy_with(extra: &str) -> String {
        format!(
            r#"{{
                "DQN_lr": 0.05,
                "episodes": 10,
                "exploration": 1.0,
                "gamma": 0.9,
                "n": 2,
                "exploration_decay_step": 5,
                "exploration_decay_rate": 0.95,
                {extra}
            }}"#
        )
    }

    #[test]
    fn test_accepts_known_devices() {
        for ctx in [r#""ctx": 1"#, r#""ctx": [0, 2]"#, r#""ctx": "cpu""#, r#""device": "CPU""#] {
            let config = TrainerConfig::from_json(&legacy_with(ctx)).unwrap();
            assert!(config.ctx.is_some(), "{ctx}");
        }
    }

    #[test]
    fn test_rejects_unrecognized_device() {
        let result = TrainerConfig::from_json(&legacy_with(r#""ctx": "not-a-device""#));
        assert!(matches!(result, Err(Error::InvalidConfiguration { .. })));

        let result = TrainerConfig::from_json(&legacy_with(r#""ctx": []"#));
        assert!(matches!(result, Err(Error::InvalidConfiguration { .. })));

        let result = TrainerConfig::from_json(&legacy_with(r#""ctx": {"gpu": 0}"#));
        assert!(matches!(result, Err(Error::Serialization(_))));
    }

    #[test]
    fn test_rejects_unknown_keys() {
        let result = TrainerConfig::from_json(&legacy_with(r#""checkpoint_intervall": 7"#));
        assert!(matches!(result, Err(Error::Serialization(_))));

        let config = TrainerConfig::from_json(&legacy_with(r#""checkpoint_interval": 7"#)).unwrap();
        assert_eq!(config.checkpoint_interval, 7);
    }

    #[test]
    fn test_rejects_training_stage_last() {
        let config = TrainerConfig {
            training_stage_last: true,
            ..TrainerConfig::new(3)
        };
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_rejects_out_of_range_rates() {
        assert!(TrainerConfig::new(3).with_learning_rate(1.5).validate().is_err());
        assert!(TrainerConfig::new(3).with_discount_factor(f64::NAN).validate().is_err());
        assert!(
            TrainerConfig::new(3)
                .with_exploration(1.0, 0.9, 0)
                .validate()
                .is_err()
        );
        assert!(TrainerConfig::new(3).with_checkpoint_interval(0).validate().is_err());
        assert!(TrainerConfig::new(3).validate().is_ok());
    }

    #[test]
    fn test_missing_field_is_error() {
        let result = TrainerConfig::from_json(r#"{"episodes": 10}"#);
        assert!(matches!(result, Err(Error::Serialization(_))));
    }
}
