//! Environment port - the simulation the trainer interacts with
//!
//! The trainer only ever calls [`Environment::reset`] and
//! [`Environment::step`]. Action legality is the caller's responsibility; the
//! trainer only submits actions taken from its action space.

use crate::Result;

/// Extra per-step information reported by the environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepInfo {
    /// The transition was abnormal. The episode is still learned from but is
    /// left out of metric reporting.
    pub exception_flag: bool,
}

/// Result of a single environment transition.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub next_state: Vec<i64>,
    pub reward: f64,
    pub done: bool,
    pub info: StepInfo,
}

impl StepOutcome {
    pub fn new(next_state: Vec<i64>, reward: f64, done: bool) -> Self {
        Self {
            next_state,
            reward,
            done,
            info: StepInfo::default(),
        }
    }

    /// Mark the transition as exceptional.
    pub fn exceptional(mut self) -> Self {
        self.info.exception_flag = true;
        self
    }
}

/// Environment trait - episodic simulation with discrete states and actions
///
/// # Examples
///
/// ```
/// use tabular_q::ports::{Environment, StepOutcome};
///
/// /// Ends the episode on the first step with reward 1.
/// struct OneShot;
///
/// impl Environment for OneShot {
///     fn reset(&mut self) -> tabular_q::Result<Vec<i64>> {
///         Ok(vec![0])
///     }
///
///     fn step(&mut self, _action: &[i64]) -> tabular_q::Result<StepOutcome> {
///         Ok(StepOutcome::new(vec![0], 1.0, true))
///     }
/// }
/// ```
pub trait Environment {
    /// Begin a new episode and return the initial observation.
    fn reset(&mut self) -> Result<Vec<i64>>;

    /// Advance one transition with `action`.
    fn step(&mut self, action: &[i64]) -> Result<StepOutcome>;
}
