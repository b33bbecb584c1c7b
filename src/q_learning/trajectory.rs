//! Per-episode trajectory buffer and terminal reward reshaping

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    types::{ActionKey, StateKey},
};

/// One recorded environment transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub state: StateKey,
    pub action: ActionKey,
    /// Reward as reported by the environment
    pub raw_reward: f64,
    /// Reward used by the backup; equals `raw_reward` until reshaped
    pub reward: f64,
    pub next_state: StateKey,
    pub done: bool,
}

impl Transition {
    pub fn new(
        state: StateKey,
        action: ActionKey,
        raw_reward: f64,
        next_state: StateKey,
        done: bool,
    ) -> Self {
        Self {
            state,
            action,
            raw_reward,
            reward: raw_reward,
            next_state,
            done,
        }
    }
}

/// Ordered transitions of a single episode, reset to terminal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Trajectory {
    transitions: Vec<Transition>,
    exception_flag: bool,
}

impl Trajectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transition, remembering the step's exception flag.
    ///
    /// Only the flag of the latest step is kept.
    pub fn push(&mut self, transition: Transition, exception_flag: bool) {
        self.transitions.push(transition);
        self.exception_flag = exception_flag;
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.transitions.iter()
    }

    /// Whether the latest step was flagged exceptional by the environment.
    pub fn exception_flag(&self) -> bool {
        self.exception_flag
    }

    /// Raw reward of the last step.
    pub fn terminal_reward(&self) -> Option<f64> {
        self.transitions.last().map(|t| t.raw_reward)
    }

    /// Spread the terminal reward uniformly over the trajectory.
    ///
    /// Every step's reward becomes `R / L`, where `R` is the raw reward of the
    /// last step and `L` the number of steps. Earlier raw rewards are ignored.
    /// Returns the reshaped reward.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyTrajectory`] if no transition was recorded.
    pub fn reshape(&mut self) -> Result<f64> {
        let terminal = self.terminal_reward().ok_or(Error::EmptyTrajectory)?;
        let reward = terminal / self.transitions.len() as f64;
        for transition in &mut self.transitions {
            transition.reward = reward;
        }
        Ok(reward)
    }

    /// Drain the buffer for the next episode.
    pub fn clear(&mut self) {
        self.transitions.clear();
        self.exception_flag = false;
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a Transition;
    type IntoIter = std::slice::Iter<'a, Transition>;

    fn into_iter(self) -> Self::IntoIter {
        self.transitions.iter()
    }
}
