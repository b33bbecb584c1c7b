//! Staged walk along a corridor of `n` stages.
//!
//! The state is `[stage]`. From stage `s < n` the agent either advances
//! (`[1]`) or stops (`[0]`). Stopping ends the episode with raw reward `s`;
//! advancing into stage `n` ends it with raw reward `n`. Intermediate steps
//! pay nothing, so the whole signal arrives at the terminal step.

use crate::{
    Error, Result,
    action_space::ActionMap,
    ports::{Environment, StepOutcome},
    types::{ActionKey, StageKey},
};

pub const ADVANCE: [i64; 1] = [1];
pub const STOP: [i64; 1] = [0];

/// Action generator matching [`Corridor`]: every non-terminal stage offers
/// advance then stop.
pub fn corridor_actions(n: usize, _training_stage_last: bool) -> Result<ActionMap> {
    if n == 0 {
        return Err(Error::invalid_config("corridor needs at least one stage"));
    }
    Ok((0..n as StageKey)
        .map(|stage| (stage, vec![ActionKey::from(ADVANCE), ActionKey::from(STOP)]))
        .collect())
}

/// Deterministic staged walk.
#[derive(Debug, Clone)]
pub struct Corridor {
    n: i64,
    stage: i64,
    fault_stage: Option<i64>,
}

impl Corridor {
    pub fn new(n: usize) -> Self {
        Self {
            n: n as i64,
            stage: 0,
            fault_stage: None,
        }
    }

    /// Flag episodes that end at `stage` as exceptional.
    pub fn with_fault_stage(mut self, stage: i64) -> Self {
        self.fault_stage = Some(stage);
        self
    }

    fn outcome(&self, reward: f64, done: bool) -> StepOutcome {
        let outcome = StepOutcome::new(vec![self.stage], reward, done);
        if done && self.fault_stage == Some(self.stage) {
            outcome.exceptional()
        } else {
            outcome
        }
    }
}

impl Environment for Corridor {
    fn reset(&mut self) -> Result<Vec<i64>> {
        self.stage = 0;
        Ok(vec![self.stage])
    }

    fn step(&mut self, action: &[i64]) -> Result<StepOutcome> {
        if self.stage >= self.n {
            return Err(Error::Environment {
                message: format!("step after episode end at stage {}", self.stage),
            });
        }
        match action {
            [1] => {
                self.stage += 1;
                let done = self.stage == self.n;
                let reward = if done { self.n as f64 } else { 0.0 };
                Ok(self.outcome(reward, done))
            }
            [0] => {
                // Park past the end so further steps are rejected.
                let stage = self.stage;
                let outcome = self.outcome(stage as f64, true);
                self.stage = self.n;
                Ok(outcome)
            }
            other => Err(Error::Environment {
                message: format!("illegal corridor action {other:?}"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action_space::ActionSpace;

    #[test]
    fn test_actions_cover_non_terminal_stages() {
        let space = ActionSpace::new(&corridor_actions, 3, false).unwrap();
        assert_eq!(space.stages().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(
            space.legal_actions(1).unwrap(),
            &[ActionKey::from(ADVANCE), ActionKey::from(STOP)]
        );
        assert!(corridor_actions(0, false).is_err());
    }

    #[test]
    fn test_advance_to_end() {
        let mut env = Corridor::new(2);
        assert_eq!(env.reset().unwrap(), vec![0]);
        let first = env.step(&ADVANCE).unwrap();
        assert_eq!(first, StepOutcome::new(vec![1], 0.0, false));
        let second = env.step(&ADVANCE).unwrap();
        assert_eq!(second, StepOutcome::new(vec![2], 2.0, true));
        assert!(env.step(&ADVANCE).is_err());
    }

    #[test]
    fn test_stop_pays_current_stage() {
        let mut env = Corridor::new(4);
        env.reset().unwrap();
        env.step(&ADVANCE).unwrap();
        let outcome = env.step(&STOP).unwrap();
        assert_eq!(outcome, StepOutcome::new(vec![1], 1.0, true));
    }

    #[test]
    fn test_fault_stage_flags_terminal_step() {
        let mut env = Corridor::new(3).with_fault_stage(0);
        env.reset().unwrap();
        assert!(env.step(&STOP).unwrap().info.exception_flag);

        env.reset().unwrap();
        assert!(!env.step(&ADVANCE).unwrap().info.exception_flag);
    }

    #[test]
    fn test_rejects_unknown_action() {
        let mut env = Corridor::new(3);
        env.reset().unwrap();
        assert!(matches!(env.step(&[5]), Err(Error::Environment { .. })));
    }
}
