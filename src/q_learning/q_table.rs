//! Q-table implementation for tabular Q-learning

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    action_space::ActionSpace,
    q_learning::trajectory::Transition,
    types::{ActionKey, StateKey, stage_key},
};

/// Q-table mapping (state, action) pairs to Q-values
///
/// Entries are grouped by state so that raw coordinate slices can be used for
/// lookups without building a key. Pairs that were never written read as 0.0
/// and reading never inserts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QTable {
    q_values: HashMap<StateKey, HashMap<ActionKey, f64>>,
}

impl QTable {
    /// Create an empty Q-table
    pub fn new() -> Self {
        Self::default()
    }

    /// Get Q-value for a state-action pair
    pub fn get(&self, state: impl AsRef<[i64]>, action: impl AsRef<[i64]>) -> f64 {
        self.q_values
            .get(state.as_ref())
            .and_then(|actions| actions.get(action.as_ref()))
            .copied()
            .unwrap_or(0.0)
    }

    /// Set Q-value for a state-action pair
    pub fn set(&mut self, state: impl AsRef<[i64]>, action: impl AsRef<[i64]>, value: f64) {
        let state = state.as_ref();
        let action = ActionKey::new(action);
        match self.q_values.get_mut(state) {
            Some(actions) => {
                actions.insert(action, value);
            }
            None => {
                self.q_values
                    .insert(StateKey::new(state), HashMap::from([(action, value)]));
            }
        }
    }

    /// Select greedy action (highest Q-value) among the legal actions of `state`
    ///
    /// Ties resolve to the first maximal action in the space's order. NaN
    /// entries lose to every comparable value; only when all legal values are
    /// NaN is the first action returned. Returns the action together with its
    /// value.
    ///
    /// # Errors
    ///
    /// Fails when the state's stage is unknown to `space` or has no actions.
    pub fn greedy(
        &self,
        state: impl AsRef<[i64]>,
        space: &ActionSpace,
    ) -> Result<(ActionKey, f64)> {
        let state = state.as_ref();
        let stage = stage_key(state)?;
        let mut best: Option<(&ActionKey, f64)> = None;
        for action in space.legal_actions(stage)? {
            let value = self.get(state, action);
            let better = match best {
                None => true,
                Some((_, best_value)) => {
                    value > best_value || (best_value.is_nan() && !value.is_nan())
                }
            };
            if better {
                best = Some((action, value));
            }
        }
        best.map(|(action, value)| (action.clone(), value))
            .ok_or_else(|| Error::NoLegalActions {
                state: StateKey::new(state).to_string(),
                stage,
            })
    }

    /// Get maximum Q-value over the legal actions of `state`
    pub fn max_q(&self, state: impl AsRef<[i64]>, space: &ActionSpace) -> Result<f64> {
        self.greedy(state, space).map(|(_, value)| value)
    }

    /// Q-learning update: off-policy TD control
    ///
    /// Q(s,a) ← Q(s,a) + α[r + γ max_a' Q(s',a') - Q(s,a)]
    ///
    /// Terminal transitions have no bootstrap target and are skipped; the
    /// return value is the new estimate, or `None` for a skipped transition.
    pub fn q_learning_update(
        &mut self,
        transition: &Transition,
        space: &ActionSpace,
        learning_rate: f64,
        discount_factor: f64,
    ) -> Result<Option<f64>> {
        if transition.done {
            return Ok(None);
        }
        let current_q = self.get(&transition.state, &transition.action);
        let max_next_q = self.max_q(&transition.next_state, space)?;
        let td_target = transition.reward + discount_factor * max_next_q;
        let td_error = td_target - current_q;
        let new_q = current_q + learning_rate * td_error;
        self.set(&transition.state, &transition.action, new_q);
        Ok(Some(new_q))
    }

    /// Iterate over all stored (state, action, value) entries
    pub fn iter(&self) -> impl Iterator<Item = (&StateKey, &ActionKey, f64)> {
        self.q_values.iter().flat_map(|(state, actions)| {
            actions
                .iter()
                .map(move |(action, &value)| (state, action, value))
        })
    }

    /// States with at least one stored entry
    pub fn states(&self) -> impl Iterator<Item = &StateKey> {
        self.q_values.keys()
    }

    /// Reset all Q-values
    pub fn clear(&mut self) {
        self.q_values.clear();
    }

    /// Get total number of Q-values stored
    pub fn len(&self) -> usize {
        self.q_values.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of distinct states stored
    pub fn state_count(&self) -> usize {
        self.q_values.len()
    }
}
