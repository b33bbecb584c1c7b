//! Legal action sets keyed by stage.
//!
//! The set of actions available from a state depends only on the state's
//! leading coordinate, the structural size `n`, and the `training_stage_last`
//! flag. An [`ActionGenerator`] produces the whole mapping once; the
//! [`ActionSpace`] keeps it read-only for the rest of the run.

use std::collections::BTreeMap;

use rand::{Rng, seq::IndexedRandom};

use crate::{
    Error, Result,
    types::{ActionKey, StageKey, stage_key},
};

/// Mapping from stage key to the ordered legal actions of that stage.
pub type ActionMap = BTreeMap<StageKey, Vec<ActionKey>>;

/// Port for the external action-space generator.
pub trait ActionGenerator {
    /// Enumerate legal actions for every stage reachable under `n`.
    fn generate(&self, n: usize, training_stage_last: bool) -> Result<ActionMap>;
}

impl<F> ActionGenerator for F
where
    F: Fn(usize, bool) -> Result<ActionMap>,
{
    fn generate(&self, n: usize, training_stage_last: bool) -> Result<ActionMap> {
        self(n, training_stage_last)
    }
}

/// Precomputed legal actions per stage.
#[derive(Debug, Clone)]
pub struct ActionSpace {
    n: usize,
    actions: ActionMap,
}

impl ActionSpace {
    /// Run `generator` once and freeze its output.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] when `training_stage_last` is
    /// set: the tabular learner only handles the non-final training stage.
    pub fn new<G>(generator: &G, n: usize, training_stage_last: bool) -> Result<Self>
    where
        G: ActionGenerator + ?Sized,
    {
        if training_stage_last {
            return Err(Error::invalid_config(
                "training_stage_last must be false for the tabular learner",
            ));
        }
        let actions = generator.generate(n, training_stage_last)?;
        Ok(Self { n, actions })
    }

    /// Build a space from an explicit mapping.
    pub fn from_map(n: usize, actions: ActionMap) -> Self {
        Self { n, actions }
    }

    /// Structural size parameter the space was generated for.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Legal actions for `stage`, in generation order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownStage`] if the generator produced no entry for
    /// `stage`.
    pub fn legal_actions(&self, stage: StageKey) -> Result<&[ActionKey]> {
        self.actions
            .get(&stage)
            .map(Vec::as_slice)
            .ok_or(Error::UnknownStage { stage })
    }

    /// Legal actions for the stage of `state`.
    pub fn actions_for(&self, state: impl AsRef<[i64]>) -> Result<&[ActionKey]> {
        self.legal_actions(stage_key(state)?)
    }

    /// Uniformly random legal action for `state`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoLegalActions`] if the stage has an empty action set.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        state: impl AsRef<[i64]>,
        rng: &mut R,
    ) -> Result<&ActionKey> {
        let state = state.as_ref();
        let stage = stage_key(state)?;
        self.legal_actions(stage)?
            .choose(rng)
            .ok_or_else(|| Error::NoLegalActions {
                state: format!("{state:?}"),
                stage,
            })
    }

    /// Stages with generated actions, ascending.
    pub fn stages(&self) -> impl Iterator<Item = StageKey> + '_ {
        self.actions.keys().copied()
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
