//! Tabular Q-learning with trajectory-level reward reshaping
//!
//! This module holds the algorithmic core: the value table, the per-episode
//! trajectory buffer, and the exploration schedule. The episode loop that
//! ties them to an environment lives in [`crate::pipeline`].
//!
//! ## Update rule
//!
//! After an episode ends, every step's reward is replaced by the terminal
//! reward divided by the trajectory length. Each non-terminal step is then
//! backed up in order:
//!
//! ```text
//! Q(s,a) ← Q(s,a) + α[r + γ max_a' Q(s',a') - Q(s,a)]
//! ```
//!
//! ## Usage Example
//!
//! ```
//! use tabular_q::{
//!     action_space::{ActionMap, ActionSpace},
//!     q_learning::{QTable, Trajectory, Transition},
//!     types::{ActionKey, StateKey},
//! };
//!
//! let mut map = ActionMap::new();
//! map.insert(0, vec![ActionKey::from([0]), ActionKey::from([1])]);
//! let space = ActionSpace::from_map(1, map);
//!
//! let mut trajectory = Trajectory::new();
//! trajectory.push(
//!     Transition::new(StateKey::from([0]), ActionKey::from([0]), 0.0, StateKey::from([0]), false),
//!     false,
//! );
//! trajectory.push(
//!     Transition::new(StateKey::from([0]), ActionKey::from([1]), 10.0, StateKey::from([0]), true),
//!     false,
//! );
//! assert_eq!(trajectory.reshape()?, 5.0);
//!
//! let mut table = QTable::new();
//! for transition in &trajectory {
//!     table.q_learning_update(transition, &space, 0.5, 0.9)?;
//! }
//! assert_eq!(table.get([0], [0]), 2.5);
//! # Ok::<(), tabular_q::Error>(())
//! ```

pub mod checkpoint;
pub mod q_table;
pub mod schedule;
pub mod trajectory;

pub use checkpoint::Checkpoint;
pub use q_table::QTable;
pub use schedule::ExplorationSchedule;
pub use trajectory::{Trajectory, Transition};
