//! Training loop for the tabular learner
//!
//! Each episode runs `RESET -> STEP* -> EPISODE_END`. At the end of an episode
//! the terminal reward is spread over the trajectory, the episode is reported
//! (unless the environment flagged it exceptional), the Q-learning backup is
//! applied to every non-terminal step, ε decays, and the table is periodically
//! checkpointed.

use std::{
    fmt,
    path::{Path, PathBuf},
    time::Instant,
};

use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    action_space::ActionSpace,
    config::TrainerConfig,
    ports::{CheckpointRepository, Environment, EpisodeReport, Observer},
    q_learning::{Checkpoint, ExplorationSchedule, QTable, Trajectory, Transition},
    types::{ActionKey, StateKey},
};

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// How an action was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionChoice {
    Greedy,
    Random,
}

impl fmt::Display for ActionChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionChoice::Greedy => write!(f, "greedy"),
            ActionChoice::Random => write!(f, "random"),
        }
    }
}

/// Result of a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    /// Episodes played during this run
    pub episodes: u64,

    /// Episodes left out of metric reporting
    pub exceptional_episodes: u64,

    /// Mean reshaped reward over reported episodes
    pub mean_reward: f64,

    /// Reshaped reward of the final episode
    pub last_reward: Option<f64>,

    /// Exploration rate after the final episode
    pub final_exploration_rate: f64,

    /// Global episode counter after the run
    pub total_episodes: u64,

    /// Number of (state, action) pairs in the table
    pub table_size: usize,

    /// Checkpoint saves that failed
    pub checkpoint_failures: usize,
}

impl TrainingSummary {
    /// Save summary to JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load summary from JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let summary = serde_json::from_reader(file)?;
        Ok(summary)
    }
}

struct CheckpointTarget {
    repository: Box<dyn CheckpointRepository>,
    path: PathBuf,
}

/// Exclusive owner of the value table for the duration of a run.
pub struct Trainer {
    config: TrainerConfig,
    space: ActionSpace,
    table: QTable,
    schedule: ExplorationSchedule,
    episode: u64,
    rng: StdRng,
    observers: Vec<Box<dyn Observer>>,
    checkpoints: Option<CheckpointTarget>,
    checkpoint_failures: usize,
}

impl Trainer {
    /// Create a trainer with an empty table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if the configuration is invalid
    /// or `space` was generated for a different `n`.
    pub fn new(config: TrainerConfig, space: ActionSpace) -> Result<Self> {
        config.validate()?;
        if space.n() != config.n {
            return Err(Error::invalid_config(format!(
                "action space was generated for n={}, configuration has n={}",
                space.n(),
                config.n
            )));
        }
        let schedule = ExplorationSchedule::new(
            config.initial_exploration_rate,
            config.exploration_decay_rate,
            config.exploration_decay_step,
        );
        Ok(Self {
            rng: build_rng(config.seed),
            config,
            space,
            table: QTable::new(),
            schedule,
            episode: 0,
            observers: Vec::new(),
            checkpoints: None,
            checkpoint_failures: 0,
        })
    }

    /// Continue a run from a checkpoint: table, episode counter and ε are
    /// restored, hyperparameters come from `config`.
    pub fn resume(config: TrainerConfig, space: ActionSpace, checkpoint: Checkpoint) -> Result<Self> {
        checkpoint.validate_version()?;
        let mut trainer = Self::new(config, space)?;
        trainer.table = checkpoint.table;
        trainer.episode = checkpoint.episode;
        trainer.schedule = trainer.schedule.with_rate(checkpoint.exploration_rate);
        Ok(trainer)
    }

    /// Add an observer
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Snapshot the table into `repository` at `path` every
    /// `checkpoint_interval` episodes.
    pub fn with_checkpoints(
        mut self,
        repository: Box<dyn CheckpointRepository>,
        path: impl Into<PathBuf>,
    ) -> Self {
        self.checkpoints = Some(CheckpointTarget {
            repository,
            path: path.into(),
        });
        self
    }

    /// Reseed the exploration RNG.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    pub fn q_table(&self) -> &QTable {
        &self.table
    }

    pub fn action_space(&self) -> &ActionSpace {
        &self.space
    }

    /// Current exploration rate.
    pub fn exploration_rate(&self) -> f64 {
        self.schedule.rate()
    }

    /// Number of completed episodes.
    pub fn episode(&self) -> u64 {
        self.episode
    }

    /// Snapshot of the current state of the run.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint::new(self.episode, self.schedule.rate(), self.table.clone())
    }

    /// Play episodes until the episode counter reaches `config.episodes`.
    pub fn run(&mut self, env: &mut dyn Environment) -> Result<TrainingSummary> {
        let remaining = self.config.episodes.saturating_sub(self.episode);
        for observer in &mut self.observers {
            observer.on_training_start(remaining)?;
        }
        log::info!(
            "training from episode {} to {} (epsilon {:.4})",
            self.episode,
            self.config.episodes,
            self.schedule.rate()
        );

        let mut exceptional = 0;
        let mut reward_sum = 0.0;
        let mut last_reward = None;
        for _ in 0..remaining {
            let report = self.run_episode(env)?;
            if report.exception_flag {
                exceptional += 1;
            } else {
                reward_sum += report.reward;
            }
            last_reward = Some(report.reward);
        }

        if remaining > 0 && !self.episode.is_multiple_of(self.config.checkpoint_interval) {
            self.save_checkpoint();
        }

        for observer in &mut self.observers {
            observer.on_training_end()?;
        }

        let reported = remaining - exceptional;
        Ok(TrainingSummary {
            episodes: remaining,
            exceptional_episodes: exceptional,
            mean_reward: if reported > 0 {
                reward_sum / reported as f64
            } else {
                0.0
            },
            last_reward,
            final_exploration_rate: self.schedule.rate(),
            total_episodes: self.episode,
            table_size: self.table.len(),
            checkpoint_failures: self.checkpoint_failures,
        })
    }

    /// Play one episode, learn from it, and advance the exploration schedule.
    pub fn run_episode(&mut self, env: &mut dyn Environment) -> Result<EpisodeReport> {
        let started = Instant::now();
        let episode = self.episode;
        let epsilon = self.schedule.rate();

        let mut state = StateKey::from(env.reset()?);
        let mut trajectory = Trajectory::new();
        let mut greedy_steps = 0;
        loop {
            let (action, choice) = self.select_action(&state)?;
            log::debug!("state {state} action {action} ({choice})");
            if choice == ActionChoice::Greedy {
                greedy_steps += 1;
            }

            let outcome = env.step(action.coords())?;
            if !outcome.reward.is_finite() {
                return Err(Error::Environment {
                    message: format!("non-finite reward {} after {state} {action}", outcome.reward),
                });
            }
            let next_state = StateKey::from(outcome.next_state);
            let done = outcome.done;
            trajectory.push(
                Transition::new(state, action, outcome.reward, next_state.clone(), done),
                outcome.info.exception_flag,
            );
            if done {
                break;
            }
            state = next_state;
        }

        let reward = trajectory.reshape()?;
        let report = EpisodeReport {
            episode,
            steps: trajectory.len(),
            terminal_reward: trajectory.terminal_reward().unwrap_or_default(),
            reward,
            epsilon,
            exception_flag: trajectory.exception_flag(),
            greedy_steps,
        };

        match report.record() {
            Some(record) => {
                for observer in &mut self.observers {
                    if let Err(err) = observer.on_metrics(&record) {
                        log::warn!("metrics observer failed for episode {episode}: {err}");
                    }
                }
            }
            None => log::warn!("episode {episode} ended exceptionally; not reported"),
        }

        self.learn(&trajectory)?;
        self.episode += 1;
        self.schedule.decay(self.episode);

        if self.episode.is_multiple_of(self.config.checkpoint_interval) {
            self.save_checkpoint();
        }

        log::debug!(
            "episode {episode}: steps={} reward={reward:.4} epsilon={epsilon:.4} time={:.3}s",
            report.steps,
            started.elapsed().as_secs_f64()
        );

        for observer in &mut self.observers {
            observer.on_episode_end(&report)?;
        }
        Ok(report)
    }

    /// ε-greedy action selection for `state`.
    pub fn select_action(&mut self, state: &StateKey) -> Result<(ActionKey, ActionChoice)> {
        if self.schedule.explores(&mut self.rng) {
            let action = self.space.sample(state, &mut self.rng)?;
            Ok((action.clone(), ActionChoice::Random))
        } else {
            let (action, _) = self.table.greedy(state, &self.space)?;
            Ok((action, ActionChoice::Greedy))
        }
    }

    /// Apply the Q-learning backup to every non-terminal step of a reshaped
    /// trajectory, in order.
    pub fn learn(&mut self, trajectory: &Trajectory) -> Result<()> {
        for transition in trajectory {
            self.table.q_learning_update(
                transition,
                &self.space,
                self.config.learning_rate,
                self.config.discount_factor,
            )?;
        }
        Ok(())
    }

    fn save_checkpoint(&mut self) {
        let Some(target) = &self.checkpoints else {
            return;
        };
        let checkpoint = Checkpoint::new(self.episode, self.schedule.rate(), self.table.clone());
        match target.repository.save(&checkpoint, &target.path) {
            Ok(()) => log::info!(
                "saved checkpoint at episode {} to {}",
                self.episode,
                target.path.display()
            ),
            Err(err) => {
                self.checkpoint_failures += 1;
                log::error!(
                    "failed to save checkpoint at episode {} to {}: {err}",
                    self.episode,
                    target.path.display()
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        action_space::ActionMap,
        ports::{EpisodeRecord, StepOutcome},
    };

    /// Single state, `[0]` loops with reward 0, `[1]` terminates with 10.
    struct TwoAction;

    impl Environment for TwoAction {
        fn reset(&mut self) -> Result<Vec<i64>> {
            Ok(vec![0])
        }

        fn step(&mut self, action: &[i64]) -> Result<StepOutcome> {
            Ok(match action {
                [1] => StepOutcome::new(vec![0], 10.0, true),
                _ => StepOutcome::new(vec![0], 0.0, false),
            })
        }
    }

    fn two_action_space() -> ActionSpace {
        let mut map = ActionMap::new();
        map.insert(0, vec![ActionKey::from([0]), ActionKey::from([1])]);
        ActionSpace::from_map(1, map)
    }

    fn config() -> TrainerConfig {
        TrainerConfig::new(1)
            .with_learning_rate(0.5)
            .with_discount_factor(0.9)
            .with_exploration(1.0, 0.9, 10)
            .with_episodes(5)
            .with_seed(11)
    }

    #[test]
    fn test_rejects_mismatched_space() {
        let result = Trainer::new(TrainerConfig::new(3), two_action_space());
        assert!(matches!(result, Err(Error::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_greedy_selection_when_epsilon_zero() {
        let mut trainer = Trainer::new(
            config().with_exploration(0.0, 1.0, 1),
            two_action_space(),
        )
        .unwrap();
        trainer.table.set([0], [1], 0.5);
        for _ in 0..20 {
            let (action, choice) = trainer.select_action(&StateKey::from([0])).unwrap();
            assert_eq!(action, ActionKey::from([1]));
            assert_eq!(choice, ActionChoice::Greedy);
        }
    }

    #[test]
    fn test_learn_two_step_trajectory() {
        let mut trainer = Trainer::new(config(), two_action_space()).unwrap();
        let mut trajectory = Trajectory::new();
        trajectory.push(
            Transition::new(StateKey::from([0]), ActionKey::from([0]), 0.0, StateKey::from([0]), false),
            false,
        );
        trajectory.push(
            Transition::new(StateKey::from([0]), ActionKey::from([1]), 10.0, StateKey::from([0]), true),
            false,
        );
        assert_eq!(trajectory.reshape().unwrap(), 5.0);

        trainer.learn(&trajectory).unwrap();

        // Q(s,a0) = 0 + 0.5 * (5.0 + 0.9 * 0.0 - 0) = 2.5
        assert!((trainer.q_table().get([0], [0]) - 2.5).abs() < 1e-12);
        assert_eq!(trainer.q_table().get([0], [1]), 0.0);
    }

    #[test]
    fn test_run_episode_counts_and_decays() {
        let mut trainer = Trainer::new(config(), two_action_space()).unwrap();
        let mut env = TwoAction;

        let report = trainer.run_episode(&mut env).unwrap();

        assert_eq!(report.episode, 0);
        assert_eq!(report.terminal_reward, 10.0);
        assert!((report.reward - 10.0 / report.steps as f64).abs() < 1e-12);
        assert_eq!(report.epsilon, 1.0);
        assert_eq!(trainer.episode(), 1);
        assert!((trainer.exploration_rate() - 0.9f64.powf(0.1)).abs() < 1e-12);
        assert_eq!(
            report.record(),
            Some(EpisodeRecord {
                episode: 0,
                reward: report.reward,
                epsilon: 1.0
            })
        );
    }

    #[test]
    fn test_non_finite_reward_is_rejected() {
        struct Infinite;

        impl Environment for Infinite {
            fn reset(&mut self) -> Result<Vec<i64>> {
                Ok(vec![0])
            }

            fn step(&mut self, _action: &[i64]) -> Result<StepOutcome> {
                Ok(StepOutcome::new(vec![0], f64::INFINITY, true))
            }
        }

        let mut trainer = Trainer::new(config(), two_action_space()).unwrap();
        let result = trainer.run_episode(&mut Infinite);
        assert!(matches!(result, Err(Error::Environment { .. })));
        assert!(trainer.q_table().is_empty());
        assert_eq!(trainer.episode(), 0);
    }

    #[test]
    fn test_run_plays_exact_budget() {
        let mut trainer = Trainer::new(config(), two_action_space()).unwrap();
        let summary = trainer.run(&mut TwoAction).unwrap();
        assert_eq!(summary.episodes, 5);
        assert_eq!(summary.total_episodes, 5);
        assert_eq!(summary.exceptional_episodes, 0);
        assert_eq!(trainer.episode(), 5);

        let again = trainer.run(&mut TwoAction).unwrap();
        assert_eq!(again.episodes, 0);
        assert_eq!(trainer.episode(), 5);
    }

    #[test]
    fn test_resume_restores_progress() {
        let mut table = QTable::new();
        table.set([0], [1], 4.0);
        let checkpoint = Checkpoint::new(3, 0.2, table);

        let trainer = Trainer::resume(config(), two_action_space(), checkpoint).unwrap();
        assert_eq!(trainer.episode(), 3);
        assert_eq!(trainer.exploration_rate(), 0.2);
        assert_eq!(trainer.q_table().get([0], [1]), 4.0);
    }
}
