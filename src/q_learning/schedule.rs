//! Exploration rate bookkeeping

use rand::Rng;
use serde::{Deserialize, Serialize};

/// ε schedule with geometric decay keyed to the episode counter.
///
/// After episode `k` completes, `ε ← ε · decay_rate^(k / decay_step)`. The
/// exponent grows with `k`, so decay accelerates as training proceeds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExplorationSchedule {
    rate: f64,
    decay_rate: f64,
    decay_step: f64,
}

impl ExplorationSchedule {
    pub fn new(rate: f64, decay_rate: f64, decay_step: u64) -> Self {
        Self {
            rate,
            decay_rate,
            decay_step: decay_step as f64,
        }
    }

    /// Current exploration rate.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Replace the current rate, e.g. when resuming from a checkpoint.
    pub fn with_rate(mut self, rate: f64) -> Self {
        self.rate = rate;
        self
    }

    /// Apply the decay for the episode that just brought the counter to
    /// `completed_episodes`.
    pub fn decay(&mut self, completed_episodes: u64) -> f64 {
        self.rate *= self
            .decay_rate
            .powf(completed_episodes as f64 / self.decay_step);
        self.rate
    }

    /// Draw whether this step explores. Greedy when a uniform draw in `[0, 1)`
    /// is at least the current rate.
    pub fn explores<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        rng.random::<f64>() < self.rate
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn test_decay_formula() {
        let mut schedule = ExplorationSchedule::new(1.0, 0.5, 2);
        assert!((schedule.decay(1) - 0.5f64.powf(0.5)).abs() < 1e-12);
        let expected = 0.5f64.powf(0.5) * 0.5f64.powf(1.0);
        assert!((schedule.decay(2) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_decay_is_monotone_non_increasing() {
        for decay_rate in [0.0, 0.3, 0.9, 0.999, 1.0] {
            let mut schedule = ExplorationSchedule::new(0.8, decay_rate, 10);
            let mut previous = schedule.rate();
            for episode in 1..=200 {
                let rate = schedule.decay(episode);
                assert!(rate <= previous, "rate increased for decay_rate={decay_rate}");
                assert!(rate >= 0.0);
                previous = rate;
            }
        }
    }

    #[test]
    fn test_decay_accelerates() {
        let mut schedule = ExplorationSchedule::new(1.0, 0.9, 1);
        let first_ratio = schedule.decay(1) / 1.0;
        let before = schedule.rate();
        let second_ratio = schedule.decay(2) / before;
        assert!(second_ratio < first_ratio);
    }

    #[test]
    fn test_explores_extremes() {
        let mut rng = StdRng::seed_from_u64(3);
        let greedy = ExplorationSchedule::new(0.0, 1.0, 1);
        let random = ExplorationSchedule::new(1.0, 1.0, 1);
        for _ in 0..100 {
            assert!(!greedy.explores(&mut rng));
            assert!(random.explores(&mut rng));
        }
    }
}
