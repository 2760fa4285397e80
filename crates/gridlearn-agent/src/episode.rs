//! Episode bookkeeping and reward statistics

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Summary of the completed-episode reward history
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpisodeStats {
    /// Completed episodes
    pub episodes: u64,
    /// Mean episode reward
    pub mean: f64,
    /// Population standard deviation of episode rewards
    pub std_dev: f64,
    /// Highest episode reward
    pub best: f64,
    /// Lowest episode reward
    pub worst: f64,
    /// Reward of the most recent episode
    pub last: f64,
}

/// Episode counter, running reward of the current episode and the
/// reward history of completed ones.
///
/// The history gains exactly one entry per [`EpisodeTracker::finish`] and is
/// never truncated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EpisodeTracker {
    episode_count: u64,
    current_reward: f64,
    history: Vec<f64>,
}

impl EpisodeTracker {
    /// Create a tracker with no completed episodes
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a reward to the current episode
    pub fn record(&mut self, reward: f64) {
        self.current_reward += reward;
    }

    /// Close the current episode and return the new episode count
    pub fn finish(&mut self) -> u64 {
        self.episode_count += 1;
        self.history.push(self.current_reward);
        self.current_reward = 0.0;
        self.episode_count
    }

    /// Completed episodes
    #[must_use]
    pub fn episode_count(&self) -> u64 {
        self.episode_count
    }

    /// Reward accumulated since the last [`EpisodeTracker::finish`]
    #[must_use]
    pub fn current_reward(&self) -> f64 {
        self.current_reward
    }

    /// Reward of every completed episode, oldest first
    #[must_use]
    pub fn history(&self) -> &[f64] {
        &self.history
    }

    /// Mean reward over the last `window` episodes
    #[must_use]
    pub fn recent_mean(&self, window: usize) -> Option<f64> {
        if window == 0 || self.history.is_empty() {
            return None;
        }
        let start = self.history.len().saturating_sub(window);
        Some(Statistics::mean(&self.history[start..]))
    }

    /// Statistics over the reward history, `None` before the first episode ends
    #[must_use]
    pub fn stats(&self) -> Option<EpisodeStats> {
        let last = *self.history.last()?;
        let (best, worst) = self
            .history
            .iter()
            .fold((f64::NEG_INFINITY, f64::INFINITY), |(hi, lo), &r| (hi.max(r), lo.min(r)));
        Some(EpisodeStats {
            episodes: self.episode_count,
            mean: Statistics::mean(&self.history),
            std_dev: Statistics::population_std_dev(&self.history),
            best,
            worst,
            last,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_finish_appends_and_resets() {
        let mut tracker = EpisodeTracker::new();
        tracker.record(1.0);
        tracker.record(-0.5);
        assert_abs_diff_eq!(tracker.current_reward(), 0.5);

        assert_eq!(tracker.finish(), 1);
        assert_eq!(tracker.history(), &[0.5]);
        assert_eq!(tracker.current_reward(), 0.0);

        assert_eq!(tracker.finish(), 2);
        assert_eq!(tracker.history(), &[0.5, 0.0]);
        assert_eq!(tracker.history().len() as u64, tracker.episode_count());
    }

    #[test]
    fn test_stats() {
        let mut tracker = EpisodeTracker::new();
        assert!(tracker.stats().is_none());

        for reward in [2.0, 4.0, 6.0] {
            tracker.record(reward);
            tracker.finish();
        }

        let stats = tracker.stats().unwrap();
        assert_eq!(stats.episodes, 3);
        assert_abs_diff_eq!(stats.mean, 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(stats.std_dev, (8.0f64 / 3.0).sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(stats.best, 6.0);
        assert_abs_diff_eq!(stats.worst, 2.0);
        assert_abs_diff_eq!(stats.last, 6.0);
    }

    #[test]
    fn test_recent_mean() {
        let mut tracker = EpisodeTracker::new();
        assert!(tracker.recent_mean(5).is_none());
        for reward in [1.0, 2.0, 3.0, 10.0] {
            tracker.record(reward);
            tracker.finish();
        }
        assert_abs_diff_eq!(tracker.recent_mean(2).unwrap(), 6.5, epsilon = 1e-12);
        assert_abs_diff_eq!(tracker.recent_mean(100).unwrap(), 4.0, epsilon = 1e-12);
        assert!(tracker.recent_mean(0).is_none());
    }
}
