//! Action selection over the value store

use rand::Rng;
use rand::RngCore;

use crate::{StateKey, ValueStore};

/// Core policy trait for selecting an action index in a state.
///
/// Policies take the store mutably because reading an unvisited pair
/// materializes it, and the random source explicitly so runs can be
/// reproduced under a fixed seed.
pub trait Policy: Send + Sync {
    /// Select an action index in `0..num_actions`
    fn select(
        &self,
        values: &mut ValueStore,
        state: StateKey,
        num_actions: usize,
        rng: &mut dyn RngCore,
    ) -> usize;
}

/// Epsilon-greedy policy.
///
/// With probability `epsilon` a uniformly random action is returned.
/// Otherwise every action is scored and one of the maximizers (exact
/// equality) is drawn uniformly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpsilonGreedy {
    /// Exploration rate
    pub epsilon: f64,
}

impl EpsilonGreedy {
    /// Create a new epsilon-greedy policy
    #[must_use]
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }

    /// Indices of every action attaining the maximum value in `state`
    pub fn maximizers(values: &mut ValueStore, state: StateKey, num_actions: usize) -> Vec<usize> {
        let mut max_q = f64::NEG_INFINITY;
        let mut best = Vec::with_capacity(num_actions);
        for action in 0..num_actions {
            let q = values.get(state, action);
            if q > max_q {
                max_q = q;
                best.clear();
                best.push(action);
            } else if q == max_q {
                best.push(action);
            }
        }
        best
    }
}

impl Policy for EpsilonGreedy {
    fn select(
        &self,
        values: &mut ValueStore,
        state: StateKey,
        num_actions: usize,
        rng: &mut dyn RngCore,
    ) -> usize {
        if rng.gen::<f64>() < self.epsilon {
            let action = rng.gen_range(0..num_actions);
            tracing::trace!(action, "explore");
            return action;
        }

        let best = Self::maximizers(values, state, num_actions);
        // NaN estimates never compare as maximal; fall back to the full set
        let action = if best.is_empty() {
            rng.gen_range(0..num_actions)
        } else {
            best[rng.gen_range(0..best.len())]
        };
        tracing::trace!(action, ties = best.len(), "exploit");
        action
    }
}
