//! Temporal-difference update rules
//!
//! Both algorithms share one update, `Q(s,a) += α·(r + γ·target − Q(s,a))`,
//! and differ only in where the bootstrap `target` comes from. That part is
//! a [`BootstrapTarget`] strategy chosen from the configured [`Algorithm`].

use std::fmt::Debug;

use gridlearn_core::{Algorithm, StateKey, ValueStore};

/// Source of the bootstrap value used in the TD target
pub trait BootstrapTarget: Debug + Send + Sync {
    /// Bootstrap value for a transition into `next_state`.
    ///
    /// `next_action` is the index of the action the caller will take next,
    /// if it supplied one.
    fn target(
        &self,
        values: &mut ValueStore,
        next_state: StateKey,
        next_action: Option<usize>,
        num_actions: usize,
    ) -> f64;

    /// Whether the target follows the behaviour policy
    fn is_on_policy(&self) -> bool;

    /// Algorithm implemented by this strategy
    fn algorithm(&self) -> Algorithm;
}

/// Off-policy target: greedy value of the next state
#[derive(Debug, Clone, Copy, Default)]
pub struct QLearningTarget;

impl BootstrapTarget for QLearningTarget {
    fn target(
        &self,
        values: &mut ValueStore,
        next_state: StateKey,
        _next_action: Option<usize>,
        num_actions: usize,
    ) -> f64 {
        values.max_value(next_state, num_actions)
    }

    fn is_on_policy(&self) -> bool {
        false
    }

    fn algorithm(&self) -> Algorithm {
        Algorithm::QLearning
    }
}

/// On-policy target: value of the action actually taken next.
///
/// Without a next action the transition is treated as terminal and the
/// target is zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct SarsaTarget;

impl BootstrapTarget for SarsaTarget {
    fn target(
        &self,
        values: &mut ValueStore,
        next_state: StateKey,
        next_action: Option<usize>,
        _num_actions: usize,
    ) -> f64 {
        match next_action {
            Some(action) => values.get(next_state, action),
            None => 0.0,
        }
    }

    fn is_on_policy(&self) -> bool {
        true
    }

    fn algorithm(&self) -> Algorithm {
        Algorithm::Sarsa
    }
}

/// Strategy implementing `algorithm`
#[must_use]
pub fn strategy_for(algorithm: Algorithm) -> Box<dyn BootstrapTarget> {
    match algorithm {
        Algorithm::QLearning => Box::new(QLearningTarget),
        Algorithm::Sarsa => Box::new(SarsaTarget),
    }
}

/// Result of one TD update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TdStep {
    /// Estimate before the update
    pub old_q: f64,
    /// Bootstrap value
    pub target: f64,
    /// `reward + γ·target − old_q`
    pub td_error: f64,
    /// Estimate after the update
    pub new_q: f64,
}

/// Apply the TD rule to one estimate
#[must_use]
pub fn td_update(old_q: f64, reward: f64, target: f64, alpha: f64, gamma: f64) -> TdStep {
    let td_error = reward + gamma * target - old_q;
    TdStep {
        old_q,
        target,
        td_error,
        new_q: old_q + alpha * td_error,
    }
}
