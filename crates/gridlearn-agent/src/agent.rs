//! Tabular Q-learning / SARSA agent
//!
//! One agent type covers both algorithms. The host loop drives it:
//!
//! 1. `choose_action(state)` picks an action epsilon-greedily,
//! 2. the host applies it and observes `(reward, next_state[, next_action])`,
//! 3. `update(...)` applies the TD rule, moves the agent and notifies
//!    observers,
//! 4. `reset_episode()` closes the episode at the host's terminal condition.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use gridlearn_core::{
    Action, AgentConfig, Algorithm, EpsilonGreedy, EventBus, GridBounds, GridPos, LearnError,
    Policy, RewardEvent, ValueStore,
};

use crate::episode::{EpisodeStats, EpisodeTracker};
use crate::update::{strategy_for, td_update, BootstrapTarget, TdStep};

/// Action value keyed by grid position and action identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionValue<A> {
    /// Grid cell
    pub state: GridPos,
    /// Action identifier
    pub action: A,
    /// Stored estimate
    pub value: f64,
}

/// Tabular agent learning action values over a grid world
#[derive(Debug)]
pub struct TabularAgent<A: Action, R = StdRng> {
    config: AgentConfig<A>,
    bounds: GridBounds,
    values: ValueStore,
    policy: EpsilonGreedy,
    strategy: Box<dyn BootstrapTarget>,
    rng: R,
    position: GridPos,
    last_reward: f64,
    episodes: EpisodeTracker,
    pending_action: Option<A>,
    events: EventBus<A>,
}

impl<A: Action> TabularAgent<A, StdRng> {
    /// Create an agent with an entropy-seeded random source
    pub fn new(config: AgentConfig<A>) -> gridlearn_core::Result<Self> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Create an agent whose choices are reproducible for a given seed
    pub fn seeded(config: AgentConfig<A>, seed: u64) -> gridlearn_core::Result<Self> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<A: Action, R: RngCore> TabularAgent<A, R> {
    /// Create an agent drawing randomness from `rng`
    pub fn with_rng(config: AgentConfig<A>, rng: R) -> gridlearn_core::Result<Self> {
        config.validate()?;
        let bounds = config.bounds()?;

        info!(
            grid_width = config.grid_width,
            grid_height = config.grid_height,
            actions = ?config.actions.as_slice(),
            alpha = config.alpha,
            gamma = config.gamma,
            epsilon = config.epsilon,
            algorithm = %config.algorithm,
            "created tabular agent"
        );

        Ok(Self {
            bounds,
            values: ValueStore::new(),
            policy: EpsilonGreedy::new(config.epsilon),
            strategy: strategy_for(config.algorithm),
            rng,
            position: GridPos::ORIGIN,
            last_reward: 0.0,
            episodes: EpisodeTracker::new(),
            pending_action: None,
            events: EventBus::new(),
            config,
        })
    }

    /// Pick an action for `state` epsilon-greedily
    pub fn choose_action(&mut self, state: GridPos) -> gridlearn_core::Result<A> {
        let state = self.bounds.check(state)?;
        let index = self.policy.select(
            &mut self.values,
            state.key(),
            self.config.actions.len(),
            &mut self.rng,
        );
        self.config
            .actions
            .get(index)
            .cloned()
            .ok_or_else(|| LearnError::InvalidAction(format!("policy returned index {index}")))
    }

    /// Learn from one transition and return the new estimate of `(state, action)`.
    ///
    /// `next_action` is the action the host will take in `next_state`. SARSA
    /// bootstraps from it and treats `None` as a terminal transition; Q-learning
    /// ignores it. Arguments are validated before anything is changed. An
    /// observer error is returned after the table and bookkeeping were
    /// already updated.
    pub fn update(
        &mut self,
        state: GridPos,
        action: &A,
        reward: f64,
        next_state: GridPos,
        next_action: Option<&A>,
    ) -> gridlearn_core::Result<f64> {
        let state = self.bounds.check(state)?;
        let next_state = self.bounds.check(next_state)?;
        let action_index = self.config.actions.require(action)?;
        let next_index = next_action
            .map(|a| self.config.actions.require(a))
            .transpose()?;

        let key = state.key();
        let old_q = self.values.get(key, action_index);
        let target = self.strategy.target(
            &mut self.values,
            next_state.key(),
            next_index,
            self.config.actions.len(),
        );
        let TdStep { new_q, td_error, .. } =
            td_update(old_q, reward, target, self.config.alpha, self.config.gamma);
        self.values.set(key, action_index, new_q);

        self.last_reward = reward;
        self.position = next_state;
        self.episodes.record(reward);
        let on_policy = self.strategy.is_on_policy();
        if on_policy {
            if let Some(next) = next_action {
                self.pending_action = Some(next.clone());
            }
        }

        debug!(
            %state,
            ?action,
            reward,
            %next_state,
            old_q,
            new_q,
            td_error,
            "value updated"
        );

        self.events.emit_reward(&RewardEvent {
            reward,
            state,
            action,
            next_state,
        })?;
        if on_policy {
            self.events.emit_step(self.position)?;
        }
        Ok(new_q)
    }

    /// Close the current episode and return the new episode count
    pub fn reset_episode(&mut self) -> gridlearn_core::Result<u64> {
        let episode_reward = self.episodes.current_reward();
        let episode = self.episodes.finish();
        self.position = GridPos::ORIGIN;
        self.pending_action = None;

        info!(episode, episode_reward, "episode finished");

        self.events.emit_episode_end(episode)?;
        Ok(episode)
    }

    /// Register an observer for every update
    pub fn on_reward<F>(&mut self, observer: F)
    where
        F: FnMut(&RewardEvent<'_, A>) -> anyhow::Result<()> + Send + 'static,
    {
        self.events.on_reward(observer);
    }

    /// Register an observer for the new position after each SARSA update
    pub fn on_step<F>(&mut self, observer: F)
    where
        F: FnMut(GridPos) -> anyhow::Result<()> + Send + 'static,
    {
        self.events.on_step(observer);
    }

    /// Register an observer receiving the new episode count at every reset
    pub fn on_episode_end<F>(&mut self, observer: F)
    where
        F: FnMut(u64) -> anyhow::Result<()> + Send + 'static,
    {
        self.events.on_episode_end(observer);
    }

    /// Current estimate of `(state, action)`; materializes unvisited pairs
    pub fn q_value(&mut self, state: GridPos, action: &A) -> gridlearn_core::Result<f64> {
        let state = self.bounds.check(state)?;
        let index = self.config.actions.require(action)?;
        Ok(self.values.get(state.key(), index))
    }

    /// Current estimate of `(state, action)` without materializing it
    pub fn peek(&self, state: GridPos, action: &A) -> gridlearn_core::Result<f64> {
        let state = self.bounds.check(state)?;
        let index = self.config.actions.require(action)?;
        Ok(self.values.peek(state.key(), index))
    }

    /// Overwrite the estimate of `(state, action)`
    pub fn set_q_value(
        &mut self,
        state: GridPos,
        action: &A,
        value: f64,
    ) -> gridlearn_core::Result<()> {
        let state = self.bounds.check(state)?;
        let index = self.config.actions.require(action)?;
        self.values.set(state.key(), index, value);
        Ok(())
    }

    /// First action in set order with the highest estimate; does not materialize
    pub fn greedy_action(&self, state: GridPos) -> gridlearn_core::Result<&A> {
        let key = self.bounds.check(state)?.key();
        let mut best = 0;
        let mut best_q = f64::NEG_INFINITY;
        for index in 0..self.config.actions.len() {
            let q = self.values.peek(key, index);
            if q > best_q {
                best = index;
                best_q = q;
            }
        }
        self.config
            .actions
            .get(best)
            .ok_or_else(|| LearnError::InvalidAction(format!("no action at index {best}")))
    }

    /// Copy out the value table with action identifiers, in creation order
    #[must_use]
    pub fn export_values(&self) -> Vec<ActionValue<A>> {
        self.values
            .iter()
            .filter_map(|(key, value)| {
                self.config.actions.get(key.action).map(|action| ActionValue {
                    state: key.state.decode(),
                    action: action.clone(),
                    value,
                })
            })
            .collect()
    }

    /// Merge previously exported values into the table.
    ///
    /// Every entry is validated first; on error nothing is written.
    pub fn import_values(&mut self, entries: &[ActionValue<A>]) -> gridlearn_core::Result<()> {
        let resolved = entries
            .iter()
            .map(|entry| -> gridlearn_core::Result<_> {
                let state = self.bounds.check(entry.state)?;
                let index = self.config.actions.require(&entry.action)?;
                Ok((state.key(), index, entry.value))
            })
            .collect::<gridlearn_core::Result<Vec<_>>>()?;
        for (key, index, value) in resolved {
            self.values.set(key, index, value);
        }
        Ok(())
    }

    /// The value store
    #[must_use]
    pub fn values(&self) -> &ValueStore {
        &self.values
    }

    /// Configuration the agent was built from
    #[must_use]
    pub fn config(&self) -> &AgentConfig<A> {
        &self.config
    }

    /// Configured algorithm
    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.strategy.algorithm()
    }

    /// Completed episodes
    #[must_use]
    pub fn episode_count(&self) -> u64 {
        self.episodes.episode_count()
    }

    /// Position after the latest update, or the origin after a reset
    #[must_use]
    pub fn position(&self) -> GridPos {
        self.position
    }

    /// Reward passed to the latest update
    #[must_use]
    pub fn last_reward(&self) -> f64 {
        self.last_reward
    }

    /// Reward of every completed episode, oldest first
    #[must_use]
    pub fn reward_history(&self) -> &[f64] {
        self.episodes.history()
    }

    /// Reward accumulated in the running episode
    #[must_use]
    pub fn current_episode_reward(&self) -> f64 {
        self.episodes.current_reward()
    }

    /// Statistics over completed episodes
    #[must_use]
    pub fn episode_stats(&self) -> Option<EpisodeStats> {
        self.episodes.stats()
    }

    /// Next action recorded by the latest SARSA update, cleared on reset
    #[must_use]
    pub fn pending_next_action(&self) -> Option<&A> {
        self.pending_action.as_ref()
    }
}
