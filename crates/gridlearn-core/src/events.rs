//! Synchronous event notification for agent observers
//!
//! Three event kinds can be subscribed to independently: reward (every
//! update), step (every on-policy update) and episode-end (every episode
//! reset). Observers run synchronously in registration order. The first
//! observer that returns an error stops delivery of that event occurrence
//! and the error is handed back to the caller; no other isolation is done.

use std::fmt;

use crate::{GridPos, LearnError};

/// Kind of event, used in error reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Fired by every update
    Reward,
    /// Fired by on-policy updates with the new position
    Step,
    /// Fired by every episode reset
    EpisodeEnd,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Reward => "reward",
            Self::Step => "step",
            Self::EpisodeEnd => "episode-end",
        })
    }
}

/// Payload of a reward event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RewardEvent<'a, A> {
    /// Reward received for the transition
    pub reward: f64,
    /// State the action was taken in
    pub state: GridPos,
    /// Action taken
    pub action: &'a A,
    /// State reached
    pub next_state: GridPos,
}

type RewardObserver<A> = Box<dyn FnMut(&RewardEvent<'_, A>) -> anyhow::Result<()> + Send>;
type StepObserver = Box<dyn FnMut(GridPos) -> anyhow::Result<()> + Send>;
type EpisodeObserver = Box<dyn FnMut(u64) -> anyhow::Result<()> + Send>;

/// Append-only observer lists, one per event kind
pub struct EventBus<A> {
    reward: Vec<RewardObserver<A>>,
    step: Vec<StepObserver>,
    episode_end: Vec<EpisodeObserver>,
}

impl<A> Default for EventBus<A> {
    fn default() -> Self {
        Self {
            reward: Vec::new(),
            step: Vec::new(),
            episode_end: Vec::new(),
        }
    }
}

impl<A> fmt::Debug for EventBus<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("reward", &self.reward.len())
            .field("step", &self.step.len())
            .field("episode_end", &self.episode_end.len())
            .finish()
    }
}

impl<A> EventBus<A> {
    /// Create a bus with no observers
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a reward observer
    pub fn on_reward<F>(&mut self, observer: F)
    where
        F: FnMut(&RewardEvent<'_, A>) -> anyhow::Result<()> + Send + 'static,
    {
        self.reward.push(Box::new(observer));
    }

    /// Register a step observer
    pub fn on_step<F>(&mut self, observer: F)
    where
        F: FnMut(GridPos) -> anyhow::Result<()> + Send + 'static,
    {
        self.step.push(Box::new(observer));
    }

    /// Register an episode-end observer
    pub fn on_episode_end<F>(&mut self, observer: F)
    where
        F: FnMut(u64) -> anyhow::Result<()> + Send + 'static,
    {
        self.episode_end.push(Box::new(observer));
    }

    /// Deliver a reward event
    pub fn emit_reward(&mut self, event: &RewardEvent<'_, A>) -> crate::Result<()> {
        for observer in &mut self.reward {
            observer(event).map_err(|source| observer_failed(EventKind::Reward, source))?;
        }
        Ok(())
    }

    /// Deliver a step event
    pub fn emit_step(&mut self, position: GridPos) -> crate::Result<()> {
        for observer in &mut self.step {
            observer(position).map_err(|source| observer_failed(EventKind::Step, source))?;
        }
        Ok(())
    }

    /// Deliver an episode-end event
    pub fn emit_episode_end(&mut self, episode: u64) -> crate::Result<()> {
        for observer in &mut self.episode_end {
            observer(episode).map_err(|source| observer_failed(EventKind::EpisodeEnd, source))?;
        }
        Ok(())
    }

    /// Number of observers registered for `kind`
    #[must_use]
    pub fn observer_count(&self, kind: EventKind) -> usize {
        match kind {
            EventKind::Reward => self.reward.len(),
            EventKind::Step => self.step.len(),
            EventKind::EpisodeEnd => self.episode_end.len(),
        }
    }
}

fn observer_failed(event: EventKind, source: anyhow::Error) -> LearnError {
    tracing::warn!(%event, error = %source, "observer failed, skipping remaining observers");
    LearnError::Observer { event, source }
}
