//! Core types for tabular reinforcement learning on a discrete 2D grid
//!
//! This crate provides the leaf components an agent is assembled from:
//! grid coordinates and their lookup keys, the fixed action set, the
//! lazily-initialized action-value store, epsilon-greedy action selection
//! and synchronous observer notification.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod action;
pub mod config;
pub mod error;
pub mod events;
pub mod policy;
pub mod state;
pub mod value;

// Re-export core traits and types
pub use action::{Action, ActionSet};
pub use config::{AgentConfig, Algorithm};
pub use error::{LearnError, Result};
pub use events::{EventBus, EventKind, RewardEvent};
pub use policy::{EpsilonGreedy, Policy};
pub use state::{GridBounds, GridPos, StateKey};
pub use value::{QEntry, QKey, ValueStore};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Action, ActionSet, AgentConfig, Algorithm, GridPos, LearnError, Policy, Result,
        RewardEvent, StateKey, ValueStore,
    };
}
