//! Tabular Q-learning and SARSA agents for discrete grid worlds
//!
//! This crate provides:
//! - the TD update rules as interchangeable bootstrap strategies
//! - episode bookkeeping with reward statistics
//! - [`TabularAgent`], a single agent configurable for either algorithm

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod agent;
pub mod episode;
pub mod update;

// Re-export agents
pub use agent::{ActionValue, TabularAgent};

// Re-export components
pub use episode::{EpisodeStats, EpisodeTracker};
pub use update::{strategy_for, td_update, BootstrapTarget, QLearningTarget, SarsaTarget, TdStep};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{ActionValue, EpisodeStats, TabularAgent};
    pub use gridlearn_core::prelude::*;
}
