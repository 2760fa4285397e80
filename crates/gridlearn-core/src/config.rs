//! Agent configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Action, ActionSet, GridBounds, LearnError};

/// Temporal-difference algorithm used by the agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Off-policy: bootstrap from the greedy value of the next state
    #[default]
    QLearning,
    /// On-policy: bootstrap from the action actually taken next
    Sarsa,
}

impl Algorithm {
    /// Canonical identifier
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::QLearning => "qlearning",
            Self::Sarsa => "sarsa",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = LearnError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "qlearning" | "q-learning" | "q_learning" => Ok(Self::QLearning),
            "sarsa" => Ok(Self::Sarsa),
            other => Err(LearnError::Configuration(format!(
                "unrecognized algorithm '{other}', expected 'qlearning' or 'sarsa'"
            ))),
        }
    }
}

fn default_alpha() -> f64 {
    0.1
}

fn default_gamma() -> f64 {
    0.9
}

fn default_epsilon() -> f64 {
    0.2
}

/// Configuration for a tabular agent
///
/// `alpha`, `gamma` and `epsilon` are expected in `[0, 1]`; only
/// non-finite values are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "A: Deserialize<'de> + Action", serialize = "A: Serialize + Clone"))]
pub struct AgentConfig<A> {
    /// Number of grid columns
    pub grid_width: u32,
    /// Number of grid rows
    pub grid_height: u32,
    /// Ordered action set
    pub actions: ActionSet<A>,
    /// Learning rate
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    /// Discount factor
    #[serde(default = "default_gamma")]
    pub gamma: f64,
    /// Exploration rate
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
    /// TD algorithm
    #[serde(default)]
    pub algorithm: Algorithm,
}

impl<A: Action> AgentConfig<A> {
    /// Create a configuration with default hyperparameters
    pub fn new(grid_width: u32, grid_height: u32, actions: Vec<A>) -> crate::Result<Self> {
        GridBounds::new(grid_width, grid_height)?;
        Ok(Self {
            grid_width,
            grid_height,
            actions: ActionSet::new(actions)?,
            alpha: default_alpha(),
            gamma: default_gamma(),
            epsilon: default_epsilon(),
            algorithm: Algorithm::default(),
        })
    }

    /// Set the learning rate
    #[must_use]
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set the discount factor
    #[must_use]
    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    /// Set the exploration rate
    #[must_use]
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Set the algorithm
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Grid bounds described by this configuration
    pub fn bounds(&self) -> crate::Result<GridBounds> {
        GridBounds::new(self.grid_width, self.grid_height)
    }

    /// Check the configuration before an agent is built from it
    pub fn validate(&self) -> crate::Result<()> {
        self.bounds()?;
        for (name, value) in [
            ("alpha", self.alpha),
            ("gamma", self.gamma),
            ("epsilon", self.epsilon),
        ] {
            if !value.is_finite() {
                return Err(LearnError::Configuration(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }
        Ok(())
    }
}

impl<A> AgentConfig<A>
where
    A: Action + for<'de> Deserialize<'de>,
{
    /// Parse and validate a JSON configuration document
    pub fn from_json(json: &str) -> crate::Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| {
            // Unknown algorithms and bad action sets surface as configuration errors
            if e.is_data() {
                LearnError::Configuration(e.to_string())
            } else {
                LearnError::Serialization(e)
            }
        })?;
        config.validate()?;
        Ok(config)
    }
}
