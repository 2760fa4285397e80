//! Tabular action-value store Q(s, a)

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::StateKey;

/// Composite key of the value table: encoded state plus action index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QKey {
    /// Encoded grid cell
    pub state: StateKey,
    /// Index into the agent's action set
    pub action: usize,
}

impl QKey {
    /// Create a new key
    #[must_use]
    pub fn new(state: StateKey, action: usize) -> Self {
        Self { state, action }
    }
}

/// One row of a value-table snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QEntry {
    /// Encoded grid cell
    pub state: StateKey,
    /// Index into the agent's action set
    pub action: usize,
    /// Stored estimate
    pub value: f64,
}

/// Tabular Q-function for discrete state-action spaces.
///
/// Unwritten pairs read as `0.0`. Reading a pair through [`ValueStore::get`]
/// materializes it, so later size and iteration queries see the entry.
/// Entries are never removed; iteration follows creation order.
#[derive(Debug, Clone, Default)]
pub struct ValueStore {
    q_values: IndexMap<QKey, f64>,
}

impl ValueStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read an estimate, creating a zero entry for unvisited pairs
    pub fn get(&mut self, state: StateKey, action: usize) -> f64 {
        *self.q_values.entry(QKey::new(state, action)).or_insert(0.0)
    }

    /// Read an estimate without materializing it
    #[must_use]
    pub fn peek(&self, state: StateKey, action: usize) -> f64 {
        self.q_values
            .get(&QKey::new(state, action))
            .copied()
            .unwrap_or(0.0)
    }

    /// Overwrite an estimate
    pub fn set(&mut self, state: StateKey, action: usize, value: f64) {
        self.q_values.insert(QKey::new(state, action), value);
    }

    /// Largest estimate over actions `0..num_actions` in `state`, materializing each
    pub fn max_value(&mut self, state: StateKey, num_actions: usize) -> f64 {
        (0..num_actions)
            .map(|action| self.get(state, action))
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Whether the pair has an entry
    #[must_use]
    pub fn contains(&self, state: StateKey, action: usize) -> bool {
        self.q_values.contains_key(&QKey::new(state, action))
    }

    /// Number of materialized entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.q_values.len()
    }

    /// Whether no entry has been materialized yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.q_values.is_empty()
    }

    /// Iterate entries in creation order
    pub fn iter(&self) -> impl Iterator<Item = (QKey, f64)> + '_ {
        self.q_values.iter().map(|(k, v)| (*k, *v))
    }

    /// Copy out every entry, in creation order
    #[must_use]
    pub fn snapshot(&self) -> Vec<QEntry> {
        self.iter()
            .map(|(key, value)| QEntry {
                state: key.state,
                action: key.action,
                value,
            })
            .collect()
    }

    /// Rebuild a store from a snapshot; later duplicates overwrite earlier ones
    #[must_use]
    pub fn restore(entries: impl IntoIterator<Item = QEntry>) -> Self {
        let q_values = entries
            .into_iter()
            .map(|e| (QKey::new(e.state, e.action), e.value))
            .collect();
        Self { q_values }
    }
}
