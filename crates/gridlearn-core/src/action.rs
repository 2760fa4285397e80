//! Actions and the fixed, ordered action set

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

/// Trait for action identifiers.
///
/// Actions are opaque to the learner; it only needs to compare, hash and
/// clone them. Blanket-implemented for every suitable type (`&'static str`,
/// `String`, enums, integers, ...).
pub trait Action: Clone + Debug + PartialEq + Eq + Hash + Send + Sync {}

impl<T> Action for T where T: Clone + Debug + PartialEq + Eq + Hash + Send + Sync {}

/// Non-empty, ordered, immutable set of actions.
///
/// The order is the one supplied at construction; it decides action indices
/// in the value store and the scan order of the greedy policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<A>", into = "Vec<A>")]
#[serde(bound(deserialize = "A: Deserialize<'de> + Action", serialize = "A: Serialize + Clone"))]
pub struct ActionSet<A> {
    actions: Vec<A>,
}

impl<A: Action> ActionSet<A> {
    /// Create an action set, rejecting empty or duplicated input
    pub fn new(actions: Vec<A>) -> crate::Result<Self> {
        if actions.is_empty() {
            return Err(crate::LearnError::Configuration(
                "action set must not be empty".to_string(),
            ));
        }
        for (i, action) in actions.iter().enumerate() {
            if actions[..i].contains(action) {
                return Err(crate::LearnError::Configuration(format!(
                    "duplicate action {action:?} in action set"
                )));
            }
        }
        Ok(Self { actions })
    }

    /// Index of an action, if it belongs to the set
    #[must_use]
    pub fn index_of(&self, action: &A) -> Option<usize> {
        self.actions.iter().position(|a| a == action)
    }

    /// Index of an action, or `InvalidAction`
    pub fn require(&self, action: &A) -> crate::Result<usize> {
        self.index_of(action).ok_or_else(|| {
            crate::LearnError::InvalidAction(format!(
                "{action:?} is not one of {:?}",
                self.actions
            ))
        })
    }

    /// Check membership
    #[must_use]
    pub fn contains(&self, action: &A) -> bool {
        self.index_of(action).is_some()
    }

    /// Action at `index`
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&A> {
        self.actions.get(index)
    }

    /// Uniformly sample an action index
    pub fn sample_index<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        rng.gen_range(0..self.actions.len())
    }

    /// Number of actions (never zero)
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Always `false`; present for API symmetry with `len`
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Iterate over actions in set order
    pub fn iter(&self) -> std::slice::Iter<'_, A> {
        self.actions.iter()
    }

    /// Actions as a slice
    #[must_use]
    pub fn as_slice(&self) -> &[A] {
        &self.actions
    }
}

impl<A: Action> TryFrom<Vec<A>> for ActionSet<A> {
    type Error = crate::LearnError;

    fn try_from(actions: Vec<A>) -> crate::Result<Self> {
        Self::new(actions)
    }
}

impl<A> From<ActionSet<A>> for Vec<A> {
    fn from(set: ActionSet<A>) -> Self {
        set.actions
    }
}

impl<'a, A> IntoIterator for &'a ActionSet<A> {
    type Item = &'a A;
    type IntoIter = std::slice::Iter<'a, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.iter()
    }
}
