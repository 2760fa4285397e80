//! Error types for the grid learning core

use thiserror::Error;

use crate::events::EventKind;

/// Core error type for agent operations
#[derive(Error, Debug)]
pub enum LearnError {
    /// Rejected configuration (empty action set, zero grid dimension, unknown algorithm, ...)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Action outside the configured action set
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// Coordinate pair outside the configured grid
    #[error("Invalid state: ({x}, {y}) is outside a {width}x{height} grid")]
    InvalidState {
        /// Column
        x: i32,
        /// Row
        y: i32,
        /// Grid width
        width: u32,
        /// Grid height
        height: u32,
    },

    /// An observer failed; remaining observers for that event were skipped
    #[error("{event} observer failed: {source}")]
    Observer {
        /// Event being dispatched when the observer failed
        event: EventKind,
        /// Error returned by the observer
        #[source]
        source: anyhow::Error,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, LearnError>;
