//! Grid coordinates, grid bounds and the state key encoding

use serde::{Deserialize, Serialize};
use std::fmt;

/// A cell of the grid world.
///
/// Positions are plain `Copy` values: storing one never aliases the
/// caller's copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridPos {
    /// Column
    pub x: i32,
    /// Row
    pub y: i32,
}

impl GridPos {
    /// The fixed episode start cell (0, 0)
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    /// Create a new position
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Lookup key for this position
    #[must_use]
    pub fn key(self) -> StateKey {
        StateKey::encode(self.x, self.y)
    }
}

impl From<(i32, i32)> for GridPos {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Lookup key for a grid cell.
///
/// Both coordinates are packed into one `u64` (x in the high half, y in the
/// low half), so every `(i32, i32)` pair maps to a distinct key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateKey(u64);

impl StateKey {
    /// Encode a coordinate pair
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub const fn encode(x: i32, y: i32) -> Self {
        Self(((x as u32 as u64) << 32) | (y as u32 as u64))
    }

    /// Recover the coordinate pair
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub const fn decode(self) -> GridPos {
        GridPos {
            x: (self.0 >> 32) as u32 as i32,
            y: self.0 as u32 as i32,
        }
    }

    /// Raw key value
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl From<GridPos> for StateKey {
    fn from(pos: GridPos) -> Self {
        pos.key()
    }
}

/// Dimensions of the grid world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridBounds {
    /// Number of columns
    pub width: u32,
    /// Number of rows
    pub height: u32,
}

impl GridBounds {
    /// Create grid bounds, rejecting zero-sized dimensions
    pub fn new(width: u32, height: u32) -> crate::Result<Self> {
        if width == 0 || height == 0 {
            return Err(crate::LearnError::Configuration(format!(
                "grid dimensions must be positive, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    /// Check whether a position lies on the grid
    #[must_use]
    pub fn contains(&self, pos: GridPos) -> bool {
        u32::try_from(pos.x).is_ok_and(|x| x < self.width)
            && u32::try_from(pos.y).is_ok_and(|y| y < self.height)
    }

    /// Return `pos` unchanged if it lies on the grid
    pub fn check(&self, pos: GridPos) -> crate::Result<GridPos> {
        if self.contains(pos) {
            Ok(pos)
        } else {
            Err(crate::LearnError::InvalidState {
                x: pos.x,
                y: pos.y,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Number of cells on the grid
    #[must_use]
    pub fn cells(&self) -> usize {
        self.width as usize * self.height as usize
    }
}
