//! Compass directions and the per-tick action model.
//!
//! Actions are produced fresh by a strategy each tick and consumed
//! immediately by the turn engine; they are never stored.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// One of the 8 compass directions around a cell.
///
/// Each direction carries a unit offset `(dx, dy)` in `{-1, 0, 1}²`
/// excluding `(0, 0)`. [`Direction::ALL`] lists the variants in the fixed
/// scan order used by the engine's neighbor pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// `(0, -1)`
    North,
    /// `(1, -1)`
    NorthEast,
    /// `(1, 0)`
    East,
    /// `(1, 1)`
    SouthEast,
    /// `(0, 1)`
    South,
    /// `(-1, 1)`
    SouthWest,
    /// `(-1, 0)`
    West,
    /// `(-1, -1)`
    NorthWest,
}

impl Direction {
    /// All 8 directions in engine scan order.
    pub const ALL: [Self; 8] = [
        Self::North,
        Self::NorthEast,
        Self::East,
        Self::SouthEast,
        Self::South,
        Self::SouthWest,
        Self::West,
        Self::NorthWest,
    ];

    /// The unit offset this direction represents.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::NorthEast => (1, -1),
            Self::East => (1, 0),
            Self::SouthEast => (1, 1),
            Self::South => (0, 1),
            Self::SouthWest => (-1, 1),
            Self::West => (-1, 0),
            Self::NorthWest => (-1, -1),
        }
    }

    /// Map a unit offset back to its direction.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidDelta`] for any delta other than the 8
    /// legal unit compass offsets. Hitting that error means the caller has a
    /// logic defect; it is not a normal runtime condition.
    pub fn from_delta(dx: i32, dy: i32) -> Result<Self> {
        match (dx, dy) {
            (0, -1) => Ok(Self::North),
            (1, -1) => Ok(Self::NorthEast),
            (1, 0) => Ok(Self::East),
            (1, 1) => Ok(Self::SouthEast),
            (0, 1) => Ok(Self::South),
            (-1, 1) => Ok(Self::SouthWest),
            (-1, 0) => Ok(Self::West),
            (-1, -1) => Ok(Self::NorthWest),
            _ => Err(SimError::InvalidDelta { dx, dy }),
        }
    }
}

/// An agent's decision for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Action {
    /// Do nothing this tick.
    #[default]
    None,
    /// Step one cell in the given direction.
    ///
    /// Silently dropped if the target cell is impassable or occupied.
    Move(Direction),
    /// Split off a child into the adjacent cell in the given direction.
    ///
    /// Silently dropped if the acting agent has `hp <= 1` or the target cell
    /// is impassable or occupied.
    Reproduce(Direction),
}
