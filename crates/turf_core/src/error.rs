//! Error types for the simulation engine.
//!
//! The engine distinguishes exactly two failure kinds. Everything else that
//! looks like it could fail during action resolution (moving into a wall,
//! reproducing into an occupied cell) is a defined no-op, not an error.

use thiserror::Error;

/// Result type alias using [`SimError`].
pub type Result<T> = std::result::Result<T, SimError>;

/// Top-level error type for the simulation engine.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SimError {
    /// An agent was registered at a coordinate outside the grid.
    ///
    /// This is a caller-visible failure: the registration is aborted and the
    /// world is left untouched.
    #[error("position ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        /// Requested x coordinate.
        x: i32,
        /// Requested y coordinate.
        y: i32,
        /// Grid width.
        width: i32,
        /// Grid height.
        height: i32,
    },

    /// A delta that is not one of the 8 unit compass offsets was mapped back
    /// to a [`Direction`](crate::action::Direction).
    ///
    /// This indicates a logic defect in the caller, not a data-dependent
    /// runtime condition.
    #[error("({dx}, {dy}) is not a unit compass offset")]
    InvalidDelta {
        /// Offending x delta.
        dx: i32,
        /// Offending y delta.
        dy: i32,
    },
}
