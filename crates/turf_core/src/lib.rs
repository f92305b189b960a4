//! # Turf Core
//!
//! Deterministic simulation core for a population of territorial agents on a
//! fixed 2D grid.
//!
//! Each tick, every live agent consults its decision strategy over a bounded
//! local view of the grid and returns an action (stay, move, or reproduce).
//! The engine resolves those actions against shared grid state, recomputes
//! local crowding pressure, applies the health formula, and sweeps the dead.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO
//! - No system randomness
//!
//! Strategies (the pluggable decision functions) and any driving loop live
//! outside this crate; the engine sees strategies only through the
//! [`Strategy`](agent::Strategy) trait.
//!
//! ## Crate Structure
//!
//! - [`grid`] - Cell storage, occupancy index, and the [`World`](grid::World)
//! - [`agent`] - Agent model, registry, and the strategy trait
//! - [`action`] - Compass directions and per-tick actions
//! - [`view`] - The bounded read-only window handed to strategies
//! - [`simulation`] - The four-pass turn engine

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod action;
pub mod agent;
pub mod error;
pub mod grid;
pub mod simulation;
pub mod view;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::action::{Action, Direction};
    pub use crate::agent::{Agent, AgentId, AgentSpawn, PlayerId, Strategy};
    pub use crate::error::{Result, SimError};
    pub use crate::grid::{Cell, Coord, World, VIEW_RADIUS};
    pub use crate::simulation::{Simulation, TickEvents, MAX_HEALTH, REST_BONUS};
    pub use crate::view::{AgentView, CellView, LocalView};
}
