//! # Turf Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Scripted and idle strategies for driving the engine from tests
//! - World fixtures and the occupancy-invariant assertion
//! - Determinism test harness
//! - Property-based testing generators

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;

/// Re-export proptest for convenience.
pub use proptest;
