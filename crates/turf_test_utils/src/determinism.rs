//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the turn engine produces identical
//! results given identical inputs.
//!
//! # Testing Strategy
//!
//! Reproducible runs are part of the engine's contract. Sources of
//! non-determinism to watch for:
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized. The
//!   engine always walks the registration-order vector, never the map.
//!
//! - **Unseeded randomness**: the engine itself has none; strategies that
//!   want randomness must take an explicit seed.
//!
//! - **Pass ordering**: the reverse-insertion-order tie-break is part of the
//!   observable semantics and must never drift.

use turf_core::prelude::Simulation;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical final hashes.
    pub is_deterministic: bool,
    /// Final state hash from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated per run.
    pub ticks: u64,
}

impl DeterminismResult {
    /// All unique hashes (should be exactly 1 for a deterministic engine).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the runs matched, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Simulation is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a simulation setup multiple times and verify the final hashes match.
///
/// `setup` must build the complete initial state, including the strategies:
/// any seeded randomness inside a strategy has to be re-seeded identically on
/// every call for the comparison to be meaningful.
pub fn verify_determinism<Setup>(runs: usize, ticks: u64, setup: Setup) -> DeterminismResult
where
    Setup: Fn() -> Simulation,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut sim = setup();
        for _ in 0..ticks {
            sim.run_iteration();
        }
        hashes.push(sim.state_hash());
    }

    let is_deterministic = hashes.windows(2).all(|pair| pair[0] == pair[1]);
    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}
