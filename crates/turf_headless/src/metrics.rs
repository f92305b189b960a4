//! Run metrics collection for scenario analysis.
//!
//! Samples per-player population and health over a run so outcomes can be
//! compared across strategy matchups and dumped as JSON for offline
//! plotting.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use turf_core::prelude::*;

/// Aggregates for one player at one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSample {
    /// Live agents.
    pub agents: u32,
    /// Sum of their health.
    pub total_hp: i64,
}

/// Snapshot of the whole world at one tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PopulationSample {
    /// Tick the sample was taken at.
    pub tick: u64,
    /// Per-player aggregates, keyed by player id.
    pub players: BTreeMap<PlayerId, PlayerSample>,
    /// Agents spawned during the sampled tick.
    pub births: u32,
    /// Agents that died during the sampled tick.
    pub deaths: u32,
}

impl PopulationSample {
    /// Sample the current world state plus the tick's events.
    #[must_use]
    pub fn capture(sim: &Simulation, events: &TickEvents) -> Self {
        let mut players: BTreeMap<PlayerId, PlayerSample> = BTreeMap::new();
        for agent in sim.world().agents() {
            let entry = players.entry(agent.player_id).or_default();
            entry.agents += 1;
            entry.total_hp += i64::from(agent.hp);
        }
        Self {
            tick: sim.current_tick(),
            players,
            births: events.spawned.len() as u32,
            deaths: events.deaths.len() as u32,
        }
    }
}

/// Complete metrics for one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunMetrics {
    /// Scenario name.
    pub scenario: String,
    /// Seed the run used.
    pub seed: u64,
    /// Ticks executed.
    pub ticks: u64,
    /// Time series of samples.
    pub samples: Vec<PopulationSample>,
    /// Final simulation state hash (for reproducibility checks).
    pub final_state_hash: u64,
    /// Sole surviving player, if the run ended one-sided.
    pub survivor: Option<PlayerId>,
}

/// Collects samples at a fixed interval while a run progresses.
#[derive(Debug)]
pub struct MetricsCollector {
    metrics: RunMetrics,
    sample_interval: u64,
}

impl MetricsCollector {
    /// Create a collector sampling every `sample_interval` ticks.
    /// An interval of zero samples every tick.
    #[must_use]
    pub fn new(scenario: impl Into<String>, seed: u64, sample_interval: u64) -> Self {
        Self {
            metrics: RunMetrics {
                scenario: scenario.into(),
                seed,
                ..RunMetrics::default()
            },
            sample_interval: sample_interval.max(1),
        }
    }

    /// Record one executed tick.
    pub fn record_tick(&mut self, sim: &Simulation, events: &TickEvents) {
        self.metrics.ticks = sim.current_tick();
        if sim.current_tick() % self.sample_interval == 0 {
            self.metrics.samples.push(PopulationSample::capture(sim, events));
        }
    }

    /// Close out the run and return the gathered metrics.
    #[must_use]
    pub fn finish(mut self, sim: &Simulation) -> RunMetrics {
        self.metrics.final_state_hash = sim.state_hash();
        let mut players = sim.world().agents().map(|a| a.player_id);
        self.metrics.survivor = match players.next() {
            Some(first) if players.all(|p| p == first) => Some(first),
            _ => None,
        };
        self.metrics
    }
}
