//! Drives a scenario to completion tick by tick.

use turf_core::prelude::*;

use crate::metrics::{MetricsCollector, RunMetrics};
use crate::scenario::{Scenario, ScenarioError};

/// Knobs for a headless run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Hard tick limit.
    pub max_ticks: u64,
    /// Metrics sampling interval in ticks.
    pub sample_interval: u64,
    /// Stop early once at most one player has agents left.
    pub stop_on_victory: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_ticks: 1000,
            sample_interval: 10,
            stop_on_victory: true,
        }
    }
}

/// A scenario in flight.
pub struct Runner {
    sim: Simulation,
    collector: MetricsCollector,
    config: RunConfig,
}

impl Runner {
    /// Build the scenario's world and prepare to run it.
    pub fn from_scenario(scenario: &Scenario, config: RunConfig) -> std::result::Result<Self, ScenarioError> {
        let sim = scenario.build()?;
        let collector =
            MetricsCollector::new(scenario.name.clone(), scenario.seed, config.sample_interval);
        tracing::info!(
            scenario = %scenario.name,
            seed = scenario.seed,
            agents = sim.world().agent_count(),
            "starting run"
        );
        Ok(Self {
            sim,
            collector,
            config,
        })
    }

    /// The live simulation.
    #[must_use]
    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    /// Execute one tick and record it.
    pub fn step(&mut self) -> TickEvents {
        let events = self.sim.run_iteration();
        self.collector.record_tick(&self.sim, &events);
        if !events.deaths.is_empty() {
            tracing::debug!(
                tick = self.sim.current_tick(),
                deaths = events.deaths.len(),
                "agents died"
            );
        }
        events
    }

    /// True once the run should stop.
    #[must_use]
    pub fn finished(&self) -> bool {
        if self.sim.current_tick() >= self.config.max_ticks {
            return true;
        }
        if !self.config.stop_on_victory {
            return false;
        }
        let mut players = self.sim.world().agents().map(|a| a.player_id);
        match players.next() {
            None => true,
            Some(first) => players.all(|p| p == first),
        }
    }

    /// Run to completion, calling `on_tick` after every executed tick.
    pub fn run_with<F>(mut self, mut on_tick: F) -> RunMetrics
    where
        F: FnMut(&Simulation, &TickEvents),
    {
        while !self.finished() {
            let events = self.step();
            on_tick(&self.sim, &events);
        }
        let metrics = self.collector.finish(&self.sim);
        tracing::info!(
            ticks = metrics.ticks,
            survivor = ?metrics.survivor,
            hash = metrics.final_state_hash,
            "run complete"
        );
        metrics
    }

    /// Run to completion without observation.
    #[must_use]
    pub fn run(self) -> RunMetrics {
        self.run_with(|_, _| {})
    }
}
