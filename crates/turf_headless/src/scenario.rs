//! Scenario loading and world construction.
//!
//! Scenarios are RON files describing a starting world: grid dimensions,
//! impassable terrain, and the initial agents with their strategies. A
//! scenario plus its seed fully determines a run.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use turf_core::prelude::*;

use crate::strategies::{RandomWalk, Territorial};

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// A spawn sits outside the grid.
    #[error("Invalid spawn: {0}")]
    Spawn(#[from] SimError),
    /// A blocked cell sits outside the grid.
    #[error("Blocked cell ({x}, {y}) is outside the grid")]
    BlockedOutOfBounds {
        /// Column of the offending entry.
        x: i32,
        /// Row of the offending entry.
        y: i32,
    },
}

/// Which built-in strategy an agent runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategyKind {
    /// Uniformly random idle/move/reproduce.
    RandomWalk,
    /// Expand, then fight over contested ground.
    Territorial,
}

impl StrategyKind {
    /// Instantiate the strategy with its own RNG stream.
    #[must_use]
    pub fn instantiate(self, seed: u64) -> Arc<dyn Strategy> {
        match self {
            Self::RandomWalk => Arc::new(RandomWalk::new(seed)),
            Self::Territorial => Arc::new(Territorial::new(seed)),
        }
    }
}

/// One starting agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnPoint {
    /// Owning player.
    pub player: PlayerId,
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
    /// Starting health.
    #[serde(default = "default_hp")]
    pub hp: i32,
    /// Decision logic.
    pub strategy: StrategyKind,
}

fn default_hp() -> i32 {
    MAX_HEALTH
}

/// A complete scenario configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Grid width in cells.
    pub width: i32,
    /// Grid height in cells.
    pub height: i32,
    /// Base seed for strategy RNG streams.
    pub seed: u64,
    /// Impassable cells.
    #[serde(default)]
    pub blocked: Vec<(i32, i32)>,
    /// Starting agents.
    pub spawns: Vec<SpawnPoint>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self::skirmish()
    }
}

impl Scenario {
    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> std::result::Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let scenario: Scenario = ron::from_str(&contents)?;
        Ok(scenario)
    }

    /// Load from a RON string (useful for embedded scenarios).
    pub fn from_ron_str(ron: &str) -> std::result::Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        Ok(scenario)
    }

    /// Two territorial colonies in opposite corners of a 32x32 grid.
    #[must_use]
    pub fn skirmish() -> Self {
        Self {
            name: "Corner Skirmish".to_string(),
            description: "Two territorial colonies racing to claim a 32x32 grid".to_string(),
            width: 32,
            height: 32,
            seed: 0,
            blocked: Vec::new(),
            spawns: vec![
                SpawnPoint {
                    player: 1,
                    x: 2,
                    y: 2,
                    hp: MAX_HEALTH,
                    strategy: StrategyKind::Territorial,
                },
                SpawnPoint {
                    player: 2,
                    x: 29,
                    y: 29,
                    hp: MAX_HEALTH,
                    strategy: StrategyKind::Territorial,
                },
            ],
        }
    }

    /// Build the starting simulation this scenario describes.
    ///
    /// Each spawn gets its own strategy instance seeded from the scenario
    /// seed and the spawn's index, so runs with the same file and seed are
    /// identical.
    pub fn build(&self) -> std::result::Result<Simulation, ScenarioError> {
        let mut world = World::new(self.width, self.height);
        for &(x, y) in &self.blocked {
            if !world.set_passable(x, y, false) {
                return Err(ScenarioError::BlockedOutOfBounds { x, y });
            }
        }
        for (index, spawn) in self.spawns.iter().enumerate() {
            let stream = self.seed.wrapping_add(index as u64);
            world.add_agent(AgentSpawn {
                player_id: spawn.player,
                hp: spawn.hp,
                position: Coord::new(spawn.x, spawn.y),
                strategy: spawn.strategy.instantiate(stream),
            })?;
        }
        Ok(Simulation::new(world))
    }
}
