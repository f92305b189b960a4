//! Built-in decision strategies for headless playtesting.
//!
//! The engine treats strategies as opaque [`Strategy`] trait objects.
//! Randomness lives entirely on this side of the boundary: each strategy
//! owns a seeded [`SmallRng`] behind a mutex, so a run is reproducible
//! for a given scenario seed while the core stays free of any RNG.

use std::sync::Mutex;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use turf_core::prelude::*;

/// Uniform chaos: one third idle, one third move, one third reproduce,
/// direction always uniform over the compass.
///
/// Useful as a soak-test opponent and for churning the engine in benchmarks.
pub struct RandomWalk {
    rng: Mutex<SmallRng>,
}

impl RandomWalk {
    /// Create a random walker from a seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(SmallRng::seed_from_u64(seed)),
        }
    }
}

impl Strategy for RandomWalk {
    fn decide(&self, _view: &LocalView<'_>, _memory: &mut Vec<u8>) -> Action {
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match rng.gen_range(0..3) {
            0 => Action::None,
            1 => Action::Move(random_direction(&mut rng)),
            _ => Action::Reproduce(random_direction(&mut rng)),
        }
    }
}

/// Everything a territorial agent extracts from one look around.
///
/// Deltas are relative to the agent; neighbor counts only consider the
/// eight adjacent cells while the delta lists cover the whole view.
#[derive(Debug, Default)]
struct RegionStats {
    friendly_deltas: Vec<(i32, i32)>,
    enemy_deltas: Vec<(i32, i32)>,
    friendly_neighbors: u32,
    enemy_neighbors: u32,
}

impl RegionStats {
    fn scan(view: &LocalView<'_>) -> Option<Self> {
        let myself = view.view_cell(0, 0).agent?;
        let r = view.radius();
        let mut stats = Self::default();

        for dx in -r..=r {
            for dy in -r..=r {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let Some(other) = view.view_cell(dx, dy).agent else {
                    continue;
                };
                let adjacent = dx.abs() <= 1 && dy.abs() <= 1;
                if other.player_id == myself.player_id {
                    stats.friendly_deltas.push((dx, dy));
                    if adjacent {
                        stats.friendly_neighbors += 1;
                    }
                } else {
                    stats.enemy_deltas.push((dx, dy));
                    if adjacent {
                        stats.enemy_neighbors += 1;
                    }
                }
            }
        }
        Some(stats)
    }

    /// Direction away from the friendly center of mass, or random when
    /// the sums cancel out.
    fn least_crowded(&self, rng: &mut SmallRng) -> Direction {
        let dx: i32 = self.friendly_deltas.iter().map(|d| d.0).sum();
        let dy: i32 = self.friendly_deltas.iter().map(|d| d.1).sum();
        if dx == 0 && dy == 0 {
            return random_direction(rng);
        }
        Direction::from_delta(-dx.signum(), -dy.signum())
            .unwrap_or_else(|_| random_direction(rng))
    }

    /// Direction toward the enemy center of mass.
    fn toward_enemies(&self, rng: &mut SmallRng) -> Direction {
        let dx: i32 = self.enemy_deltas.iter().map(|d| d.0).sum();
        let dy: i32 = self.enemy_deltas.iter().map(|d| d.1).sum();
        if dx == 0 && dy == 0 {
            return random_direction(rng);
        }
        Direction::from_delta(dx.signum(), dy.signum())
            .unwrap_or_else(|_| random_direction(rng))
    }
}

/// Expansionist strategy with a simple priority list:
///
/// 1. Enemy adjacent: hold position and let the crowding math fight.
/// 2. Enemy visible: advance toward the enemy center of mass.
/// 3. Completely alone (no adjacent friends, hp above 1): reproduce away
///    from the friendly mass.
/// 4. Otherwise: drift toward open space.
pub struct Territorial {
    rng: Mutex<SmallRng>,
}

impl Territorial {
    /// Create a territorial strategy from a seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(SmallRng::seed_from_u64(seed)),
        }
    }
}

impl Strategy for Territorial {
    fn decide(&self, view: &LocalView<'_>, _memory: &mut Vec<u8>) -> Action {
        let Some(stats) = RegionStats::scan(view) else {
            return Action::None;
        };
        let myself = match view.view_cell(0, 0).agent {
            Some(agent) => agent,
            None => return Action::None,
        };
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if !stats.enemy_deltas.is_empty() {
            if stats.enemy_neighbors > 0 {
                return Action::None;
            }
            return Action::Move(stats.toward_enemies(&mut rng));
        }

        if myself.hp > 1 && stats.friendly_neighbors == 0 && stats.enemy_neighbors == 0 {
            return Action::Reproduce(stats.least_crowded(&mut rng));
        }

        Action::Move(stats.least_crowded(&mut rng))
    }
}

fn random_direction(rng: &mut SmallRng) -> Direction {
    Direction::ALL[rng.gen_range(0..Direction::ALL.len())]
}
