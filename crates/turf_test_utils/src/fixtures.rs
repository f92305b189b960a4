//! Test fixtures and helpers.
//!
//! Deterministic strategies for driving the turn engine from tests, spawn
//! shorthand, the occupancy-invariant assertion, and proptest generators for
//! actions.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use proptest::prelude::{prop, prop_oneof, Just};
use proptest::strategy::Strategy as PropStrategy;

use turf_core::prelude::*;

/// A strategy that always stays put.
pub struct Idle;

impl Strategy for Idle {
    fn decide(&self, _view: &LocalView<'_>, _memory: &mut Vec<u8>) -> Action {
        Action::None
    }
}

/// A strategy that plays back a fixed action list, then idles.
///
/// The script is shared: if several agents (or a reproduced child) hold the
/// same `Scripted` value, they consume the one queue in engine invocation
/// order, which makes pass-ordering observable from tests.
pub struct Scripted {
    actions: Mutex<VecDeque<Action>>,
}

impl Scripted {
    /// Build a shared scripted strategy from an action sequence.
    pub fn new(actions: impl IntoIterator<Item = Action>) -> Arc<Self> {
        Arc::new(Self {
            actions: Mutex::new(actions.into_iter().collect()),
        })
    }

    /// Actions not yet consumed.
    pub fn remaining(&self) -> usize {
        self.actions.lock().expect("script lock").len()
    }
}

impl Strategy for Scripted {
    fn decide(&self, _view: &LocalView<'_>, _memory: &mut Vec<u8>) -> Action {
        self.actions
            .lock()
            .expect("script lock")
            .pop_front()
            .unwrap_or(Action::None)
    }
}

/// Spawn an agent, panicking on out-of-bounds coordinates.
pub fn spawn_agent(
    world: &mut World,
    player_id: PlayerId,
    hp: i32,
    x: i32,
    y: i32,
    strategy: Arc<dyn Strategy>,
) -> AgentId {
    world
        .add_agent(AgentSpawn {
            player_id,
            hp,
            position: Coord::new(x, y),
            strategy,
        })
        .expect("fixture spawn must be in bounds")
}

/// Assert the engine's core invariant: every live agent's recorded position
/// maps to a cell owned by that agent, and no two agents share a cell.
///
/// # Panics
///
/// Panics with a description of the first violation found.
pub fn assert_world_consistent(world: &World) {
    let mut seen = std::collections::HashMap::new();
    for agent in world.agents() {
        let position = agent.position();
        assert_eq!(
            world.cell_at(position.x, position.y).agent,
            Some(agent.id),
            "agent {} at {:?} does not own its cell",
            agent.id,
            position
        );
        if let Some(other) = seen.insert(position, agent.id) {
            panic!(
                "agents {} and {} both claim position {:?}",
                other, agent.id, position
            );
        }
    }
}

/// Proptest generator for a compass direction.
pub fn direction_strategy() -> impl PropStrategy<Value = Direction> {
    prop::sample::select(Direction::ALL.to_vec())
}

/// Proptest generator for an action, weighted toward movement.
pub fn action_strategy() -> impl PropStrategy<Value = Action> {
    prop_oneof![
        1 => Just(Action::None),
        3 => direction_strategy().prop_map(Action::Move),
        2 => direction_strategy().prop_map(Action::Reproduce),
    ]
}
