//! Agent model, the insertion-ordered registry, and the strategy trait.
//!
//! Agents are pure engine bookkeeping: a team identity, health, a position,
//! an opaque memory buffer, and a shared reference to the decision strategy
//! that acts for them. The engine never inspects the memory buffer and owns
//! nothing of the strategy's internals.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::action::Action;
use crate::grid::Coord;
use crate::view::LocalView;

/// Unique identifier for agents. Ids are assigned at registration and never
/// reused within a world.
pub type AgentId = u64;

/// Team identity shared by an agent and its descendants.
pub type PlayerId = u32;

/// A pluggable decision function.
///
/// Implementations must be pure with respect to the grid: the only world
/// state they may consult is the [`LocalView`] passed in. The `memory` buffer
/// is the agent's private state, carried across ticks and opaque to the
/// engine. One strategy value may be shared by many agents (including
/// children spawned by reproduction), so implementations keep any internal
/// state behind interior mutability.
///
/// Strategies are invoked synchronously and must return promptly; there is no
/// timeout or cancellation mechanism.
pub trait Strategy: Send + Sync {
    /// Decide this agent's action for the current tick.
    fn decide(&self, view: &LocalView<'_>, memory: &mut Vec<u8>) -> Action;
}

/// A live agent in the world.
///
/// Created by [`World::add_agent`](crate::grid::World::add_agent) or by
/// reproduction during a tick; destroyed by the end-of-tick sweep once its
/// health reaches zero.
pub struct Agent {
    /// Unique identifier, assigned by the registry.
    pub id: AgentId,
    /// Team identity. Immutable for the agent's lifetime.
    pub player_id: PlayerId,
    /// Current health. Nominally in `[0, MAX_HEALTH]`; may dip negative
    /// between the health pass and the sweep that removes the agent.
    pub hp: i32,
    /// Grid position. Kept consistent with the cell occupancy index by the
    /// engine; not writable from outside the crate.
    pub(crate) position: Coord,
    /// Opaque per-agent state handed to the strategy each tick.
    pub memory: Vec<u8>,
    /// The decision strategy acting for this agent. Shared, never cloned
    /// deeply; children reproduce with the same reference.
    pub strategy: Arc<dyn Strategy>,
    /// Same-team agents adjacent after the most recent tick's move phase.
    /// Recomputed every tick, never persisted.
    pub friendly_neighbors: u8,
    /// Enemy agents adjacent after the most recent tick's move phase.
    /// Recomputed every tick, never persisted.
    pub enemy_neighbors: u8,
}

impl Agent {
    /// The agent's current grid position.
    #[must_use]
    pub const fn position(&self) -> Coord {
        self.position
    }
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.id)
            .field("player_id", &self.player_id)
            .field("hp", &self.hp)
            .field("position", &self.position)
            .field("memory_len", &self.memory.len())
            .field("friendly_neighbors", &self.friendly_neighbors)
            .field("enemy_neighbors", &self.enemy_neighbors)
            .finish_non_exhaustive()
    }
}

/// Parameters for registering a new agent.
#[derive(Clone)]
pub struct AgentSpawn {
    /// Team identity for the new agent.
    pub player_id: PlayerId,
    /// Starting health.
    pub hp: i32,
    /// Starting position. Must lie inside the grid.
    pub position: Coord,
    /// Decision strategy; cloned by reference only.
    pub strategy: Arc<dyn Strategy>,
}

impl fmt::Debug for AgentSpawn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentSpawn")
            .field("player_id", &self.player_id)
            .field("hp", &self.hp)
            .field("position", &self.position)
            .finish_non_exhaustive()
    }
}

/// Insertion-ordered agent storage.
///
/// A `HashMap` gives O(1) lookup by id; the separate order vector records
/// registration order, which is the deterministic iteration order the turn
/// engine relies on (it always walks this order reversed, oldest last).
#[derive(Debug, Default)]
pub(crate) struct AgentArena {
    agents: HashMap<AgentId, Agent>,
    order: Vec<AgentId>,
    next_id: AgentId,
}

impl AgentArena {
    /// Register a spawn, assign it a fresh id, and append it to the order.
    pub(crate) fn insert(&mut self, spawn: AgentSpawn) -> AgentId {
        self.next_id += 1;
        let id = self.next_id;
        self.agents.insert(
            id,
            Agent {
                id,
                player_id: spawn.player_id,
                hp: spawn.hp,
                position: spawn.position,
                memory: Vec::new(),
                strategy: spawn.strategy,
                friendly_neighbors: 0,
                enemy_neighbors: 0,
            },
        );
        self.order.push(id);
        id
    }

    pub(crate) fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(&id)
    }

    /// Live agent ids in registration order.
    pub(crate) fn ids(&self) -> &[AgentId] {
        &self.order
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    /// Drop every agent failing `keep`, preserving the relative order of the
    /// survivors. Returns the removed agents.
    pub(crate) fn sweep<F>(&mut self, keep: F) -> Vec<Agent>
    where
        F: Fn(&Agent) -> bool,
    {
        let mut removed = Vec::new();
        let agents = &mut self.agents;
        self.order.retain(|id| {
            if agents.get(id).is_some_and(|agent| keep(agent)) {
                true
            } else {
                if let Some(agent) = agents.remove(id) {
                    removed.push(agent);
                }
                false
            }
        });
        removed
    }
}
