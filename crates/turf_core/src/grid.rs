//! Cell storage, the occupancy index, and the world itself.
//!
//! The world owns a row-major array of cells plus the agent registry. A
//! single shared sentinel cell stands in for every coordinate outside the
//! grid: it is impassable, unoccupied, and never mutated, so out-of-range
//! lookups need no error path.

use serde::{Deserialize, Serialize};

use crate::action::Direction;
use crate::agent::{Agent, AgentArena, AgentId, AgentSpawn};
use crate::error::{Result, SimError};
use crate::view::{AgentView, CellView, LocalView};

/// Visibility radius of the local view handed to strategies.
///
/// A property of the engine, not of any caller: every view built by
/// [`World::view_around`] uses this radius.
pub const VIEW_RADIUS: i32 = 2;

/// An integer grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    /// Column, `0..width` when inside the grid.
    pub x: i32,
    /// Row, `0..height` when inside the grid.
    pub y: i32,
}

impl Coord {
    /// Create a coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The coordinate one step in the given direction.
    #[must_use]
    pub const fn offset(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self::new(self.x + dx, self.y + dy)
    }
}

/// One grid cell: static terrain plus at most one occupant.
///
/// Passability is terrain data, distinct from occupancy; a cell can be
/// passable yet occupied, and the sentinel is impassable yet empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// Whether agents may enter this cell.
    pub passable: bool,
    /// The occupying agent, if any.
    pub agent: Option<AgentId>,
}

impl Cell {
    /// Open terrain with no occupant.
    pub const EMPTY: Self = Self {
        passable: true,
        agent: None,
    };

    /// True when an agent could step into this cell right now.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.passable && self.agent.is_none()
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// The simulation world: grid cells plus the live agent registry.
///
/// Width and height are fixed at construction. Cells are stored row-major
/// (`index = y * width + x`).
#[derive(Debug)]
pub struct World {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
    /// The shared out-of-bounds cell. Returned by reference for every
    /// coordinate outside the grid; never mutated.
    sentinel: Cell,
    agents: AgentArena,
}

impl World {
    /// Create an open world of the given dimensions.
    ///
    /// # Panics
    ///
    /// Panics if `width` or `height` is not positive.
    #[must_use]
    pub fn new(width: i32, height: i32) -> Self {
        assert!(width > 0, "World width must be positive");
        assert!(height > 0, "World height must be positive");

        let cell_count = (width as usize) * (height as usize);
        Self {
            width,
            height,
            cells: vec![Cell::EMPTY; cell_count],
            sentinel: Cell {
                passable: false,
                agent: None,
            },
            agents: AgentArena::default(),
        }
    }

    /// Grid width in cells.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Grid height in cells.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Check if a coordinate lies inside the grid.
    #[must_use]
    pub const fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    /// Convert a coordinate to its row-major cell index.
    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if self.in_bounds(x, y) {
            Some((y as usize) * (self.width as usize) + (x as usize))
        } else {
            None
        }
    }

    /// The cell at `(x, y)`, or the shared sentinel for any out-of-range
    /// coordinate. Never fails.
    #[must_use]
    pub fn cell_at(&self, x: i32, y: i32) -> &Cell {
        match self.index(x, y) {
            Some(index) => &self.cells[index],
            None => &self.sentinel,
        }
    }

    /// Set the terrain passability of a cell. Returns `false` (and changes
    /// nothing) for out-of-range coordinates; the sentinel cannot be touched
    /// this way.
    pub fn set_passable(&mut self, x: i32, y: i32, passable: bool) -> bool {
        match self.index(x, y) {
            Some(index) => {
                self.cells[index].passable = passable;
                true
            }
            None => false,
        }
    }

    /// A read-only projection of the cell at `(x, y)` with the occupant
    /// resolved to its visible fields. This is the rendering consumers' query
    /// surface: `player_id` for color, `hp` for intensity, nothing mutable.
    #[must_use]
    pub fn view(&self, x: i32, y: i32) -> CellView {
        let cell = self.cell_at(x, y);
        CellView {
            passable: cell.passable,
            agent: cell
                .agent
                .and_then(|id| self.agents.get(id))
                .map(|agent| AgentView {
                    player_id: agent.player_id,
                    hp: agent.hp,
                }),
        }
    }

    /// Build the bounded local view centered at `(x, y)` with the engine's
    /// fixed [`VIEW_RADIUS`].
    #[must_use]
    pub fn view_around(&self, x: i32, y: i32) -> LocalView<'_> {
        LocalView::new(self, Coord::new(x, y), VIEW_RADIUS)
    }

    /// Register an agent into the world.
    ///
    /// Bounds-checked: fails if the spawn position lies outside the grid.
    /// **No occupancy check is performed** - registration is a trusted
    /// setup-time operation, and spawning onto an occupied cell silently
    /// overwrites the occupancy index. Callers must ensure the target cell is
    /// free.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::OutOfBounds`] if the position is outside
    /// `[0, width) x [0, height)`.
    pub fn add_agent(&mut self, spawn: AgentSpawn) -> Result<AgentId> {
        if !self.in_bounds(spawn.position.x, spawn.position.y) {
            return Err(SimError::OutOfBounds {
                x: spawn.position.x,
                y: spawn.position.y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(self.spawn_in_bounds(spawn))
    }

    /// Register a spawn whose position has already been validated.
    ///
    /// Used by the turn engine for reproduction, where the target cell was
    /// just observed to be a real, open cell.
    pub(crate) fn spawn_in_bounds(&mut self, spawn: AgentSpawn) -> AgentId {
        let index = self.index(spawn.position.x, spawn.position.y);
        debug_assert!(index.is_some(), "spawn position must be in bounds");
        let id = self.agents.insert(spawn);
        if let Some(index) = index {
            self.cells[index].agent = Some(id);
        }
        id
    }

    /// Look up a live agent by id.
    #[must_use]
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id)
    }

    /// Mutable access to a live agent.
    ///
    /// Position is engine-owned and not reachable here; health, memory, and
    /// the transient counters are fair game for scenario setup and tests.
    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(id)
    }

    /// Live agent ids in registration order (oldest first).
    #[must_use]
    pub fn agent_ids(&self) -> &[AgentId] {
        self.agents.ids()
    }

    /// Number of live agents.
    #[must_use]
    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Iterate live agents in registration order.
    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.agents.ids().iter().filter_map(|&id| self.agents.get(id))
    }

    pub(crate) fn clear_cell(&mut self, at: Coord) {
        if let Some(index) = self.index(at.x, at.y) {
            self.cells[index].agent = None;
        }
    }

    pub(crate) fn occupy_cell(&mut self, at: Coord, id: AgentId) {
        if let Some(index) = self.index(at.x, at.y) {
            self.cells[index].agent = Some(id);
        }
    }

    pub(crate) fn set_agent_position(&mut self, id: AgentId, to: Coord) {
        if let Some(agent) = self.agents.get_mut(id) {
            agent.position = to;
        }
    }

    /// Remove every agent with `hp <= 0`, clearing their cells. Returns the
    /// removed ids. Survivor order is preserved.
    pub(crate) fn sweep_dead(&mut self) -> Vec<AgentId> {
        let removed = self.agents.sweep(|agent| agent.hp > 0);
        let mut deaths = Vec::with_capacity(removed.len());
        for agent in removed {
            self.clear_cell(agent.position);
            deaths.push(agent.id);
        }
        deaths
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::action::Action;
    use crate::agent::Strategy;

    struct Idle;

    impl Strategy for Idle {
        fn decide(&self, _view: &LocalView<'_>, _memory: &mut Vec<u8>) -> Action {
            Action::None
        }
    }

    fn spawn(player_id: u32, x: i32, y: i32) -> AgentSpawn {
        AgentSpawn {
            player_id,
            hp: 10,
            position: Coord::new(x, y),
            strategy: Arc::new(Idle),
        }
    }

    #[test]
    fn out_of_range_lookups_return_the_same_sentinel_instance() {
        let world = World::new(8, 8);
        let a = world.cell_at(-1, 0);
        let b = world.cell_at(8, 0);
        let c = world.cell_at(3, 100);

        assert!(!a.passable);
        assert!(a.agent.is_none());
        assert!(std::ptr::eq(a, b));
        assert!(std::ptr::eq(b, c));
    }

    #[test]
    fn add_agent_rejects_out_of_bounds_positions() {
        let mut world = World::new(4, 4);
        let err = world.add_agent(spawn(1, 4, 0)).unwrap_err();
        assert_eq!(
            err,
            SimError::OutOfBounds {
                x: 4,
                y: 0,
                width: 4,
                height: 4
            }
        );
        assert_eq!(world.agent_count(), 0);
    }

    #[test]
    fn add_agent_occupies_the_target_cell() {
        let mut world = World::new(4, 4);
        let id = world.add_agent(spawn(1, 2, 3)).unwrap();
        assert_eq!(world.cell_at(2, 3).agent, Some(id));
        assert_eq!(world.agent(id).unwrap().position(), Coord::new(2, 3));
    }

    #[test]
    fn add_agent_does_not_check_occupancy() {
        // Direct registration is a trusted setup-time operation; stacking two
        // spawns on one cell is a caller error the world does not police.
        let mut world = World::new(4, 4);
        let first = world.add_agent(spawn(1, 1, 1)).unwrap();
        let second = world.add_agent(spawn(2, 1, 1)).unwrap();
        assert_ne!(first, second);
        assert_eq!(world.cell_at(1, 1).agent, Some(second));
    }

    #[test]
    fn set_passable_is_bounds_checked() {
        let mut world = World::new(4, 4);
        assert!(world.set_passable(0, 0, false));
        assert!(!world.cell_at(0, 0).passable);
        assert!(!world.set_passable(-1, 0, true));
        assert!(!world.cell_at(-1, 0).passable);
    }

    #[test]
    fn view_projects_occupant_fields() {
        let mut world = World::new(4, 4);
        world.add_agent(spawn(7, 0, 0)).unwrap();
        let view = world.view(0, 0);
        assert!(view.passable);
        let agent = view.agent.unwrap();
        assert_eq!(agent.player_id, 7);
        assert_eq!(agent.hp, 10);
        assert!(world.view(1, 1).agent.is_none());
    }

    #[test]
    fn row_major_indexing_keeps_cells_distinct() {
        // On a non-square grid a transposed index bug would alias (2, 1) with
        // a different cell.
        let mut world = World::new(3, 2);
        world.set_passable(2, 1, false);
        assert!(!world.cell_at(2, 1).passable);
        assert!(world.cell_at(1, 1).passable);
        assert!(world.cell_at(2, 0).passable);
        assert!(world.cell_at(0, 1).passable);
    }
}
