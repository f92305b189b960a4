//! The bounded read-only window handed to strategies.
//!
//! A [`LocalView`] is a lightweight non-owning projection (center + radius +
//! borrowed world), rebuilt for every strategy invocation and never cached:
//! once the turn engine moves past the owning agent, later mutations change
//! the grid underneath it, so holding one across that point would go stale.

use serde::{Deserialize, Serialize};

use crate::agent::PlayerId;
use crate::grid::{Coord, World};

/// The fields of an occupying agent a strategy is allowed to see.
///
/// No mutation capability, no neighbor counters, no memory - just enough to
/// tell friend from foe and strong from weak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentView {
    /// The occupant's team identity.
    pub player_id: PlayerId,
    /// The occupant's current health.
    pub hp: i32,
}

/// A read-only projection of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellView {
    /// Whether the cell can be entered.
    pub passable: bool,
    /// The occupying agent's visible fields, if any.
    pub agent: Option<AgentView>,
}

impl CellView {
    /// The projection of the out-of-bounds sentinel: impassable, empty.
    pub const SENTINEL: Self = Self {
        passable: false,
        agent: None,
    };
}

/// A bounded window into the world, centered on one coordinate.
///
/// Offsets beyond the radius and offsets whose absolute coordinate falls
/// outside the grid both resolve to the sentinel, so a strategy cannot tell
/// the edge of the world from the edge of its vision.
#[derive(Debug, Clone, Copy)]
pub struct LocalView<'a> {
    world: &'a World,
    center: Coord,
    radius: i32,
}

impl<'a> LocalView<'a> {
    pub(crate) const fn new(world: &'a World, center: Coord, radius: i32) -> Self {
        Self {
            world,
            center,
            radius,
        }
    }

    /// The visibility radius of this view.
    #[must_use]
    pub const fn radius(&self) -> i32 {
        self.radius
    }

    /// The cell at the given offset from the view's center.
    ///
    /// `view_cell(0, 0)` is the viewing agent's own cell. Any offset with
    /// `|dx| > radius` or `|dy| > radius` returns the sentinel projection.
    #[must_use]
    pub fn view_cell(&self, dx: i32, dy: i32) -> CellView {
        if dx.abs() > self.radius || dy.abs() > self.radius {
            return CellView::SENTINEL;
        }
        self.world.view(self.center.x + dx, self.center.y + dy)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::action::Action;
    use crate::agent::{AgentSpawn, Strategy};

    struct Idle;

    impl Strategy for Idle {
        fn decide(&self, _view: &LocalView<'_>, _memory: &mut Vec<u8>) -> Action {
            Action::None
        }
    }

    fn world_with_agent(x: i32, y: i32) -> World {
        let mut world = World::new(8, 8);
        world
            .add_agent(AgentSpawn {
                player_id: 1,
                hp: 10,
                position: Coord::new(x, y),
                strategy: Arc::new(Idle),
            })
            .unwrap();
        world
    }

    #[test]
    fn offsets_beyond_the_radius_are_sentinel() {
        let world = world_with_agent(4, 4);
        let view = world.view_around(4, 4);
        assert_eq!(view.radius(), 2);
        assert_eq!(view.view_cell(3, 0), CellView::SENTINEL);
        assert_eq!(view.view_cell(0, -3), CellView::SENTINEL);
        assert!(view.view_cell(2, 2).passable);
    }

    #[test]
    fn edge_of_world_looks_like_edge_of_vision() {
        let world = world_with_agent(0, 0);
        let view = world.view_around(0, 0);
        // (-1, 0) is off-grid but inside the radius; (-3, 0) is outside the
        // radius. A strategy sees the same impassable, empty cell either way.
        assert_eq!(view.view_cell(-1, 0), CellView::SENTINEL);
        assert_eq!(view.view_cell(-3, 0), CellView::SENTINEL);
    }

    #[test]
    fn center_cell_shows_the_viewing_agent() {
        let world = world_with_agent(4, 4);
        let view = world.view_around(4, 4);
        let own = view.view_cell(0, 0).agent.unwrap();
        assert_eq!(own.player_id, 1);
        assert_eq!(own.hp, 10);
    }
}
