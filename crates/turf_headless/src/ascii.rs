//! ASCII world renderer for terminal review.
//!
//! Draws one character per cell using only the public read API, so it
//! sees exactly what a strategy would see and never touches engine
//! internals.

use std::collections::BTreeMap;
use std::fmt::Write;

use turf_core::prelude::*;

/// ANSI color helpers for player tinting.
mod color {
    pub const RESET: &str = "\x1b[0m";

    /// Cycle of bright foreground colors, one per player.
    pub const PALETTE: [&str; 6] = [
        "\x1b[91m", // red
        "\x1b[94m", // blue
        "\x1b[92m", // green
        "\x1b[93m", // yellow
        "\x1b[95m", // magenta
        "\x1b[96m", // cyan
    ];

    pub fn for_player(player_id: u32) -> &'static str {
        PALETTE[player_id as usize % PALETTE.len()]
    }
}

/// ASCII rendering configuration.
#[derive(Debug, Clone)]
pub struct AsciiConfig {
    /// Append a per-player population legend.
    pub show_legend: bool,
    /// Use colored output (ANSI).
    pub use_color: bool,
}

impl Default for AsciiConfig {
    fn default() -> Self {
        Self {
            show_legend: true,
            use_color: true,
        }
    }
}

/// Glyph for a player's agents. Wounded agents render lowercase.
fn agent_char(agent: AgentView) -> char {
    let base = b'A' + (agent.player_id % 26) as u8;
    if agent.hp * 2 <= MAX_HEALTH {
        (base + 32) as char
    } else {
        base as char
    }
}

/// Render the whole grid as one string, top row first.
#[must_use]
pub fn render_ascii(world: &World, config: &AsciiConfig) -> String {
    let mut out = String::new();
    let mut populations: BTreeMap<PlayerId, u32> = BTreeMap::new();

    for y in 0..world.height() {
        for x in 0..world.width() {
            let cell = world.view(x, y);
            match cell.agent {
                Some(agent) => {
                    *populations.entry(agent.player_id).or_insert(0) += 1;
                    if config.use_color {
                        out.push_str(color::for_player(agent.player_id));
                        out.push(agent_char(agent));
                        out.push_str(color::RESET);
                    } else {
                        out.push(agent_char(agent));
                    }
                }
                None if cell.passable => out.push('.'),
                None => out.push('#'),
            }
        }
        out.push('\n');
    }

    if config.show_legend {
        for (player_id, count) in &populations {
            let glyph = (b'A' + (player_id % 26) as u8) as char;
            let _ = writeln!(out, "player {player_id} ({glyph}): {count}");
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use turf_test_utils::fixtures::{spawn_agent, Idle};

    use super::*;

    fn plain() -> AsciiConfig {
        AsciiConfig {
            show_legend: false,
            use_color: false,
        }
    }

    #[test]
    fn renders_terrain_and_agents() {
        let mut world = World::new(4, 2);
        world.set_passable(2, 0, false);
        spawn_agent(&mut world, 1, 10, 0, 0, Arc::new(Idle));
        spawn_agent(&mut world, 2, 3, 3, 1, Arc::new(Idle));

        let text = render_ascii(&world, &plain());
        assert_eq!(text, "B.#.\n...c\n");
    }

    #[test]
    fn legend_counts_each_player() {
        let mut world = World::new(3, 3);
        spawn_agent(&mut world, 1, 10, 0, 0, Arc::new(Idle));
        spawn_agent(&mut world, 1, 10, 1, 0, Arc::new(Idle));
        spawn_agent(&mut world, 2, 10, 2, 2, Arc::new(Idle));

        let config = AsciiConfig {
            show_legend: true,
            use_color: false,
        };
        let text = render_ascii(&world, &config);
        assert!(text.contains("player 1 (B): 2"));
        assert!(text.contains("player 2 (C): 1"));
    }

    #[test]
    fn color_output_wraps_agents_in_ansi_codes() {
        let mut world = World::new(2, 1);
        spawn_agent(&mut world, 1, 10, 0, 0, Arc::new(Idle));

        let config = AsciiConfig {
            show_legend: false,
            use_color: true,
        };
        let text = render_ascii(&world, &config);
        assert!(text.starts_with("\x1b["));
        assert!(text.contains(color::RESET));
    }
}
