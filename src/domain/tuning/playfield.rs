use serde::{Deserialize, Serialize};

use crate::domain::entity::Position;

/// Region the player may occupy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerBounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl PlayerBounds {
    pub fn clamp(&self, position: Position) -> Position {
        Position {
            x: position.x.clamp(self.min_x, self.max_x),
            y: position.y.clamp(self.min_y, self.max_y),
        }
    }

    pub fn contains(&self, position: Position) -> bool {
        (self.min_x..=self.max_x).contains(&position.x)
            && (self.min_y..=self.max_y).contains(&position.y)
    }
}

impl Default for PlayerBounds {
    fn default() -> Self {
        Self {
            min_x: 10.0,
            max_x: 90.0,
            min_y: 20.0,
            max_y: 90.0,
        }
    }
}

/// Geometry of the normalized 0..=100 playfield.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Playfield {
    pub bounds: PlayerBounds,

    /// Where the player starts every run.
    pub player_start: Position,

    /// Horizontal band new entities appear in.
    pub spawn_min_x: f32,
    pub spawn_max_x: f32,

    /// Entities start above the visible field.
    pub spawn_y: f32,

    /// Entities below this line are culled.
    pub exit_y: f32,

    /// Fixed fraction of velocity applied per tick (ticks are assumed uniform).
    pub tick_scale: f32,

    /// Distance covered by one directional move command.
    pub move_step: f32,
}

impl Default for Playfield {
    fn default() -> Self {
        Self {
            bounds: PlayerBounds::default(),
            player_start: Position::new(50.0, 80.0),
            spawn_min_x: 10.0,
            spawn_max_x: 90.0,
            spawn_y: -10.0,
            exit_y: 120.0,
            tick_scale: 0.1,
            move_step: 5.0,
        }
    }
}
