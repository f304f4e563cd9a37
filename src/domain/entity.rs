// Playfield entities: plain data records moved by the systems, never by closures.

use serde::{Deserialize, Serialize};

pub type EntityId = u64;

/// Point in normalized playfield coordinates (0..=100 on each axis).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Playfield units per tick, before the fixed tick scale is applied.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Velocity {
    pub vx: f32,
    pub vy: f32,
}

impl Velocity {
    pub const ZERO: Velocity = Velocity { vx: 0.0, vy: 0.0 };

    pub fn magnitude(self) -> f32 {
        (self.vx * self.vx + self.vy * self.vy).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Legendary,
}

/// What a power-up does when the player activates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", content = "amount", rename_all = "snake_case")]
pub enum PowerUpEffect {
    /// Adds seconds to the countdown.
    ExtendTime(u32),
    AddScore(i64),
    ExtraLife,
    DoubleScore,
    /// Spends one hint on the current puzzle.
    RevealHint,
    /// Moves on to the next puzzle without penalty.
    SkipChallenge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntityKind {
    Collectible { rarity: Rarity },
    Hazard { severity: u8 },
    PowerUp { effect: PowerUpEffect },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Offset for a single step of `amount` units (screen coordinates, +y is down).
    pub fn offset(self, amount: f32) -> (f32, f32) {
        match self {
            Direction::Up => (0.0, -amount),
            Direction::Down => (0.0, amount),
            Direction::Left => (-amount, 0.0),
            Direction::Right => (amount, 0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub label: String,
    pub position: Position,
    pub velocity: Velocity,

    // Speed targeting hazards keep while re-aiming.
    pub speed: f32,
    // Points for collectibles, damage for hazards, unused for power-ups.
    pub value: i64,
    // Score a power-up costs to activate.
    pub cost: i64,
    pub targeting: bool,
}

impl Entity {
    pub fn is_power_up(&self) -> bool {
        matches!(self.kind, EntityKind::PowerUp { .. })
    }
}
