use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::domain::entity::{
    Entity, EntityId, EntityKind, Position, PowerUpEffect, Rarity, Velocity,
};
use crate::domain::ports::{PuzzleFetchError, PuzzleSource, RandomSource};
use crate::domain::puzzle::Puzzle;

/// Replays fixed rolls, then keeps answering 0.999 so every later chance fails.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRolls(VecDeque<f32>);

impl ScriptedRolls {
    pub fn new(rolls: impl IntoIterator<Item = f32>) -> Self {
        Self(rolls.into_iter().collect())
    }

    /// Never spawns anything.
    pub fn quiet() -> Self {
        Self::default()
    }

    pub fn remaining(&self) -> usize {
        self.0.len()
    }
}

impl RandomSource for ScriptedRolls {
    fn unit(&mut self) -> f32 {
        self.0.pop_front().unwrap_or(0.999)
    }
}

pub fn collectible(id: EntityId, rarity: Rarity, value: i64, position: Position) -> Entity {
    Entity {
        id,
        kind: EntityKind::Collectible { rarity },
        label: format!("item-{id}"),
        position,
        velocity: Velocity::ZERO,
        speed: 0.0,
        value,
        cost: 0,
        targeting: false,
    }
}

pub fn hazard(id: EntityId, damage: u8, position: Position, velocity: Velocity) -> Entity {
    Entity {
        id,
        kind: EntityKind::Hazard { severity: damage },
        label: format!("bug-{id}"),
        position,
        velocity,
        speed: velocity.magnitude(),
        value: i64::from(damage),
        cost: 0,
        targeting: false,
    }
}

pub fn power_up(id: EntityId, effect: PowerUpEffect, position: Position) -> Entity {
    Entity {
        id,
        kind: EntityKind::PowerUp { effect },
        label: format!("power-{id}"),
        position,
        velocity: Velocity::ZERO,
        speed: 0.0,
        value: 0,
        cost: 0,
        targeting: false,
    }
}

pub fn priced_power_up(
    id: EntityId,
    effect: PowerUpEffect,
    cost: i64,
    position: Position,
) -> Entity {
    Entity {
        cost,
        ..power_up(id, effect, position)
    }
}

pub struct FailingPuzzleSource {
    pub error: PuzzleFetchError,
    calls: AtomicUsize,
}

impl FailingPuzzleSource {
    pub fn new(error: PuzzleFetchError) -> Self {
        Self {
            error,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PuzzleSource for FailingPuzzleSource {
    async fn fetch_puzzle(&self) -> Result<Puzzle, PuzzleFetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(self.error.clone())
    }
}

/// Hands out queued puzzles, repeating the last one once the queue runs dry.
pub struct FixedPuzzleSource {
    puzzles: Mutex<VecDeque<Puzzle>>,
    last: Puzzle,
}

impl FixedPuzzleSource {
    pub fn new(puzzles: impl IntoIterator<Item = Puzzle>) -> Self {
        let puzzles: VecDeque<Puzzle> = puzzles.into_iter().collect();
        let last = puzzles.back().cloned().unwrap_or_else(Puzzle::fallback);
        Self {
            puzzles: Mutex::new(puzzles),
            last,
        }
    }
}

#[async_trait]
impl PuzzleSource for FixedPuzzleSource {
    async fn fetch_puzzle(&self) -> Result<Puzzle, PuzzleFetchError> {
        let next = self
            .puzzles
            .lock()
            .expect("puzzle queue poisoned")
            .pop_front();
        Ok(next.unwrap_or_else(|| self.last.clone()))
    }
}
