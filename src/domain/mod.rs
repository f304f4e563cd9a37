// Domain layer: arcade entities, gameplay tuning, and the per-tick systems.

pub mod entity;
pub mod errors;
pub mod ports;
pub mod puzzle;
pub mod state;
pub mod store;
pub mod systems;
pub mod tuning;

#[cfg(test)]
pub(crate) mod test_support;

pub use entity::{Direction, Entity, EntityId, EntityKind, Position, PowerUpEffect, Rarity, Velocity};
pub use errors::{ConfigError, SessionError};
pub use ports::{PuzzleFetchError, PuzzleSource, RandomSource};
pub use puzzle::{FALLBACK_NOTICE, Puzzle};
pub use state::{Counters, EntitySnapshot, GameEvent, PuzzleView, SessionSnapshot, SessionState};
pub use store::EntityStore;
