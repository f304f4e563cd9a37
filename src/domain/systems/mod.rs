// Per-tick systems. Each one is a free function over the entity store so the
// session can call them in a fixed order: spawn, move, collide.

pub mod collision;
pub mod motion;
pub mod spawner;

pub use collision::{activate_power_up, collectible_points, resolve_contacts};
pub use motion::integrate;
pub use spawner::{spawn_power_up, spawn_tick};
