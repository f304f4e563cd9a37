use crate::domain::entity::{Entity, EntityId, EntityKind, Position, Velocity};
use crate::domain::ports::RandomSource;
use crate::domain::store::EntityStore;
use crate::domain::tuning::{MotionRange, Playfield, SpawnTuning};

/// One spawn pass. Returns the ids of everything that appeared.
///
/// Roll order is fixed so scripted sources stay meaningful:
/// collectible chance, then (on success) table pick, speed, angle, x;
/// hazard chance, then pick, speed, angle, x, targeting;
/// power-up chance, then pick, x, y.
/// Kinds whose base probability is zero do not consume a roll, and neither do
/// power-ups once the field is at its cap.
pub fn spawn_tick<R: RandomSource + ?Sized>(
    store: &mut EntityStore,
    spawn: &SpawnTuning,
    playfield: &Playfield,
    level: u32,
    spawn_scale: f32,
    rng: &mut R,
) -> Vec<EntityId> {
    let scale = level.max(1) as f32 * spawn_scale;
    let mut spawned = Vec::new();

    if spawn.collectible_chance > 0.0 && rng.chance(scaled(spawn.collectible_chance, scale)) {
        let template = &spawn.collectibles[rng.pick(spawn.collectibles.len())];
        let (position, velocity) = launch(rng, playfield, spawn.collectible_motion);
        let id = store.allocate_id();
        store.add(Entity {
            id,
            kind: EntityKind::Collectible {
                rarity: template.rarity,
            },
            label: template.label.clone(),
            position,
            velocity,
            speed: velocity.magnitude(),
            value: template.points,
            cost: 0,
            targeting: false,
        });
        spawned.push(id);
    }

    if spawn.hazard_chance > 0.0 && rng.chance(scaled(spawn.hazard_chance, scale)) {
        let template = &spawn.hazards[rng.pick(spawn.hazards.len())];
        let (position, velocity) = launch(rng, playfield, spawn.hazard_motion);
        let targeting = rng.chance(spawn.targeting_chance);
        let id = store.allocate_id();
        store.add(Entity {
            id,
            kind: EntityKind::Hazard {
                severity: template.damage,
            },
            label: template.label.clone(),
            position,
            velocity,
            speed: velocity.magnitude(),
            value: i64::from(template.damage),
            cost: 0,
            targeting,
        });
        spawned.push(id);
    }

    if spawn.power_up_chance > 0.0
        && store.power_up_count() < spawn.max_power_ups
        && rng.chance(scaled(spawn.power_up_chance, scale))
    {
        if let Some(id) = place_power_up(store, spawn, playfield, rng) {
            spawned.push(id);
        }
    }

    spawned
}

/// Drops one random power-up regardless of its per-tick chance (cap still applies).
pub fn spawn_power_up<R: RandomSource + ?Sized>(
    store: &mut EntityStore,
    spawn: &SpawnTuning,
    playfield: &Playfield,
    rng: &mut R,
) -> Option<EntityId> {
    if store.power_up_count() >= spawn.max_power_ups {
        return None;
    }
    place_power_up(store, spawn, playfield, rng)
}

fn place_power_up<R: RandomSource + ?Sized>(
    store: &mut EntityStore,
    spawn: &SpawnTuning,
    playfield: &Playfield,
    rng: &mut R,
) -> Option<EntityId> {
    if spawn.power_ups.is_empty() {
        return None;
    }
    let template = &spawn.power_ups[rng.pick(spawn.power_ups.len())];

    // Stationary, somewhere the player can reach above their start row.
    let bounds = playfield.bounds;
    let max_y = playfield.player_start.y.clamp(bounds.min_y, bounds.max_y);
    let x = rng.range(bounds.min_x, bounds.max_x);
    let y = rng.range(bounds.min_y, max_y);

    let id = store.allocate_id();
    store.add(Entity {
        id,
        kind: EntityKind::PowerUp {
            effect: template.effect,
        },
        label: template.label.clone(),
        position: Position::new(x, y),
        velocity: Velocity::ZERO,
        speed: 0.0,
        value: 0,
        cost: template.cost,
        targeting: false,
    });
    Some(id)
}

fn scaled(base: f32, scale: f32) -> f32 {
    (base * scale).min(1.0)
}

// Speed, then angle inside the downward cone, then x in the spawn band.
fn launch<R: RandomSource + ?Sized>(
    rng: &mut R,
    playfield: &Playfield,
    motion: MotionRange,
) -> (Position, Velocity) {
    let speed = rng.range(motion.min_speed, motion.max_speed);
    let half_cone = motion.cone_degrees.to_radians() / 2.0;
    let angle = rng.range(-half_cone, half_cone);
    let x = rng.range(playfield.spawn_min_x, playfield.spawn_max_x);

    let velocity = Velocity {
        vx: speed * angle.sin(),
        vy: speed * angle.cos(),
    };
    (Position::new(x, playfield.spawn_y), velocity)
}
