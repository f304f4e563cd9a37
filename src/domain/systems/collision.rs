use tracing::debug;

use crate::domain::entity::{EntityId, EntityKind, PowerUpEffect, Rarity};
use crate::domain::state::{Counters, GameEvent};
use crate::domain::store::EntityStore;
use crate::domain::tuning::ScoringRules;

/// Score for picking up a collectible, rounded down after the rarity multiplier.
pub fn collectible_points(value: i64, rarity: Rarity, rules: &ScoringRules) -> i64 {
    let multiplier = match rarity {
        Rarity::Common | Rarity::Uncommon => 1.0,
        Rarity::Rare => f64::from(rules.rare_multiplier),
        Rarity::Legendary => f64::from(rules.legendary_multiplier),
    };
    (value as f64 * multiplier).floor() as i64
}

/// Resolves every collectible and hazard within reach of the player.
///
/// All contacts in a tick apply, in store order. Power-ups are left alone;
/// they only resolve through [`activate_power_up`].
pub fn resolve_contacts(
    store: &mut EntityStore,
    counters: &mut Counters,
    rules: &ScoringRules,
) -> Vec<GameEvent> {
    let player = store.player();
    let touching: Vec<EntityId> = store
        .all()
        .iter()
        .filter(|e| !e.is_power_up())
        .filter(|e| e.position.distance_to(player) < rules.collision_radius)
        .map(|e| e.id)
        .collect();

    let mut events = Vec::with_capacity(touching.len());
    for id in touching {
        let Some(entity) = store.remove(id) else {
            continue;
        };

        match entity.kind {
            EntityKind::Collectible { rarity } => {
                let points = collectible_points(entity.value, rarity, rules);
                counters.add_score(points);
                if rarity == Rarity::Legendary {
                    counters.gain_lives(rules.legendary_life_bonus);
                }
                debug!(entity_id = id, points, score = counters.score, "collected");
                events.push(GameEvent::Collected {
                    entity_id: id,
                    label: entity.label,
                    points,
                });
            }
            EntityKind::Hazard { .. } => {
                let damage = entity.value;
                counters.lose_lives(i32::try_from(damage).unwrap_or(i32::MAX));
                debug!(entity_id = id, damage, lives = counters.lives, "hit");
                events.push(GameEvent::Hit {
                    entity_id: id,
                    label: entity.label,
                    damage,
                });
            }
            EntityKind::PowerUp { .. } => {}
        }
    }

    events
}

/// Pays for and consumes the power-up `id`, then applies its counter effects.
///
/// Hint and skip effects are returned for the session to act on. Anything that
/// is not a power-up currently on the field is a no-op, and so is a power-up
/// the player cannot afford (it stays on the field).
pub fn activate_power_up(
    store: &mut EntityStore,
    counters: &mut Counters,
    id: EntityId,
) -> Option<PowerUpEffect> {
    let cost = store.get(id).filter(|e| e.is_power_up())?.cost;
    if counters.score < cost {
        debug!(entity_id = id, cost, score = counters.score, "power-up not affordable");
        return None;
    }
    let entity = store.remove(id)?;
    let EntityKind::PowerUp { effect } = entity.kind else {
        return None;
    };
    counters.subtract_score(cost, false);

    match effect {
        PowerUpEffect::ExtendTime(seconds) => {
            counters.time_remaining = counters.time_remaining.saturating_add(seconds);
        }
        PowerUpEffect::AddScore(points) => counters.add_score(points),
        PowerUpEffect::ExtraLife => counters.gain_lives(1),
        PowerUpEffect::DoubleScore => counters.score = counters.score.saturating_mul(2),
        PowerUpEffect::RevealHint | PowerUpEffect::SkipChallenge => {}
    }

    Some(effect)
}
