use crate::domain::entity::{EntityId, Velocity};
use crate::domain::store::EntityStore;

/// Moves every entity one tick and culls whatever fell past `exit_y`.
///
/// Targeting entities re-aim at the player before moving, keeping their speed.
/// Returns the culled ids in store order.
pub fn integrate(
    store: &mut EntityStore,
    dt: f32,
    speed_multiplier: f32,
    exit_y: f32,
) -> Vec<EntityId> {
    let player = store.player();
    let step = dt * speed_multiplier;

    for e in store.iter_mut() {
        if e.is_power_up() {
            continue;
        }

        if e.targeting {
            let dx = player.x - e.position.x;
            let dy = player.y - e.position.y;
            let distance = (dx * dx + dy * dy).sqrt();
            // Sitting on the player: keep the last heading.
            if distance > f32::EPSILON {
                e.velocity = Velocity {
                    vx: dx / distance * e.speed,
                    vy: dy / distance * e.speed,
                };
            }
        }

        e.position.x += e.velocity.vx * step;
        e.position.y += e.velocity.vy * step;
    }

    let culled: Vec<EntityId> = store
        .all()
        .iter()
        .filter(|e| e.position.y > exit_y)
        .map(|e| e.id)
        .collect();
    for id in &culled {
        store.remove(*id);
    }
    culled
}
