use crate::domain::entity::{Entity, EntityId, Position};
use crate::domain::tuning::PlayerBounds;

/// Authoritative entity collection plus the player position for one session.
///
/// Entities are kept in spawn order so a tick resolves them deterministically.
#[derive(Debug, Clone)]
pub struct EntityStore {
    entities: Vec<Entity>,
    player: Position,
    bounds: PlayerBounds,
    next_id: EntityId,
}

impl EntityStore {
    pub fn new(bounds: PlayerBounds, player: Position) -> Self {
        Self {
            entities: Vec::new(),
            player: bounds.clamp(player),
            bounds,
            next_id: 1,
        }
    }

    /// Hands out ids that are never reused, even across `clear`.
    pub fn allocate_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    pub fn add(&mut self, entity: Entity) {
        debug_assert!(
            !self.contains(entity.id),
            "duplicate entity id {}",
            entity.id
        );
        self.entities.push(entity);
    }

    /// Removes the entity if present. A second call for the same id is a no-op.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let index = self.entities.iter().position(|e| e.id == id)?;
        Some(self.entities.remove(index))
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    pub fn all(&self) -> &[Entity] {
        &self.entities
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn power_up_count(&self) -> usize {
        self.entities.iter().filter(|e| e.is_power_up()).count()
    }

    pub fn clear(&mut self) {
        self.entities.clear();
    }

    pub fn player(&self) -> Position {
        self.player
    }

    pub fn bounds(&self) -> PlayerBounds {
        self.bounds
    }

    pub fn set_player_position(&mut self, position: Position) {
        self.player = self.bounds.clamp(position);
    }
}
