//! Dense entity storage with tombstone reuse.

use skirmish_core::{EntityKind, EntitySlot, Position};

#[derive(Clone, Debug)]
pub(crate) struct Entity {
    pub(crate) position: Position,
    pub(crate) kind: EntityKind,
    pub(crate) just_spawned: bool,
    pub(crate) dead: bool,
}

impl Entity {
    pub(crate) fn spawned(kind: EntityKind, position: Position) -> Self {
        Self {
            position,
            kind,
            just_spawned: true,
            dead: false,
        }
    }
}

/// Registry that owns every entity and hands out slots.
///
/// Dead entities stay in place as tombstones so slot numbers never shift;
/// the registry never shrinks.
#[derive(Debug)]
pub(crate) struct EntityRegistry {
    entries: Vec<Entity>,
}

impl EntityRegistry {
    /// Creates a registry holding only the player in slot zero.
    pub(crate) fn with_player(player: Entity) -> Self {
        Self {
            entries: vec![player],
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn get(&self, slot: EntitySlot) -> &Entity {
        &self.entries[slot.index()]
    }

    pub(crate) fn get_mut(&mut self, slot: EntitySlot) -> &mut Entity {
        &mut self.entries[slot.index()]
    }

    /// Stores `entity` in the first slot at or after `start` that is either
    /// past the end of the table or holds a dead entity.
    pub(crate) fn claim(&mut self, start: EntitySlot, entity: Entity) -> EntitySlot {
        assert!(
            start.index() <= self.entries.len(),
            "slot scan must start inside the registry"
        );

        let index = (start.index()..self.entries.len())
            .find(|&index| self.entries[index].dead)
            .unwrap_or(self.entries.len());
        if index == self.entries.len() {
            self.entries.push(entity);
        } else {
            self.entries[index] = entity;
        }

        let raw = u32::try_from(index).expect("entity registry exceeded u32 slots");
        EntitySlot::new(raw)
    }
}
