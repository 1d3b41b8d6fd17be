//! Entity identity
//!
//! Entities carry no data of their own: they are generational handles into
//! the component columns. Destroyed slots are recycled with a bumped
//! generation so stale handles can never resolve.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A generational entity handle.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity {
    index: u32,
    generation: u32,
}

impl Entity {
    /// Build an entity from raw parts (mainly for tests).
    pub fn from_raw(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// The slot index of this entity.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// The generation of the slot when this handle was issued.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({}v{})", self.index, self.generation)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct Slot {
    generation: u32,
    alive: bool,
}

/// Issues and recycles entity identities with liveness tracking.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct EntityRegistry {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh entity, reusing a freed slot when one is available.
    pub fn create(&mut self) -> Entity {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.alive = true;
            Entity {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                alive: true,
            });
            Entity {
                index,
                generation: 0,
            }
        }
    }

    /// Mark an entity dead and recycle its slot. Idempotent: destroying an
    /// already-dead or stale handle returns `false` and changes nothing.
    pub fn destroy(&mut self, entity: Entity) -> bool {
        let Some(slot) = self.slots.get_mut(entity.index as usize) else {
            return false;
        };
        if !slot.alive || slot.generation != entity.generation {
            return false;
        }
        slot.alive = false;
        slot.generation += 1;
        self.free.push(entity.index);
        self.live -= 1;
        true
    }

    /// O(1) liveness check.
    pub fn exists(&self, entity: Entity) -> bool {
        self.slots
            .get(entity.index as usize)
            .is_some_and(|slot| slot.alive && slot.generation == entity.generation)
    }

    /// Resolve a raw slot index to a live entity handle.
    pub fn entity_at(&self, index: u32) -> Option<Entity> {
        let slot = self.slots.get(index as usize)?;
        slot.alive.then_some(Entity {
            index,
            generation: slot.generation,
        })
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_issues_unique_live_entities() {
        let mut registry = EntityRegistry::new();
        let a = registry.create();
        let b = registry.create();
        assert_ne!(a, b);
        assert!(registry.exists(a));
        assert!(registry.exists(b));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn destroy_is_idempotent() {
        let mut registry = EntityRegistry::new();
        let a = registry.create();
        assert!(registry.destroy(a));
        assert!(!registry.destroy(a));
        assert!(!registry.exists(a));
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn recycled_slot_gets_new_generation() {
        let mut registry = EntityRegistry::new();
        let a = registry.create();
        registry.destroy(a);
        let b = registry.create();
        assert_eq!(a.index(), b.index());
        assert_ne!(a.generation(), b.generation());
        assert!(!registry.exists(a));
        assert!(registry.exists(b));
    }
}
