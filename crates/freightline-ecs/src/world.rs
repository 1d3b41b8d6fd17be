//! The world: entity registry plus component store
//!
//! Component access against a dead or never-issued entity handle surfaces a
//! structural error to the caller; it is the one place the substrate rejects
//! instead of clamping.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::component::{ComponentSet, ComponentStore};
use crate::entity::{Entity, EntityRegistry};
use crate::query::Query;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum WorldError {
    #[error("entity {0:?} does not exist or has been destroyed")]
    DeadEntity(Entity),

    #[error("entity {entity:?} has no {kind} component")]
    MissingComponent { entity: Entity, kind: String },
}

/// Owns all entities and their components.
pub struct World<C: ComponentSet> {
    entities: EntityRegistry,
    components: ComponentStore<C>,
}

impl<C: ComponentSet> World<C> {
    pub fn new() -> Self {
        Self {
            entities: EntityRegistry::new(),
            components: ComponentStore::new(),
        }
    }

    /// Create a new live entity with no components.
    pub fn create(&mut self) -> Entity {
        self.entities.create()
    }

    /// Destroy an entity, removing all its components immediately.
    /// Idempotent on an already-dead handle.
    pub fn destroy(&mut self, entity: Entity) -> bool {
        if !self.entities.destroy(entity) {
            return false;
        }
        self.components.clear_entity(entity.index());
        true
    }

    pub fn exists(&self, entity: Entity) -> bool {
        self.entities.exists(entity)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Attach a component, replacing any existing component of its kind.
    pub fn attach(&mut self, entity: Entity, component: C) -> Result<(), WorldError> {
        if !self.entities.exists(entity) {
            return Err(WorldError::DeadEntity(entity));
        }
        self.components.attach(entity.index(), component);
        Ok(())
    }

    /// Remove and return the component of the given kind, if present.
    pub fn detach(&mut self, entity: Entity, kind: C::Kind) -> Result<Option<C>, WorldError> {
        if !self.entities.exists(entity) {
            return Err(WorldError::DeadEntity(entity));
        }
        Ok(self.components.detach(entity.index(), kind))
    }

    /// Borrow the component of the given kind.
    pub fn component(&self, entity: Entity, kind: C::Kind) -> Result<&C, WorldError> {
        if !self.entities.exists(entity) {
            return Err(WorldError::DeadEntity(entity));
        }
        self.components
            .get(entity.index(), kind)
            .ok_or_else(|| WorldError::MissingComponent {
                entity,
                kind: format!("{kind:?}"),
            })
    }

    /// Mutably borrow the component of the given kind.
    pub fn component_mut(&mut self, entity: Entity, kind: C::Kind) -> Result<&mut C, WorldError> {
        if !self.entities.exists(entity) {
            return Err(WorldError::DeadEntity(entity));
        }
        self.components
            .get_mut(entity.index(), kind)
            .ok_or_else(|| WorldError::MissingComponent {
                entity,
                kind: format!("{kind:?}"),
            })
    }

    /// Entities matching a required/excluded kind predicate.
    pub fn query(&self, query: &Query<C::Kind>) -> Vec<Entity> {
        self.components
            .matching(query.required(), query.excluded())
            .into_iter()
            .filter_map(|index| self.entities.entity_at(index))
            .collect()
    }
}

impl<C: ComponentSet> Default for World<C> {
    fn default() -> Self {
        Self::new()
    }
}
