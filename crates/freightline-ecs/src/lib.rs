//! Freightline ECS - Entity Component System substrate
//!
//! A small data-oriented runtime for the simulation core. Entities are
//! generational indices, components are a closed tagged union stored in
//! dense per-kind columns, and systems run on a priority-ordered scheduler
//! that isolates per-system failures.

mod component;
mod entity;
mod query;
mod system;
mod world;

pub use component::{ComponentSet, ComponentStore};
pub use entity::{Entity, EntityRegistry};
pub use query::Query;
pub use system::{Scheduler, System, SystemError, TickReport};
pub use world::{World, WorldError};
