//! Freightline Sim - Simulation subsystems
//!
//! The domain logic that runs on top of the ECS substrate: the AI capability
//! model, the competitor pool and its evolution, competitive pressure,
//! the economic engine, and the singularity progression state machine.
//! Every bounded quantity is kept in range by clamping at the mutation site;
//! the simulation never rejects an update for being out of range.

pub mod actions;
pub mod capability;
pub mod competitor;
pub mod components;
pub mod economy;
pub mod error;
pub mod events;
pub mod pressure;
pub mod singularity;

pub use actions::{ActionClass, Effectiveness, PlayerAction, PlayerActionKind};
pub use capability::{improve, Capability, CapabilityCatalog, CapabilityDef, CapabilityKind};
pub use competitor::{Archetype, Competitor, CompetitorPool, EvolutionEngine, COMMODITIES};
pub use components::{CapabilityField, Component, ComponentKind};
pub use economy::{EconomicImpact, EconomicState, MarketHealth};
pub use error::SimError;
pub use events::{
    CompetitorEventKind, EconomicEventKind, ManipulationType, PressureEventKind, Severity,
    SimEvent,
};
pub use pressure::{relief_for, PressureSnapshot, PressureSource, PressureState};
pub use singularity::{PhaseDef, ProgressionState, SingularityPhase, SingularityProgress};
