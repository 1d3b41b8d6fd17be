//! Freightline Bridge - The integration layer
//!
//! Composes the AI competitor, pressure, economic, and progression
//! subsystems into one deterministic ordered update cycle on top of the ECS
//! scheduler, and exposes the unified command/event surface collaborators
//! use. The [`Simulation`] object is an explicit context owned by the
//! caller; there are no process-wide singletons, so multiple simulations can
//! run side by side.

mod config;
mod simulation;
mod stages;

pub use config::{ConfigError, SimConfig, StageIntervals};
pub use simulation::{BridgeError, PendingCommands, Simulation, SystemStatus, TickContext};
