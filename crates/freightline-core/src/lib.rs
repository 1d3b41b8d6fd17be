//! Freightline Core - Foundational types for the Freightline simulation
//!
//! This crate provides the building blocks shared by every simulation
//! subsystem:
//! - Simulation clock and interval timers (explicit sim-time, no wall clocks)
//! - Scalar clamping helpers for bounded numeric state
//! - Fixed-capacity history ring buffers
//! - The bounded event bus with an explicit overflow policy
//! - The single-writer/multi-reader shared state container

pub mod events;
pub mod history;
pub mod scalar;
pub mod state;
pub mod time;

pub use events::{EventBus, OverflowPolicy};
pub use history::History;
pub use scalar::{clamp, clamp01};
pub use state::SharedState;
pub use time::{IntervalTimer, SimClock};
