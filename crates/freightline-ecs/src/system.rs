//! System scheduling
//!
//! Systems register with an explicit priority and an update interval in
//! simulation-time units. Each tick the scheduler runs due systems in
//! ascending priority order (registration order breaks ties) and catches
//! failures at the scheduler boundary: one failing system never prevents the
//! rest of the tick from running.

use std::panic::{self, AssertUnwindSafe};

use freightline_core::IntervalTimer;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

/// Error returned by a system tick. Caught and logged by the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("system failure: {0}")]
pub struct SystemError(pub String);

impl SystemError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A logic unit run by the scheduler against a caller-supplied context.
pub trait System<C>: Send + Sync {
    fn name(&self) -> &'static str;

    /// Run one update. `dt` is the simulation-time span this firing covers.
    fn run(&mut self, ctx: &mut C, dt: f32) -> Result<(), SystemError>;
}

struct Registered<C> {
    system: Box<dyn System<C>>,
    priority: i32,
    timer: IntervalTimer,
    order: usize,
}

/// Outcome of one scheduler tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    /// System firings that completed normally.
    pub executed: u32,
    /// Firings that returned an error or panicked.
    pub failed: u32,
}

/// Priority-ordered system scheduler with per-system failure isolation.
pub struct Scheduler<C> {
    systems: Vec<Registered<C>>,
    next_order: usize,
}

impl<C> Scheduler<C> {
    pub fn new() -> Self {
        Self {
            systems: Vec::new(),
            next_order: 0,
        }
    }

    /// Register a system. Lower priorities run first; systems sharing a
    /// priority run in registration order. `interval` is the system's update
    /// period in simulation seconds (zero runs every tick).
    pub fn register<S: System<C> + 'static>(&mut self, system: S, priority: i32, interval: f32) {
        let order = self.next_order;
        self.next_order += 1;
        self.systems.push(Registered {
            system: Box::new(system),
            priority,
            timer: IntervalTimer::new(interval),
            order,
        });
        self.systems
            .sort_by_key(|entry| (entry.priority, entry.order));
    }

    /// Advance every system's timer by `dt` and run the due ones in priority
    /// order. A failure inside one system is logged and does not stop the
    /// others; because subsystems publish state only on success, a failed
    /// system's state stays at its last valid snapshot.
    pub fn tick(&mut self, ctx: &mut C, dt: f32) -> TickReport {
        let mut report = TickReport::default();
        for entry in &mut self.systems {
            let fires = entry.timer.advance(dt);
            let name = entry.system.name();
            let period = entry.timer.period();
            let span = if period > 0.0 { period } else { dt };
            for _ in 0..fires {
                let outcome =
                    panic::catch_unwind(AssertUnwindSafe(|| entry.system.run(ctx, span)));
                match outcome {
                    Ok(Ok(())) => report.executed += 1,
                    Ok(Err(err)) => {
                        report.failed += 1;
                        error!(system = name, %err, "system tick failed, continuing");
                    }
                    Err(_) => {
                        report.failed += 1;
                        error!(system = name, "system tick panicked, continuing");
                    }
                }
            }
        }
        report
    }

    /// Drop every registered system. Used by shutdown.
    pub fn clear(&mut self) {
        self.systems.clear();
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }
}

impl<C> Default for Scheduler<C> {
    fn default() -> Self {
        Self::new()
    }
}
