//! Simulation time
//!
//! All scheduling is driven by an explicit simulation-time counter rather
//! than wall-clock timers, so tests can advance time deterministically.

use serde::{Deserialize, Serialize};

/// The simulation clock: a monotonically increasing tick counter plus
/// accumulated simulation-time seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimClock {
    /// Number of update cycles driven so far.
    pub tick: u64,
    /// Total scaled simulation time in seconds.
    pub elapsed: f64,
    /// How many simulation seconds pass per advanced second.
    pub time_scale: f32,
}

impl SimClock {
    pub fn new(time_scale: f32) -> Self {
        Self {
            tick: 0,
            elapsed: 0.0,
            time_scale: time_scale.max(0.0),
        }
    }

    /// Advance the clock by a raw delta, returning the scaled delta that
    /// subsystems should observe for this cycle.
    pub fn advance(&mut self, raw_delta: f32) -> f32 {
        self.tick += 1;
        let scaled = raw_delta.max(0.0) * self.time_scale;
        self.elapsed += scaled as f64;
        scaled
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// Accumulates advanced simulation time and reports how many whole periods
/// have elapsed. Each subsystem declares its update interval through one of
/// these instead of owning a wall-clock loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalTimer {
    period: f32,
    accumulator: f32,
}

impl IntervalTimer {
    /// Create a timer firing every `period` simulation seconds. A period of
    /// zero or less fires exactly once per `advance` call.
    pub fn new(period: f32) -> Self {
        Self {
            period,
            accumulator: 0.0,
        }
    }

    pub fn period(&self) -> f32 {
        self.period
    }

    /// Advance by `delta` simulation seconds and return the number of
    /// periods that became due.
    pub fn advance(&mut self, delta: f32) -> u32 {
        if self.period <= 0.0 {
            return 1;
        }
        self.accumulator += delta.max(0.0);
        let mut fires = 0;
        while self.accumulator >= self.period {
            self.accumulator -= self.period;
            fires += 1;
        }
        fires
    }

    /// Drop any accumulated partial progress.
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_advances_deterministically() {
        let mut clock = SimClock::new(2.0);
        let scaled = clock.advance(0.5);
        assert_eq!(scaled, 1.0);
        assert_eq!(clock.tick, 1);
        assert_eq!(clock.elapsed, 1.0);
    }

    #[test]
    fn negative_delta_is_ignored() {
        let mut clock = SimClock::default();
        let scaled = clock.advance(-1.0);
        assert_eq!(scaled, 0.0);
        assert_eq!(clock.tick, 1);
    }

    #[test]
    fn interval_timer_fires_on_whole_periods() {
        let mut timer = IntervalTimer::new(1.0);
        assert_eq!(timer.advance(0.5), 0);
        assert_eq!(timer.advance(0.5), 1);
        assert_eq!(timer.advance(2.0), 2);
    }

    #[test]
    fn zero_period_fires_every_advance() {
        let mut timer = IntervalTimer::new(0.0);
        assert_eq!(timer.advance(0.1), 1);
        assert_eq!(timer.advance(0.0), 1);
    }
}
