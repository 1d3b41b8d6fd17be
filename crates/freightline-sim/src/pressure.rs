//! Competitive pressure
//!
//! A single [0, 1] scalar aggregating how threatened the player is, grown by
//! a small constant each tick, pushed by external modifiers, and relieved by
//! player adaptation. A bounded snapshot history feeds growth-rate
//! diagnostics.

use std::collections::HashMap;

use freightline_core::{clamp, clamp01, History};
use serde::{Deserialize, Serialize};

use crate::actions::{Effectiveness, PlayerActionKind};
use crate::events::{PressureEventKind, SimEvent};

/// Baseline pressure added every pressure tick.
pub const BASE_GROWTH_PER_TICK: f32 = 0.002;

/// |growth rate| above which a rapid-growth event is emitted.
pub const GROWTH_EVENT_THRESHOLD: f32 = 0.05;

/// Largest pressure reduction a single adaptation can apply.
pub const MAX_ADAPTATION: f32 = 0.2;

/// Retained pressure snapshots.
pub const SNAPSHOT_CAPACITY: usize = 50;

/// Where external pressure comes from, with a per-source weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PressureSource {
    CompetitorGrowth,
    MarketManipulation,
    TechnologicalBreakthrough,
    EconomicDisruption,
    RegulatoryShift,
}

impl PressureSource {
    pub fn multiplier(&self) -> f32 {
        match self {
            PressureSource::CompetitorGrowth => 1.0,
            PressureSource::MarketManipulation => 1.4,
            PressureSource::TechnologicalBreakthrough => 1.2,
            PressureSource::EconomicDisruption => 1.1,
            PressureSource::RegulatoryShift => 0.8,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PressureSource::CompetitorGrowth => "competitor growth",
            PressureSource::MarketManipulation => "market manipulation",
            PressureSource::TechnologicalBreakthrough => "technological breakthrough",
            PressureSource::EconomicDisruption => "economic disruption",
            PressureSource::RegulatoryShift => "regulatory shift",
        }
    }
}

/// One retained pressure reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PressureSnapshot {
    pub tick: u64,
    pub total: f32,
    pub growth_rate: f32,
}

/// The pressure subsystem state. Published whole via copy-and-replace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PressureState {
    pub total: f32,
    pub growth_rate: f32,
    pub by_source: HashMap<PressureSource, f32>,
    history: History<PressureSnapshot>,
}

impl PressureState {
    pub fn new() -> Self {
        Self {
            total: 0.05,
            growth_rate: 0.0,
            by_source: HashMap::new(),
            history: History::new(SNAPSHOT_CAPACITY),
        }
    }

    /// One pressure tick: grow by the base constant, recompute the growth
    /// rate, and emit an event when growth is abrupt.
    pub fn tick(&mut self, now: u64) -> Option<SimEvent> {
        let previous = self.total;
        self.total = clamp01(self.total + BASE_GROWTH_PER_TICK);
        self.growth_rate = if previous > 0.0 {
            (self.total - previous) / previous
        } else {
            0.0
        };
        self.history.push(PressureSnapshot {
            tick: now,
            total: self.total,
            growth_rate: self.growth_rate,
        });

        (self.growth_rate.abs() > GROWTH_EVENT_THRESHOLD).then(|| SimEvent::Pressure {
            kind: PressureEventKind::RapidGrowth,
            magnitude: self.growth_rate,
            description: format!(
                "competitive pressure moving at {:+.1}% per tick",
                self.growth_rate * 100.0
            ),
        })
    }

    /// Add externally sourced pressure, weighted by the source multiplier.
    pub fn apply_modifier(&mut self, source: PressureSource, magnitude: f32) -> SimEvent {
        let delta = magnitude * source.multiplier();
        self.total = clamp01(self.total + delta);
        *self.by_source.entry(source).or_insert(0.0) += delta;
        SimEvent::Pressure {
            kind: PressureEventKind::ExternalPressure,
            magnitude: delta,
            description: format!("pressure from {}", source.label()),
        }
    }

    /// Relieve pressure through player adaptation. The reduction is capped
    /// at [`MAX_ADAPTATION`] per call.
    pub fn apply_adaptation(&mut self, amount: f32) -> SimEvent {
        let applied = clamp(amount, 0.0, MAX_ADAPTATION);
        self.total = clamp01(self.total - applied);
        SimEvent::Pressure {
            kind: PressureEventKind::Adaptation,
            magnitude: -applied,
            description: format!("player adaptation relieved {applied:.3} pressure"),
        }
    }

    pub fn history(&self) -> &History<PressureSnapshot> {
        &self.history
    }
}

impl Default for PressureState {
    fn default() -> Self {
        Self::new()
    }
}

/// Pure relief lookup: how much pressure a player action can relieve, before
/// the adaptation cap.
pub fn relief_for(kind: PlayerActionKind, effectiveness: Effectiveness) -> f32 {
    kind.base_relief() * effectiveness.multiplier()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pressure_stays_in_unit_interval() {
        let mut state = PressureState::new();
        for tick in 0..2000 {
            state.tick(tick);
            assert!((0.0..=1.0).contains(&state.total));
        }
        // Long enough to saturate.
        assert_eq!(state.total, 1.0);
    }

    #[test]
    fn abrupt_growth_emits_an_event() {
        let mut state = PressureState::new();
        state.total = 0.01;
        let event = state.tick(1);
        match event {
            Some(SimEvent::Pressure {
                kind: PressureEventKind::RapidGrowth,
                magnitude,
                ..
            }) => assert!(magnitude > GROWTH_EVENT_THRESHOLD),
            other => panic!("expected rapid growth event, got {other:?}"),
        }
    }

    #[test]
    fn steady_growth_is_silent() {
        let mut state = PressureState::new();
        state.total = 0.5;
        assert!(state.tick(1).is_none());
    }

    #[test]
    fn growth_rate_is_zero_from_zero() {
        let mut state = PressureState::new();
        state.total = 0.0;
        state.tick(1);
        assert_eq!(state.growth_rate, 0.0);
    }

    #[test]
    fn modifier_applies_source_multiplier() {
        let mut state = PressureState::new();
        let before = state.total;
        state.apply_modifier(PressureSource::MarketManipulation, 0.1);
        let expected = before + 0.1 * PressureSource::MarketManipulation.multiplier();
        assert!((state.total - expected).abs() < 1e-6);
        assert!(state.by_source[&PressureSource::MarketManipulation] > 0.0);
    }

    #[test]
    fn adaptation_is_capped() {
        let mut state = PressureState::new();
        state.total = 0.9;
        state.apply_adaptation(5.0);
        assert!((state.total - (0.9 - MAX_ADAPTATION)).abs() < 1e-6);

        // Negative adaptation never adds pressure.
        let before = state.total;
        state.apply_adaptation(-1.0);
        assert_eq!(state.total, before);
    }

    #[test]
    fn relief_is_base_times_multiplier_for_every_pair() {
        for kind in PlayerActionKind::ALL {
            for eff in Effectiveness::ALL {
                assert_eq!(
                    relief_for(kind, eff),
                    kind.base_relief() * eff.multiplier()
                );
            }
        }
    }

    #[test]
    fn history_is_bounded() {
        let mut state = PressureState::new();
        for tick in 0..200 {
            state.tick(tick);
        }
        assert_eq!(state.history().len(), SNAPSHOT_CAPACITY);
        assert_eq!(state.history().latest().unwrap().tick, 199);
    }
}
