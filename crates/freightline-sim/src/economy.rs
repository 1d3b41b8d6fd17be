//! Economic engine
//!
//! Global market state with bounded impact application. Impacts can never
//! push a metric out of its domain: the engine clamps at every mutation and
//! reclassifies market health afterwards. External market feeds produce
//! notifications only, with no state change.

use freightline_core::{clamp, clamp01};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::events::{EconomicEventKind, Severity, SimEvent};

/// Inflation is allowed to run between mild deflation and severe inflation.
pub const INFLATION_MIN: f32 = -0.1;
pub const INFLATION_MAX: f32 = 0.5;

/// Coarse classification of the market, derived from the numeric state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketHealth {
    Booming,
    Stable,
    Strained,
    Recession,
    Collapse,
}

/// A bounded change request against the economic state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomicImpact {
    /// Fractional change to total market value (-0.02 = a 2% contraction).
    pub gdp_change: f32,
    pub inflation_change: f32,
    pub unemployment_change: f32,
    pub volatility_change: f32,
    pub severity: Severity,
    pub description: String,
    pub affected_markets: Vec<String>,
}

/// Global economic state. Published whole via copy-and-replace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomicState {
    pub total_market_value: f64,
    pub volatility: f32,
    pub unemployment_rate: f32,
    pub inflation_rate: f32,
    pub health: MarketHealth,
}

impl EconomicState {
    pub fn new(initial_market_value: f64) -> Self {
        let mut state = Self {
            total_market_value: initial_market_value.max(0.0),
            volatility: 0.15,
            unemployment_rate: 0.05,
            inflation_rate: 0.02,
            health: MarketHealth::Stable,
        };
        state.health = state.classify();
        state
    }

    /// Apply a bounded impact and emit the matching notification. Every
    /// field is clamped to its domain; an over-large contraction bottoms out
    /// at zero market value instead of going negative.
    pub fn apply_impact(&mut self, impact: &EconomicImpact) -> SimEvent {
        self.total_market_value =
            (self.total_market_value * (1.0 + impact.gdp_change as f64)).max(0.0);
        self.inflation_rate = clamp(
            self.inflation_rate + impact.inflation_change,
            INFLATION_MIN,
            INFLATION_MAX,
        );
        self.unemployment_rate = clamp01(self.unemployment_rate + impact.unemployment_change);
        self.volatility = clamp01(self.volatility + impact.volatility_change);
        self.health = self.classify();

        debug!(
            market_value = self.total_market_value,
            health = ?self.health,
            "economic impact applied"
        );
        SimEvent::Economic {
            kind: EconomicEventKind::ImpactApplied,
            severity: impact.severity,
            description: impact.description.clone(),
            impact: impact.gdp_change,
            affected_markets: impact.affected_markets.clone(),
        }
    }

    /// Notification for an external market feed update. No state mutation:
    /// the feed models conditions the engine observes, not controls.
    pub fn market_update(&self, market_id: &str, price_change: f32, volume_change: f32) -> SimEvent {
        let severity = if price_change.abs() > 0.2 {
            Severity::Major
        } else if price_change.abs() > 0.08 {
            Severity::Moderate
        } else {
            Severity::Minor
        };
        SimEvent::Economic {
            kind: EconomicEventKind::MarketUpdate,
            severity,
            description: format!(
                "{market_id}: price {:+.1}%, volume {:+.1}%",
                price_change * 100.0,
                volume_change * 100.0
            ),
            impact: price_change,
            affected_markets: vec![market_id.to_string()],
        }
    }

    /// Read-only projection of the current state.
    pub fn summary(&self) -> EconomicState {
        self.clone()
    }

    fn classify(&self) -> MarketHealth {
        if self.total_market_value <= 0.0 || self.unemployment_rate > 0.35 || self.volatility > 0.9
        {
            MarketHealth::Collapse
        } else if self.unemployment_rate > 0.2
            || self.inflation_rate > 0.3
            || self.volatility > 0.7
        {
            MarketHealth::Recession
        } else if self.unemployment_rate > 0.12
            || self.inflation_rate > 0.15
            || self.volatility > 0.5
        {
            MarketHealth::Strained
        } else if self.volatility < 0.2
            && self.unemployment_rate < 0.05
            && (0.0..0.05).contains(&self.inflation_rate)
        {
            MarketHealth::Booming
        } else {
            MarketHealth::Stable
        }
    }
}
