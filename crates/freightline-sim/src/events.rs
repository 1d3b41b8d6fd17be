//! Published simulation events
//!
//! The tagged event stream collaborators consume. Events are plain data and
//! fully serializable; the bridge stages them through its cycle buffer so an
//! event produced early in a cycle is visible to later stages of the same
//! cycle before being published outward.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::singularity::SingularityPhase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Minor,
    Moderate,
    Major,
    Critical,
}

/// How a competitor is distorting a commodity market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ManipulationType {
    Pump,
    Dump,
    Stabilize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompetitorEventKind {
    CapabilityAcquired,
    MarketPrediction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PressureEventKind {
    RapidGrowth,
    ExternalPressure,
    Adaptation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EconomicEventKind {
    ImpactApplied,
    MarketUpdate,
    ManipulationFallout,
}

/// The unified event stream published to collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    PhaseTransition {
        from: SingularityPhase,
        to: SingularityPhase,
        /// Competitors whose capabilities satisfied the gate.
        triggering_competitors: Vec<Uuid>,
        tick: u64,
    },
    MarketManipulation {
        competitor: Uuid,
        commodity: String,
        manipulation: ManipulationType,
        power: f32,
    },
    Competitor {
        competitor: Uuid,
        kind: CompetitorEventKind,
        description: String,
    },
    Pressure {
        kind: PressureEventKind,
        magnitude: f32,
        description: String,
    },
    Economic {
        kind: EconomicEventKind,
        severity: Severity,
        description: String,
        impact: f32,
        affected_markets: Vec<String>,
    },
}
