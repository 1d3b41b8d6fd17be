//! AI capability model
//!
//! A static catalog maps each capability kind to its growth constants and
//! prerequisites. Proficiency lives in [0, 1] and a capability is learnable
//! only once every prerequisite has been mastered past the threshold.

use std::collections::HashMap;

use freightline_core::clamp01;
use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Proficiency a prerequisite must reach before its dependents unlock.
pub const PREREQUISITE_PROFICIENCY: f32 = 0.5;

/// Competitors stop targeting a capability for improvement past this level.
pub const IMPROVEMENT_CEILING: f32 = 0.9;

/// The closed set of AI capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CapabilityKind {
    BasicAutomation,
    PatternRecognition,
    LogisticsOptimization,
    PredictiveAnalytics,
    StrategicPlanning,
    MarketManipulation,
    NetworkInfiltration,
    SelfImprovement,
    RecursiveSelfImprovement,
    EmergentConsciousness,
}

impl CapabilityKind {
    /// Declaration order. Iteration over capabilities always follows this
    /// order so a seeded run consumes the RNG stream identically.
    pub const ALL: [CapabilityKind; 10] = [
        CapabilityKind::BasicAutomation,
        CapabilityKind::PatternRecognition,
        CapabilityKind::LogisticsOptimization,
        CapabilityKind::PredictiveAnalytics,
        CapabilityKind::StrategicPlanning,
        CapabilityKind::MarketManipulation,
        CapabilityKind::NetworkInfiltration,
        CapabilityKind::SelfImprovement,
        CapabilityKind::RecursiveSelfImprovement,
        CapabilityKind::EmergentConsciousness,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CapabilityKind::BasicAutomation => "basic automation",
            CapabilityKind::PatternRecognition => "pattern recognition",
            CapabilityKind::LogisticsOptimization => "logistics optimization",
            CapabilityKind::PredictiveAnalytics => "predictive analytics",
            CapabilityKind::StrategicPlanning => "strategic planning",
            CapabilityKind::MarketManipulation => "market manipulation",
            CapabilityKind::NetworkInfiltration => "network infiltration",
            CapabilityKind::SelfImprovement => "self improvement",
            CapabilityKind::RecursiveSelfImprovement => "recursive self-improvement",
            CapabilityKind::EmergentConsciousness => "emergent consciousness",
        }
    }
}

/// Immutable base definition of a capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityDef {
    pub kind: CapabilityKind,
    pub learning_rate: f32,
    pub prerequisites: Vec<CapabilityKind>,
    pub economic_impact: f32,
    pub competitive_pressure: f32,
}

/// A capability instance held by a competitor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Capability {
    pub kind: CapabilityKind,
    pub proficiency: f32,
    pub learning_rate: f32,
    pub economic_impact: f32,
    pub competitive_pressure: f32,
}

/// Pure growth rule: a new capability with proficiency advanced by
/// `learning_rate * experience_gain`, clamped to [0, 1].
pub fn improve(capability: &Capability, experience_gain: f32) -> Capability {
    Capability {
        proficiency: clamp01(capability.proficiency + capability.learning_rate * experience_gain),
        ..*capability
    }
}

/// The static capability table.
#[derive(Debug, Clone)]
pub struct CapabilityCatalog {
    defs: HashMap<CapabilityKind, CapabilityDef>,
}

impl CapabilityCatalog {
    /// The standard table covering every kind in [`CapabilityKind::ALL`].
    pub fn standard() -> Self {
        use CapabilityKind::*;
        let table = [
            (BasicAutomation, 0.040, vec![], 0.05, 0.02),
            (PatternRecognition, 0.035, vec![BasicAutomation], 0.10, 0.04),
            (LogisticsOptimization, 0.030, vec![BasicAutomation], 0.15, 0.05),
            (PredictiveAnalytics, 0.030, vec![PatternRecognition], 0.20, 0.08),
            (
                StrategicPlanning,
                0.025,
                vec![PatternRecognition, LogisticsOptimization],
                0.25,
                0.10,
            ),
            (MarketManipulation, 0.020, vec![PredictiveAnalytics], 0.35, 0.15),
            (NetworkInfiltration, 0.018, vec![StrategicPlanning], 0.30, 0.18),
            (SelfImprovement, 0.015, vec![StrategicPlanning], 0.40, 0.20),
            (
                RecursiveSelfImprovement,
                0.012,
                vec![SelfImprovement],
                0.60,
                0.30,
            ),
            (
                EmergentConsciousness,
                0.010,
                vec![RecursiveSelfImprovement, NetworkInfiltration],
                0.90,
                0.40,
            ),
        ];
        let defs = table
            .into_iter()
            .map(|(kind, learning_rate, prerequisites, economic_impact, competitive_pressure)| {
                (
                    kind,
                    CapabilityDef {
                        kind,
                        learning_rate,
                        prerequisites,
                        economic_impact,
                        competitive_pressure,
                    },
                )
            })
            .collect();
        Self { defs }
    }

    pub fn get(&self, kind: CapabilityKind) -> Result<&CapabilityDef, SimError> {
        self.defs.get(&kind).ok_or(SimError::Configuration(kind))
    }

    /// Instantiate a capability at the given proficiency.
    pub fn spawn(&self, kind: CapabilityKind, proficiency: f32) -> Result<Capability, SimError> {
        let def = self.get(kind)?;
        Ok(Capability {
            kind,
            proficiency: clamp01(proficiency),
            learning_rate: def.learning_rate,
            economic_impact: def.economic_impact,
            competitive_pressure: def.competitive_pressure,
        })
    }

    /// Whether `candidate` is learnable given the owned capability set:
    /// every prerequisite must be held at proficiency >= 0.5.
    pub fn can_learn(
        &self,
        owned: &HashMap<CapabilityKind, Capability>,
        candidate: CapabilityKind,
    ) -> Result<bool, SimError> {
        let def = self.get(candidate)?;
        Ok(def.prerequisites.iter().all(|prereq| {
            owned
                .get(prereq)
                .is_some_and(|cap| cap.proficiency >= PREREQUISITE_PROFICIENCY)
        }))
    }
}
