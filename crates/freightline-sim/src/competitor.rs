//! AI competitors
//!
//! One competitor is created per archetype at session start and never
//! destroyed within a session. Each evolution tick mutates every competitor
//! independently and merges the results into a single replacement pool
//! snapshot, so readers never observe a half-evolved pool.

use std::collections::HashMap;

use freightline_core::clamp01;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::capability::{
    improve, Capability, CapabilityCatalog, CapabilityKind, IMPROVEMENT_CEILING,
};
use crate::error::SimError;
use crate::events::{CompetitorEventKind, ManipulationType, SimEvent};

/// Commodities competitors can manipulate.
pub const COMMODITIES: [&str; 6] = [
    "fuel",
    "electronics",
    "machinery",
    "grain",
    "container_freight",
    "rare_minerals",
];

/// Proficiency a competitor needs before it starts acting on a capability.
pub const ACTION_PROFICIENCY: f32 = 0.5;

/// Competitor personalities. Exactly one competitor exists per archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    AggressiveExpansion,
    CostOptimizer,
    TechPioneer,
    MarketPredator,
    SilentNetwork,
}

impl Archetype {
    pub const ALL: [Archetype; 5] = [
        Archetype::AggressiveExpansion,
        Archetype::CostOptimizer,
        Archetype::TechPioneer,
        Archetype::MarketPredator,
        Archetype::SilentNetwork,
    ];

    pub fn company_name(&self) -> &'static str {
        match self {
            Archetype::AggressiveExpansion => "Meridian Freight Systems",
            Archetype::CostOptimizer => "Ledger & Lane Logistics",
            Archetype::TechPioneer => "Helix Cargo Intelligence",
            Archetype::MarketPredator => "Blackwater Shipping Group",
            Archetype::SilentNetwork => "Quiet Harbor Holdings",
        }
    }

    /// The single capability each archetype starts with, at low proficiency.
    pub fn starting_capability(&self) -> CapabilityKind {
        CapabilityKind::BasicAutomation
    }

    /// Capabilities this archetype prefers to grow first.
    pub fn specializations(&self) -> &'static [CapabilityKind] {
        use CapabilityKind::*;
        match self {
            Archetype::AggressiveExpansion => {
                &[LogisticsOptimization, StrategicPlanning, MarketManipulation]
            }
            Archetype::CostOptimizer => {
                &[BasicAutomation, LogisticsOptimization, PredictiveAnalytics]
            }
            Archetype::TechPioneer => &[
                PatternRecognition,
                PredictiveAnalytics,
                SelfImprovement,
                RecursiveSelfImprovement,
            ],
            Archetype::MarketPredator => {
                &[PredictiveAnalytics, MarketManipulation, StrategicPlanning]
            }
            Archetype::SilentNetwork => {
                &[StrategicPlanning, NetworkInfiltration, EmergentConsciousness]
            }
        }
    }
}

/// One AI competitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    pub id: Uuid,
    pub archetype: Archetype,
    pub name: String,
    pub capabilities: HashMap<CapabilityKind, Capability>,
    /// Share of the market this competitor controls, in [0, 1].
    pub market_presence: f32,
    pub experience: f32,
}

impl Competitor {
    /// Proficiency in a capability, zero when not yet learned.
    pub fn proficiency(&self, kind: CapabilityKind) -> f32 {
        self.capabilities
            .get(&kind)
            .map(|cap| cap.proficiency)
            .unwrap_or(0.0)
    }

    /// Aggregate power: sum of proficiency x (1 + economic impact) over all
    /// capabilities, iterated in declaration order.
    pub fn aggregate_power(&self) -> f32 {
        CapabilityKind::ALL
            .iter()
            .filter_map(|kind| self.capabilities.get(kind))
            .map(|cap| cap.proficiency * (1.0 + cap.economic_impact))
            .sum()
    }
}

/// The full competitor pool snapshot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompetitorPool {
    competitors: Vec<Competitor>,
}

impl CompetitorPool {
    pub fn new(competitors: Vec<Competitor>) -> Self {
        Self { competitors }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Competitor> {
        self.competitors.iter()
    }

    pub fn get(&self, id: Uuid) -> Option<&Competitor> {
        self.competitors.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.competitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.competitors.is_empty()
    }

    /// The competitor with the highest aggregate power.
    pub fn strongest(&self) -> Option<&Competitor> {
        self.competitors.iter().max_by(|a, b| {
            a.aggregate_power()
                .partial_cmp(&b.aggregate_power())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    }

    /// Highest proficiency in a capability across the pool.
    pub fn max_proficiency(&self, kind: CapabilityKind) -> f32 {
        self.competitors
            .iter()
            .map(|c| c.proficiency(kind))
            .fold(0.0, f32::max)
    }
}

/// Drives competitor evolution and market actions.
#[derive(Debug, Clone)]
pub struct EvolutionEngine {
    catalog: CapabilityCatalog,
    /// Chance per evolution tick that a competitor studies a capability.
    pub learning_probability: f32,
    /// Chance per action tick of a manipulation attempt, given proficiency.
    pub manipulation_probability: f32,
    /// Chance per action tick of a prediction broadcast, given proficiency.
    pub prediction_probability: f32,
    /// Experience every competitor gains every tick regardless of learning.
    pub passive_experience: f32,
    /// Scales aggregate-power deltas into market presence movement.
    pub presence_scale: f32,
}

impl EvolutionEngine {
    pub fn new(catalog: CapabilityCatalog) -> Self {
        Self {
            catalog,
            learning_probability: 0.25,
            manipulation_probability: 0.2,
            prediction_probability: 0.15,
            passive_experience: 0.05,
            presence_scale: 0.08,
        }
    }

    pub fn catalog(&self) -> &CapabilityCatalog {
        &self.catalog
    }

    /// Create the session's competitor pool: one competitor per archetype,
    /// each holding a single low-proficiency starting capability.
    pub fn seed_pool<R: Rng>(&self, rng: &mut R) -> Result<CompetitorPool, SimError> {
        let mut competitors = Vec::with_capacity(Archetype::ALL.len());
        for archetype in Archetype::ALL {
            let start = archetype.starting_capability();
            let proficiency = 0.08 + rng.gen_range(0.0..0.04);
            let capability = self.catalog.spawn(start, proficiency)?;
            let mut capabilities = HashMap::new();
            capabilities.insert(start, capability);
            competitors.push(Competitor {
                id: Uuid::new_v4(),
                archetype,
                name: archetype.company_name().to_string(),
                capabilities,
                market_presence: 0.1,
                experience: 0.0,
            });
        }
        Ok(CompetitorPool::new(competitors))
    }

    /// One evolution tick: every competitor evolves independently and the
    /// results merge into a single replacement pool.
    pub fn evolve<R: Rng>(
        &self,
        pool: &CompetitorPool,
        rng: &mut R,
    ) -> Result<(CompetitorPool, Vec<SimEvent>), SimError> {
        let mut next = Vec::with_capacity(pool.len());
        let mut events = Vec::new();

        for competitor in pool.iter() {
            let mut c = competitor.clone();
            let power_before = c.aggregate_power();

            c.experience += self.passive_experience;

            if rng.gen::<f32>() < self.learning_probability {
                if let Some(kind) = self.select_target(&c, rng)? {
                    let newly_acquired = !c.capabilities.contains_key(&kind);
                    let current = match c.capabilities.get(&kind) {
                        Some(cap) => *cap,
                        None => self.catalog.spawn(kind, 0.0)?,
                    };
                    let gain = rng.gen_range(0.5..1.5);
                    c.capabilities.insert(kind, improve(&current, gain));
                    if newly_acquired {
                        debug!(competitor = %c.name, capability = kind.label(), "capability acquired");
                        events.push(SimEvent::Competitor {
                            competitor: c.id,
                            kind: CompetitorEventKind::CapabilityAcquired,
                            description: format!("{} acquired {}", c.name, kind.label()),
                        });
                    }
                }
            }

            let power_after = c.aggregate_power();
            c.market_presence =
                clamp01(c.market_presence + (power_after - power_before) * self.presence_scale);
            next.push(c);
        }

        Ok((CompetitorPool::new(next), events))
    }

    /// Pick the capability a competitor studies this tick: the archetype's
    /// specialization list first, falling back to any capability whose
    /// prerequisites are satisfied and proficiency is still below the
    /// improvement ceiling.
    fn select_target<R: Rng>(
        &self,
        competitor: &Competitor,
        rng: &mut R,
    ) -> Result<Option<CapabilityKind>, SimError> {
        let mut candidates =
            self.learnable_among(competitor, competitor.archetype.specializations())?;
        if candidates.is_empty() {
            candidates = self.learnable_among(competitor, &CapabilityKind::ALL)?;
        }
        if candidates.is_empty() {
            return Ok(None);
        }
        let pick = rng.gen_range(0..candidates.len());
        Ok(Some(candidates[pick]))
    }

    fn learnable_among(
        &self,
        competitor: &Competitor,
        kinds: &[CapabilityKind],
    ) -> Result<Vec<CapabilityKind>, SimError> {
        let mut out = Vec::new();
        for &kind in kinds {
            if competitor.proficiency(kind) < IMPROVEMENT_CEILING
                && self.catalog.can_learn(&competitor.capabilities, kind)?
            {
                out.push(kind);
            }
        }
        Ok(out)
    }

    /// One action tick: sufficiently capable competitors may manipulate a
    /// commodity market or broadcast a market prediction.
    pub fn act<R: Rng>(&self, pool: &CompetitorPool, rng: &mut R) -> Vec<SimEvent> {
        let mut events = Vec::new();
        for c in pool.iter() {
            let manipulation_skill = c.proficiency(CapabilityKind::MarketManipulation);
            if manipulation_skill > ACTION_PROFICIENCY
                && rng.gen::<f32>() < self.manipulation_probability
            {
                let commodity = COMMODITIES[rng.gen_range(0..COMMODITIES.len())];
                let manipulation = match rng.gen_range(0..3u8) {
                    0 => ManipulationType::Pump,
                    1 => ManipulationType::Dump,
                    _ => ManipulationType::Stabilize,
                };
                let power = manipulation_skill * (0.5 + 0.5 * c.market_presence);
                debug!(competitor = %c.name, commodity, ?manipulation, power, "market manipulation");
                events.push(SimEvent::MarketManipulation {
                    competitor: c.id,
                    commodity: commodity.to_string(),
                    manipulation,
                    power,
                });
            }

            let prediction_skill = c.proficiency(CapabilityKind::PredictiveAnalytics);
            if prediction_skill > ACTION_PROFICIENCY
                && rng.gen::<f32>() < self.prediction_probability
            {
                events.push(SimEvent::Competitor {
                    competitor: c.id,
                    kind: CompetitorEventKind::MarketPrediction,
                    description: format!(
                        "{} published a market forecast (confidence {:.0}%)",
                        c.name,
                        prediction_skill * 100.0
                    ),
                });
            }
        }
        events
    }
}
