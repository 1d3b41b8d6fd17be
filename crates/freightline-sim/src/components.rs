//! ECS components for the simulation core
//!
//! The closed tagged union stored by `freightline-ecs`. Competitors are
//! mirrored into the world as entities carrying profile, capability, and
//! presence components; economic value and docking state are the payload
//! kinds the wider game attaches to its own entities.

use std::collections::HashMap;

use freightline_ecs::{ComponentSet, Entity, Query, World, WorldError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::capability::CapabilityKind;
use crate::competitor::{Archetype, CompetitorPool};

/// Kind tags for the closed component union.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    Profile,
    Capabilities,
    Presence,
    EconomicValue,
    Docking,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileData {
    pub competitor: Uuid,
    pub name: String,
    pub archetype: Archetype,
}

/// Read-model of a competitor's capability proficiencies.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CapabilityReadout {
    pub proficiencies: HashMap<CapabilityKind, f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PresenceData {
    pub presence: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EconomicValueData {
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DockingData {
    pub docked: bool,
    pub berth: Option<u32>,
}

/// The closed component union for this core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Component {
    Profile(ProfileData),
    Capabilities(CapabilityReadout),
    Presence(PresenceData),
    EconomicValue(EconomicValueData),
    Docking(DockingData),
}

impl ComponentSet for Component {
    type Kind = ComponentKind;

    fn kind(&self) -> ComponentKind {
        match self {
            Component::Profile(_) => ComponentKind::Profile,
            Component::Capabilities(_) => ComponentKind::Capabilities,
            Component::Presence(_) => ComponentKind::Presence,
            Component::EconomicValue(_) => ComponentKind::EconomicValue,
            Component::Docking(_) => ComponentKind::Docking,
        }
    }
}

/// Mirror the latest competitor pool into the world, creating entities on
/// first sight and replacing components on every later call. Competitors
/// are never destroyed within a session, so entries only accumulate.
pub fn mirror_pool(
    world: &mut World<Component>,
    pool: &CompetitorPool,
    index: &mut HashMap<Uuid, Entity>,
) -> Result<(), WorldError> {
    for competitor in pool.iter() {
        let entity = *index
            .entry(competitor.id)
            .or_insert_with(|| world.create());
        world.attach(
            entity,
            Component::Profile(ProfileData {
                competitor: competitor.id,
                name: competitor.name.clone(),
                archetype: competitor.archetype,
            }),
        )?;
        let proficiencies = competitor
            .capabilities
            .iter()
            .map(|(kind, cap)| (*kind, cap.proficiency))
            .collect();
        world.attach(
            entity,
            Component::Capabilities(CapabilityReadout { proficiencies }),
        )?;
        world.attach(
            entity,
            Component::Presence(PresenceData {
                presence: competitor.market_presence,
            }),
        )?;
    }
    Ok(())
}

/// Aggregate capability view across the competitor pool, as seen through the
/// world's capability components: the best proficiency per kind and the
/// competitors holding each kind at or above a threshold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CapabilityField {
    max: HashMap<CapabilityKind, f32>,
    holders: HashMap<CapabilityKind, Vec<Uuid>>,
}

impl CapabilityField {
    /// Build the field by querying every entity carrying both a profile and
    /// a capability readout.
    pub fn gather(world: &World<Component>, threshold: f32) -> Self {
        let mut field = CapabilityField::default();
        let query = Query::new()
            .with(ComponentKind::Profile)
            .with(ComponentKind::Capabilities);
        for entity in world.query(&query) {
            let (Ok(Component::Profile(profile)), Ok(Component::Capabilities(readout))) = (
                world.component(entity, ComponentKind::Profile),
                world.component(entity, ComponentKind::Capabilities),
            ) else {
                continue;
            };
            field.record(profile.competitor, &readout.proficiencies, threshold);
        }
        field
    }

    /// Build the field straight from a pool snapshot (bypassing the world).
    pub fn from_pool(pool: &CompetitorPool, threshold: f32) -> Self {
        let mut field = CapabilityField::default();
        for competitor in pool.iter() {
            let proficiencies = competitor
                .capabilities
                .iter()
                .map(|(kind, cap)| (*kind, cap.proficiency))
                .collect();
            field.record(competitor.id, &proficiencies, threshold);
        }
        field
    }

    fn record(
        &mut self,
        competitor: Uuid,
        proficiencies: &HashMap<CapabilityKind, f32>,
        threshold: f32,
    ) {
        for kind in CapabilityKind::ALL {
            let Some(&proficiency) = proficiencies.get(&kind) else {
                continue;
            };
            let best = self.max.entry(kind).or_insert(0.0);
            if proficiency > *best {
                *best = proficiency;
            }
            if proficiency >= threshold {
                self.holders.entry(kind).or_default().push(competitor);
            }
        }
    }

    /// Best proficiency for a kind anywhere in the pool.
    pub fn max_proficiency(&self, kind: CapabilityKind) -> f32 {
        self.max.get(&kind).copied().unwrap_or(0.0)
    }

    /// Whether any competitor holds the kind at or above the threshold.
    pub fn meets(&self, kind: CapabilityKind) -> bool {
        self.holders
            .get(&kind)
            .is_some_and(|holders| !holders.is_empty())
    }

    /// Competitors holding at least one of the given kinds above the
    /// threshold, deduplicated, in capability declaration order.
    pub fn triggering(&self, kinds: &[CapabilityKind]) -> Vec<Uuid> {
        let mut out = Vec::new();
        for kind in kinds {
            if let Some(holders) = self.holders.get(kind) {
                for holder in holders {
                    if !out.contains(holder) {
                        out.push(*holder);
                    }
                }
            }
        }
        out
    }
}
