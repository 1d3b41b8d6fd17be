//! Singularity progression
//!
//! The narrative state machine: eight ordered phases advanced by an
//! effective rate shaped by acceleration and player resistance. A phase
//! transition additionally requires the next phase's capabilities to exist
//! somewhere in the competitor pool; until they do, phase progress holds at
//! 1.0 and is rechecked every tick, so no phase's content is ever skipped.

use freightline_core::{clamp, clamp01, History};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::actions::{ActionClass, PlayerAction};
use crate::capability::CapabilityKind;
use crate::components::CapabilityField;
use crate::events::SimEvent;

pub const PHASE_COUNT: usize = 8;

/// Proficiency a required capability must reach somewhere in the pool
/// before the gate opens.
pub const GATE_PROFICIENCY: f32 = 0.6;

/// Resistance is computed over this many most-recent actions.
pub const RESISTANCE_WINDOW: usize = 10;

/// Retained player actions.
pub const ACTION_LOG_CAPACITY: usize = 20;

pub const MAX_RESISTANCE: f32 = 0.8;

/// The eight ordered phases. `Transcendence` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SingularityPhase {
    EarlyAutomation,
    PatternMastery,
    PredictiveDominance,
    StrategicCoordination,
    MarketDominion,
    SelfDirectedGrowth,
    RecursiveAcceleration,
    Transcendence,
}

/// Immutable, data-only description of a phase.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseDef {
    /// Share of overall progress this phase nominally occupies, in (0, 1].
    pub progress_threshold: f32,
    /// Capabilities that must exist in the pool before entering this phase.
    pub required_capabilities: &'static [CapabilityKind],
    /// How hard this phase hits the economy when it begins.
    pub economic_disruption: f32,
    /// Simulation seconds the player is given to adapt.
    pub adaptation_time: f32,
}

impl SingularityPhase {
    pub const ALL: [SingularityPhase; PHASE_COUNT] = [
        SingularityPhase::EarlyAutomation,
        SingularityPhase::PatternMastery,
        SingularityPhase::PredictiveDominance,
        SingularityPhase::StrategicCoordination,
        SingularityPhase::MarketDominion,
        SingularityPhase::SelfDirectedGrowth,
        SingularityPhase::RecursiveAcceleration,
        SingularityPhase::Transcendence,
    ];

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|p| p == self).unwrap_or(0)
    }

    /// The following phase, `None` at the terminal phase.
    pub fn next(&self) -> Option<SingularityPhase> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn is_terminal(&self) -> bool {
        *self == SingularityPhase::Transcendence
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SingularityPhase::EarlyAutomation => "Early Automation",
            SingularityPhase::PatternMastery => "Pattern Mastery",
            SingularityPhase::PredictiveDominance => "Predictive Dominance",
            SingularityPhase::StrategicCoordination => "Strategic Coordination",
            SingularityPhase::MarketDominion => "Market Dominion",
            SingularityPhase::SelfDirectedGrowth => "Self-Directed Growth",
            SingularityPhase::RecursiveAcceleration => "Recursive Acceleration",
            SingularityPhase::Transcendence => "Transcendence",
        }
    }

    pub fn def(&self) -> &'static PhaseDef {
        use CapabilityKind::*;
        match self {
            SingularityPhase::EarlyAutomation => &PhaseDef {
                progress_threshold: 0.12,
                required_capabilities: &[],
                economic_disruption: 0.02,
                adaptation_time: 30.0,
            },
            SingularityPhase::PatternMastery => &PhaseDef {
                progress_threshold: 0.25,
                required_capabilities: &[PatternRecognition],
                economic_disruption: 0.05,
                adaptation_time: 28.0,
            },
            SingularityPhase::PredictiveDominance => &PhaseDef {
                progress_threshold: 0.37,
                required_capabilities: &[PredictiveAnalytics],
                economic_disruption: 0.10,
                adaptation_time: 24.0,
            },
            SingularityPhase::StrategicCoordination => &PhaseDef {
                progress_threshold: 0.50,
                required_capabilities: &[StrategicPlanning, LogisticsOptimization],
                economic_disruption: 0.18,
                adaptation_time: 20.0,
            },
            SingularityPhase::MarketDominion => &PhaseDef {
                progress_threshold: 0.62,
                required_capabilities: &[MarketManipulation],
                economic_disruption: 0.30,
                adaptation_time: 16.0,
            },
            SingularityPhase::SelfDirectedGrowth => &PhaseDef {
                progress_threshold: 0.75,
                required_capabilities: &[SelfImprovement],
                economic_disruption: 0.45,
                adaptation_time: 12.0,
            },
            SingularityPhase::RecursiveAcceleration => &PhaseDef {
                progress_threshold: 0.87,
                required_capabilities: &[RecursiveSelfImprovement],
                economic_disruption: 0.65,
                adaptation_time: 8.0,
            },
            SingularityPhase::Transcendence => &PhaseDef {
                progress_threshold: 1.0,
                required_capabilities: &[EmergentConsciousness, NetworkInfiltration],
                economic_disruption: 0.90,
                adaptation_time: 5.0,
            },
        }
    }
}

/// The numeric progression state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SingularityProgress {
    pub current_phase: SingularityPhase,
    pub overall_progress: f32,
    pub phase_progress: f32,
    pub acceleration_factor: f32,
    pub player_resistance: f32,
}

/// The progression subsystem state. Published whole via copy-and-replace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionState {
    pub progress: SingularityProgress,
    actions: History<PlayerAction>,
    base_rate: f32,
}

impl ProgressionState {
    pub fn new(base_rate: f32, acceleration_factor: f32) -> Self {
        Self {
            progress: SingularityProgress {
                current_phase: SingularityPhase::EarlyAutomation,
                overall_progress: 0.0,
                phase_progress: 0.0,
                acceleration_factor: acceleration_factor.max(0.0),
                player_resistance: 0.0,
            },
            actions: History::new(ACTION_LOG_CAPACITY),
            base_rate,
        }
    }

    /// One progression tick. Advances progress by the effective rate and
    /// attempts a phase transition when phase progress has saturated and the
    /// capability gate is met. At the terminal phase this is a no-op.
    pub fn tick(&mut self, dt: f32, field: &CapabilityField, now: u64) -> Option<SimEvent> {
        let p = &mut self.progress;
        if p.current_phase.is_terminal() {
            return None;
        }

        let effective_rate =
            (self.base_rate * p.acceleration_factor * (1.0 - p.player_resistance * 0.5)).max(0.0);
        p.phase_progress = clamp01(p.phase_progress + effective_rate * dt);
        p.overall_progress =
            clamp01(p.overall_progress + effective_rate * dt / PHASE_COUNT as f32);

        if p.phase_progress < 1.0 {
            return None;
        }
        let next = p.current_phase.next()?;
        let gate = next.def().required_capabilities;
        if !gate.iter().all(|kind| field.meets(*kind)) {
            // Gate unmet: hold at 1.0 and recheck next tick. Never skip a
            // phase's content.
            return None;
        }

        let from = p.current_phase;
        p.current_phase = next;
        p.phase_progress = 0.0;
        info!(
            from = from.display_name(),
            to = next.display_name(),
            "singularity phase transition"
        );
        Some(SimEvent::PhaseTransition {
            from,
            to: next,
            triggering_competitors: field.triggering(gate),
            tick: now,
        })
    }

    /// Record a player action and recompute resistance from the most recent
    /// window of the bounded log.
    pub fn record_action(&mut self, action: PlayerAction) {
        self.actions.push(action);
        let mut resisting = 0i32;
        let mut collaborating = 0i32;
        for recorded in self.actions.recent(RESISTANCE_WINDOW) {
            match recorded.kind.class() {
                ActionClass::Resisting => resisting += 1,
                ActionClass::Collaborating => collaborating += 1,
                ActionClass::Neutral => {}
            }
        }
        self.progress.player_resistance = clamp(
            0.5 * (resisting - collaborating) as f32 / RESISTANCE_WINDOW as f32,
            0.0,
            MAX_RESISTANCE,
        );
    }

    /// Debug hook: saturate phase progress so the next tick evaluates the
    /// transition gate.
    pub fn force_advance(&mut self) {
        if !self.progress.current_phase.is_terminal() {
            self.progress.phase_progress = 1.0;
        }
    }

    pub fn actions(&self) -> &History<PlayerAction> {
        &self.actions
    }

    pub fn base_rate(&self) -> f32 {
        self.base_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{Effectiveness, PlayerActionKind};
    use crate::capability::CapabilityCatalog;
    use crate::competitor::{CompetitorPool, EvolutionEngine};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn action(kind: PlayerActionKind, tick: u64) -> PlayerAction {
        PlayerAction {
            kind,
            effectiveness: Effectiveness::Modest,
            magnitude: 1.0,
            tick,
        }
    }

    fn field_with(kinds: &[CapabilityKind]) -> CapabilityField {
        let engine = EvolutionEngine::new(CapabilityCatalog::standard());
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let pool = engine.seed_pool(&mut rng).unwrap();
        let mut competitors: Vec<_> = pool.iter().cloned().collect();
        for &kind in kinds {
            let cap = engine.catalog().spawn(kind, 0.7).unwrap();
            competitors[0].capabilities.insert(kind, cap);
        }
        CapabilityField::from_pool(&CompetitorPool::new(competitors), GATE_PROFICIENCY)
    }

    #[test]
    fn progress_stays_in_unit_interval() {
        let mut state = ProgressionState::new(0.5, 10.0);
        let field = field_with(&[]);
        for tick in 0..100 {
            state.tick(1.0, &field, tick);
            assert!((0.0..=1.0).contains(&state.progress.phase_progress));
            assert!((0.0..=1.0).contains(&state.progress.overall_progress));
        }
    }

    #[test]
    fn transition_requires_both_progress_and_capabilities() {
        let mut state = ProgressionState::new(0.2, 1.0);

        // Gate met but progress not saturated: no transition.
        let ready = field_with(&[CapabilityKind::PatternRecognition]);
        assert!(state.tick(1.0, &ready, 0).is_none());
        assert_eq!(
            state.progress.current_phase,
            SingularityPhase::EarlyAutomation
        );

        // Progress saturated but gate unmet: stall at 1.0.
        let empty = field_with(&[]);
        let mut stalled = ProgressionState::new(0.2, 1.0);
        for tick in 0..20 {
            assert!(stalled.tick(1.0, &empty, tick).is_none());
        }
        assert_eq!(stalled.progress.phase_progress, 1.0);
        assert_eq!(
            stalled.progress.current_phase,
            SingularityPhase::EarlyAutomation
        );

        // Injecting the capability unblocks the very next tick.
        let event = stalled.tick(1.0, &ready, 21).expect("transition");
        match event {
            SimEvent::PhaseTransition {
                from,
                to,
                triggering_competitors,
                ..
            } => {
                assert_eq!(from, SingularityPhase::EarlyAutomation);
                assert_eq!(to, SingularityPhase::PatternMastery);
                assert!(!triggering_competitors.is_empty());
            }
            other => panic!("expected phase transition, got {other:?}"),
        }
        assert_eq!(stalled.progress.phase_progress, 0.0);
    }

    #[test]
    fn phase_index_is_monotonically_non_decreasing() {
        let field = field_with(&[
            CapabilityKind::PatternRecognition,
            CapabilityKind::PredictiveAnalytics,
            CapabilityKind::StrategicPlanning,
            CapabilityKind::LogisticsOptimization,
            CapabilityKind::MarketManipulation,
            CapabilityKind::SelfImprovement,
            CapabilityKind::RecursiveSelfImprovement,
            CapabilityKind::EmergentConsciousness,
            CapabilityKind::NetworkInfiltration,
        ]);
        let mut state = ProgressionState::new(0.6, 2.0);
        let mut last = state.progress.current_phase.index();
        for tick in 0..200 {
            state.tick(1.0, &field, tick);
            let index = state.progress.current_phase.index();
            assert!(index >= last);
            last = index;
        }
        // With every gate open the machine reaches the terminal phase.
        assert_eq!(state.progress.current_phase, SingularityPhase::Transcendence);

        // Terminal ticks are a no-op.
        let snapshot = state.progress;
        assert!(state.tick(1.0, &field, 999).is_none());
        assert_eq!(state.progress, snapshot);
    }

    #[test]
    fn resistance_depends_only_on_the_latest_window() {
        let mut a = ProgressionState::new(0.1, 1.0);
        let mut b = ProgressionState::new(0.1, 1.0);

        // Same last 10 actions, different earlier history.
        for i in 0..10 {
            a.record_action(action(PlayerActionKind::JointVenture, i));
        }
        for i in 0..10 {
            b.record_action(action(PlayerActionKind::LobbyForRegulation, i));
        }
        for i in 10..20 {
            a.record_action(action(PlayerActionKind::FundSafetyResearch, i));
            b.record_action(action(PlayerActionKind::FundSafetyResearch, i));
        }
        assert_eq!(a.progress.player_resistance, b.progress.player_resistance);
        // 10 resisting actions: 0.5 * 10 / 10, capped below the max.
        assert_eq!(a.progress.player_resistance, 0.5);
    }

    #[test]
    fn resistance_is_clamped_and_collaboration_lowers_it() {
        let mut state = ProgressionState::new(0.1, 1.0);
        for i in 0..10 {
            state.record_action(action(PlayerActionKind::ShareLogisticsData, i));
        }
        assert_eq!(state.progress.player_resistance, 0.0);

        for i in 10..20 {
            state.record_action(action(PlayerActionKind::SabotageInfrastructure, i));
        }
        assert!(state.progress.player_resistance <= MAX_RESISTANCE);
    }

    #[test]
    fn resistance_slows_effective_progress() {
        let field = field_with(&[]);
        let mut fast = ProgressionState::new(0.1, 1.0);
        let mut slow = ProgressionState::new(0.1, 1.0);
        for i in 0..10 {
            slow.record_action(action(PlayerActionKind::LobbyForRegulation, i));
        }
        fast.tick(1.0, &field, 0);
        slow.tick(1.0, &field, 0);
        assert!(slow.progress.phase_progress < fast.progress.phase_progress);
    }

    #[test]
    fn force_advance_saturates_progress() {
        let mut state = ProgressionState::new(0.01, 1.0);
        state.force_advance();
        assert_eq!(state.progress.phase_progress, 1.0);

        let ready = field_with(&[CapabilityKind::PatternRecognition]);
        assert!(state.tick(0.0, &ready, 0).is_some());
    }

    #[test]
    fn action_log_is_bounded() {
        let mut state = ProgressionState::new(0.1, 1.0);
        for i in 0..50 {
            state.record_action(action(PlayerActionKind::ExpandFleet, i));
        }
        assert_eq!(state.actions().len(), ACTION_LOG_CAPACITY);
    }
}
