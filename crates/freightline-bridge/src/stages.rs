//! The five bridge stages
//!
//! One fixed per-cycle order: AI evolution and actions, pressure update,
//! economic impacts, singularity progression, and event dispatch. Events
//! produced by an earlier stage sit in the cycle buffer where later stages
//! of the same cycle consume them; dispatch moves what remains to the
//! outward bus.

use freightline_ecs::{System, SystemError};
use freightline_sim::economy::EconomicImpact;
use freightline_sim::pressure::PressureSource;
use freightline_sim::singularity::GATE_PROFICIENCY;
use freightline_sim::{
    CapabilityField, EconomicEventKind, EvolutionEngine, ManipulationType, Severity, SimEvent,
};
use tracing::info;

use crate::simulation::TickContext;

/// Fixed stage priorities; the scheduler runs ascending.
pub const PRIORITY_EVOLUTION: i32 = 0;
pub const PRIORITY_PRESSURE: i32 = 1;
pub const PRIORITY_ECONOMY: i32 = 2;
pub const PRIORITY_PROGRESSION: i32 = 3;
pub const PRIORITY_DISPATCH: i32 = 4;

/// Scales a manipulation's power into competitive pressure.
const MANIPULATION_PRESSURE_SCALE: f32 = 0.02;

fn system_err(err: impl std::fmt::Display) -> SystemError {
    SystemError::new(err.to_string())
}

/// Stage 1: evolve the competitor pool, let competitors act, and mirror the
/// replacement pool into the world.
pub struct EvolutionStage {
    engine: EvolutionEngine,
}

impl EvolutionStage {
    pub fn new(engine: EvolutionEngine) -> Self {
        Self { engine }
    }
}

impl System<TickContext> for EvolutionStage {
    fn name(&self) -> &'static str {
        "ai_evolution"
    }

    fn run(&mut self, ctx: &mut TickContext, _dt: f32) -> Result<(), SystemError> {
        let pool = ctx.competitors.snapshot();
        let (next, mut events) = self
            .engine
            .evolve(&pool, &mut ctx.rng)
            .map_err(system_err)?;
        events.extend(self.engine.act(&next, &mut ctx.rng));
        freightline_sim::components::mirror_pool(&mut ctx.world, &next, &mut ctx.entity_index)
            .map_err(system_err)?;
        ctx.competitors.publish(next);
        ctx.cycle_events.append(&mut events);
        Ok(())
    }
}

/// Stage 2: grow pressure, fold in this cycle's manipulations and any queued
/// external modifiers, and apply queued player adaptation exactly once.
pub struct PressureStage;

impl System<TickContext> for PressureStage {
    fn name(&self) -> &'static str {
        "competitive_pressure"
    }

    fn run(&mut self, ctx: &mut TickContext, _dt: f32) -> Result<(), SystemError> {
        let mut state = ctx.pressure.working_copy();
        let mut events = Vec::new();

        if let Some(event) = state.tick(ctx.clock.tick) {
            events.push(event);
        }

        let manipulation_powers: Vec<f32> = ctx
            .cycle_events
            .iter()
            .filter_map(|event| match event {
                SimEvent::MarketManipulation { power, .. } => Some(*power),
                _ => None,
            })
            .collect();
        for power in manipulation_powers {
            events.push(state.apply_modifier(
                PressureSource::MarketManipulation,
                power * MANIPULATION_PRESSURE_SCALE,
            ));
        }

        for (source, magnitude) in ctx.pending.pressure_modifiers.drain(..) {
            events.push(state.apply_modifier(source, magnitude));
        }

        // Relief amounts are queued separately from the actions themselves
        // (which the progression stage consumes), so each queue drains at
        // exactly one stage even when the stages fire at different intervals.
        for relief in ctx.pending.adaptations.drain(..) {
            events.push(state.apply_adaptation(relief));
        }

        ctx.pressure.publish(state);
        ctx.cycle_events.append(&mut events);
        Ok(())
    }
}

/// Stage 3: apply queued economic impacts plus the fallout of this cycle's
/// manipulations.
pub struct EconomyStage;

fn manipulation_impact(commodity: &str, manipulation: ManipulationType, power: f32) -> EconomicImpact {
    let severity = if power > 0.7 {
        Severity::Major
    } else if power > 0.4 {
        Severity::Moderate
    } else {
        Severity::Minor
    };
    let (gdp_change, volatility_change, verb) = match manipulation {
        ManipulationType::Pump => (0.004 * power, 0.010 * power, "pumped"),
        ManipulationType::Dump => (-0.006 * power, 0.015 * power, "dumped"),
        ManipulationType::Stabilize => (0.001 * power, -0.010 * power, "stabilized"),
    };
    EconomicImpact {
        gdp_change,
        inflation_change: 0.0,
        unemployment_change: 0.0,
        volatility_change,
        severity,
        description: format!("{commodity} market {verb} by an AI competitor"),
        affected_markets: vec![commodity.to_string()],
    }
}

impl System<TickContext> for EconomyStage {
    fn name(&self) -> &'static str {
        "economic_engine"
    }

    fn run(&mut self, ctx: &mut TickContext, _dt: f32) -> Result<(), SystemError> {
        let mut state = ctx.economy.working_copy();
        let mut events = Vec::new();

        let fallout: Vec<EconomicImpact> = ctx
            .cycle_events
            .iter()
            .filter_map(|event| match event {
                SimEvent::MarketManipulation {
                    commodity,
                    manipulation,
                    power,
                    ..
                } => Some(manipulation_impact(commodity, *manipulation, *power)),
                _ => None,
            })
            .collect();
        for impact in &fallout {
            let mut event = state.apply_impact(impact);
            if let SimEvent::Economic { kind, .. } = &mut event {
                *kind = EconomicEventKind::ManipulationFallout;
            }
            events.push(event);
        }

        for impact in ctx.pending.economic_impacts.drain(..) {
            events.push(state.apply_impact(&impact));
        }

        ctx.economy.publish(state);
        ctx.cycle_events.append(&mut events);
        Ok(())
    }
}

/// Stage 4: record queued player actions, honor a pending debug advance,
/// and tick the singularity state machine against the capability field
/// gathered from the world.
pub struct ProgressionStage;

impl System<TickContext> for ProgressionStage {
    fn name(&self) -> &'static str {
        "singularity_progression"
    }

    fn run(&mut self, ctx: &mut TickContext, dt: f32) -> Result<(), SystemError> {
        let mut state = ctx.progression.working_copy();
        let mut events = Vec::new();

        for action in ctx.pending.player_actions.drain(..) {
            state.record_action(action);
        }
        if std::mem::take(&mut ctx.pending.force_advance) {
            state.force_advance();
        }

        let field = CapabilityField::gather(&ctx.world, GATE_PROFICIENCY);
        if let Some(event) = state.tick(dt, &field, ctx.clock.tick) {
            events.push(event);
        }

        ctx.progression.publish(state);
        ctx.cycle_events.append(&mut events);
        Ok(())
    }
}

/// Stage 5: move everything the cycle produced to the outward bus.
pub struct DispatchStage;

impl System<TickContext> for DispatchStage {
    fn name(&self) -> &'static str {
        "event_dispatch"
    }

    fn run(&mut self, ctx: &mut TickContext, _dt: f32) -> Result<(), SystemError> {
        for event in ctx.cycle_events.drain(..) {
            if let SimEvent::PhaseTransition { from, to, .. } = &event {
                info!(
                    from = from.display_name(),
                    to = to.display_name(),
                    tick = ctx.clock.tick,
                    "dispatching phase transition"
                );
            }
            ctx.outbox.publish(event);
        }
        Ok(())
    }
}
