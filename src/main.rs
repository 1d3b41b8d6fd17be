//! Headless simulation runner
//!
//! Drives a configured number of update cycles, logging the event stream as
//! it unfolds, and prints the final resumable status as JSON.

use anyhow::{Context, Result};
use freightline_bridge::{SimConfig, Simulation};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            SimConfig::load(&path).with_context(|| format!("loading config from {path}"))?
        }
        None => SimConfig::default(),
    };

    info!(
        seed = config.seed,
        run_ticks = config.run_ticks,
        "starting simulation"
    );
    let mut sim = Simulation::new(config.clone()).context("building simulation")?;

    for _ in 0..config.run_ticks {
        let report = sim.tick(config.tick_step);
        if report.failed > 0 {
            debug!(failed = report.failed, tick = sim.clock().tick, "degraded cycle");
        }
        for event in sim.drain_events() {
            match &event {
                freightline_sim::SimEvent::PhaseTransition { from, to, tick, .. } => {
                    info!(
                        from = from.display_name(),
                        to = to.display_name(),
                        tick = *tick,
                        "phase transition"
                    );
                }
                other => debug!(?other, "event"),
            }
        }
    }

    let status = sim.system_status();
    sim.shutdown();

    let json = serde_json::to_string_pretty(&status).context("serializing final status")?;
    println!("{json}");

    info!(
        ticks = status.clock.tick,
        phase = status.progression.progress.current_phase.display_name(),
        progress = status.progression.progress.overall_progress,
        "simulation complete"
    );
    Ok(())
}
