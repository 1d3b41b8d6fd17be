//! Simulation configuration
//!
//! Loaded from TOML; every field has a sensible default so a partial (or
//! absent) file still yields a runnable simulation.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),
}

/// Per-stage update intervals in simulation seconds. Zero means the stage
/// runs every cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageIntervals {
    pub evolution: f32,
    pub pressure: f32,
    pub economy: f32,
    pub progression: f32,
    pub dispatch: f32,
}

impl Default for StageIntervals {
    fn default() -> Self {
        Self {
            evolution: 0.0,
            pressure: 0.0,
            economy: 0.0,
            progression: 0.0,
            dispatch: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed; the same seed reproduces the whole run.
    pub seed: u64,
    /// Simulation seconds per advanced second.
    pub time_scale: f32,
    /// Raw delta the runner advances by each cycle.
    pub tick_step: f32,
    /// How many cycles the headless runner drives.
    pub run_ticks: u64,
    /// Base singularity progression rate per simulation second.
    pub base_progression_rate: f32,
    /// Initial acceleration factor for the progression engine.
    pub acceleration_factor: f32,
    pub initial_market_value: f64,
    /// Outward event queue capacity.
    pub event_capacity: usize,
    pub intervals: StageIntervals,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0xF8E1_17,
            time_scale: 1.0,
            tick_step: 1.0,
            run_ticks: 120,
            base_progression_rate: 0.005,
            acceleration_factor: 1.0,
            initial_market_value: 1_000_000_000.0,
            event_capacity: 256,
            intervals: StageIntervals::default(),
        }
    }
}

impl SimConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}
