//! Tuning constants and runtime settings for the season engine.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

fn default_random_seed() -> u64 {
    7
}

fn default_predation_efficiency() -> f64 {
    0.5
}

fn default_predation_rate() -> f64 {
    0.0001
}

fn default_energy_transfer() -> f64 {
    0.1
}

fn default_evolution_interval() -> u64 {
    10
}

fn default_stability_window() -> usize {
    10
}

fn default_history_limit() -> usize {
    200
}

fn default_seasonal_amplitude() -> f64 {
    8.0
}

fn default_event_probability_scale() -> f64 {
    1.0
}

fn default_dedupe_events() -> bool {
    true
}

fn default_victory_min_season() -> u64 {
    50
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_random_seed")]
    pub random_seed: u64,
    /// Share of each predator/prey encounter that ends in a kill.
    #[serde(default = "default_predation_efficiency")]
    pub predation_efficiency: f64,
    /// Mass-action encounter rate between one predator and one prey.
    #[serde(default = "default_predation_rate")]
    pub predation_rate: f64,
    /// Fraction of a prey population counted as energy available to consumers.
    #[serde(default = "default_energy_transfer")]
    pub energy_transfer: f64,
    #[serde(default = "default_evolution_interval")]
    pub evolution_interval: u64,
    #[serde(default = "default_stability_window")]
    pub stability_window: usize,
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    #[serde(default = "default_seasonal_amplitude")]
    pub seasonal_amplitude_c: f64,
    #[serde(default = "default_event_probability_scale")]
    pub event_probability_scale: f64,
    /// Skip events whose id is already active when drawing new ones.
    #[serde(default = "default_dedupe_events")]
    pub dedupe_events: bool,
    #[serde(default = "default_victory_min_season")]
    pub victory_min_season: u64,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            random_seed: default_random_seed(),
            predation_efficiency: default_predation_efficiency(),
            predation_rate: default_predation_rate(),
            energy_transfer: default_energy_transfer(),
            evolution_interval: default_evolution_interval(),
            stability_window: default_stability_window(),
            history_limit: default_history_limit(),
            seasonal_amplitude_c: default_seasonal_amplitude(),
            event_probability_scale: default_event_probability_scale(),
            dedupe_events: default_dedupe_events(),
            victory_min_season: default_victory_min_season(),
            logging: LoggingConfig::default(),
        }
    }
}

impl SimulationConfig {
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: SimulationConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path.as_ref(), yaml)
            .with_context(|| format!("Failed to write {}", path.as_ref().display()))?;
        Ok(())
    }

    /// History never shrinks below what stability scoring reads.
    pub fn effective_history_limit(&self) -> usize {
        self.history_limit.max(self.stability_window).max(2)
    }

    /// A config with random events switched off.
    pub fn without_events(mut self) -> Self {
        self.event_probability_scale = 0.0;
        self
    }
}
