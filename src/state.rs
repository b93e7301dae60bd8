use std::{
    collections::{BTreeMap, BTreeSet, VecDeque},
    fmt,
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{Biome, Catalog, Species};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    #[default]
    Classic,
    /// No random events; only total collapse ends the game.
    Sandbox,
    /// Events fire half again as often.
    Challenge,
}

impl GameMode {
    pub fn event_probability_factor(self) -> f64 {
        match self {
            GameMode::Classic => 1.0,
            GameMode::Sandbox => 0.0,
            GameMode::Challenge => 1.5,
        }
    }

    pub fn enforces_objectives(self) -> bool {
        self != GameMode::Sandbox
    }
}

#[derive(Debug, Error)]
#[error("unknown game mode '{0}' (expected classic, sandbox or challenge)")]
pub struct ParseGameModeError(String);

impl FromStr for GameMode {
    type Err = ParseGameModeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "classic" => Ok(GameMode::Classic),
            "sandbox" => Ok(GameMode::Sandbox),
            "challenge" => Ok(GameMode::Challenge),
            other => Err(ParseGameModeError(other.to_string())),
        }
    }
}

/// Live population of one species plus last season's breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationData {
    pub species_id: String,
    pub current: u64,
    pub carrying_capacity: f64,
    pub growth: f64,
    pub deaths: f64,
    pub births: f64,
    pub predation_loss: f64,
    pub starvation_loss: f64,
}

impl PopulationData {
    pub fn introduce(species: &Species) -> Self {
        Self {
            species_id: species.id.clone(),
            current: species.base_population,
            carrying_capacity: species.carrying_capacity,
            growth: 0.0,
            deaths: 0.0,
            births: 0.0,
            predation_loss: 0.0,
            starvation_loss: 0.0,
        }
    }

    pub fn capacity_ratio(&self) -> f64 {
        if self.carrying_capacity <= 0.0 {
            0.0
        } else {
            self.current as f64 / self.carrying_capacity
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EcosystemState {
    pub populations: BTreeMap<String, PopulationData>,
    pub season: u64,
    pub temperature: f64,
    pub precipitation: f64,
    /// Reported score, never below zero.
    pub biodiversity: f64,
    pub stability: f64,
}

impl EcosystemState {
    pub fn counts(&self) -> BTreeMap<String, u64> {
        self.populations
            .iter()
            .map(|(id, data)| (id.clone(), data.current))
            .collect()
    }

    pub fn species_count(&self) -> usize {
        self.populations.values().filter(|p| p.current > 0).count()
    }

    pub fn total_population(&self) -> u64 {
        self.populations.values().map(|p| p.current).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveEvent {
    pub event_id: String,
    pub remaining: u32,
    pub started_season: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationSnapshot {
    pub season: u64,
    pub populations: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Achievement {
    /// Biodiversity rose past 500.
    BiodiversityMilestone,
    /// Stability above 80 after season 20.
    StableEcosystem,
    /// Every food-chain tier alive at once.
    CompleteFoodChain,
}

impl fmt::Display for Achievement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Achievement::BiodiversityMilestone => "Biodiversity Champion",
            Achievement::StableEcosystem => "Balance Keeper",
            Achievement::CompleteFoodChain => "Complete Food Chain",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOverReason {
    EcosystemCollapse,
    BiodiversityCrisis,
    BiodiversityTargetReached,
}

impl fmt::Display for GameOverReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GameOverReason::EcosystemCollapse => "Total ecosystem collapse",
            GameOverReason::BiodiversityCrisis => "Biodiversity crisis",
            GameOverReason::BiodiversityTargetReached => "Biodiversity target reached",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOver {
    pub victory: bool,
    pub reason: GameOverReason,
    pub season: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub biome: Biome,
    pub mode: GameMode,
    pub seed: u64,
    pub ecosystem: EcosystemState,
    pub active_events: Vec<ActiveEvent>,
    pub history: VecDeque<PopulationSnapshot>,
    pub score: f64,
    pub available_species: Vec<String>,
    pub removed_species: Vec<String>,
    pub achievements: BTreeSet<Achievement>,
    pub game_over: Option<GameOver>,
}

impl GameState {
    pub fn season(&self) -> u64 {
        self.ecosystem.season
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over.is_some()
    }

    pub fn game_over_reason(&self) -> Option<GameOverReason> {
        self.game_over.map(|over| over.reason)
    }

    pub fn population(&self, species_id: &str) -> Option<u64> {
        self.ecosystem
            .populations
            .get(species_id)
            .map(|data| data.current)
    }

    /// Appends a snapshot, dropping the oldest entries beyond `limit`.
    pub fn record_history(&mut self, limit: usize) {
        self.history.push_back(PopulationSnapshot {
            season: self.ecosystem.season,
            populations: self.ecosystem.counts(),
        });
        while self.history.len() > limit {
            self.history.pop_front();
        }
    }

    /// Biome-compatible species that are not currently alive here.
    pub fn refresh_available_species(&mut self, catalog: &Catalog) {
        self.available_species = catalog
            .all_species()
            .filter(|species| species.can_live_in(&self.biome))
            .filter(|species| !self.ecosystem.populations.contains_key(&species.id))
            .map(|species| species.id.clone())
            .collect();
    }

    pub fn mark_removed(&mut self, species_id: &str) {
        if !self.removed_species.iter().any(|id| id == species_id) {
            self.removed_species.push(species_id.to_string());
        }
    }
}
