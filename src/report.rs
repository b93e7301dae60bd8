use std::fmt;

use serde::{Deserialize, Serialize};

use crate::state::{Achievement, GameOver};

/// Why a population changed this season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeReason {
    Reproduction,
    FavorableConditions,
    LowPredation,
    Growth,
    EnvironmentalStress,
    Starvation,
    Predation,
    Decline,
    Stable,
}

impl fmt::Display for ChangeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ChangeReason::Reproduction => "High birth rate",
            ChangeReason::FavorableConditions => "Favorable conditions",
            ChangeReason::LowPredation => "Low predation pressure",
            ChangeReason::Growth => "Population growth",
            ChangeReason::EnvironmentalStress => "Environmental stress",
            ChangeReason::Starvation => "Food shortage",
            ChangeReason::Predation => "Predation pressure",
            ChangeReason::Decline => "Natural decline",
            ChangeReason::Stable => "Stable",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationChange {
    pub species_id: String,
    pub previous: u64,
    pub current: u64,
    pub change: i64,
    pub reason: ChangeReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventPhase {
    Started,
    Ongoing,
    Ended,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventOccurrence {
    pub event_id: String,
    pub name: String,
    pub phase: EventPhase,
    pub remaining: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeasonResult {
    pub season: u64,
    pub changes: Vec<PopulationChange>,
    pub events: Vec<EventOccurrence>,
    pub extinctions: Vec<String>,
    pub achievements: Vec<Achievement>,
    pub biodiversity: f64,
    pub stability: f64,
    pub score_delta: f64,
    pub game_over: Option<GameOver>,
}

impl SeasonResult {
    pub fn new(season: u64) -> Self {
        Self {
            season,
            ..Self::default()
        }
    }

    pub fn change_for(&self, species_id: &str) -> Option<&PopulationChange> {
        self.changes.iter().find(|c| c.species_id == species_id)
    }
}
