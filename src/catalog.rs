//! Read-only reference data: species, biomes and environmental events.
//!
//! The catalog is loaded once and shared by every tick. Predator/prey lookups
//! go through [`FoodWeb`], which is built when the catalog is constructed.

use std::{
    collections::{BTreeMap, HashMap},
    fmt, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrophicLevel {
    #[default]
    Producer,
    PrimaryConsumer,
    SecondaryConsumer,
    TertiaryConsumer,
    Decomposer,
}

impl TrophicLevel {
    /// The four tiers that make up a complete food chain.
    pub const FOOD_CHAIN: [TrophicLevel; 4] = [
        TrophicLevel::Producer,
        TrophicLevel::PrimaryConsumer,
        TrophicLevel::SecondaryConsumer,
        TrophicLevel::TertiaryConsumer,
    ];

    pub fn is_apex(self) -> bool {
        self == TrophicLevel::TertiaryConsumer
    }

    /// Producers and decomposers draw on sunlight and detritus, not prey.
    pub fn is_self_sustaining(self) -> bool {
        matches!(self, TrophicLevel::Producer | TrophicLevel::Decomposer)
    }
}

impl fmt::Display for TrophicLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TrophicLevel::Producer => "producer",
            TrophicLevel::PrimaryConsumer => "primary consumer",
            TrophicLevel::SecondaryConsumer => "secondary consumer",
            TrophicLevel::TertiaryConsumer => "tertiary consumer",
            TrophicLevel::Decomposer => "decomposer",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureRange {
    pub min: f64,
    pub max: f64,
}

impl Default for TemperatureRange {
    fn default() -> Self {
        Self {
            min: -10.0,
            max: 40.0,
        }
    }
}

impl TemperatureRange {
    pub fn contains(&self, temperature: f64) -> bool {
        temperature >= self.min && temperature <= self.max
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    pub fn half_width(&self) -> f64 {
        (self.max - self.min) / 2.0
    }
}

fn default_growth_rate() -> f64 {
    0.3
}

fn default_resilience() -> f64 {
    0.5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Species {
    pub id: String,
    pub name: String,
    pub trophic_level: TrophicLevel,
    #[serde(default)]
    pub diet: Vec<String>,
    #[serde(default)]
    pub habitats: Vec<String>,
    #[serde(default = "default_growth_rate")]
    pub growth_rate: f64,
    pub carrying_capacity: f64,
    pub base_population: u64,
    #[serde(default)]
    pub energy_requirement: f64,
    #[serde(default)]
    pub energy_yield: f64,
    #[serde(default = "default_resilience")]
    pub resilience: f64,
    #[serde(default)]
    pub temperature_range: TemperatureRange,
    #[serde(default)]
    pub water_requirement: f64,
    #[serde(default)]
    pub invasive: bool,
    #[serde(default)]
    pub endangered: bool,
    #[serde(default)]
    pub evolution_potential: f64,
    #[serde(default)]
    pub biodiversity_value: f64,
}

impl Species {
    /// A bare species record; catalog files fill in the rest.
    pub fn new(id: impl Into<String>, trophic_level: TrophicLevel) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            trophic_level,
            diet: Vec::new(),
            habitats: Vec::new(),
            growth_rate: default_growth_rate(),
            carrying_capacity: 100.0,
            base_population: 10,
            energy_requirement: 0.0,
            energy_yield: 0.0,
            resilience: default_resilience(),
            temperature_range: TemperatureRange::default(),
            water_requirement: 0.0,
            invasive: false,
            endangered: false,
            evolution_potential: 0.0,
            biodiversity_value: 0.0,
        }
    }

    pub fn can_live_in(&self, biome: &Biome) -> bool {
        self.habitats.iter().any(|habitat| habitat == &biome.id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Biome {
    pub id: String,
    pub name: String,
    pub temperature: f64,
    pub precipitation: f64,
    #[serde(default)]
    pub seasonality: f64,
    #[serde(default)]
    pub starting_species: Vec<String>,
    pub biodiversity_target: f64,
    #[serde(default = "default_difficulty")]
    pub difficulty: u8,
}

fn default_difficulty() -> u8 {
    1
}

/// Population and climate effects of one environmental event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventEffects {
    #[serde(default)]
    pub temperature_delta: f64,
    #[serde(default)]
    pub precipitation_delta: f64,
    #[serde(default)]
    pub species_multipliers: BTreeMap<String, f64>,
    #[serde(default)]
    pub trophic_multipliers: BTreeMap<TrophicLevel, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentalEvent {
    pub id: String,
    pub name: String,
    pub duration: u32,
    pub probability: f64,
    #[serde(default)]
    pub severity: u8,
    #[serde(default)]
    pub effects: EventEffects,
    #[serde(default)]
    pub prevention_cost: f64,
}

#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("species id '{0}' defined more than once")]
    DuplicateSpecies(String),
    #[error("biome id '{0}' defined more than once")]
    DuplicateBiome(String),
    #[error("event id '{0}' defined more than once")]
    DuplicateEvent(String),
    #[error("species '{species}' eats unknown species '{prey}'")]
    UnknownPrey { species: String, prey: String },
    #[error("biome '{biome}' starts with unknown species '{species}'")]
    UnknownRosterSpecies { biome: String, species: String },
    #[error("species '{species}' has invalid {field}: {value}")]
    InvalidParameter {
        species: String,
        field: &'static str,
        value: f64,
    },
    #[error("event '{event}' probability {probability} must be between 0.0 and 1.0")]
    InvalidProbability { event: String, probability: f64 },
}

/// Precomputed predator/prey adjacency.
#[derive(Debug, Clone, Default)]
pub struct FoodWeb {
    predators: HashMap<String, Vec<String>>,
    prey: HashMap<String, Vec<String>>,
}

impl FoodWeb {
    fn build(species: &BTreeMap<String, Species>) -> Self {
        let mut web = FoodWeb::default();
        for (id, entry) in species {
            for prey in &entry.diet {
                web.predators
                    .entry(prey.clone())
                    .or_default()
                    .push(id.clone());
                web.prey.entry(id.clone()).or_default().push(prey.clone());
            }
        }
        for list in web.predators.values_mut().chain(web.prey.values_mut()) {
            list.sort();
            list.dedup();
        }
        web
    }

    pub fn predators_of(&self, species_id: &str) -> &[String] {
        self.predators
            .get(species_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn prey_of(&self, species_id: &str) -> &[String] {
        self.prey.get(species_id).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    species: Vec<Species>,
    #[serde(default)]
    biomes: Vec<Biome>,
    #[serde(default)]
    events: Vec<EnvironmentalEvent>,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    species: BTreeMap<String, Species>,
    biomes: BTreeMap<String, Biome>,
    events: Vec<EnvironmentalEvent>,
    food_web: FoodWeb,
}

impl Catalog {
    pub fn new(
        species: Vec<Species>,
        biomes: Vec<Biome>,
        events: Vec<EnvironmentalEvent>,
    ) -> Result<Self, CatalogError> {
        let mut species_by_id = BTreeMap::new();
        for entry in species {
            if entry.carrying_capacity < 0.0 {
                return Err(CatalogError::InvalidParameter {
                    species: entry.id,
                    field: "carrying_capacity",
                    value: entry.carrying_capacity,
                });
            }
            if entry.energy_requirement < 0.0 {
                return Err(CatalogError::InvalidParameter {
                    species: entry.id,
                    field: "energy_requirement",
                    value: entry.energy_requirement,
                });
            }
            if species_by_id.contains_key(&entry.id) {
                return Err(CatalogError::DuplicateSpecies(entry.id));
            }
            species_by_id.insert(entry.id.clone(), entry);
        }

        for entry in species_by_id.values() {
            if let Some(prey) = entry.diet.iter().find(|p| !species_by_id.contains_key(*p)) {
                return Err(CatalogError::UnknownPrey {
                    species: entry.id.clone(),
                    prey: prey.clone(),
                });
            }
        }

        let mut biomes_by_id = BTreeMap::new();
        for biome in biomes {
            if let Some(missing) = biome
                .starting_species
                .iter()
                .find(|id| !species_by_id.contains_key(*id))
            {
                return Err(CatalogError::UnknownRosterSpecies {
                    biome: biome.id.clone(),
                    species: missing.clone(),
                });
            }
            if biomes_by_id.contains_key(&biome.id) {
                return Err(CatalogError::DuplicateBiome(biome.id));
            }
            biomes_by_id.insert(biome.id.clone(), biome);
        }

        let mut seen_events: Vec<&str> = Vec::with_capacity(events.len());
        for event in &events {
            if !(0.0..=1.0).contains(&event.probability) {
                return Err(CatalogError::InvalidProbability {
                    event: event.id.clone(),
                    probability: event.probability,
                });
            }
            if seen_events.contains(&event.id.as_str()) {
                return Err(CatalogError::DuplicateEvent(event.id.clone()));
            }
            seen_events.push(&event.id);
        }

        let food_web = FoodWeb::build(&species_by_id);
        Ok(Self {
            species: species_by_id,
            biomes: biomes_by_id,
            events,
            food_web,
        })
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let file: CatalogFile = serde_yaml::from_str(text).context("Failed to parse catalog")?;
        Ok(Self::new(file.species, file.biomes, file.events)?)
    }

    pub fn species(&self, id: &str) -> Option<&Species> {
        self.species.get(id)
    }

    pub fn all_species(&self) -> impl Iterator<Item = &Species> {
        self.species.values()
    }

    pub fn biome(&self, id: &str) -> Option<&Biome> {
        self.biomes.get(id)
    }

    pub fn biomes(&self) -> impl Iterator<Item = &Biome> {
        self.biomes.values()
    }

    pub fn event(&self, id: &str) -> Option<&EnvironmentalEvent> {
        self.events.iter().find(|event| event.id == id)
    }

    /// Events in catalog order; the scheduler draws against them in this order.
    pub fn events(&self) -> &[EnvironmentalEvent] {
        &self.events
    }

    pub fn food_web(&self) -> &FoodWeb {
        &self.food_web
    }

    /// Overrides every event probability; used for scripted runs.
    pub fn with_event_probability(mut self, probability: f64) -> Self {
        for event in &mut self.events {
            event.probability = probability.clamp(0.0, 1.0);
        }
        self
    }
}

pub struct CatalogLoader {
    base_dir: PathBuf,
}

impl CatalogLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Catalog> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read catalog file {}", path.display()))?;
        Catalog::from_yaml_str(&data)
            .with_context(|| format!("Failed to load catalog {}", path.display()))
    }
}
