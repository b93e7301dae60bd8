use anyhow::Result;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    actions::{self, ActionError},
    catalog::Catalog,
    config::SimulationConfig,
    report::SeasonResult,
    rng::{RngManager, SystemRng},
    scoring::{self, SpeciesRisk},
    state::{EcosystemState, GameMode, GameState, PopulationData},
    systems::{
        climate, ClimateSystem, EventModifiers, EventSystem, PopulationSystem, ScoringSystem,
        TerminationSystem,
    },
};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("biome '{0}' is not in the catalog")]
    UnknownBiome(String),
    #[error("species '{0}' is in the ecosystem but not in the catalog")]
    UnknownSpecies(String),
}

/// Read-only inputs shared by every system during one season.
pub struct SeasonContext<'a> {
    pub season: u64,
    pub catalog: &'a Catalog,
    pub config: &'a SimulationConfig,
}

/// Scratch values handed from one system to the next within a season.
#[derive(Debug, Clone)]
pub struct SeasonFrame {
    pub result: SeasonResult,
    pub modifiers: EventModifiers,
    pub previous_biodiversity: f64,
    pub raw_biodiversity: f64,
}

impl SeasonFrame {
    pub fn new(season: u64, previous_biodiversity: f64) -> Self {
        Self {
            result: SeasonResult::new(season),
            modifiers: EventModifiers::default(),
            previous_biodiversity,
            raw_biodiversity: previous_biodiversity,
        }
    }
}

pub trait System {
    fn name(&self) -> &str;
    fn run(
        &mut self,
        ctx: &SeasonContext,
        state: &mut GameState,
        frame: &mut SeasonFrame,
        rng: &mut SystemRng<'_>,
    ) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct SeasonOutcome {
    pub state: GameState,
    pub result: SeasonResult,
}

pub struct EngineBuilder {
    catalog: Catalog,
    config: SimulationConfig,
    systems: Vec<Box<dyn System>>,
}

impl EngineBuilder {
    pub fn new(catalog: Catalog, config: SimulationConfig) -> Self {
        Self {
            catalog,
            config,
            systems: Vec::new(),
        }
    }

    pub fn with_system(mut self, system: impl System + 'static) -> Self {
        self.systems.push(Box::new(system));
        self
    }

    /// Events, climate, populations, scoring, termination: in that order.
    pub fn with_standard_systems(self) -> Self {
        self.with_system(EventSystem::new())
            .with_system(ClimateSystem::new())
            .with_system(PopulationSystem::new())
            .with_system(ScoringSystem::new())
            .with_system(TerminationSystem::new())
    }

    pub fn build(self) -> Engine {
        Engine {
            catalog: self.catalog,
            config: self.config,
            systems: self.systems,
        }
    }
}

pub struct Engine {
    catalog: Catalog,
    config: SimulationConfig,
    systems: Vec<Box<dyn System>>,
}

impl Engine {
    pub fn standard(catalog: Catalog, config: SimulationConfig) -> Self {
        EngineBuilder::new(catalog, config)
            .with_standard_systems()
            .build()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn initialize_game(
        &self,
        biome_id: &str,
        mode: GameMode,
    ) -> Result<GameState, EngineError> {
        let biome = self
            .catalog
            .biome(biome_id)
            .ok_or_else(|| EngineError::UnknownBiome(biome_id.to_string()))?
            .clone();

        let mut populations = std::collections::BTreeMap::new();
        for species_id in &biome.starting_species {
            let species = self
                .catalog
                .species(species_id)
                .ok_or_else(|| EngineError::UnknownSpecies(species_id.clone()))?;
            populations.insert(species.id.clone(), PopulationData::introduce(species));
        }

        let ecosystem = EcosystemState {
            populations,
            season: 0,
            temperature: biome.temperature
                + climate::seasonal_offset(0, biome.seasonality, self.config.seasonal_amplitude_c),
            precipitation: biome.precipitation.max(0.0),
            biodiversity: 0.0,
            stability: 100.0,
        };

        let mut state = GameState {
            biome,
            mode,
            seed: self.config.random_seed,
            ecosystem,
            active_events: Vec::new(),
            history: Default::default(),
            score: 0.0,
            available_species: Vec::new(),
            removed_species: Vec::new(),
            achievements: Default::default(),
            game_over: None,
        };
        state.ecosystem.biodiversity = scoring::reported_biodiversity(scoring::raw_biodiversity(
            &state.ecosystem,
            &self.catalog,
        ));
        state.record_history(self.config.effective_history_limit());
        state.refresh_available_species(&self.catalog);

        info!(
            biome = %state.biome.id,
            ?mode,
            species = state.ecosystem.populations.len(),
            "Game initialised"
        );
        Ok(state)
    }

    /// Advances one season. The input state is left untouched.
    pub fn process_season_tick(&mut self, state: &GameState) -> Result<SeasonOutcome> {
        let season = state.season() + 1;
        let mut next = state.clone();
        next.ecosystem.season = season;

        let mut rng = RngManager::new(state.seed, season);
        let mut frame = SeasonFrame::new(season, state.ecosystem.biodiversity);
        let ctx = SeasonContext {
            season,
            catalog: &self.catalog,
            config: &self.config,
        };
        for system in &mut self.systems {
            let mut stream = rng.stream(system.name());
            system.run(&ctx, &mut next, &mut frame, &mut stream)?;
        }
        frame.result.game_over = next.game_over;

        debug!(
            season,
            species = next.ecosystem.populations.len(),
            total = next.ecosystem.total_population(),
            biodiversity = next.ecosystem.biodiversity,
            stability = next.ecosystem.stability,
            "Season processed"
        );
        Ok(SeasonOutcome {
            state: next,
            result: frame.result,
        })
    }

    /// Runs up to `seasons` ticks, stopping early once the game is over.
    pub fn run_with_hook<F>(
        &mut self,
        state: GameState,
        seasons: u64,
        mut hook: F,
    ) -> Result<GameState>
    where
        F: FnMut(&GameState, &SeasonResult) -> Result<()>,
    {
        let mut state = state;
        for _ in 0..seasons {
            let outcome = self.process_season_tick(&state)?;
            hook(&outcome.state, &outcome.result)?;
            state = outcome.state;
            if state.is_game_over() {
                break;
            }
        }
        Ok(state)
    }

    pub fn run(&mut self, state: GameState, seasons: u64) -> Result<GameState> {
        self.run_with_hook(state, seasons, |_, _| Ok(()))
    }

    pub fn introduce_species(
        &self,
        state: &GameState,
        species_id: &str,
    ) -> Result<GameState, ActionError> {
        actions::introduce_species(&self.catalog, state, species_id)
    }

    pub fn remove_species(
        &self,
        state: &GameState,
        species_id: &str,
    ) -> Result<GameState, ActionError> {
        actions::remove_species(&self.catalog, state, species_id)
    }

    pub fn prevent_event(
        &self,
        state: &GameState,
        event_id: &str,
    ) -> Result<GameState, ActionError> {
        actions::prevent_event(&self.catalog, state, event_id)
    }

    pub fn species_at_risk(&self, state: &GameState) -> Vec<SpeciesRisk> {
        scoring::species_at_risk(&state.ecosystem, &self.catalog)
    }
}
