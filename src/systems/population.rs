use std::collections::BTreeMap;

use anyhow::Result;
use tracing::{debug, info};

use crate::{
    catalog::{FoodWeb, Species},
    config::SimulationConfig,
    engine::{EngineError, SeasonContext, SeasonFrame, System},
    models::{
        competition, energy, evolution, growth,
        predation::{self, PredationParams},
        stress,
    },
    report::{ChangeReason, PopulationChange},
    rng::SystemRng,
    state::{GameState, PopulationData},
};

use super::EventModifiers;

/// Breakdown of one species' season, in individuals.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpeciesStep {
    pub survival: f64,
    pub environmental_deaths: f64,
    pub starvation: f64,
    pub births: f64,
    pub predation: f64,
    pub event_delta: f64,
    pub evolution: f64,
    pub population: u64,
}

impl SpeciesStep {
    pub fn total_losses(&self) -> f64 {
        self.environmental_deaths + self.starvation + self.predation
    }
}

/// Climate and event inputs for one season.
pub struct SeasonConditions<'a> {
    pub season: u64,
    pub temperature: f64,
    pub precipitation: f64,
    pub modifiers: &'a EventModifiers,
}

/// Runs every sub-model for one species against the pre-season snapshot.
pub fn simulate_species(
    species: &Species,
    previous: &PopulationData,
    snapshot: &BTreeMap<String, u64>,
    food_web: &FoodWeb,
    conditions: &SeasonConditions<'_>,
    config: &SimulationConfig,
) -> SpeciesStep {
    let mut population = previous.current as f64;

    let survival =
        stress::environmental_survival(species, conditions.temperature, conditions.precipitation);
    let environmental_deaths = stress::environmental_deaths(population, survival);
    population -= environmental_deaths;

    let supply = energy::energy_supply(species, snapshot, food_web, config.energy_transfer);
    let fed = energy::survival_rate(supply, energy::energy_demand(species, population));
    let starvation = energy::starvation_loss(population, fed);
    population -= starvation;

    let capacity = previous.carrying_capacity;
    let raw_growth = growth::logistic_growth(species.growth_rate, population, capacity);
    let births = competition::damped_growth(raw_growth, population, capacity);
    population += births;

    let params = PredationParams {
        efficiency: config.predation_efficiency,
        rate: config.predation_rate,
    };
    let predation = predation::predation_loss(species, population, snapshot, food_web, params);
    population = (population - predation).max(0.0);

    let before_events = population;
    population *= conditions.modifiers.multiplier_for(species);
    let event_delta = population - before_events;

    let evolution = if evolution::is_evolution_season(conditions.season, config.evolution_interval)
    {
        evolution::evolution_bump(species, population, survival)
    } else {
        0.0
    };
    population += evolution;

    SpeciesStep {
        survival,
        environmental_deaths,
        starvation,
        births,
        predation,
        event_delta,
        evolution,
        population: population.round().max(0.0) as u64,
    }
}

/// Names the dominant cause of a population change.
///
/// Gains: reproduction, then favorable climate, then low predation.
/// Losses: climate, then starvation, then predation.
pub fn classify_change(previous: u64, step: &SpeciesStep) -> ChangeReason {
    let base = (previous as f64).max(1.0);
    if step.population > previous {
        if step.births > base * 0.1 {
            ChangeReason::Reproduction
        } else if step.survival >= 0.9 {
            ChangeReason::FavorableConditions
        } else if step.predation < base * 0.01 {
            ChangeReason::LowPredation
        } else {
            ChangeReason::Growth
        }
    } else if step.population < previous {
        if step.environmental_deaths > base * 0.1 {
            ChangeReason::EnvironmentalStress
        } else if step.starvation > base * 0.1 {
            ChangeReason::Starvation
        } else if step.predation > base * 0.05 {
            ChangeReason::Predation
        } else {
            ChangeReason::Decline
        }
    } else {
        ChangeReason::Stable
    }
}

/// Advances every living species from a frozen snapshot into a fresh map.
pub struct PopulationSystem;

impl PopulationSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PopulationSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for PopulationSystem {
    fn name(&self) -> &str {
        "population"
    }

    fn run(
        &mut self,
        ctx: &SeasonContext,
        state: &mut GameState,
        frame: &mut SeasonFrame,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let snapshot = state.ecosystem.counts();
        let conditions = SeasonConditions {
            season: ctx.season,
            temperature: state.ecosystem.temperature,
            precipitation: state.ecosystem.precipitation,
            modifiers: &frame.modifiers,
        };

        let mut next = BTreeMap::new();
        let mut changes = Vec::with_capacity(state.ecosystem.populations.len());
        let mut extinct = Vec::new();
        for (id, previous) in &state.ecosystem.populations {
            let species = ctx
                .catalog
                .species(id)
                .ok_or_else(|| EngineError::UnknownSpecies(id.clone()))?;
            let step = simulate_species(
                species,
                previous,
                &snapshot,
                ctx.catalog.food_web(),
                &conditions,
                ctx.config,
            );
            let reason = classify_change(previous.current, &step);
            changes.push(PopulationChange {
                species_id: id.clone(),
                previous: previous.current,
                current: step.population,
                change: step.population as i64 - previous.current as i64,
                reason,
            });
            debug!(
                season = ctx.season,
                species = %id,
                previous = previous.current,
                current = step.population,
                %reason,
                "Population updated"
            );

            if step.population == 0 {
                if previous.current > 0 {
                    extinct.push(id.clone());
                }
                continue;
            }
            next.insert(
                id.clone(),
                PopulationData {
                    species_id: id.clone(),
                    current: step.population,
                    carrying_capacity: previous.carrying_capacity,
                    growth: step.population as f64 - previous.current as f64,
                    deaths: step.environmental_deaths,
                    births: step.births,
                    predation_loss: step.predation,
                    starvation_loss: step.starvation,
                },
            );
        }

        state.ecosystem.populations = next;
        for id in &extinct {
            info!(season = ctx.season, species = %id, "Species went extinct");
            state.mark_removed(id);
        }
        if !extinct.is_empty() {
            state.refresh_available_species(ctx.catalog);
        }
        frame.result.changes = changes;
        frame.result.extinctions = extinct;
        Ok(())
    }
}
