//! Player actions between seasons.
//!
//! Each action takes the current state and returns either a new state or the
//! reason it was refused. The input state is never modified.

use thiserror::Error;
use tracing::{debug, info};

use crate::{
    catalog::Catalog,
    scoring,
    state::{GameState, PopulationData},
};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ActionError {
    #[error("Species not found")]
    SpeciesNotFound,
    #[error("Species already exists in ecosystem")]
    AlreadyPresent,
    #[error("Species not in ecosystem")]
    NotPresent,
    #[error("{species} cannot survive in {biome}")]
    HabitatIncompatible { species: String, biome: String },
    #[error("Event not found")]
    EventNotFound,
    #[error("Event is not active")]
    EventNotActive,
    #[error("Not enough points to prevent {event} (costs {cost:.0}, have {available:.0})")]
    InsufficientScore {
        event: String,
        cost: f64,
        available: f64,
    },
    #[error("Game is over")]
    GameOver,
}

fn ensure_running(state: &GameState) -> Result<(), ActionError> {
    if state.is_game_over() {
        Err(ActionError::GameOver)
    } else {
        Ok(())
    }
}

fn rescore(state: &mut GameState, catalog: &Catalog) {
    let raw = scoring::raw_biodiversity(&state.ecosystem, catalog);
    state.ecosystem.biodiversity = scoring::reported_biodiversity(raw);
    state.refresh_available_species(catalog);
}

pub fn introduce_species(
    catalog: &Catalog,
    state: &GameState,
    species_id: &str,
) -> Result<GameState, ActionError> {
    ensure_running(state)?;
    let species = catalog.species(species_id).ok_or_else(|| {
        debug!(species = species_id, "Introduction refused: unknown species");
        ActionError::SpeciesNotFound
    })?;
    if state.ecosystem.populations.contains_key(species_id) {
        return Err(ActionError::AlreadyPresent);
    }
    if !species.can_live_in(&state.biome) {
        debug!(species = species_id, biome = %state.biome.id, "Introduction refused: habitat");
        return Err(ActionError::HabitatIncompatible {
            species: species.name.clone(),
            biome: state.biome.name.clone(),
        });
    }

    let mut next = state.clone();
    next.ecosystem
        .populations
        .insert(species.id.clone(), PopulationData::introduce(species));
    next.removed_species.retain(|id| id != species_id);
    rescore(&mut next, catalog);
    info!(
        season = next.season(),
        species = species_id,
        population = species.base_population,
        "Species introduced"
    );
    Ok(next)
}

pub fn remove_species(
    catalog: &Catalog,
    state: &GameState,
    species_id: &str,
) -> Result<GameState, ActionError> {
    ensure_running(state)?;
    if catalog.species(species_id).is_none() {
        return Err(ActionError::SpeciesNotFound);
    }
    if !state.ecosystem.populations.contains_key(species_id) {
        return Err(ActionError::NotPresent);
    }

    let mut next = state.clone();
    next.ecosystem.populations.remove(species_id);
    next.mark_removed(species_id);
    rescore(&mut next, catalog);
    info!(season = next.season(), species = species_id, "Species removed");
    Ok(next)
}

/// Cancels an active event by paying its prevention cost from the score.
pub fn prevent_event(
    catalog: &Catalog,
    state: &GameState,
    event_id: &str,
) -> Result<GameState, ActionError> {
    ensure_running(state)?;
    let event = catalog.event(event_id).ok_or(ActionError::EventNotFound)?;
    if !state.active_events.iter().any(|a| a.event_id == event_id) {
        return Err(ActionError::EventNotActive);
    }
    if state.score < event.prevention_cost {
        return Err(ActionError::InsufficientScore {
            event: event.name.clone(),
            cost: event.prevention_cost,
            available: state.score,
        });
    }

    let mut next = state.clone();
    next.active_events.retain(|a| a.event_id != event_id);
    next.score -= event.prevention_cost;
    info!(
        season = next.season(),
        event = event_id,
        cost = event.prevention_cost,
        "Event prevented"
    );
    Ok(next)
}
