pub mod climate;
mod events;
mod population;
mod scoring;
mod termination;

pub use climate::ClimateSystem;
pub use events::{advance_events, aggregate_modifiers, EventModifiers, EventSystem};
pub use population::{
    classify_change, simulate_species, PopulationSystem, SeasonConditions, SpeciesStep,
};
pub use scoring::ScoringSystem;
pub use termination::{evaluate_termination, TerminationSystem};
