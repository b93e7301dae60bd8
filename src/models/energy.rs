use std::collections::BTreeMap;

use crate::catalog::{FoodWeb, Species};

/// Energy available to a species this season.
///
/// `None` means unconstrained: producers and decomposers live on sunlight and
/// detritus. Consumers count `transfer` of each prey's snapshot population.
/// Prey are not decremented here; predation is accounted for separately.
pub fn energy_supply(
    species: &Species,
    snapshot: &BTreeMap<String, u64>,
    food_web: &FoodWeb,
    transfer: f64,
) -> Option<f64> {
    if species.trophic_level.is_self_sustaining() {
        return None;
    }
    let supply = food_web
        .prey_of(&species.id)
        .iter()
        .filter_map(|prey| snapshot.get(prey))
        .map(|&count| count as f64 * transfer)
        .sum();
    Some(supply)
}

pub fn energy_demand(species: &Species, population: f64) -> f64 {
    species.energy_requirement * population
}

/// `min(1, supply / demand)`; full survival when nothing is demanded.
pub fn survival_rate(supply: Option<f64>, demand: f64) -> f64 {
    match supply {
        None => 1.0,
        Some(_) if demand <= 0.0 => 1.0,
        Some(supply) => (supply / demand).clamp(0.0, 1.0),
    }
}

pub fn starvation_loss(population: f64, survival_rate: f64) -> f64 {
    population * (1.0 - survival_rate)
}
