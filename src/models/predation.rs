use std::collections::BTreeMap;

use crate::catalog::{FoodWeb, Species};

/// Mass-action predation constants.
#[derive(Debug, Clone, Copy)]
pub struct PredationParams {
    pub efficiency: f64,
    pub rate: f64,
}

impl Default for PredationParams {
    fn default() -> Self {
        Self {
            efficiency: 0.5,
            rate: 0.0001,
        }
    }
}

/// Losses to every living predator of `species`.
///
/// Each predator contributes `efficiency × prey × predator × rate`, with the
/// predator count taken from the pre-tick snapshot. Apex species are never
/// hunted.
pub fn predation_loss(
    species: &Species,
    prey_population: f64,
    snapshot: &BTreeMap<String, u64>,
    food_web: &FoodWeb,
    params: PredationParams,
) -> f64 {
    if species.trophic_level.is_apex() || prey_population <= 0.0 {
        return 0.0;
    }
    food_web
        .predators_of(&species.id)
        .iter()
        .filter_map(|predator| snapshot.get(predator))
        .filter(|&&count| count > 0)
        .map(|&count| params.efficiency * prey_population * count as f64 * params.rate)
        .sum()
}
