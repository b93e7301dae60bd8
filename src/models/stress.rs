use crate::catalog::Species;

/// Survival multiplier outside the tolerated temperature range.
pub const OUT_OF_RANGE_SURVIVAL: f64 = 0.2;
/// Lowest survival inside the range, reached at its edges.
pub const EDGE_SURVIVAL: f64 = 0.5;

/// Temperature survival multiplier in `[0.2, 1.0]`.
pub fn temperature_stress(species: &Species, temperature: f64) -> f64 {
    let range = &species.temperature_range;
    if !range.contains(temperature) {
        return OUT_OF_RANGE_SURVIVAL;
    }
    let half_width = range.half_width();
    if half_width <= 0.0 {
        return 1.0;
    }
    let distance_ratio = (temperature - range.midpoint()).abs() / half_width;
    (1.0 - distance_ratio * 0.5).max(EDGE_SURVIVAL)
}

/// Banded water survival multiplier: one of `0.6`, `0.8` or `1.0`.
pub fn water_stress(species: &Species, precipitation: f64) -> f64 {
    let requirement = species.water_requirement;
    if precipitation < 300.0 && requirement > 0.7 {
        0.6
    } else if precipitation < 500.0 && requirement > 0.5 {
        0.8
    } else {
        1.0
    }
}

/// Combined temperature and water survival for this season.
pub fn environmental_survival(species: &Species, temperature: f64, precipitation: f64) -> f64 {
    temperature_stress(species, temperature) * water_stress(species, precipitation)
}

/// Individuals lost to climate: `population × (1 − survival)`.
pub fn environmental_deaths(population: f64, survival: f64) -> f64 {
    population * (1.0 - survival)
}
