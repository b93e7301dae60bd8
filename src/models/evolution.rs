use crate::catalog::Species;

/// Survival at or above this level is comfortable and blocks adaptation.
pub const PRESSURE_THRESHOLD: f64 = 0.8;

pub fn is_evolution_season(season: u64, interval: u64) -> bool {
    interval > 0 && season > 0 && season % interval == 0
}

/// Adaptive population bump for a species under climate pressure.
///
/// `survival` is the combined temperature and water multiplier for this
/// season. Adaptation only happens below [`PRESSURE_THRESHOLD`] and scales
/// with the pressure `1 - survival`: the adapted growth rate is
/// `r × (1 + potential × pressure × 0.1)` and the population gains a tenth of
/// the rate difference.
pub fn evolution_bump(species: &Species, population: f64, survival: f64) -> f64 {
    if survival >= PRESSURE_THRESHOLD || population <= 0.0 {
        return 0.0;
    }
    let pressure = 1.0 - survival;
    let adaptation = species.evolution_potential * pressure * 10.0 * 0.01;
    let adapted_rate = species.growth_rate * (1.0 + adaptation);
    population * (adapted_rate - species.growth_rate) * 0.1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TrophicLevel;

    fn adaptable() -> Species {
        let mut species = Species::new("finch", TrophicLevel::PrimaryConsumer);
        species.growth_rate = 0.5;
        species.evolution_potential = 0.8;
        species
    }

    #[test]
    fn runs_every_tenth_season() {
        assert!(!is_evolution_season(0, 10));
        assert!(!is_evolution_season(9, 10));
        assert!(is_evolution_season(10, 10));
        assert!(is_evolution_season(30, 10));
        assert!(!is_evolution_season(10, 0));
    }

    #[test]
    fn bump_grows_with_pressure() {
        let species = adaptable();
        // pressure 0.5: adaptation = 0.04; rate diff = 0.02; bump = 200 * 0.02 * 0.1
        assert!((evolution_bump(&species, 200.0, 0.5) - 0.4).abs() < 1e-9);
        // pressure 0.8: adaptation = 0.064; rate diff = 0.032
        assert!((evolution_bump(&species, 200.0, 0.2) - 0.64).abs() < 1e-9);
        assert!(evolution_bump(&species, 200.0, 0.2) > evolution_bump(&species, 200.0, 0.5));
    }

    #[test]
    fn comfortable_conditions_do_not_adapt() {
        let species = adaptable();
        assert_eq!(evolution_bump(&species, 200.0, 1.0), 0.0);
        assert_eq!(evolution_bump(&species, 200.0, 0.8), 0.0);
        assert_eq!(evolution_bump(&species, 0.0, 0.5), 0.0);
    }
}
