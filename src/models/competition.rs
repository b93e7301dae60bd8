/// Density damping applied to logistic growth.
///
/// No damping up to half of capacity, then `1 − (N/K − 0.5)` with a floor of 0.5.
pub fn damping_factor(population: f64, carrying_capacity: f64) -> f64 {
    if carrying_capacity <= 0.0 {
        return 1.0;
    }
    let ratio = population / carrying_capacity;
    if ratio <= 0.5 {
        1.0
    } else {
        (1.0 - (ratio - 0.5)).max(0.5)
    }
}

/// Births for this season: raw logistic growth after damping.
pub fn damped_growth(raw_growth: f64, population: f64, carrying_capacity: f64) -> f64 {
    raw_growth * damping_factor(population, carrying_capacity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undamped_below_half() {
        assert_eq!(damping_factor(10.0, 100.0), 1.0);
        assert_eq!(damping_factor(50.0, 100.0), 1.0);
    }

    #[test]
    fn linear_then_floored() {
        assert!((damping_factor(80.0, 100.0) - 0.7).abs() < 1e-12);
        assert_eq!(damping_factor(100.0, 100.0), 0.5);
        assert_eq!(damping_factor(400.0, 100.0), 0.5);
    }

    #[test]
    fn applies_multiplicatively() {
        assert!((damped_growth(10.0, 80.0, 100.0) - 7.0).abs() < 1e-9);
    }
}
