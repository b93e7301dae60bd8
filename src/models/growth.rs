/// Logistic growth `r × N × (1 − N/K)`; zero at or beyond capacity.
pub fn logistic_growth(rate: f64, population: f64, carrying_capacity: f64) -> f64 {
    if population <= 0.0 || carrying_capacity <= 0.0 || population >= carrying_capacity {
        return 0.0;
    }
    rate * population * (1.0 - population / carrying_capacity)
}
