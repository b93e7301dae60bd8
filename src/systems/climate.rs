use anyhow::Result;

use crate::{
    engine::{SeasonContext, SeasonFrame, System},
    rng::SystemRng,
    state::GameState,
};

/// Temperature swing over the four-season cycle, as a fraction of amplitude.
const SEASON_CYCLE: [f64; 4] = [0.0, 1.0, 0.0, -1.0];

pub fn seasonal_offset(season: u64, seasonality: f64, amplitude: f64) -> f64 {
    SEASON_CYCLE[(season % 4) as usize] * seasonality * amplitude
}

/// Sets this season's temperature and precipitation from the biome baseline,
/// the seasonal cycle and the summed event deltas.
pub struct ClimateSystem;

impl ClimateSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ClimateSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for ClimateSystem {
    fn name(&self) -> &str {
        "climate"
    }

    fn run(
        &mut self,
        ctx: &SeasonContext,
        state: &mut GameState,
        frame: &mut SeasonFrame,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let biome = &state.biome;
        let offset = seasonal_offset(ctx.season, biome.seasonality, ctx.config.seasonal_amplitude_c);
        state.ecosystem.temperature =
            biome.temperature + offset + frame.modifiers.temperature_delta;
        state.ecosystem.precipitation =
            (biome.precipitation + frame.modifiers.precipitation_delta).max(0.0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_peaks_in_second_season() {
        assert_eq!(seasonal_offset(0, 0.5, 8.0), 0.0);
        assert_eq!(seasonal_offset(1, 0.5, 8.0), 4.0);
        assert_eq!(seasonal_offset(2, 0.5, 8.0), 0.0);
        assert_eq!(seasonal_offset(3, 0.5, 8.0), -4.0);
        assert_eq!(seasonal_offset(5, 0.5, 8.0), 4.0);
    }

    #[test]
    fn flat_biomes_do_not_swing() {
        assert_eq!(seasonal_offset(1, 0.0, 8.0), 0.0);
    }
}
