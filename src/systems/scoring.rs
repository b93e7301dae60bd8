use anyhow::Result;
use tracing::info;

use crate::{
    engine::{SeasonContext, SeasonFrame, System},
    rng::SystemRng,
    scoring,
    state::{Achievement, GameState},
};

const BIODIVERSITY_MILESTONE: f64 = 500.0;
const STABLE_THRESHOLD: f64 = 80.0;
const STABLE_AFTER_SEASON: u64 = 20;

/// Records history, recomputes biodiversity and stability, awards
/// achievements and accumulates score.
pub struct ScoringSystem;

impl ScoringSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ScoringSystem {
    fn default() -> Self {
        Self::new()
    }
}

fn award(state: &mut GameState, earned: &mut Vec<Achievement>, achievement: Achievement) {
    if state.achievements.insert(achievement) {
        info!(season = state.season(), %achievement, "Achievement unlocked");
        earned.push(achievement);
    }
}

impl System for ScoringSystem {
    fn name(&self) -> &str {
        "scoring"
    }

    fn run(
        &mut self,
        ctx: &SeasonContext,
        state: &mut GameState,
        frame: &mut SeasonFrame,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        state.record_history(ctx.config.effective_history_limit());

        let raw = scoring::raw_biodiversity(&state.ecosystem, ctx.catalog);
        let biodiversity = scoring::reported_biodiversity(raw);
        let stability = scoring::stability(&state.history, ctx.config.stability_window);
        state.ecosystem.biodiversity = biodiversity;
        state.ecosystem.stability = stability;
        frame.raw_biodiversity = raw;

        let mut earned = Vec::new();
        if frame.previous_biodiversity < BIODIVERSITY_MILESTONE
            && biodiversity >= BIODIVERSITY_MILESTONE
        {
            award(state, &mut earned, Achievement::BiodiversityMilestone);
        }
        if stability > STABLE_THRESHOLD && ctx.season > STABLE_AFTER_SEASON {
            award(state, &mut earned, Achievement::StableEcosystem);
        }
        if scoring::has_complete_food_chain(&state.ecosystem, ctx.catalog) {
            award(state, &mut earned, Achievement::CompleteFoodChain);
        }

        let species_count = state.ecosystem.species_count() as f64;
        let score_delta = biodiversity * 0.1 + stability * 0.5 + species_count * 10.0;
        state.score += score_delta;

        frame.result.biodiversity = biodiversity;
        frame.result.stability = stability;
        frame.result.score_delta = score_delta;
        frame.result.achievements = earned;
        Ok(())
    }
}
