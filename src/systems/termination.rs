use anyhow::Result;
use tracing::info;

use crate::{
    config::SimulationConfig,
    engine::{SeasonContext, SeasonFrame, System},
    rng::SystemRng,
    state::{GameOver, GameOverReason, GameState},
};

/// Win/loss verdict for a freshly advanced state, if any.
///
/// Collapse is checked first, then the biodiversity crisis (on the unclamped
/// score), then victory.
pub fn evaluate_termination(
    state: &GameState,
    raw_biodiversity: f64,
    config: &SimulationConfig,
) -> Option<GameOver> {
    let season = state.season();
    let loss = |reason| GameOver {
        victory: false,
        reason,
        season,
    };

    if state.ecosystem.species_count() == 0 {
        return Some(loss(GameOverReason::EcosystemCollapse));
    }
    if !state.mode.enforces_objectives() {
        return None;
    }
    if raw_biodiversity < 0.0 {
        return Some(loss(GameOverReason::BiodiversityCrisis));
    }
    let target = state.biome.biodiversity_target * 100.0;
    if state.ecosystem.biodiversity >= target && season >= config.victory_min_season {
        return Some(GameOver {
            victory: true,
            reason: GameOverReason::BiodiversityTargetReached,
            season,
        });
    }
    None
}

/// Sets the game-over flag once; it is never cleared afterwards.
pub struct TerminationSystem;

impl TerminationSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TerminationSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for TerminationSystem {
    fn name(&self) -> &str {
        "termination"
    }

    fn run(
        &mut self,
        ctx: &SeasonContext,
        state: &mut GameState,
        frame: &mut SeasonFrame,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        if state.game_over.is_some() {
            return Ok(());
        }
        if let Some(verdict) = evaluate_termination(state, frame.raw_biodiversity, ctx.config) {
            info!(
                season = ctx.season,
                victory = verdict.victory,
                reason = %verdict.reason,
                score = state.score,
                "Game over"
            );
            state.game_over = Some(verdict);
        }
        Ok(())
    }
}
