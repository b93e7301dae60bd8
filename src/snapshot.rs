use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    report::SeasonResult,
    state::{ActiveEvent, GameOver, GameState},
};

/// One season as written to disk by the runner.
#[derive(Debug, Serialize, Deserialize)]
pub struct SeasonSnapshot {
    pub biome: String,
    pub season: u64,
    pub written_at: DateTime<Utc>,
    pub temperature: f64,
    pub precipitation: f64,
    pub biodiversity: f64,
    pub stability: f64,
    pub score: f64,
    pub populations: BTreeMap<String, u64>,
    pub active_events: Vec<ActiveEvent>,
    pub result: SeasonResult,
    pub game_over: Option<GameOver>,
}

impl SeasonSnapshot {
    pub fn capture(state: &GameState, result: &SeasonResult) -> Self {
        Self {
            biome: state.biome.id.clone(),
            season: state.season(),
            written_at: Utc::now(),
            temperature: state.ecosystem.temperature,
            precipitation: state.ecosystem.precipitation,
            biodiversity: state.ecosystem.biodiversity,
            stability: state.ecosystem.stability,
            score: state.score,
            populations: state.ecosystem.counts(),
            active_events: state.active_events.clone(),
            result: result.clone(),
            game_over: state.game_over,
        }
    }
}

pub struct SnapshotWriter {
    dir: PathBuf,
    interval: u64,
}

impl SnapshotWriter {
    pub fn new(dir: impl AsRef<Path>, interval: u64) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            interval,
        }
    }

    /// Writes every `interval` seasons and always on the season the game ends.
    pub fn maybe_write(&self, state: &GameState, result: &SeasonResult) -> Result<Option<PathBuf>> {
        if self.interval == 0 {
            return Ok(None);
        }
        let season = state.season();
        let ended_now = result.game_over.map(|over| over.season) == Some(season);
        if season % self.interval != 0 && !ended_now {
            return Ok(None);
        }

        let dir = self.dir.join(&state.biome.id);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create snapshot dir {}", dir.display()))?;
        let file_path = dir.join(format!("season_{season:06}.json"));
        let json = serde_json::to_string_pretty(&SeasonSnapshot::capture(state, result))?;
        fs::write(&file_path, json)
            .with_context(|| format!("Failed to write snapshot {}", file_path.display()))?;
        Ok(Some(file_path))
    }
}
