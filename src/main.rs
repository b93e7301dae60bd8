use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ecosim::{
    catalog::CatalogLoader, config::SimulationConfig, engine::Engine, snapshot::SnapshotWriter,
    state::GameMode,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "EcoSystem season simulator")]
struct Cli {
    /// Path to the species/biome/event catalog
    #[arg(long, default_value = "data/catalog.yaml")]
    catalog: PathBuf,

    /// Optional simulation config YAML
    #[arg(long)]
    config: Option<PathBuf>,

    /// Biome id to start in
    #[arg(long, default_value = "grassland")]
    biome: String,

    /// Game mode: classic, sandbox or challenge
    #[arg(long, default_value = "classic")]
    mode: String,

    /// Number of seasons to run
    #[arg(long, default_value_t = 100)]
    seasons: u64,

    /// Override the configured random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Write a snapshot every N seasons (0 disables)
    #[arg(long, default_value_t = 0)]
    snapshot_interval: u64,

    /// Directory for snapshots
    #[arg(long, default_value = "snapshots")]
    snapshot_dir: PathBuf,
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => SimulationConfig::from_yaml(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.random_seed = seed;
    }
    init_tracing(&config.logging.level);

    let mode: GameMode = cli.mode.parse()?;
    let catalog = CatalogLoader::new(".").load(&cli.catalog)?;
    let mut engine = Engine::standard(catalog, config);
    let state = engine.initialize_game(&cli.biome, mode)?;
    let writer = SnapshotWriter::new(&cli.snapshot_dir, cli.snapshot_interval);

    let final_state = engine.run_with_hook(state, cli.seasons, |state, result| {
        for extinct in &result.extinctions {
            info!(season = result.season, species = %extinct, "Extinction");
        }
        if let Some(path) = writer.maybe_write(state, result)? {
            info!(path = %path.display(), "Snapshot written");
        }
        Ok(())
    })?;

    println!(
        "Biome '{}' ran {} seasons. Species alive: {}, biodiversity: {:.1}, stability: {:.1}, score: {:.0}",
        final_state.biome.name,
        final_state.season(),
        final_state.ecosystem.species_count(),
        final_state.ecosystem.biodiversity,
        final_state.ecosystem.stability,
        final_state.score
    );
    match final_state.game_over {
        Some(over) if over.victory => println!("Victory in season {}: {}", over.season, over.reason),
        Some(over) => println!("Game over in season {}: {}", over.season, over.reason),
        None => {}
    }
    for risk in engine.species_at_risk(&final_state) {
        println!(
            "  at risk ({:?}): {} with {} individuals",
            risk.risk, risk.name, risk.population
        );
    }
    Ok(())
}
