pub mod actions;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod models;
pub mod report;
pub mod rng;
pub mod scoring;
pub mod snapshot;
pub mod state;
pub mod systems;

pub use actions::ActionError;
pub use catalog::{Catalog, CatalogLoader};
pub use config::SimulationConfig;
pub use engine::{Engine, EngineBuilder, EngineError, SeasonOutcome};
pub use report::SeasonResult;
pub use state::{GameMode, GameState};
