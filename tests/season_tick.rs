use ecosim::{
    catalog::{Catalog, CatalogLoader},
    config::SimulationConfig,
    engine::Engine,
    report::SeasonResult,
    state::{GameMode, GameOverReason, GameState},
};

fn catalog() -> Catalog {
    CatalogLoader::new(env!("CARGO_MANIFEST_DIR"))
        .load("data/catalog.yaml")
        .expect("catalog should load")
}

fn quiet_engine() -> Engine {
    Engine::standard(catalog(), SimulationConfig::default().without_events())
}

fn run_collecting(
    engine: &mut Engine,
    state: &GameState,
    seasons: u64,
) -> (GameState, Vec<SeasonResult>) {
    let mut state = state.clone();
    let mut results = Vec::new();
    for _ in 0..seasons {
        let outcome = engine.process_season_tick(&state).expect("tick succeeds");
        results.push(outcome.result);
        state = outcome.state;
    }
    (state, results)
}

#[test]
fn grassland_settles_without_events() {
    let mut engine = quiet_engine();
    let state = engine
        .initialize_game("grassland", GameMode::Classic)
        .expect("grassland exists");
    assert_eq!(state.ecosystem.species_count(), 3);
    assert_eq!(state.history.len(), 1);

    let (state, results) = run_collecting(&mut engine, &state, 20);

    assert!(results.iter().all(|r| r.extinctions.is_empty()));
    assert!(results.iter().all(|r| r.events.is_empty()));
    assert_eq!(state.season(), 20);
    assert_eq!(state.ecosystem.species_count(), 3);
    assert!(!state.is_game_over());
    assert!(state.ecosystem.biodiversity > 0.0);
    assert!(results[19].stability > results[4].stability);
    assert!(results[19].stability > 90.0);
    assert!(state.score > 0.0);
}

#[test]
fn tick_leaves_input_state_untouched() {
    let mut engine = Engine::standard(catalog(), SimulationConfig::default());
    let state = engine
        .initialize_game("grassland", GameMode::Challenge)
        .expect("grassland exists");
    let before = state.ecosystem.counts();

    let outcome = engine.process_season_tick(&state).expect("tick succeeds");

    assert_eq!(state.season(), 0);
    assert_eq!(state.ecosystem.counts(), before);
    assert_eq!(state.history.len(), 1);
    assert_eq!(state.score, 0.0);
    assert_eq!(outcome.state.season(), 1);
    assert_eq!(outcome.state.history.len(), 2);
    assert_eq!(outcome.result.changes.len(), 3);
}

#[test]
fn same_seed_same_seasons() {
    let mut config = SimulationConfig::default();
    config.random_seed = 4242;
    let catalog = catalog().with_event_probability(0.3);

    let mut first = Engine::standard(catalog.clone(), config.clone());
    let mut second = Engine::standard(catalog, config);
    let start = first
        .initialize_game("grassland", GameMode::Classic)
        .expect("grassland exists");

    let (a_state, a) = run_collecting(&mut first, &start, 30);
    let (b_state, b) = run_collecting(&mut second, &start, 30);

    assert_eq!(a, b);
    assert_eq!(a_state.ecosystem.counts(), b_state.ecosystem.counts());
    assert_eq!(a_state.active_events, b_state.active_events);
    assert!(a.iter().any(|r| !r.events.is_empty()));
}

#[test]
fn replaying_a_tick_is_repeatable() {
    let mut engine = Engine::standard(
        catalog().with_event_probability(0.5),
        SimulationConfig::default(),
    );
    let state = engine
        .initialize_game("wetland", GameMode::Classic)
        .expect("wetland exists");
    let once = engine.process_season_tick(&state).expect("tick succeeds");
    let again = engine.process_season_tick(&state).expect("tick succeeds");
    assert_eq!(once.result, again.result);
}

#[test]
fn history_is_capped() {
    let mut config = SimulationConfig::default().without_events();
    config.history_limit = 12;
    config.stability_window = 5;
    let mut engine = Engine::standard(catalog(), config);
    let state = engine
        .initialize_game("grassland", GameMode::Classic)
        .expect("grassland exists");

    let state = engine.run(state, 30).expect("run succeeds");

    assert_eq!(state.history.len(), 12);
    assert_eq!(state.history.back().map(|s| s.season), Some(30));
    assert_eq!(state.history.front().map(|s| s.season), Some(19));
}

fn lethal_grassland(engine: &Engine) -> GameState {
    let mut state = engine
        .initialize_game("grassland", GameMode::Classic)
        .expect("grassland exists");
    state.biome.temperature = 80.0;
    state
}

fn run_until_over(engine: &mut Engine, state: GameState, max: u64) -> (GameState, Vec<String>) {
    let mut state = state;
    let mut extinct = Vec::new();
    for _ in 0..max {
        let outcome = engine.process_season_tick(&state).expect("tick succeeds");
        extinct.extend(outcome.result.extinctions.iter().cloned());
        state = outcome.state;
        if state.is_game_over() {
            break;
        }
    }
    (state, extinct)
}

#[test]
fn lethal_climate_collapses_the_desert_roster() {
    let mut engine = quiet_engine();
    let mut state = engine
        .initialize_game("desert", GameMode::Classic)
        .expect("desert exists");
    state.biome.temperature = 80.0;

    let (state, mut extinct) = run_until_over(&mut engine, state, 5);

    assert_eq!(state.game_over_reason(), Some(GameOverReason::EcosystemCollapse));
    assert!(state.season() <= 5);
    extinct.sort();
    assert_eq!(extinct, vec!["cactus", "grasshopper", "lizard"]);
}

#[test]
fn lethal_climate_wipes_out_every_biome_from_base_populations() {
    let mut engine = quiet_engine();
    let biomes: Vec<String> = engine.catalog().biomes().map(|b| b.id.clone()).collect();
    assert_eq!(biomes.len(), 4);
    for biome in biomes {
        let mut state = engine
            .initialize_game(&biome, GameMode::Classic)
            .expect("catalog biome");
        state.biome.temperature = 80.0;
        let start = state.ecosystem.total_population();

        let (after_five, _) = run_until_over(&mut engine, state.clone(), 5);
        assert!(
            after_five.ecosystem.total_population() * 100 < start,
            "{biome}: {} of {start} left after five lethal seasons",
            after_five.ecosystem.total_population()
        );

        let (end, _) = run_until_over(&mut engine, state, 10);
        assert_eq!(
            end.game_over_reason(),
            Some(GameOverReason::EcosystemCollapse),
            "{biome} should collapse"
        );
    }
}

/// Every tick keeps at least a fifth of each population, so a roster only
/// dies out within five lethal seasons once it starts below roughly 150.
#[test]
fn lethal_climate_collapses_a_thinned_grassland_within_five_seasons() {
    let mut engine = quiet_engine();
    let mut state = lethal_grassland(&engine);
    for data in state.ecosystem.populations.values_mut() {
        data.current = 40;
    }

    let (state, mut extinct) = run_until_over(&mut engine, state, 5);

    assert!(state.is_game_over());
    assert_eq!(state.game_over_reason(), Some(GameOverReason::EcosystemCollapse));
    assert_eq!(state.ecosystem.species_count(), 0);
    extinct.sort();
    assert_eq!(extinct, vec!["fox", "grass", "rabbit"]);
    assert!(state.removed_species.contains(&"grass".to_string()));
    let over = state.game_over.expect("game over recorded");
    assert!(!over.victory);
    assert!(over.season <= 5);
}

#[test]
fn invasive_pressure_ends_the_game_and_stays_ended() {
    let mut engine = quiet_engine();
    let state = engine
        .initialize_game("grassland", GameMode::Classic)
        .expect("grassland exists");
    let state = engine.introduce_species(&state, "kudzu").expect("kudzu fits");
    let state = engine.introduce_species(&state, "fire_ant").expect("ants fit");
    assert_eq!(state.ecosystem.biodiversity, 0.0);

    let outcome = engine.process_season_tick(&state).expect("tick succeeds");
    let over = outcome.state.game_over.expect("crisis ends the game");
    assert_eq!(over.reason, GameOverReason::BiodiversityCrisis);
    assert_eq!(over.season, 1);
    assert_eq!(outcome.result.game_over, Some(over));

    let mut state = outcome.state;
    for _ in 0..3 {
        state = engine.process_season_tick(&state).expect("tick succeeds").state;
        assert_eq!(state.game_over, Some(over));
    }
}

#[test]
fn sandbox_only_ends_on_collapse() {
    let mut engine = quiet_engine();
    let state = engine
        .initialize_game("grassland", GameMode::Sandbox)
        .expect("grassland exists");
    let state = engine.introduce_species(&state, "kudzu").expect("kudzu fits");
    let state = engine.introduce_species(&state, "fire_ant").expect("ants fit");

    let state = engine.run(state, 5).expect("run succeeds");

    assert_eq!(state.season(), 5);
    assert!(!state.is_game_over());
}

#[test]
fn sandbox_never_rolls_events() {
    let mut engine = Engine::standard(
        catalog().with_event_probability(1.0),
        SimulationConfig::default(),
    );
    let state = engine
        .initialize_game("forest", GameMode::Sandbox)
        .expect("forest exists");
    let (state, results) = run_collecting(&mut engine, &state, 10);
    assert!(state.active_events.is_empty());
    assert!(results.iter().all(|r| r.events.is_empty()));
}

#[test]
fn run_stops_once_the_game_is_over() {
    let mut engine = quiet_engine();
    let state = engine
        .initialize_game("grassland", GameMode::Classic)
        .expect("grassland exists");
    let state = engine.introduce_species(&state, "kudzu").expect("kudzu fits");
    let state = engine.introduce_species(&state, "fire_ant").expect("ants fit");

    let mut seasons = Vec::new();
    let state = engine
        .run_with_hook(state, 10, |_, result| {
            seasons.push(result.season);
            Ok(())
        })
        .expect("run succeeds");

    assert_eq!(seasons, vec![1]);
    assert_eq!(state.season(), 1);
}

#[test]
fn unknown_biome_is_rejected() {
    let engine = quiet_engine();
    let err = engine
        .initialize_game("tundra", GameMode::Classic)
        .expect_err("no tundra in the catalog");
    assert!(err.to_string().contains("tundra"));
}
