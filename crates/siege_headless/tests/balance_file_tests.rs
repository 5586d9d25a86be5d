//! Edited balance files flow through loading, games and batches.

use std::fs;

use siege_core::config::Balance;
use siege_headless::batch::{run_batch, BatchConfig};
use siege_headless::loader::{load_balance, load_progression};
use siege_headless::metrics::GameResult;
use siege_headless::runner::{run_game, GameConfig};
use siege_headless::strategies::Strategy;

fn quick_game(seed: u64, strategy: Strategy, waves: u32) -> GameConfig {
    GameConfig {
        tick_ms: 50,
        ..GameConfig::new(seed)
            .with_strategy(strategy)
            .with_max_waves(waves)
    }
}

#[test]
fn test_weakened_castle_from_file_loses() {
    let mut balance = Balance::default();
    balance.castle.base_health = 10;
    balance.starting_resources.gold = 0;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fragile.ron");
    fs::write(&path, ron::to_string(&balance).unwrap()).unwrap();

    let loaded = load_balance(&path).unwrap();
    assert_eq!(loaded, balance);

    let metrics = run_game(
        &loaded,
        &Default::default(),
        &quick_game(3, Strategy::Balanced, 5),
    )
    .unwrap();
    assert_eq!(metrics.result, GameResult::Defeated);
    assert!(metrics.units_bought.is_empty());
}

#[test]
fn test_progression_file_changes_the_game() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("progression.ron");
    fs::write(&path, "(castle_armor_level: 15)").unwrap();
    let progression = load_progression(&path).unwrap();

    let mut balance = Balance::default();
    balance.castle.base_health = 60;
    let config = quick_game(8, Strategy::Idle, 1);

    let plain = run_game(&balance, &Default::default(), &config).unwrap();
    let armored = run_game(&balance, &progression, &config).unwrap();

    assert_eq!(plain.result, GameResult::Defeated);
    // 70% reduction: goblin hits land for 1.
    assert!(armored.game_time_ms > plain.game_time_ms);
}

#[test]
fn test_batch_over_strategies() {
    let balance = Balance::default();
    for strategy in Strategy::ALL {
        let config = BatchConfig::new(3)
            .with_seed(40)
            .with_game(quick_game(0, strategy, 1));
        let results = run_batch(&balance, &Default::default(), config);

        assert_eq!(results.summary.games, 3);
        assert!(results.games.iter().all(|g| g.strategy == strategy.name()));
    }
}
