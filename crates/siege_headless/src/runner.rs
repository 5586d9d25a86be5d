//! Auto-played headless games.
//!
//! A game is a [`Simulation`] driven by an [`AutoPlayer`]: the player acts
//! between waves and at a fixed interval during them, the next wave starts
//! as soon as the previous one is cleared, and the game ends on defeat,
//! after the wave limit, or when the game-time budget runs out.

use serde::{Deserialize, Serialize};
use siege_core::config::{Balance, Progression};
use siege_core::error::Result;
use siege_core::simulation::Simulation;
use siege_core::wave::WavePhase;
use tracing::debug;

use crate::metrics::{GameMetrics, MetricsCollector};
use crate::strategies::{AutoPlayer, Strategy};

/// Simulation step used by headless games (60 steps per second).
pub const DEFAULT_TICK_MS: u64 = 16;

/// Configuration for one headless game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Random seed.
    pub seed: u64,
    /// Auto-player behaviour.
    pub strategy: Strategy,
    /// Waves to survive; clearing the last one ends the game.
    pub max_waves: u32,
    /// Milliseconds per simulation step.
    pub tick_ms: u64,
    /// Game-time budget (0 = unlimited).
    pub max_game_ms: u64,
    /// How often the auto-player acts during a wave.
    pub decision_interval_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            strategy: Strategy::Balanced,
            max_waves: 10,
            tick_ms: DEFAULT_TICK_MS,
            max_game_ms: 60 * 60 * 1000,
            decision_interval_ms: 1_000,
        }
    }
}

impl GameConfig {
    /// Config for a seed with defaults elsewhere.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }

    /// Set the strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the wave limit.
    #[must_use]
    pub fn with_max_waves(mut self, max_waves: u32) -> Self {
        self.max_waves = max_waves;
        self
    }
}

/// Play one game to completion.
///
/// # Errors
///
/// Only configuration problems reported by [`Simulation::new`].
pub fn run_game(balance: &Balance, progression: &Progression, config: &GameConfig) -> Result<GameMetrics> {
    let mut balance = balance.clone();
    balance.waves.final_wave = Some(config.max_waves.max(1));
    // Waves are started by the runner right after the player's turn.
    balance.waves.wave_gap_ms = None;

    let mut sim = Simulation::new(balance, progression.clone(), config.seed)?;
    let mut player = AutoPlayer::new(config.strategy);
    let mut collector = MetricsCollector::new(config.seed, config.strategy.name());
    let tick_ms = config.tick_ms.max(1);
    let mut next_decision_ms = 0u64;

    debug!(seed = config.seed, strategy = %config.strategy, "Game started");

    while !sim.outcome().is_decided() {
        if config.max_game_ms > 0 && sim.now_ms() >= config.max_game_ms {
            debug!(seed = config.seed, now_ms = sim.now_ms(), "Game timed out");
            break;
        }

        if sim.wave_scheduler().phase() == WavePhase::Idle {
            player.act(&mut sim);
            sim.start_next_wave()?;
            next_decision_ms = sim.now_ms() + config.decision_interval_ms;
        } else if sim.now_ms() >= next_decision_ms {
            player.act(&mut sim);
            next_decision_ms = sim.now_ms() + config.decision_interval_ms;
        }

        let events = sim.advance(tick_ms);
        collector.record(&events.events);
    }

    let metrics = collector.finish(&sim);
    debug!(
        seed = config.seed,
        result = ?metrics.result,
        waves_cleared = metrics.waves_cleared,
        "Game finished"
    );
    Ok(metrics)
}

/// Run the same game `runs` times and return each final state hash.
///
/// # Errors
///
/// Configuration problems reported by [`Simulation::new`].
pub fn replay_hashes(
    balance: &Balance,
    progression: &Progression,
    config: &GameConfig,
    runs: u32,
) -> Result<Vec<u64>> {
    (0..runs)
        .map(|_| run_game(balance, progression, config).map(|m| m.final_state_hash))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::GameResult;

    fn quick(seed: u64, strategy: Strategy, waves: u32) -> GameConfig {
        GameConfig {
            tick_ms: 50,
            ..GameConfig::new(seed)
                .with_strategy(strategy)
                .with_max_waves(waves)
        }
    }

    #[test]
    fn test_balanced_survives_opening_waves() {
        let metrics = run_game(
            &Balance::default(),
            &Progression::default(),
            &quick(1, Strategy::Balanced, 2),
        )
        .unwrap();

        assert_eq!(metrics.result, GameResult::Survived);
        assert_eq!(metrics.waves_cleared, 2);
        // Wave 1 has 2 goblins, wave 2 has 3.
        assert_eq!(metrics.enemies_killed, 5);
        assert_eq!(metrics.kills_by_kind.get("Goblin"), Some(&5));
        assert_eq!((metrics.gold_earned, metrics.wood_earned), (160, 64));
        assert!(metrics.units_bought.values().sum::<u32>() >= 3);
    }

    #[test]
    fn test_idle_castle_falls_eventually() {
        let mut balance = Balance::default();
        balance.castle.base_health = 50;
        let metrics = run_game(
            &balance,
            &Progression::default(),
            &quick(4, Strategy::Idle, 10),
        )
        .unwrap();

        assert_eq!(metrics.result, GameResult::Defeated);
        assert_eq!(metrics.castle_health_left, 0);
        assert!(metrics.units_bought.is_empty());
        assert_eq!(metrics.final_wave, 1);
    }

    #[test]
    fn test_time_budget() {
        let config = GameConfig {
            max_game_ms: 2_000,
            ..quick(2, Strategy::Balanced, 10)
        };
        let metrics = run_game(&Balance::default(), &Progression::default(), &config).unwrap();

        assert_eq!(metrics.result, GameResult::TimedOut);
        assert!(metrics.game_time_ms >= 2_000);
        assert!(metrics.game_time_ms < 2_100);
    }

    #[test]
    fn test_same_seed_same_report() {
        let config = quick(9, Strategy::Turtle, 3);
        let a = run_game(&Balance::default(), &Progression::default(), &config).unwrap();
        let b = run_game(&Balance::default(), &Progression::default(), &config).unwrap();
        assert_eq!(a, b);

        let hashes = replay_hashes(&Balance::default(), &Progression::default(), &config, 3).unwrap();
        assert!(hashes.iter().all(|h| *h == a.final_state_hash));
    }

    #[test]
    fn test_invalid_balance_is_an_error() {
        let mut balance = Balance::default();
        balance.enemies.clear();
        assert!(run_game(&balance, &Progression::default(), &GameConfig::new(1)).is_err());
    }
}
