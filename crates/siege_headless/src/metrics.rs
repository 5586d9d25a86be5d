//! Game metrics collection for balance analysis.
//!
//! A [`MetricsCollector`] watches the events of each tick and folds them
//! into a [`GameMetrics`] report; [`BatchSummary`] aggregates many reports.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use siege_core::components::CombatantKind;
use siege_core::events::SimEvent;
use siege_core::simulation::{Outcome, Simulation};

/// How a headless game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    /// The wave limit was cleared.
    Survived,
    /// The castle fell.
    Defeated,
    /// Game time ran out first.
    #[default]
    TimedOut,
}

/// Complete metrics for a single game.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameMetrics {
    /// Random seed used.
    pub seed: u64,
    /// Auto-player strategy name.
    pub strategy: String,
    /// How the game ended.
    pub result: GameResult,
    /// Waves fully cleared.
    pub waves_cleared: u32,
    /// Wave in progress when the game ended.
    pub final_wave: u32,
    /// Game time played.
    pub game_time_ms: u64,
    /// Enemies killed, boss kills included.
    pub enemies_killed: u32,
    /// Bosses killed.
    pub bosses_killed: u32,
    /// Kills by enemy type name.
    pub kills_by_kind: BTreeMap<String, u32>,
    /// Units bought by type name.
    pub units_bought: BTreeMap<String, u32>,
    /// Units that died.
    pub units_lost: u32,
    /// Castle levels gained.
    pub castle_upgrades: u32,
    /// Castle level at the end.
    pub castle_level: u32,
    /// Damage the castle absorbed, fence included.
    pub castle_damage_taken: u64,
    /// Castle health left (0 when destroyed).
    pub castle_health_left: u32,
    /// Fences broken.
    pub fences_broken: u32,
    /// Projectiles fired by either side.
    pub projectiles_fired: u32,
    /// Gold credited by wave rewards.
    pub gold_earned: u32,
    /// Wood credited by wave rewards.
    pub wood_earned: u32,
    /// Final simulation state hash (for determinism validation).
    pub final_state_hash: u64,
}

impl GameMetrics {
    /// Create an empty report.
    #[must_use]
    pub fn new(seed: u64, strategy: impl Into<String>) -> Self {
        Self {
            seed,
            strategy: strategy.into(),
            ..Default::default()
        }
    }
}

/// Folds tick events into a [`GameMetrics`].
#[derive(Debug, Clone)]
pub struct MetricsCollector {
    metrics: GameMetrics,
}

impl MetricsCollector {
    /// Start collecting for one game.
    #[must_use]
    pub fn new(seed: u64, strategy: impl Into<String>) -> Self {
        Self {
            metrics: GameMetrics::new(seed, strategy),
        }
    }

    /// Record the events of one tick.
    pub fn record(&mut self, events: &[SimEvent]) {
        let m = &mut self.metrics;
        for event in events {
            match event {
                SimEvent::EntityDied {
                    kind: CombatantKind::Enemy(enemy),
                    ..
                } => {
                    *m.kills_by_kind.entry(enemy.name().to_string()).or_insert(0) += 1;
                }
                SimEvent::UnitSpawned { kind, .. } => {
                    *m.units_bought.entry(kind.name().to_string()).or_insert(0) += 1;
                }
                SimEvent::FenceBroken => m.fences_broken += 1,
                SimEvent::ProjectileLaunched { .. } => m.projectiles_fired += 1,
                SimEvent::WaveCompleted { gold, wood, .. } => {
                    m.gold_earned += gold;
                    m.wood_earned += wood;
                }
                _ => {}
            }
        }
    }

    /// Finish the report from the final simulation state.
    #[must_use]
    pub fn finish(mut self, sim: &Simulation) -> GameMetrics {
        let stats = sim.stats();
        let waves = sim.wave_scheduler();
        let m = &mut self.metrics;

        m.result = match sim.outcome() {
            Outcome::Victory { .. } => GameResult::Survived,
            Outcome::Defeat { .. } => GameResult::Defeated,
            Outcome::InProgress => GameResult::TimedOut,
        };
        m.waves_cleared = waves.waves_cleared();
        m.final_wave = waves.wave();
        m.game_time_ms = sim.now_ms();
        m.enemies_killed = stats.enemies_killed;
        m.bosses_killed = stats.bosses_killed;
        m.units_lost = stats.units_lost;
        m.castle_upgrades = stats.castle_upgrades;
        m.castle_level = sim.castle_state().level();
        m.castle_damage_taken = stats.castle_damage_taken;
        m.castle_health_left = sim.castle().map_or(0, |castle| castle.health.current);
        m.final_state_hash = sim.state_hash();
        self.metrics
    }

    /// Enemy deaths recorded so far.
    #[must_use]
    pub fn kills_so_far(&self) -> u32 {
        self.metrics.kills_by_kind.values().sum()
    }
}

/// Aggregate statistics across many games.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Games in the summary.
    pub games: u32,
    /// Games that cleared the wave limit.
    pub survived: u32,
    /// Games where the castle fell.
    pub defeated: u32,
    /// Games that ran out of time.
    pub timed_out: u32,
    /// `survived / games`.
    pub survival_rate: f64,
    /// Mean waves cleared.
    pub mean_waves_cleared: f64,
    /// Fewest waves cleared in any game.
    pub min_waves_cleared: u32,
    /// Most waves cleared in any game.
    pub max_waves_cleared: u32,
    /// Mean enemies killed.
    pub mean_enemies_killed: f64,
    /// Bosses killed across all games.
    pub total_bosses_killed: u32,
    /// Mean castle damage taken.
    pub mean_castle_damage: f64,
    /// Wave each defeat happened on, with counts.
    pub defeats_by_wave: BTreeMap<u32, u32>,
}

impl BatchSummary {
    /// Summarize a set of game reports.
    #[must_use]
    pub fn from_games(games: &[GameMetrics]) -> Self {
        if games.is_empty() {
            return Self::default();
        }

        let count = games.len() as f64;
        let mut summary = Self {
            games: u32::try_from(games.len()).unwrap_or(u32::MAX),
            min_waves_cleared: u32::MAX,
            ..Self::default()
        };
        let mut waves = 0u64;
        let mut kills = 0u64;
        let mut damage = 0u64;

        for game in games {
            match game.result {
                GameResult::Survived => summary.survived += 1,
                GameResult::Defeated => {
                    summary.defeated += 1;
                    *summary.defeats_by_wave.entry(game.final_wave).or_insert(0) += 1;
                }
                GameResult::TimedOut => summary.timed_out += 1,
            }
            summary.min_waves_cleared = summary.min_waves_cleared.min(game.waves_cleared);
            summary.max_waves_cleared = summary.max_waves_cleared.max(game.waves_cleared);
            summary.total_bosses_killed += game.bosses_killed;
            waves += u64::from(game.waves_cleared);
            kills += u64::from(game.enemies_killed);
            damage += game.castle_damage_taken;
        }

        summary.survival_rate = f64::from(summary.survived) / count;
        summary.mean_waves_cleared = waves as f64 / count;
        summary.mean_enemies_killed = kills as f64 / count;
        summary.mean_castle_damage = damage as f64 / count;
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use siege_core::components::{EnemyKind, UnitKind};
    use siege_core::math::Vec2Fixed;

    fn game(result: GameResult, waves: u32, kills: u32) -> GameMetrics {
        GameMetrics {
            result,
            waves_cleared: waves,
            final_wave: waves + 1,
            enemies_killed: kills,
            ..GameMetrics::new(0, "test")
        }
    }

    #[test]
    fn test_collector_counts_events() {
        let mut collector = MetricsCollector::new(3, "balanced");
        collector.record(&[
            SimEvent::UnitSpawned {
                id: 2,
                kind: UnitKind::Archer,
            },
            SimEvent::EntityDied {
                id: 5,
                kind: CombatantKind::Enemy(EnemyKind::Orc),
                position: Vec2Fixed::ZERO,
            },
            SimEvent::EntityDied {
                id: 2,
                kind: CombatantKind::Unit(UnitKind::Archer),
                position: Vec2Fixed::ZERO,
            },
            SimEvent::FenceBroken,
            SimEvent::WaveCompleted {
                wave: 1,
                gold: 70,
                wood: 28,
            },
        ]);

        assert_eq!(collector.kills_so_far(), 1);
        let m = &collector.metrics;
        assert_eq!(m.kills_by_kind.get("Orc"), Some(&1));
        assert_eq!(m.units_bought.get("Archer"), Some(&1));
        assert_eq!(m.fences_broken, 1);
        assert_eq!((m.gold_earned, m.wood_earned), (70, 28));
    }

    #[test]
    fn test_summary() {
        let games = [
            game(GameResult::Survived, 5, 40),
            game(GameResult::Defeated, 2, 10),
            game(GameResult::Defeated, 3, 16),
            game(GameResult::TimedOut, 2, 14),
        ];
        let summary = BatchSummary::from_games(&games);

        assert_eq!(summary.games, 4);
        assert_eq!(summary.survived, 1);
        assert_eq!(summary.defeated, 2);
        assert_eq!(summary.timed_out, 1);
        assert!((summary.survival_rate - 0.25).abs() < 1e-9);
        assert!((summary.mean_waves_cleared - 3.0).abs() < 1e-9);
        assert!((summary.mean_enemies_killed - 20.0).abs() < 1e-9);
        assert_eq!(summary.min_waves_cleared, 2);
        assert_eq!(summary.max_waves_cleared, 5);
        assert_eq!(summary.defeats_by_wave.get(&3), Some(&1));
        assert_eq!(summary.defeats_by_wave.get(&4), Some(&1));
    }

    #[test]
    fn test_empty_summary() {
        assert_eq!(BatchSummary::from_games(&[]), BatchSummary::default());
    }
}
