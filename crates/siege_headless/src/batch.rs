//! Batch game runner for balance testing.
//!
//! Runs many seeds in parallel using rayon and aggregates their metrics.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use siege_core::config::{Balance, Progression};
use tracing::{debug, info, warn};

use crate::metrics::{BatchSummary, GameMetrics};
use crate::runner::{replay_hashes, run_game, GameConfig};

/// Configuration for a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Number of games to run.
    pub game_count: u32,
    /// Seed of the first game; game `i` uses `seed_start + i`.
    pub seed_start: u64,
    /// Worker threads (0 = rayon default).
    pub parallel_games: u32,
    /// Template for every game; its seed is replaced per game.
    pub game: GameConfig,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            game_count: 100,
            seed_start: 0,
            parallel_games: 0,
            game: GameConfig::default(),
        }
    }
}

impl BatchConfig {
    /// Config for `game_count` games with defaults elsewhere.
    #[must_use]
    pub fn new(game_count: u32) -> Self {
        Self {
            game_count,
            ..Default::default()
        }
    }

    /// Set the first seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }

    /// Set the per-game template.
    #[must_use]
    pub fn with_game(mut self, game: GameConfig) -> Self {
        self.game = game;
        self
    }
}

/// Error during a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchError {
    /// Game index.
    pub game_index: u32,
    /// Seed used.
    pub seed: u64,
    /// Error message.
    pub message: String,
}

/// Results from a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used.
    pub config: BatchConfig,
    /// Individual game metrics, in seed order.
    pub games: Vec<GameMetrics>,
    /// Aggregate summary.
    pub summary: BatchSummary,
    /// Wall-clock runtime.
    pub duration_seconds: f64,
    /// Games that could not be played.
    pub errors: Vec<BatchError>,
}

impl BatchResults {
    /// Save results to a JSON file.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from a JSON file.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

/// Run a batch of games.
pub fn run_batch(balance: &Balance, progression: &Progression, config: BatchConfig) -> BatchResults {
    let start = Instant::now();
    let completed = AtomicU32::new(0);

    info!(
        games = config.game_count,
        seed_start = config.seed_start,
        strategy = %config.game.strategy,
        max_waves = config.game.max_waves,
        "Starting batch run"
    );

    let play = |i: u32| -> Result<GameMetrics, BatchError> {
        let seed = config.seed_start.wrapping_add(u64::from(i));
        let game = GameConfig {
            seed,
            ..config.game.clone()
        };
        let result = run_game(balance, progression, &game).map_err(|e| BatchError {
            game_index: i,
            seed,
            message: e.to_string(),
        });

        let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
        if done % 10 == 0 {
            debug!("Progress: {}/{}", done, config.game_count);
        }
        if let Err(e) = &result {
            warn!(game = i, seed, error = %e.message, "Game failed");
        }
        result
    };

    let results: Vec<Result<GameMetrics, BatchError>> = if config.parallel_games > 0 {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel_games as usize)
            .build()
        {
            Ok(pool) => pool.install(|| (0..config.game_count).into_par_iter().map(play).collect()),
            Err(e) => {
                warn!(error = %e, "Failed to build thread pool, using the global pool");
                (0..config.game_count).into_par_iter().map(play).collect()
            }
        }
    } else {
        (0..config.game_count).into_par_iter().map(play).collect()
    };

    let mut games = Vec::with_capacity(results.len());
    let mut errors = Vec::new();
    for result in results {
        match result {
            Ok(metrics) => games.push(metrics),
            Err(e) => errors.push(e),
        }
    }

    let summary = BatchSummary::from_games(&games);
    let duration_seconds = start.elapsed().as_secs_f64();

    info!(
        "Batch complete: {} games in {:.1}s ({:.1} games/sec)",
        games.len(),
        duration_seconds,
        games.len() as f64 / duration_seconds.max(0.001)
    );

    BatchResults {
        config,
        games,
        summary,
        duration_seconds,
        errors,
    }
}

/// Outcome of a determinism check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeterminismReport {
    /// Seed that was replayed.
    pub seed: u64,
    /// Final state hash of every run.
    pub hashes: Vec<u64>,
    /// Whether every run hashed identically.
    pub deterministic: bool,
}

/// Play the same seed `runs` times and compare final state hashes.
pub fn verify_determinism(
    balance: &Balance,
    progression: &Progression,
    game: &GameConfig,
    runs: u32,
) -> siege_core::error::Result<DeterminismReport> {
    let hashes = replay_hashes(balance, progression, game, runs)?;
    let deterministic = hashes.windows(2).all(|w| w[0] == w[1]);
    Ok(DeterminismReport {
        seed: game.seed,
        hashes,
        deterministic,
    })
}

/// Default output path for batch results.
#[must_use]
pub fn default_results_path(dir: &Path) -> PathBuf {
    dir.join("batch_results.json")
}
