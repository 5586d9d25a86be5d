//! Headless auto-player for balance testing and CI verification.
//!
//! Plays Castle Siege without any presentation layer:
//!
//! - **Balance testing**: batches of auto-played games across many seeds
//! - **CI verification**: the same seed must always produce the same state hash
//! - **Wave tuning**: roster previews straight from the wave generator
//!
//! Reports go to stdout as JSON (or plain text); logs go to stderr.
//!
//! # Example
//!
//! ```bash
//! # Play one game with the balanced auto-player
//! cargo run -p siege_headless -- run --seed 7 --waves 15
//!
//! # Run 500 seeds in parallel
//! cargo run -p siege_headless -- batch --count 500 --output results/
//!
//! # Verify determinism
//! cargo run -p siege_headless -- verify --seed 12345 --runs 5
//! ```

pub mod batch;
pub mod loader;
pub mod metrics;
pub mod preview;
pub mod runner;
pub mod strategies;

pub use batch::{run_batch, verify_determinism, BatchConfig, BatchResults, DeterminismReport};
pub use loader::{load_balance, load_progression, LoadError};
pub use metrics::{BatchSummary, GameMetrics, GameResult, MetricsCollector};
pub use preview::{preview_waves, WavePreview};
pub use runner::{run_game, GameConfig};
pub use strategies::{AutoPlayer, Strategy};
