//! Headless Castle Siege runner.
//!
//! Plays the simulation without graphics for balance testing and CI.
//!
//! # Usage
//!
//! ```bash
//! # Play one game and print its report
//! cargo run -p siege_headless -- run --seed 7 --waves 15 --json
//!
//! # Run a batch balance test
//! cargo run -p siege_headless -- batch --count 1000 --strategy turtle --output results/
//!
//! # Verify determinism
//! cargo run -p siege_headless -- verify --seed 12345 --runs 5
//!
//! # Preview rosters for waves 1-20
//! cargo run -p siege_headless -- waves --from 1 --to 20
//! ```
//!
//! Reports are written to stdout; logs go to stderr.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use siege_core::config::{Balance, Progression};
use siege_headless::{
    batch::{default_results_path, run_batch, verify_determinism, BatchConfig},
    loader::{balance_or_default, progression_or_default},
    metrics::GameMetrics,
    preview::{preview_waves, render_table},
    runner::{run_game, GameConfig, DEFAULT_TICK_MS},
    strategies::Strategy,
};

#[derive(Parser)]
#[command(name = "siege_headless")]
#[command(about = "Headless Castle Siege runner for balance testing and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Balance and progression inputs shared by every subcommand.
#[derive(Args)]
struct ConfigArgs {
    /// Balance RON file (built-in table when omitted)
    #[arg(long)]
    balance: Option<PathBuf>,

    /// Meta-progression RON file
    #[arg(long)]
    progression: Option<PathBuf>,
}

/// Per-game settings shared by run, batch and verify.
#[derive(Args)]
struct GameArgs {
    /// Auto-player strategy
    #[arg(long, value_enum, default_value_t = Strategy::Balanced)]
    strategy: Strategy,

    /// Waves to survive
    #[arg(short, long, default_value = "10")]
    waves: u32,

    /// Milliseconds per simulation step
    #[arg(long, default_value_t = DEFAULT_TICK_MS)]
    tick_ms: u64,

    /// Game-time budget in minutes (0 = unlimited)
    #[arg(long, default_value = "60")]
    max_minutes: u64,
}

impl GameArgs {
    fn game_config(&self, seed: u64) -> GameConfig {
        GameConfig {
            seed,
            strategy: self.strategy,
            max_waves: self.waves,
            tick_ms: self.tick_ms,
            max_game_ms: self.max_minutes * 60 * 1000,
            ..GameConfig::default()
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Play a single auto-played game
    Run {
        /// Random seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        config: ConfigArgs,

        #[command(flatten)]
        game: GameArgs,
    },

    /// Run a batch of games for balance testing
    Batch {
        /// Number of games to run
        #[arg(short, long, default_value = "100")]
        count: u32,

        /// Starting random seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Maximum parallel games (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Output directory for results
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        config: ConfigArgs,

        #[command(flatten)]
        game: GameArgs,
    },

    /// Verify determinism by running the same seed multiple times
    Verify {
        /// Seed to verify
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: u32,

        #[command(flatten)]
        config: ConfigArgs,

        #[command(flatten)]
        game: GameArgs,
    },

    /// Print generated wave rosters
    Waves {
        /// First wave
        #[arg(long, default_value = "1")]
        from: u32,

        /// Last wave
        #[arg(long, default_value = "20")]
        to: u32,

        /// Random seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Print as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        config: ConfigArgs,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for reports)
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    match cli.command {
        Commands::Run {
            seed,
            json,
            config,
            game,
        } => {
            let (balance, progression) = load_inputs(&config);
            cmd_run(&balance, &progression, &game.game_config(seed), json);
        }
        Commands::Batch {
            count,
            seed,
            parallel,
            output,
            config,
            game,
        } => {
            let (balance, progression) = load_inputs(&config);
            let batch = BatchConfig {
                game_count: count,
                seed_start: seed,
                parallel_games: parallel,
                game: game.game_config(seed),
            };
            cmd_batch(&balance, &progression, batch, output.as_deref());
        }
        Commands::Verify {
            seed,
            runs,
            config,
            game,
        } => {
            let (balance, progression) = load_inputs(&config);
            cmd_verify(&balance, &progression, &game.game_config(seed), runs);
        }
        Commands::Waves {
            from,
            to,
            seed,
            json,
            config,
        } => {
            let (balance, _) = load_inputs(&config);
            cmd_waves(&balance, from, to, seed, json);
        }
    }
}

fn load_inputs(args: &ConfigArgs) -> (Balance, Progression) {
    let loaded = balance_or_default(args.balance.as_deref())
        .and_then(|balance| Ok((balance, progression_or_default(args.progression.as_deref())?)));
    match loaded {
        Ok(inputs) => inputs,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load configuration");
            eprintln!("FATAL: {e}");
            process::exit(1);
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Failed to serialize report: {e}");
            process::exit(1);
        }
    }
}

/// Play one game and print its report
fn cmd_run(balance: &Balance, progression: &Progression, config: &GameConfig, json: bool) {
    tracing::info!(seed = config.seed, strategy = %config.strategy, "Starting game");

    let metrics = match run_game(balance, progression, config) {
        Ok(metrics) => metrics,
        Err(e) => {
            eprintln!("FATAL: {e}");
            process::exit(1);
        }
    };

    if json {
        print_json(&metrics);
    } else {
        print_report(&metrics);
    }
}

fn print_report(m: &GameMetrics) {
    println!("{}", "=".repeat(50));
    println!("GAME REPORT (seed {}, {})", m.seed, m.strategy);
    println!("{}", "=".repeat(50));
    println!("Result: {:?}", m.result);
    println!("Waves cleared: {} (ended on wave {})", m.waves_cleared, m.final_wave);
    println!("Game time: {:.1}s", m.game_time_ms as f64 / 1000.0);
    println!("Enemies killed: {} ({} bosses)", m.enemies_killed, m.bosses_killed);
    for (kind, count) in &m.kills_by_kind {
        println!("  {kind}: {count}");
    }
    println!("Units bought:");
    for (kind, count) in &m.units_bought {
        println!("  {kind}: {count}");
    }
    println!("Units lost: {}", m.units_lost);
    println!(
        "Castle: level {}, {} health left, {} damage taken, {} fences broken",
        m.castle_level, m.castle_health_left, m.castle_damage_taken, m.fences_broken
    );
    println!("Earned: {} gold, {} wood", m.gold_earned, m.wood_earned);
    println!("State hash: {:016x}", m.final_state_hash);
}

/// Run a batch of games for balance testing
fn cmd_batch(balance: &Balance, progression: &Progression, config: BatchConfig, output: Option<&Path>) {
    let num_cpus = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);
    tracing::info!(
        count = config.game_count,
        seed = config.seed_start,
        parallel = config.parallel_games,
        cpus_available = num_cpus,
        "Batch configuration"
    );

    let results = run_batch(balance, progression, config);

    if let Some(dir) = output {
        let path = default_results_path(dir);
        if let Err(e) = results.save(&path) {
            tracing::error!(error = %e, path = %path.display(), "Failed to save results");
            eprintln!("FATAL: Failed to save results: {e}");
            process::exit(1);
        }
        eprintln!("Results saved to: {}", path.display());
    }

    print_json(&results.summary);

    let s = &results.summary;
    eprintln!("\n{}", "=".repeat(50));
    eprintln!("BATCH COMPLETE");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Games played: {}", s.games);
    if !results.errors.is_empty() {
        eprintln!("Games FAILED: {}", results.errors.len());
        for error in results.errors.iter().take(10) {
            eprintln!("  Game {} (seed {}): {}", error.game_index, error.seed, error.message);
        }
    }
    eprintln!("Duration: {:.1}s", results.duration_seconds);
    eprintln!("Survival rate: {:.1}%", s.survival_rate * 100.0);
    eprintln!(
        "Waves cleared: mean {:.2}, min {}, max {}",
        s.mean_waves_cleared, s.min_waves_cleared, s.max_waves_cleared
    );
    eprintln!("Mean kills: {:.1}", s.mean_enemies_killed);
}

/// Verify determinism
fn cmd_verify(balance: &Balance, progression: &Progression, config: &GameConfig, runs: u32) {
    tracing::info!(seed = config.seed, runs, "Verifying determinism");

    match verify_determinism(balance, progression, config, runs) {
        Ok(report) if report.deterministic => {
            eprintln!("PASS: All {runs} runs produced identical results");
            if let Some(hash) = report.hashes.first() {
                eprintln!("  State hash: {hash:016x}");
            }
        }
        Ok(report) => {
            eprintln!("FAIL: Non-determinism detected!");
            for (i, hash) in report.hashes.iter().enumerate() {
                eprintln!("  Run {i}: {hash:016x}");
            }
            process::exit(1);
        }
        Err(e) => {
            eprintln!("FATAL: {e}");
            process::exit(1);
        }
    }
}

/// Print generated wave rosters
fn cmd_waves(balance: &Balance, from: u32, to: u32, seed: u64, json: bool) {
    let previews = preview_waves(&balance.waves, from, to, seed);
    if json {
        print_json(&previews);
    } else {
        print!("{}", render_table(&previews));
    }
}
