//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the simulation produces identical
//! results given an identical seed and identical calls.
//!
//! # Testing Strategy
//!
//! A run must replay exactly from its seed. Sources of non-determinism
//! include:
//!
//! - **Floating-point math**: Different CPUs can produce different results.
//!   We use fixed-point arithmetic via [`siege_core::math::Fixed`] throughout.
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Entities live in a `BTreeMap` and are always visited in id order.
//!
//! - **System randomness**: Shuffles, jitter and direction rolls all draw
//!   from the run's seeded `ChaCha8Rng`.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual module behaviour (combat, waves, etc.)
//! 2. **Property tests**: Random scripts must still replay identically
//! 3. **Integration tests**: Full wave scenarios are reproducible
//! 4. **Parallel tests**: Running N simulations on threads all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use siege_core::simulation::Simulation;

use crate::fixtures::{apply_action, ScriptedAction};

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of steps simulated.
    pub steps: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for deterministic simulation).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the simulation was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Simulation is non-deterministic!\n\
                 Runs: {}\n\
                 Steps: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.steps,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a state machine multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `steps` - Number of steps per run
/// * `setup` - Function to create initial state
/// * `step` - Function to advance the state by one step
/// * `hash` - Function to compute the state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    steps: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..steps {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        steps,
    }
}

/// Run the same simulation setup twice, `ticks` ticks of `tick_ms` each,
/// and compare final state hashes.
pub fn verify_simulation_determinism<F>(setup_fn: F, ticks: u64, tick_ms: u64) -> bool
where
    F: Fn() -> Simulation,
{
    verify_determinism(
        2,
        ticks,
        &setup_fn,
        |sim| {
            sim.advance(tick_ms);
        },
        Simulation::state_hash,
    )
    .is_deterministic
}

/// Replay a scripted session `runs` times and compare final hashes.
pub fn verify_script_determinism<F>(setup_fn: F, script: &[ScriptedAction], runs: usize) -> DeterminismResult
where
    F: Fn() -> Simulation,
{
    let hashes: Vec<u64> = (0..runs)
        .map(|_| {
            let mut sim = setup_fn();
            for action in script {
                apply_action(&mut sim, action);
            }
            sim.state_hash()
        })
        .collect();

    DeterminismResult {
        is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
        steps: script.len() as u64,
    }
}

/// Run N simulations on scoped threads and collect final hashes.
///
/// Catches non-determinism that only shows up under thread scheduling or
/// memory layout differences.
pub fn run_parallel_simulations<F>(setup_fn: F, num_sims: usize, ticks: u64, tick_ms: u64) -> Vec<u64>
where
    F: Fn() -> Simulation + Sync,
{
    thread::scope(|s| {
        let handles: Vec<_> = (0..num_sims)
            .map(|_| {
                s.spawn(|| {
                    let mut sim = setup_fn();
                    for _ in 0..ticks {
                        sim.advance(tick_ms);
                    }
                    sim.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("simulation thread panicked"))
            .collect()
    })
}

/// Compare two runs tick by tick, finding the first divergence.
///
/// # Returns
///
/// `None` if the runs stay identical, `Some(tick)` for the first tick
/// whose hashes differ (0 = before the first tick).
pub fn find_first_divergence<F>(setup_fn: F, ticks: u64, tick_ms: u64) -> Option<u64>
where
    F: Fn() -> Simulation,
{
    let mut sim1 = setup_fn();
    let mut sim2 = setup_fn();

    if sim1.state_hash() != sim2.state_hash() {
        return Some(0);
    }

    for tick in 1..=ticks {
        sim1.advance(tick_ms);
        sim2.advance(tick_ms);

        if sim1.state_hash() != sim2.state_hash() {
            tracing::warn!(tick, "Simulations diverged");
            return Some(tick);
        }
    }

    None
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for simulation inputs.
pub mod strategies {
    use proptest::prelude::*;
    use siege_core::components::{EnemyKind, UnitKind};
    use siege_core::math::{Fixed, Vec2Fixed};

    use crate::fixtures::ScriptedAction;

    /// A coordinate inside the default playfield.
    pub fn arb_fixed_position() -> impl Strategy<Value = Fixed> {
        (0i32..1600i32).prop_map(Fixed::from_num)
    }

    /// A point inside the default playfield.
    pub fn arb_vec2_position() -> impl Strategy<Value = Vec2Fixed> {
        ((0i32..1600i32), (0i32..600i32)).prop_map(|(x, y)| Vec2Fixed::from_ints(x, y))
    }

    /// Health values (1-1000).
    pub fn arb_health() -> impl Strategy<Value = u32> {
        1u32..1000u32
    }

    /// Damage values (1-100).
    pub fn arb_damage() -> impl Strategy<Value = u32> {
        1u32..100u32
    }

    /// Attack range in fixed-point.
    pub fn arb_attack_range() -> impl Strategy<Value = Fixed> {
        (1i32..300i32).prop_map(Fixed::from_num)
    }

    /// Any unit kind.
    pub fn arb_unit_kind() -> impl Strategy<Value = UnitKind> {
        prop::sample::select(UnitKind::ALL.to_vec())
    }

    /// Any non-boss enemy kind.
    pub fn arb_enemy_kind() -> impl Strategy<Value = EnemyKind> {
        prop::sample::select(
            EnemyKind::ALL
                .iter()
                .copied()
                .filter(|kind| !kind.is_boss())
                .collect::<Vec<_>>(),
        )
    }

    /// One player action or time step.
    pub fn arb_action() -> impl Strategy<Value = ScriptedAction> {
        prop_oneof![
            4 => (1u64..500u64).prop_map(ScriptedAction::Advance),
            1 => arb_unit_kind().prop_map(ScriptedAction::SpawnUnit),
            1 => Just(ScriptedAction::UpgradeCastle),
            1 => Just(ScriptedAction::StartWave),
            1 => (1u32..200u32).prop_map(ScriptedAction::HealCastle),
            1 => Just(ScriptedAction::TogglePause),
        ]
    }

    /// A session script.
    pub fn arb_script(max_len: usize) -> impl Strategy<Value = Vec<ScriptedAction>> {
        proptest::collection::vec(arb_action(), 1..max_len)
    }
}
