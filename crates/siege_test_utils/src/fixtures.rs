//! Test fixtures and helpers.
//!
//! Pre-built simulations and scripted sessions for consistent testing.

use serde::{Deserialize, Serialize};
use siege_core::components::{EnemyKind, EntityId, UnitKind};
use siege_core::config::{Balance, Progression, Resources};
use siege_core::math::Vec2Fixed;
use siege_core::simulation::Simulation;

/// Default balance, default progression, given seed.
///
/// # Panics
///
/// Panics if the default balance fails validation.
#[must_use]
pub fn sim_with_seed(seed: u64) -> Simulation {
    Simulation::new(Balance::default(), Progression::default(), seed)
        .expect("default balance is valid")
}

/// Default balance with effectively unlimited gold and wood.
#[must_use]
pub fn rich_balance() -> Balance {
    Balance {
        starting_resources: Resources::new(1_000_000, 1_000_000),
        ..Balance::default()
    }
}

/// Simulation started from [`rich_balance`].
///
/// # Panics
///
/// Panics if the balance fails validation.
#[must_use]
pub fn rich_sim(seed: u64) -> Simulation {
    Simulation::new(rich_balance(), Progression::default(), seed).expect("rich balance is valid")
}

/// Rich simulation with the castle raised to `level`.
///
/// # Panics
///
/// Panics if `level` exceeds the castle's max level.
#[must_use]
pub fn sim_at_castle_level(seed: u64, level: u32) -> Simulation {
    let mut sim = rich_sim(seed);
    while sim.castle_state().level() < level {
        sim.upgrade_castle().expect("level within max");
    }
    sim
}

/// Point offset from the castle centre by whole units.
#[must_use]
pub fn near_castle(sim: &Simulation, dx: i32, dy: i32) -> Vec2Fixed {
    sim.balance().castle.position() + Vec2Fixed::from_ints(dx, dy)
}

/// Place an out-of-roster enemy relative to the castle.
///
/// # Panics
///
/// Panics if the enemy kind has no stats.
pub fn enemy_near_castle(sim: &mut Simulation, kind: EnemyKind, dx: i32, dy: i32) -> EntityId {
    let at = near_castle(sim, dx, dy);
    sim.spawn_enemy(kind, at).expect("enemy stats present")
}

/// One step of a scripted session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScriptedAction {
    /// Advance game time by this many milliseconds.
    Advance(u64),
    /// Try to buy a unit.
    SpawnUnit(UnitKind),
    /// Try to upgrade the castle.
    UpgradeCastle,
    /// Try to start the next wave.
    StartWave,
    /// Try to repair the castle.
    HealCastle(u32),
    /// Pause if running, resume if paused.
    TogglePause,
}

/// Apply one scripted action, ignoring rejected player actions.
pub fn apply_action(sim: &mut Simulation, action: &ScriptedAction) {
    match *action {
        ScriptedAction::Advance(ms) => {
            sim.advance(ms);
        }
        ScriptedAction::SpawnUnit(kind) => {
            let _ = sim.spawn_unit(kind);
        }
        ScriptedAction::UpgradeCastle => {
            let _ = sim.upgrade_castle();
        }
        ScriptedAction::StartWave => {
            let _ = sim.start_next_wave();
        }
        ScriptedAction::HealCastle(amount) => {
            let _ = sim.heal_castle(amount);
        }
        ScriptedAction::TogglePause => {
            if sim.is_paused() {
                sim.resume();
            } else {
                sim.pause();
            }
        }
    }
}
