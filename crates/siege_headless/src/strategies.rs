//! Scripted auto-player strategies for headless playtesting.
//!
//! A strategy decides what to buy with the gold and wood on hand. It never
//! issues an action it cannot afford, so the core's rejection warnings stay
//! out of batch logs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use siege_core::components::UnitKind;
use siege_core::simulation::Simulation;
use thiserror::Error;

/// Error type for strategy selection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown strategy '{0}' (expected balanced, turtle or idle)")]
pub struct UnknownStrategy(pub String);

/// Built-in auto-player behaviours.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Rotate through every unit type, upgrade the castle with what's left.
    #[default]
    Balanced,
    /// Castle upgrades first, archers behind the walls.
    Turtle,
    /// Never act; measures the bare castle.
    Idle,
}

impl Strategy {
    /// All strategies.
    pub const ALL: [Self; 3] = [Self::Balanced, Self::Turtle, Self::Idle];

    /// Lowercase name used in reports and on the command line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Balanced => "balanced",
            Self::Turtle => "turtle",
            Self::Idle => "idle",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownStrategy(s.to_string()))
    }
}

/// Unit rotation for [`Strategy::Balanced`].
const BALANCED_ROTATION: [UnitKind; 4] = [
    UnitKind::Swordsman,
    UnitKind::Archer,
    UnitKind::Knight,
    UnitKind::Mage,
];

/// Default cap on living units.
pub const DEFAULT_MAX_UNITS: usize = 16;

/// What one [`AutoPlayer::act`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TurnActions {
    /// Units bought.
    pub units_bought: u32,
    /// Castle levels bought.
    pub castle_upgrades: u32,
}

/// Drives a [`Simulation`] according to a [`Strategy`].
#[derive(Debug, Clone)]
pub struct AutoPlayer {
    strategy: Strategy,
    next_unit: usize,
    max_units: usize,
}

impl AutoPlayer {
    /// New player with the default unit cap.
    #[must_use]
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            next_unit: 0,
            max_units: DEFAULT_MAX_UNITS,
        }
    }

    /// Change the living-unit cap.
    #[must_use]
    pub fn with_max_units(mut self, max_units: usize) -> Self {
        self.max_units = max_units;
        self
    }

    /// Strategy in use.
    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Spend what the strategy wants to spend right now.
    pub fn act(&mut self, sim: &mut Simulation) -> TurnActions {
        let mut actions = TurnActions::default();
        if sim.outcome().is_decided() {
            return actions;
        }

        match self.strategy {
            Strategy::Idle => {}
            Strategy::Balanced => {
                while self.buy_next_in_rotation(sim) {
                    actions.units_bought += 1;
                }
                while try_upgrade_castle(sim) {
                    actions.castle_upgrades += 1;
                }
            }
            Strategy::Turtle => {
                while try_upgrade_castle(sim) {
                    actions.castle_upgrades += 1;
                }
                while sim.active_units().count() < self.max_units / 2
                    && try_buy(sim, UnitKind::Archer)
                {
                    actions.units_bought += 1;
                }
            }
        }

        if actions != TurnActions::default() {
            tracing::debug!(
                strategy = %self.strategy,
                units = actions.units_bought,
                upgrades = actions.castle_upgrades,
                "Auto-player turn"
            );
        }
        actions
    }

    fn buy_next_in_rotation(&mut self, sim: &mut Simulation) -> bool {
        if sim.active_units().count() >= self.max_units {
            return false;
        }
        let kind = BALANCED_ROTATION[self.next_unit % BALANCED_ROTATION.len()];
        if try_buy(sim, kind) {
            self.next_unit += 1;
            true
        } else {
            false
        }
    }
}

fn try_buy(sim: &mut Simulation, kind: UnitKind) -> bool {
    let Ok(stats) = sim.balance().unit(kind) else {
        return false;
    };
    if !sim.resources().can_afford(stats.gold_cost, stats.wood_cost) {
        return false;
    }
    sim.spawn_unit(kind).is_ok()
}

fn try_upgrade_castle(sim: &mut Simulation) -> bool {
    let state = sim.castle_state();
    if !state.can_level_up() {
        return false;
    }
    let (gold, wood) = state.upgrade_cost(&sim.balance().castle);
    if !sim.resources().can_afford(gold, wood) {
        return false;
    }
    sim.upgrade_castle().is_ok()
}
