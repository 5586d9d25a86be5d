//! Events emitted by the simulation and the collaborator interface that
//! consumes them.
//!
//! The core never renders, plays audio or touches UI. Everything a
//! presentation layer needs to know is an [`SimEvent`], collected during a
//! tick, handed to the injected [`SimulationObserver`] and returned in
//! [`TickEvents`].

use serde::{Deserialize, Serialize};

use crate::components::{CombatantKind, EnemyKind, EntityId, Faction, UnitKind};
use crate::math::Vec2Fixed;
use crate::wave::SpawnDirection;

/// Something that happened during a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimEvent {
    /// Damage landed on a combatant (fence absorption included).
    DamageDealt {
        /// Damaged combatant.
        target: EntityId,
        /// Where to show the damage number.
        position: Vec2Fixed,
        /// Amount after armor.
        amount: u32,
    },
    /// A combatant was healed.
    Healed {
        /// Healed combatant.
        target: EntityId,
        /// Where to show the heal number.
        position: Vec2Fixed,
        /// Health actually restored.
        amount: u32,
    },
    /// An attack connected; used to pick a hit sound.
    Hit {
        /// Kind of the attacker.
        attacker: CombatantKind,
    },
    /// A combatant died. Emitted exactly once per combatant.
    EntityDied {
        /// Dead combatant.
        id: EntityId,
        /// Its variant.
        kind: CombatantKind,
        /// Where it fell.
        position: Vec2Fixed,
    },
    /// The castle fence was depleted and removed.
    FenceBroken,
    /// A projectile left its shooter.
    ProjectileLaunched {
        /// Shooter.
        source: EntityId,
        /// Side of the shooter.
        faction: Faction,
        /// Launch point.
        position: Vec2Fixed,
    },
    /// A roster entry entered the field.
    EnemySpawned {
        /// New enemy.
        id: EntityId,
        /// Its type.
        kind: EnemyKind,
        /// Edge it entered from.
        direction: SpawnDirection,
    },
    /// The player bought a unit.
    UnitSpawned {
        /// New unit.
        id: EntityId,
        /// Its type.
        kind: UnitKind,
    },
    /// The castle gained a level.
    CastleUpgraded {
        /// New level.
        level: u32,
    },
    /// A wave started spawning.
    WaveStarted {
        /// Wave number (1-based).
        wave: u32,
        /// Roster size.
        total_enemies: u32,
    },
    /// An enemy was killed (counted toward wave completion).
    EnemyKilled {
        /// Killed enemy.
        id: EntityId,
    },
    /// A wave was fully spawned and cleared.
    WaveCompleted {
        /// Wave number.
        wave: u32,
        /// Gold credited.
        gold: u32,
        /// Wood credited.
        wood: u32,
    },
    /// The castle fell; the run is lost.
    CastleDestroyed,
}

/// Presentation and orchestration hooks.
///
/// Every method defaults to a no-op so collaborators only implement what
/// they render. Calls are fire-and-forget.
pub trait SimulationObserver {
    /// A damage number should appear at `position`.
    fn on_damage_dealt(&mut self, _position: Vec2Fixed, _amount: u32) {}

    /// A heal number should appear at `position`.
    fn on_heal(&mut self, _position: Vec2Fixed, _amount: u32) {}

    /// An attack by `attacker` connected.
    fn on_hit(&mut self, _attacker: CombatantKind) {}

    /// A combatant died.
    fn on_entity_death(&mut self, _id: EntityId, _kind: CombatantKind) {}

    /// A wave started.
    fn on_wave_start(&mut self, _wave: u32, _total_enemies: u32) {}

    /// A wave completed and its reward was credited.
    fn on_wave_complete(&mut self, _wave: u32, _gold: u32, _wood: u32) {}

    /// An enemy was killed.
    fn on_enemy_killed(&mut self) {}

    /// The castle was destroyed.
    fn on_player_castle_destroyed(&mut self) {}

    /// Catch-all for events without a dedicated hook.
    fn on_event(&mut self, _event: &SimEvent) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl SimulationObserver for NullObserver {}

/// Route one event to the matching observer hook.
pub fn dispatch(observer: &mut dyn SimulationObserver, event: &SimEvent) {
    match *event {
        SimEvent::DamageDealt {
            position, amount, ..
        } => observer.on_damage_dealt(position, amount),
        SimEvent::Healed {
            position, amount, ..
        } => observer.on_heal(position, amount),
        SimEvent::Hit { attacker } => observer.on_hit(attacker),
        SimEvent::EntityDied { id, kind, .. } => observer.on_entity_death(id, kind),
        SimEvent::WaveStarted {
            wave,
            total_enemies,
        } => observer.on_wave_start(wave, total_enemies),
        SimEvent::WaveCompleted { wave, gold, wood } => observer.on_wave_complete(wave, gold, wood),
        SimEvent::EnemyKilled { .. } => observer.on_enemy_killed(),
        SimEvent::CastleDestroyed => observer.on_player_castle_destroyed(),
        _ => {}
    }
    observer.on_event(event);
}

/// Events generated during one call to `Simulation::advance`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickEvents {
    /// Events in emission order.
    pub events: Vec<SimEvent>,
}

impl TickEvents {
    /// Whether nothing happened.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Ids of combatants that died this tick.
    #[must_use]
    pub fn deaths(&self) -> Vec<EntityId> {
        self.events
            .iter()
            .filter_map(|event| match event {
                SimEvent::EntityDied { id, .. } => Some(*id),
                _ => None,
            })
            .collect()
    }

    /// Total damage dealt this tick.
    #[must_use]
    pub fn total_damage(&self) -> u64 {
        self.events
            .iter()
            .map(|event| match event {
                SimEvent::DamageDealt { amount, .. } => u64::from(*amount),
                _ => 0,
            })
            .sum()
    }

    /// Number of enemy kills this tick.
    #[must_use]
    pub fn enemy_kills(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, SimEvent::EnemyKilled { .. }))
            .count()
    }

    /// Whether the event list contains a completion for `wave`.
    #[must_use]
    pub fn completed_wave(&self) -> Option<u32> {
        self.events.iter().find_map(|event| match event {
            SimEvent::WaveCompleted { wave, .. } => Some(*wave),
            _ => None,
        })
    }
}
