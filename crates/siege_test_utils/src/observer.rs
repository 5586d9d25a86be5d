//! Observer that records every event for later assertions.

use std::sync::{Arc, Mutex, PoisonError};

use siege_core::components::{CombatantKind, EntityId};
use siege_core::events::{SimEvent, SimulationObserver};
use siege_core::math::Vec2Fixed;

/// Shared handle to the events a [`RecordingObserver`] has seen.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<SimEvent>>>,
}

impl EventLog {
    /// Snapshot of every recorded event in order.
    #[must_use]
    pub fn events(&self) -> Vec<SimEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of recorded events matching `predicate`.
    pub fn count<P: Fn(&SimEvent) -> bool>(&self, predicate: P) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|event| predicate(event))
            .count()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// Observer that pushes every dispatched event into an [`EventLog`], and
/// tallies the dedicated hooks separately so tests can check the routing.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    log: EventLog,
    hooks: Arc<Mutex<HookCounts>>,
}

/// How often each dedicated hook fired.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HookCounts {
    /// `on_damage_dealt`
    pub damage: u32,
    /// `on_heal`
    pub heals: u32,
    /// `on_hit`
    pub hits: u32,
    /// `on_entity_death`
    pub deaths: u32,
    /// `on_wave_start`
    pub wave_starts: u32,
    /// `on_wave_complete`
    pub wave_completions: u32,
    /// `on_enemy_killed`
    pub enemy_kills: u32,
    /// `on_player_castle_destroyed`
    pub castle_destroyed: u32,
}

impl RecordingObserver {
    /// New observer plus handles to read what it records.
    #[must_use]
    pub fn new() -> (Self, EventLog, Arc<Mutex<HookCounts>>) {
        let observer = Self::default();
        let log = observer.log.clone();
        let hooks = Arc::clone(&observer.hooks);
        (observer, log, hooks)
    }

    fn bump(&self, f: impl FnOnce(&mut HookCounts)) {
        f(&mut self.hooks.lock().unwrap_or_else(PoisonError::into_inner));
    }
}

impl SimulationObserver for RecordingObserver {
    fn on_damage_dealt(&mut self, _position: Vec2Fixed, _amount: u32) {
        self.bump(|h| h.damage += 1);
    }

    fn on_heal(&mut self, _position: Vec2Fixed, _amount: u32) {
        self.bump(|h| h.heals += 1);
    }

    fn on_hit(&mut self, _attacker: CombatantKind) {
        self.bump(|h| h.hits += 1);
    }

    fn on_entity_death(&mut self, _id: EntityId, _kind: CombatantKind) {
        self.bump(|h| h.deaths += 1);
    }

    fn on_wave_start(&mut self, _wave: u32, _total_enemies: u32) {
        self.bump(|h| h.wave_starts += 1);
    }

    fn on_wave_complete(&mut self, _wave: u32, _gold: u32, _wood: u32) {
        self.bump(|h| h.wave_completions += 1);
    }

    fn on_enemy_killed(&mut self) {
        self.bump(|h| h.enemy_kills += 1);
    }

    fn on_player_castle_destroyed(&mut self) {
        self.bump(|h| h.castle_destroyed += 1);
    }

    fn on_event(&mut self, event: &SimEvent) {
        self.log
            .events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}
