//! Full wave flow: start, spawn, kill, reward, and what observers see.

use std::sync::PoisonError;

use siege_core::components::{CombatantKind, EnemyKind, UnitKind};
use siege_core::config::{Balance, Progression};
use siege_core::events::SimEvent;
use siege_core::math::Vec2Fixed;
use siege_core::simulation::{Outcome, Simulation};
use siege_core::wave::WavePhase;
use siege_test_utils::fixtures::{rich_balance, rich_sim, sim_with_seed};
use siege_test_utils::observer::RecordingObserver;

fn run_until<F: Fn(&Simulation) -> bool>(sim: &mut Simulation, limit_ms: u64, done: F) -> Vec<SimEvent> {
    let mut all = Vec::new();
    while sim.now_ms() < limit_ms && !done(sim) {
        all.extend(sim.advance(50).events);
    }
    all
}

fn defended_sim(seed: u64, final_wave: Option<u32>) -> Simulation {
    let mut balance = rich_balance();
    balance.waves.final_wave = final_wave;
    let mut sim = Simulation::new(balance, Progression::default(), seed).expect("valid balance");
    sim.upgrade_castle().expect("turret level");
    for kind in [UnitKind::Knight, UnitKind::Knight, UnitKind::Archer, UnitKind::Mage] {
        sim.spawn_unit(kind).expect("affordable");
    }
    sim
}

#[test]
fn test_observer_sees_every_event_in_order() {
    let (observer, log, hooks) = RecordingObserver::new();
    let mut sim = defended_sim(3, Some(1)).with_observer(Box::new(observer));
    sim.start_next_wave().expect("idle scheduler");

    let returned = run_until(&mut sim, 120_000, |s| s.outcome().is_decided());

    assert_eq!(sim.outcome(), Outcome::Victory { wave: 1 });
    assert_eq!(log.events(), returned);

    let hooks = *hooks.lock().unwrap_or_else(PoisonError::into_inner);
    assert_eq!(hooks.wave_starts, 1);
    assert_eq!(hooks.wave_completions, 1);
    assert_eq!(hooks.enemy_kills, 2);
    assert_eq!(hooks.castle_destroyed, 0);
    assert_eq!(
        hooks.damage as usize,
        log.count(|e| matches!(e, SimEvent::DamageDealt { .. }))
    );
    assert_eq!(
        hooks.hits as usize,
        log.count(|e| matches!(e, SimEvent::Hit { .. }))
    );
}

#[test]
fn test_wave_started_precedes_spawns_and_completion_is_last() {
    let mut sim = defended_sim(8, Some(1));
    sim.start_next_wave().expect("idle scheduler");
    let events = run_until(&mut sim, 120_000, |s| s.outcome().is_decided());

    let started = events
        .iter()
        .position(|e| matches!(e, SimEvent::WaveStarted { wave: 1, .. }))
        .expect("wave started");
    let first_spawn = events
        .iter()
        .position(|e| matches!(e, SimEvent::EnemySpawned { .. }))
        .expect("enemy spawned");
    let completed = events
        .iter()
        .position(|e| matches!(e, SimEvent::WaveCompleted { wave: 1, .. }))
        .expect("wave completed");

    assert!(started < first_spawn);
    let last_kill = events
        .iter()
        .rposition(|e| matches!(e, SimEvent::EnemyKilled { .. }))
        .expect("enemy killed");
    assert!(last_kill < completed);
}

#[test]
fn test_each_enemy_dies_once() {
    let mut sim = defended_sim(12, Some(2));
    sim.start_next_wave().expect("idle scheduler");
    let mut events = run_until(&mut sim, 120_000, |s| {
        s.wave_scheduler().phase() == WavePhase::Idle
    });
    sim.start_next_wave().expect("wave 1 cleared");
    events.extend(run_until(&mut sim, 240_000, |s| s.outcome().is_decided()));

    assert_eq!(sim.outcome(), Outcome::Victory { wave: 2 });

    let mut dead: Vec<u64> = events
        .iter()
        .filter_map(|e| match e {
            SimEvent::EntityDied {
                id,
                kind: CombatantKind::Enemy(_),
                ..
            } => Some(*id),
            _ => None,
        })
        .collect();
    let total = dead.len();
    dead.sort_unstable();
    dead.dedup();
    assert_eq!(dead.len(), total, "an enemy died twice");

    // Wave 1 has 2 goblins, wave 2 has 3.
    assert_eq!(total, 5);
    assert_eq!(sim.stats().enemies_killed, 5);
    assert_eq!(sim.wave_scheduler().waves_cleared(), 2);
}

#[test]
fn test_rewards_accumulate_across_waves() {
    let mut sim = defended_sim(5, Some(2));
    let before = sim.resources();

    sim.start_next_wave().expect("idle scheduler");
    run_until(&mut sim, 120_000, |s| s.wave_scheduler().phase() == WavePhase::Idle);
    sim.start_next_wave().expect("wave 1 cleared");
    run_until(&mut sim, 240_000, |s| s.outcome().is_decided());

    // 50 + 20 * wave gold and 20 + 8 * wave wood.
    let after = sim.resources();
    assert_eq!(after.gold - before.gold, 70 + 90);
    assert_eq!(after.wood - before.wood, 28 + 36);
}

#[test]
fn test_undefended_castle_eventually_falls() {
    let mut balance = Balance::default();
    balance.castle.base_health = 60;
    let (observer, _log, hooks) = RecordingObserver::new();
    let mut sim = Simulation::new(balance, Progression::default(), 4)
        .expect("valid balance")
        .with_observer(Box::new(observer));
    sim.start_next_wave().expect("idle scheduler");

    let events = run_until(&mut sim, 300_000, |s| s.outcome().is_decided());

    assert_eq!(sim.outcome(), Outcome::Defeat { wave: 1 });
    assert!(events.contains(&SimEvent::CastleDestroyed));
    assert!(sim.castle().is_none());
    assert_eq!(
        hooks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .castle_destroyed,
        1
    );
    assert!(sim.spawn_unit(UnitKind::Swordsman).is_err());
}

#[test]
fn test_auto_waves_run_back_to_back() {
    let mut balance = rich_balance();
    balance.waves.wave_gap_ms = Some(1_000);
    balance.waves.final_wave = Some(2);
    let mut sim = Simulation::new(balance, Progression::default(), 6).expect("valid balance");
    sim.upgrade_castle().expect("turret level");
    for _ in 0..3 {
        sim.spawn_unit(UnitKind::Knight).expect("affordable");
    }

    let events = run_until(&mut sim, 300_000, |s| s.outcome().is_decided());

    assert_eq!(sim.outcome(), Outcome::Victory { wave: 2 });
    let waves: Vec<u32> = events
        .iter()
        .filter_map(|e| match e {
            SimEvent::WaveStarted { wave, .. } => Some(*wave),
            _ => None,
        })
        .collect();
    assert_eq!(waves, vec![1, 2]);
}

#[test]
fn test_paused_run_spawns_nothing() {
    let mut sim = sim_with_seed(2);
    sim.start_next_wave().expect("idle scheduler");
    sim.advance(10);
    let spawned = sim.wave_scheduler().spawned();
    sim.pause();

    for _ in 0..100 {
        assert!(sim.advance(100).is_empty());
    }
    assert_eq!(sim.wave_scheduler().spawned(), spawned);

    sim.resume();
    run_until(&mut sim, 5_000, |s| s.wave_scheduler().spawned() > spawned);
    assert!(sim.wave_scheduler().spawned() > spawned);
}

#[test]
fn test_out_of_roster_enemy_does_not_block_completion() {
    let mut sim = rich_sim(9);
    sim.upgrade_castle().expect("turret level");
    sim.spawn_unit(UnitKind::Knight).expect("affordable");
    sim.spawn_unit(UnitKind::Archer).expect("affordable");
    let far = sim.balance().castle.position() + Vec2Fixed::from_ints(-700, -400);
    let straggler = sim
        .spawn_enemy(EnemyKind::Goblin, far)
        .expect("goblin stats");
    sim.set_active(straggler, false).expect("goblin present");

    sim.start_next_wave().expect("idle scheduler");
    let events = run_until(&mut sim, 120_000, |s| {
        s.wave_scheduler().waves_cleared() == 1
    });

    assert!(events.iter().any(|e| matches!(e, SimEvent::WaveCompleted { wave: 1, .. })));
    assert!(sim.combatant(straggler).is_some());
}
