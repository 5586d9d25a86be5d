//! Castle defense scenarios: fence absorption, armor and the turret.
//!
//! These drive a full simulation through the public API only.

use siege_core::components::{EnemyKind, UnitKind};
use siege_core::config::{Balance, Progression, Resources};
use siege_core::events::SimEvent;
use siege_core::simulation::{Outcome, Simulation};
use siege_test_utils::fixtures::{enemy_near_castle, near_castle, rich_balance};

// =============================================================================
// Helpers
// =============================================================================

fn castle_at_level(balance: Balance, progression: Progression, level: u32) -> Simulation {
    let mut sim = Simulation::new(balance, progression, 17).expect("valid balance");
    while sim.castle_state().level() < level {
        sim.upgrade_castle().expect("affordable upgrade");
    }
    // Flush the upgrade events so scenarios start from a clean log.
    sim.advance(0);
    sim
}

fn castle_damage(events: &[SimEvent], castle: u64) -> Vec<u32> {
    events
        .iter()
        .filter_map(|event| match event {
            SimEvent::DamageDealt { target, amount, .. } if *target == castle => Some(*amount),
            _ => None,
        })
        .collect()
}

// =============================================================================
// Fence
// =============================================================================

#[test]
fn test_fence_absorbs_until_broken_and_discards_overflow() {
    let mut balance = rich_balance();
    balance.castle.fence_table = vec![(3, 140)];
    let mut sim = castle_at_level(balance, Progression::default(), 3);
    let castle_id = sim.castle().expect("castle").id;
    let max = sim.castle().expect("castle").health.max;

    for dy in [-10, 0, 10] {
        enemy_near_castle(&mut sim, EnemyKind::Troll, 30, dy);
    }

    let mut events = Vec::new();
    while sim.now_ms() < 30_000 && sim.castle().expect("castle").health.current == max {
        events.extend(sim.advance(50).events);
    }

    let broken_at = events
        .iter()
        .position(|event| *event == SimEvent::FenceBroken)
        .expect("fence should break");
    assert_eq!(
        events.iter().filter(|e| **e == SimEvent::FenceBroken).count(),
        1
    );

    // The hit that breaks the fence is recorded right after the break.
    let (absorbed, after) = events.split_at(broken_at + 2);
    let absorbed: u32 = castle_damage(absorbed, castle_id).iter().sum();
    let after: u32 = castle_damage(after, castle_id).iter().sum();

    // Five 25-damage hits plus the 15 the fence still had; the other 10 are lost.
    assert_eq!(absorbed, 140);
    assert!(after > 0);
    assert_eq!(sim.castle().expect("castle").health.current, max - after);
    assert!(sim.castle().expect("castle").defense.expect("defense").fence.is_none());
}

#[test]
fn test_upgrade_recreates_fence_at_full_capacity() {
    let mut sim = castle_at_level(rich_balance(), Progression::default(), 3);
    enemy_near_castle(&mut sim, EnemyKind::Orc, 30, 0);
    sim.advance(50);

    let fence = sim
        .castle()
        .and_then(|c| c.defense)
        .and_then(|d| d.fence)
        .expect("fence at level 3");
    assert_eq!(fence.health.current, 140);

    sim.upgrade_castle().expect("level 4");
    let fence = sim
        .castle()
        .and_then(|c| c.defense)
        .and_then(|d| d.fence)
        .expect("fence at level 4");
    assert_eq!(fence.health.current, 250);
    assert_eq!(fence.health.max, 250);
}

// =============================================================================
// Armor
// =============================================================================

#[test]
fn test_castle_armor_reduces_melee_damage() {
    let progression = Progression {
        castle_armor_level: 5,
        ..Progression::default()
    };
    let mut sim = castle_at_level(Balance::default(), progression, 1);
    let castle_id = sim.castle().expect("castle").id;
    enemy_near_castle(&mut sim, EnemyKind::Troll, 30, 0);

    let events = sim.advance(50).events;

    // Armor level 5 keeps 80% of the troll's 25.
    assert_eq!(castle_damage(&events, castle_id), vec![20]);
    assert_eq!(sim.castle().expect("castle").health.current, 480);
}

#[test]
fn test_armor_never_reduces_below_one() {
    let progression = Progression {
        castle_armor_level: 200,
        ..Progression::default()
    };
    let mut sim = castle_at_level(Balance::default(), progression, 1);
    let castle_id = sim.castle().expect("castle").id;
    enemy_near_castle(&mut sim, EnemyKind::Wolf, 20, 0);

    let events = sim.advance(50).events;

    // 75% cap: floor(3 * 25 / 100) = 0, raised to the floor of 1.
    assert_eq!(castle_damage(&events, castle_id), vec![1]);
}

// =============================================================================
// Turret
// =============================================================================

#[test]
fn test_turret_kills_lone_goblin() {
    let mut sim = castle_at_level(rich_balance(), Progression::default(), 2);
    let goblin = enemy_near_castle(&mut sim, EnemyKind::Goblin, 250, 0);

    let mut killed = false;
    while sim.now_ms() < 10_000 && !killed {
        let events = sim.advance(50);
        killed = events.deaths().contains(&goblin);
    }

    assert!(killed, "turret should kill a goblin in range");
    assert!(sim.combatant(goblin).is_none());
    // Out-of-roster enemies still count for stats.
    assert_eq!(sim.stats().enemies_killed, 1);
    assert_eq!(sim.outcome(), Outcome::InProgress);
}

#[test]
fn test_turret_ignores_enemies_out_of_range() {
    let mut sim = castle_at_level(rich_balance(), Progression::default(), 2);
    let at = near_castle(&sim, 700, 0);
    sim.spawn_enemy(EnemyKind::Orc, at).expect("orc stats");

    let events = sim.advance(50).events;

    assert!(!events
        .iter()
        .any(|e| matches!(e, SimEvent::ProjectileLaunched { .. })));
    assert!(sim.projectiles().is_empty());
}

#[test]
fn test_heal_restores_after_damage() {
    let mut sim = castle_at_level(
        Balance {
            starting_resources: Resources::new(0, 0),
            ..Balance::default()
        },
        Progression::default(),
        1,
    );
    let orc = enemy_near_castle(&mut sim, EnemyKind::Orc, 30, 0);
    sim.advance(50);
    assert_eq!(sim.castle().expect("castle").health.current, 490);

    sim.set_active(orc, false).expect("orc present");
    assert_eq!(sim.heal_castle(1_000), Ok(10));
    assert_eq!(sim.castle().expect("castle").health.current, 500);
}

// =============================================================================
// Upgraded defenders
// =============================================================================

fn first_mage_volley(level: u32) -> u32 {
    let mut progression = Progression::default();
    progression.unit_levels.insert(UnitKind::Mage, level);
    let mut sim = castle_at_level(rich_balance(), progression, 1);
    sim.spawn_unit(UnitKind::Mage).expect("affordable mage");
    let troll = enemy_near_castle(&mut sim, EnemyKind::Troll, 100, 0);

    while sim.now_ms() < 5_000 {
        let events = sim.advance(50).events;
        if let Some(amount) = events.iter().find_map(|event| match event {
            SimEvent::DamageDealt { target, amount, .. } if *target == troll => Some(*amount),
            _ => None,
        }) {
            return amount;
        }
    }
    panic!("mage never hit the troll");
}

#[test]
fn test_mage_upgrade_raises_splash_damage() {
    let base = first_mage_volley(1);
    let upgraded = first_mage_volley(5);

    assert!(base > 0);
    // Level 5 adds 30 to the 10-damage impact.
    assert!(upgraded > base);
    assert!(upgraded >= base * 3);
}
