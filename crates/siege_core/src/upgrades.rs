//! Exponential unit upgrade scaling.
//!
//! Levels come from meta-progression and are opaque inputs. Level 0 is
//! treated as level 1; the bonuses use saturating powers so absurd levels
//! clamp instead of overflowing.

use serde::{Deserialize, Serialize};

use crate::components::AttackStats;
use crate::config::{attack_stats, SplashConfig, UnitStats};
use crate::math::Fixed;

/// Attack interval floor.
pub const MIN_ATTACK_SPEED_MS: u32 = 300;

/// Attack interval removed per level above 1.
pub const ATTACK_SPEED_STEP_MS: u32 = 30;

/// `2^(level-1) - 1`
#[must_use]
pub fn health_bonus(level: u32) -> u32 {
    let level = level.max(1);
    2u32.saturating_pow(level - 1) - 1
}

/// `2^level - 2`
#[must_use]
pub fn damage_bonus(level: u32) -> u32 {
    let level = level.max(1);
    2u32.saturating_pow(level).saturating_sub(2)
}

/// `max(300, base - (level-1) * 30)`
#[must_use]
pub fn attack_speed_ms(base_ms: u32, level: u32) -> u32 {
    let reduction = level.max(1).saturating_sub(1).saturating_mul(ATTACK_SPEED_STEP_MS);
    base_ms.saturating_sub(reduction).max(MIN_ATTACK_SPEED_MS)
}

/// Unit stats after applying an upgrade level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EffectiveStats {
    /// Max health.
    pub max_health: u32,
    /// Attack with upgraded damage and interval.
    pub attack: AttackStats,
    /// Movement speed.
    pub move_speed: u32,
}

/// Apply `level` to a unit's base stats.
///
/// The damage bonus applies to the impact damage of splash attacks too.
#[must_use]
pub fn effective_stats(base: &UnitStats, level: u32) -> EffectiveStats {
    let bonus = damage_bonus(level);
    let splash = base.splash.map(|splash| SplashConfig {
        damage: splash.damage.saturating_add(bonus),
        ..splash
    });
    let attack = attack_stats(
        base.damage.saturating_add(bonus),
        base.range,
        attack_speed_ms(base.attack_speed_ms, level),
        base.projectile_speed,
        splash,
    );

    EffectiveStats {
        max_health: base.health.saturating_add(health_bonus(level)),
        attack,
        move_speed: base.speed,
    }
}

impl EffectiveStats {
    /// Movement speed in fixed point.
    #[must_use]
    pub fn move_speed_fixed(&self) -> Fixed {
        Fixed::from_num(self.move_speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn swordsman() -> UnitStats {
        UnitStats {
            health: 25,
            damage: 5,
            range: 30,
            attack_speed_ms: 1000,
            speed: 70,
            projectile_speed: 0,
            splash: None,
            gold_cost: 30,
            wood_cost: 0,
        }
    }

    #[test]
    fn test_level_three_bonuses() {
        let stats = effective_stats(&swordsman(), 3);
        assert_eq!(stats.max_health, 28);
        assert_eq!(stats.attack.damage, 11);
        assert_eq!(stats.attack.cooldown_ms, 940);
    }

    fn mage() -> UnitStats {
        UnitStats {
            health: 15,
            damage: 10,
            range: 180,
            attack_speed_ms: 1800,
            speed: 50,
            projectile_speed: 300,
            splash: Some(SplashConfig {
                radius: 50,
                damage: 10,
            }),
            gold_cost: 70,
            wood_cost: 20,
        }
    }

    #[test]
    fn test_level_three_mage_splash() {
        let stats = effective_stats(&mage(), 3);
        let splash = stats.attack.splash.unwrap();
        assert_eq!(splash.damage, 10 + 6);
        assert_eq!(splash.radius, Fixed::from_num(50));
        assert_eq!(stats.attack.damage, 16);

        let base = effective_stats(&mage(), 1);
        assert_eq!(base.attack.splash.unwrap().damage, 10);
    }

    #[test]
    fn test_level_one_is_base() {
        let stats = effective_stats(&swordsman(), 1);
        assert_eq!(stats.max_health, 25);
        assert_eq!(stats.attack.damage, 5);
        assert_eq!(stats.attack.cooldown_ms, 1000);
        assert_eq!(effective_stats(&swordsman(), 0), stats);
    }

    #[test]
    fn test_attack_speed_floor() {
        assert_eq!(attack_speed_ms(1000, 30), 300);
        assert_eq!(attack_speed_ms(200, 1), 300);
    }

    #[test]
    fn test_huge_levels_saturate() {
        assert_eq!(health_bonus(64), u32::MAX - 1);
        assert_eq!(damage_bonus(64), u32::MAX - 2);
    }

    proptest! {
        #[test]
        fn prop_bonuses_non_decreasing(level in 1u32..40) {
            prop_assert!(health_bonus(level + 1) >= health_bonus(level));
            prop_assert!(damage_bonus(level + 1) >= damage_bonus(level));
            prop_assert!(attack_speed_ms(1500, level + 1) <= attack_speed_ms(1500, level));
            prop_assert!(attack_speed_ms(1500, level) >= MIN_ATTACK_SPEED_MS);
        }
    }
}
