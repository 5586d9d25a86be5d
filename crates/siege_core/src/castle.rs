//! Castle progression: levels, max health, fence and turret.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::components::{
    AttackStats, CastleDefense, Combatant, CombatantKind, Fence,
};
use crate::config::{CastleConfig, Progression};
use crate::error::{GameError, Result};
use crate::events::SimEvent;
use crate::math::Fixed;

/// Fence capacity at `level`.
///
/// `None` below the first table level. Levels past the end of the table
/// grow linearly by `overflow_per_level` from the last entry; a level that
/// falls between entries uses the closest entry below it.
#[must_use]
pub fn fence_capacity(level: u32, table: &[(u32, u32)], overflow_per_level: u32) -> Option<u32> {
    let &(last_level, last_capacity) = table.last()?;
    if level > last_level {
        let extra = (level - last_level).saturating_mul(overflow_per_level);
        return Some(last_capacity.saturating_add(extra));
    }
    table
        .iter()
        .rev()
        .find(|(at, _)| *at <= level)
        .map(|&(_, capacity)| capacity)
}

/// Castle level and the values derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CastleState {
    level: u32,
    max_level: u32,
    armor_level: u32,
}

impl CastleState {
    /// Level 1 castle with meta-progression applied.
    #[must_use]
    pub fn new(config: &CastleConfig, progression: &Progression) -> Self {
        Self {
            level: 1,
            max_level: config
                .base_max_level
                .saturating_add(progression.castle_max_level_bonus),
            armor_level: progression.castle_armor_level.max(1),
        }
    }

    /// Current level.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Base max level plus the meta-progression bonus.
    #[must_use]
    pub const fn effective_max_level(&self) -> u32 {
        self.max_level
    }

    /// Armor level applied to incoming damage.
    #[must_use]
    pub const fn armor_level(&self) -> u32 {
        self.armor_level
    }

    /// Whether another level is available.
    #[must_use]
    pub const fn can_level_up(&self) -> bool {
        self.level < self.max_level
    }

    /// Gold and wood needed for the next level.
    #[must_use]
    pub fn upgrade_cost(&self, config: &CastleConfig) -> (u32, u32) {
        (
            config.upgrade_gold_per_level.saturating_mul(self.level),
            config.upgrade_wood_per_level.saturating_mul(self.level),
        )
    }

    /// Max health at the current level.
    #[must_use]
    pub fn max_health(&self, config: &CastleConfig) -> u32 {
        config
            .base_health
            .saturating_add((self.level - 1).saturating_mul(config.health_per_level))
    }

    /// Whether the turret fires at this level.
    #[must_use]
    pub const fn turret_active(&self, config: &CastleConfig) -> bool {
        self.level >= config.turret.unlock_level
    }

    /// Turret attack at the current level (zero damage when inactive).
    #[must_use]
    pub fn turret_attack(&self, config: &CastleConfig) -> AttackStats {
        let turret = &config.turret;
        let damage = if self.turret_active(config) {
            turret
                .base_damage
                .saturating_add((self.level - 1).saturating_mul(turret.damage_per_level))
        } else {
            0
        };
        AttackStats::melee(damage, Fixed::from_num(turret.range), turret.cooldown_ms)
            .with_projectile_speed(Fixed::from_num(turret.projectile_speed))
    }

    /// Fence for the current level, if unlocked.
    #[must_use]
    pub fn fence(&self, config: &CastleConfig) -> Option<Fence> {
        if self.level < config.fence_unlock_level {
            return None;
        }
        fence_capacity(
            self.level,
            &config.fence_table,
            config.fence_overflow_per_level,
        )
        .map(Fence::new)
    }

    /// Build the castle combatant for the current level.
    #[must_use]
    pub fn build_combatant(&self, config: &CastleConfig) -> Combatant {
        Combatant::new(
            CombatantKind::Castle,
            config.position(),
            self.max_health(config),
            self.turret_attack(config),
            Fixed::ZERO,
            Fixed::from_num(config.hit_radius),
        )
        .with_defense(CastleDefense {
            armor_level: self.armor_level,
            fence: self.fence(config),
        })
    }

    /// Gain a level and apply it to `castle`.
    ///
    /// Raises max health and heals by the increase, re-creates the fence at
    /// the new capacity once unlocked and refreshes the turret. Resources are
    /// the caller's concern.
    ///
    /// # Errors
    ///
    /// [`GameError::MaxLevelReached`] at the effective max level; nothing is
    /// changed in that case.
    pub fn level_up(
        &mut self,
        castle: &mut Combatant,
        config: &CastleConfig,
        events: &mut Vec<SimEvent>,
    ) -> Result<u32> {
        if !self.can_level_up() {
            return Err(GameError::MaxLevelReached(self.max_level));
        }

        self.level += 1;

        let healed = castle.health.raise_max(self.max_health(config));
        if healed > 0 {
            events.push(SimEvent::Healed {
                target: castle.id,
                position: castle.position,
                amount: healed,
            });
        }

        if let Some(fence) = self.fence(config) {
            let defense = castle.defense.get_or_insert(CastleDefense {
                armor_level: self.armor_level,
                fence: None,
            });
            defense.fence = Some(fence);
        }

        castle.attack = self.turret_attack(config);
        events.push(SimEvent::CastleUpgraded { level: self.level });
        info!(level = self.level, max = self.max_level, "Castle upgraded");
        Ok(self.level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: [(u32, u32); 4] = [(3, 150), (4, 250), (5, 400), (6, 600)];

    fn setup(bonus: u32) -> (CastleConfig, CastleState, Combatant) {
        let config = CastleConfig::default();
        let progression = Progression {
            castle_max_level_bonus: bonus,
            ..Progression::default()
        };
        let state = CastleState::new(&config, &progression);
        let mut castle = state.build_combatant(&config);
        castle.id = 1;
        (config, state, castle)
    }

    #[test]
    fn test_fence_table_and_overflow() {
        assert_eq!(fence_capacity(2, &TABLE, 200), None);
        assert_eq!(fence_capacity(3, &TABLE, 200), Some(150));
        assert_eq!(fence_capacity(6, &TABLE, 200), Some(600));
        assert_eq!(fence_capacity(8, &TABLE, 200), Some(1000));
        assert_eq!(fence_capacity(5, &[], 200), None);
    }

    #[test]
    fn test_effective_max_level() {
        let (_, state, _) = setup(2);
        assert_eq!(state.effective_max_level(), 7);
    }

    #[test]
    fn test_level_up_heals_by_increase() {
        let (config, mut state, mut castle) = setup(0);
        castle.health.apply_damage(100);
        let mut events = Vec::new();

        assert_eq!(state.level_up(&mut castle, &config, &mut events), Ok(2));
        assert_eq!(castle.health.max, 750);
        assert_eq!(castle.health.current, 650);
        assert!(events.contains(&SimEvent::Healed {
            target: 1,
            position: castle.position,
            amount: 250,
        }));
        assert!(state.turret_active(&config));
        assert_eq!(castle.attack.damage, 18);
    }

    #[test]
    fn test_fence_created_from_level_three() {
        let (config, mut state, mut castle) = setup(0);
        let mut events = Vec::new();
        assert!(castle.defense.unwrap().fence.is_none());

        state.level_up(&mut castle, &config, &mut events).unwrap();
        assert!(castle.defense.unwrap().fence.is_none());

        state.level_up(&mut castle, &config, &mut events).unwrap();
        assert_eq!(castle.defense.unwrap().fence, Some(Fence::new(150)));

        // A damaged fence is rebuilt at the higher capacity.
        if let Some(fence) = castle.defense.as_mut().and_then(|d| d.fence.as_mut()) {
            fence.health.apply_damage(100);
        }
        state.level_up(&mut castle, &config, &mut events).unwrap();
        assert_eq!(castle.defense.unwrap().fence, Some(Fence::new(250)));
    }

    #[test]
    fn test_max_level_rejected_without_change() {
        let (config, mut state, mut castle) = setup(0);
        let mut events = Vec::new();
        for _ in 1..5 {
            state.level_up(&mut castle, &config, &mut events).unwrap();
        }
        let before = castle.clone();
        events.clear();

        assert_eq!(
            state.level_up(&mut castle, &config, &mut events),
            Err(GameError::MaxLevelReached(5))
        );
        assert_eq!(castle, before);
        assert!(events.is_empty());
    }

    #[test]
    fn test_upgrade_cost_scales_with_level() {
        let (config, mut state, mut castle) = setup(0);
        assert_eq!(state.upgrade_cost(&config), (150, 60));
        state
            .level_up(&mut castle, &config, &mut Vec::new())
            .unwrap();
        assert_eq!(state.upgrade_cost(&config), (300, 120));
    }
}
