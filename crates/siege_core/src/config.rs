//! Balance tables and meta-progression inputs.
//!
//! [`Balance`] is everything a designer tunes: playfield geometry, castle,
//! projectiles, waves, per-kind stats and starting resources. It is plain
//! serde data, loadable from RON, and checked once by [`Balance::validate`]
//! before a simulation is built from it.
//!
//! # Example RON
//!
//! ```ron
//! Balance(
//!     playfield: (width: 1600, height: 600, out_of_bounds_margin: 100, spawn_spread: 60),
//!     castle: (...),
//!     projectiles: (homing_gain_per_mille: 15, max_distance: 900, hit_radius: 18, boss_hit_radius: 40),
//!     waves: (...),
//!     enemies: { Goblin: (...), ... },
//!     units: { Swordsman: (...), ... },
//!     starting_resources: (gold: 200, wood: 80),
//! )
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::components::{AttackStats, EnemyKind, Splash, UnitKind};
use crate::error::{GameError, Result};
use crate::math::{Fixed, Vec2Fixed};
use crate::wave::{WaveConfig, WaveReward};

/// Playfield bounds in whole world units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayfieldConfig {
    /// Width (x in `0..=width`).
    pub width: i32,
    /// Height (y in `0..=height`, top edge at 0).
    pub height: i32,
    /// Projectiles further than this outside the field expire.
    pub out_of_bounds_margin: i32,
    /// Spawn points are offset by up to this much along their edge.
    #[serde(default = "default_spawn_spread")]
    pub spawn_spread: i32,
}

const fn default_spawn_spread() -> i32 {
    60
}

impl Default for PlayfieldConfig {
    fn default() -> Self {
        Self {
            width: 1600,
            height: 600,
            out_of_bounds_margin: 100,
            spawn_spread: default_spawn_spread(),
        }
    }
}

impl PlayfieldConfig {
    /// Whether `position` lies inside the field grown by the margin.
    #[must_use]
    pub fn contains_with_margin(&self, position: Vec2Fixed) -> bool {
        let margin = Fixed::from_num(self.out_of_bounds_margin);
        let min = -margin;
        let max_x = Fixed::from_num(self.width) + margin;
        let max_y = Fixed::from_num(self.height) + margin;
        position.x >= min && position.x <= max_x && position.y >= min && position.y <= max_y
    }
}

/// Area damage in whole units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SplashConfig {
    /// Falloff radius.
    pub radius: u32,
    /// Damage at the impact point.
    pub damage: u32,
}

impl SplashConfig {
    /// Runtime form.
    #[must_use]
    pub fn to_splash(self) -> Splash {
        Splash {
            radius: Fixed::from_num(self.radius),
            damage: self.damage,
        }
    }
}

/// The castle turret, active from `unlock_level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TurretConfig {
    /// First castle level with a turret.
    pub unlock_level: u32,
    /// Damage at castle level 1.
    pub base_damage: u32,
    /// Damage added per castle level.
    pub damage_per_level: u32,
    /// Firing range.
    pub range: u32,
    /// Time between shots.
    pub cooldown_ms: u32,
    /// Projectile speed.
    pub projectile_speed: u32,
}

impl Default for TurretConfig {
    fn default() -> Self {
        Self {
            unlock_level: 2,
            base_damage: 12,
            damage_per_level: 6,
            range: 260,
            cooldown_ms: 900,
            projectile_speed: 420,
        }
    }
}

/// Castle stats, upgrade costs and fence table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CastleConfig {
    /// Castle x.
    pub x: i32,
    /// Castle y.
    pub y: i32,
    /// Max health at level 1.
    pub base_health: u32,
    /// Max health added per level.
    pub health_per_level: u32,
    /// Projectile hit radius.
    pub hit_radius: u32,
    /// Highest level without meta-progression.
    pub base_max_level: u32,
    /// Upgrade gold cost per current level.
    pub upgrade_gold_per_level: u32,
    /// Upgrade wood cost per current level.
    pub upgrade_wood_per_level: u32,
    /// First level with a fence.
    pub fence_unlock_level: u32,
    /// `(level, capacity)` pairs, ascending by level.
    pub fence_table: Vec<(u32, u32)>,
    /// Capacity added per level past the end of the table.
    pub fence_overflow_per_level: u32,
    /// Turret stats.
    pub turret: TurretConfig,
}

impl Default for CastleConfig {
    fn default() -> Self {
        Self {
            x: 800,
            y: 450,
            base_health: 500,
            health_per_level: 250,
            hit_radius: 60,
            base_max_level: 5,
            upgrade_gold_per_level: 150,
            upgrade_wood_per_level: 60,
            fence_unlock_level: 3,
            fence_table: vec![(3, 150), (4, 250), (5, 400), (6, 600)],
            fence_overflow_per_level: 200,
            turret: TurretConfig::default(),
        }
    }
}

impl CastleConfig {
    /// Castle position.
    #[must_use]
    pub fn position(&self) -> Vec2Fixed {
        Vec2Fixed::from_ints(self.x, self.y)
    }
}

/// Projectile tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectileConfig {
    /// Homing correction in per-mille of speed.
    pub homing_gain_per_mille: u32,
    /// Straight-line travel limit.
    pub max_distance: u32,
    /// Hit radius of units and regular enemies.
    pub hit_radius: u32,
    /// Hit radius of bosses.
    pub boss_hit_radius: u32,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            homing_gain_per_mille: 15,
            max_distance: 900,
            hit_radius: 18,
            boss_hit_radius: 40,
        }
    }
}

/// Base stats of an enemy type at wave 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnemyStats {
    /// Max health before wave scaling.
    pub health: u32,
    /// Damage per hit.
    pub damage: u32,
    /// Movement speed.
    pub speed: u32,
    /// Attack range.
    pub range: u32,
    /// Time between attacks.
    pub cooldown_ms: u32,
    /// Projectile speed, 0 for melee.
    #[serde(default)]
    pub projectile_speed: u32,
    /// Area damage on projectile impact.
    #[serde(default)]
    pub splash: Option<SplashConfig>,
}

impl EnemyStats {
    /// Runtime attack stats.
    #[must_use]
    pub fn attack(&self) -> AttackStats {
        attack_stats(
            self.damage,
            self.range,
            self.cooldown_ms,
            self.projectile_speed,
            self.splash,
        )
    }
}

/// Base stats and cost of a unit type at upgrade level 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitStats {
    /// Max health.
    pub health: u32,
    /// Damage per hit.
    pub damage: u32,
    /// Attack range.
    pub range: u32,
    /// Time between attacks before upgrades.
    pub attack_speed_ms: u32,
    /// Movement speed.
    pub speed: u32,
    /// Projectile speed, 0 for melee.
    #[serde(default)]
    pub projectile_speed: u32,
    /// Area damage on projectile impact.
    #[serde(default)]
    pub splash: Option<SplashConfig>,
    /// Gold cost.
    pub gold_cost: u32,
    /// Wood cost.
    #[serde(default)]
    pub wood_cost: u32,
}

pub(crate) fn attack_stats(
    damage: u32,
    range: u32,
    cooldown_ms: u32,
    projectile_speed: u32,
    splash: Option<SplashConfig>,
) -> AttackStats {
    let attack = AttackStats::melee(damage, Fixed::from_num(range), cooldown_ms)
        .with_projectile_speed(Fixed::from_num(projectile_speed));
    match splash {
        Some(splash) => attack.with_splash(splash.to_splash()),
        None => attack,
    }
}

/// Gold and wood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Resources {
    /// Gold.
    pub gold: u32,
    /// Wood.
    pub wood: u32,
}

impl Resources {
    /// Create a resource pair.
    #[must_use]
    pub const fn new(gold: u32, wood: u32) -> Self {
        Self { gold, wood }
    }

    /// Whether both amounts are covered.
    #[must_use]
    pub const fn can_afford(&self, gold: u32, wood: u32) -> bool {
        self.gold >= gold && self.wood >= wood
    }

    /// Spend both amounts or nothing.
    ///
    /// # Errors
    ///
    /// [`GameError::InsufficientResources`] naming the first short resource.
    pub fn try_spend(&mut self, gold: u32, wood: u32) -> Result<()> {
        if self.gold < gold {
            return Err(GameError::InsufficientResources {
                resource: "gold",
                required: gold,
                available: self.gold,
            });
        }
        if self.wood < wood {
            return Err(GameError::InsufficientResources {
                resource: "wood",
                required: wood,
                available: self.wood,
            });
        }
        self.gold -= gold;
        self.wood -= wood;
        Ok(())
    }

    /// Add a wave reward.
    pub fn credit(&mut self, reward: WaveReward) {
        self.gold = self.gold.saturating_add(reward.gold);
        self.wood = self.wood.saturating_add(reward.wood);
    }
}

/// Complete balance definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Balance {
    /// Field geometry.
    #[serde(default)]
    pub playfield: PlayfieldConfig,
    /// Castle.
    #[serde(default)]
    pub castle: CastleConfig,
    /// Projectile tuning.
    #[serde(default)]
    pub projectiles: ProjectileConfig,
    /// Wave content and pacing.
    #[serde(default)]
    pub waves: WaveConfig,
    /// Enemy stats per kind.
    pub enemies: BTreeMap<EnemyKind, EnemyStats>,
    /// Unit stats per kind.
    pub units: BTreeMap<UnitKind, UnitStats>,
    /// Resources at the start of a run.
    #[serde(default = "default_starting_resources")]
    pub starting_resources: Resources,
}

const fn default_starting_resources() -> Resources {
    Resources::new(200, 80)
}

impl Default for Balance {
    fn default() -> Self {
        Self {
            playfield: PlayfieldConfig::default(),
            castle: CastleConfig::default(),
            projectiles: ProjectileConfig::default(),
            waves: WaveConfig::default(),
            enemies: default_enemies(),
            units: default_units(),
            starting_resources: default_starting_resources(),
        }
    }
}

fn default_enemies() -> BTreeMap<EnemyKind, EnemyStats> {
    let melee = |health, damage, speed, range, cooldown_ms| EnemyStats {
        health,
        damage,
        speed,
        range,
        cooldown_ms,
        projectile_speed: 0,
        splash: None,
    };

    BTreeMap::from([
        (EnemyKind::Goblin, melee(30, 4, 60, 30, 1000)),
        (EnemyKind::Wolf, melee(20, 3, 110, 25, 700)),
        (EnemyKind::Orc, melee(80, 10, 40, 35, 1400)),
        (
            EnemyKind::GoblinArcher,
            EnemyStats {
                projectile_speed: 320,
                ..melee(25, 6, 50, 220, 1600)
            },
        ),
        (
            EnemyKind::Shaman,
            EnemyStats {
                projectile_speed: 260,
                splash: Some(SplashConfig {
                    radius: 45,
                    damage: 8,
                }),
                ..melee(45, 8, 45, 200, 2200)
            },
        ),
        (EnemyKind::Troll, melee(220, 25, 30, 40, 2000)),
        (EnemyKind::Warlord, melee(1500, 40, 25, 60, 1800)),
    ])
}

fn default_units() -> BTreeMap<UnitKind, UnitStats> {
    BTreeMap::from([
        (
            UnitKind::Swordsman,
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
            },
        ),
        (
            UnitKind::Archer,
            UnitStats {
                health: 18,
                damage: 6,
                range: 200,
                attack_speed_ms: 1200,
                speed: 60,
                projectile_speed: 380,
                splash: None,
                gold_cost: 40,
                wood_cost: 10,
            },
        ),
        (
            UnitKind::Mage,
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
            },
        ),
        (
            UnitKind::Knight,
            UnitStats {
                health: 60,
                damage: 9,
                range: 35,
                attack_speed_ms: 1300,
                speed: 55,
                projectile_speed: 0,
                splash: None,
                gold_cost: 90,
                wood_cost: 30,
            },
        ),
    ])
}

impl Balance {
    /// Parse and validate a RON balance file.
    ///
    /// # Errors
    ///
    /// [`GameError::ConfigParse`] on malformed RON, otherwise whatever
    /// [`Balance::validate`] reports.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        let balance: Self = ron::from_str(text).map_err(|e| GameError::ConfigParse {
            what: "balance",
            message: e.to_string(),
        })?;
        balance.validate()?;
        Ok(balance)
    }

    /// Stats for an enemy kind.
    ///
    /// # Errors
    ///
    /// [`GameError::MissingConfig`] when the table has no entry.
    pub fn enemy(&self, kind: EnemyKind) -> Result<&EnemyStats> {
        self.enemies.get(&kind).ok_or_else(|| GameError::MissingConfig {
            kind: "enemy",
            key: kind.name().to_string(),
        })
    }

    /// Stats for a unit kind.
    ///
    /// # Errors
    ///
    /// [`GameError::MissingConfig`] when the table has no entry.
    pub fn unit(&self, kind: UnitKind) -> Result<&UnitStats> {
        self.units.get(&kind).ok_or_else(|| GameError::MissingConfig {
            kind: "unit",
            key: kind.name().to_string(),
        })
    }

    /// Check the tables for missing kinds and unusable values.
    ///
    /// # Errors
    ///
    /// [`GameError::MissingConfig`] for the first kind without stats,
    /// otherwise [`GameError::InvalidConfig`] listing every problem found.
    pub fn validate(&self) -> Result<()> {
        for kind in EnemyKind::ALL {
            self.enemy(kind)?;
        }
        for kind in UnitKind::ALL {
            self.unit(kind)?;
        }

        let problems = self.problems();
        if problems.is_empty() {
            Ok(())
        } else {
            Err(GameError::InvalidConfig(problems.join("; ")))
        }
    }

    /// Every value-level problem in the tables.
    #[must_use]
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.playfield.width <= 0 || self.playfield.height <= 0 {
            problems.push("playfield must have a positive size".to_string());
        }
        if self.waves.spawn_interval_ms == 0 {
            problems.push("waves.spawn_interval_ms must be non-zero".to_string());
        }
        if self.castle.base_health == 0 {
            problems.push("castle.base_health must be non-zero".to_string());
        }
        if self.castle.base_max_level == 0 {
            problems.push("castle.base_max_level must be at least 1".to_string());
        }
        if !self
            .castle
            .fence_table
            .windows(2)
            .all(|pair| pair[0].0 < pair[1].0)
        {
            problems.push("castle.fence_table must be sorted by level".to_string());
        }
        if self.waves.boss.every_waves > 0 && !self.enemies.contains_key(&self.waves.boss.kind) {
            problems.push(format!(
                "boss kind '{}' has no stats",
                self.waves.boss.kind.name()
            ));
        }

        for (kind, stats) in &self.enemies {
            if stats.health == 0 {
                problems.push(format!("enemy '{}' has zero health", kind.name()));
            }
        }
        for (kind, stats) in &self.units {
            if stats.health == 0 {
                problems.push(format!("unit '{}' has zero health", kind.name()));
            }
        }

        problems
    }
}

/// Persistent meta-progression supplied per session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Progression {
    /// Upgrade level per unit kind; missing kinds are level 1.
    #[serde(default)]
    pub unit_levels: BTreeMap<UnitKind, u32>,
    /// Extra castle levels unlocked.
    #[serde(default)]
    pub castle_max_level_bonus: u32,
    /// Castle armor level (1 = no reduction).
    #[serde(default = "default_armor_level")]
    pub castle_armor_level: u32,
}

const fn default_armor_level() -> u32 {
    1
}

impl Default for Progression {
    fn default() -> Self {
        Self {
            unit_levels: BTreeMap::new(),
            castle_max_level_bonus: 0,
            castle_armor_level: default_armor_level(),
        }
    }
}

impl Progression {
    /// Parse a RON progression file.
    ///
    /// # Errors
    ///
    /// [`GameError::ConfigParse`] on malformed RON.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        ron::from_str(text).map_err(|e| GameError::ConfigParse {
            what: "progression",
            message: e.to_string(),
        })
    }

    /// Upgrade level for a unit kind, at least 1.
    #[must_use]
    pub fn unit_level(&self, kind: UnitKind) -> u32 {
        self.unit_levels.get(&kind).copied().unwrap_or(1).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_balance_is_valid() {
        assert_eq!(Balance::default().validate(), Ok(()));
    }

    #[test]
    fn test_missing_enemy_is_fatal() {
        let mut balance = Balance::default();
        balance.enemies.remove(&EnemyKind::Troll);
        assert_eq!(
            balance.validate(),
            Err(GameError::MissingConfig {
                kind: "enemy",
                key: "Troll".to_string(),
            })
        );
    }

    #[test]
    fn test_value_problems_are_collected() {
        let mut balance = Balance::default();
        balance.waves.spawn_interval_ms = 0;
        balance.castle.fence_table = vec![(4, 250), (3, 150)];

        let problems = balance.problems();
        assert_eq!(problems.len(), 2);
        assert!(matches!(balance.validate(), Err(GameError::InvalidConfig(_))));
    }

    #[test]
    fn test_ron_round_trip() {
        let balance = Balance::default();
        let text = ron::to_string(&balance).unwrap();
        assert_eq!(Balance::from_ron_str(&text).unwrap(), balance);
    }

    #[test]
    fn test_ron_parse_error() {
        let err = Balance::from_ron_str("Balance(").unwrap_err();
        assert!(matches!(err, GameError::ConfigParse { what: "balance", .. }));
    }

    #[test]
    fn test_progression_defaults() {
        let progression = Progression::from_ron_str("(unit_levels: {Archer: 3})").unwrap();
        assert_eq!(progression.unit_level(UnitKind::Archer), 3);
        assert_eq!(progression.unit_level(UnitKind::Knight), 1);
        assert_eq!(progression.castle_armor_level, 1);
        assert_eq!(progression.castle_max_level_bonus, 0);
    }

    #[test]
    fn test_try_spend_is_all_or_nothing() {
        let mut resources = Resources::new(100, 5);
        assert_eq!(
            resources.try_spend(50, 10),
            Err(GameError::InsufficientResources {
                resource: "wood",
                required: 10,
                available: 5,
            })
        );
        assert_eq!(resources, Resources::new(100, 5));

        resources.try_spend(60, 5).unwrap();
        assert_eq!(resources, Resources::new(40, 0));

        resources.credit(WaveReward { gold: 70, wood: 28 });
        assert_eq!(resources, Resources::new(110, 28));
    }

    #[test]
    fn test_playfield_margin() {
        let field = PlayfieldConfig::default();
        assert!(field.contains_with_margin(Vec2Fixed::from_ints(-100, 700)));
        assert!(!field.contains_with_margin(Vec2Fixed::from_ints(-101, 300)));
        assert!(!field.contains_with_margin(Vec2Fixed::from_ints(800, 701)));
    }
}
