//! Entity state shared by every combatant.
//!
//! Components are pure data. Behaviour lives in [`crate::combat`],
//! [`crate::targeting`], [`crate::projectile`] and the simulation loop.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::math::{fixed_serde, Fixed, Vec2Fixed};

/// Unique identifier for combatants.
///
/// Ids are handed out in increasing order and never reused, so ascending id
/// order is spawn order. All scans iterate in that order.
pub type EntityId = u64;

/// Which side a combatant fights for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Faction {
    /// Castle and player-spawned units.
    Player,
    /// Wave enemies.
    Enemy,
}

impl Faction {
    /// The faction this one attacks.
    #[must_use]
    pub const fn opposing(self) -> Self {
        match self {
            Self::Player => Self::Enemy,
            Self::Enemy => Self::Player,
        }
    }
}

/// Player unit types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitKind {
    /// Cheap melee infantry.
    Swordsman,
    /// Ranged single-target.
    Archer,
    /// Ranged splash caster.
    Mage,
    /// Heavy melee.
    Knight,
}

impl UnitKind {
    /// Every unit kind, in table order.
    pub const ALL: [Self; 4] = [Self::Swordsman, Self::Archer, Self::Mage, Self::Knight];

    /// Stable display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Swordsman => "Swordsman",
            Self::Archer => "Archer",
            Self::Mage => "Mage",
            Self::Knight => "Knight",
        }
    }
}

/// Enemy types that can appear in a wave roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Baseline melee fodder.
    Goblin,
    /// Fast, fragile melee.
    Wolf,
    /// Sturdy melee.
    Orc,
    /// Ranged single-target.
    GoblinArcher,
    /// Ranged splash caster.
    Shaman,
    /// Slow heavy hitter.
    Troll,
    /// Boss, appended on boss waves only.
    Warlord,
}

impl EnemyKind {
    /// Every enemy kind, in table order.
    pub const ALL: [Self; 7] = [
        Self::Goblin,
        Self::Wolf,
        Self::Orc,
        Self::GoblinArcher,
        Self::Shaman,
        Self::Troll,
        Self::Warlord,
    ];

    /// Stable display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Goblin => "Goblin",
            Self::Wolf => "Wolf",
            Self::Orc => "Orc",
            Self::GoblinArcher => "GoblinArcher",
            Self::Shaman => "Shaman",
            Self::Troll => "Troll",
            Self::Warlord => "Warlord",
        }
    }

    /// Bosses use the larger projectile hit radius.
    #[must_use]
    pub const fn is_boss(self) -> bool {
        matches!(self, Self::Warlord)
    }
}

/// The concrete variant behind a [`Combatant`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatantKind {
    /// Player-spawned unit.
    Unit(UnitKind),
    /// Wave enemy.
    Enemy(EnemyKind),
    /// The defended castle (and its turret).
    Castle,
}

impl CombatantKind {
    /// Faction implied by the variant.
    #[must_use]
    pub const fn faction(self) -> Faction {
        match self {
            Self::Unit(_) | Self::Castle => Faction::Player,
            Self::Enemy(_) => Faction::Enemy,
        }
    }
}

/// Health component for damageable entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Health {
    /// Current health points.
    pub current: u32,
    /// Maximum health points.
    pub max: u32,
}

impl Health {
    /// Create new health component at full health.
    #[must_use]
    pub const fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    /// Check if entity is dead (health == 0).
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.current == 0
    }

    /// Check if entity is at full health.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.current >= self.max
    }

    /// Apply damage, returning actual damage dealt.
    /// Uses saturating subtraction to prevent underflow.
    pub fn apply_damage(&mut self, amount: u32) -> u32 {
        let actual = amount.min(self.current);
        self.current = self.current.saturating_sub(actual);
        actual
    }

    /// Heal the entity, returning actual amount healed.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let headroom = self.max.saturating_sub(self.current);
        let actual = amount.min(headroom);
        self.current = self.current.saturating_add(actual);
        actual
    }

    /// Raise the maximum and heal by the increase, returning the amount healed.
    pub fn raise_max(&mut self, new_max: u32) -> u32 {
        let increase = new_max.saturating_sub(self.max);
        self.max = self.max.max(new_max);
        self.heal(increase)
    }

    /// Get health as a percentage (0-100).
    #[must_use]
    pub fn percentage(&self) -> u32 {
        if self.max == 0 {
            0
        } else {
            (self.current * 100) / self.max
        }
    }
}

/// Area damage capability: flat damage falling off across `radius`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Splash {
    /// Falloff radius in world units.
    #[serde(with = "fixed_serde")]
    pub radius: Fixed,
    /// Damage at the impact point.
    pub damage: u32,
}

/// Offensive statistics of a combatant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttackStats {
    /// Damage per hit.
    pub damage: u32,
    /// Attack range in world units.
    #[serde(with = "fixed_serde")]
    pub range: Fixed,
    /// Minimum game time between attacks.
    pub cooldown_ms: u32,
    /// Projectile speed in world units per second (0 = melee).
    #[serde(with = "fixed_serde")]
    pub projectile_speed: Fixed,
    /// Optional area damage carried by this combatant's projectiles.
    pub splash: Option<Splash>,
}

impl AttackStats {
    /// Melee stats with no projectile.
    #[must_use]
    pub fn melee(damage: u32, range: Fixed, cooldown_ms: u32) -> Self {
        Self {
            damage,
            range,
            cooldown_ms,
            projectile_speed: Fixed::ZERO,
            splash: None,
        }
    }

    /// Builder method to set projectile speed.
    #[must_use]
    pub fn with_projectile_speed(mut self, speed: Fixed) -> Self {
        self.projectile_speed = speed;
        self
    }

    /// Builder method to add splash damage.
    #[must_use]
    pub fn with_splash(mut self, splash: Splash) -> Self {
        self.splash = Some(splash);
        self
    }

    /// Ranged combatants attack through projectiles.
    #[must_use]
    pub fn is_ranged(&self) -> bool {
        self.projectile_speed > Fixed::ZERO
    }
}

/// Secondary health pool that shields the castle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fence {
    /// Remaining and maximum fence health.
    pub health: Health,
}

impl Fence {
    /// New fence at full capacity.
    #[must_use]
    pub const fn new(capacity: u32) -> Self {
        Self {
            health: Health::new(capacity),
        }
    }

    /// A fence absorbs hits while it has health left.
    #[must_use]
    pub const fn is_standing(&self) -> bool {
        !self.health.is_dead()
    }
}

/// Damage mitigation carried only by the castle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CastleDefense {
    /// Armor level (1 = no reduction).
    pub armor_level: u32,
    /// Fence, present from the unlock level while it stands.
    pub fence: Option<Fence>,
}

/// A unit, enemy or the castle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Combatant {
    /// Handle into the entity storage.
    pub id: EntityId,
    /// Variant.
    pub kind: CombatantKind,
    /// World position.
    pub position: Vec2Fixed,
    /// Hit points.
    pub health: Health,
    /// Offensive stats.
    pub attack: AttackStats,
    /// Movement speed in world units per second (0 = stationary).
    #[serde(with = "fixed_serde")]
    pub move_speed: Fixed,
    /// Game time of the last attack.
    pub last_attack_ms: Option<u64>,
    /// Non-owning handle to the current target, revalidated every tick.
    pub target: Option<EntityId>,
    /// Cleared exactly once when health reaches zero.
    pub alive: bool,
    /// Inactive combatants are skipped by every scan.
    pub active: bool,
    /// Collision radius used by projectile hit tests.
    #[serde(with = "fixed_serde")]
    pub hit_radius: Fixed,
    /// Armor and fence, castle only.
    pub defense: Option<CastleDefense>,
}

impl Combatant {
    /// Create a live, active combatant. The id is assigned by [`EntityStorage::insert`].
    #[must_use]
    pub fn new(
        kind: CombatantKind,
        position: Vec2Fixed,
        max_health: u32,
        attack: AttackStats,
        move_speed: Fixed,
        hit_radius: Fixed,
    ) -> Self {
        Self {
            id: 0,
            kind,
            position,
            health: Health::new(max_health),
            attack,
            move_speed,
            last_attack_ms: None,
            target: None,
            alive: true,
            active: true,
            hit_radius,
            defense: None,
        }
    }

    /// Builder method to attach castle defenses.
    #[must_use]
    pub fn with_defense(mut self, defense: CastleDefense) -> Self {
        self.defense = Some(defense);
        self
    }

    /// Which side this combatant is on.
    #[must_use]
    pub const fn faction(&self) -> Faction {
        self.kind.faction()
    }

    /// Alive and active: the only state in which a combatant may be targeted,
    /// collided with or damaged.
    #[must_use]
    pub const fn is_targetable(&self) -> bool {
        self.alive && self.active
    }

    /// Whether this is a boss enemy.
    #[must_use]
    pub const fn is_boss(&self) -> bool {
        matches!(self.kind, CombatantKind::Enemy(kind) if kind.is_boss())
    }

    /// Whether this is the castle.
    #[must_use]
    pub const fn is_castle(&self) -> bool {
        matches!(self.kind, CombatantKind::Castle)
    }

    /// Flip to dead if health is exhausted. Returns `true` only on the
    /// transition, so deaths are reported exactly once.
    pub fn settle_death(&mut self) -> bool {
        if self.alive && self.health.is_dead() {
            self.alive = false;
            self.target = None;
            return true;
        }
        false
    }
}

/// Storage for all combatants in the simulation.
///
/// Ordered by id so iteration is deterministic without a separate sort.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityStorage {
    entities: BTreeMap<EntityId, Combatant>,
    next_id: EntityId,
}

impl EntityStorage {
    /// Create empty entity storage.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entities: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Insert a new combatant and return its id.
    pub fn insert(&mut self, mut combatant: Combatant) -> EntityId {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        combatant.id = id;
        self.entities.insert(id, combatant);
        id
    }

    /// Remove a combatant by id.
    pub fn remove(&mut self, id: EntityId) -> Option<Combatant> {
        self.entities.remove(&id)
    }

    /// Get a combatant by id.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Combatant> {
        self.entities.get(&id)
    }

    /// Get a mutable reference to a combatant by id.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Combatant> {
        self.entities.get_mut(&id)
    }

    /// Resolve a handle only if it still points at a targetable combatant.
    #[must_use]
    pub fn get_targetable(&self, id: EntityId) -> Option<&Combatant> {
        self.get(id).filter(|c| c.is_targetable())
    }

    /// Get the number of combatants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Check if storage is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Ids in ascending order.
    #[must_use]
    pub fn ids(&self) -> Vec<EntityId> {
        self.entities.keys().copied().collect()
    }

    /// Iterate in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Combatant> {
        self.entities.values()
    }

    /// Iterate mutably in ascending id order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Combatant> {
        self.entities.values_mut()
    }

    /// Targetable combatants of one faction, in ascending id order.
    pub fn targetable(&self, faction: Faction) -> impl Iterator<Item = &Combatant> {
        self.entities
            .values()
            .filter(move |c| c.faction() == faction && c.is_targetable())
    }

    /// Mutable view of targetable combatants of one faction.
    pub fn targetable_mut(&mut self, faction: Faction) -> impl Iterator<Item = &mut Combatant> {
        self.entities
            .values_mut()
            .filter(move |c| c.faction() == faction && c.is_targetable())
    }

    /// Drop every dead combatant, returning their ids.
    pub fn remove_dead(&mut self) -> Vec<EntityId> {
        let dead: Vec<EntityId> = self
            .entities
            .values()
            .filter(|c| !c.alive)
            .map(|c| c.id)
            .collect();
        for id in &dead {
            self.entities.remove(id);
        }
        dead
    }
}
