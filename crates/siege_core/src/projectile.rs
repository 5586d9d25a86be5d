//! Projectile ballistics: launch, homing flight, collision and expiry.
//!
//! Each projectile moves through a tiny state machine:
//!
//! ```text
//! Flying -> Hit -> (removed)
//! Flying -> Expired(MaxRange | OutOfBounds) -> (removed)
//! ```
//!
//! Targets are held as entity handles and looked up every tick; a target
//! that died or despawned simply stops steering the projectile.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::combat::{deal_damage, deal_splash_damage};
use crate::components::{CombatantKind, EntityId, EntityStorage, Faction, Splash};
use crate::config::PlayfieldConfig;
use crate::events::SimEvent;
use crate::math::{fixed_serde, ratio, Fixed, Vec2Fixed};
use crate::targeting::in_range;

/// Default homing gain in per-mille of projectile speed (0.015).
pub const DEFAULT_HOMING_GAIN_PER_MILLE: u32 = 15;

/// Identifier for live projectiles.
pub type ProjectileId = u64;

/// Why a projectile was retired without hitting anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpiryReason {
    /// Travelled further than its maximum distance.
    MaxRange,
    /// Left the playfield plus margin.
    OutOfBounds,
}

/// Lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileState {
    /// Still moving.
    Flying,
    /// Damage resolved; removed at the end of the tick.
    Hit,
    /// Retired without a hit.
    Expired(ExpiryReason),
}

/// What a projectile does on impact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Payload {
    /// Flat damage to the collided combatant.
    Single {
        /// Damage dealt.
        damage: u32,
    },
    /// Falloff damage around the impact point.
    Splash(Splash),
}

/// A projectile in flight.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Projectile {
    /// Live-set identifier.
    pub id: ProjectileId,
    /// Shooter.
    pub source: EntityId,
    /// Shooter's kind, reported with the hit.
    pub source_kind: CombatantKind,
    /// Side of the shooter; collisions scan the opposing side.
    pub faction: Faction,
    /// Homing target handle.
    pub target: Option<EntityId>,
    /// Launch point.
    pub origin: Vec2Fixed,
    /// Current position.
    pub position: Vec2Fixed,
    /// World units per second.
    pub velocity: Vec2Fixed,
    /// Speed the velocity is renormalized to.
    #[serde(with = "fixed_serde")]
    pub speed: Fixed,
    /// Damage on impact.
    pub payload: Payload,
    /// Straight-line travel limit from `origin`.
    #[serde(with = "fixed_serde")]
    pub max_distance: Fixed,
    /// Set when damage has been resolved; guards against double hits.
    pub has_hit: bool,
    /// Lifecycle state.
    pub state: ProjectileState,
}

/// Everything needed to fire a projectile.
#[derive(Debug, Clone, Copy)]
pub struct LaunchParams {
    /// Shooter.
    pub source: EntityId,
    /// Shooter's kind.
    pub source_kind: CombatantKind,
    /// Shooter's side.
    pub faction: Faction,
    /// Launch point.
    pub from: Vec2Fixed,
    /// Target handle and its position at launch time.
    pub target: Option<(EntityId, Vec2Fixed)>,
    /// Flight speed.
    pub speed: Fixed,
    /// Damage on impact.
    pub payload: Payload,
    /// Travel limit.
    pub max_distance: Fixed,
}

/// Owns every live projectile and advances them each tick.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectileSimulator {
    live: Vec<Projectile>,
    next_id: ProjectileId,
    #[serde(with = "fixed_serde")]
    homing_gain: Fixed,
    bounds: PlayfieldConfig,
}

impl ProjectileSimulator {
    /// Create an empty simulator.
    #[must_use]
    pub fn new(homing_gain_per_mille: u32, bounds: PlayfieldConfig) -> Self {
        Self {
            live: Vec::new(),
            next_id: 1,
            homing_gain: ratio(homing_gain_per_mille, 1000),
            bounds,
        }
    }

    /// Live projectiles in launch order.
    #[must_use]
    pub fn live(&self) -> &[Projectile] {
        &self.live
    }

    /// Number of live projectiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Whether nothing is in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Fire a projectile.
    ///
    /// The initial velocity points at the target's launch-time position,
    /// or straight toward the opposing side when there is no target.
    pub fn launch(&mut self, params: LaunchParams) -> ProjectileId {
        let forward = match params.faction {
            Faction::Player => Vec2Fixed::new(Fixed::ONE, Fixed::ZERO),
            Faction::Enemy => Vec2Fixed::new(-Fixed::ONE, Fixed::ZERO),
        };
        let direction = params
            .target
            .map(|(_, at)| (at - params.from).normalize())
            .filter(|dir| *dir != Vec2Fixed::ZERO)
            .unwrap_or(forward);

        let id = self.next_id;
        self.next_id += 1;
        self.live.push(Projectile {
            id,
            source: params.source,
            source_kind: params.source_kind,
            faction: params.faction,
            target: params.target.map(|(target, _)| target),
            origin: params.from,
            position: params.from,
            velocity: direction.scale(params.speed),
            speed: params.speed,
            payload: params.payload,
            max_distance: params.max_distance,
            has_hit: false,
            state: ProjectileState::Flying,
        });
        id
    }

    /// Advance every projectile by `dt` seconds, resolving hits against
    /// `entities` and dropping everything that hit or expired.
    pub fn advance(&mut self, dt: Fixed, entities: &mut EntityStorage, events: &mut Vec<SimEvent>) {
        for projectile in &mut self.live {
            step(projectile, dt, self.homing_gain, &self.bounds, entities, events);
        }
        self.live
            .retain(|projectile| projectile.state == ProjectileState::Flying);
    }

    /// Drop every projectile in flight.
    pub fn clear(&mut self) {
        self.live.clear();
    }

    /// Resolve a projectile's impact on `hit`.
    ///
    /// Applies the payload at most once per projectile: the `has_hit` flag is
    /// set on the first call and every later call returns `false` without
    /// touching any combatant.
    pub fn resolve_hit(
        projectile: &mut Projectile,
        hit: EntityId,
        entities: &mut EntityStorage,
        events: &mut Vec<SimEvent>,
    ) -> bool {
        if projectile.has_hit {
            return false;
        }
        projectile.has_hit = true;
        projectile.state = ProjectileState::Hit;

        match projectile.payload {
            Payload::Single { damage } => {
                deal_damage(entities.get_mut(hit), damage, events);
            }
            Payload::Splash(splash) => {
                let opposing = projectile.faction.opposing();
                deal_splash_damage(
                    projectile.position,
                    splash.damage,
                    splash.radius,
                    entities.targetable_mut(opposing),
                    events,
                );
            }
        }

        events.push(SimEvent::Hit {
            attacker: projectile.source_kind,
        });
        debug!(projectile = projectile.id, target = hit, "Projectile hit");
        true
    }
}

fn step(
    projectile: &mut Projectile,
    dt: Fixed,
    homing_gain: Fixed,
    bounds: &PlayfieldConfig,
    entities: &mut EntityStorage,
    events: &mut Vec<SimEvent>,
) {
    if projectile.state != ProjectileState::Flying {
        return;
    }

    projectile.position = projectile.position + projectile.velocity.scale(dt);

    if let Some(target) = projectile.target.and_then(|id| entities.get_targetable(id)) {
        let toward = (target.position - projectile.position).normalize();
        if toward != Vec2Fixed::ZERO {
            let corrected = projectile.velocity + toward.scale(projectile.speed * homing_gain);
            projectile.velocity = corrected.with_length(projectile.speed);
        }
    }

    let hit = entities
        .targetable(projectile.faction.opposing())
        .find(|candidate| in_range(projectile.position, candidate.position, candidate.hit_radius))
        .map(|candidate| candidate.id);

    if let Some(hit) = hit {
        ProjectileSimulator::resolve_hit(projectile, hit, entities, events);
        return;
    }

    let max_sq = projectile.max_distance * projectile.max_distance;
    if projectile.origin.distance_squared(projectile.position) > max_sq {
        projectile.state = ProjectileState::Expired(ExpiryReason::MaxRange);
    } else if !bounds.contains_with_margin(projectile.position) {
        projectile.state = ProjectileState::Expired(ExpiryReason::OutOfBounds);
    }
}
