//! Target selection policies.
//!
//! Policies are pure functions over a candidate iterator. Candidates are
//! expected in ascending entity id order (spawn order), which is the
//! documented tie-break: on equal distance or equal threat the first
//! candidate encountered wins.

use serde::{Deserialize, Serialize};

use crate::components::{Combatant, EntityId};
use crate::math::{Fixed, Vec2Fixed};

/// How a combatant picks what to attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetingPolicy {
    /// Closest targetable candidate, any range.
    Nearest,
    /// Keep the locked target while valid, else the highest-threat
    /// candidate inside attack range.
    StickyHighestThreat,
}

impl TargetingPolicy {
    /// Pick a target for `attacker` among `candidates`.
    ///
    /// The attacker's current `target` is the lock consulted by the sticky
    /// policy.
    pub fn select<'a, I>(self, attacker: &Combatant, candidates: I) -> Option<EntityId>
    where
        I: IntoIterator<Item = &'a Combatant>,
    {
        match self {
            Self::Nearest => select_nearest(attacker.position, candidates),
            Self::StickyHighestThreat => select_sticky_threat(
                attacker.position,
                attacker.attack.range,
                attacker.target,
                candidates,
            ),
        }
    }
}

/// Euclidean distance between two combatants.
#[must_use]
pub fn distance(a: &Combatant, b: &Combatant) -> Fixed {
    a.position.distance(b.position)
}

/// `distance(from, to) <= range`, compared squared to stay exact.
#[must_use]
pub fn in_range(from: Vec2Fixed, to: Vec2Fixed, range: Fixed) -> bool {
    from.distance_squared(to) <= range * range
}

/// Whether enough game time has passed since the last attack.
#[must_use]
pub fn cooldown_ready(now_ms: u64, last_attack_ms: Option<u64>, cooldown_ms: u32) -> bool {
    match last_attack_ms {
        None => true,
        Some(last) => now_ms.saturating_sub(last) >= u64::from(cooldown_ms),
    }
}

/// Threat score used by the castle turret: `damage * 10 + current_health`.
#[must_use]
pub fn threat(candidate: &Combatant) -> u64 {
    u64::from(candidate.attack.damage) * 10 + u64::from(candidate.health.current)
}

/// Closest targetable candidate. Ties keep the first encountered.
pub fn select_nearest<'a, I>(from: Vec2Fixed, candidates: I) -> Option<EntityId>
where
    I: IntoIterator<Item = &'a Combatant>,
{
    let mut best: Option<(EntityId, Fixed)> = None;

    for candidate in candidates {
        if !candidate.is_targetable() {
            continue;
        }
        let dist_sq = from.distance_squared(candidate.position);
        match best {
            Some((_, best_sq)) if dist_sq >= best_sq => {}
            _ => best = Some((candidate.id, dist_sq)),
        }
    }

    best.map(|(id, _)| id)
}

/// Focus-fire selection.
///
/// If `locked` is still among the candidates, targetable and within
/// `range`, it is returned without looking at anything else. Otherwise the
/// in-range candidate with the highest [`threat`] is chosen (first found on
/// ties), or `None` when nothing is in range.
pub fn select_sticky_threat<'a, I>(
    from: Vec2Fixed,
    range: Fixed,
    locked: Option<EntityId>,
    candidates: I,
) -> Option<EntityId>
where
    I: IntoIterator<Item = &'a Combatant>,
{
    let mut best: Option<(EntityId, u64)> = None;

    for candidate in candidates {
        if !candidate.is_targetable() || !in_range(from, candidate.position, range) {
            continue;
        }
        if Some(candidate.id) == locked {
            return locked;
        }
        let score = threat(candidate);
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((candidate.id, score)),
        }
    }

    best.map(|(id, _)| id)
}
