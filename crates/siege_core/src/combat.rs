//! Damage resolution shared by every attacker.
//!
//! This module implements:
//! - Single-target damage with silent no-op on invalid targets
//! - Castle-only armor reduction, capped at 75% with a 1-damage floor
//! - Fence-first absorption (overflow beyond the fence is discarded)
//! - Splash damage with linear falloff from 100% at the centre to 50% at the edge
//!
//! All functions push their feedback into an event buffer instead of calling
//! presentation code directly.

use tracing::debug;

use crate::components::Combatant;
use crate::events::SimEvent;
use crate::math::{Fixed, Vec2Fixed};

/// Armor reduction gained per armor level above 1, in percent.
pub const ARMOR_PERCENT_PER_LEVEL: u32 = 5;

/// Maximum armor reduction (75% damage reduction).
pub const MAX_ARMOR_PERCENT: u32 = 75;

/// Minimum damage floor - castle hits always deal at least 1 damage.
pub const MIN_DAMAGE: u32 = 1;

/// Damage reduction for an armor level, in percent.
///
/// `min((level - 1) * 5, 75)`; level 0 is treated as level 1.
#[must_use]
pub fn armor_reduction_percent(armor_level: u32) -> u32 {
    armor_level
        .saturating_sub(1)
        .saturating_mul(ARMOR_PERCENT_PER_LEVEL)
        .min(MAX_ARMOR_PERCENT)
}

/// Damage that gets through castle armor.
///
/// Formula:
/// ```text
/// applied = max(1, floor(incoming * (100 - reduction%) / 100))
/// ```
#[must_use]
pub fn armored_damage(incoming: u32, armor_level: u32) -> u32 {
    let keep = u64::from(100 - armor_reduction_percent(armor_level));
    let reduced = u64::from(incoming) * keep / 100;
    u32::try_from(reduced).unwrap_or(u32::MAX).max(MIN_DAMAGE)
}

/// Splash damage received at `distance` from the impact point.
///
/// `floor(base * (1 - 0.5 * distance / radius))` inside the radius, 0 outside.
/// A zero radius only hits the exact centre.
#[must_use]
pub fn splash_damage_at(base_damage: u32, distance: Fixed, radius: Fixed) -> u32 {
    if distance > radius || distance < Fixed::ZERO {
        return 0;
    }
    if radius == Fixed::ZERO {
        return base_damage;
    }

    // base * (2r - d) / 2r on the raw bits, widened so large bases cannot overflow.
    let two_r = i128::from(radius.to_bits()) * 2;
    let remaining = two_r - i128::from(distance.to_bits());
    let scaled = i128::from(base_damage) * remaining / two_r;
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

/// Apply `amount` to `target`.
///
/// Returns `false` without mutating anything when the target is absent,
/// dead or inactive. Otherwise applies castle armor and fence absorption
/// where the target has them, records a [`SimEvent::DamageDealt`], settles
/// death (emitting [`SimEvent::EntityDied`] once) and returns `true`.
pub fn deal_damage(target: Option<&mut Combatant>, amount: u32, events: &mut Vec<SimEvent>) -> bool {
    let Some(target) = target else {
        return false;
    };
    if !target.is_targetable() {
        return false;
    }

    let position = target.position;
    let applied = match target.defense.as_mut() {
        Some(defense) => {
            let reduced = armored_damage(amount, defense.armor_level);
            match defense.fence.as_mut() {
                Some(fence) if fence.is_standing() => {
                    // The fence takes the whole hit; anything beyond its pool is lost.
                    let absorbed = fence.health.apply_damage(reduced);
                    if !fence.is_standing() {
                        defense.fence = None;
                        events.push(SimEvent::FenceBroken);
                        debug!(target = target.id, "Fence broken");
                    }
                    absorbed
                }
                _ => target.health.apply_damage(reduced),
            }
        }
        None => target.health.apply_damage(amount),
    };

    events.push(SimEvent::DamageDealt {
        target: target.id,
        position,
        amount: applied,
    });

    if target.settle_death() {
        events.push(SimEvent::EntityDied {
            id: target.id,
            kind: target.kind,
            position,
        });
    }

    true
}

/// Apply falloff damage to every targetable combatant within `radius` of
/// `center`.
///
/// Each target is damaged and its death settled before the next one is
/// considered. Returns the number of combatants hit.
pub fn deal_splash_damage<'a, I>(
    center: Vec2Fixed,
    base_damage: u32,
    radius: Fixed,
    targets: I,
    events: &mut Vec<SimEvent>,
) -> usize
where
    I: IntoIterator<Item = &'a mut Combatant>,
{
    let radius_sq = radius * radius;
    let mut hits = 0;

    for target in targets {
        if !target.is_targetable() {
            continue;
        }
        if target.position.distance_squared(center) > radius_sq {
            continue;
        }

        let distance = target.position.distance(center);
        let damage = splash_damage_at(base_damage, distance, radius);
        // Only the castle's armor floor turns a zero into a hit.
        if damage == 0 && target.defense.is_none() {
            continue;
        }
        if deal_damage(Some(target), damage, events) {
            hits += 1;
        }
    }

    hits
}
