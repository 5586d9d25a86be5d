//! Wave roster previews for balance tuning.
//!
//! Generates rosters with the same generator and seeded RNG the simulation
//! uses, without running any combat.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use siege_core::wave::{
    boss_count, generate_wave, wave_multiplier_percent, wave_reward, SpawnDirection, WaveConfig,
};

/// Summary of one generated wave.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WavePreview {
    /// Wave number.
    pub wave: u32,
    /// Roster size.
    pub total: u32,
    /// Bosses in the roster.
    pub bosses: u32,
    /// Count multiplier in percent.
    pub multiplier_percent: u32,
    /// Count per enemy type name.
    pub counts: BTreeMap<String, u32>,
    /// Count per spawn edge.
    pub directions: BTreeMap<String, u32>,
    /// Gold paid on completion.
    pub reward_gold: u32,
    /// Wood paid on completion.
    pub reward_wood: u32,
}

/// Preview waves `from..=to` with one RNG seeded from `seed`.
///
/// Rosters for later waves depend on the draws of earlier ones, just as
/// they do in a run.
#[must_use]
pub fn preview_waves(config: &WaveConfig, from: u32, to: u32, seed: u64) -> Vec<WavePreview> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (from.max(1)..=to)
        .map(|wave| {
            let roster = generate_wave(wave, config, &mut rng);
            let mut counts = BTreeMap::new();
            let mut directions = BTreeMap::new();
            for entry in &roster {
                *counts.entry(entry.kind.name().to_string()).or_insert(0) += 1;
                *directions
                    .entry(direction_name(entry.direction).to_string())
                    .or_insert(0) += 1;
            }
            let reward = wave_reward(wave, &config.reward);

            WavePreview {
                wave,
                total: u32::try_from(roster.len()).unwrap_or(u32::MAX),
                bosses: boss_count(wave, config.boss.every_waves),
                multiplier_percent: wave_multiplier_percent(wave, config.multiplier_step_percent),
                counts,
                directions,
                reward_gold: reward.gold,
                reward_wood: reward.wood,
            }
        })
        .collect()
}

const fn direction_name(direction: SpawnDirection) -> &'static str {
    match direction {
        SpawnDirection::Right => "right",
        SpawnDirection::Left => "left",
        SpawnDirection::Top => "top",
    }
}

/// Plain-text table of previews.
#[must_use]
pub fn render_table(previews: &[WavePreview]) -> String {
    let mut out = String::from("wave  total  boss  mult  gold  wood  roster\n");
    for p in previews {
        let roster: Vec<String> = p
            .counts
            .iter()
            .map(|(kind, count)| format!("{kind}x{count}"))
            .collect();
        out.push_str(&format!(
            "{:>4}  {:>5}  {:>4}  {:>3}%  {:>4}  {:>4}  {}\n",
            p.wave,
            p.total,
            p.bosses,
            p.multiplier_percent,
            p.reward_gold,
            p.reward_wood,
            roster.join(" ")
        ));
    }
    out
}
