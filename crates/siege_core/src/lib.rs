//! # Siege Core
//!
//! Deterministic combat and wave simulation for Castle Siege.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering, audio or UI (presentation consumes [`events::SimEvent`]s)
//! - No IO
//! - No system randomness (one seeded RNG per run)
//! - No floating-point math (uses fixed-point)
//!
//! ## Crate Structure
//!
//! - [`components`] - Combatant state and entity storage
//! - [`combat`] - Damage resolution, armor, fence and splash
//! - [`targeting`] - Nearest and sticky-threat target selection
//! - [`projectile`] - Homing projectiles and collision
//! - [`wave`] - Wave rosters and the spawn scheduler
//! - [`castle`] - Castle levels, fence and turret
//! - [`upgrades`] - Unit upgrade scaling
//! - [`config`] - Balance tables and meta-progression
//! - [`simulation`] - Core simulation loop
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod castle;
pub mod combat;
pub mod components;
pub mod config;
pub mod error;
pub mod events;
pub mod math;
pub mod projectile;
pub mod simulation;
pub mod targeting;
pub mod upgrades;
pub mod wave;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::castle::CastleState;
    pub use crate::components::*;
    pub use crate::config::{Balance, Progression, Resources};
    pub use crate::error::{GameError, Result};
    pub use crate::events::{NullObserver, SimEvent, SimulationObserver, TickEvents};
    pub use crate::math::{Fixed, Vec2Fixed};
    pub use crate::simulation::{Outcome, RunStats, Simulation};
    pub use crate::wave::{SpawnDirection, WaveEntry, WavePhase};
}
