//! Core simulation loop.
//!
//! One [`Simulation::advance`] call per frame. Everything inside a tick is
//! synchronous and keyed on game time, so pausing simply stops calling into
//! the systems and nothing drifts.
//!
//! # Determinism
//!
//! - No floating-point math (uses fixed-point via [`Fixed`])
//! - All randomness from one seeded `ChaCha8Rng`
//! - Entities processed in ascending id order
//! - Same seed and same calls produce the same [`Simulation::state_hash`]
//!
//! # Example
//!
//! ```
//! use siege_core::config::{Balance, Progression};
//! use siege_core::simulation::Simulation;
//!
//! let mut sim = Simulation::new(Balance::default(), Progression::default(), 42).unwrap();
//! sim.start_next_wave().unwrap();
//! let events = sim.advance(16);
//! assert!(!events.is_empty());
//! ```

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::castle::CastleState;
use crate::combat::deal_damage;
use crate::components::{
    Combatant, CombatantKind, EnemyKind, EntityId, EntityStorage, Faction, UnitKind,
};
use crate::config::{Balance, Progression, Resources};
use crate::error::{GameError, Result};
use crate::events::{dispatch, NullObserver, SimEvent, SimulationObserver, TickEvents};
use crate::math::{millis_to_seconds, Fixed, Vec2Fixed};
use crate::projectile::{LaunchParams, Payload, Projectile, ProjectileSimulator};
use crate::targeting::{cooldown_ready, in_range, TargetingPolicy};
use crate::upgrades::effective_stats;
use crate::wave::{SpawnDirection, WaveEntry, WaveScheduler};

/// Distance in front of the castle where bought units appear.
const UNIT_SPAWN_OFFSET: i32 = 80;

/// Vertical spacing between consecutively bought units.
const UNIT_SPAWN_STAGGER: i32 = 20;

/// How a run stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Still playing.
    InProgress,
    /// The castle fell during `wave`.
    Defeat {
        /// Wave in progress when the castle fell.
        wave: u32,
    },
    /// The final wave was cleared.
    Victory {
        /// Final wave.
        wave: u32,
    },
}

impl Outcome {
    /// Whether the run is over.
    #[must_use]
    pub const fn is_decided(self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

/// Running totals for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RunStats {
    /// Wave enemies killed.
    pub enemies_killed: u32,
    /// Bosses among them.
    pub bosses_killed: u32,
    /// Units bought.
    pub units_spawned: u32,
    /// Units that died.
    pub units_lost: u32,
    /// Castle levels gained.
    pub castle_upgrades: u32,
    /// Damage dealt to the castle (fence included).
    pub castle_damage_taken: u64,
}

/// The deterministic combat and wave simulation.
pub struct Simulation {
    balance: Balance,
    progression: Progression,
    entities: EntityStorage,
    projectiles: ProjectileSimulator,
    waves: WaveScheduler,
    wave_enemies: BTreeSet<EntityId>,
    castle_state: CastleState,
    castle_id: EntityId,
    resources: Resources,
    rng: ChaCha8Rng,
    now_ms: u64,
    paused: bool,
    outcome: Outcome,
    stats: RunStats,
    pending_events: Vec<SimEvent>,
    observer: Box<dyn SimulationObserver + Send>,
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("now_ms", &self.now_ms)
            .field("wave", &self.waves.wave())
            .field("phase", &self.waves.phase())
            .field("entities", &self.entities.len())
            .field("projectiles", &self.projectiles.len())
            .field("outcome", &self.outcome)
            .finish_non_exhaustive()
    }
}

impl Simulation {
    /// Build a run from validated balance tables.
    ///
    /// # Errors
    ///
    /// Whatever [`Balance::validate`] reports; a run never starts with
    /// missing or unusable configuration.
    pub fn new(balance: Balance, progression: Progression, seed: u64) -> Result<Self> {
        balance.validate()?;

        let castle_state = CastleState::new(&balance.castle, &progression);
        let mut entities = EntityStorage::new();
        let castle_id = entities.insert(castle_state.build_combatant(&balance.castle));
        let projectiles = ProjectileSimulator::new(
            balance.projectiles.homing_gain_per_mille,
            balance.playfield,
        );
        let waves = WaveScheduler::new(balance.waves.clone());
        let resources = balance.starting_resources;

        info!(seed, castle = castle_id, "Simulation created");

        Ok(Self {
            balance,
            progression,
            entities,
            projectiles,
            waves,
            wave_enemies: BTreeSet::new(),
            castle_state,
            castle_id,
            resources,
            rng: ChaCha8Rng::seed_from_u64(seed),
            now_ms: 0,
            paused: false,
            outcome: Outcome::InProgress,
            stats: RunStats::default(),
            pending_events: Vec::new(),
            observer: Box::new(NullObserver),
        })
    }

    /// Attach the collaborator that receives every event.
    #[must_use]
    pub fn with_observer(mut self, observer: Box<dyn SimulationObserver + Send>) -> Self {
        self.observer = observer;
        self
    }

    /// Advance game time by `delta_ms`.
    ///
    /// Returns the events of this tick (plus any produced by player actions
    /// since the previous tick). Does nothing while paused or once the run
    /// is decided.
    pub fn advance(&mut self, delta_ms: u64) -> TickEvents {
        if self.paused || self.outcome.is_decided() {
            return TickEvents::default();
        }

        let mut events = std::mem::take(&mut self.pending_events);
        self.now_ms = self.now_ms.saturating_add(delta_ms);
        let dt = millis_to_seconds(delta_ms);

        // 1. Wave start and due spawns
        self.run_waves(&mut events);

        // 2. Targeting, attacks and movement
        self.run_combatants(dt, &mut events);

        // 3. Projectiles
        self.projectiles
            .advance(dt, &mut self.entities, &mut events);

        // 4. Deaths
        self.settle_deaths(&mut events);
        self.entities.remove_dead();

        // 5. Wave completion
        self.check_wave_completion(&mut events);

        for event in &events {
            dispatch(self.observer.as_mut(), event);
        }

        #[cfg(debug_assertions)]
        {
            let hash = self.state_hash();
            debug!(now_ms = self.now_ms, state_hash = hash, "Simulation state hash");
        }

        TickEvents { events }
    }

    /// Freeze all timers.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Continue after [`Simulation::pause`].
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Whether the run is paused.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Start the next wave now, returning its number.
    ///
    /// # Errors
    ///
    /// [`GameError::WaveInProgress`] unless the scheduler is idle,
    /// [`GameError::InvalidState`] once the run is decided.
    pub fn start_next_wave(&mut self) -> Result<u32> {
        self.ensure_in_progress()?;
        let wave = self.waves.start_wave(self.now_ms, &mut self.rng)?;
        self.pending_events.push(SimEvent::WaveStarted {
            wave,
            total_enemies: self.waves.total_enemies(),
        });
        Ok(wave)
    }

    /// Buy a unit and place it in front of the castle.
    ///
    /// # Errors
    ///
    /// [`GameError::InsufficientResources`] (nothing is spent),
    /// [`GameError::MissingConfig`] for a kind without stats,
    /// [`GameError::InvalidState`] once the run is decided.
    pub fn spawn_unit(&mut self, kind: UnitKind) -> Result<EntityId> {
        self.ensure_in_progress()?;
        let base = *self.balance.unit(kind)?;
        if let Err(err) = self.resources.try_spend(base.gold_cost, base.wood_cost) {
            warn!(unit = kind.name(), %err, "Unit purchase rejected");
            return Err(err);
        }

        let stats = effective_stats(&base, self.progression.unit_level(kind));
        let castle = self.balance.castle.position();
        let slot = i32::try_from(self.stats.units_spawned % 5).unwrap_or(0) - 2;
        let position = castle
            + Vec2Fixed::from_ints(UNIT_SPAWN_OFFSET, slot * UNIT_SPAWN_STAGGER);

        let id = self.entities.insert(Combatant::new(
            CombatantKind::Unit(kind),
            position,
            stats.max_health,
            stats.attack,
            stats.move_speed_fixed(),
            Fixed::from_num(self.balance.projectiles.hit_radius),
        ));
        self.stats.units_spawned += 1;
        self.pending_events.push(SimEvent::UnitSpawned { id, kind });
        debug!(id, unit = kind.name(), "Unit spawned");
        Ok(id)
    }

    /// Spend resources to raise the castle one level.
    ///
    /// # Errors
    ///
    /// [`GameError::MaxLevelReached`] or [`GameError::InsufficientResources`]
    /// with nothing changed; [`GameError::InvalidState`] once the run is
    /// decided.
    pub fn upgrade_castle(&mut self) -> Result<u32> {
        self.ensure_in_progress()?;
        if !self.castle_state.can_level_up() {
            let err = GameError::MaxLevelReached(self.castle_state.effective_max_level());
            warn!(%err, "Castle upgrade rejected");
            return Err(err);
        }
        if self.entities.get_targetable(self.castle_id).is_none() {
            return Err(GameError::EntityNotFound(self.castle_id));
        }

        let (gold, wood) = self.castle_state.upgrade_cost(&self.balance.castle);
        if let Err(err) = self.resources.try_spend(gold, wood) {
            warn!(%err, "Castle upgrade rejected");
            return Err(err);
        }

        let castle = self
            .entities
            .get_mut(self.castle_id)
            .ok_or(GameError::EntityNotFound(self.castle_id))?;
        let level = self
            .castle_state
            .level_up(castle, &self.balance.castle, &mut self.pending_events)?;
        self.stats.castle_upgrades += 1;
        Ok(level)
    }

    /// Repair the castle by up to `amount`, returning what was restored.
    ///
    /// # Errors
    ///
    /// [`GameError::EntityNotFound`] when the castle is gone.
    pub fn heal_castle(&mut self, amount: u32) -> Result<u32> {
        let castle = self
            .entities
            .get_mut(self.castle_id)
            .filter(|castle| castle.is_targetable())
            .ok_or(GameError::EntityNotFound(self.castle_id))?;

        let healed = castle.health.heal(amount);
        if healed > 0 {
            self.pending_events.push(SimEvent::Healed {
                target: castle.id,
                position: castle.position,
                amount: healed,
            });
        }
        Ok(healed)
    }

    /// Place an enemy outside the wave roster. It fights normally but does
    /// not count toward wave completion.
    ///
    /// # Errors
    ///
    /// [`GameError::MissingConfig`] for a kind without stats.
    pub fn spawn_enemy(&mut self, kind: EnemyKind, position: Vec2Fixed) -> Result<EntityId> {
        let combatant = self.enemy_combatant(kind, position)?;
        Ok(self.entities.insert(combatant))
    }

    /// Toggle whether a combatant takes part in scans.
    ///
    /// # Errors
    ///
    /// [`GameError::EntityNotFound`] for unknown ids.
    pub fn set_active(&mut self, id: EntityId, active: bool) -> Result<()> {
        let combatant = self
            .entities
            .get_mut(id)
            .ok_or(GameError::EntityNotFound(id))?;
        combatant.active = active;
        Ok(())
    }

    /// Run state.
    #[must_use]
    pub const fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Elapsed game time.
    #[must_use]
    pub const fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// The castle combatant while it stands.
    #[must_use]
    pub fn castle(&self) -> Option<&Combatant> {
        self.entities.get(self.castle_id)
    }

    /// Castle level state.
    #[must_use]
    pub const fn castle_state(&self) -> &CastleState {
        &self.castle_state
    }

    /// Look up any combatant.
    #[must_use]
    pub fn combatant(&self, id: EntityId) -> Option<&Combatant> {
        self.entities.get(id)
    }

    /// Targetable enemies in ascending id order.
    pub fn active_enemies(&self) -> impl Iterator<Item = &Combatant> {
        self.entities.targetable(Faction::Enemy)
    }

    /// Targetable player units in ascending id order (castle excluded).
    pub fn active_units(&self) -> impl Iterator<Item = &Combatant> {
        self.entities
            .targetable(Faction::Player)
            .filter(|c| !c.is_castle())
    }

    /// Projectiles in flight.
    #[must_use]
    pub fn projectiles(&self) -> &[Projectile] {
        self.projectiles.live()
    }

    /// Current gold and wood.
    #[must_use]
    pub const fn resources(&self) -> Resources {
        self.resources
    }

    /// Wave progress.
    #[must_use]
    pub const fn wave_scheduler(&self) -> &WaveScheduler {
        &self.waves
    }

    /// Running totals.
    #[must_use]
    pub const fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Balance tables in use.
    #[must_use]
    pub const fn balance(&self) -> &Balance {
        &self.balance
    }

    /// Calculate a hash of the current simulation state.
    ///
    /// Two runs with the same seed and the same calls hash identically.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.now_ms.hash(&mut hasher);
        self.outcome.hash(&mut hasher);
        self.waves.hash(&mut hasher);
        self.wave_enemies.hash(&mut hasher);
        self.castle_state.hash(&mut hasher);
        self.resources.hash(&mut hasher);
        self.stats.hash(&mut hasher);
        self.entities.hash(&mut hasher);
        self.projectiles.hash(&mut hasher);
        hasher.finish()
    }

    fn ensure_in_progress(&self) -> Result<()> {
        if self.outcome.is_decided() {
            return Err(GameError::InvalidState(format!(
                "run is over: {:?}",
                self.outcome
            )));
        }
        Ok(())
    }

    fn enemy_combatant(&self, kind: EnemyKind, position: Vec2Fixed) -> Result<Combatant> {
        let stats = *self.balance.enemy(kind)?;
        let radius = if kind.is_boss() {
            self.balance.projectiles.boss_hit_radius
        } else {
            self.balance.projectiles.hit_radius
        };
        Ok(Combatant::new(
            CombatantKind::Enemy(kind),
            position,
            self.waves.scaled_health(stats.health),
            stats.attack(),
            Fixed::from_num(stats.speed),
            Fixed::from_num(radius),
        ))
    }

    fn spawn_point(&mut self, direction: SpawnDirection) -> Vec2Fixed {
        let field = self.balance.playfield;
        let castle = &self.balance.castle;
        let spread = field.spawn_spread.max(0);
        let offset = self.rng.gen_range(-spread..=spread);

        match direction {
            SpawnDirection::Right => {
                Vec2Fixed::from_ints(field.width, (castle.y + offset).clamp(0, field.height))
            }
            SpawnDirection::Left => {
                Vec2Fixed::from_ints(0, (castle.y + offset).clamp(0, field.height))
            }
            SpawnDirection::Top => {
                Vec2Fixed::from_ints((castle.x + offset).clamp(0, field.width), 0)
            }
        }
    }

    fn run_waves(&mut self, events: &mut Vec<SimEvent>) {
        if self.waves.auto_start_due(self.now_ms) {
            if let Ok(wave) = self.waves.start_wave(self.now_ms, &mut self.rng) {
                events.push(SimEvent::WaveStarted {
                    wave,
                    total_enemies: self.waves.total_enemies(),
                });
            }
        }

        for WaveEntry { kind, direction } in self.waves.poll_spawns(self.now_ms, &mut self.rng) {
            let position = self.spawn_point(direction);
            match self.enemy_combatant(kind, position) {
                Ok(enemy) => {
                    let id = self.entities.insert(enemy);
                    self.wave_enemies.insert(id);
                    events.push(SimEvent::EnemySpawned {
                        id,
                        kind,
                        direction,
                    });
                    debug!(id, enemy = kind.name(), ?direction, "Enemy spawned");
                }
                Err(err) => {
                    // Counted as spawned by the scheduler; release it so the wave can finish.
                    self.waves.record_kill();
                    warn!(%err, "Skipping roster entry");
                }
            }
        }
    }

    fn run_combatants(&mut self, dt: Fixed, events: &mut Vec<SimEvent>) {
        let castle_position = self.balance.castle.position();
        let turret_active = self.castle_state.turret_active(&self.balance.castle);

        for id in self.entities.ids() {
            let Some(actor) = self.entities.get_targetable(id).cloned() else {
                continue;
            };
            if actor.is_castle() && !turret_active {
                continue;
            }

            let policy = if actor.is_castle() {
                TargetingPolicy::StickyHighestThreat
            } else {
                TargetingPolicy::Nearest
            };
            let target = policy.select(&actor, self.entities.targetable(actor.faction().opposing()));
            let target_position = target
                .and_then(|target| self.entities.get(target))
                .map(|target| target.position);

            let mut position = actor.position;
            let mut last_attack_ms = actor.last_attack_ms;

            match (target, target_position) {
                (Some(target), Some(at)) if in_range(actor.position, at, actor.attack.range) => {
                    if cooldown_ready(self.now_ms, actor.last_attack_ms, actor.attack.cooldown_ms) {
                        self.attack(&actor, target, at, events);
                        last_attack_ms = Some(self.now_ms);
                    }
                }
                (Some(_), Some(at)) => {
                    position = approach(&actor, at, dt);
                }
                _ if actor.faction() == Faction::Enemy => {
                    position = approach(&actor, castle_position, dt);
                }
                _ => {}
            }

            if let Some(actor) = self.entities.get_mut(id) {
                if actor.alive {
                    actor.target = target;
                    actor.position = position;
                    actor.last_attack_ms = last_attack_ms;
                }
            }
        }
    }

    fn attack(&mut self, actor: &Combatant, target: EntityId, at: Vec2Fixed, events: &mut Vec<SimEvent>) {
        if actor.attack.is_ranged() {
            let payload = match actor.attack.splash {
                Some(splash) => Payload::Splash(splash),
                None => Payload::Single {
                    damage: actor.attack.damage,
                },
            };
            self.projectiles.launch(LaunchParams {
                source: actor.id,
                source_kind: actor.kind,
                faction: actor.faction(),
                from: actor.position,
                target: Some((target, at)),
                speed: actor.attack.projectile_speed,
                payload,
                max_distance: Fixed::from_num(self.balance.projectiles.max_distance),
            });
            events.push(SimEvent::ProjectileLaunched {
                source: actor.id,
                faction: actor.faction(),
                position: actor.position,
            });
        } else if deal_damage(self.entities.get_mut(target), actor.attack.damage, events) {
            events.push(SimEvent::Hit {
                attacker: actor.kind,
            });
        }
    }

    fn settle_deaths(&mut self, events: &mut Vec<SimEvent>) {
        let castle_id = self.castle_id;
        let mut damage_to_castle = 0u64;
        let mut deaths = Vec::new();

        for event in events.iter() {
            match *event {
                SimEvent::DamageDealt { target, amount, .. } if target == castle_id => {
                    damage_to_castle += u64::from(amount);
                }
                SimEvent::EntityDied { id, kind, .. } => deaths.push((id, kind)),
                _ => {}
            }
        }
        self.stats.castle_damage_taken += damage_to_castle;

        for (id, kind) in deaths {
            match kind {
                CombatantKind::Enemy(enemy) => {
                    if self.wave_enemies.remove(&id) {
                        self.waves.record_kill();
                    }
                    self.stats.enemies_killed += 1;
                    if enemy.is_boss() {
                        self.stats.bosses_killed += 1;
                    }
                    events.push(SimEvent::EnemyKilled { id });
                }
                CombatantKind::Unit(_) => self.stats.units_lost += 1,
                CombatantKind::Castle => {
                    let wave = self.waves.wave();
                    self.outcome = Outcome::Defeat { wave };
                    events.push(SimEvent::CastleDestroyed);
                    info!(wave, now_ms = self.now_ms, "Castle destroyed");
                }
            }
        }
    }

    fn check_wave_completion(&mut self, events: &mut Vec<SimEvent>) {
        if self.outcome.is_decided() {
            return;
        }
        let Some(reward) = self.waves.check_completion(self.now_ms) else {
            return;
        };

        let wave = self.waves.wave();
        self.resources.credit(reward);
        events.push(SimEvent::WaveCompleted {
            wave,
            gold: reward.gold,
            wood: reward.wood,
        });

        if self.waves.final_wave_cleared() {
            self.outcome = Outcome::Victory { wave };
            info!(wave, "Final wave cleared");
        }
    }
}

/// Step toward `at`, stopping once inside attack range.
fn approach(actor: &Combatant, at: Vec2Fixed, dt: Fixed) -> Vec2Fixed {
    if actor.move_speed <= Fixed::ZERO {
        return actor.position;
    }
    let gap = actor.position.distance(at) - actor.attack.range;
    if gap <= Fixed::ZERO {
        return actor.position;
    }
    let step = (actor.move_speed * dt).min(gap);
    actor.position.step_toward(at, step)
}
