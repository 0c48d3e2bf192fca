//! Simulation state and world transitions
//!
//! [`SimulationState`] owns everything the tick mutates. There is no global
//! state: callers create one value and pass it to `tick` every frame.

use std::time::Duration;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::body::{Package, Player};
use super::butterfly::{self, ButterflyLedger};
use super::clones::CloneEngine;
use super::geometry::Rect;
use super::history::{HistoryRingBuffer, Snapshot, rewind_target};
use super::level::{EraId, Level, LevelRegistry};
use super::powers::{PowerController, PowerKind};
use crate::error::{ConfigError, PowerError};
use crate::tuning::Tuning;

/// Something notable that happened during a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    PowerActivated { power: PowerKind },
    PowerIgnored { power: PowerKind, reason: String },
    SlowTimeReverted,
    CloneSpawned { id: u32 },
    CloneExpired { id: u32 },
    PackagePickedUp,
    PackageDropped,
    Respawned { dropped_package: bool },
    LevelCompleted { from: EraId, to: EraId },
    ButterflyPlatformAdded { era: EraId, platform: Rect },
}

/// Complete simulation state (deterministic for a given seed, input stream and clock)
#[derive(Debug, Clone)]
pub struct SimulationState {
    /// Run seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    pub tuning: Tuning,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub levels: LevelRegistry,
    current: usize,
    pub player: Player,
    pub package: Package,
    pub history: HistoryRingBuffer,
    pub powers: PowerController,
    pub clones: CloneEngine,
    pub ledger: ButterflyLedger,
    /// Events produced by the most recent tick
    pub events: Vec<GameEvent>,
}

impl SimulationState {
    /// Start a run with tuning that has not been checked yet
    pub fn try_new(seed: u64, tuning: Tuning, levels: LevelRegistry) -> Result<Self, ConfigError> {
        tuning.validate()?;
        Ok(Self::new(seed, tuning, levels))
    }

    /// Start a run in the first level of `levels`.
    ///
    /// `tuning` must already pass [`Tuning::validate`]; out-of-range values
    /// such as a butterfly probability above 1 panic mid-tick. Use
    /// [`SimulationState::try_new`] for tuning built by hand.
    pub fn new(seed: u64, tuning: Tuning, levels: LevelRegistry) -> Self {
        let spawn = levels.get(0).map(Level::spawn).unwrap_or_default();
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            time_ticks: 0,
            current: 0,
            player: Player::new(spawn.player),
            package: Package::new(spawn.package),
            history: HistoryRingBuffer::new(tuning.powers.history_horizon),
            powers: PowerController::new(&tuning.powers),
            clones: CloneEngine::new(),
            ledger: ButterflyLedger::new(),
            events: Vec::new(),
            levels,
            tuning,
        }
    }

    /// Default tuning and the built-in eras
    pub fn with_defaults(seed: u64) -> Self {
        Self::new(seed, Tuning::default(), LevelRegistry::builtin())
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_level(&self) -> &Level {
        // `current` only ever holds an index produced by the registry
        match self.levels.get(self.current) {
            Some(level) => level,
            None => unreachable!("current level index out of range"),
        }
    }

    pub fn current_level_mut(&mut self) -> &mut Level {
        match self.levels.get_mut(self.current) {
            Some(level) => level,
            None => unreachable!("current level index out of range"),
        }
    }

    pub fn current_era(&self) -> EraId {
        self.current_level().era()
    }

    /// Capture the world positions for this tick
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            player: self.player.body.pos,
            package: self.package.body.pos,
        }
    }

    /// Try to fire a power. Rejections leave cooldowns untouched.
    pub fn activate_power(&mut self, kind: PowerKind, now: Duration) -> Result<(), PowerError> {
        self.powers.check_ready(kind)?;
        match kind {
            PowerKind::SlowTime => {
                let revert = self.powers.begin_slow_time(now);
                log::debug!(
                    "Slow-time until {:?} (revert #{})",
                    revert.deadline,
                    revert.token
                );
            }
            PowerKind::Rewind => {
                self.require_history(kind, self.tuning.powers.rewind_min_history)?;
                self.rewind();
            }
            PowerKind::Clone => {
                self.require_history(kind, self.tuning.powers.clone_min_history)?;
                let id = self.clones.spawn(&self.history, self.player.body.pos);
                self.powers.set_clone_active(true);
                log::debug!("Clone #{} spawned with {} snapshots", id, self.history.len());
                self.events.push(GameEvent::CloneSpawned { id });
            }
        }
        self.powers.commit(kind);
        self.events.push(GameEvent::PowerActivated { power: kind });
        Ok(())
    }

    fn require_history(&self, power: PowerKind, required: usize) -> Result<(), PowerError> {
        let available = self.history.len();
        if available > required {
            Ok(())
        } else {
            Err(PowerError::InsufficientHistory {
                power,
                available,
                required,
            })
        }
    }

    /// Jump the player (and a loose package) back `rewind_window` snapshots
    fn rewind(&mut self) {
        let target = rewind_target(self.history.len(), self.tuning.powers.rewind_window);
        let Some(snapshot) = self.history.get(target).copied() else {
            return;
        };
        log::debug!("Rewinding to history index {} of {}", target, self.history.len());
        self.player.body.teleport(snapshot.player);
        if !self.player.carrying {
            self.package.body.teleport(snapshot.package);
        }
    }

    /// Pick up or drop the package if it is within reach
    pub fn interact(&mut self) {
        let distance = self.player.body.pos.distance(self.package.body.pos);
        if distance >= self.tuning.physics.pickup_radius {
            return;
        }
        if self.player.carrying {
            let physics = &self.tuning.physics;
            self.player.carrying = false;
            self.package.carried = false;
            self.package.body.pos = self.player.body.pos + physics.carry_offset;
            self.package.body.vel = Vec2::new(
                self.player.body.vel.x * physics.drop_velocity_factor,
                physics.drop_lift,
            );
            log::debug!("Package dropped at {:?}", self.package.body.pos);
            self.events.push(GameEvent::PackageDropped);
        } else {
            self.player.carrying = true;
            self.package.carried = true;
            log::debug!("Package picked up");
            self.events.push(GameEvent::PackagePickedUp);
        }
    }

    /// Send the player back to spawn; a carried package goes back too
    pub fn respawn(&mut self) {
        let spawn = self.current_level().spawn();
        self.player.body.teleport(spawn.player);
        let dropped_package = self.player.carrying;
        if dropped_package {
            self.package.body.teleport(spawn.package);
            self.player.carrying = false;
            self.package.carried = false;
        }
        log::debug!("Respawned (package returned: {})", dropped_package);
        self.events.push(GameEvent::Respawned { dropped_package });
    }

    /// Record the delivery and move on to the next era
    pub fn complete_level(&mut self, now: Duration) {
        let from = self.current_era();
        self.ledger.record_success(from, self.time_ticks, now);

        self.current = self.levels.next_index(self.current);
        let to = self.current_era();
        let spawn = self.current_level().spawn();

        self.player.body.teleport(spawn.player);
        self.package.body.teleport(spawn.package);
        self.player.carrying = false;
        self.package.carried = false;

        self.clones.clear();
        self.powers.set_clone_active(false);
        self.history.clear();

        log::info!(
            "Delivered in {} ({} total), entering {}",
            from,
            self.ledger.success_count(from),
            to
        );
        self.events.push(GameEvent::LevelCompleted { from, to });
    }

    /// Roll for a butterfly helper platform in the current level
    pub fn apply_butterfly_effects(&mut self) {
        let Some(level) = self.levels.get_mut(self.current) else {
            return;
        };
        let tuning = &self.tuning.butterfly;
        if let Some(platform) = butterfly::apply_to_level(&self.ledger, level, tuning, &mut self.rng)
        {
            let era = level.era();
            log::info!("Butterfly effect: helper platform in {} at {:?}", era, platform);
            self.events.push(GameEvent::ButterflyPlatformAdded { era, platform });
        }
    }

    /// Cancel timers and return to normal speed
    pub fn shutdown(&mut self) {
        self.powers.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_history(state: &mut SimulationState, n: usize) {
        for i in 0..n {
            state.history.record(Snapshot {
                player: Vec2::new(i as f32, 400.0),
                package: Vec2::new(i as f32 + 50.0, 400.0),
            });
        }
    }

    #[test]
    fn test_new_state_at_spawn() {
        let state = SimulationState::with_defaults(1);
        assert_eq!(state.player.body.pos, Vec2::new(100.0, 400.0));
        assert_eq!(state.package.body.pos, Vec2::new(150.0, 400.0));
        assert_eq!(state.current_era(), EraId::Medieval);
        assert!(!state.player.carrying);
        assert!(state.package.fragile);
    }

    #[test]
    fn test_try_new_rejects_bad_tuning() {
        let mut tuning = Tuning::default();
        tuning.butterfly.probability = 1.5;
        let err = SimulationState::try_new(1, tuning, LevelRegistry::builtin()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let state = SimulationState::try_new(1, Tuning::default(), LevelRegistry::builtin()).unwrap();
        assert_eq!(state.current_era(), EraId::Medieval);
    }

    #[test]
    fn test_pickup_does_not_move_anything() {
        let mut state = SimulationState::with_defaults(1);
        // Out of reach at the default spawn
        state.interact();
        assert!(!state.player.carrying);

        state.player.body.pos = Vec2::new(130.0, 400.0);
        state.interact();
        assert!(state.player.carrying);
        assert!(state.package.carried);
        assert_eq!(state.player.body.pos, Vec2::new(130.0, 400.0));
        assert_eq!(state.package.body.pos, Vec2::new(150.0, 400.0));
        assert_eq!(state.events, vec![GameEvent::PackagePickedUp]);
    }

    #[test]
    fn test_drop_imparts_impulse() {
        let mut state = SimulationState::with_defaults(1);
        state.player.body.pos = Vec2::new(140.0, 400.0);
        state.interact();
        state.package.body.pos = Vec2::new(140.0, 380.0);
        state.player.body.vel.x = 4.0;
        state.interact();
        assert!(!state.player.carrying);
        assert!(!state.package.carried);
        assert_eq!(state.package.body.pos, Vec2::new(140.0, 380.0));
        assert_eq!(state.package.body.vel, Vec2::new(2.0, -2.0));
    }

    #[test]
    fn test_cooldown_rejection_is_distinct_from_history_rejection() {
        let mut state = SimulationState::with_defaults(1);

        let err = state.activate_power(PowerKind::Rewind, Duration::ZERO).unwrap_err();
        assert!(matches!(err, PowerError::InsufficientHistory { available: 0, required: 60, .. }));
        assert!(state.powers.rewind.is_ready());

        fill_history(&mut state, 61);
        state.activate_power(PowerKind::Rewind, Duration::ZERO).unwrap();
        assert_eq!(state.powers.rewind.cooldown_remaining, 480);

        let err = state.activate_power(PowerKind::Rewind, Duration::ZERO).unwrap_err();
        assert!(matches!(err, PowerError::OnCooldown { remaining: 480, .. }));
    }

    #[test]
    fn test_rewind_clamps_to_oldest() {
        let mut state = SimulationState::with_defaults(1);
        fill_history(&mut state, 61);
        state.player.body.vel = Vec2::new(5.0, -3.0);
        state.activate_power(PowerKind::Rewind, Duration::ZERO).unwrap();
        assert_eq!(state.player.body.pos, Vec2::new(0.0, 400.0));
        assert_eq!(state.player.body.vel, Vec2::ZERO);
        assert_eq!(state.package.body.pos, Vec2::new(50.0, 400.0));
    }

    #[test]
    fn test_rewind_leaves_carried_package() {
        let mut state = SimulationState::with_defaults(1);
        fill_history(&mut state, 180);
        state.player.carrying = true;
        state.package.carried = true;
        state.package.body.pos = Vec2::new(777.0, 111.0);
        state.activate_power(PowerKind::Rewind, Duration::ZERO).unwrap();
        assert_eq!(state.player.body.pos, Vec2::new(90.0, 400.0));
        assert_eq!(state.package.body.pos, Vec2::new(777.0, 111.0));
    }

    #[test]
    fn test_clone_needs_history() {
        let mut state = SimulationState::with_defaults(1);
        fill_history(&mut state, 30);
        assert!(matches!(
            state.activate_power(PowerKind::Clone, Duration::ZERO),
            Err(PowerError::InsufficientHistory { .. })
        ));
        assert!(state.clones.is_empty());
        assert!(state.powers.clone.is_ready());

        fill_history(&mut state, 1);
        state.activate_power(PowerKind::Clone, Duration::ZERO).unwrap();
        assert_eq!(state.clones.len(), 1);
        assert!(state.powers.clone.active);
        assert_eq!(state.powers.clone.cooldown_remaining, 600);
    }

    #[test]
    fn test_respawn_returns_carried_package() {
        let mut state = SimulationState::with_defaults(1);
        state.player.body.pos = Vec2::new(600.0, 100.0);
        state.player.body.vel = Vec2::new(3.0, 9.0);
        state.player.carrying = true;
        state.package.carried = true;
        state.package.body.pos = Vec2::new(600.0, 80.0);

        state.respawn();
        assert_eq!(state.player.body.pos, Vec2::new(100.0, 400.0));
        assert_eq!(state.player.body.vel, Vec2::ZERO);
        assert_eq!(state.package.body.pos, Vec2::new(150.0, 400.0));
        assert!(!state.player.carrying && !state.package.carried);
    }

    #[test]
    fn test_respawn_leaves_loose_package() {
        let mut state = SimulationState::with_defaults(1);
        state.package.body.pos = Vec2::new(700.0, 300.0);
        state.respawn();
        assert_eq!(state.package.body.pos, Vec2::new(700.0, 300.0));
    }

    #[test]
    fn test_shutdown_cancels_slow_time() {
        let mut state = SimulationState::with_defaults(1);
        state.activate_power(PowerKind::SlowTime, Duration::ZERO).unwrap();
        assert_eq!(state.powers.time_scale(), 0.3);
        state.shutdown();
        assert_eq!(state.powers.time_scale(), 1.0);
        assert!(state.powers.pending_revert().is_none());
    }
}
