//! Fixed timestep simulation tick
//!
//! Core game loop that advances the world deterministically. The order of the
//! steps inside [`tick`] is part of the contract; rewind, clones and the
//! butterfly ledger all depend on it.

use super::powers::PowerKind;
use super::state::{GameEvent, SimulationState};
use crate::platform::Clock;

/// Input intents for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickInput {
    pub move_left: bool,
    pub move_right: bool,
    pub jump: bool,
    /// Pick up or drop the package
    pub interact: bool,
    pub activate_slow_time: bool,
    pub activate_rewind: bool,
    pub activate_clone: bool,
}

impl TickInput {
    /// Horizontal intent in {-1, 0, +1}
    pub fn horizontal(&self) -> f32 {
        let mut x = 0.0;
        if self.move_left {
            x -= 1.0;
        }
        if self.move_right {
            x += 1.0;
        }
        x
    }

    /// Power activations requested this tick, in processing order
    pub fn requested_powers(&self) -> impl Iterator<Item = PowerKind> {
        [
            (self.activate_slow_time, PowerKind::SlowTime),
            (self.activate_rewind, PowerKind::Rewind),
            (self.activate_clone, PowerKind::Clone),
        ]
        .into_iter()
        .filter_map(|(requested, kind)| requested.then_some(kind))
    }
}

/// Advance the simulation by one tick
pub fn tick(state: &mut SimulationState, input: &TickInput, clock: &dyn Clock) {
    state.events.clear();
    let now = clock.now();

    // Discrete intents land before the frame, like key-down handlers
    if input.interact {
        state.interact();
    }
    for power in input.requested_powers() {
        if let Err(err) = state.activate_power(power, now) {
            log::debug!("Ignored {}: {}", power, err);
            state.events.push(GameEvent::PowerIgnored {
                power,
                reason: err.to_string(),
            });
        }
    }

    // 1. Effective dt from the slow-time scale
    if let Some(revert) = state.powers.poll_revert(now) {
        log::debug!("Slow-time revert #{} fired", revert.token);
        state.events.push(GameEvent::SlowTimeReverted);
    }
    let dt = state.powers.time_scale();

    state.time_ticks += 1;

    // 2. History
    let snapshot = state.snapshot();
    state.history.record(snapshot);

    // 3. Cooldowns
    state.powers.tick_cooldowns();

    // 4. Player
    update_player(state, input, dt);

    // 5. Package
    update_package(state, dt);

    // 6. Clones
    for id in state.clones.advance() {
        log::debug!("Clone #{} finished its replay", id);
        state.events.push(GameEvent::CloneExpired { id });
    }
    let any_clones = !state.clones.is_empty();
    state.powers.set_clone_active(any_clones);

    // 7. Moving platforms
    state.current_level_mut().advance_moving_platforms(dt);

    // 8. Collisions
    collision_pass(state);

    // 9. Win condition
    if delivery_reached(state) {
        state.complete_level(now);
    }

    // 10. Butterfly effects on whichever level is current now
    state.apply_butterfly_effects();
}

fn update_player(state: &mut SimulationState, input: &TickInput, dt: f32) {
    let physics = &state.tuning.physics;
    let body = &mut state.player.body;
    body.apply_intent(input.horizontal(), physics.move_accel, dt);
    body.apply_friction(physics.player_friction);
    if input.jump {
        body.try_jump(physics.jump_velocity * dt);
    }
    body.apply_gravity(physics.gravity, dt);
    body.advance();
    body.clamp_to_field(physics.field_width);
}

fn update_package(state: &mut SimulationState, dt: f32) {
    let physics = &state.tuning.physics;
    if state.package.carried {
        state.package.follow(&state.player.body, physics.carry_offset);
    } else {
        let body = &mut state.package.body;
        body.apply_gravity(physics.gravity, dt);
        body.advance();
        body.apply_friction(physics.package_friction);
        body.clamp_to_field(physics.field_width);
    }
}

/// Resolve platform landings and hazard contact.
///
/// Grounded flags are recomputed from scratch, so running the pass twice with
/// no state change in between yields the same flags.
pub fn collision_pass(state: &mut SimulationState) {
    let level = state.current_level();
    let platforms: Vec<_> = level.platforms().collect();

    state.player.body.grounded = false;
    state.package.body.grounded = false;
    for platform in &platforms {
        state.player.body.resolve_platform(platform);
        if !state.package.carried {
            state.package.body.resolve_platform(platform);
        }
    }

    let player_rect = state.player.body.rect();
    let hit_hazard = state
        .current_level()
        .hazards()
        .any(|hazard| player_rect.overlaps(&hazard));
    if hit_hazard {
        state.respawn();
    }
}

/// Carrying the package into the exit
pub fn delivery_reached(state: &SimulationState) -> bool {
    state.player.carrying
        && state
            .player
            .body
            .rect()
            .overlaps(&state.current_level().exit())
}
