//! Time power state machine
//!
//! Each power is `Ready` when its cooldown is zero and cooling down otherwise.
//! This module owns the gates, cooldown counters and the slow-time scale; the
//! world effects of rewind and clone are applied by `SimulationState`.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::PowerError;
use crate::tuning::PowerTuning;

/// The three time powers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerKind {
    SlowTime,
    Rewind,
    Clone,
}

impl PowerKind {
    pub const ALL: [PowerKind; 3] = [PowerKind::SlowTime, PowerKind::Rewind, PowerKind::Clone];

    pub fn as_str(&self) -> &'static str {
        match self {
            PowerKind::SlowTime => "slow-time",
            PowerKind::Rewind => "rewind",
            PowerKind::Clone => "clone",
        }
    }
}

impl fmt::Display for PowerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Activation and cooldown state of one power
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerState {
    pub active: bool,
    pub cooldown_remaining: u32,
    pub cooldown_max: u32,
}

impl PowerState {
    pub fn new(cooldown_max: u32) -> Self {
        Self {
            active: false,
            cooldown_remaining: 0,
            cooldown_max,
        }
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.cooldown_remaining == 0
    }

    fn start_cooldown(&mut self) {
        self.cooldown_remaining = self.cooldown_max;
    }

    /// One tick of cooldown, never below zero
    fn tick_cooldown(&mut self) {
        self.cooldown_remaining = self.cooldown_remaining.saturating_sub(1);
    }
}

/// Pending return to normal speed after slow-time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledRevert {
    pub deadline: Duration,
    pub token: u64,
}

/// Gates, cooldowns and the global time scale
#[derive(Debug, Clone, PartialEq)]
pub struct PowerController {
    pub slow_time: PowerState,
    pub rewind: PowerState,
    pub clone: PowerState,
    time_scale: f32,
    slow_scale: f32,
    slow_duration: Duration,
    rewind_flash_ticks: u32,
    pending_revert: Option<ScheduledRevert>,
    next_token: u64,
}

impl PowerController {
    pub fn new(tuning: &PowerTuning) -> Self {
        Self {
            slow_time: PowerState::new(tuning.slow_time_cooldown),
            rewind: PowerState::new(tuning.rewind_cooldown),
            clone: PowerState::new(tuning.clone_cooldown),
            time_scale: 1.0,
            slow_scale: tuning.slow_time_scale,
            slow_duration: Duration::from_millis(tuning.slow_time_duration_ms),
            rewind_flash_ticks: tuning.rewind_flash_ticks,
            pending_revert: None,
            next_token: 1,
        }
    }

    pub fn get(&self, kind: PowerKind) -> &PowerState {
        match kind {
            PowerKind::SlowTime => &self.slow_time,
            PowerKind::Rewind => &self.rewind,
            PowerKind::Clone => &self.clone,
        }
    }

    fn get_mut(&mut self, kind: PowerKind) -> &mut PowerState {
        match kind {
            PowerKind::SlowTime => &mut self.slow_time,
            PowerKind::Rewind => &mut self.rewind,
            PowerKind::Clone => &mut self.clone,
        }
    }

    /// Current global time-scale multiplier (1.0 unless slow-time is running)
    #[inline]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn pending_revert(&self) -> Option<ScheduledRevert> {
        self.pending_revert
    }

    /// Cooldown gate shared by every power
    pub fn check_ready(&self, kind: PowerKind) -> Result<(), PowerError> {
        let state = self.get(kind);
        if state.is_ready() {
            Ok(())
        } else {
            Err(PowerError::OnCooldown {
                power: kind,
                remaining: state.cooldown_remaining,
            })
        }
    }

    /// Mark a successful activation: start the cooldown and set the flag
    pub fn commit(&mut self, kind: PowerKind) {
        let flash = self.rewind_flash_ticks > 0;
        let state = self.get_mut(kind);
        state.start_cooldown();
        if kind == PowerKind::Rewind {
            state.active = flash;
        }
    }

    /// Enter slow motion and schedule the single revert at `now + duration`
    pub fn begin_slow_time(&mut self, now: Duration) -> ScheduledRevert {
        if let Some(old) = self.pending_revert.take() {
            log::debug!("Superseding slow-time revert #{}", old.token);
        }
        let revert = ScheduledRevert {
            deadline: now + self.slow_duration,
            token: self.next_token,
        };
        self.next_token += 1;
        self.pending_revert = Some(revert);
        self.time_scale = self.slow_scale;
        self.slow_time.active = true;
        revert
    }

    /// Fire the pending revert if its deadline has passed. Fires at most once.
    pub fn poll_revert(&mut self, now: Duration) -> Option<ScheduledRevert> {
        match self.pending_revert {
            Some(revert) if now >= revert.deadline => {
                self.pending_revert = None;
                self.restore_time_scale();
                Some(revert)
            }
            _ => None,
        }
    }

    /// Cancel a pending revert by token. Returns false if it already fired.
    pub fn cancel_revert(&mut self, token: u64) -> bool {
        match self.pending_revert {
            Some(revert) if revert.token == token => {
                self.pending_revert = None;
                true
            }
            _ => false,
        }
    }

    /// Drop any pending revert and return to normal speed
    pub fn shutdown(&mut self) {
        self.pending_revert = None;
        self.restore_time_scale();
    }

    fn restore_time_scale(&mut self) {
        self.time_scale = 1.0;
        self.slow_time.active = false;
    }

    /// Advance every cooldown by one tick
    pub fn tick_cooldowns(&mut self) {
        self.slow_time.tick_cooldown();
        self.clone.tick_cooldown();
        self.rewind.tick_cooldown();
        let flash_until = self.rewind.cooldown_max.saturating_sub(self.rewind_flash_ticks);
        self.rewind.active = self.rewind.cooldown_remaining > flash_until;
    }

    /// Clone stays active while any replay is alive
    pub fn set_clone_active(&mut self, active: bool) {
        self.clone.active = active;
    }
}
