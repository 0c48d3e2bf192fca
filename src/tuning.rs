//! Data-driven game balance
//!
//! Every value has a default matching the shipped game feel, so a tuning file
//! only needs to list what it overrides.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Movement and collision feel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    /// Play-field width; bodies are clamped to [0, width - body width]
    pub field_width: f32,
    /// Play-field height (informational for renderers)
    pub field_height: f32,
    /// Downward acceleration per tick, scaled by dt
    pub gravity: f32,
    /// Horizontal acceleration per unit of input intent
    pub move_accel: f32,
    /// Velocity multiplier applied to the player every tick
    pub player_friction: f32,
    /// Velocity multiplier applied to a free package every tick
    pub package_friction: f32,
    /// Vertical velocity set by a jump at normal speed (negative is up), scaled by dt
    pub jump_velocity: f32,
    /// Package position relative to the player while carried
    pub carry_offset: Vec2,
    /// Max corner-to-corner distance for picking up or dropping the package
    pub pickup_radius: f32,
    /// Fraction of player horizontal velocity handed to a dropped package
    pub drop_velocity_factor: f32,
    /// Vertical velocity given to a dropped package
    pub drop_lift: f32,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            field_width: 1000.0,
            field_height: 600.0,
            gravity: 0.5,
            move_accel: 0.8,
            player_friction: 0.8,
            package_friction: 0.9,
            jump_velocity: -12.0,
            carry_offset: Vec2::new(0.0, -20.0),
            pickup_radius: 30.0,
            drop_velocity_factor: 0.5,
            drop_lift: -2.0,
        }
    }
}

/// Time power thresholds and cooldowns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerTuning {
    /// Number of snapshots kept in the rolling history
    pub history_horizon: usize,
    /// Time-scale multiplier while slow-time is running
    pub slow_time_scale: f32,
    /// Wall-clock duration of slow-time
    pub slow_time_duration_ms: u64,
    pub slow_time_cooldown: u32,
    /// Rewind needs strictly more snapshots than this
    pub rewind_min_history: usize,
    /// How many snapshots rewind jumps back
    pub rewind_window: usize,
    pub rewind_cooldown: u32,
    /// Ticks after a rewind during which the power reports active
    pub rewind_flash_ticks: u32,
    /// Clone needs strictly more snapshots than this
    pub clone_min_history: usize,
    pub clone_cooldown: u32,
}

impl Default for PowerTuning {
    fn default() -> Self {
        Self {
            history_horizon: 180,
            slow_time_scale: 0.3,
            slow_time_duration_ms: 2000,
            slow_time_cooldown: 300,
            rewind_min_history: 60,
            rewind_window: 90,
            rewind_cooldown: 480,
            rewind_flash_ticks: 60,
            clone_min_history: 30,
            clone_cooldown: 600,
        }
    }
}

/// Cross-era helper platform spawning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ButterflyTuning {
    /// Chance per eligible tick of adding a helper platform
    pub probability: f64,
    /// Max butterfly effects applied to a single level
    pub effect_cap: usize,
    /// Helper platform top-left is drawn from [min, max)
    pub region_min: Vec2,
    pub region_max: Vec2,
    pub platform_size: Vec2,
}

impl Default for ButterflyTuning {
    fn default() -> Self {
        Self {
            probability: 0.3,
            effect_cap: 2,
            region_min: Vec2::new(300.0, 200.0),
            region_max: Vec2::new(700.0, 400.0),
            platform_size: Vec2::new(60.0, 16.0),
        }
    }
}

/// Complete tuning set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub physics: PhysicsTuning,
    pub powers: PowerTuning,
    pub butterfly: ButterflyTuning,
}

impl Tuning {
    /// Parse and validate a JSON tuning document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Read, parse and validate a tuning file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Reject values that would make the simulation non-finite or panic
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.physics;
        let scalars = [
            ("physics.field_width", p.field_width),
            ("physics.field_height", p.field_height),
            ("physics.gravity", p.gravity),
            ("physics.move_accel", p.move_accel),
            ("physics.player_friction", p.player_friction),
            ("physics.package_friction", p.package_friction),
            ("physics.jump_velocity", p.jump_velocity),
            ("physics.pickup_radius", p.pickup_radius),
            ("physics.drop_velocity_factor", p.drop_velocity_factor),
            ("physics.drop_lift", p.drop_lift),
            ("powers.slow_time_scale", self.powers.slow_time_scale),
        ];
        for (name, value) in scalars {
            if !value.is_finite() {
                return Err(ConfigError::Invalid(format!("{name} must be finite")));
            }
        }
        let b = &self.butterfly;
        for (name, v) in [
            ("physics.carry_offset", p.carry_offset),
            ("butterfly.region_min", b.region_min),
            ("butterfly.region_max", b.region_max),
            ("butterfly.platform_size", b.platform_size),
        ] {
            if !v.is_finite() {
                return Err(ConfigError::Invalid(format!("{name} must be finite")));
            }
        }

        if p.field_width <= 0.0 || p.field_height <= 0.0 {
            return Err(ConfigError::Invalid("play field must have positive size".into()));
        }
        for (name, f) in [
            ("physics.player_friction", p.player_friction),
            ("physics.package_friction", p.package_friction),
        ] {
            if !(0.0..=1.0).contains(&f) {
                return Err(ConfigError::Invalid(format!("{name} must be within [0, 1]")));
            }
        }
        let powers = &self.powers;
        if powers.history_horizon == 0 {
            return Err(ConfigError::Invalid("powers.history_horizon must be positive".into()));
        }
        if powers.rewind_window == 0 {
            return Err(ConfigError::Invalid("powers.rewind_window must be positive".into()));
        }
        // A gate the buffer can never pass would lock the power forever
        for (name, min) in [
            ("powers.rewind_min_history", powers.rewind_min_history),
            ("powers.clone_min_history", powers.clone_min_history),
        ] {
            if min >= powers.history_horizon {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be below powers.history_horizon ({})",
                    powers.history_horizon
                )));
            }
        }
        if !(self.powers.slow_time_scale > 0.0 && self.powers.slow_time_scale <= 1.0) {
            return Err(ConfigError::Invalid(
                "powers.slow_time_scale must be within (0, 1]".into(),
            ));
        }
        if !(0.0..=1.0).contains(&b.probability) {
            return Err(ConfigError::Invalid(
                "butterfly.probability must be within [0, 1]".into(),
            ));
        }
        if b.region_min.x >= b.region_max.x || b.region_min.y >= b.region_max.y {
            return Err(ConfigError::Invalid(
                "butterfly.region_min must be below region_max on both axes".into(),
            ));
        }
        if b.platform_size.x <= 0.0 || b.platform_size.y <= 0.0 {
            return Err(ConfigError::Invalid(
                "butterfly.platform_size must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "powers": { "rewind_window": 45 } }"#).unwrap();
        assert_eq!(tuning.powers.rewind_window, 45);
        assert_eq!(tuning.powers.history_horizon, 180);
        assert_eq!(tuning.physics, PhysicsTuning::default());
    }

    #[test]
    fn test_rejects_bad_probability() {
        let err = Tuning::from_json(r#"{ "butterfly": { "probability": 1.5 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_zero_horizon() {
        let mut tuning = Tuning::default();
        tuning.powers.history_horizon = 0;
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_rewind_window() {
        let err = Tuning::from_json(r#"{ "powers": { "rewind_window": 0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("rewind_window")));
    }

    #[test]
    fn test_rejects_unreachable_history_gates() {
        let mut tuning = Tuning::default();
        tuning.powers.rewind_min_history = 180;
        assert!(tuning.validate().is_err());

        let mut tuning = Tuning::default();
        tuning.powers.clone_min_history = 200;
        assert!(tuning.validate().is_err());

        // Largest usable gate: one more snapshot than the minimum still fits
        let mut tuning = Tuning::default();
        tuning.powers.rewind_min_history = 179;
        tuning.powers.clone_min_history = 179;
        assert!(tuning.validate().is_ok());
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            Tuning::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Tuning::load("/definitely/not/here/tuning.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
