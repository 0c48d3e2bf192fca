//! Temporal Courier - a time-bending delivery platformer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, history, time powers, clones, butterfly effects)
//! - `platform`: Clock abstraction for the few wall-clock driven timers
//! - `tuning`: Data-driven game balance
//! - `ui`: Per-tick output record for renderers and HUDs
//! - `error`: Error taxonomy

pub mod error;
pub mod platform;
pub mod sim;
pub mod tuning;
pub mod ui;

pub use error::{ConfigError, LevelError, PowerError};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Nominal simulation rate (one tick per display refresh)
    pub const SIM_HZ: u32 = 60;
    /// Wall-clock length of one nominal tick in milliseconds
    pub const TICK_MILLIS: f64 = 1000.0 / SIM_HZ as f64;

    /// Player body dimensions
    pub const PLAYER_WIDTH: f32 = 16.0;
    pub const PLAYER_HEIGHT: f32 = 24.0;

    /// Package body dimensions
    pub const PACKAGE_WIDTH: f32 = 12.0;
    pub const PACKAGE_HEIGHT: f32 = 12.0;

    /// Default spawn coordinates shared by the reference eras
    pub const PLAYER_SPAWN: (f32, f32) = (100.0, 400.0);
    pub const PACKAGE_SPAWN: (f32, f32) = (150.0, 400.0);

    /// Tolerance for "standing on" a platform top edge
    pub const REST_EPSILON: f32 = 1e-3;
}
