//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Wall-clock time only through an injected `Clock`
//! - No rendering or input-device dependencies

pub mod body;
pub mod butterfly;
pub mod clones;
pub mod geometry;
pub mod history;
pub mod level;
pub mod powers;
pub mod state;
pub mod tick;

pub use body::{Package, PhysicsBody, Player};
pub use butterfly::{ButterflyLedger, EffectKind, EffectRecord};
pub use clones::{CloneEngine, TemporalClone};
pub use geometry::{Rect, rects_overlap};
pub use history::{HistoryRingBuffer, Snapshot, rewind_target};
pub use level::{EraId, Laser, Level, LevelDescriptor, LevelRegistry, MovingPlatform, Theme};
pub use powers::{PowerController, PowerKind, PowerState};
pub use state::{GameEvent, SimulationState};
pub use tick::{TickInput, collision_pass, tick};
