//! Era level descriptors and their runtime overlay
//!
//! A [`LevelDescriptor`] is static content and is never mutated after load.
//! Everything that changes during play (moving platform positions, butterfly
//! helper platforms) lives in the [`Level`] overlay and is merged at query
//! time.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use crate::consts::{PACKAGE_SPAWN, PLAYER_SPAWN};
use crate::error::LevelError;

/// Era identifiers, in play order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EraId {
    Medieval,
    Industrial,
    Future,
}

impl EraId {
    pub fn as_str(&self) -> &'static str {
        match self {
            EraId::Medieval => "medieval",
            EraId::Industrial => "industrial",
            EraId::Future => "future",
        }
    }
}

impl fmt::Display for EraId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Platform that slides back and forth horizontally
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingPlatform {
    pub rect: Rect,
    /// Horizontal speed per tick, sign is the initial direction
    pub vx: f32,
    /// Travel distance to the right of the anchor
    pub range: f32,
    /// Left end of travel
    pub anchor_x: f32,
}

/// Laser barrier; only deadly while active
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Laser {
    pub rect: Rect,
    pub active: bool,
}

/// Era color scheme (0xRRGGBB)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub background: u32,
    pub platform: u32,
    pub accent: u32,
}

/// Where the player and package appear on respawn and level entry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub player: Vec2,
    pub package: Vec2,
}

impl Default for SpawnPoint {
    fn default() -> Self {
        Self {
            player: Vec2::new(PLAYER_SPAWN.0, PLAYER_SPAWN.1),
            package: Vec2::new(PACKAGE_SPAWN.0, PACKAGE_SPAWN.1),
        }
    }
}

/// Static per-era content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDescriptor {
    pub era: EraId,
    pub name: String,
    pub platforms: Vec<Rect>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub moving_platforms: Vec<MovingPlatform>,
    pub spikes: Vec<Rect>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lasers: Vec<Laser>,
    pub exit: Rect,
    pub theme: Theme,
    #[serde(default)]
    pub spawn: SpawnPoint,
}

impl LevelDescriptor {
    /// Reject anything that could feed NaN or infinity into the simulation
    pub fn validate(&self) -> Result<(), LevelError> {
        let invalid = |reason: String| LevelError::InvalidGeometry {
            era: self.era,
            reason,
        };

        if self.platforms.is_empty() {
            return Err(invalid("level has no static platforms".into()));
        }
        for (i, rect) in self.platforms.iter().enumerate() {
            if !rect.is_well_formed() {
                return Err(invalid(format!("platform {i} is malformed: {rect:?}")));
            }
        }
        for (i, rect) in self.spikes.iter().enumerate() {
            if !rect.is_well_formed() {
                return Err(invalid(format!("spike {i} is malformed: {rect:?}")));
            }
        }
        for (i, laser) in self.lasers.iter().enumerate() {
            if !laser.rect.is_well_formed() {
                return Err(invalid(format!("laser {i} is malformed: {:?}", laser.rect)));
            }
        }
        for (i, mover) in self.moving_platforms.iter().enumerate() {
            if !mover.rect.is_well_formed() {
                return Err(invalid(format!(
                    "moving platform {i} is malformed: {:?}",
                    mover.rect
                )));
            }
            if !mover.vx.is_finite() || !mover.range.is_finite() || !mover.anchor_x.is_finite() {
                return Err(invalid(format!("moving platform {i} has non-finite motion")));
            }
            if mover.range < 0.0 {
                return Err(invalid(format!("moving platform {i} has negative range")));
            }
        }
        if !self.exit.is_well_formed() {
            return Err(invalid(format!("exit is malformed: {:?}", self.exit)));
        }
        if !self.spawn.player.is_finite() || !self.spawn.package.is_finite() {
            return Err(invalid("spawn point is not finite".into()));
        }
        Ok(())
    }
}

/// Tag recorded for each butterfly mutation applied to a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppliedEffect {
    HelperPlatform,
}

/// Runtime state of one moving platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoverState {
    pub rect: Rect,
    pub vx: f32,
}

/// A level in play: static descriptor plus runtime overlay
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    descriptor: LevelDescriptor,
    movers: Vec<MoverState>,
    helper_platforms: Vec<Rect>,
    effects: Vec<AppliedEffect>,
}

impl Level {
    pub fn new(descriptor: LevelDescriptor) -> Self {
        let movers = descriptor
            .moving_platforms
            .iter()
            .map(|m| MoverState {
                rect: m.rect,
                vx: m.vx,
            })
            .collect();
        Self {
            descriptor,
            movers,
            helper_platforms: Vec::new(),
            effects: Vec::new(),
        }
    }

    pub fn descriptor(&self) -> &LevelDescriptor {
        &self.descriptor
    }

    pub fn era(&self) -> EraId {
        self.descriptor.era
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn spawn(&self) -> SpawnPoint {
        self.descriptor.spawn
    }

    pub fn exit(&self) -> Rect {
        self.descriptor.exit
    }

    pub fn spikes(&self) -> &[Rect] {
        &self.descriptor.spikes
    }

    pub fn lasers(&self) -> &[Laser] {
        &self.descriptor.lasers
    }

    pub fn movers(&self) -> &[MoverState] {
        &self.movers
    }

    pub fn helper_platforms(&self) -> &[Rect] {
        &self.helper_platforms
    }

    pub fn effects(&self) -> &[AppliedEffect] {
        &self.effects
    }

    /// All solid platforms: static, then butterfly helpers, then movers
    pub fn platforms(&self) -> impl Iterator<Item = Rect> + '_ {
        self.descriptor
            .platforms
            .iter()
            .copied()
            .chain(self.helper_platforms.iter().copied())
            .chain(self.movers.iter().map(|m| m.rect))
    }

    /// Active hazards (spikes and lit lasers)
    pub fn hazards(&self) -> impl Iterator<Item = Rect> + '_ {
        self.descriptor.spikes.iter().copied().chain(
            self.descriptor
                .lasers
                .iter()
                .filter(|l| l.active)
                .map(|l| l.rect),
        )
    }

    /// Slide moving platforms, turning around at either end of their travel
    pub fn advance_moving_platforms(&mut self, dt: f32) {
        for (state, mover) in self
            .movers
            .iter_mut()
            .zip(self.descriptor.moving_platforms.iter())
        {
            state.rect.x += state.vx * dt;
            let end = mover.anchor_x + mover.range;
            if state.rect.x <= mover.anchor_x {
                state.vx = state.vx.abs();
            } else if state.rect.x >= end {
                state.vx = -state.vx.abs();
            }
        }
    }

    /// Append a butterfly helper platform
    pub fn add_helper_platform(&mut self, rect: Rect) {
        self.helper_platforms.push(rect);
        self.effects.push(AppliedEffect::HelperPlatform);
    }
}

/// Ordered set of levels; play cycles through them in order
#[derive(Debug, Clone, PartialEq)]
pub struct LevelRegistry {
    levels: Vec<Level>,
}

impl LevelRegistry {
    /// Validate descriptors and build their runtime levels
    pub fn new(descriptors: Vec<LevelDescriptor>) -> Result<Self, LevelError> {
        if descriptors.is_empty() {
            return Err(LevelError::Empty);
        }
        for (i, desc) in descriptors.iter().enumerate() {
            desc.validate()?;
            if descriptors[..i].iter().any(|d| d.era == desc.era) {
                return Err(LevelError::DuplicateEra(desc.era));
            }
        }
        Ok(Self {
            levels: descriptors.into_iter().map(Level::new).collect(),
        })
    }

    /// Parse a JSON array of level descriptors
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let descriptors: Vec<LevelDescriptor> = serde_json::from_str(json)?;
        Self::new(descriptors)
    }

    /// The three reference eras
    pub fn builtin() -> Self {
        Self {
            levels: builtin_descriptors().into_iter().map(Level::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Level> {
        self.levels.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Level> {
        self.levels.get_mut(index)
    }

    pub fn index_of(&self, era: EraId) -> Option<usize> {
        self.levels.iter().position(|l| l.era() == era)
    }

    /// Index of the level after `index`, wrapping around
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.levels.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Level> {
        self.levels.iter()
    }
}

fn builtin_descriptors() -> Vec<LevelDescriptor> {
    vec![
        LevelDescriptor {
            era: EraId::Medieval,
            name: "Medieval Era".into(),
            platforms: vec![
                Rect::new(0.0, 580.0, 1000.0, 20.0),
                Rect::new(200.0, 500.0, 100.0, 20.0),
                Rect::new(400.0, 420.0, 100.0, 20.0),
                Rect::new(600.0, 340.0, 100.0, 20.0),
                Rect::new(800.0, 260.0, 100.0, 20.0),
            ],
            moving_platforms: Vec::new(),
            spikes: vec![
                Rect::new(320.0, 565.0, 60.0, 15.0),
                Rect::new(520.0, 565.0, 80.0, 15.0),
            ],
            lasers: Vec::new(),
            exit: Rect::new(850.0, 200.0, 40.0, 60.0),
            theme: Theme {
                background: 0x2d5016,
                platform: 0x8b4513,
                accent: 0x654321,
            },
            spawn: SpawnPoint::default(),
        },
        LevelDescriptor {
            era: EraId::Industrial,
            name: "Industrial Era".into(),
            platforms: vec![
                Rect::new(0.0, 580.0, 1000.0, 20.0),
                Rect::new(150.0, 480.0, 120.0, 20.0),
                Rect::new(350.0, 380.0, 120.0, 20.0),
                Rect::new(550.0, 480.0, 120.0, 20.0),
                Rect::new(750.0, 280.0, 120.0, 20.0),
            ],
            moving_platforms: vec![MovingPlatform {
                rect: Rect::new(400.0, 300.0, 80.0, 16.0),
                vx: 1.0,
                range: 100.0,
                anchor_x: 400.0,
            }],
            spikes: vec![
                Rect::new(280.0, 565.0, 40.0, 15.0),
                Rect::new(680.0, 565.0, 60.0, 15.0),
            ],
            lasers: Vec::new(),
            exit: Rect::new(800.0, 220.0, 40.0, 60.0),
            theme: Theme {
                background: 0x2c2c2c,
                platform: 0x666666,
                accent: 0xff6b35,
            },
            spawn: SpawnPoint::default(),
        },
        LevelDescriptor {
            era: EraId::Future,
            name: "Future Era".into(),
            platforms: vec![
                Rect::new(0.0, 580.0, 1000.0, 20.0),
                Rect::new(100.0, 450.0, 80.0, 20.0),
                Rect::new(250.0, 350.0, 80.0, 20.0),
                Rect::new(450.0, 250.0, 80.0, 20.0),
                Rect::new(650.0, 350.0, 80.0, 20.0),
                Rect::new(800.0, 200.0, 100.0, 20.0),
            ],
            moving_platforms: Vec::new(),
            spikes: vec![
                Rect::new(190.0, 565.0, 50.0, 15.0),
                Rect::new(540.0, 565.0, 100.0, 15.0),
            ],
            lasers: vec![Laser {
                rect: Rect::new(350.0, 200.0, 4.0, 150.0),
                active: true,
            }],
            exit: Rect::new(820.0, 140.0, 40.0, 60.0),
            theme: Theme {
                background: 0x0a0a2e,
                platform: 0x6a0dad,
                accent: 0x00ffff,
            },
            spawn: SpawnPoint::default(),
        },
    ]
}
