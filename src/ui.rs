//! Per-tick output for renderers and HUDs
//!
//! Only the underlying state is produced here; label text and styling belong
//! to whoever draws it.

use glam::Vec2;
use serde::Serialize;

use crate::sim::{EraId, PowerKind, PowerState, Rect, SimulationState, Theme};

/// How a power button should look
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonStyle {
    Ready,
    Active,
    Disabled,
}

impl ButtonStyle {
    pub fn for_power(state: &PowerState) -> Self {
        if state.active {
            ButtonStyle::Active
        } else if state.cooldown_remaining > 0 {
            ButtonStyle::Disabled
        } else {
            ButtonStyle::Ready
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerView {
    pub kind: PowerKind,
    pub active: bool,
    pub cooldown_remaining: u32,
    pub cooldown_max: u32,
    pub button: ButtonStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BodyView {
    pub pos: Vec2,
    pub size: Vec2,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CloneView {
    pub id: u32,
    pub pos: Vec2,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaserView {
    pub rect: Rect,
    pub active: bool,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameView {
    pub tick: u64,
    pub era: EraId,
    pub level_name: String,
    pub theme: Theme,
    pub platforms: Vec<Rect>,
    pub spikes: Vec<Rect>,
    pub lasers: Vec<LaserView>,
    pub exit: Rect,
    pub player: BodyView,
    pub carrying: bool,
    pub package: BodyView,
    pub package_carried: bool,
    pub clones: Vec<CloneView>,
    pub powers: Vec<PowerView>,
    pub time_scale: f32,
}

impl FrameView {
    pub fn capture(state: &SimulationState) -> Self {
        let level = state.current_level();
        Self {
            tick: state.time_ticks,
            era: level.era(),
            level_name: level.name().to_string(),
            theme: level.descriptor().theme,
            platforms: level.platforms().collect(),
            spikes: level.spikes().to_vec(),
            lasers: level
                .lasers()
                .iter()
                .map(|l| LaserView {
                    rect: l.rect,
                    active: l.active,
                })
                .collect(),
            exit: level.exit(),
            player: BodyView {
                pos: state.player.body.pos,
                size: state.player.body.size(),
            },
            carrying: state.player.carrying,
            package: BodyView {
                pos: state.package.body.pos,
                size: state.package.body.size(),
            },
            package_carried: state.package.carried,
            clones: state
                .clones
                .iter()
                .map(|c| CloneView {
                    id: c.id,
                    pos: c.pos,
                    active: c.active,
                })
                .collect(),
            powers: PowerKind::ALL
                .iter()
                .map(|&kind| {
                    let power = state.powers.get(kind);
                    PowerView {
                        kind,
                        active: power.active,
                        cooldown_remaining: power.cooldown_remaining,
                        cooldown_max: power.cooldown_max,
                        button: ButtonStyle::for_power(power),
                    }
                })
                .collect(),
            time_scale: state.powers.time_scale(),
        }
    }

    pub fn power(&self, kind: PowerKind) -> Option<&PowerView> {
        self.powers.iter().find(|p| p.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_initial_frame() {
        let state = SimulationState::with_defaults(5);
        let frame = FrameView::capture(&state);
        assert_eq!(frame.era, EraId::Medieval);
        assert_eq!(frame.level_name, "Medieval Era");
        assert_eq!(frame.platforms.len(), 5);
        assert_eq!(frame.spikes.len(), 2);
        assert!(frame.lasers.is_empty());
        assert!(frame.clones.is_empty());
        assert_eq!(frame.time_scale, 1.0);
        for power in &frame.powers {
            assert_eq!(power.button, ButtonStyle::Ready);
        }
    }

    #[test]
    fn test_button_styles() {
        let mut state = SimulationState::with_defaults(5);
        state
            .activate_power(PowerKind::SlowTime, Duration::ZERO)
            .unwrap();
        let frame = FrameView::capture(&state);
        let slow = frame.power(PowerKind::SlowTime).unwrap();
        assert_eq!(slow.button, ButtonStyle::Active);
        assert_eq!(slow.cooldown_remaining, 300);

        state.powers.poll_revert(Duration::from_secs(3));
        let frame = FrameView::capture(&state);
        assert_eq!(
            frame.power(PowerKind::SlowTime).unwrap().button,
            ButtonStyle::Disabled
        );
    }

    #[test]
    fn test_frame_serializes() {
        let state = SimulationState::with_defaults(5);
        let json = serde_json::to_value(FrameView::capture(&state)).unwrap();
        assert_eq!(json["era"], "medieval");
        assert_eq!(json["powers"][1]["kind"], "rewind");
        assert_eq!(json["player"]["pos"][0], 100.0);
    }
}
