//! Error taxonomy
//!
//! Power errors are recoverable no-ops reported back to the caller. Level and
//! config errors are fatal and only ever raised while loading data.

use std::path::PathBuf;

use thiserror::Error;

use crate::sim::level::EraId;
use crate::sim::powers::PowerKind;

/// Why a power activation was ignored
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PowerError {
    /// The power is still cooling down; cooldown is left untouched.
    #[error("{power} is on cooldown ({remaining} ticks remaining)")]
    OnCooldown { power: PowerKind, remaining: u32 },
    /// Not enough recorded history; cooldown is not consumed.
    #[error("{power} needs more than {required} history entries, have {available}")]
    InsufficientHistory {
        power: PowerKind,
        available: usize,
        required: usize,
    },
}

/// Level data rejected at load time
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("{era}: invalid level geometry: {reason}")]
    InvalidGeometry { era: EraId, reason: String },
    #[error("level registry has no levels")]
    Empty,
    #[error("era {0} is defined more than once")]
    DuplicateEra(EraId),
    #[error("failed to parse level data: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Tuning file could not be used
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse tuning: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning: {0}")]
    Invalid(String),
}
