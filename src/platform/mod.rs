//! Platform abstraction layer
//!
//! Handles host differences for:
//! - Wall-clock time (slow-time duration is measured in real time, not ticks)

pub mod time;

pub use time::{Clock, ManualClock, SystemClock};
