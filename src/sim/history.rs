//! Rolling world history for rewind and clones
//!
//! One [`Snapshot`] is recorded per tick. The buffer keeps the most recent
//! `horizon` entries and evicts the oldest first.

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Positions of the player and package at one tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub player: Vec2,
    pub package: Vec2,
}

/// Fixed-capacity FIFO of snapshots, oldest first
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRingBuffer {
    entries: VecDeque<Snapshot>,
    horizon: usize,
}

impl HistoryRingBuffer {
    pub fn new(horizon: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(horizon + 1),
            horizon,
        }
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Append a snapshot, evicting the oldest once over the horizon
    pub fn record(&mut self, snapshot: Snapshot) {
        self.entries.push_back(snapshot);
        while self.entries.len() > self.horizon {
            self.entries.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot at `index`, 0 being the oldest retained
    pub fn get(&self, index: usize) -> Option<&Snapshot> {
        self.entries.get(index)
    }

    pub fn oldest(&self) -> Option<&Snapshot> {
        self.entries.front()
    }

    pub fn latest(&self) -> Option<&Snapshot> {
        self.entries.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        self.entries.iter()
    }

    /// Independent copy of the current contents, for clone replay
    pub fn freeze(&self) -> Box<[Snapshot]> {
        self.entries.iter().copied().collect()
    }
}

/// Index a rewind of `window` entries lands on, never below zero
#[inline]
pub fn rewind_target(len: usize, window: usize) -> usize {
    len.saturating_sub(window)
}
