//! Temporal clones
//!
//! A clone replays a frozen copy of the history buffer, one snapshot per tick,
//! and disappears when it runs out. Clones are display-only: they never touch
//! collision, physics or the win condition.

use glam::Vec2;

use super::history::{HistoryRingBuffer, Snapshot};

/// One replaying clone
#[derive(Debug, Clone, PartialEq)]
pub struct TemporalClone {
    pub id: u32,
    /// Owned copy of the history at spawn time
    history: Box<[Snapshot]>,
    /// Next snapshot to play
    cursor: usize,
    /// Displayed position
    pub pos: Vec2,
    pub active: bool,
}

impl TemporalClone {
    fn new(id: u32, history: Box<[Snapshot]>, pos: Vec2) -> Self {
        Self {
            id,
            history,
            cursor: 0,
            pos,
            active: true,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Play one snapshot. Returns false once the history is exhausted.
    fn step(&mut self) -> bool {
        match self.history.get(self.cursor) {
            Some(snapshot) => {
                self.pos = snapshot.player;
                self.cursor += 1;
                true
            }
            None => {
                self.active = false;
                false
            }
        }
    }
}

/// Owns every live clone
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CloneEngine {
    clones: Vec<TemporalClone>,
    next_id: u32,
}

impl CloneEngine {
    pub fn new() -> Self {
        Self {
            clones: Vec::new(),
            next_id: 1,
        }
    }

    /// Start a clone replaying a copy of `history`, shown at `pos` until its first step
    pub fn spawn(&mut self, history: &HistoryRingBuffer, pos: Vec2) -> u32 {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        self.clones.push(TemporalClone::new(id, history.freeze(), pos));
        id
    }

    /// Advance every clone one snapshot; returns the ids of clones that finished
    pub fn advance(&mut self) -> Vec<u32> {
        let mut expired = Vec::new();
        self.clones.retain_mut(|clone| {
            let alive = clone.step();
            if !alive {
                expired.push(clone.id);
            }
            alive
        });
        expired
    }

    pub fn clear(&mut self) {
        self.clones.clear();
    }

    pub fn len(&self) -> usize {
        self.clones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clones.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TemporalClone> {
        self.clones.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history_of(len: usize) -> HistoryRingBuffer {
        let mut history = HistoryRingBuffer::new(180);
        for i in 0..len {
            history.record(Snapshot {
                player: Vec2::new(i as f32, 10.0),
                package: Vec2::ZERO,
            });
        }
        history
    }

    #[test]
    fn test_clone_replays_then_expires() {
        let history = history_of(40);
        let mut engine = CloneEngine::new();
        let id = engine.spawn(&history, Vec2::new(500.0, 500.0));

        // Every captured snapshot is played, one per tick
        for tick in 0..40 {
            assert!(engine.advance().is_empty());
            let clone = engine.iter().next().unwrap();
            assert_eq!(clone.pos, Vec2::new(tick as f32, 10.0));
            assert_eq!(clone.cursor(), tick + 1);
        }

        // The tick after the last index is consumed removes it
        assert_eq!(engine.advance(), vec![id]);
        assert!(engine.is_empty());

        // No double termination
        assert!(engine.advance().is_empty());
    }

    #[test]
    fn test_clone_ignores_live_history_changes() {
        let mut history = history_of(35);
        let mut engine = CloneEngine::new();
        engine.spawn(&history, Vec2::ZERO);
        history.clear();
        for i in 0..10 {
            history.record(Snapshot {
                player: Vec2::new(-1.0, -1.0),
                package: Vec2::ZERO,
            });
            engine.advance();
            assert_eq!(engine.iter().next().unwrap().pos, Vec2::new(i as f32, 10.0));
        }
        assert_eq!(engine.iter().next().unwrap().history_len(), 35);
    }

    #[test]
    fn test_concurrent_clones_lock_step() {
        let mut engine = CloneEngine::new();
        let short = engine.spawn(&history_of(2), Vec2::ZERO);
        let long = engine.spawn(&history_of(5), Vec2::ZERO);
        assert_ne!(short, long);

        engine.advance();
        engine.advance();
        assert_eq!(engine.len(), 2);
        let positions: Vec<Vec2> = engine.iter().map(|c| c.pos).collect();
        assert_eq!(positions, vec![Vec2::new(1.0, 10.0), Vec2::new(1.0, 10.0)]);

        assert_eq!(engine.advance(), vec![short]);
        assert_eq!(engine.len(), 1);
        assert_eq!(engine.iter().next().unwrap().id, long);
    }
}
