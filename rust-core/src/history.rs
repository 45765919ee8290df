//! Bounded history of recent motion deltas.
//!
//! The buffer keeps the last N deltas in arrival order and evicts the oldest
//! on overflow. It gives the double-shake tier the local context it needs to
//! tell a genuine peak from jitter riding on a larger motion.

use std::collections::VecDeque;

use crate::types::MotionDelta;

/// Fixed-capacity FIFO of [`MotionDelta`] values.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    entries: VecDeque<MotionDelta>,
    capacity: usize,
}

impl HistoryBuffer {
    /// Create an empty buffer holding at most `capacity` entries.
    ///
    /// A zero capacity is bumped to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a delta, evicting the oldest entry when full.
    pub fn push(&mut self, delta: MotionDelta) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(delta);
    }

    /// Most recently pushed entry.
    pub fn latest(&self) -> Option<&MotionDelta> {
        self.entries.back()
    }

    /// The `count` entries immediately preceding the newest one, newest first.
    ///
    /// Returns `None` when fewer than `count` such entries exist.
    pub fn preceding(&self, count: usize) -> Option<impl Iterator<Item = &MotionDelta>> {
        if self.entries.len() <= count {
            return None;
        }
        Some(self.entries.iter().rev().skip(1).take(count))
    }

    /// Whether `magnitude` is >= each of the `lookback` entries before the newest.
    ///
    /// Without enough context the answer is `false`. Non-finite entries are
    /// sensor glitches and never dominate.
    pub fn is_local_peak(&self, magnitude: f32, lookback: usize) -> bool {
        match self.preceding(lookback) {
            Some(mut prior) => {
                prior.all(|d| !d.magnitude.is_finite() || magnitude >= d.magnitude)
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &MotionDelta> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
