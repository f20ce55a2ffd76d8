use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Number of events kept by every rolling statistic.
pub const WINDOW_CAPACITY: usize = 50;

/// Fixed-capacity FIFO. Pushing past capacity evicts and returns the oldest entry so the
/// owner can keep its running aggregates in step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlidingWindow<T> {
    capacity: usize,
    entries: VecDeque<T>,
}

impl<T> SlidingWindow<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, entry: T) -> Option<T> {
        self.entries.push_back(entry);
        if self.entries.len() > self.capacity {
            self.entries.pop_front()
        } else {
            None
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }
}

impl<T> Default for SlidingWindow<T> {
    fn default() -> Self {
        Self::new(WINDOW_CAPACITY)
    }
}
