//! Fixed-capacity history buffers
//!
//! Bounded histories (the player action log, pressure snapshots) use a ring
//! buffer with oldest-entry eviction to cap memory use.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// A ring buffer that keeps at most `capacity` entries, evicting the oldest
/// entry when full.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct History<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T> History<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Append an entry, evicting the oldest one if the buffer is full.
    /// Returns the evicted entry, if any.
    pub fn push(&mut self, entry: T) -> Option<T> {
        let evicted = if self.entries.len() == self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(entry);
        evicted
    }

    /// Iterate from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    /// Iterate over the `n` most recent entries, newest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &T> {
        self.entries.iter().rev().take(n)
    }

    pub fn latest(&self) -> Option<&T> {
        self.entries.back()
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_oldest_when_full() {
        let mut history = History::new(3);
        assert_eq!(history.push(1), None);
        assert_eq!(history.push(2), None);
        assert_eq!(history.push(3), None);
        assert_eq!(history.push(4), Some(1));
        assert_eq!(history.iter().copied().collect::<Vec<_>>(), vec![2, 3, 4]);
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn recent_is_newest_first() {
        let mut history = History::new(5);
        for i in 0..5 {
            history.push(i);
        }
        let last_two: Vec<_> = history.recent(2).copied().collect();
        assert_eq!(last_two, vec![4, 3]);
    }

    #[test]
    fn capacity_is_at_least_one() {
        let mut history = History::new(0);
        history.push("a");
        history.push("b");
        assert_eq!(history.len(), 1);
        assert_eq!(history.latest(), Some(&"b"));
    }
}
