//! Bounded event bus
//!
//! Subsystems publish events for collaborators through an explicitly bounded
//! queue. The overflow policy is a constructor argument and dropped events
//! are counted, rather than being silently discarded.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// What to do when the queue is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverflowPolicy {
    /// Evict the oldest queued event to make room for the new one.
    DropOldest,
    /// Discard the incoming event and keep the queue as-is.
    DropNewest,
}

/// A bounded FIFO queue of published events.
#[derive(Debug)]
pub struct EventBus<T> {
    queue: VecDeque<T>,
    capacity: usize,
    policy: OverflowPolicy,
    dropped: u64,
    closed: bool,
}

impl<T> EventBus<T> {
    pub fn new(capacity: usize, policy: OverflowPolicy) -> Self {
        Self {
            queue: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            policy,
            dropped: 0,
            closed: false,
        }
    }

    /// Enqueue an event. On a full queue the configured overflow policy
    /// applies. A closed bus accepts nothing.
    pub fn publish(&mut self, event: T) {
        if self.closed {
            return;
        }
        if self.queue.len() == self.capacity {
            self.dropped += 1;
            match self.policy {
                OverflowPolicy::DropOldest => {
                    self.queue.pop_front();
                }
                OverflowPolicy::DropNewest => {
                    warn!(dropped = self.dropped, "event bus full, dropping incoming event");
                    return;
                }
            }
            warn!(dropped = self.dropped, "event bus full, evicted oldest event");
        }
        self.queue.push_back(event);
    }

    /// Remove and return all queued events in publish order.
    pub fn drain(&mut self) -> Vec<T> {
        self.queue.drain(..).collect()
    }

    /// Stop accepting events. Idempotent; already queued events can still be
    /// drained.
    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of events lost to the overflow policy so far.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drop_oldest_evicts_front() {
        let mut bus = EventBus::new(2, OverflowPolicy::DropOldest);
        bus.publish(1);
        bus.publish(2);
        bus.publish(3);
        assert_eq!(bus.dropped(), 1);
        assert_eq!(bus.drain(), vec![2, 3]);
    }

    #[test]
    fn drop_newest_keeps_front() {
        let mut bus = EventBus::new(2, OverflowPolicy::DropNewest);
        bus.publish(1);
        bus.publish(2);
        bus.publish(3);
        assert_eq!(bus.dropped(), 1);
        assert_eq!(bus.drain(), vec![1, 2]);
    }

    #[test]
    fn closed_bus_accepts_nothing() {
        let mut bus = EventBus::new(4, OverflowPolicy::DropOldest);
        bus.publish(1);
        bus.close();
        bus.close();
        bus.publish(2);
        assert_eq!(bus.drain(), vec![1]);
        assert!(bus.is_closed());
    }
}
