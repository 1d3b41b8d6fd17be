//! Shared subsystem state containers
//!
//! Each subsystem publishes its state as a whole-snapshot replacement:
//! one writer builds a complete new value and swaps it in, readers clone an
//! `Arc` to the latest snapshot. Readers never observe a partially updated
//! state.

use std::sync::Arc;

use parking_lot::RwLock;

/// Single-writer/multiple-reader atomic-swap state container.
#[derive(Debug)]
pub struct SharedState<T> {
    inner: RwLock<Arc<T>>,
}

impl<T> SharedState<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: RwLock::new(Arc::new(value)),
        }
    }

    /// Get the latest published snapshot.
    pub fn snapshot(&self) -> Arc<T> {
        self.inner.read().clone()
    }

    /// Replace the published snapshot with a complete new value.
    pub fn publish(&self, value: T) {
        *self.inner.write() = Arc::new(value);
    }
}

impl<T: Clone> SharedState<T> {
    /// Clone the current snapshot for mutation by the single writer.
    pub fn working_copy(&self) -> T {
        self.snapshot().as_ref().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_swaps_whole_snapshot() {
        let state = SharedState::new(vec![1, 2]);
        let before = state.snapshot();
        let mut next = state.working_copy();
        next.push(3);
        state.publish(next);
        assert_eq!(*before, vec![1, 2]);
        assert_eq!(*state.snapshot(), vec![1, 2, 3]);
    }
}
