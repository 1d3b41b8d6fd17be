//! Multi-kind intersection queries

/// A component predicate: entities must carry every `required` kind and none
/// of the `excluded` kinds.
#[derive(Debug, Clone)]
pub struct Query<K> {
    required: Vec<K>,
    excluded: Vec<K>,
}

impl<K: Copy> Query<K> {
    pub fn new() -> Self {
        Self {
            required: Vec::new(),
            excluded: Vec::new(),
        }
    }

    /// Require the given component kind.
    pub fn with(mut self, kind: K) -> Self {
        self.required.push(kind);
        self
    }

    /// Exclude entities carrying the given component kind.
    pub fn without(mut self, kind: K) -> Self {
        self.excluded.push(kind);
        self
    }

    pub fn required(&self) -> &[K] {
        &self.required
    }

    pub fn excluded(&self) -> &[K] {
        &self.excluded
    }
}

impl<K: Copy> Default for Query<K> {
    fn default() -> Self {
        Self::new()
    }
}
