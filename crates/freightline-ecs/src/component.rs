//! Component storage
//!
//! Components form a closed tagged union declared by the crate that owns the
//! domain (see [`ComponentSet`]). Each kind gets its own dense column with a
//! sparse entity-index map, so per-kind iteration walks a packed array and
//! intersection queries operate on plain index lists. No type tokens or
//! reflection are involved.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// A closed family of component variants, tagged by a kind enum.
///
/// At most one component per kind is stored per entity; attaching a second
/// one replaces the first.
pub trait ComponentSet: Send + Sync + 'static {
    type Kind: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static;

    /// The kind tag of this component value.
    fn kind(&self) -> Self::Kind;
}

/// Dense storage for a single component kind.
#[derive(Debug)]
struct Column<C> {
    /// Maps entity index to dense slot. `None` means no component.
    sparse: Vec<Option<u32>>,
    /// Packed component values.
    dense: Vec<C>,
    /// Entity indices corresponding to each dense slot.
    entities: Vec<u32>,
}

impl<C> Column<C> {
    fn new() -> Self {
        Self {
            sparse: Vec::new(),
            dense: Vec::new(),
            entities: Vec::new(),
        }
    }

    fn insert(&mut self, index: u32, value: C) {
        let idx = index as usize;
        if idx >= self.sparse.len() {
            self.sparse.resize(idx + 1, None);
        }
        if let Some(dense_idx) = self.sparse[idx] {
            self.dense[dense_idx as usize] = value;
        } else {
            self.sparse[idx] = Some(self.dense.len() as u32);
            self.dense.push(value);
            self.entities.push(index);
        }
    }

    fn remove(&mut self, index: u32) -> Option<C> {
        let idx = index as usize;
        let dense_idx = self.sparse.get_mut(idx)?.take()? as usize;
        let value = self.dense.swap_remove(dense_idx);
        self.entities.swap_remove(dense_idx);
        // The swapped-in element (if any) moved into dense_idx.
        if let Some(&moved) = self.entities.get(dense_idx) {
            self.sparse[moved as usize] = Some(dense_idx as u32);
        }
        Some(value)
    }

    fn get(&self, index: u32) -> Option<&C> {
        let dense_idx = (*self.sparse.get(index as usize)?)?;
        self.dense.get(dense_idx as usize)
    }

    fn get_mut(&mut self, index: u32) -> Option<&mut C> {
        let dense_idx = (*self.sparse.get(index as usize)?)?;
        self.dense.get_mut(dense_idx as usize)
    }

    fn contains(&self, index: u32) -> bool {
        self.sparse
            .get(index as usize)
            .is_some_and(|slot| slot.is_some())
    }
}

/// Kind-indexed storage of component data for all entities.
#[derive(Debug)]
pub struct ComponentStore<C: ComponentSet> {
    columns: HashMap<C::Kind, Column<C>>,
}

impl<C: ComponentSet> ComponentStore<C> {
    pub fn new() -> Self {
        Self {
            columns: HashMap::new(),
        }
    }

    /// Attach a component to an entity index, replacing any existing
    /// component of the same kind.
    pub fn attach(&mut self, index: u32, component: C) {
        self.columns
            .entry(component.kind())
            .or_insert_with(Column::new)
            .insert(index, component);
    }

    /// Remove and return the component of the given kind, if present.
    pub fn detach(&mut self, index: u32, kind: C::Kind) -> Option<C> {
        self.columns.get_mut(&kind)?.remove(index)
    }

    pub fn get(&self, index: u32, kind: C::Kind) -> Option<&C> {
        self.columns.get(&kind)?.get(index)
    }

    pub fn get_mut(&mut self, index: u32, kind: C::Kind) -> Option<&mut C> {
        self.columns.get_mut(&kind)?.get_mut(index)
    }

    pub fn contains(&self, index: u32, kind: C::Kind) -> bool {
        self.columns
            .get(&kind)
            .is_some_and(|column| column.contains(index))
    }

    /// Remove every component attached to an entity index. Called when the
    /// entity is destroyed so it disappears from all kind indices at once.
    pub fn clear_entity(&mut self, index: u32) {
        for column in self.columns.values_mut() {
            column.remove(index);
        }
    }

    /// The packed entity indices carrying the given kind.
    pub fn entities_with(&self, kind: C::Kind) -> &[u32] {
        self.columns
            .get(&kind)
            .map(|column| column.entities.as_slice())
            .unwrap_or(&[])
    }

    /// Entity indices carrying every `required` kind and none of the
    /// `excluded` kinds. Seeds from the smallest required column.
    pub fn matching(&self, required: &[C::Kind], excluded: &[C::Kind]) -> Vec<u32> {
        let Some(seed) = required
            .iter()
            .map(|kind| self.entities_with(*kind))
            .min_by_key(|entities| entities.len())
        else {
            return Vec::new();
        };
        seed.iter()
            .copied()
            .filter(|&index| {
                required.iter().all(|kind| self.contains(index, *kind))
                    && !excluded.iter().any(|kind| self.contains(index, *kind))
            })
            .collect()
    }
}

impl<C: ComponentSet> Default for ComponentStore<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Kind {
        Cargo,
        Berth,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Payload {
        Cargo(u32),
        Berth(u32),
    }

    impl ComponentSet for Payload {
        type Kind = Kind;

        fn kind(&self) -> Kind {
            match self {
                Payload::Cargo(_) => Kind::Cargo,
                Payload::Berth(_) => Kind::Berth,
            }
        }
    }

    #[test]
    fn attach_replaces_same_kind() {
        let mut store = ComponentStore::new();
        store.attach(0, Payload::Cargo(1));
        store.attach(0, Payload::Cargo(2));
        assert_eq!(store.get(0, Kind::Cargo), Some(&Payload::Cargo(2)));
        assert_eq!(store.entities_with(Kind::Cargo), &[0]);
    }

    #[test]
    fn detach_returns_component() {
        let mut store = ComponentStore::new();
        store.attach(3, Payload::Berth(7));
        assert_eq!(store.detach(3, Kind::Berth), Some(Payload::Berth(7)));
        assert_eq!(store.detach(3, Kind::Berth), None);
        assert!(!store.contains(3, Kind::Berth));
    }

    #[test]
    fn swap_remove_keeps_sparse_map_valid() {
        let mut store = ComponentStore::new();
        store.attach(0, Payload::Cargo(10));
        store.attach(1, Payload::Cargo(11));
        store.attach(2, Payload::Cargo(12));
        store.detach(0, Kind::Cargo);
        assert_eq!(store.get(1, Kind::Cargo), Some(&Payload::Cargo(11)));
        assert_eq!(store.get(2, Kind::Cargo), Some(&Payload::Cargo(12)));
    }

    #[test]
    fn matching_intersects_and_excludes() {
        let mut store = ComponentStore::new();
        store.attach(0, Payload::Cargo(1));
        store.attach(1, Payload::Cargo(2));
        store.attach(1, Payload::Berth(5));
        store.attach(2, Payload::Berth(6));

        let both = store.matching(&[Kind::Cargo, Kind::Berth], &[]);
        assert_eq!(both, vec![1]);

        let cargo_only = store.matching(&[Kind::Cargo], &[Kind::Berth]);
        assert_eq!(cargo_only, vec![0]);
    }

    #[test]
    fn clear_entity_removes_from_every_column() {
        let mut store = ComponentStore::new();
        store.attach(4, Payload::Cargo(1));
        store.attach(4, Payload::Berth(2));
        store.clear_entity(4);
        assert!(!store.contains(4, Kind::Cargo));
        assert!(!store.contains(4, Kind::Berth));
    }
}
