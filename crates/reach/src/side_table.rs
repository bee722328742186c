//! Per-record data owned by later compiler phases.
//!
//! Code generation attaches its own handles (descriptor symbols, function
//! values, debug info) to reachable types and methods. The graph does not
//! know about them; a side table keyed by graph ids holds them instead.

use std::marker::PhantomData;

use crate::graph::ReachGraph;
use crate::ids::{MethodId, TypeId};

/// Id usable as a dense side-table index.
pub trait TableKey: Copy {
    fn from_slot(slot: usize) -> Self;
    fn to_slot(self) -> usize;
}

impl TableKey for TypeId {
    fn from_slot(slot: usize) -> Self {
        TypeId::new(slot as u32)
    }

    fn to_slot(self) -> usize {
        self.slot()
    }
}

impl TableKey for MethodId {
    fn from_slot(slot: usize) -> Self {
        MethodId::new(slot as u32)
    }

    fn to_slot(self) -> usize {
        self.slot()
    }
}

/// Optional value per graph record.
#[derive(Debug, Clone)]
pub struct SideTable<K, V> {
    entries: Vec<Option<V>>,
    _key: PhantomData<K>,
}

pub type TypeTable<V> = SideTable<TypeId, V>;
pub type MethodTable<V> = SideTable<MethodId, V>;

impl<K: TableKey, V> SideTable<K, V> {
    pub fn with_capacity(len: usize) -> Self {
        let mut entries = Vec::with_capacity(len);
        entries.resize_with(len, || None);
        Self {
            entries,
            _key: PhantomData,
        }
    }

    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let slot = key.to_slot();
        if slot >= self.entries.len() {
            self.entries.resize_with(slot + 1, || None);
        }
        self.entries[slot].replace(value)
    }

    pub fn get(&self, key: K) -> Option<&V> {
        self.entries.get(key.to_slot())?.as_ref()
    }

    pub fn get_mut(&mut self, key: K) -> Option<&mut V> {
        self.entries.get_mut(key.to_slot())?.as_mut()
    }

    pub fn remove(&mut self, key: K) -> Option<V> {
        self.entries.get_mut(key.to_slot())?.take()
    }

    pub fn len(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Populated entries in id order.
    pub fn iter(&self) -> impl Iterator<Item = (K, &V)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(slot, entry)| entry.as_ref().map(|value| (K::from_slot(slot), value)))
    }
}

impl<K: TableKey, V> Default for SideTable<K, V> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl<V> TypeTable<V> {
    /// Table sized for every type of `graph`.
    pub fn for_types(graph: &ReachGraph) -> Self {
        Self::with_capacity(graph.type_count())
    }
}

impl<V> MethodTable<V> {
    /// Table sized for every method of `graph`.
    pub fn for_methods(graph: &ReachGraph) -> Self {
        Self::with_capacity(graph.method_count())
    }
}
