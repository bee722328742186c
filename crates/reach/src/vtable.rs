// src/vtable.rs
//
// Dispatch slots. One global, dense slot per local method name reached
// through an abstract type; every implementer of that name uses the same
// slot, whichever abstract type it is dispatched through.

use crate::graph::ReachGraph;
use crate::ids::TypeId;

impl ReachGraph {
    /// Slot for `local`, allocating the next one on first use.
    pub(crate) fn assign_slot(&mut self, local: &str) -> u32 {
        if let Some(slot) = self.slots.get(local) {
            return *slot;
        }
        let slot = self.slots.len() as u32;
        self.slots.insert(local.to_string(), slot);
        tracing::debug!(method = local, slot, "assigned vtable slot");
        slot
    }

    /// Slot of a dispatched local method name, if any.
    pub fn slot(&self, local: &str) -> Option<u32> {
        self.slots.get(local).copied()
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Dispatch slot of the method instantiation `local_name` on `ty`.
    /// Forwarding records answer under the abstract method's local name.
    pub fn vtable_index(&self, ty: TypeId, local_name: &str) -> Option<u32> {
        self.ty(ty).methods.values().find_map(|bucket| {
            let bucket = self.method_name_by_id(*bucket);
            let direct = bucket
                .methods
                .get(local_name)
                .and_then(|id| self.method(*id).vtable_index);
            direct.or_else(|| {
                bucket
                    .mangled
                    .values()
                    .map(|id| self.method(*id))
                    .find(|m| m.forwarding && m.name == local_name)
                    .and_then(|m| m.vtable_index)
            })
        })
    }

    /// One past the highest slot used by any record of `ty`.
    pub(crate) fn vtable_width(&self, ty: TypeId) -> u32 {
        self.ty(ty)
            .methods
            .values()
            .flat_map(|bucket| {
                let bucket = self.method_name_by_id(*bucket);
                bucket.methods.values().chain(bucket.mangled.values())
            })
            .filter_map(|id| self.method(*id).vtable_index)
            .map(|slot| slot + 1)
            .max()
            .unwrap_or(0)
    }
}
