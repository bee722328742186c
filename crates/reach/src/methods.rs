// src/methods.rs
//
// Reachable method records and per-(type, name) buckets.

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use serde::{Deserialize, Serialize};

use crate::ids::{MethodId, MethodNameId, TypeId};
use reach_ast::{Capability, MethodKind, MethodRef, TypeRef};

/// Traversal state of a method record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodState {
    /// The record exists; its signature has not been resolved yet
    Requested,
    /// Params and result are interned and the body's call sites are queued
    Resolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReachableParam {
    pub ty: TypeId,
    pub cap: Capability,
}

/// One concrete method instantiation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReachableMethod {
    pub id: MethodId,
    pub owner: TypeId,
    /// Bucket on the owner this record belongs to
    pub bucket: MethodNameId,
    /// Name within the owning type: method name, capability, type arguments
    pub name: String,
    /// Linkage name
    pub mangled_name: String,
    pub full_name: String,
    pub kind: MethodKind,
    pub cap: Capability,
    pub type_args: Vec<TypeRef>,
    /// Declaration in the checked program; `None` for synthesized methods
    pub decl: Option<MethodRef>,
    /// Dispatch slot, set when the owner is abstract or the method
    /// implements an abstract method
    pub vtable_index: Option<u32>,
    pub params: Vec<ReachableParam>,
    /// `None` only for synthesized internal methods
    pub result: Option<TypeId>,
    /// The compiler supplies the body
    pub intrinsic: bool,
    /// Compiler supplied and not user visible
    pub internal: bool,
    /// Thin adapter from an abstract signature to this type's implementation
    pub forwarding: bool,
    /// Instantiations sharing one compiled body point at the same primary
    pub body_group: MethodId,
    pub state: MethodState,
}

impl ReachableMethod {
    /// True if this record owns the compiled body of its group.
    pub fn is_primary(&self) -> bool {
        self.body_group == self.id
    }

    /// True if this record shares the body of another instantiation.
    pub fn is_subordinate(&self) -> bool {
        !self.is_primary()
    }

    pub fn is_resolved(&self) -> bool {
        self.state == MethodState::Resolved
    }
}

/// All instantiations of one method name on one type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReachableMethodName {
    pub name: String,
    pub kind: MethodKind,
    /// Receiver capability declared on the method
    pub cap: Capability,
    pub internal: bool,
    /// Local name -> record
    pub methods: IndexMap<String, MethodId, FxBuildHasher>,
    /// Signature key (local name plus resolved param and result types) ->
    /// record, including forwarding records
    pub mangled: IndexMap<String, MethodId, FxBuildHasher>,
    /// Type-argument key -> primary of the shared-body group
    pub groups: IndexMap<String, MethodId, FxBuildHasher>,
}

impl ReachableMethodName {
    pub(crate) fn new(name: String, kind: MethodKind, cap: Capability, internal: bool) -> Self {
        Self {
            name,
            kind,
            cap,
            internal,
            methods: IndexMap::default(),
            mangled: IndexMap::default(),
            groups: IndexMap::default(),
        }
    }

    /// The capability a request under `cap` is reached with.
    ///
    /// `box` and `tag` functions are instantiated per readable receiver
    /// capability: `iso` and `trn` collapse to `ref`, `ref`, `val` and `box`
    /// are kept, anything else falls back to the declared capability. Every
    /// other method is instantiated under its declared capability only.
    pub fn normalize_cap(&self, cap: Capability) -> Capability {
        normalize_cap(self.kind, self.cap, cap)
    }
}

pub(crate) fn normalize_cap(kind: MethodKind, declared: Capability, cap: Capability) -> Capability {
    if kind != MethodKind::Fun || !matches!(declared, Capability::Box | Capability::Tag) {
        return declared;
    }
    match cap {
        Capability::Iso | Capability::Trn => Capability::Ref,
        Capability::Ref | Capability::Val | Capability::Box => cap,
        Capability::Tag => declared,
    }
}
