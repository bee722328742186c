// src/graph.rs
//
// The reach graph: owner of every reachable type and method record.

use std::collections::VecDeque;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use serde::{Deserialize, Serialize};

use crate::errors::{ReachError, ReachErrorKind, ReachResult};
use crate::ids::{MethodId, MethodNameId, TypeId};
use crate::mangle::{method_local_name, type_args_suffix};
use crate::methods::{ReachableMethod, ReachableMethodName, normalize_cap};
use crate::types::{ReachableType, TypeCategory};
use reach_ast::{Capability, ExprId, Program, TypeRef};

/// Number of reachable types per descriptor category. `total` covers the
/// types with a runtime descriptor; traits are counted apart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeCounts {
    pub object: u32,
    pub numeric: u32,
    pub tuple: u32,
    pub traits: u32,
    pub total: u32,
}

impl TypeCounts {
    pub(crate) fn add(&mut self, category: TypeCategory) {
        match category {
            TypeCategory::Object => self.object += 1,
            TypeCategory::Numeric => self.numeric += 1,
            TypeCategory::Tuple => self.tuple += 1,
            TypeCategory::Trait => {
                self.traits += 1;
                return;
            }
        }
        self.total += 1;
    }
}

/// An expression of a resolved method body waiting to be inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ExprSite {
    pub(crate) method: MethodId,
    pub(crate) expr: ExprId,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct WorkQueues {
    pub(crate) types: VecDeque<TypeId>,
    pub(crate) methods: VecDeque<MethodId>,
    pub(crate) exprs: VecDeque<ExprSite>,
}

impl WorkQueues {
    pub(crate) fn is_empty(&self) -> bool {
        self.types.is_empty() && self.methods.is_empty() && self.exprs.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.types.clear();
        self.methods.clear();
        self.exprs.clear();
    }
}

/// Every type and method instantiation reachable from the entry points of a
/// program.
///
/// Built by repeated [`ReachGraph::reach`] calls, closed by
/// [`ReachGraph::finalize`], read-only afterwards. Records are stored in
/// arenas and refer to each other by id only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReachGraph {
    /// Mangled name -> type; the insertion index is the `TypeId`
    pub(crate) types: IndexMap<String, ReachableType, FxBuildHasher>,
    pub(crate) methods: Vec<ReachableMethod>,
    pub(crate) method_names: Vec<ReachableMethodName>,
    /// Local method name -> dispatch slot
    pub(crate) slots: IndexMap<String, u32, FxBuildHasher>,
    pub(crate) counts: TypeCounts,
    pub(crate) finalized: bool,
    pub(crate) poisoned: bool,
    #[serde(skip)]
    pub(crate) queues: WorkQueues,
}

impl ReachGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ty(&self, id: TypeId) -> &ReachableType {
        &self.types[id.slot()]
    }

    pub(crate) fn ty_mut(&mut self, id: TypeId) -> &mut ReachableType {
        &mut self.types[id.slot()]
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// All types in discovery order.
    pub fn types(&self) -> impl Iterator<Item = (TypeId, &ReachableType)> {
        self.types
            .values()
            .enumerate()
            .map(|(i, ty)| (TypeId::new(i as u32), ty))
    }

    pub(crate) fn type_ids(&self) -> impl Iterator<Item = TypeId> + use<> {
        (0..self.types.len() as u32).map(TypeId::new)
    }

    /// Look up a type by its mangled name.
    pub fn type_by_name(&self, mangle: &str) -> Option<&ReachableType> {
        self.types.get(mangle)
    }

    pub fn type_id(&self, mangle: &str) -> Option<TypeId> {
        self.types
            .get_index_of(mangle)
            .map(|i| TypeId::new(i as u32))
    }

    pub fn method(&self, id: MethodId) -> &ReachableMethod {
        &self.methods[id.slot()]
    }

    pub fn methods(&self) -> impl Iterator<Item = &ReachableMethod> {
        self.methods.iter()
    }

    pub fn method_count(&self) -> usize {
        self.methods.len()
    }

    pub fn method_name_by_id(&self, id: MethodNameId) -> &ReachableMethodName {
        &self.method_names[id.slot()]
    }

    /// The bucket for `name` on `ty`, if any instantiation was reached.
    pub fn method_name(&self, ty: TypeId, name: &str) -> Option<&ReachableMethodName> {
        self.ty(ty)
            .methods
            .get(name)
            .map(|id| self.method_name_by_id(*id))
    }

    /// Find an existing method instantiation without creating one.
    ///
    /// `cap` is the receiver capability of the request; it is normalized the
    /// same way resolution normalizes it.
    pub fn lookup_method(
        &self,
        program: &Program,
        ty: TypeId,
        cap: Capability,
        name: &str,
        type_args: &[TypeRef],
    ) -> ReachResult<Option<&ReachableMethod>> {
        let Some(bucket) = self.method_name(ty, name) else {
            return Ok(None);
        };
        let cap = normalize_cap(bucket.kind, bucket.cap, cap);
        let suffix = type_args_suffix(program, type_args)?;
        let local = method_local_name(name, cap, &suffix);
        Ok(bucket.methods.get(&local).map(|id| self.method(*id)))
    }

    pub fn counts(&self) -> TypeCounts {
        self.counts
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// True if a failed operation left the graph incomplete.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    pub(crate) fn check_open(&self) -> ReachResult<()> {
        if self.finalized {
            return Err(ReachErrorKind::AlreadyFinalized.into());
        }
        if self.poisoned {
            return Err(ReachErrorKind::Poisoned.into());
        }
        Ok(())
    }

    pub(crate) fn poison(&mut self) {
        self.poisoned = true;
        self.queues.clear();
    }

    /// Serialize a finalized graph to JSON.
    pub fn save(&self) -> ReachResult<String> {
        if self.poisoned {
            return Err(ReachErrorKind::Poisoned.into());
        }
        if !self.finalized {
            return Err(ReachErrorKind::NotFinalized.into());
        }
        serde_json::to_string_pretty(self).map_err(ReachError::serialization)
    }

    /// Reload a graph written by [`ReachGraph::save`].
    pub fn load(json: &str) -> ReachResult<Self> {
        let graph: ReachGraph = serde_json::from_str(json).map_err(ReachError::serialization)?;
        if !graph.finalized {
            return Err(ReachErrorKind::NotFinalized.into());
        }
        if graph.poisoned {
            return Err(ReachErrorKind::Poisoned.into());
        }
        graph.check_ids().map_err(ReachError::serialization)?;
        Ok(graph)
    }

    /// Every id stored in a loaded graph must point into its arenas.
    fn check_ids(&self) -> Result<(), String> {
        let types = self.types.len();
        let methods = self.methods.len();
        let names = self.method_names.len();
        let type_ok = |id: TypeId| id.slot() < types;
        let method_ok = |id: MethodId| id.slot() < methods;
        let name_ok = |id: MethodNameId| id.slot() < names;

        for ty in self.types.values() {
            let valid = ty.subtypes.iter().all(|id| type_ok(*id))
                && ty.fields.iter().all(|field| type_ok(field.ty))
                && ty.methods.values().all(|id| name_ok(*id))
                && ty.bare_method.is_none_or(method_ok);
            if !valid {
                return Err(format!("type {} refers to a missing record", ty.mangle));
            }
        }
        for (i, method) in self.methods.iter().enumerate() {
            let valid = method.id.slot() == i
                && type_ok(method.owner)
                && name_ok(method.bucket)
                && method_ok(method.body_group)
                && method.params.iter().all(|param| type_ok(param.ty))
                && method.result.is_none_or(type_ok);
            if !valid {
                return Err(format!("method {} refers to a missing record", method.mangled_name));
            }
        }
        for bucket in &self.method_names {
            let valid = bucket
                .methods
                .values()
                .chain(bucket.mangled.values())
                .chain(bucket.groups.values())
                .all(|id| method_ok(*id));
            if !valid {
                return Err(format!("method name {} refers to a missing record", bucket.name));
            }
        }
        Ok(())
    }
}
