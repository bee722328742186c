// src/registry.rs
//
// Method resolution: one record per (type, name, capability, type arguments).

use crate::engine::Reacher;
use crate::errors::{ReachError, ReachResult};
use crate::graph::ReachGraph;
use crate::ids::{MethodId, MethodNameId, TypeId};
use crate::mangle::{
    arg_mangle, method_full_name, method_local_name, method_mangled_name, type_args_display,
    type_args_suffix,
};
use crate::methods::{
    MethodState, ReachableMethod, ReachableMethodName, ReachableParam, normalize_cap,
};
use reach_ast::{Capability, MethodKind, MethodRef, TypeRef};

impl ReachGraph {
    /// Bucket for `name` on `ty`, created on first use.
    pub(crate) fn bucket(
        &mut self,
        ty: TypeId,
        name: &str,
        kind: MethodKind,
        cap: Capability,
        internal: bool,
    ) -> MethodNameId {
        if let Some(id) = self.ty(ty).methods.get(name) {
            return *id;
        }
        let id = MethodNameId::new(self.method_names.len() as u32);
        self.method_names
            .push(ReachableMethodName::new(name.to_string(), kind, cap, internal));
        self.ty_mut(ty).methods.insert(name.to_string(), id);
        id
    }

    /// Key identifying a resolved signature within a bucket: local name,
    /// then each parameter type and capability, then the result type.
    pub(crate) fn signature_key(
        &self,
        local: &str,
        params: &[ReachableParam],
        result: Option<TypeId>,
    ) -> String {
        let mut key = local.to_string();
        for param in params {
            key.push('_');
            key.push_str(&arg_mangle(&self.ty(param.ty).mangle, Some(param.cap)));
        }
        if let Some(result) = result {
            key.push('_');
            key.push_str(&self.ty(result).mangle);
        }
        key
    }
}

impl Reacher<'_, '_> {
    /// Return the canonical record for `name` on `ty` requested under `cap`,
    /// creating and queueing it if it does not exist yet.
    pub(crate) fn resolve_method(
        &mut self,
        ty: TypeId,
        cap: Capability,
        name: &str,
        type_args: &[TypeRef],
    ) -> ReachResult<MethodId> {
        let program = self.program;
        let owner = self.graph.ty(ty);
        let owner_name = owner.name.clone();
        let owner_mangle = owner.mangle.clone();
        let is_abstract = owner.is_trait;
        let Some(def_id) = owner.def() else {
            return Err(ReachError::invalid_receiver(owner_name));
        };

        let def = self.def(def_id)?;
        let Some((index, decl)) = program.symbol(name).and_then(|sym| def.method(sym)) else {
            return Err(ReachError::missing_method(owner_name, name));
        };
        if decl.type_params.len() != type_args.len() {
            return Err(ReachError::type_arg_count(
                format!("{}.{}", owner_name, name),
                decl.type_params.len(),
                type_args.len(),
            ));
        }

        let bucket = self
            .graph
            .bucket(ty, name, decl.kind, decl.cap, decl.internal);
        let cap = normalize_cap(decl.kind, decl.cap, cap);
        let suffix = type_args_suffix(program, type_args)?;
        let local = method_local_name(name, cap, &suffix);
        if let Some(existing) = self.graph.method_names[bucket.slot()].methods.get(&local) {
            return Ok(*existing);
        }

        let id = MethodId::new(self.graph.method_count() as u32);
        let body_group = *self.graph.method_names[bucket.slot()]
            .groups
            .entry(suffix)
            .or_insert(id);
        let vtable_index = is_abstract.then(|| self.graph.assign_slot(&local));
        let record = ReachableMethod {
            id,
            owner: ty,
            bucket,
            mangled_name: method_mangled_name(&owner_mangle, &local),
            full_name: method_full_name(&owner_name, name, &type_args_display(program, type_args)?),
            name: local.clone(),
            kind: decl.kind,
            cap,
            type_args: type_args.to_vec(),
            decl: Some(MethodRef {
                def: def_id,
                index,
            }),
            vtable_index,
            params: Vec::new(),
            result: None,
            intrinsic: decl.intrinsic,
            internal: decl.internal,
            forwarding: false,
            body_group,
            state: MethodState::Requested,
        };
        tracing::trace!(method = %record.mangled_name, group = body_group.index(), "new method");
        self.graph.methods.push(record);
        self.graph.method_names[bucket.slot()]
            .methods
            .insert(local, id);
        self.graph.queues.methods.push_back(id);

        if is_abstract {
            let subtypes: Vec<TypeId> = self.graph.ty(ty).subtypes.iter().copied().collect();
            for sub in subtypes {
                self.add_to_subtype(id, sub)?;
            }
        }
        Ok(id)
    }

    /// Record `sub` as a subtype of the abstract type `sup` and hand it
    /// every method already requested on `sup`.
    pub(crate) fn link(&mut self, sub: TypeId, sup: TypeId) -> ReachResult<()> {
        if !self.graph.ty_mut(sup).subtypes.insert(sub) {
            return Ok(());
        }
        tracing::trace!(sub = %self.graph.ty(sub).name, sup = %self.graph.ty(sup).name, "linked subtype");

        if self.graph.ty(sub).can_be_boxed {
            for name in crate::interner::INTERNAL_METHODS {
                self.add_internal(sup, name);
            }
        }
        let inherited: Vec<MethodId> = self
            .graph
            .ty(sup)
            .methods
            .values()
            .flat_map(|bucket| self.graph.method_names[bucket.slot()].methods.values().copied())
            .collect();
        for method in inherited {
            self.add_to_subtype(method, sub)?;
        }
        Ok(())
    }

    /// Materialize the implementation of abstract method `method` on `sub`
    /// and give it the abstract method's slot.
    fn add_to_subtype(&mut self, method: MethodId, sub: TypeId) -> ReachResult<()> {
        let abstract_method = self.graph.method(method);
        let (cap, slot, internal) = (
            abstract_method.cap,
            abstract_method.vtable_index,
            abstract_method.internal,
        );
        let type_args = abstract_method.type_args.clone();
        let sup = abstract_method.owner;
        let name = self
            .graph
            .method_name_by_id(abstract_method.bucket)
            .name
            .clone();

        let implementation = if internal {
            if !self.graph.ty(sub).can_be_boxed {
                return Ok(());
            }
            self.add_internal(sub, &name)
        } else {
            let declared = match self.graph.ty(sub).def() {
                Some(def) => {
                    let def = self.def(def)?;
                    self.program
                        .symbol(&name)
                        .is_some_and(|sym| def.has_method(sym))
                }
                None => false,
            };
            if !declared {
                return Err(ReachError::missing_implementation(
                    &self.graph.ty(sub).name,
                    &self.graph.ty(sup).name,
                    name,
                ));
            }
            self.resolve_method(sub, cap, &name, &type_args)?
        };

        let record = &mut self.graph.methods[implementation.slot()];
        if record.vtable_index.is_none() {
            record.vtable_index = slot;
        }
        Ok(())
    }

    /// Add a compiler-internal method. Internal methods have no declaration
    /// and no body and are resolved on creation.
    pub(crate) fn add_internal(&mut self, ty: TypeId, name: &str) -> MethodId {
        let cap = Capability::Box;
        let bucket = self.graph.bucket(ty, name, MethodKind::Fun, cap, true);
        let local = method_local_name(name, cap, "");
        if let Some(existing) = self.graph.method_names[bucket.slot()].methods.get(&local) {
            return *existing;
        }

        let owner = self.graph.ty(ty);
        let id = MethodId::new(self.graph.method_count() as u32);
        let mangled_name = method_mangled_name(&owner.mangle, &local);
        let full_name = method_full_name(&owner.name, name, "");
        let vtable_index = if owner.is_trait {
            Some(self.graph.assign_slot(&local))
        } else {
            self.graph.slot(&local)
        };
        tracing::trace!(method = %mangled_name, "new internal method");

        self.graph.methods.push(ReachableMethod {
            id,
            owner: ty,
            bucket,
            name: local.clone(),
            mangled_name,
            full_name,
            kind: MethodKind::Fun,
            cap,
            type_args: Vec::new(),
            decl: None,
            vtable_index,
            params: Vec::new(),
            result: None,
            intrinsic: true,
            internal: true,
            forwarding: false,
            body_group: id,
            state: MethodState::Resolved,
        });
        let bucket = &mut self.graph.method_names[bucket.slot()];
        bucket.methods.insert(local.clone(), id);
        bucket.groups.insert(String::new(), id);
        bucket.mangled.insert(local, id);
        id
    }
}
