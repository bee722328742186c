// src/finalize.rs
//
// Closing the graph: forwarding records, type ids, counts, vtable sizes and
// invariant checks.

use crate::errors::{ReachError, ReachErrorKind, ReachResult};
use crate::graph::{ReachGraph, TypeCounts};
use crate::ids::{MethodId, TypeId};
use crate::mangle::method_mangled_name;
use crate::methods::{MethodState, ReachableMethod, normalize_cap};
use crate::options::ReachOptions;
use reach_ast::MethodKind;

impl ReachGraph {
    /// Close the graph. Must run exactly once, after the last `reach` call.
    #[tracing::instrument(skip_all, fields(types = self.types.len(), methods = self.methods.len()))]
    pub fn finalize(&mut self, options: &ReachOptions) -> ReachResult<()> {
        self.check_open()?;
        if !self.queues.is_empty() {
            return Err(ReachErrorKind::PendingWork {
                types: self.queues.types.len(),
                methods: self.queues.methods.len(),
                exprs: self.queues.exprs.len(),
            }
            .into());
        }

        if let Err(e) = self.close(options) {
            self.poison();
            return Err(e);
        }
        self.finalized = true;
        tracing::debug!(
            total = self.counts.total,
            slots = self.slots.len(),
            "reach graph finalized"
        );
        if options.dump {
            tracing::debug!("{}", self.dump());
        }
        Ok(())
    }

    fn close(&mut self, options: &ReachOptions) -> ReachResult<()> {
        self.add_forwarding()?;

        let mut counts = TypeCounts::default();
        for (i, ty) in self.types.values_mut().enumerate() {
            ty.type_id = Some(i as u32);
            counts.add(ty.kind.category());
        }
        self.counts = counts;

        for id in 0..self.types.len() {
            let id = TypeId::new(id as u32);
            let width = self.vtable_width(id);
            self.ty_mut(id).vtable_size = width;
        }

        if options.verify {
            self.verify()?;
        }
        Ok(())
    }

    /// The implementation of abstract method `method` on `sub`.
    fn implementation(&self, method: &ReachableMethod, sub: TypeId) -> Option<MethodId> {
        let abstract_bucket = self.method_name_by_id(method.bucket);
        let bucket = self.method_name(sub, &abstract_bucket.name)?;
        let cap = normalize_cap(bucket.kind, bucket.cap, method.cap);
        bucket.methods.values().copied().find(|id| {
            let candidate = self.method(*id);
            candidate.cap == cap && candidate.type_args == method.type_args
        })
    }

    /// Add a forwarding record wherever an implementation cannot be called
    /// directly through the abstract signature: its local name, resolved
    /// param or result types, or slot differ from the abstract method's.
    fn add_forwarding(&mut self) -> ReachResult<()> {
        let abstract_methods: Vec<MethodId> = self
            .methods
            .iter()
            .filter(|m| !m.internal && !m.forwarding && self.ty(m.owner).is_trait)
            .map(|m| m.id)
            .collect();

        for id in abstract_methods {
            let method = self.method(id).clone();
            let subtypes: Vec<TypeId> = self.ty(method.owner).subtypes.iter().copied().collect();
            for sub in subtypes {
                let Some(target) = self.implementation(&method, sub) else {
                    return Err(ReachError::missing_implementation(
                        &self.ty(sub).name,
                        &self.ty(method.owner).name,
                        &method.full_name,
                    ));
                };
                let implementation = self.method(target);
                // A send never observes the result of a behaviour.
                let same_result =
                    method.kind == MethodKind::Be || implementation.result == method.result;
                let direct = implementation.name == method.name
                    && implementation.params == method.params
                    && same_result
                    && implementation.vtable_index == method.vtable_index;
                if direct {
                    continue;
                }

                let key = self.signature_key(&method.name, &method.params, method.result);
                let bucket = implementation.bucket;
                if self.method_names[bucket.slot()].mangled.contains_key(&key) {
                    continue;
                }
                let forward = ReachableMethod {
                    id: MethodId::new(self.methods.len() as u32),
                    owner: sub,
                    bucket,
                    name: method.name.clone(),
                    mangled_name: method_mangled_name(&self.ty(sub).mangle, &key),
                    full_name: implementation.full_name.clone(),
                    kind: implementation.kind,
                    cap: method.cap,
                    type_args: method.type_args.clone(),
                    decl: implementation.decl,
                    vtable_index: method.vtable_index,
                    params: method.params.clone(),
                    result: method.result,
                    intrinsic: false,
                    internal: false,
                    forwarding: true,
                    body_group: target,
                    state: MethodState::Resolved,
                };
                tracing::trace!(method = %forward.mangled_name, target = %implementation.mangled_name, "forwarding method");
                self.method_names[bucket.slot()]
                    .mangled
                    .insert(key, forward.id);
                self.methods.push(forward);
            }
        }
        Ok(())
    }

    fn verify(&self) -> ReachResult<()> {
        for method in &self.methods {
            if method.state != MethodState::Resolved {
                return Err(ReachError::verification(format!(
                    "{} was never resolved",
                    method.mangled_name
                )));
            }
            if self.ty(method.owner).methods.get(&self.method_name_by_id(method.bucket).name)
                != Some(&method.bucket)
            {
                return Err(ReachError::verification(format!(
                    "{} is not in its owner's method table",
                    method.mangled_name
                )));
            }
            let owner = self.ty(method.owner);
            if owner.is_trait && method.vtable_index != self.slot(&method.name) {
                return Err(ReachError::verification(format!(
                    "{} does not use the slot of {}",
                    method.mangled_name, method.name
                )));
            }
            if !owner.is_trait || method.forwarding {
                continue;
            }
            // Every subtype must answer on the abstract method's slot.
            for sub in &owner.subtypes {
                if method.internal && !self.ty(*sub).can_be_boxed {
                    continue;
                }
                let answered = self
                    .method_name(*sub, &self.method_name_by_id(method.bucket).name)
                    .is_some_and(|bucket| {
                        bucket
                            .mangled
                            .values()
                            .chain(bucket.methods.values())
                            .any(|id| self.method(*id).vtable_index == method.vtable_index)
                    });
                if !answered {
                    return Err(ReachError::verification(format!(
                        "{} has no record in slot {:?} for {}",
                        self.ty(*sub).name,
                        method.vtable_index,
                        method.full_name
                    )));
                }
            }
        }

        let counts = self.counts;
        let sum = counts.object + counts.numeric + counts.tuple;
        if sum != counts.total || (counts.total + counts.traits) as usize != self.types.len() {
            return Err(ReachError::verification(format!(
                "type counts {:?} do not cover {} types",
                counts,
                self.types.len()
            )));
        }
        for (i, ty) in self.types.values().enumerate() {
            let foreign_bare = ty
                .bare_method
                .is_some_and(|bare| self.method(bare).owner != TypeId::new(i as u32));
            if foreign_bare {
                return Err(ReachError::verification(format!(
                    "{} has a bare method owned by another type",
                    ty.name
                )));
            }
            if ty.type_id != Some(i as u32) {
                return Err(ReachError::verification(format!(
                    "{} has type id {:?}, expected {}",
                    ty.name, ty.type_id, i
                )));
            }
        }
        Ok(())
    }
}
