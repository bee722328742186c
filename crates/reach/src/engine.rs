// src/engine.rs
//
// Worklist fixpoint over types, methods and body expressions.
//
// Nothing here recurses over the program: interning a type or requesting a
// method only creates a record and queues it. Records exist before their
// bodies are walked, so recursive and mutually recursive instantiations
// resolve to the record already being processed.

use crate::errors::{ReachError, ReachResult};
use crate::graph::{ExprSite, ReachGraph};
use crate::ids::{MethodId, TypeId};
use crate::mangle::type_display;
use crate::methods::{MethodState, ReachableParam};
use crate::options::ReachOptions;
use crate::subst::{Substitution, TypeArgs};
use reach_ast::{
    CallExpr, CallKind, Capability, ExprKind, MethodDecl, MethodKind, Program, TypeDef, TypeDefId,
    TypeRef,
};

/// One reachability run over a graph.
pub(crate) struct Reacher<'g, 'p> {
    pub(crate) graph: &'g mut ReachGraph,
    pub(crate) program: &'p Program,
    pub(crate) options: ReachOptions,
}

impl ReachGraph {
    /// Make `method` on `ty` and everything it transitively needs reachable.
    ///
    /// `ty` must be concrete and carry the receiver capability of the entry
    /// call. Returns the entry method's record.
    #[tracing::instrument(skip(self, program, ty, type_args, options))]
    pub fn reach(
        &mut self,
        program: &Program,
        ty: &TypeRef,
        method: &str,
        type_args: &[TypeRef],
        options: &ReachOptions,
    ) -> ReachResult<MethodId> {
        self.check_open()?;
        let mut reacher = Reacher {
            graph: self,
            program,
            options: *options,
        };
        let result = reacher
            .seed(ty, method, type_args)
            .and_then(|id| reacher.drain().map(|()| id));
        if let Err(e) = &result {
            tracing::debug!(error = %e, "reach failed, graph poisoned");
            self.poison();
        }
        result
    }

    /// Make a type reachable without any entry method, e.g. a type whose
    /// descriptor the runtime needs.
    pub fn reach_type(
        &mut self,
        program: &Program,
        ty: &TypeRef,
        options: &ReachOptions,
    ) -> ReachResult<TypeId> {
        self.check_open()?;
        let mut reacher = Reacher {
            graph: self,
            program,
            options: *options,
        };
        let result = reacher
            .intern(ty)
            .and_then(|id| reacher.drain().map(|()| id));
        if result.is_err() {
            self.poison();
        }
        result
    }
}

impl<'g, 'p> Reacher<'g, 'p> {
    pub(crate) fn def(&self, id: TypeDefId) -> ReachResult<&'p TypeDef> {
        let program: &'p Program = self.program;
        program
            .type_def(id)
            .ok_or_else(|| ReachError::unknown_type_def(id.index()))
    }

    fn seed(&mut self, ty: &TypeRef, method: &str, type_args: &[TypeRef]) -> ReachResult<MethodId> {
        let Some(cap) = ty.cap() else {
            return Err(ReachError::invalid_receiver(type_display(self.program, ty)?));
        };
        let owner = self.intern(ty)?;
        self.resolve_method(owner, cap, method, type_args)
    }

    /// Run until every queue is empty. Type completion goes first so that
    /// subtype sets are as large as possible before methods propagate.
    fn drain(&mut self) -> ReachResult<()> {
        loop {
            if let Some(ty) = self.graph.queues.types.pop_front() {
                self.complete_type(ty)?;
            } else if let Some(method) = self.graph.queues.methods.pop_front() {
                self.handle_method(method)?;
            } else if let Some(site) = self.graph.queues.exprs.pop_front() {
                self.handle_expr(site)?;
            } else {
                return Ok(());
            }
        }
    }

    fn method_decl(&self, id: MethodId) -> ReachResult<Option<&'p MethodDecl>> {
        let program: &'p Program = self.program;
        let method = self.graph.method(id);
        let Some(decl) = method.decl else {
            return Ok(None);
        };
        program
            .method_decl(decl)
            .map(Some)
            .ok_or_else(|| ReachError::missing_method(&method.full_name, &method.name))
    }

    fn substitution(&self, id: MethodId) -> Substitution {
        let method = self.graph.method(id);
        Substitution::new(self.graph.ty(method.owner).type_args(), &method.type_args)
    }

    /// Resolve the signature of a requested method and queue its body.
    fn handle_method(&mut self, id: MethodId) -> ReachResult<()> {
        let method = self.graph.method(id);
        if method.is_resolved() {
            return Ok(());
        }
        let walk = !method.intrinsic
            && !method.internal
            && !self.graph.ty(method.owner).is_trait
            && method.is_primary();
        let Some(decl) = self.method_decl(id)? else {
            self.graph.methods[id.slot()].state = MethodState::Resolved;
            return Ok(());
        };
        let subst = self.substitution(id);
        let type_args = self.graph.method(id).type_args.clone();
        for arg in &type_args {
            self.intern(arg)?;
        }

        let mut params = Vec::with_capacity(decl.params.len());
        for param in &decl.params {
            let ty = subst.apply(&param.ty)?;
            let cap = ty.cap().unwrap_or(Capability::Val);
            params.push(ReachableParam {
                ty: self.intern(&ty)?,
                cap,
            });
        }
        let result = self.intern(&subst.apply(&decl.result)?)?;

        let method = &self.graph.methods[id.slot()];
        let key = self.graph.signature_key(&method.name, &params, Some(result));
        let bucket = method.bucket;
        self.graph.method_names[bucket.slot()]
            .mangled
            .insert(key, id);
        let method = &mut self.graph.methods[id.slot()];
        method.params = params;
        method.result = Some(result);
        method.state = MethodState::Resolved;
        tracing::trace!(method = %method.mangled_name, walk, "resolved method");

        if walk {
            self.scan_body(id, decl)?;
        }
        Ok(())
    }

    /// Queue the call-like and type-bearing expressions of a body. The arena
    /// is flat, so a linear pass visits every node.
    fn scan_body(&mut self, id: MethodId, decl: &MethodDecl) -> ReachResult<()> {
        let Some(body) = &decl.body else {
            return Err(ReachError::missing_body(&self.graph.method(id).full_name));
        };
        for (expr_id, expr) in body.iter() {
            let queued = match &expr.kind {
                ExprKind::Call(_) | ExprKind::Match { .. } => true,
                ExprKind::Literal(_) | ExprKind::Tuple(_) | ExprKind::Let { .. } => {
                    expr.ty.is_some()
                }
                _ => false,
            };
            if !queued {
                continue;
            }
            if self.options.trace_bodies {
                tracing::trace!(method = %self.graph.method(id).mangled_name, expr = expr_id.index(), "queued expression");
            }
            self.graph.queues.exprs.push_back(ExprSite {
                method: id,
                expr: expr_id,
            });
        }
        Ok(())
    }

    fn handle_expr(&mut self, site: ExprSite) -> ReachResult<()> {
        let method = self.graph.method(site.method);
        let Some(decl) = self.method_decl(site.method)? else {
            return Err(ReachError::invalid_expr(&method.full_name, site.expr.index()));
        };
        let Some(expr) = decl.expr(site.expr) else {
            return Err(ReachError::invalid_expr(&method.full_name, site.expr.index()));
        };
        let subst = self.substitution(site.method);

        match &expr.kind {
            ExprKind::Call(call) => self.handle_call(&subst, call)?,
            ExprKind::Match { arms, .. } => {
                for arm in arms {
                    self.intern(&subst.apply(&arm.pattern)?)?;
                }
                if let Some(ty) = &expr.ty {
                    self.intern(&subst.apply(ty)?)?;
                }
            }
            _ => {
                if let Some(ty) = &expr.ty {
                    self.intern(&subst.apply(ty)?)?;
                }
            }
        }
        Ok(())
    }

    /// Resolve the target of a call site. A call on a trait or interface
    /// receiver resolves the abstract method, which fans out to subtypes.
    fn handle_call(&mut self, subst: &Substitution, call: &CallExpr) -> ReachResult<()> {
        let receiver_ty = subst.apply(&call.receiver_ty)?;
        let Some(nominal) = receiver_ty.as_nominal() else {
            return Err(ReachError::invalid_receiver(type_display(
                self.program,
                &receiver_ty,
            )?));
        };
        let program = self.program;
        let def = self.def(nominal.def)?;
        let name = program.resolve(call.method);
        if let Some((_, target)) = def.method(call.method) {
            let expected = call_kind_for(target.kind);
            if expected != call.kind {
                return Err(ReachError::call_kind_mismatch(
                    name,
                    target.kind.as_str(),
                    call_kind_str(call.kind),
                ));
            }
        }

        let cap = nominal.cap;
        let receiver = self.intern(&receiver_ty)?;
        let type_args = call
            .type_args
            .iter()
            .map(|arg| subst.apply(arg))
            .collect::<ReachResult<TypeArgs>>()?;
        self.resolve_method(receiver, cap, name, &type_args)?;
        Ok(())
    }
}

fn call_kind_for(kind: MethodKind) -> CallKind {
    match kind {
        MethodKind::Fun => CallKind::Fun,
        MethodKind::Be => CallKind::Be,
        MethodKind::New => CallKind::New,
    }
}

fn call_kind_str(kind: CallKind) -> &'static str {
    match kind {
        CallKind::Fun => "fun",
        CallKind::Be => "be",
        CallKind::New => "new",
    }
}
