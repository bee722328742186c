// src/subtype.rs
//
// Subtype relation between reachable concrete types and abstract types.
//
// Traits are nominal: a type is a subtype if the trait, applied to the same
// type arguments, occurs in the transitive closure of its `provides` list.
// Interfaces are also structural: a type is a subtype if it declares every
// method the interface declares with a compatible signature once both sides'
// type arguments are substituted. Parameters are contravariant, results
// covariant, receiver capabilities compared by subcapability. Anything that
// does not line up is simply not a subtype.

use rustc_hash::FxHashSet;

use crate::errors::{ReachError, ReachResult};
use crate::subst::Substitution;
use crate::types::{ReachableType, TypeShape};
use reach_ast::{MethodDecl, MethodKind, Program, TypeDef, TypeDefId, TypeDefKind, TypeRef};

/// An applied nominal supertype.
pub(crate) type Provided = (TypeDefId, Vec<TypeRef>);

pub(crate) fn is_subtype(
    program: &Program,
    sub: &ReachableType,
    sup: &ReachableType,
) -> ReachResult<bool> {
    let TypeShape::Nominal {
        def: sup_def,
        args: sup_args,
    } = &sup.shape
    else {
        return Ok(false);
    };
    let sup_decl = type_def(program, *sup_def)?;
    if !sup_decl.kind.is_abstract() {
        return Ok(false);
    }

    match &sub.shape {
        TypeShape::Nominal { def, args } => {
            Checker::new(program).nominal(*def, args, *sup_def, sup_args)
        }
        // Tuples have no methods.
        TypeShape::Tuple(_) => Ok(is_empty_interface(sup_decl)),
    }
}

/// Every nominal supertype of `def` applied to `args`, excluding itself.
pub(crate) fn provides_closure(
    program: &Program,
    def: TypeDefId,
    args: &[TypeRef],
) -> ReachResult<Vec<Provided>> {
    let mut visited: FxHashSet<Provided> = FxHashSet::default();
    let mut closure = Vec::new();
    let mut stack: Vec<Provided> = vec![(def, args.to_vec())];

    while let Some((current, current_args)) = stack.pop() {
        let decl = type_def(program, current)?;
        let subst = Substitution::for_type(&current_args);
        for provided in &decl.provides {
            let provided = subst.apply(provided)?;
            let Some(nominal) = provided.as_nominal() else {
                continue;
            };
            let entry = (nominal.def, nominal.args.clone());
            if visited.insert(entry.clone()) {
                closure.push(entry.clone());
                stack.push(entry);
            }
        }
    }
    Ok(closure)
}

fn is_empty_interface(def: &TypeDef) -> bool {
    def.kind == TypeDefKind::Interface && def.methods.is_empty()
}

/// Structural comparison state. Pairs under comparison are assumed to hold,
/// so recursive interfaces terminate.
struct Checker<'p> {
    program: &'p Program,
    assumed: Vec<(Provided, Provided)>,
}

impl<'p> Checker<'p> {
    fn new(program: &'p Program) -> Self {
        Self {
            program,
            assumed: Vec::new(),
        }
    }

    /// `def[args]` against abstract `sup_def[sup_args]`, capabilities aside.
    fn nominal(
        &mut self,
        def: TypeDefId,
        args: &[TypeRef],
        sup_def: TypeDefId,
        sup_args: &[TypeRef],
    ) -> ReachResult<bool> {
        if def == sup_def {
            return Ok(args == sup_args);
        }
        let sup_decl = type_def(self.program, sup_def)?;
        if !sup_decl.kind.is_abstract() {
            return Ok(false);
        }
        let closure = provides_closure(self.program, def, args)?;
        if closure.iter().any(|(d, a)| *d == sup_def && a == sup_args) {
            return Ok(true);
        }
        if sup_decl.kind != TypeDefKind::Interface {
            return Ok(false);
        }
        // Method type parameters from an enclosing signature cannot be
        // substituted into another definition's methods.
        if !args.iter().chain(sup_args).all(TypeRef::is_concrete) {
            return Ok(false);
        }

        let pair = ((def, args.to_vec()), (sup_def, sup_args.to_vec()));
        if self.assumed.contains(&pair) {
            return Ok(true);
        }
        self.assumed.push(pair);
        let result = self.structural(def, args, sup_decl, sup_args);
        self.assumed.pop();
        result
    }

    fn structural(
        &mut self,
        def: TypeDefId,
        args: &[TypeRef],
        interface: &TypeDef,
        interface_args: &[TypeRef],
    ) -> ReachResult<bool> {
        let decl = type_def(self.program, def)?;
        let own = Substitution::for_type(args);
        let expected = Substitution::for_type(interface_args);
        for required in &interface.methods {
            let Some((_, found)) = decl.method(required.name) else {
                return Ok(false);
            };
            if !self.method(found, &own, required, &expected)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn method(
        &mut self,
        found: &MethodDecl,
        own: &Substitution,
        required: &MethodDecl,
        expected: &Substitution,
    ) -> ReachResult<bool> {
        if found.kind != required.kind
            || found.type_params.len() != required.type_params.len()
            || found.params.len() != required.params.len()
        {
            return Ok(false);
        }
        let receiver = match found.kind {
            MethodKind::Fun => required.cap.is_subcap(found.cap),
            MethodKind::New => found.cap.is_subcap(required.cap),
            MethodKind::Be => true,
        };
        if !receiver {
            return Ok(false);
        }

        for (param, required_param) in found.params.iter().zip(&required.params) {
            let param = own.apply_type_params(&param.ty)?;
            let required_param = expected.apply_type_params(&required_param.ty)?;
            if !self.conforms(&required_param, &param)? {
                return Ok(false);
            }
        }
        let result = own.apply_type_params(&found.result)?;
        let required_result = expected.apply_type_params(&required.result)?;
        self.conforms(&result, &required_result)
    }

    /// A value of type `ty` can be used where `target` is expected.
    fn conforms(&mut self, ty: &TypeRef, target: &TypeRef) -> ReachResult<bool> {
        match (ty, target) {
            (TypeRef::Param(a), TypeRef::Param(b)) => Ok(a == b),
            (TypeRef::Tuple(elements), TypeRef::Tuple(targets)) => {
                if elements.len() != targets.len() {
                    return Ok(false);
                }
                for (element, target) in elements.iter().zip(targets) {
                    if !self.conforms(element, target)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            (TypeRef::Nominal(a), TypeRef::Nominal(b)) => {
                if !a.cap.is_subcap(b.cap) {
                    return Ok(false);
                }
                self.nominal(a.def, &a.args, b.def, &b.args)
            }
            (TypeRef::Tuple(_), TypeRef::Nominal(b)) => {
                Ok(is_empty_interface(type_def(self.program, b.def)?))
            }
            _ => Ok(false),
        }
    }
}

fn type_def(program: &Program, def: TypeDefId) -> ReachResult<&TypeDef> {
    program
        .type_def(def)
        .ok_or_else(|| ReachError::unknown_type_def(def.index()))
}
