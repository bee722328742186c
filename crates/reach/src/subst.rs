// src/subst.rs
//
// Type parameter substitution for method bodies and supertype lists.

use smallvec::SmallVec;

use crate::errors::{ReachError, ReachResult};
use reach_ast::{NominalRef, ParamRef, TypeRef};

pub(crate) type TypeArgs = SmallVec<[TypeRef; 4]>;

/// Maps the enclosing type's and method's type parameters to concrete types.
#[derive(Debug, Clone, Default)]
pub(crate) struct Substitution {
    type_args: TypeArgs,
    method_args: TypeArgs,
}

impl Substitution {
    pub(crate) fn new(type_args: &[TypeRef], method_args: &[TypeRef]) -> Self {
        Self {
            type_args: type_args.iter().cloned().collect(),
            method_args: method_args.iter().cloned().collect(),
        }
    }

    /// Substitution for declarations of a type definition (fields, provides).
    pub(crate) fn for_type(type_args: &[TypeRef]) -> Self {
        Self::new(type_args, &[])
    }

    /// Replace every type parameter in `ty`. The result is concrete.
    pub(crate) fn apply(&self, ty: &TypeRef) -> ReachResult<TypeRef> {
        self.substitute(ty, false)
    }

    /// Replace the enclosing type's parameters only. Method type parameters
    /// stay in place, so two generic signatures can be compared positionally.
    pub(crate) fn apply_type_params(&self, ty: &TypeRef) -> ReachResult<TypeRef> {
        self.substitute(ty, true)
    }

    fn substitute(&self, ty: &TypeRef, keep_method_params: bool) -> ReachResult<TypeRef> {
        match ty {
            TypeRef::Nominal(nominal) => {
                let args = nominal
                    .args
                    .iter()
                    .map(|arg| self.substitute(arg, keep_method_params))
                    .collect::<ReachResult<Vec<_>>>()?;
                Ok(TypeRef::Nominal(NominalRef {
                    def: nominal.def,
                    args,
                    cap: nominal.cap,
                }))
            }
            TypeRef::Tuple(elements) => Ok(TypeRef::Tuple(
                elements
                    .iter()
                    .map(|element| self.substitute(element, keep_method_params))
                    .collect::<ReachResult<Vec<_>>>()?,
            )),
            TypeRef::Param(ParamRef::Method(_)) if keep_method_params => Ok(ty.clone()),
            TypeRef::Param(param) => self.lookup(*param).cloned(),
        }
    }

    fn lookup(&self, param: ParamRef) -> ReachResult<&TypeRef> {
        let (args, index, scope) = match param {
            ParamRef::Type(index) => (&self.type_args, index, "type"),
            ParamRef::Method(index) => (&self.method_args, index, "method"),
        };
        args.get(index as usize).ok_or_else(|| {
            ReachError::unbound_type_param(format!("{} parameter #{}", scope, index))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ReachErrorKind;
    use reach_ast::{Capability, TypeDefId};

    fn u8_val() -> TypeRef {
        TypeRef::nominal(TypeDefId::new(1), Capability::Val)
    }

    #[test]
    fn substitutes_type_and_method_params() {
        let array = TypeDefId::new(0);
        let subst = Substitution::new(&[u8_val()], &[TypeRef::tuple(vec![u8_val()])]);
        let ty = TypeRef::tuple(vec![
            TypeRef::applied(array, vec![TypeRef::type_param(0)], Capability::Ref),
            TypeRef::method_param(0),
        ]);

        let resolved = subst.apply(&ty).unwrap();
        assert!(resolved.is_concrete());
        assert_eq!(
            resolved,
            TypeRef::tuple(vec![
                TypeRef::applied(array, vec![u8_val()], Capability::Ref),
                TypeRef::tuple(vec![u8_val()]),
            ])
        );
    }

    #[test]
    fn method_params_can_be_kept() {
        let array = TypeDefId::new(0);
        let subst = Substitution::for_type(&[u8_val()]);
        let ty = TypeRef::applied(
            array,
            vec![TypeRef::type_param(0), TypeRef::method_param(0)],
            Capability::Ref,
        );
        assert_eq!(
            subst.apply_type_params(&ty).unwrap(),
            TypeRef::applied(array, vec![u8_val(), TypeRef::method_param(0)], Capability::Ref)
        );
        assert!(subst.apply(&ty).is_err());
    }

    #[test]
    fn unbound_parameter_is_an_error() {
        let subst = Substitution::for_type(&[u8_val()]);
        let err = subst.apply(&TypeRef::method_param(0)).unwrap_err();
        assert!(matches!(err.kind, ReachErrorKind::UnboundTypeParam { .. }));
    }
}
