// types.rs
//
// Type expressions as produced by the type checker.

use serde::{Deserialize, Serialize};

use crate::{Capability, TypeDefId};

/// Reference to a type parameter in scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamRef {
    /// The i-th type parameter of the enclosing type definition
    Type(u32),
    /// The i-th type parameter of the enclosing method
    Method(u32),
}

/// A nominal type applied to type arguments, seen through a capability.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NominalRef {
    pub def: TypeDefId,
    pub args: Vec<TypeRef>,
    pub cap: Capability,
}

/// A type expression. Inside a generic body this may mention type
/// parameters; the reachability pass substitutes them away.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeRef {
    Nominal(NominalRef),
    Tuple(Vec<TypeRef>),
    Param(ParamRef),
}

impl TypeRef {
    /// A non-generic nominal type.
    pub fn nominal(def: TypeDefId, cap: Capability) -> Self {
        TypeRef::Nominal(NominalRef {
            def,
            args: Vec::new(),
            cap,
        })
    }

    /// A nominal type applied to `args`.
    pub fn applied(def: TypeDefId, args: Vec<TypeRef>, cap: Capability) -> Self {
        TypeRef::Nominal(NominalRef { def, args, cap })
    }

    pub fn tuple(elements: Vec<TypeRef>) -> Self {
        TypeRef::Tuple(elements)
    }

    pub fn type_param(index: u32) -> Self {
        TypeRef::Param(ParamRef::Type(index))
    }

    pub fn method_param(index: u32) -> Self {
        TypeRef::Param(ParamRef::Method(index))
    }

    /// Capability of a nominal type; tuples and parameters carry none.
    pub fn cap(&self) -> Option<Capability> {
        match self {
            TypeRef::Nominal(nominal) => Some(nominal.cap),
            TypeRef::Tuple(_) | TypeRef::Param(_) => None,
        }
    }

    /// The same type seen through a different capability.
    pub fn with_cap(&self, cap: Capability) -> Self {
        match self {
            TypeRef::Nominal(nominal) => TypeRef::Nominal(NominalRef {
                cap,
                ..nominal.clone()
            }),
            other => other.clone(),
        }
    }

    pub fn as_nominal(&self) -> Option<&NominalRef> {
        match self {
            TypeRef::Nominal(nominal) => Some(nominal),
            _ => None,
        }
    }

    /// True when no type parameter occurs anywhere in this type.
    pub fn is_concrete(&self) -> bool {
        let mut stack = vec![self];
        while let Some(ty) = stack.pop() {
            match ty {
                TypeRef::Nominal(nominal) => stack.extend(nominal.args.iter()),
                TypeRef::Tuple(elements) => stack.extend(elements.iter()),
                TypeRef::Param(_) => return false,
            }
        }
        true
    }
}
