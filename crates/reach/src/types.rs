// src/types.rs
//
// Reachable type records.

use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxBuildHasher;
use serde::{Deserialize, Serialize};

use crate::ids::{MethodId, MethodNameId, TypeId};
use reach_ast::{TypeDefId, TypeDefKind, TypeRef};

/// Underlying type-system kind of a reachable type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Primitive,
    Numeric,
    Struct,
    Class,
    Actor,
    Trait,
    Interface,
    Tuple,
}

/// Mutually exclusive counting category used by descriptor table layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeCategory {
    Object,
    Numeric,
    Tuple,
    Trait,
}

impl TypeKind {
    pub fn from_def(kind: TypeDefKind) -> Self {
        match kind {
            TypeDefKind::Primitive => TypeKind::Primitive,
            TypeDefKind::Numeric => TypeKind::Numeric,
            TypeDefKind::Struct => TypeKind::Struct,
            TypeDefKind::Class => TypeKind::Class,
            TypeDefKind::Actor => TypeKind::Actor,
            TypeDefKind::Trait => TypeKind::Trait,
            TypeDefKind::Interface => TypeKind::Interface,
        }
    }

    pub fn category(self) -> TypeCategory {
        match self {
            TypeKind::Primitive | TypeKind::Struct | TypeKind::Class | TypeKind::Actor => {
                TypeCategory::Object
            }
            TypeKind::Numeric => TypeCategory::Numeric,
            TypeKind::Tuple => TypeCategory::Tuple,
            TypeKind::Trait | TypeKind::Interface => TypeCategory::Trait,
        }
    }

    /// Traits and interfaces: reached only through dynamic dispatch.
    pub fn is_abstract(self) -> bool {
        self.category() == TypeCategory::Trait
    }

    /// Stored inline, boxed when viewed through an abstract type.
    pub fn can_be_boxed(self) -> bool {
        matches!(self, TypeKind::Numeric | TypeKind::Tuple)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TypeKind::Primitive => "primitive",
            TypeKind::Numeric => "numeric",
            TypeKind::Struct => "struct",
            TypeKind::Class => "class",
            TypeKind::Actor => "actor",
            TypeKind::Trait => "trait",
            TypeKind::Interface => "interface",
            TypeKind::Tuple => "tuple",
        }
    }
}

/// Structure of a concrete type: its definition and arguments, or its
/// tuple elements. All contained types are concrete.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeShape {
    Nominal { def: TypeDefId, args: Vec<TypeRef> },
    Tuple(Vec<TypeRef>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReachableField {
    pub name: String,
    pub ty: TypeId,
    /// Stored inline in the object rather than by reference
    pub embed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReachableType {
    /// Display name, e.g. `Array[U8 val]`
    pub name: String,
    /// Interning key and linkage prefix, e.g. `Array_1_U8_val`
    pub mangle: String,
    pub kind: TypeKind,
    pub shape: TypeShape,
    /// Sequential id, assigned by the finalizer
    pub type_id: Option<u32>,
    pub can_be_boxed: bool,
    pub is_trait: bool,
    /// Known concrete subtypes; only populated for abstract types
    pub subtypes: IndexSet<TypeId, FxBuildHasher>,
    pub fields: Vec<ReachableField>,
    /// Method name buckets, keyed by method name
    pub methods: IndexMap<String, MethodNameId, FxBuildHasher>,
    /// Number of dispatch slots this type's descriptor needs
    pub vtable_size: u32,
    /// The single method of a bare type, callable without an object
    #[serde(default)]
    pub bare_method: Option<MethodId>,
}

impl ReachableType {
    pub(crate) fn new(name: String, mangle: String, kind: TypeKind, shape: TypeShape) -> Self {
        Self {
            name,
            mangle,
            kind,
            shape,
            type_id: None,
            can_be_boxed: kind.can_be_boxed(),
            is_trait: kind.is_abstract(),
            subtypes: IndexSet::default(),
            fields: Vec::new(),
            methods: IndexMap::default(),
            vtable_size: 0,
            bare_method: None,
        }
    }

    /// Definition of a nominal type.
    pub fn def(&self) -> Option<TypeDefId> {
        match &self.shape {
            TypeShape::Nominal { def, .. } => Some(*def),
            TypeShape::Tuple(_) => None,
        }
    }

    /// Type arguments of a nominal type; empty for tuples.
    pub fn type_args(&self) -> &[TypeRef] {
        match &self.shape {
            TypeShape::Nominal { args, .. } => args,
            TypeShape::Tuple(_) => &[],
        }
    }

    pub fn is_tuple(&self) -> bool {
        matches!(self.shape, TypeShape::Tuple(_))
    }
}
