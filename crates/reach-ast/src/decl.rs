// decl.rs
//
// Type and method declarations of a checked program.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::{Body, Capability, ExprId, Interner, MethodRef, Symbol, TypeDefId, TypeRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeDefKind {
    /// Value-less singleton type (`primitive None`)
    Primitive,
    /// Machine word: integers, floats and Bool
    Numeric,
    Struct,
    Class,
    Actor,
    /// Nominal abstract type
    Trait,
    /// Structural abstract type
    Interface,
}

impl TypeDefKind {
    /// Traits and interfaces have no instances of their own.
    pub fn is_abstract(self) -> bool {
        matches!(self, TypeDefKind::Trait | TypeDefKind::Interface)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodKind {
    Fun,
    Be,
    New,
}

impl MethodKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MethodKind::Fun => "fun",
            MethodKind::Be => "be",
            MethodKind::New => "new",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: Symbol,
    pub ty: TypeRef,
    /// Stored inline in the containing object rather than by reference
    pub embed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDecl {
    pub name: Symbol,
    pub ty: TypeRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: Symbol,
    pub kind: MethodKind,
    /// Receiver capability declared on the method
    pub cap: Capability,
    pub type_params: Vec<Symbol>,
    pub params: Vec<ParamDecl>,
    pub result: TypeRef,
    pub body: Option<Body>,
    /// The compiler supplies the implementation
    pub intrinsic: bool,
    /// Compiler supplied and never visible to user code
    pub internal: bool,
    /// Called without a receiver object, e.g. through a C function pointer
    #[serde(default)]
    pub bare: bool,
}

impl MethodDecl {
    pub fn expr(&self, id: ExprId) -> Option<&crate::Expr> {
        self.body.as_ref().and_then(|body| body.get(id))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDef {
    pub id: TypeDefId,
    pub name: Symbol,
    pub kind: TypeDefKind,
    pub type_params: Vec<Symbol>,
    /// Declared nominal supertypes; may mention this definition's type params
    pub provides: Vec<TypeRef>,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<MethodDecl>,
}

impl TypeDef {
    /// Position and declaration of the method called `name`.
    pub fn method(&self, name: Symbol) -> Option<(u32, &MethodDecl)> {
        self.methods
            .iter()
            .enumerate()
            .find(|(_, m)| m.name == name)
            .map(|(index, m)| (index as u32, m))
    }

    pub fn has_method(&self, name: Symbol) -> bool {
        self.methods.iter().any(|m| m.name == name)
    }

    /// A bare type (the type of a bare lambda) declares only bare methods.
    pub fn is_bare(&self) -> bool {
        !self.methods.is_empty() && self.methods.iter().all(|m| m.bare)
    }

    /// The type as seen from inside its own definition: applied to its own
    /// type parameters.
    pub fn self_type(&self, cap: Capability) -> TypeRef {
        let args = (0..self.type_params.len() as u32)
            .map(TypeRef::type_param)
            .collect();
        TypeRef::applied(self.id, args, cap)
    }
}

/// A fully type-checked program.
#[derive(Debug, Clone, Default)]
pub struct Program {
    interner: Interner,
    type_defs: Vec<TypeDef>,
    by_name: FxHashMap<Symbol, TypeDefId>,
}

impl Program {
    pub fn new(interner: Interner, type_defs: Vec<TypeDef>) -> Self {
        let by_name = type_defs.iter().map(|def| (def.name, def.id)).collect();
        Self {
            interner,
            type_defs,
            by_name,
        }
    }

    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    pub fn resolve(&self, sym: Symbol) -> &str {
        self.interner.resolve(sym)
    }

    pub fn symbol(&self, s: &str) -> Option<Symbol> {
        self.interner.lookup(s)
    }

    pub fn type_def(&self, id: TypeDefId) -> Option<&TypeDef> {
        self.type_defs.get(id.index() as usize)
    }

    pub fn type_def_by_name(&self, name: &str) -> Option<&TypeDef> {
        let sym = self.interner.lookup(name)?;
        let id = self.by_name.get(&sym)?;
        self.type_def(*id)
    }

    pub fn type_defs(&self) -> &[TypeDef] {
        &self.type_defs
    }

    pub fn method_decl(&self, method: MethodRef) -> Option<&MethodDecl> {
        self.type_def(method.def)?
            .methods
            .get(method.index as usize)
    }
}
