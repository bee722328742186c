//! Typed program model consumed by the reachability pass.
//!
//! Every type reference here has already been checked and carries fully
//! resolved type arguments; inside generic bodies types may still name the
//! enclosing definition's or method's type parameters (`ParamRef`).

mod builder;
mod capability;
mod decl;
mod entities;
mod expr;
mod intern;
mod symbol;
mod types;

pub use builder::{BodyBuilder, MethodBuilder, NONE_TYPE_NAME, ProgramBuilder};
pub use capability::Capability;
pub use decl::{FieldDecl, MethodDecl, MethodKind, ParamDecl, Program, TypeDef, TypeDefKind};
pub use entities::{ExprId, MethodRef, TypeDefId};
pub use expr::{Body, CallExpr, CallKind, Expr, ExprKind, Literal, MatchArm};
pub use intern::Interner;
pub use symbol::Symbol;
pub use types::{NominalRef, ParamRef, TypeRef};
