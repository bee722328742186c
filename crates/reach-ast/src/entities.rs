//! Identity handles for program entities.
//!
//! Type definitions are addressed by `TypeDefId` (index into `Program`),
//! expressions by `ExprId` (index into the owning `Body`).

use serde::{Deserialize, Serialize};

macro_rules! define_entity_id {
    ($(#[$meta:meta])* $vis:vis struct $name:ident;) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        $vis struct $name(u32);

        impl $name {
            pub fn new(index: u32) -> Self {
                Self(index)
            }

            pub fn index(self) -> u32 {
                self.0
            }
        }
    };
}

define_entity_id! {
    /// Identity for a type definition (primitive, class, actor, trait, ...)
    pub struct TypeDefId;
}

define_entity_id! {
    /// Identity for an expression node within one method body
    pub struct ExprId;
}

/// Reference to a method declaration: the defining type plus the method's
/// position in that type's declaration list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodRef {
    pub def: TypeDefId,
    pub index: u32,
}
