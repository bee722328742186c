//! Interned identifiers.

use serde::{Deserialize, Serialize};

/// An identifier of the checked program: type, method, field, parameter or
/// type parameter name. Only meaningful together with the [`Interner`]
/// that produced it.
///
/// [`Interner`]: crate::Interner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Symbol(u32);

impl Symbol {
    pub(crate) fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> u32 {
        self.0
    }
}
