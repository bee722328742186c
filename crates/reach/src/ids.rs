//! Handles for records owned by the reach graph.
//!
//! All cross references between graph records go through these ids; the
//! graph's arenas are the only owners.

use serde::{Deserialize, Serialize};

macro_rules! define_graph_id {
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

            pub(crate) fn slot(self) -> usize {
                self.0 as usize
            }
        }
    };
}

define_graph_id! {
    /// A reachable concrete type, in discovery order
    pub struct TypeId;
}

define_graph_id! {
    /// A reachable method instantiation
    pub struct MethodId;
}

define_graph_id! {
    /// A (type, method name) bucket
    pub struct MethodNameId;
}
