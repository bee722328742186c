// capability.rs
//
// Reference capabilities attached to types at use sites.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Reference capability qualifying a type at a use site.
///
/// The capability is not part of a type's identity, but it selects which
/// method instantiation a call reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Iso,
    Trn,
    Ref,
    Val,
    Box,
    Tag,
}

impl Capability {
    pub const ALL: [Capability; 6] = [
        Capability::Iso,
        Capability::Trn,
        Capability::Ref,
        Capability::Val,
        Capability::Box,
        Capability::Tag,
    ];

    /// Keyword spelling of this capability.
    pub fn as_str(self) -> &'static str {
        match self {
            Capability::Iso => "iso",
            Capability::Trn => "trn",
            Capability::Ref => "ref",
            Capability::Val => "val",
            Capability::Box => "box",
            Capability::Tag => "tag",
        }
    }

    /// Parse a capability keyword.
    pub fn from_keyword(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|cap| cap.as_str() == s)
    }

    /// Whether a reference with this capability may be written through.
    pub fn is_mutable(self) -> bool {
        matches!(self, Capability::Iso | Capability::Trn | Capability::Ref)
    }

    /// Whether a reference with this capability can be used where `other`
    /// is expected.
    pub fn is_subcap(self, other: Capability) -> bool {
        use Capability::*;
        match (self, other) {
            (a, b) if a == b => true,
            (Iso, _) | (_, Tag) => true,
            (Trn, Ref | Val | Box) => true,
            (Ref | Val, Box) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
