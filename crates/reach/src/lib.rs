//! Reachability and monomorphization.
//!
//! Starting from one or more entry methods of a checked [`reach_ast::Program`],
//! discovers every concrete type and every method instantiation (type,
//! receiver capability, type arguments) the program can execute, assigns
//! dispatch slots for methods called through traits and interfaces, and
//! produces the [`ReachGraph`] code generation iterates over.
//!
//! ```text
//! let mut graph = ReachGraph::new();
//! graph.reach(&program, &main_ty, "create", &[], &options)?;
//! graph.finalize(&options)?;
//! ```

mod dump;
mod engine;
mod errors;
mod finalize;
mod graph;
mod ids;
mod interner;
mod mangle;
mod methods;
mod options;
mod registry;
pub mod side_table;
mod subst;
mod subtype;
mod types;
mod vtable;

pub use dump::GraphDump;
pub use errors::{ReachError, ReachErrorKind, ReachResult};
pub use graph::{ReachGraph, TypeCounts};
pub use ids::{MethodId, MethodNameId, TypeId};
pub use interner::{INTERNAL_METHODS, LIFECYCLE_METHODS};
pub use methods::{MethodState, ReachableMethod, ReachableMethodName, ReachableParam};
pub use options::ReachOptions;
pub use side_table::{MethodTable, SideTable, TypeTable};
pub use types::{ReachableField, ReachableType, TypeCategory, TypeKind, TypeShape};
