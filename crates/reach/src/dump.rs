// src/dump.rs
//
// Human readable listing of a reach graph, for debugging the pass. The
// format has no stability guarantees.

use std::fmt;

use crate::graph::ReachGraph;
use crate::ids::MethodId;
use crate::methods::ReachableMethod;

/// Display adapter over a graph.
pub struct GraphDump<'a>(pub &'a ReachGraph);

impl ReachGraph {
    pub fn dump(&self) -> String {
        GraphDump(self).to_string()
    }
}

impl fmt::Display for GraphDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let graph = self.0;
        let counts = graph.counts();
        writeln!(
            f,
            "reach: {} types (object {}, numeric {}, tuple {}, trait {}), {} methods, {} slots",
            graph.type_count(),
            counts.object,
            counts.numeric,
            counts.tuple,
            counts.traits,
            graph.method_count(),
            graph.slot_count()
        )?;

        for (_, ty) in graph.types() {
            write!(f, "{} {} [{}]", ty.kind.as_str(), ty.name, ty.mangle)?;
            match ty.type_id {
                Some(type_id) => write!(f, " id={}", type_id)?,
                None => write!(f, " id=?")?,
            }
            writeln!(f, " vtable={}", ty.vtable_size)?;

            if !ty.subtypes.is_empty() {
                let names: Vec<&str> = ty
                    .subtypes
                    .iter()
                    .map(|sub| graph.ty(*sub).name.as_str())
                    .collect();
                writeln!(f, "  subtypes: {}", names.join(", "))?;
            }
            if let Some(bare) = ty.bare_method {
                writeln!(f, "  bare: {}", graph.method(bare).mangled_name)?;
            }
            for field in &ty.fields {
                let embed = if field.embed { " embed" } else { "" };
                writeln!(f, "  field {}: {}{}", field.name, graph.ty(field.ty).name, embed)?;
            }
            for bucket in ty.methods.values() {
                let bucket = graph.method_name_by_id(*bucket);
                let mut listed: Vec<MethodId> = bucket.methods.values().copied().collect();
                for id in bucket.mangled.values() {
                    if !listed.contains(id) {
                        listed.push(*id);
                    }
                }
                for id in listed {
                    write_method(f, graph, graph.method(id))?;
                }
            }
        }
        Ok(())
    }
}

fn write_method(f: &mut fmt::Formatter<'_>, graph: &ReachGraph, method: &ReachableMethod) -> fmt::Result {
    write!(f, "  {} {}", method.kind.as_str(), method.mangled_name)?;
    if let Some(slot) = method.vtable_index {
        write!(f, " slot={}", slot)?;
    }
    if method.is_subordinate() {
        write!(f, " body={}", graph.method(method.body_group).mangled_name)?;
    }
    for (flag, set) in [
        ("intrinsic", method.intrinsic),
        ("internal", method.internal),
        ("forwarding", method.forwarding),
    ] {
        if set {
            write!(f, " {}", flag)?;
        }
    }
    writeln!(f)
}
