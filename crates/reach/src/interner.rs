// src/interner.rs
//
// Canonical records for concrete types.
//
// A type is identified by its mangled name, which covers the definition and
// the full type-argument tuple (including argument capabilities) but not the
// outer capability. Interning only creates the record; type arguments,
// fields, subtype links and lifecycle methods are filled in when the type
// queue reaches it.

use crate::engine::Reacher;
use crate::errors::{ReachError, ReachResult};
use crate::ids::TypeId;
use crate::mangle::{type_display, type_mangle};
use crate::subst::Substitution;
use crate::subtype;
use crate::types::{ReachableField, ReachableType, TypeKind, TypeShape};
use reach_ast::TypeRef;

/// Compiler-synthesized methods reached whenever their type is, if declared.
pub const LIFECYCLE_METHODS: [&str; 6] = [
    "_init",
    "_final",
    "_event_notify",
    "_serialise_space",
    "_serialise",
    "_deserialise",
];

/// Identity and hashing support for values viewed through abstract types.
pub const INTERNAL_METHODS: [&str; 2] = ["__is", "__digestof"];

impl Reacher<'_, '_> {
    /// Lookup-or-create the record for a concrete type.
    pub(crate) fn intern(&mut self, ty: &TypeRef) -> ReachResult<TypeId> {
        let mangle = type_mangle(self.program, ty)?;
        if let Some(id) = self.graph.type_id(&mangle) {
            return Ok(id);
        }

        let (kind, shape) = match ty {
            TypeRef::Nominal(nominal) => {
                let def = self.def(nominal.def)?;
                (
                    TypeKind::from_def(def.kind),
                    TypeShape::Nominal {
                        def: nominal.def,
                        args: nominal.args.clone(),
                    },
                )
            }
            TypeRef::Tuple(elements) => (TypeKind::Tuple, TypeShape::Tuple(elements.clone())),
            TypeRef::Param(_) => return Err(ReachError::unbound_type_param("interned type")),
        };
        let name = type_display(self.program, ty)?;
        let id = TypeId::new(self.graph.type_count() as u32);
        tracing::debug!(ty = %name, kind = kind.as_str(), id = id.index(), "new reachable type");

        self.graph
            .types
            .insert(mangle.clone(), ReachableType::new(name, mangle, kind, shape));
        self.graph.queues.types.push_back(id);
        Ok(id)
    }

    pub(crate) fn complete_type(&mut self, id: TypeId) -> ReachResult<()> {
        self.intern_fields(id)?;
        self.link_subtypes(id)?;
        self.reach_lifecycle(id)?;
        self.reach_bare(id)
    }

    fn intern_fields(&mut self, id: TypeId) -> ReachResult<()> {
        let shape = self.graph.ty(id).shape.clone();
        let mut fields = Vec::new();
        match &shape {
            TypeShape::Nominal { def, args } => {
                // Type arguments are reachable in their own right.
                for arg in args {
                    self.intern(arg)?;
                }
                let def = self.def(*def)?;
                let subst = Substitution::for_type(args);
                for field in &def.fields {
                    let ty = self.intern(&subst.apply(&field.ty)?)?;
                    fields.push(ReachableField {
                        name: self.program.resolve(field.name).to_string(),
                        ty,
                        embed: field.embed,
                    });
                }
            }
            TypeShape::Tuple(elements) => {
                for (i, element) in elements.iter().enumerate() {
                    let ty = self.intern(element)?;
                    fields.push(ReachableField {
                        name: format!("_{}", i + 1),
                        ty,
                        embed: false,
                    });
                }
            }
        }
        self.graph.ty_mut(id).fields = fields;
        Ok(())
    }

    /// Link `id` with every known type on the other side of the abstract /
    /// concrete divide it is related to.
    fn link_subtypes(&mut self, id: TypeId) -> ReachResult<()> {
        let is_abstract = self.graph.ty(id).is_trait;
        let candidates: Vec<TypeId> = self
            .graph
            .type_ids()
            .filter(|other| *other != id && self.graph.ty(*other).is_trait != is_abstract)
            .collect();

        for other in candidates {
            let (sub, sup) = if is_abstract { (other, id) } else { (id, other) };
            if subtype::is_subtype(self.program, self.graph.ty(sub), self.graph.ty(sup))? {
                self.link(sub, sup)?;
            }
        }
        Ok(())
    }

    fn reach_lifecycle(&mut self, id: TypeId) -> ReachResult<()> {
        let Some(def) = self.graph.ty(id).def() else {
            return Ok(());
        };
        let def = self.def(def)?;
        for name in LIFECYCLE_METHODS {
            let Some(sym) = self.program.symbol(name) else {
                continue;
            };
            if let Some((_, decl)) = def.method(sym) {
                self.resolve_method(id, decl.cap, name, &[])?;
            }
        }
        Ok(())
    }

    /// The value of a bare lambda type is a plain function pointer, so its one
    /// method is needed as soon as the type is.
    fn reach_bare(&mut self, id: TypeId) -> ReachResult<()> {
        let Some(def) = self.graph.ty(id).def() else {
            return Ok(());
        };
        let def = self.def(def)?;
        if !def.is_bare() {
            return Ok(());
        }
        // Primitives may declare several bare methods; only a lambda's
        // single method stands for the type's value.
        let [method] = def.methods.as_slice() else {
            return Ok(());
        };
        if !method.type_params.is_empty() {
            return Ok(());
        }
        let name = self.program.resolve(method.name);
        let bare = self.resolve_method(id, method.cap, name, &[])?;
        tracing::trace!(ty = %self.graph.ty(id).name, method = name, "bare method");
        self.graph.ty_mut(id).bare_method = Some(bare);
        Ok(())
    }
}
