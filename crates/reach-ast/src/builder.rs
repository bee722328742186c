//! Fluent construction of checked programs.
//!
//! The type checker lowers into these builders; they are also the
//! fixture language for the reachability tests.
//!
//! # Example
//! ```ignore
//! let mut b = ProgramBuilder::new();
//! let main = b.type_def("Main", TypeDefKind::Actor);
//! let create = b.constructor("create", Capability::Tag).body(body);
//! b.add_method(main, create);
//! let program = b.build();
//! ```

use crate::{
    Body, CallExpr, CallKind, Capability, Expr, ExprId, ExprKind, FieldDecl, Interner, Literal,
    MatchArm, MethodDecl, MethodKind, MethodRef, ParamDecl, Program, Symbol, TypeDef,
    TypeDefId, TypeDefKind, TypeRef,
};

/// Name of the primitive used as the result of methods that declare none.
pub const NONE_TYPE_NAME: &str = "None";

#[derive(Debug, Default)]
pub struct ProgramBuilder {
    interner: Interner,
    defs: Vec<TypeDef>,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, s: &str) -> Symbol {
        self.interner.intern(s)
    }

    pub fn type_def(&mut self, name: &str, kind: TypeDefKind) -> TypeDefId {
        self.generic_type_def(name, kind, &[])
    }

    pub fn generic_type_def(
        &mut self,
        name: &str,
        kind: TypeDefKind,
        type_params: &[&str],
    ) -> TypeDefId {
        let id = TypeDefId::new(self.defs.len() as u32);
        let name = self.interner.intern(name);
        let type_params = type_params.iter().map(|p| self.interner.intern(p)).collect();
        self.defs.push(TypeDef {
            id,
            name,
            kind,
            type_params,
            provides: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        });
        id
    }

    /// The `None` primitive, declared on first use.
    pub fn none_type(&mut self) -> TypeDefId {
        let sym = self.interner.intern(NONE_TYPE_NAME);
        if let Some(def) = self.defs.iter().find(|d| d.name == sym) {
            return def.id;
        }
        self.type_def(NONE_TYPE_NAME, TypeDefKind::Primitive)
    }

    pub fn provides(&mut self, def: TypeDefId, supertype: TypeRef) -> &mut Self {
        self.def_mut(def).provides.push(supertype);
        self
    }

    pub fn field(&mut self, def: TypeDefId, name: &str, ty: TypeRef, embed: bool) -> &mut Self {
        let name = self.interner.intern(name);
        self.def_mut(def).fields.push(FieldDecl { name, ty, embed });
        self
    }

    pub fn fun(&mut self, name: &str, cap: Capability) -> MethodBuilder {
        MethodBuilder::new(self.interner.intern(name), MethodKind::Fun, cap)
    }

    /// Behaviours are always invoked through a `tag` receiver.
    pub fn be(&mut self, name: &str) -> MethodBuilder {
        MethodBuilder::new(self.interner.intern(name), MethodKind::Be, Capability::Tag)
    }

    pub fn constructor(&mut self, name: &str, cap: Capability) -> MethodBuilder {
        MethodBuilder::new(self.interner.intern(name), MethodKind::New, cap)
    }

    /// Add a method to `def`, filling in the default result type when the
    /// builder did not set one: constructors return the receiver type under
    /// their capability, behaviours return the receiver as `tag`, and
    /// functions return `None`.
    pub fn add_method(&mut self, def: TypeDefId, method: MethodBuilder) -> MethodRef {
        let MethodBuilder { mut decl, result } = method;
        decl.result = match result {
            Some(ty) => ty,
            None => match decl.kind {
                MethodKind::New => self.def_mut(def).self_type(decl.cap),
                MethodKind::Be => self.def_mut(def).self_type(Capability::Tag),
                MethodKind::Fun => TypeRef::nominal(self.none_type(), Capability::Val),
            },
        };
        let methods = &mut self.def_mut(def).methods;
        methods.push(decl);
        MethodRef {
            def,
            index: (methods.len() - 1) as u32,
        }
    }

    pub fn build(self) -> Program {
        Program::new(self.interner, self.defs)
    }

    fn def_mut(&mut self, def: TypeDefId) -> &mut TypeDef {
        &mut self.defs[def.index() as usize]
    }
}

/// Builder for a single method declaration.
#[derive(Debug, Clone)]
pub struct MethodBuilder {
    decl: MethodDecl,
    result: Option<TypeRef>,
}

impl MethodBuilder {
    pub fn new(name: Symbol, kind: MethodKind, cap: Capability) -> Self {
        Self {
            decl: MethodDecl {
                name,
                kind,
                cap,
                type_params: Vec::new(),
                params: Vec::new(),
                // Placeholder, replaced in ProgramBuilder::add_method
                result: TypeRef::tuple(Vec::new()),
                body: None,
                intrinsic: false,
                internal: false,
                bare: false,
            },
            result: None,
        }
    }

    pub fn type_params(mut self, params: Vec<Symbol>) -> Self {
        self.decl.type_params = params;
        self
    }

    pub fn param(mut self, name: Symbol, ty: TypeRef) -> Self {
        self.decl.params.push(ParamDecl { name, ty });
        self
    }

    pub fn returns(mut self, ty: TypeRef) -> Self {
        self.result = Some(ty);
        self
    }

    pub fn body(mut self, body: Body) -> Self {
        self.decl.body = Some(body);
        self
    }

    pub fn intrinsic(mut self) -> Self {
        self.decl.intrinsic = true;
        self
    }

    /// A bare method has no receiver, so it is always reached as `val`.
    pub fn bare(mut self) -> Self {
        self.decl.bare = true;
        self.decl.cap = Capability::Val;
        self
    }

    pub fn internal(mut self) -> Self {
        self.decl.internal = true;
        self.decl.intrinsic = true;
        self
    }
}

/// Builder for a method body arena.
#[derive(Debug, Default)]
pub struct BodyBuilder {
    exprs: Vec<Expr>,
}

impl BodyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: ExprKind, ty: Option<TypeRef>) -> ExprId {
        let id = ExprId::new(self.exprs.len() as u32);
        self.exprs.push(Expr { kind, ty });
        id
    }

    pub fn literal(&mut self, literal: Literal, ty: TypeRef) -> ExprId {
        self.push(ExprKind::Literal(literal), Some(ty))
    }

    pub fn this(&mut self, ty: TypeRef) -> ExprId {
        self.push(ExprKind::This, Some(ty))
    }

    pub fn local(&mut self, name: Symbol, ty: TypeRef) -> ExprId {
        self.push(ExprKind::Local(name), Some(ty))
    }

    pub fn bind(&mut self, name: Symbol, value: ExprId, ty: TypeRef) -> ExprId {
        self.push(ExprKind::Let { name, value }, Some(ty))
    }

    pub fn field_read(&mut self, object: ExprId, field: Symbol, ty: TypeRef) -> ExprId {
        self.push(ExprKind::FieldRead { object, field }, Some(ty))
    }

    pub fn tuple(&mut self, elements: Vec<ExprId>, ty: TypeRef) -> ExprId {
        self.push(ExprKind::Tuple(elements), Some(ty))
    }

    pub fn seq(&mut self, items: Vec<ExprId>) -> ExprId {
        self.push(ExprKind::Seq(items), None)
    }

    pub fn if_else(&mut self, cond: ExprId, then_branch: ExprId, else_branch: Option<ExprId>) -> ExprId {
        self.push(
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            },
            None,
        )
    }

    pub fn while_loop(&mut self, cond: ExprId, body: ExprId) -> ExprId {
        self.push(ExprKind::While { cond, body }, None)
    }

    pub fn match_type(
        &mut self,
        scrutinee: ExprId,
        arms: Vec<MatchArm>,
        else_branch: Option<ExprId>,
    ) -> ExprId {
        self.push(
            ExprKind::Match {
                scrutinee,
                arms,
                else_branch,
            },
            None,
        )
    }

    /// Synchronous call of `method` on a receiver of type `receiver_ty`.
    pub fn call(
        &mut self,
        receiver: Option<ExprId>,
        receiver_ty: TypeRef,
        method: Symbol,
        args: Vec<ExprId>,
    ) -> ExprId {
        self.call_expr(CallExpr {
            kind: CallKind::Fun,
            receiver,
            receiver_ty,
            method,
            type_args: Vec::new(),
            args,
        })
    }

    /// Synchronous call with explicit method type arguments.
    pub fn call_generic(
        &mut self,
        receiver: Option<ExprId>,
        receiver_ty: TypeRef,
        method: Symbol,
        type_args: Vec<TypeRef>,
        args: Vec<ExprId>,
    ) -> ExprId {
        self.call_expr(CallExpr {
            kind: CallKind::Fun,
            receiver,
            receiver_ty,
            method,
            type_args,
            args,
        })
    }

    /// Asynchronous message send to a behaviour.
    pub fn send(
        &mut self,
        receiver: Option<ExprId>,
        receiver_ty: TypeRef,
        method: Symbol,
        args: Vec<ExprId>,
    ) -> ExprId {
        self.call_expr(CallExpr {
            kind: CallKind::Be,
            receiver,
            receiver_ty,
            method,
            type_args: Vec::new(),
            args,
        })
    }

    /// Constructor call producing a value of type `ty`.
    pub fn construct(&mut self, ty: TypeRef, constructor: Symbol, args: Vec<ExprId>) -> ExprId {
        self.call_expr(CallExpr {
            kind: CallKind::New,
            receiver: None,
            receiver_ty: ty,
            method: constructor,
            type_args: Vec::new(),
            args,
        })
    }

    pub fn call_expr(&mut self, call: CallExpr) -> ExprId {
        self.push(ExprKind::Call(Box::new(call)), None)
    }

    pub fn finish(self, root: ExprId) -> Body {
        Body::from_parts(self.exprs, root)
    }

    /// Finish with a sequence of `items` as the root.
    pub fn finish_seq(mut self, items: Vec<ExprId>) -> Body {
        let root = self.seq(items);
        self.finish(root)
    }
}
