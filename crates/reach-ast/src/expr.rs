// expr.rs
//
// Method bodies. A body is a flat arena of typed expression nodes; children
// are referenced by ExprId so consumers can scan a body without recursing.

use serde::{Deserialize, Serialize};

use crate::{ExprId, Symbol, TypeRef};

/// How a call site dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallKind {
    /// Synchronous method call
    Fun,
    /// Asynchronous message send to a behaviour
    Be,
    /// Constructor call
    New,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Int(i128),
    Float(f64),
    Bool(bool),
    String(String),
}

/// A call-like expression. `receiver_ty` is the static type of the receiver,
/// including its capability; for constructor calls it is the type being built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallExpr {
    pub kind: CallKind,
    pub receiver: Option<ExprId>,
    pub receiver_ty: TypeRef,
    pub method: Symbol,
    pub type_args: Vec<TypeRef>,
    pub args: Vec<ExprId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchArm {
    /// Type tested by this arm's capture pattern
    pub pattern: TypeRef,
    pub body: ExprId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    Literal(Literal),
    Local(Symbol),
    This,
    Let {
        name: Symbol,
        value: ExprId,
    },
    FieldRead {
        object: ExprId,
        field: Symbol,
    },
    FieldWrite {
        object: ExprId,
        field: Symbol,
        value: ExprId,
    },
    Tuple(Vec<ExprId>),
    Seq(Vec<ExprId>),
    If {
        cond: ExprId,
        then_branch: ExprId,
        else_branch: Option<ExprId>,
    },
    While {
        cond: ExprId,
        body: ExprId,
    },
    Match {
        scrutinee: ExprId,
        arms: Vec<MatchArm>,
        else_branch: Option<ExprId>,
    },
    Return(Option<ExprId>),
    Call(Box<CallExpr>),
}

/// Typed expression node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    /// Static type assigned by the type checker, if the expression has one
    pub ty: Option<TypeRef>,
}

impl Expr {
    pub fn as_call(&self) -> Option<&CallExpr> {
        match &self.kind {
            ExprKind::Call(call) => Some(call),
            _ => None,
        }
    }
}

/// A method body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    exprs: Vec<Expr>,
    root: ExprId,
}

impl Body {
    pub(crate) fn from_parts(exprs: Vec<Expr>, root: ExprId) -> Self {
        Self { exprs, root }
    }

    pub fn root(&self) -> ExprId {
        self.root
    }

    pub fn get(&self, id: ExprId) -> Option<&Expr> {
        self.exprs.get(id.index() as usize)
    }

    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }

    /// All nodes in arena order.
    pub fn iter(&self) -> impl Iterator<Item = (ExprId, &Expr)> {
        self.exprs
            .iter()
            .enumerate()
            .map(|(index, expr)| (ExprId::new(index as u32), expr))
    }
}
