// src/errors.rs
//! Reachability errors.
//!
//! The pass only runs on checked programs, so every error here is an
//! internal compiler error: a defect in an earlier phase or in the driver.
//! None of them is recoverable; the graph that produced one must be dropped.
//!
//! Error code range: E4xxx

use miette::Diagnostic;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReachErrorKind {
    /// A type reference names a definition the program does not contain
    UnknownTypeDef { def: u32 },

    /// A definition does not declare the requested method
    MissingMethod { ty: String, method: String },

    /// A method that needs a body has none
    MissingBody { method: String },

    /// A type parameter survived substitution
    UnboundTypeParam { context: String },

    /// Wrong number of type arguments for a definition or method
    TypeArgCount {
        name: String,
        expected: usize,
        found: usize,
    },

    /// A call receiver is not a nominal type
    InvalidReceiver { ty: String },

    /// An expression id that does not exist in the method body
    InvalidExpr { method: String, expr: u32 },

    /// A call site's kind disagrees with the method it targets
    CallKindMismatch {
        method: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A concrete subtype lacks a method its supertype dispatches
    MissingImplementation {
        ty: String,
        supertype: String,
        method: String,
    },

    /// The graph was already finalized
    AlreadyFinalized,

    /// The operation needs a finalized graph
    NotFinalized,

    /// An earlier failure left the graph incomplete
    Poisoned,

    /// Work queues were not empty at finalization
    PendingWork { types: usize, methods: usize, exprs: usize },

    /// A post-finalization invariant check failed
    Verification { message: String },

    /// Persisting or reloading the graph failed
    Serialization { message: String },
}

/// Reachability error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct ReachError {
    pub kind: ReachErrorKind,
}

pub type ReachResult<T> = Result<T, ReachError>;

impl ReachError {
    pub fn unknown_type_def(def: u32) -> Self {
        ReachErrorKind::UnknownTypeDef { def }.into()
    }

    pub fn missing_method(ty: impl Into<String>, method: impl Into<String>) -> Self {
        ReachErrorKind::MissingMethod {
            ty: ty.into(),
            method: method.into(),
        }
        .into()
    }

    pub fn missing_body(method: impl Into<String>) -> Self {
        ReachErrorKind::MissingBody {
            method: method.into(),
        }
        .into()
    }

    pub fn unbound_type_param(context: impl Into<String>) -> Self {
        ReachErrorKind::UnboundTypeParam {
            context: context.into(),
        }
        .into()
    }

    pub fn type_arg_count(name: impl Into<String>, expected: usize, found: usize) -> Self {
        ReachErrorKind::TypeArgCount {
            name: name.into(),
            expected,
            found,
        }
        .into()
    }

    pub fn invalid_receiver(ty: impl Into<String>) -> Self {
        ReachErrorKind::InvalidReceiver { ty: ty.into() }.into()
    }

    pub fn invalid_expr(method: impl Into<String>, expr: u32) -> Self {
        ReachErrorKind::InvalidExpr {
            method: method.into(),
            expr,
        }
        .into()
    }

    pub fn call_kind_mismatch(
        method: impl Into<String>,
        expected: &'static str,
        found: &'static str,
    ) -> Self {
        ReachErrorKind::CallKindMismatch {
            method: method.into(),
            expected,
            found,
        }
        .into()
    }

    pub fn missing_implementation(
        ty: impl Into<String>,
        supertype: impl Into<String>,
        method: impl Into<String>,
    ) -> Self {
        ReachErrorKind::MissingImplementation {
            ty: ty.into(),
            supertype: supertype.into(),
            method: method.into(),
        }
        .into()
    }

    pub fn verification(message: impl Into<String>) -> Self {
        ReachErrorKind::Verification {
            message: message.into(),
        }
        .into()
    }

    /// Wrap a serde error
    pub fn serialization(e: impl fmt::Display) -> Self {
        ReachErrorKind::Serialization {
            message: e.to_string(),
        }
        .into()
    }
}

impl From<ReachErrorKind> for ReachError {
    fn from(kind: ReachErrorKind) -> Self {
        ReachError { kind }
    }
}

impl Diagnostic for ReachError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code: &'static str = match &self.kind {
            ReachErrorKind::UnknownTypeDef { .. } => "E4001",
            ReachErrorKind::MissingMethod { .. } => "E4002",
            ReachErrorKind::MissingBody { .. } => "E4003",
            ReachErrorKind::UnboundTypeParam { .. } => "E4004",
            ReachErrorKind::TypeArgCount { .. } => "E4005",
            ReachErrorKind::InvalidReceiver { .. } => "E4006",
            ReachErrorKind::InvalidExpr { .. } => "E4007",
            ReachErrorKind::CallKindMismatch { .. } => "E4008",
            ReachErrorKind::MissingImplementation { .. } => "E4009",
            ReachErrorKind::AlreadyFinalized => "E4010",
            ReachErrorKind::NotFinalized => "E4011",
            ReachErrorKind::Poisoned => "E4012",
            ReachErrorKind::PendingWork { .. } => "E4013",
            ReachErrorKind::Verification { .. } => "E4014",
            ReachErrorKind::Serialization { .. } => "E4015",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match &self.kind {
            ReachErrorKind::Serialization { .. } => None,
            _ => Some(Box::new(
                "this is a compiler bug: the checked program handed to reachability is inconsistent",
            )),
        }
    }
}

impl fmt::Display for ReachErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReachErrorKind::UnknownTypeDef { def } => {
                write!(f, "unknown type definition #{}", def)
            }
            ReachErrorKind::MissingMethod { ty, method } => {
                write!(f, "{} has no method {}", ty, method)
            }
            ReachErrorKind::MissingBody { method } => {
                write!(f, "method {} has no body", method)
            }
            ReachErrorKind::UnboundTypeParam { context } => {
                write!(f, "unbound type parameter in {}", context)
            }
            ReachErrorKind::TypeArgCount {
                name,
                expected,
                found,
            } => {
                write!(
                    f,
                    "{} expects {} type argument(s), got {}",
                    name, expected, found
                )
            }
            ReachErrorKind::InvalidReceiver { ty } => {
                write!(f, "call receiver {} is not a nominal type", ty)
            }
            ReachErrorKind::InvalidExpr { method, expr } => {
                write!(f, "expression #{} does not exist in {}", expr, method)
            }
            ReachErrorKind::CallKindMismatch {
                method,
                expected,
                found,
            } => {
                write!(
                    f,
                    "{} is declared `{}` but called as `{}`",
                    method, expected, found
                )
            }
            ReachErrorKind::MissingImplementation {
                ty,
                supertype,
                method,
            } => {
                write!(
                    f,
                    "{} is a subtype of {} but does not implement {}",
                    ty, supertype, method
                )
            }
            ReachErrorKind::AlreadyFinalized => write!(f, "reach graph is already finalized"),
            ReachErrorKind::NotFinalized => write!(f, "reach graph is not finalized"),
            ReachErrorKind::Poisoned => {
                write!(f, "reach graph is incomplete after an earlier failure")
            }
            ReachErrorKind::PendingWork {
                types,
                methods,
                exprs,
            } => {
                write!(
                    f,
                    "finalize with pending work ({} types, {} methods, {} expressions)",
                    types, methods, exprs
                )
            }
            ReachErrorKind::Verification { message } => {
                write!(f, "reach graph verification failed: {}", message)
            }
            ReachErrorKind::Serialization { message } => {
                write!(f, "reach graph serialization failed: {}", message)
            }
        }
    }
}
