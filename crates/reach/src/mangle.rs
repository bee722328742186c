// src/mangle.rs
//
// Canonical names for reachable types and methods.
//
// Type mangles are the interning key and the linkage prefix of every method
// on the type. The encoding is injective for well-formed programs: type
// names never start with a digit, so `_<n>` always introduces an argument
// count, and capability keywords are never type names.
//
//   A                   non-generic nominal
//   Array_1_U8_val      nominal with one argument (`U8 val`)
//   _2_U32_val_Bool_val tuple of two elements
//
// The outer capability of a type is not part of its identity; capabilities
// of type arguments are.

use crate::errors::{ReachError, ReachResult};
use reach_ast::{Capability, Program, TypeDef, TypeRef};

pub(crate) fn type_mangle(program: &Program, ty: &TypeRef) -> ReachResult<String> {
    let mut out = String::new();
    write_type(program, ty, &mut out)?;
    Ok(out)
}

/// Mangle suffix for a method's type arguments: empty if there are none.
pub(crate) fn type_args_suffix(program: &Program, args: &[TypeRef]) -> ReachResult<String> {
    let mut out = String::new();
    write_args(program, args, &mut out)?;
    Ok(out)
}

/// Human readable type name: `Array[U8 val]`, `(U32 val, Bool val)`.
pub(crate) fn type_display(program: &Program, ty: &TypeRef) -> ReachResult<String> {
    let mut out = String::new();
    write_display(program, ty, &mut out)?;
    Ok(out)
}

/// Human readable method type arguments: empty, or `[U8 val, String val]`.
pub(crate) fn type_args_display(program: &Program, args: &[TypeRef]) -> ReachResult<String> {
    if args.is_empty() {
        return Ok(String::new());
    }
    let mut out = String::from("[");
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_display_arg(program, arg, &mut out)?;
    }
    out.push(']');
    Ok(out)
}

/// Name of a method instantiation within its type: `greet_box`,
/// `map_ref_1_String_val`.
pub(crate) fn method_local_name(name: &str, cap: Capability, type_args_suffix: &str) -> String {
    format!("{}_{}{}", name, cap.as_str(), type_args_suffix)
}

/// Linkage name: owning type mangle plus the local name.
pub(crate) fn method_mangled_name(type_mangle: &str, local: &str) -> String {
    format!("{}_{}", type_mangle, local)
}

pub(crate) fn method_full_name(type_name: &str, method: &str, type_args_display: &str) -> String {
    format!("{}.{}{}", type_name, method, type_args_display)
}

/// Encoding of one type in argument position: nominal types carry their
/// capability.
pub(crate) fn arg_mangle(type_mangle: &str, cap: Option<Capability>) -> String {
    match cap {
        Some(cap) => format!("{}_{}", type_mangle, cap.as_str()),
        None => type_mangle.to_string(),
    }
}

fn checked_def<'p>(program: &'p Program, ty: &TypeRef) -> ReachResult<Option<&'p TypeDef>> {
    let Some(nominal) = ty.as_nominal() else {
        return Ok(None);
    };
    let def = program
        .type_def(nominal.def)
        .ok_or_else(|| ReachError::unknown_type_def(nominal.def.index()))?;
    if def.type_params.len() != nominal.args.len() {
        return Err(ReachError::type_arg_count(
            program.resolve(def.name),
            def.type_params.len(),
            nominal.args.len(),
        ));
    }
    Ok(Some(def))
}

fn write_type(program: &Program, ty: &TypeRef, out: &mut String) -> ReachResult<()> {
    match ty {
        TypeRef::Nominal(nominal) => {
            if let Some(def) = checked_def(program, ty)? {
                out.push_str(program.resolve(def.name));
            }
            write_args(program, &nominal.args, out)
        }
        TypeRef::Tuple(elements) => {
            out.push('_');
            out.push_str(&elements.len().to_string());
            for element in elements {
                out.push('_');
                write_arg(program, element, out)?;
            }
            Ok(())
        }
        TypeRef::Param(_) => Err(ReachError::unbound_type_param("type mangle")),
    }
}

fn write_args(program: &Program, args: &[TypeRef], out: &mut String) -> ReachResult<()> {
    if args.is_empty() {
        return Ok(());
    }
    out.push('_');
    out.push_str(&args.len().to_string());
    for arg in args {
        out.push('_');
        write_arg(program, arg, out)?;
    }
    Ok(())
}

fn write_arg(program: &Program, ty: &TypeRef, out: &mut String) -> ReachResult<()> {
    write_type(program, ty, out)?;
    if let Some(cap) = ty.cap() {
        out.push('_');
        out.push_str(cap.as_str());
    }
    Ok(())
}

fn write_display(program: &Program, ty: &TypeRef, out: &mut String) -> ReachResult<()> {
    match ty {
        TypeRef::Nominal(nominal) => {
            if let Some(def) = checked_def(program, ty)? {
                out.push_str(program.resolve(def.name));
            }
            out.push_str(&type_args_display(program, &nominal.args)?);
            Ok(())
        }
        TypeRef::Tuple(elements) => {
            out.push('(');
            for (i, element) in elements.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_display_arg(program, element, out)?;
            }
            out.push(')');
            Ok(())
        }
        TypeRef::Param(_) => Err(ReachError::unbound_type_param("type name")),
    }
}

fn write_display_arg(program: &Program, ty: &TypeRef, out: &mut String) -> ReachResult<()> {
    write_display(program, ty, out)?;
    if let Some(cap) = ty.cap() {
        out.push(' ');
        out.push_str(cap.as_str());
    }
    Ok(())
}
