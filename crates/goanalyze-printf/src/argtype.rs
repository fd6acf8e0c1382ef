//! Verb/argument type compatibility.

use goanalyze_core::{AnalysisPass, BasicKind, Signature, Type, UntypedKind};

use crate::verbs::{ArgKinds, Verb};

const MAX_ELEMENT_DEPTH: usize = 4;

/// Whether `verb` can print a value of type `ty`.
///
/// Types the engine cannot see into (interfaces, cgo values, unresolved
/// named types) are accepted.
pub(crate) fn accepts(pass: &AnalysisPass<'_>, verb: &Verb, ty: &Type) -> bool {
    accepts_at(pass, verb, ty, 0)
}

fn accepts_at(pass: &AnalysisPass<'_>, verb: &Verb, ty: &Type, depth: usize) -> bool {
    if verb.accepts == ArgKinds::ANY || depth > MAX_ELEMENT_DEPTH {
        return true;
    }
    if has_formatting_method(pass, ty, verb) {
        return true;
    }
    let wants = |kinds: ArgKinds| verb.accepts.intersects(kinds);

    match pass.underlying(ty) {
        Type::Basic(kind) => wants(basic_kinds(kind)),
        Type::Untyped(kind) => wants(match kind {
            UntypedKind::Int => ArgKinds::INT,
            UntypedKind::Rune => ArgKinds::RUNE.union(ArgKinds::INT),
            UntypedKind::Float => ArgKinds::FLOAT,
            UntypedKind::Complex => ArgKinds::COMPLEX,
        }),
        Type::UntypedNil | Type::Chan { .. } | Type::Func(_) => wants(ArgKinds::POINTER),
        Type::Pointer(elem) => {
            if wants(ArgKinds::POINTER) {
                return true;
            }
            // &T{...} of a composite prints like the composite itself
            match pass.underlying(&elem) {
                Type::Struct(_) | Type::Array { .. } | Type::Slice(_) | Type::Map { .. }
                    if depth == 0 =>
                {
                    accepts_at(pass, verb, &elem, depth + 1)
                }
                _ => wants(ArgKinds::INT),
            }
        }
        Type::Slice(elem) => {
            (wants(ArgKinds::STRING) && is_byte(pass, &elem))
                || wants(ArgKinds::POINTER)
                || accepts_at(pass, verb, &elem, depth + 1)
        }
        Type::Array { elem, .. } => {
            (wants(ArgKinds::STRING) && is_byte(pass, &elem))
                || accepts_at(pass, verb, &elem, depth + 1)
        }
        Type::Map { key, value } => {
            wants(ArgKinds::POINTER)
                || (accepts_at(pass, verb, &key, depth + 1)
                    && accepts_at(pass, verb, &value, depth + 1))
        }
        Type::Struct(s) => s
            .fields
            .iter()
            .all(|f| accepts_at(pass, verb, &f.ty, depth + 1)),
        Type::Interface(_)
        | Type::Named(_)
        | Type::Tuple(_)
        | Type::CType
        | Type::Invalid => true,
    }
}

const fn basic_kinds(kind: BasicKind) -> ArgKinds {
    match kind {
        BasicKind::Bool => ArgKinds::BOOL,
        BasicKind::String => ArgKinds::STRING,
        BasicKind::Float32 | BasicKind::Float64 => ArgKinds::FLOAT,
        BasicKind::Complex64 | BasicKind::Complex128 => ArgKinds::COMPLEX,
        BasicKind::Rune | BasicKind::Int32 => ArgKinds::RUNE.union(ArgKinds::INT),
        _ => ArgKinds::INT,
    }
}

fn is_byte(pass: &AnalysisPass<'_>, ty: &Type) -> bool {
    matches!(
        pass.underlying(ty),
        Type::Basic(BasicKind::Byte | BasicKind::Uint8)
    )
}

/// `Format` takes over every verb; `Error() string` and `String() string`
/// satisfy the string verbs.
fn has_formatting_method(pass: &AnalysisPass<'_>, ty: &Type, verb: &Verb) -> bool {
    if !matches!(ty, Type::Named(_) | Type::Pointer(_)) {
        return false;
    }
    pass.method_set(ty).iter().any(|m| match m.name.as_str() {
        "Format" => true,
        "Error" | "String" => verb.accepts.intersects(ArgKinds::STRING) && returns_string(pass, &m.sig),
        _ => false,
    })
}

fn returns_string(pass: &AnalysisPass<'_>, sig: &Signature) -> bool {
    sig.param_types().is_empty()
        && matches!(sig.result_types().as_slice(), [only] if pass.is_string(only))
}
