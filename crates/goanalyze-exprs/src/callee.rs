//! Callee shapes shared by the call inspections.

use goanalyze_ast::{NodeId, NodeKind, Resolution};
use goanalyze_core::AnalysisPass;

/// `T.Method(recv, ...)` and `(*T).Method(recv, ...)`.
pub(crate) fn is_method_expression(pass: &AnalysisPass<'_>, callee: NodeId) -> bool {
    let ast = pass.ast();
    match ast.kind(callee) {
        NodeKind::Paren(p) => is_method_expression(pass, p.expr),
        NodeKind::Selector(sel) => names_type(pass, sel.operand),
        _ => false,
    }
}

/// A variable initialized with a method expression, as in `m := T.Method`.
pub(crate) fn is_bound_method_expression(pass: &AnalysisPass<'_>, callee: NodeId) -> bool {
    let ast = pass.ast();
    match ast.kind(callee) {
        NodeKind::Paren(p) => is_bound_method_expression(pass, p.expr),
        NodeKind::Ident(_) => match pass.resolve(callee) {
            Some(Resolution::Decl(def)) => pass
                .initializer(def)
                .is_some_and(|value| is_method_expression(pass, value)),
            _ => false,
        },
        _ => false,
    }
}

fn names_type(pass: &AnalysisPass<'_>, expr: NodeId) -> bool {
    let ast = pass.ast();
    match ast.kind(expr) {
        NodeKind::Paren(p) => names_type(pass, p.expr),
        NodeKind::Unary(u) => names_type(pass, u.operand),
        kind if kind.is_type_syntax() => true,
        NodeKind::Ident(_) | NodeKind::Selector(_) => matches!(
            pass.resolve(expr),
            Some(Resolution::Decl(def)) if ast
                .parent(def)
                .is_some_and(|p| matches!(ast.kind(p), NodeKind::TypeSpec(_)))
        ),
        _ => false,
    }
}
