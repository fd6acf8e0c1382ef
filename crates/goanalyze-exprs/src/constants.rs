//! Untyped constant operands.
//!
//! Inference hands literals their default type, which is too strict once a
//! literal meets a typed operand or parameter. The helpers here recover the
//! untyped category from the expression itself.

use goanalyze_ast::node::{BinaryExpr, LitKind, UnaryOp};
use goanalyze_ast::{Builtin, NodeId, NodeKind, Resolution};
use goanalyze_core::{AnalysisPass, BasicKind, Type, UntypedKind};

/// Type of an untyped constant expression, or `None` for typed expressions.
///
/// Numeric constants come back as [`Type::Untyped`], `nil` as
/// [`Type::UntypedNil`]; untyped string and boolean constants use the
/// matching basic type.
pub(crate) fn untyped_type(pass: &AnalysisPass<'_>, expr: NodeId) -> Option<Type> {
    let ast = pass.ast();
    match ast.kind(expr) {
        NodeKind::BasicLit(lit) => Some(match lit.kind {
            LitKind::String | LitKind::RawString => Type::Basic(BasicKind::String),
            LitKind::Int => Type::Untyped(UntypedKind::Int),
            LitKind::Char => Type::Untyped(UntypedKind::Rune),
            LitKind::Float => Type::Untyped(UntypedKind::Float),
            LitKind::ImagFloat | LitKind::ImagInt => Type::Untyped(UntypedKind::Complex),
        }),
        NodeKind::Paren(p) => untyped_type(pass, p.expr),
        NodeKind::Unary(u) => match u.op {
            UnaryOp::Plus | UnaryOp::Neg | UnaryOp::Not | UnaryOp::Xor => {
                untyped_type(pass, u.operand)
            }
            UnaryOp::Deref | UnaryOp::Addr | UnaryOp::Recv => None,
        },
        NodeKind::Binary(b) => pass.guarded(expr, || untyped_binary(pass, b)),
        NodeKind::Ident(_) | NodeKind::Selector(_) => untyped_reference(pass, expr),
        _ => None,
    }
}

fn untyped_binary(pass: &AnalysisPass<'_>, b: &BinaryExpr) -> Option<Type> {
    let left = untyped_type(pass, b.left)?;
    if b.op.is_shift() {
        return Some(left);
    }
    let right = untyped_type(pass, b.right)?;
    if b.op.is_comparison() || b.op.is_logical() {
        return Some(Type::Basic(BasicKind::Bool));
    }
    match (left, right) {
        // the later kind wins: int < rune < float < complex
        (Type::Untyped(l), Type::Untyped(r)) => Some(Type::Untyped(l.max(r))),
        (l, r) if l == r => Some(l),
        _ => None,
    }
}

fn untyped_reference(pass: &AnalysisPass<'_>, expr: NodeId) -> Option<Type> {
    let ast = pass.ast();
    match pass.resolve(expr)? {
        Resolution::Builtin(Builtin::True | Builtin::False) => Some(Type::Basic(BasicKind::Bool)),
        Resolution::Builtin(Builtin::Nil) => Some(Type::UntypedNil),
        Resolution::Builtin(Builtin::Iota) => pass.infer(expr),
        Resolution::Decl(def) => {
            let spec = ast.parent(def)?;
            let NodeKind::ConstSpec(spec) = ast.kind(spec) else {
                return None;
            };
            match pass.type_of_def(def)? {
                ty @ Type::Untyped(_) => Some(ty),
                ty @ Type::Basic(BasicKind::String | BasicKind::Bool)
                    if spec.ty.is_none() && !spec.values.is_empty() =>
                {
                    Some(ty)
                }
                _ => None,
            }
        }
        _ => None,
    }
}

/// Whether an untyped constant of type `constant` may be used where `target` is expected.
pub(crate) fn fits(pass: &AnalysisPass<'_>, target: &Type, constant: &Type) -> bool {
    match constant {
        Type::Untyped(_) | Type::UntypedNil => pass.is_assignable(target, constant),
        _ => {
            pass.is_assignable(target, constant)
                || pass.identical(&pass.underlying(target), constant)
        }
    }
}

/// Type text for messages reported in package `local`; untyped string and
/// boolean constants say so.
pub(crate) fn describe(ty: &Type, untyped: bool, local: &str) -> String {
    match ty {
        Type::UntypedNil => "untyped nil".to_string(),
        Type::Basic(_) if untyped => format!("untyped {ty}"),
        _ => ty.relative_to(local).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goanalyze_ast::ScopeResolver;

    fn value_of(src: &str, name: &str) -> (goanalyze_ast::Ast, NodeId) {
        let ast = goanalyze_syntax::parse_package("example.com/p", &[("p.go", src)])
            .expect("parse");
        let value = ast
            .file_ids()
            .filter_map(|f| ast.file(f).root)
            .flat_map(|root| ast.descendants(root))
            .find_map(|id| match ast.kind(id) {
                NodeKind::VarSpec(spec)
                    if spec
                        .names
                        .iter()
                        .any(|&n| ast.name_of(n) == Some(name)) =>
                {
                    spec.values.first().copied()
                }
                _ => None,
            })
            .expect("declared");
        (ast, value)
    }

    fn untyped(src: &str, name: &str) -> Option<Type> {
        let (ast, value) = value_of(src, name);
        let pass = AnalysisPass::new(&ast, &ScopeResolver);
        untyped_type(&pass, value)
    }

    #[test]
    fn literals_and_constant_expressions() {
        let src = r#"package p
const k = 2
const greeting = "hi"
const typed int = 3
var (
	a = 1
	b = 1.5 * 2
	c = -'x'
	d = "x" + greeting
	e = k << 3
	f = typed
	g = nil
	h = 1 < 2
	i = a + 1
)
"#;
        assert_eq!(untyped(src, "a"), Some(Type::Untyped(UntypedKind::Int)));
        assert_eq!(untyped(src, "b"), Some(Type::Untyped(UntypedKind::Float)));
        assert_eq!(untyped(src, "c"), Some(Type::Untyped(UntypedKind::Rune)));
        assert_eq!(untyped(src, "d"), Some(Type::Basic(BasicKind::String)));
        assert_eq!(untyped(src, "e"), Some(Type::Untyped(UntypedKind::Int)));
        assert_eq!(untyped(src, "f"), None);
        assert_eq!(untyped(src, "g"), Some(Type::UntypedNil));
        assert_eq!(untyped(src, "h"), Some(Type::Basic(BasicKind::Bool)));
        assert_eq!(untyped(src, "i"), None);
    }

    #[test]
    fn describing_constants() {
        let string = Type::Basic(BasicKind::String);
        assert_eq!(describe(&string, true, "p"), "untyped string");
        assert_eq!(describe(&string, false, "p"), "string");
        assert_eq!(describe(&Type::UntypedNil, true, "p"), "untyped nil");
        assert_eq!(describe(&Type::Untyped(UntypedKind::Float), true, "p"), "untyped float");
    }
}
