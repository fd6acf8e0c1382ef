//! inspection.binary-unary - operand types of unary and binary operators.

use std::collections::HashSet;

use goanalyze_abi::{DiagnosticSink, InspectionMetadata, Severity};
use goanalyze_ast::node::{BinaryExpr, BinaryOp, ChanDir, UnaryExpr, UnaryOp};
use goanalyze_ast::{Builtin, FileId, NodeId, NodeKind, Resolution};
use goanalyze_core::{
    AnalysisPass, BoxInspection, Canceled, Inspection, InspectionSettings, Reporter, Type,
};

use crate::constants::{describe, fits, untyped_type};

/// Inspection name, also the configuration key.
pub const NAME: &str = "binary-unary";

const RULES: [&str; 5] = [
    "operator",
    "mismatched-types",
    "receive",
    "indirect",
    "shift-count",
];

/// Configuration for the binary-unary inspection
#[derive(Debug, Clone)]
pub struct OperatorsConfig {
    pub severity: Severity,
}

impl Default for OperatorsConfig {
    fn default() -> Self {
        Self {
            severity: Severity::Error,
        }
    }
}

#[derive(Default)]
pub struct OperandTypes {
    config: OperatorsConfig,
}

impl OperandTypes {
    #[must_use]
    pub const fn new(config: OperatorsConfig) -> Self {
        Self { config }
    }
}

/// A finding waiting for the innermost-first filter.
struct Problem {
    node: NodeId,
    rule: &'static str,
    message: String,
}

impl Inspection for OperandTypes {
    fn name(&self) -> &'static str {
        NAME
    }

    fn metadata(&self) -> InspectionMetadata {
        InspectionMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: "Operands that an operator is not defined on".to_string(),
            rules: RULES.iter().map(ToString::to_string).collect(),
            default_severity: Severity::Error,
        }
    }

    fn severity(&self) -> Severity {
        self.config.severity
    }

    fn check_file(
        &self,
        pass: &AnalysisPass<'_>,
        file: FileId,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<(), Canceled> {
        let ast = pass.ast();
        let Some(root) = ast.file(file).root else {
            return Ok(());
        };

        let mut problems = Vec::new();
        for node in ast.descendants(root) {
            pass.check_canceled()?;
            let problem = match ast.kind(node) {
                NodeKind::Unary(u) => check_unary(pass, node, u),
                NodeKind::Binary(b) => check_binary(pass, node, b),
                _ => None,
            };
            problems.extend(problem);
        }

        // An invalid operand makes every enclosing operation invalid too;
        // only the innermost one is reported.
        let owners: Vec<NodeId> = problems.iter().map(|p| owner(pass, p.node)).collect();
        let enclosing: HashSet<NodeId> = owners
            .iter()
            .flat_map(|&owner| ast.ancestors(owner))
            .collect();
        let mut reporter = Reporter::new(self, sink);
        for (problem, owner) in problems.into_iter().zip(owners) {
            if enclosing.contains(&owner) {
                continue;
            }
            reporter.report_node(pass, problem.rule, problem.node, problem.message);
        }
        Ok(())
    }
}

/// The operation a finding belongs to.
fn owner(pass: &AnalysisPass<'_>, node: NodeId) -> NodeId {
    let ast = pass.ast();
    std::iter::once(node)
        .chain(ast.ancestors(node))
        .find(|&n| matches!(ast.kind(n), NodeKind::Unary(_) | NodeKind::Binary(_)))
        .unwrap_or(node)
}

/// Factory used by the analyzer facade.
#[must_use]
pub fn init_inspection() -> BoxInspection {
    Box::new(OperandTypes::default())
}

/// Create inspection with custom config
#[must_use]
pub fn init_inspection_with_config(config: OperatorsConfig) -> BoxInspection {
    Box::new(OperandTypes::new(config))
}

/// Convert `InspectionSettings` to `OperatorsConfig`
#[must_use]
pub fn config_from_settings(settings: &InspectionSettings) -> OperatorsConfig {
    OperatorsConfig {
        severity: settings.severity().unwrap_or(Severity::Error),
    }
}

fn check_unary(pass: &AnalysisPass<'_>, node: NodeId, u: &UnaryExpr) -> Option<Problem> {
    let ast = pass.ast();
    // `*T` in a conversion callee names a pointer type
    if u.op == UnaryOp::Addr || (u.op == UnaryOp::Deref && denotes_type(pass, u.operand)) {
        return None;
    }
    let Some(ty) = pass.infer(u.operand) else {
        tracing::debug!(node = node.index(), op = u.op.as_str(), "operand type unknown");
        return None;
    };
    if is_opaque(pass, &ty) {
        return None;
    }
    let expr = ast.text(node);
    let shown = ty.relative_to(&ast.file_of(node).import_path);

    let defined = match u.op {
        UnaryOp::Plus | UnaryOp::Neg => pass.is_numeric(&ty),
        UnaryOp::Not => pass.is_boolean(&ty),
        UnaryOp::Xor => pass.is_integer(&ty),
        UnaryOp::Recv => {
            return match pass.underlying(&ty) {
                Type::Chan { dir: ChanDir::Send, .. } => Some(Problem {
                    node,
                    rule: "receive",
                    message: format!(
                        "invalid operation: {expr} (receive from send-only type {shown})"
                    ),
                }),
                Type::Chan { .. } => None,
                _ => Some(Problem {
                    node,
                    rule: "receive",
                    message: format!("invalid operation: {expr} (receive from non-chan type {shown})"),
                }),
            };
        }
        UnaryOp::Deref => {
            return match pass.underlying(&ty) {
                Type::Pointer(_) => None,
                _ => Some(Problem {
                    node,
                    rule: "indirect",
                    message: format!("invalid indirect of {} (type {shown})", ast.text(u.operand)),
                }),
            };
        }
        UnaryOp::Addr => true,
    };
    (!defined).then(|| Problem {
        node,
        rule: "operator",
        message: format!(
            "invalid operation: {expr} (operator {} not defined on {shown})",
            u.op.as_str()
        ),
    })
}

fn check_binary(pass: &AnalysisPass<'_>, node: NodeId, b: &BinaryExpr) -> Option<Problem> {
    let ast = pass.ast();
    let untyped_left = untyped_type(pass, b.left);
    let untyped_right = untyped_type(pass, b.right);
    let left = untyped_left.clone().or_else(|| pass.infer(b.left));
    let right = untyped_right.clone().or_else(|| pass.infer(b.right));
    let (Some(left), Some(right)) = (left, right) else {
        tracing::debug!(node = node.index(), op = b.op.as_str(), "operand type unknown");
        return None;
    };
    if is_opaque(pass, &left) || is_opaque(pass, &right) {
        return None;
    }
    let expr = ast.text(node);
    let local = ast.file_of(node).import_path.as_str();

    if b.op.is_shift() {
        return check_shift(
            pass,
            node,
            b,
            &left,
            &right,
            untyped_left.is_some(),
            untyped_right.is_some(),
        );
    }

    let compatible = match (&untyped_left, &untyped_right) {
        // constant folding is not modelled; both sides being constants is taken on trust
        (Some(_), Some(_)) => true,
        (Some(constant), None) => fits(pass, &right, constant),
        (None, Some(constant)) => fits(pass, &left, constant),
        (None, None) if b.op.is_comparison() => {
            pass.is_assignable(&left, &right) || pass.is_assignable(&right, &left)
        }
        (None, None) => pass.identical(&left, &right),
    };
    if !compatible {
        return Some(Problem {
            node,
            rule: "mismatched-types",
            message: format!(
                "invalid operation: {expr} (mismatched types {} and {})",
                describe(&left, untyped_left.is_some(), local),
                describe(&right, untyped_right.is_some(), local)
            ),
        });
    }

    if b.op.is_comparison() {
        return None;
    }
    // the typed side decides; a pair of constants is judged by the left one
    let (operand, untyped) = if untyped_left.is_some() && untyped_right.is_none() {
        (&right, false)
    } else {
        (&left, untyped_left.is_some())
    };
    (!operator_defined(pass, b.op, operand)).then(|| Problem {
        node,
        rule: "operator",
        message: format!(
            "invalid operation: {expr} (operator {} not defined on {})",
            b.op.as_str(),
            describe(operand, untyped, local)
        ),
    })
}

fn check_shift(
    pass: &AnalysisPass<'_>,
    node: NodeId,
    b: &BinaryExpr,
    left: &Type,
    right: &Type,
    left_untyped: bool,
    right_untyped: bool,
) -> Option<Problem> {
    let ast = pass.ast();
    let local = ast.file_of(node).import_path.as_str();
    if !left_untyped && !pass.is_integer(left) {
        return Some(Problem {
            node,
            rule: "operator",
            message: format!(
                "invalid operation: {} (operator {} not defined on {})",
                ast.text(node),
                b.op.as_str(),
                left.relative_to(local)
            ),
        });
    }
    if right_untyped || pass.is_integer(right) {
        return None;
    }
    Some(Problem {
        node: b.right,
        rule: "shift-count",
        message: format!(
            "invalid operation: {} (shift count type {}, must be integer)",
            ast.text(node),
            right.relative_to(local)
        ),
    })
}

fn operator_defined(pass: &AnalysisPass<'_>, op: BinaryOp, ty: &Type) -> bool {
    match op {
        BinaryOp::LogAnd | BinaryOp::LogOr => pass.is_boolean(ty),
        BinaryOp::Add => pass.is_numeric(ty) || pass.is_string(ty),
        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => pass.is_numeric(ty),
        BinaryOp::Rem | BinaryOp::And | BinaryOp::Or | BinaryOp::Xor | BinaryOp::AndNot => {
            pass.is_integer(ty)
        }
        BinaryOp::Shl | BinaryOp::Shr => pass.is_integer(ty),
        BinaryOp::Eq
        | BinaryOp::Ne
        | BinaryOp::Lt
        | BinaryOp::Le
        | BinaryOp::Gt
        | BinaryOp::Ge => true,
    }
}

/// Types the checks cannot see through: cgo values, unresolved names, call tuples.
fn is_opaque(pass: &AnalysisPass<'_>, ty: &Type) -> bool {
    matches!(
        pass.underlying(ty),
        Type::Invalid | Type::CType | Type::Tuple(_) | Type::Named(_)
    )
}

/// An expression that names a type rather than a value.
fn denotes_type(pass: &AnalysisPass<'_>, expr: NodeId) -> bool {
    let ast = pass.ast();
    match ast.kind(expr) {
        NodeKind::Paren(p) => denotes_type(pass, p.expr),
        kind if kind.is_type_syntax() => true,
        NodeKind::Ident(_) | NodeKind::Selector(_) => match pass.resolve(expr) {
            Some(Resolution::Builtin(Builtin::Type(_) | Builtin::Error | Builtin::Any)) => true,
            Some(Resolution::Decl(def)) => ast
                .parent(def)
                .is_some_and(|p| matches!(ast.kind(p), NodeKind::TypeSpec(_))),
            _ => false,
        },
        _ => false,
    }
}
