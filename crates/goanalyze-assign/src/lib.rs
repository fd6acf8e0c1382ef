#![warn(rust_2024_compatibility, clippy::all)]

//! inspection.assignment-count - left/right arity of assignments and
//! single-value use of multi-value calls.

use goanalyze_abi::{DiagnosticSink, InspectionMetadata, Severity};
use goanalyze_ast::node::{AssignOp, UnaryOp};
use goanalyze_ast::universe::Builtin;
use goanalyze_ast::{FileId, NodeId, NodeKind, Resolution};
use goanalyze_core::{
    AnalysisPass, BoxInspection, CallTarget, Canceled, Inspection, InspectionSettings, Reporter,
};

/// Inspection name, also the configuration key.
pub const NAME: &str = "assignment-count";

const RULES: [&str; 5] = [
    "count-mismatch",
    "no-value",
    "multiple-value",
    "channel-receive",
    "compound-assign",
];

const CHANNEL_RECEIVE_MESSAGE: &str = "Assignment count mismatch: channel receiving should be: \
     <-channel OR value = <-channel OR value, isClosed = <-channel";

/// Configuration for the assignment-count inspection
#[derive(Debug, Clone)]
pub struct AssignConfig {
    pub severity: Severity,
}

impl Default for AssignConfig {
    fn default() -> Self {
        Self {
            severity: Severity::Error,
        }
    }
}

#[derive(Default)]
pub struct AssignmentCount {
    config: AssignConfig,
}

impl AssignmentCount {
    #[must_use]
    pub const fn new(config: AssignConfig) -> Self {
        Self { config }
    }
}

impl Inspection for AssignmentCount {
    fn name(&self) -> &'static str {
        NAME
    }

    fn metadata(&self) -> InspectionMetadata {
        InspectionMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: "Assignment count mismatches and misuse of multi-value calls".to_string(),
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
        let mut reporter = Reporter::new(self, sink);

        for node in ast.descendants(root) {
            pass.check_canceled()?;
            match ast.kind(node) {
                NodeKind::VarSpec(spec) if !spec.values.is_empty() => {
                    check_assignment(pass, &mut reporter, node, spec.names.len(), &spec.values);
                }
                NodeKind::ShortVarDecl(decl) => {
                    check_assignment(pass, &mut reporter, node, decl.names.len(), &decl.values);
                }
                NodeKind::Assign(assign) => {
                    if matches!(assign.op, AssignOp::Compound(_)) && assign.lhs.len() > 1 {
                        reporter.report_node(
                            pass,
                            "compound-assign",
                            node,
                            "Syntax error: unexpected op=, expecting := or = or comma",
                        );
                    }
                    check_assignment(pass, &mut reporter, node, assign.lhs.len(), &assign.rhs);
                }
                NodeKind::Recv(recv) if recv.lhs.len() > 2 => {
                    reporter.report_node(pass, "channel-receive", node, CHANNEL_RECEIVE_MESSAGE);
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Factory used by the analyzer facade.
#[must_use]
pub fn init_inspection() -> BoxInspection {
    Box::new(AssignmentCount::default())
}

/// Create inspection with custom config
#[must_use]
pub fn init_inspection_with_config(config: AssignConfig) -> BoxInspection {
    Box::new(AssignmentCount::new(config))
}

/// Convert `InspectionSettings` to `AssignConfig`
#[must_use]
pub fn config_from_settings(settings: &InspectionSettings) -> AssignConfig {
    AssignConfig {
        severity: settings.severity().unwrap_or(Severity::Error),
    }
}

fn check_assignment(
    pass: &AnalysisPass<'_>,
    reporter: &mut Reporter<'_>,
    element: NodeId,
    left: usize,
    right: &[NodeId],
) {
    if right.is_empty() {
        return;
    }
    if has_unresolved_references(pass, right)
        || has_unresolved_calls(pass, right)
        || has_cgo_call(pass, right)
    {
        tracing::debug!(
            "skipping assignment at {:?}: right side not fully resolved",
            pass.ast().span(element)
        );
        return;
    }
    let Some(right_count) = count_right_side(pass, right) else {
        return;
    };

    if let [single] = right
        && pass.is_comma_ok(*single)
    {
        if left == 1 || left == 2 {
            return;
        }
        if is_channel_receive(pass, *single) {
            reporter.report_node(pass, "channel-receive", element, CHANNEL_RECEIVE_MESSAGE);
            return;
        }
    }

    if left != right_count {
        reporter.report_node(
            pass,
            "count-mismatch",
            element,
            format!(
                "Assignment count mismatch: {right_count} element(s) assigned to {left} element(s)"
            ),
        );
    }

    check_function_calls(pass, reporter, left, right);
}

/// Per-call checks: a call standing alone must match the left side, calls in
/// a list must produce exactly one value.
fn check_function_calls(
    pass: &AnalysisPass<'_>,
    reporter: &mut Reporter<'_>,
    left: usize,
    right: &[NodeId],
) {
    let ast = pass.ast();
    if let [single] = right {
        if let NodeKind::Call(call) = ast.kind(*single)
            && !matches!(ast.kind(call.callee), NodeKind::Call(_))
            && let Some(arity) = pass.call_result_count(*single)
            && arity != left
        {
            check_func_call(pass, reporter, *single, arity);
        }
        return;
    }

    for &expr in right {
        if matches!(ast.kind(expr), NodeKind::Call(_))
            && let Some(arity) = pass.call_result_count(expr)
            && arity != 1
        {
            check_func_call(pass, reporter, expr, arity);
        }
    }
}

fn check_func_call(pass: &AnalysisPass<'_>, reporter: &mut Reporter<'_>, call: NodeId, arity: usize) {
    let ast = pass.ast();
    if arity == 0 {
        reporter.report_node(
            pass,
            "no-value",
            call,
            format!("{} doesn't return a value", ast.text(call)),
        );
        return;
    }

    // A called literal is named by its signature rather than its whole body.
    let func_text = match ast.kind(call) {
        NodeKind::Call(c) => match ast.kind(c.callee) {
            NodeKind::FuncLit(lit) => format!("func{}", ast.text(lit.signature)),
            _ => ast.text(call).to_string(),
        },
        _ => ast.text(call).to_string(),
    };
    reporter.report_node(
        pass,
        "multiple-value",
        call,
        format!("Multiple-value {func_text} in single-value context"),
    );
}

/// Effective number of values on the right side.
fn count_right_side(pass: &AnalysisPass<'_>, right: &[NodeId]) -> Option<usize> {
    if let [single] = right {
        return arity(pass, *single);
    }
    let ast = pass.ast();
    if right
        .iter()
        .any(|&e| matches!(ast.kind(e), NodeKind::Call(_)))
    {
        return Some(right.len());
    }
    right.iter().map(|&e| arity(pass, e)).sum()
}

fn arity(pass: &AnalysisPass<'_>, expr: NodeId) -> Option<usize> {
    match pass.ast().kind(expr) {
        NodeKind::Paren(p) => arity(pass, p.expr),
        NodeKind::Call(_) => pass.call_result_count(expr),
        _ => Some(1),
    }
}

/// A bare reference that resolves nowhere, or to a type used as a value.
fn has_unresolved_references(pass: &AnalysisPass<'_>, exprs: &[NodeId]) -> bool {
    let ast = pass.ast();
    exprs.iter().any(|&expr| match ast.kind(expr) {
        NodeKind::Ident(_) => match pass.resolve(expr) {
            None | Some(Resolution::Builtin(Builtin::Type(_) | Builtin::Error | Builtin::Any)) => {
                true
            }
            Some(Resolution::Decl(def)) => ast
                .parent(def)
                .is_some_and(|p| matches!(ast.kind(p), NodeKind::TypeSpec(_))),
            Some(_) => false,
        },
        NodeKind::Selector(_) => pass.resolve(expr).is_none() && pass.infer(expr).is_none(),
        _ => false,
    })
}

fn has_unresolved_calls(pass: &AnalysisPass<'_>, exprs: &[NodeId]) -> bool {
    call_targets(pass, exprs).any(|target| target == CallTarget::Unknown)
}

fn has_cgo_call(pass: &AnalysisPass<'_>, exprs: &[NodeId]) -> bool {
    call_targets(pass, exprs).any(|target| target == CallTarget::CSymbol)
}

fn call_targets<'p>(
    pass: &'p AnalysisPass<'_>,
    exprs: &'p [NodeId],
) -> impl Iterator<Item = CallTarget> + 'p {
    exprs.iter().filter_map(move |&expr| match pass.ast().kind(expr) {
        NodeKind::Call(call) => Some(pass.resolve_call(call.callee)),
        _ => None,
    })
}

fn is_channel_receive(pass: &AnalysisPass<'_>, expr: NodeId) -> bool {
    match pass.ast().kind(expr) {
        NodeKind::Paren(p) => is_channel_receive(pass, p.expr),
        NodeKind::Unary(u) => u.op == UnaryOp::Recv,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goanalyze_abi::Diagnostics;
    use goanalyze_ast::ScopeResolver;

    fn messages(src: &str) -> Vec<String> {
        let ast = goanalyze_syntax::parse_package("example.com/p", &[("p.go", src)])
            .expect("parse");
        let pass = AnalysisPass::new(&ast, &ScopeResolver);
        let file = ast.file_ids().next().expect("one file");
        let mut diags = Diagnostics::new();
        AssignmentCount::default()
            .check_file(&pass, file, &mut diags)
            .expect("not canceled");
        diags.into_iter().map(|d| d.message).collect()
    }

    #[test]
    fn too_few_targets_for_a_call() {
        let src = "package p\nfunc three() (int, int, int) { return 1, 2, 3 }\nvar a, b = three()\n";
        assert_eq!(
            messages(src),
            vec![
                "Assignment count mismatch: 3 element(s) assigned to 2 element(s)",
                "Multiple-value three() in single-value context",
            ]
        );
    }

    #[test]
    fn comma_ok_forms_accept_one_or_two_targets() {
        let src = "package p\nvar m map[string]int\nfunc g(i interface{}) {\n\tv, ok := m[\"k\"]\n\tw := m[\"k\"]\n\ts, ok2 := i.(string)\n\t_, _, _, _, _ = v, ok, w, s, ok2\n}\n";
        assert!(messages(src).is_empty());
    }

    #[test]
    fn three_targets_for_a_receive() {
        let src = "package p\nfunc g(ch chan int) {\n\ta, b, c := <-ch\n\t_, _, _ = a, b, c\n}\n";
        assert_eq!(messages(src), vec![CHANNEL_RECEIVE_MESSAGE]);
    }

    #[test]
    fn unresolved_right_side_is_skipped() {
        let src = "package p\nfunc g() {\n\ta, b := missing()\n\tc, d := undefinedVar\n\t_, _, _, _ = a, b, c, d\n}\n";
        assert!(messages(src).is_empty());
    }

    #[test]
    fn compound_assignment_with_two_targets() {
        let src = "package p\nfunc g() {\n\tvar a, b int\n\ta, b += 1, 2\n}\n";
        assert_eq!(
            messages(src),
            vec!["Syntax error: unexpected op=, expecting := or = or comma"]
        );
    }

    #[test]
    fn settings_override_severity() {
        let settings = InspectionSettings {
            severity: Some("warning".to_string()),
            ..Default::default()
        };
        let inspection = init_inspection_with_config(config_from_settings(&settings));
        assert_eq!(inspection.severity(), Severity::Warning);
        assert_eq!(init_inspection().severity(), Severity::Error);
        assert_eq!(inspection.rule("no-value"), "assignment-count/no-value");
    }
}
