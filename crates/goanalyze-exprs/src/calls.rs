//! inspection.function-call - argument counts of calls and conversions.

use std::cmp::Ordering;

use goanalyze_abi::{DiagnosticSink, InspectionMetadata, Severity};
use goanalyze_ast::node::CallExpr;
use goanalyze_ast::{FileId, NodeId, NodeKind};
use goanalyze_core::{
    AnalysisPass, BoxInspection, CallTarget, Canceled, Inspection, InspectionSettings, Reporter,
    Signature,
};

use crate::callee::{is_bound_method_expression, is_method_expression};

/// Inspection name, also the configuration key.
pub const NAME: &str = "function-call";

const RULES: [&str; 3] = ["too-many-arguments", "not-enough-arguments", "conversion"];

/// Configuration for the function-call inspection
#[derive(Debug, Clone)]
pub struct CallsConfig {
    pub severity: Severity,
}

impl Default for CallsConfig {
    fn default() -> Self {
        Self {
            severity: Severity::Error,
        }
    }
}

#[derive(Default)]
pub struct ArgumentCounts {
    config: CallsConfig,
}

impl ArgumentCounts {
    #[must_use]
    pub const fn new(config: CallsConfig) -> Self {
        Self { config }
    }
}

impl Inspection for ArgumentCounts {
    fn name(&self) -> &'static str {
        NAME
    }

    fn metadata(&self) -> InspectionMetadata {
        InspectionMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: "Calls and conversions with the wrong number of arguments".to_string(),
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
            if let NodeKind::Call(call) = ast.kind(node) {
                check_call(pass, &mut reporter, node, call);
            }
        }
        Ok(())
    }
}

/// Factory used by the analyzer facade.
#[must_use]
pub fn init_inspection() -> BoxInspection {
    Box::new(ArgumentCounts::default())
}

/// Create inspection with custom config
#[must_use]
pub fn init_inspection_with_config(config: CallsConfig) -> BoxInspection {
    Box::new(ArgumentCounts::new(config))
}

/// Convert `InspectionSettings` to `CallsConfig`
#[must_use]
pub fn config_from_settings(settings: &InspectionSettings) -> CallsConfig {
    CallsConfig {
        severity: settings.severity().unwrap_or(Severity::Error),
    }
}

fn check_call(pass: &AnalysisPass<'_>, reporter: &mut Reporter<'_>, node: NodeId, call: &CallExpr) {
    let ast = pass.ast();
    // only named callees; literals and call results are left to the compiler
    if !matches!(ast.kind(call.callee), NodeKind::Ident(_) | NodeKind::Selector(_)) {
        return;
    }
    match pass.resolve_call(call.callee) {
        CallTarget::Conversion(_) if call.args.len() != 1 => {
            let problem = if call.args.is_empty() {
                "Missing argument"
            } else {
                "Too many arguments"
            };
            reporter.report_node(
                pass,
                "conversion",
                node,
                format!(
                    "{problem} to conversion to {}: {}.",
                    ast.text(call.callee),
                    ast.text(node)
                ),
            );
        }
        CallTarget::Func { sig, .. } => check_count(pass, reporter, call, &sig),
        _ => {}
    }
}

fn check_count(
    pass: &AnalysisPass<'_>,
    reporter: &mut Reporter<'_>,
    call: &CallExpr,
    sig: &Signature,
) {
    let mut actual = call.args.len();
    // f(g()) passes every result of g
    if let [only] = call.args.as_slice()
        && let Some(count) = pass.call_result_count(*only)
    {
        actual = count;
    }
    // the receiver of a method expression is not part of the method signature
    if is_method_expression(pass, call.callee) || is_bound_method_expression(pass, call.callee) {
        actual = actual.saturating_sub(1);
    }

    let expected = sig.param_types().len();
    let fixed = expected - usize::from(sig.is_variadic());
    if sig.is_variadic() && actual >= fixed {
        return;
    }
    let (rule, quantity) = match actual.cmp(&expected) {
        Ordering::Equal => return,
        Ordering::Greater => ("too-many-arguments", "too many"),
        Ordering::Less => ("not-enough-arguments", "not enough"),
    };
    reporter.report_node(
        pass,
        rule,
        call.callee,
        format!(
            "{quantity} arguments in call to {}",
            pass.ast().text(call.callee)
        ),
    );
}
