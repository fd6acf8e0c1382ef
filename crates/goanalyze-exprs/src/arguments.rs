//! inspection.types-compatibility - call arguments against parameter types.

use goanalyze_abi::{DiagnosticSink, InspectionMetadata, Severity};
use goanalyze_ast::node::CallExpr;
use goanalyze_ast::{FileId, NodeId, NodeKind};
use goanalyze_core::{
    AnalysisPass, BoxInspection, CallTarget, Canceled, Inspection, InspectionSettings, Reporter,
    Type,
};

use crate::callee::{is_bound_method_expression, is_method_expression};
use crate::constants::{describe, fits, untyped_type};

/// Inspection name, also the configuration key.
pub const NAME: &str = "types-compatibility";

const RULE: &str = "argument-type";

/// Configuration for the types-compatibility inspection
#[derive(Debug, Clone)]
pub struct ArgumentsConfig {
    pub severity: Severity,
}

impl Default for ArgumentsConfig {
    fn default() -> Self {
        Self {
            severity: Severity::Error,
        }
    }
}

#[derive(Default)]
pub struct ArgumentTypes {
    config: ArgumentsConfig,
}

impl ArgumentTypes {
    #[must_use]
    pub const fn new(config: ArgumentsConfig) -> Self {
        Self { config }
    }
}

impl Inspection for ArgumentTypes {
    fn name(&self) -> &'static str {
        NAME
    }

    fn metadata(&self) -> InspectionMetadata {
        InspectionMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: "Call arguments not assignable to their parameters".to_string(),
            rules: vec![RULE.to_string()],
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
                check_call(pass, &mut reporter, call);
            }
        }
        Ok(())
    }
}

/// Factory used by the analyzer facade.
#[must_use]
pub fn init_inspection() -> BoxInspection {
    Box::new(ArgumentTypes::default())
}

/// Create inspection with custom config
#[must_use]
pub fn init_inspection_with_config(config: ArgumentsConfig) -> BoxInspection {
    Box::new(ArgumentTypes::new(config))
}

/// Convert `InspectionSettings` to `ArgumentsConfig`
#[must_use]
pub fn config_from_settings(settings: &InspectionSettings) -> ArgumentsConfig {
    ArgumentsConfig {
        severity: settings.severity().unwrap_or(Severity::Error),
    }
}

fn check_call(pass: &AnalysisPass<'_>, reporter: &mut Reporter<'_>, call: &CallExpr) {
    // method expressions take the receiver as an extra first argument
    if is_method_expression(pass, call.callee) || is_bound_method_expression(pass, call.callee) {
        tracing::debug!(
            callee = pass.ast().text(call.callee),
            "method expression call, argument types not checked"
        );
        return;
    }
    let CallTarget::Func { sig, .. } = pass.resolve_call(call.callee) else {
        return;
    };
    // f(g()) spreads a multi-value call over the parameters
    if let [only] = call.args.as_slice()
        && matches!(pass.infer(*only), Some(Type::Tuple(_)))
    {
        tracing::debug!(
            callee = pass.ast().text(call.callee),
            "multi-value argument spread, argument types not checked"
        );
        return;
    }

    let params = sig.param_types();
    let variadic = sig.is_variadic();
    for (index, &arg) in call.args.iter().enumerate() {
        let expected = match params.get(index) {
            _ if variadic && index + 1 >= params.len() => {
                let Some(elem) = params.last() else { break };
                if call.spread {
                    Type::slice(elem.clone())
                } else {
                    elem.clone()
                }
            }
            Some(param) => param.clone(),
            None => break,
        };
        check_argument(pass, reporter, arg, &expected);
    }
}

fn check_argument(
    pass: &AnalysisPass<'_>,
    reporter: &mut Reporter<'_>,
    arg: NodeId,
    expected: &Type,
) {
    let ast = pass.ast();
    let (actual, untyped) = match untyped_type(pass, arg) {
        Some(constant) => {
            if fits(pass, expected, &constant) {
                return;
            }
            (constant, true)
        }
        None => {
            let Some(actual) = pass.infer(arg) else {
                return;
            };
            if matches!(actual, Type::Tuple(_)) || pass.is_assignable(expected, &actual) {
                return;
            }
            (actual, false)
        }
    };
    let local = ast.file_of(arg).import_path.as_str();
    reporter.report_node(
        pass,
        RULE,
        arg,
        format!(
            "Cannot use {} (type {}) as type {}",
            ast.text(arg),
            describe(&actual, untyped, local),
            expected.relative_to(local)
        ),
    );
}
