//! inspection.redundant-slice-index - `x[a:len(x)]` where `x[a:]` says the same.

use goanalyze_abi::{DiagnosticSink, InspectionMetadata, Severity};
use goanalyze_ast::node::SliceExpr;
use goanalyze_ast::{Builtin, BuiltinFunc, FileId, NodeId, NodeKind, Resolution};
use goanalyze_core::{
    AnalysisPass, BoxInspection, Canceled, Inspection, InspectionSettings, Reporter,
};

/// Inspection name, also the configuration key.
pub const NAME: &str = "redundant-slice-index";

const RULE: &str = "second-index";

/// Configuration for the redundant-slice-index inspection
#[derive(Debug, Clone)]
pub struct SlicesConfig {
    pub severity: Severity,
}

impl Default for SlicesConfig {
    fn default() -> Self {
        Self {
            severity: Severity::Warning,
        }
    }
}

#[derive(Default)]
pub struct RedundantSliceIndex {
    config: SlicesConfig,
}

impl RedundantSliceIndex {
    #[must_use]
    pub const fn new(config: SlicesConfig) -> Self {
        Self { config }
    }
}

impl Inspection for RedundantSliceIndex {
    fn name(&self) -> &'static str {
        NAME
    }

    fn metadata(&self) -> InspectionMetadata {
        InspectionMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: "Slice bound equal to the length of the sliced operand".to_string(),
            rules: vec![RULE.to_string()],
            default_severity: Severity::Warning,
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
            if let NodeKind::Slice(slice) = ast.kind(node)
                && let Some(high) = redundant_high(pass, slice)
            {
                reporter.report_node(pass, RULE, high, "Redundant index");
            }
        }
        Ok(())
    }
}

/// Factory used by the analyzer facade.
#[must_use]
pub fn init_inspection() -> BoxInspection {
    Box::new(RedundantSliceIndex::default())
}

/// Create inspection with custom config
#[must_use]
pub fn init_inspection_with_config(config: SlicesConfig) -> BoxInspection {
    Box::new(RedundantSliceIndex::new(config))
}

/// Convert `InspectionSettings` to `SlicesConfig`
#[must_use]
pub fn config_from_settings(settings: &InspectionSettings) -> SlicesConfig {
    SlicesConfig {
        severity: settings.severity().unwrap_or(Severity::Warning),
    }
}

/// The `len(x)` high bound of `x[a:len(x)]`, when it repeats the default.
fn redundant_high(pass: &AnalysisPass<'_>, slice: &SliceExpr) -> Option<NodeId> {
    let ast = pass.ast();
    // the three-index form needs an explicit high bound
    if slice.max.is_some() {
        return None;
    }
    // `pkg.X[:len(pkg.X)]` is left alone
    if !matches!(ast.kind(slice.operand), NodeKind::Ident(_)) {
        return None;
    }
    let high = slice.high?;
    let NodeKind::Call(call) = ast.kind(high) else {
        return None;
    };
    if !matches!(
        pass.resolve(call.callee),
        Some(Resolution::Builtin(Builtin::Func(BuiltinFunc::Len)))
    ) {
        return None;
    }
    let [arg] = call.args.as_slice() else {
        return None;
    };
    if !matches!(ast.kind(*arg), NodeKind::Ident(_) | NodeKind::Selector(_)) {
        return None;
    }
    let operand = pass.resolve(slice.operand)?;
    (pass.resolve(*arg)? == operand).then_some(high)
}

#[cfg(test)]
mod tests {
    use super::*;
    use goanalyze_abi::Diagnostics;
    use goanalyze_ast::ScopeResolver;

    fn findings(src: &str) -> Vec<(String, String)> {
        let ast = goanalyze_syntax::parse_package("example.com/p", &[("p.go", src)])
            .expect("parse");
        let pass = AnalysisPass::new(&ast, &ScopeResolver);
        let file = ast.file_ids().next().expect("one file");
        let mut diags = Diagnostics::new();
        RedundantSliceIndex::default()
            .check_file(&pass, file, &mut diags)
            .expect("not canceled");
        let source = &ast.file(file).text;
        diags
            .into_iter()
            .map(|d| (source[d.span.start..d.span.end].to_string(), d.message))
            .collect()
    }

    #[test]
    fn len_of_the_sliced_operand() {
        let src = "package p\nfunc f(xs []int, s string) {\n\t_ = xs[1:len(xs)]\n\t_ = s[:len(s)]\n}\n";
        assert_eq!(
            findings(src),
            vec![
                ("len(xs)".to_string(), "Redundant index".to_string()),
                ("len(s)".to_string(), "Redundant index".to_string()),
            ]
        );
    }

    #[test]
    fn other_bounds_pass() {
        let src = "package p\nfunc f(xs, ys []int) {\n\t_ = xs[1:len(ys)]\n\t_ = xs[:len(xs):len(xs)]\n\t_ = xs[:len(xs)-1]\n\t_ = xs[:cap(xs)]\n\t_ = xs[1:]\n\tlen := func(v []int) int { return 0 }\n\t_ = xs[:len(xs)]\n}\n";
        assert!(findings(src).is_empty());
    }
}
