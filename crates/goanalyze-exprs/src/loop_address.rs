//! inspection.address-of-loop-variable - `&v` of a `for ... range` variable.

use goanalyze_abi::{DiagnosticSink, InspectionMetadata, Severity};
use goanalyze_ast::node::UnaryOp;
use goanalyze_ast::{FileId, NodeId, NodeKind, Resolution};
use goanalyze_core::{
    AnalysisPass, BoxInspection, Canceled, Inspection, InspectionSettings, Reporter,
};

/// Inspection name, also the configuration key.
pub const NAME: &str = "address-of-loop-variable";

const RULE: &str = "address";

/// Configuration for the address-of-loop-variable inspection
#[derive(Debug, Clone)]
pub struct LoopAddressConfig {
    pub severity: Severity,
}

impl Default for LoopAddressConfig {
    fn default() -> Self {
        Self {
            severity: Severity::Warning,
        }
    }
}

#[derive(Default)]
pub struct AddressOfLoopVariable {
    config: LoopAddressConfig,
}

impl AddressOfLoopVariable {
    #[must_use]
    pub const fn new(config: LoopAddressConfig) -> Self {
        Self { config }
    }
}

impl Inspection for AddressOfLoopVariable {
    fn name(&self) -> &'static str {
        NAME
    }

    fn metadata(&self) -> InspectionMetadata {
        InspectionMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: "Address taken of a range loop variable".to_string(),
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
            if let NodeKind::Unary(u) = ast.kind(node)
                && u.op == UnaryOp::Addr
                && is_range_variable(pass, u.operand)
            {
                reporter.report_node(
                    pass,
                    RULE,
                    node,
                    "Suspicious: obtaining address of a for loop variable",
                );
            }
        }
        Ok(())
    }
}

/// Factory used by the analyzer facade.
#[must_use]
pub fn init_inspection() -> BoxInspection {
    Box::new(AddressOfLoopVariable::default())
}

/// Create inspection with custom config
#[must_use]
pub fn init_inspection_with_config(config: LoopAddressConfig) -> BoxInspection {
    Box::new(AddressOfLoopVariable::new(config))
}

/// Convert `InspectionSettings` to `LoopAddressConfig`
#[must_use]
pub fn config_from_settings(settings: &InspectionSettings) -> LoopAddressConfig {
    LoopAddressConfig {
        severity: settings.severity().unwrap_or(Severity::Warning),
    }
}

/// An unqualified reference to a variable declared by `for k, v := range`.
fn is_range_variable(pass: &AnalysisPass<'_>, operand: NodeId) -> bool {
    let ast = pass.ast();
    if !matches!(ast.kind(operand), NodeKind::Ident(_)) {
        return false;
    }
    matches!(
        pass.resolve(operand),
        Some(Resolution::Decl(def)) if ast
            .parent(def)
            .is_some_and(|p| matches!(ast.kind(p), NodeKind::Range(_)))
    )
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
        AddressOfLoopVariable::default()
            .check_file(&pass, file, &mut diags)
            .expect("not canceled");
        let source = &ast.file(file).text;
        diags
            .into_iter()
            .map(|d| (source[d.span.start..d.span.end].to_string(), d.message))
            .collect()
    }

    #[test]
    fn address_of_range_key_and_value() {
        let src = "package p\nfunc f(xs []int) []*int {\n\tvar out []*int\n\tfor i, x := range xs {\n\t\tout = append(out, &x, &i)\n\t}\n\treturn out\n}\n";
        assert_eq!(
            findings(src),
            vec![
                (
                    "&x".to_string(),
                    "Suspicious: obtaining address of a for loop variable".to_string()
                ),
                (
                    "&i".to_string(),
                    "Suspicious: obtaining address of a for loop variable".to_string()
                ),
            ]
        );
    }

    #[test]
    fn other_addresses_pass() {
        let src = "package p\ntype T struct{ n int }\nfunc f(xs []T) {\n\tfor i := range xs {\n\t\t_ = &xs[i]\n\t}\n\tfor _, x := range xs {\n\t\ty := x\n\t\t_ = &y\n\t\t_ = &x.n\n\t}\n\tfor j := 0; j < 3; j++ {\n\t\t_ = &j\n\t}\n}\n";
        assert!(findings(src).is_empty());
    }
}
