//! inspection.string-index-is-byte - a string index compared with a string literal.
//!
//! `s[i]` is a byte, so `s[0] == "a"` never compiles; `s[0] == 'a'` was meant.

use goanalyze_abi::{DiagnosticSink, InspectionMetadata, Severity};
use goanalyze_ast::node::{BinaryExpr, LitKind};
use goanalyze_ast::{FileId, NodeId, NodeKind};
use goanalyze_core::{
    AnalysisPass, BoxInspection, Canceled, Inspection, InspectionSettings, Reporter,
};

/// Inspection name, also the configuration key.
pub const NAME: &str = "string-index-is-byte";

const RULE: &str = "mismatch";

/// Configuration for the string-index-is-byte inspection
#[derive(Debug, Clone)]
pub struct StringIndexConfig {
    pub severity: Severity,
}

impl Default for StringIndexConfig {
    fn default() -> Self {
        Self {
            severity: Severity::Error,
        }
    }
}

#[derive(Default)]
pub struct StringIndexIsByte {
    config: StringIndexConfig,
}

impl StringIndexIsByte {
    #[must_use]
    pub const fn new(config: StringIndexConfig) -> Self {
        Self { config }
    }
}

impl Inspection for StringIndexIsByte {
    fn name(&self) -> &'static str {
        NAME
    }

    fn metadata(&self) -> InspectionMetadata {
        InspectionMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: "String index compared with a string literal".to_string(),
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
            if let NodeKind::Binary(b) = ast.kind(node)
                && b.op.is_comparison()
                && compares_index_with_string(pass, b)
            {
                reporter.report_node(pass, RULE, node, "Mismatched types: byte and string");
            }
        }
        Ok(())
    }
}

/// Factory used by the analyzer facade.
#[must_use]
pub fn init_inspection() -> BoxInspection {
    Box::new(StringIndexIsByte::default())
}

/// Create inspection with custom config
#[must_use]
pub fn init_inspection_with_config(config: StringIndexConfig) -> BoxInspection {
    Box::new(StringIndexIsByte::new(config))
}

/// Convert `InspectionSettings` to `StringIndexConfig`
#[must_use]
pub fn config_from_settings(settings: &InspectionSettings) -> StringIndexConfig {
    StringIndexConfig {
        severity: settings.severity().unwrap_or(Severity::Error),
    }
}

fn compares_index_with_string(pass: &AnalysisPass<'_>, b: &BinaryExpr) -> bool {
    (is_string_index(pass, b.left) && is_string_literal(pass, b.right))
        || (is_string_literal(pass, b.left) && is_string_index(pass, b.right))
}

fn is_string_literal(pass: &AnalysisPass<'_>, expr: NodeId) -> bool {
    matches!(
        pass.ast().kind(expr),
        NodeKind::BasicLit(lit) if matches!(lit.kind, LitKind::String | LitKind::RawString)
    )
}

/// `s[i]` on a string operand; slices `s[i:j]` are strings themselves.
fn is_string_index(pass: &AnalysisPass<'_>, expr: NodeId) -> bool {
    let NodeKind::Index(index) = pass.ast().kind(expr) else {
        return false;
    };
    pass.infer(index.operand)
        .is_some_and(|ty| pass.is_string(&ty))
}
