//! inspection.assignment-to-receiver - assigning to the receiver variable itself.
//!
//! The receiver is a copy: a new value is visible inside the method only,
//! and a new pointer does not reach the caller.

use goanalyze_abi::{DiagnosticSink, InspectionMetadata, Severity};
use goanalyze_ast::node::Assign;
use goanalyze_ast::{FileId, NodeId, NodeKind, Resolution};
use goanalyze_core::{
    AnalysisPass, BoxInspection, Canceled, Inspection, InspectionSettings, Reporter, Type,
};

/// Inspection name, also the configuration key.
pub const NAME: &str = "assignment-to-receiver";

const RULE: &str = "assignment";

/// Configuration for the assignment-to-receiver inspection
#[derive(Debug, Clone)]
pub struct ReceiverConfig {
    pub severity: Severity,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            severity: Severity::WeakWarning,
        }
    }
}

#[derive(Default)]
pub struct AssignmentToReceiver {
    config: ReceiverConfig,
}

impl AssignmentToReceiver {
    #[must_use]
    pub const fn new(config: ReceiverConfig) -> Self {
        Self { config }
    }
}

impl Inspection for AssignmentToReceiver {
    fn name(&self) -> &'static str {
        NAME
    }

    fn metadata(&self) -> InspectionMetadata {
        InspectionMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: "Assignments to a method receiver that callers never see".to_string(),
            rules: vec![RULE.to_string()],
            default_severity: Severity::WeakWarning,
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
            if let NodeKind::Assign(assign) = ast.kind(node) {
                check_assign(pass, &mut reporter, assign);
            }
        }
        Ok(())
    }
}

/// Factory used by the analyzer facade.
#[must_use]
pub fn init_inspection() -> BoxInspection {
    Box::new(AssignmentToReceiver::default())
}

/// Create inspection with custom config
#[must_use]
pub fn init_inspection_with_config(config: ReceiverConfig) -> BoxInspection {
    Box::new(AssignmentToReceiver::new(config))
}

/// Convert `InspectionSettings` to `ReceiverConfig`
#[must_use]
pub fn config_from_settings(settings: &InspectionSettings) -> ReceiverConfig {
    ReceiverConfig {
        severity: settings.severity().unwrap_or(Severity::WeakWarning),
    }
}

fn check_assign(pass: &AnalysisPass<'_>, reporter: &mut Reporter<'_>, assign: &Assign) {
    let ast = pass.ast();
    for &target in &assign.lhs {
        // `*r = v` writes through the pointer, which is the point of a pointer receiver
        if !matches!(ast.kind(target), NodeKind::Ident(_)) {
            continue;
        }
        let Some(Resolution::Decl(def)) = pass.resolve(target) else {
            continue;
        };
        if !is_receiver(pass, def) {
            continue;
        }
        let Some(ty) = pass.type_of_def(def) else {
            continue;
        };
        let message = match pass.underlying(&ty) {
            // reference-like values share their backing store with the caller
            Type::Chan { .. } | Type::Slice(_) | Type::Array { .. } | Type::Map { .. } => continue,
            Type::Pointer(_) => {
                "Assignment to method receiver propagates only to callees but not to callers"
            }
            _ => "Assignment to method receiver doesn't propagate to other calls",
        };
        reporter.report_node(pass, RULE, target, message);
    }
}

/// `def` names the receiver of a method declaration.
fn is_receiver(pass: &AnalysisPass<'_>, def: NodeId) -> bool {
    let ast = pass.ast();
    let Some(param) = ast.parent(def) else {
        return false;
    };
    ast.parent(param).is_some_and(|decl| {
        matches!(ast.kind(decl), NodeKind::FuncDecl(func) if func.receiver == Some(param))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use goanalyze_abi::Diagnostics;
    use goanalyze_ast::ScopeResolver;

    fn diagnostics(src: &str) -> Diagnostics {
        let ast = goanalyze_syntax::parse_package("example.com/p", &[("p.go", src)])
            .expect("parse");
        let pass = AnalysisPass::new(&ast, &ScopeResolver);
        let file = ast.file_ids().next().expect("one file");
        let mut diags = Diagnostics::new();
        AssignmentToReceiver::default()
            .check_file(&pass, file, &mut diags)
            .expect("not canceled");
        diags
    }

    fn messages(src: &str) -> Vec<String> {
        diagnostics(src).into_iter().map(|d| d.message).collect()
    }

    #[test]
    fn value_and_pointer_receivers() {
        let src = "package p\ntype T struct{ n int }\nfunc (t T) Reset() {\n\tt = T{}\n}\nfunc (t *T) Swap(o *T) {\n\tt = o\n}\n";
        assert_eq!(
            messages(src),
            vec![
                "Assignment to method receiver doesn't propagate to other calls",
                "Assignment to method receiver propagates only to callees but not to callers",
            ]
        );
    }

    #[test]
    fn reported_as_weak_warning_on_the_receiver() {
        let src = "package p\ntype Count int\nfunc (c Count) Bump() {\n\tc += 1\n}\n";
        let diags = diagnostics(src);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].severity, Severity::WeakWarning);
        assert_eq!(diags[0].rule, "assignment-to-receiver/assignment");
        let start = src.find("c += 1").expect("assignment");
        assert_eq!((diags[0].span.start, diags[0].span.end), (start, start + 1));
    }

    #[test]
    fn writes_through_the_receiver_pass() {
        let src = "package p\ntype T struct{ n int }\ntype List []int\ntype Set map[string]bool\ntype Pipe chan int\nfunc (t *T) Set(v T) {\n\t*t = v\n\tt.n = 1\n}\nfunc (l List) Trim() {\n\tl = l[:0]\n}\nfunc (s Set) Clear() {\n\ts = Set{}\n}\nfunc (c Pipe) Drop() {\n\tc = nil\n}\nfunc plain(t T) {\n\tt = T{}\n}\n";
        assert!(messages(src).is_empty());
    }
}
