use anyhow::Result;
use goanalyze_abi::{DiagnosticSink, InspectionMetadata, Severity};
use goanalyze_ast::{FileId, NodeKind};
use goanalyze_core::{
    AnalysisPass, Analyzer, Canceled, CancellationToken, Inspection, Reporter,
};
use goanalyze_syntax::SnapshotBuilder;

/// Flags every call expression; enough to observe the analyzer plumbing.
struct CallCounter;

impl Inspection for CallCounter {
    fn name(&self) -> &'static str {
        "calls"
    }

    fn metadata(&self) -> InspectionMetadata {
        InspectionMetadata {
            version: "0.1.0".into(),
            description: "test".into(),
            rules: vec!["call".into()],
            default_severity: Severity::Info,
        }
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
            if matches!(ast.kind(node), NodeKind::Call(_)) {
                reporter.report_node(pass, "call", node, ast.text(node));
            }
        }
        Ok(())
    }
}

fn snapshot() -> Result<goanalyze_ast::Ast> {
    let mut builder = SnapshotBuilder::new()?;
    builder.add_file("a.go", "p", "package p\nfunc a() { b(); b() }\n")?;
    builder.add_file("b.go", "p", "package p\nfunc b() { a() }\n")?;
    Ok(builder.finish())
}

#[test]
fn reports_per_file_with_rule_prefix_and_severity() -> Result<()> {
    let ast = snapshot()?;
    let analyzer = Analyzer::new().with_inspection(Box::new(CallCounter));
    let mut reports = analyzer.analyze(&ast)?;
    reports.sort_by(|x, y| x.path.cmp(&y.path));

    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].path.as_str(), "a.go");
    assert_eq!(reports[0].diagnostics.len(), 2);
    assert_eq!(reports[1].diagnostics.len(), 1);
    let first = &reports[0].diagnostics[0];
    assert_eq!(first.rule, "calls/call");
    assert_eq!(first.message, "b()");
    assert_eq!(first.severity, Severity::Info);
    Ok(())
}

#[test]
fn canceled_runs_report_nothing() -> Result<()> {
    let ast = snapshot()?;
    let token = CancellationToken::new();
    token.cancel();
    let analyzer = Analyzer::new()
        .with_inspection(Box::new(CallCounter))
        .with_cancellation(token);
    assert_eq!(analyzer.analyze(&ast).err(), Some(Canceled));
    Ok(())
}

#[test]
fn lists_loaded_inspections() {
    let analyzer = Analyzer::new().with_inspection(Box::new(CallCounter));
    assert_eq!(analyzer.inspection_names().collect::<Vec<_>>(), vec!["calls"]);
}

#[test]
fn long_operator_chains_analyze_on_pool_threads() -> Result<()> {
    let mut src = String::from("package p\nvar n int\nvar z = n");
    for _ in 1..10_000 {
        src.push_str(" + f()");
    }
    src.push_str("\nfunc f() int { return 1 }\n");
    let mut builder = SnapshotBuilder::new()?;
    builder.add_file("chain.go", "p", &src)?;
    let ast = builder.finish();

    let analyzer = Analyzer::new().with_inspection(Box::new(CallCounter));
    let reports = analyzer.analyze(&ast)?;
    assert_eq!(reports[0].diagnostics.len(), 9_999);
    Ok(())
}
