//! inspection.duplicate-function - functions and methods declared twice.

use goanalyze_abi::{DiagnosticSink, InspectionMetadata, Severity};
use goanalyze_ast::node::FuncDecl;
use goanalyze_ast::{Ast, FileId, NodeId, NodeKind, SourceFile};
use goanalyze_core::{
    AnalysisPass, BoxInspection, Canceled, Inspection, InspectionSettings, Reporter,
};

/// Inspection name, also the configuration key.
pub const NAME: &str = "duplicate-function";

const RULES: [&str; 2] = ["function", "method"];

/// Configuration for the duplicate-function inspection
#[derive(Debug, Clone)]
pub struct DuplicatesConfig {
    pub severity: Severity,
}

impl Default for DuplicatesConfig {
    fn default() -> Self {
        Self {
            severity: Severity::Error,
        }
    }
}

#[derive(Default)]
pub struct DuplicateFunctions {
    config: DuplicatesConfig,
}

impl DuplicateFunctions {
    #[must_use]
    pub const fn new(config: DuplicatesConfig) -> Self {
        Self { config }
    }
}

impl Inspection for DuplicateFunctions {
    fn name(&self) -> &'static str {
        NAME
    }

    fn metadata(&self) -> InspectionMetadata {
        InspectionMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: "Functions or methods declared more than once".to_string(),
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
        let source = ast.file(file);
        let Some(root) = source.root else {
            return Ok(());
        };
        let NodeKind::File(file_node) = ast.kind(root) else {
            return Ok(());
        };
        let mut reporter = Reporter::new(self, sink);

        for &decl in &file_node.decls {
            pass.check_canceled()?;
            let NodeKind::FuncDecl(func) = ast.kind(decl) else {
                continue;
            };
            let Some(name) = ast.name_of(func.name) else {
                continue;
            };
            if name == "_" {
                continue;
            }

            match func.receiver {
                None if is_duplicate_function(ast, source, func, name) => {
                    reporter.report_node(pass, "function", func.name, "Duplicate function name");
                }
                Some(receiver) => {
                    let Some(base) = ast.receiver_base_name(receiver) else {
                        continue;
                    };
                    let duplicate = ast
                        .methods_of(&source.import_path, base)
                        .iter()
                        .any(|&other| other != decl && method_name(ast, other) == Some(name));
                    if duplicate {
                        reporter.report_node(pass, "method", func.name, "Duplicate method name");
                    }
                }
                None => {}
            }
        }
        Ok(())
    }
}

/// Factory used by the analyzer facade.
#[must_use]
pub fn init_inspection() -> BoxInspection {
    Box::new(DuplicateFunctions::default())
}

/// Create inspection with custom config
#[must_use]
pub fn init_inspection_with_config(config: DuplicatesConfig) -> BoxInspection {
    Box::new(DuplicateFunctions::new(config))
}

/// Convert `InspectionSettings` to `DuplicatesConfig`
#[must_use]
pub fn config_from_settings(settings: &InspectionSettings) -> DuplicatesConfig {
    DuplicatesConfig {
        severity: settings.severity().unwrap_or(Severity::Error),
    }
}

fn method_name(ast: &Ast, decl: NodeId) -> Option<&str> {
    match ast.kind(decl) {
        NodeKind::FuncDecl(f) => ast.name_of(f.name),
        _ => None,
    }
}

/// Another package-level function of the same name.
///
/// `init()` may repeat freely. `main()` of a `main` package only clashes
/// within one file, since single-file programs often share a directory.
fn is_duplicate_function(ast: &Ast, source: &SourceFile, func: &FuncDecl, name: &str) -> bool {
    let no_params = matches!(
        ast.kind(func.signature),
        NodeKind::Signature(sig) if sig.params.is_empty()
    );
    if name == "init" && no_params {
        return false;
    }
    let same_file_only = name == "main" && no_params && source.package_name == "main";

    ast.package_members(&source.import_path, name)
        .iter()
        .filter(|&&other| other != func.name)
        .filter(|&&other| {
            ast.parent(other)
                .is_some_and(|p| matches!(ast.kind(p), NodeKind::FuncDecl(_)))
        })
        .any(|&other| !same_file_only || ast.file_of(other).path == source.path)
}
