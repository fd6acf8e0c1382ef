#![warn(rust_2024_compatibility, clippy::all)]

//! inspection.printf - format strings of printf-style calls and the operands
//! of print-style calls.

mod argtype;
pub mod format;
pub mod verbs;

use std::collections::HashMap;

use goanalyze_abi::{DiagnosticSink, InspectionMetadata, Severity};
use goanalyze_ast::node::CallExpr;
use goanalyze_ast::{FileId, NodeId, NodeKind, Resolution};
use goanalyze_core::{
    AnalysisPass, BoxInspection, CallTarget, Canceled, Inspection, InspectionSettings, Reporter,
};

pub use format::{Placeholder, PlaceholderState, parse_format};
pub use verbs::{ArgKinds, Verb, lookup_verb};

/// Inspection name, also the configuration key.
pub const NAME: &str = "printf";

const RULES: [&str; 13] = [
    "format-not-string",
    "no-placeholder",
    "missing-verb",
    "bad-index-syntax",
    "unknown-verb",
    "bad-flag",
    "zero-index",
    "arg-count",
    "func-value",
    "wrong-type",
    "star-not-int",
    "print-directive",
    "redundant-newline",
];

/// Configuration for the printf inspection
#[derive(Debug, Clone)]
pub struct PrintfConfig {
    pub severity: Severity,
    /// Lowercased function name to format argument position; any package.
    pub extra_formatting_functions: HashMap<String, usize>,
    /// Lowercased print-style function names.
    pub extra_printing_functions: Vec<String>,
    /// Match argument types against verbs.
    pub check_argument_types: bool,
}

impl Default for PrintfConfig {
    fn default() -> Self {
        Self {
            severity: Severity::Warning,
            extra_formatting_functions: HashMap::new(),
            extra_printing_functions: Vec::new(),
            check_argument_types: true,
        }
    }
}

#[derive(Default)]
pub struct Printf {
    config: PrintfConfig,
}

/// How a recognized call is checked.
enum CallKind {
    Format { position: usize },
    Print { newline: bool },
}

/// One call under inspection.
struct Site<'c> {
    node: NodeId,
    call: &'c CallExpr,
    /// Callee as written, e.g. `fmt.Printf`.
    name: &'c str,
}

impl Printf {
    #[must_use]
    pub const fn new(config: PrintfConfig) -> Self {
        Self { config }
    }

    fn classify(&self, pass: &AnalysisPass<'_>, callee: NodeId) -> Option<CallKind> {
        let name = callee_name(pass, callee)?.to_lowercase();
        let package = callee_package(pass, callee)?;

        if verbs::FORMATTING_PACKAGES.contains(&package.as_str())
            && let Some(position) = verbs::formatting_position(&name)
        {
            return Some(CallKind::Format { position });
        }
        if let Some(&position) = self.config.extra_formatting_functions.get(&name) {
            return Some(CallKind::Format { position });
        }
        if verbs::is_printing_function(&name)
            || self.config.extra_printing_functions.contains(&name)
        {
            return Some(CallKind::Print {
                newline: name.ends_with("ln"),
            });
        }
        None
    }

    fn check_printf(
        &self,
        pass: &AnalysisPass<'_>,
        reporter: &mut Reporter<'_>,
        site: &Site<'_>,
        position: usize,
    ) {
        let args = &site.call.args;
        let Some(&format_arg) = args.get(position) else {
            return;
        };
        if let Some(ty) = pass.infer(format_arg)
            && !pass.is_string(&ty)
        {
            reporter.report_node(
                pass,
                "format-not-string",
                format_arg,
                "Value used for formatting text does not appear to be a string",
            );
            return;
        }
        let Some(format) = pass.string_value(format_arg) else {
            tracing::trace!("format argument of {} is not a constant", site.name);
            return;
        };

        let provided = args.len() - position - 1;
        if !format.contains('%') {
            if provided > 0 {
                reporter.report_node(
                    pass,
                    "no-placeholder",
                    format_arg,
                    "Value used for formatting text does not appear to contain a placeholder",
                );
            }
            return;
        }

        let placeholders = parse_format(&format);
        for placeholder in &placeholders {
            // one finding per call is enough
            if !self.check_placeholder(pass, reporter, site, position, provided, placeholder) {
                return;
            }
        }

        if site.call.spread {
            return;
        }
        let max = placeholders
            .iter()
            .flat_map(|p| p.arguments.iter().copied())
            .max()
            .unwrap_or(0);
        if max != provided {
            reporter.report_node(
                pass,
                "arg-count",
                format_arg,
                format!("Got {max} placeholder(s) for {provided} arguments(s)"),
            );
        }
    }

    /// Validate one directive; `false` ends the check of the call.
    fn check_placeholder(
        &self,
        pass: &AnalysisPass<'_>,
        reporter: &mut Reporter<'_>,
        site: &Site<'_>,
        position: usize,
        provided: usize,
        placeholder: &Placeholder,
    ) -> bool {
        let format_arg = site.call.args[position];
        let name = site.name;

        match placeholder.state {
            PlaceholderState::Ok => {}
            PlaceholderState::MissingVerbAtEnd => {
                reporter.report_node(
                    pass,
                    "missing-verb",
                    format_arg,
                    format!("Missing verb at end of format string in {name} call"),
                );
                return false;
            }
            PlaceholderState::ArgumentIndexNotNumeric => {
                reporter.report_node(
                    pass,
                    "bad-index-syntax",
                    format_arg,
                    format!("Illegal syntax for {name} argument index, expecting a number"),
                );
                return false;
            }
        }

        let Some(verb) = placeholder.verb.and_then(lookup_verb) else {
            reporter.report_node(
                pass,
                "unknown-verb",
                format_arg,
                format!("Unrecognized formatting verb in {name} call"),
            );
            return false;
        };
        if let Some(flag) = placeholder.flags.chars().find(|&f| !verb.allows_flag(f)) {
            reporter.report_node(
                pass,
                "bad-flag",
                format_arg,
                format!("Unrecognized {name} flag for verb {}: {flag} call", verb.verb),
            );
            return false;
        }

        for &n in &placeholder.arguments {
            if n == 0 {
                reporter.report_node(pass, "zero-index", format_arg, "Index value [0] is not allowed");
                return false;
            }
            if n > provided {
                if !site.call.spread {
                    reporter.report_node(
                        pass,
                        "arg-count",
                        format_arg,
                        format!("Got {n} placeholder(s) for {provided} arguments(s)"),
                    );
                }
                return false;
            }
        }
        // a spread slice says nothing about the types of its elements
        if site.call.spread {
            return true;
        }

        let ast = pass.ast();
        if self.config.check_argument_types {
            for &n in placeholder.star_arguments() {
                let arg = site.call.args[position + n];
                if let Some(ty) = pass.infer(arg)
                    && !pass.is_integer(&ty)
                {
                    reporter.report_node(
                        pass,
                        "star-not-int",
                        arg,
                        format!("Arg {} for * in printf format not of type int", ast.text(arg)),
                    );
                    return false;
                }
            }
        }

        let Some(n) = placeholder.verb_argument() else {
            return true;
        };
        let arg = site.call.args[position + n];
        let Some(ty) = pass.infer(arg) else {
            return true;
        };
        if pass.is_function(&ty) && !verb.takes_function_values() {
            report_function_value(pass, reporter, arg);
            return false;
        }
        if self.config.check_argument_types && !argtype::accepts(pass, verb, &ty) {
            reporter.report_node(
                pass,
                "wrong-type",
                arg,
                format!(
                    "Arg {} for printf verb %{} of wrong type: {}",
                    ast.text(arg),
                    verb.verb,
                    ty.relative_to(&ast.file_of(arg).import_path)
                ),
            );
            return false;
        }
        true
    }

    fn check_print(
        &self,
        pass: &AnalysisPass<'_>,
        reporter: &mut Reporter<'_>,
        site: &Site<'_>,
        newline: bool,
    ) {
        let args = &site.call.args;
        let Some(&first) = args.first() else {
            return;
        };
        let ast = pass.ast();
        if pass.infer(first).is_some_and(|t| pass.is_string(&t))
            && pass.string_value(first).is_some_and(|s| s.contains('%'))
        {
            reporter.report_node(
                pass,
                "print-directive",
                first,
                format!("Possible formatting directive in {}", ast.text(first)),
            );
            return;
        }

        for &arg in args {
            let Some(ty) = pass.infer(arg) else {
                continue;
            };
            if newline && pass.is_string(&ty) {
                if pass.string_value(arg).is_some_and(|s| s.ends_with('\n')) {
                    reporter.report_node(
                        pass,
                        "redundant-newline",
                        arg,
                        "Function already ends with new line",
                    );
                }
            } else if pass.is_function(&ty) {
                report_function_value(pass, reporter, arg);
            }
        }
    }
}

impl Inspection for Printf {
    fn name(&self) -> &'static str {
        NAME
    }

    fn metadata(&self) -> InspectionMetadata {
        InspectionMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: "Format strings and operands of printf- and print-style calls".to_string(),
            rules: RULES.iter().map(ToString::to_string).collect(),
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
            let NodeKind::Call(call) = ast.kind(node) else {
                continue;
            };
            let Some(kind) = self.classify(pass, call.callee) else {
                continue;
            };
            let site = Site {
                node,
                call,
                name: ast.text(call.callee),
            };
            tracing::trace!("checking {} at {:?}", site.name, ast.span(site.node));
            match kind {
                CallKind::Format { position } => {
                    self.check_printf(pass, &mut reporter, &site, position);
                }
                CallKind::Print { newline } => self.check_print(pass, &mut reporter, &site, newline),
            }
        }
        Ok(())
    }
}

/// Factory used by the analyzer facade.
#[must_use]
pub fn init_inspection() -> BoxInspection {
    Box::new(Printf::default())
}

/// Create inspection with custom config
#[must_use]
pub fn init_inspection_with_config(config: PrintfConfig) -> BoxInspection {
    Box::new(Printf::new(config))
}

/// Convert `InspectionSettings` to `PrintfConfig`
#[must_use]
pub fn config_from_settings(settings: &InspectionSettings) -> PrintfConfig {
    let defaults = PrintfConfig::default();
    PrintfConfig {
        severity: settings.severity().unwrap_or(defaults.severity),
        extra_formatting_functions: settings
            .extra_formatting_functions
            .iter()
            .flatten()
            .map(|(name, &position)| (name.to_lowercase(), position))
            .collect(),
        extra_printing_functions: settings
            .extra_printing_functions
            .iter()
            .flatten()
            .map(|name| name.to_lowercase())
            .collect(),
        check_argument_types: settings
            .check_argument_types
            .unwrap_or(defaults.check_argument_types),
    }
}

fn report_function_value(pass: &AnalysisPass<'_>, reporter: &mut Reporter<'_>, arg: NodeId) {
    let ast = pass.ast();
    let message = if matches!(ast.kind(arg), NodeKind::Call(_)) {
        format!(
            "Final return type of {} is a function not a function call",
            ast.text(arg)
        )
    } else {
        format!("Argument {} is not a function call", ast.text(arg))
    };
    reporter.report_node(pass, "func-value", arg, message);
}

fn callee_name<'a>(pass: &'a AnalysisPass<'_>, callee: NodeId) -> Option<&'a str> {
    match pass.ast().kind(callee) {
        NodeKind::Ident(ident) => Some(&ident.name),
        NodeKind::Selector(sel) => Some(&sel.field),
        NodeKind::Paren(p) => callee_name(pass, p.expr),
        _ => None,
    }
}

/// Import path of the package declaring a function or method callee.
///
/// A package-qualified call into a package missing from the snapshot still
/// reports the qualifier's import path.
fn callee_package(pass: &AnalysisPass<'_>, callee: NodeId) -> Option<String> {
    match pass.resolve_call(callee) {
        CallTarget::Func {
            decl: Some(_),
            import_path: Some(path),
            ..
        } => Some(path),
        CallTarget::Unknown => match pass.ast().kind(callee) {
            NodeKind::Selector(sel) => match pass.resolve(sel.operand) {
                Some(Resolution::Package(path)) => Some(path),
                _ => None,
            },
            NodeKind::Paren(p) => callee_package(pass, p.expr),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_are_normalized() {
        let settings = InspectionSettings {
            severity: Some("error".to_string()),
            extra_formatting_functions: Some(HashMap::from([("MyPrintf".to_string(), 1)])),
            extra_printing_functions: Some(vec!["Emit".to_string()]),
            check_argument_types: Some(false),
            ..Default::default()
        };
        let config = config_from_settings(&settings);
        assert_eq!(config.severity, Severity::Error);
        assert_eq!(config.extra_formatting_functions.get("myprintf"), Some(&1));
        assert_eq!(config.extra_printing_functions, vec!["emit"]);
        assert!(!config.check_argument_types);
    }

    #[test]
    fn defaults_check_types_as_warnings() {
        let config = config_from_settings(&InspectionSettings::default());
        assert_eq!(config.severity, Severity::Warning);
        assert!(config.check_argument_types);
        let inspection = init_inspection();
        assert_eq!(inspection.name(), "printf");
        assert_eq!(inspection.metadata().rules.len(), RULES.len());
    }
}
