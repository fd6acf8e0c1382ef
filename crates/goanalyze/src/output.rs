//! Output formatting and diagnostic display

use std::collections::HashSet;

use goanalyze_abi::{Diagnostic, Severity, Span};
use goanalyze_ast::Ast;
use goanalyze_core::FileReport;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SerializableDiagnostic {
    pub path: String,
    pub line: usize,
    pub col: usize,
    pub rule: String,
    pub message: String,
    pub severity: Severity,
    pub span: Span,
}

/// `path:line:col: severity rule: message`
#[must_use]
pub fn format_diagnostic(path: &str, source: &str, diag: &Diagnostic) -> String {
    let (line, col) = byte_to_line_col(source, diag.span.start);
    format!(
        "{path}:{line}:{col}: {severity} {rule}: {msg}",
        severity = diag.severity,
        rule = diag.rule,
        msg = diag.message
    )
}

/// 1-based line and column (in characters) of a byte offset.
#[must_use]
pub fn byte_to_line_col(src: &str, byte_idx: usize) -> (usize, usize) {
    let mut line = 1;
    let mut col = 1;
    for (i, ch) in src.char_indices() {
        if i >= byte_idx {
            return (line, col);
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}

/// Flatten reports into located diagnostics, dropping exact repeats.
#[must_use]
pub fn serializable(ast: &Ast, reports: &[FileReport]) -> Vec<SerializableDiagnostic> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for report in reports {
        let source = &ast.file(report.file).text;
        for diag in &report.diagnostics {
            let key = (
                report.file,
                diag.span.start,
                diag.span.end,
                diag.rule.as_str(),
                diag.message.as_str(),
            );
            if !seen.insert(key) {
                continue;
            }
            let (line, col) = byte_to_line_col(source, diag.span.start);
            out.push(SerializableDiagnostic {
                path: report.path.to_string(),
                line,
                col,
                rule: diag.rule.clone(),
                message: diag.message.clone(),
                severity: diag.severity,
                span: diag.span,
            });
        }
    }
    out
}

/// One line per finding.
#[must_use]
pub fn render_human(ast: &Ast, reports: &[FileReport]) -> String {
    let mut out = String::new();
    for report in reports {
        let source = &ast.file(report.file).text;
        for diag in &report.diagnostics {
            out.push_str(&format_diagnostic(report.path.as_str(), source, diag));
            out.push('\n');
        }
    }
    out
}

/// Pretty-printed JSON array of [`SerializableDiagnostic`].
///
/// # Errors
///
/// Returns a `serde_json` error if serialization fails.
pub fn render_json(ast: &Ast, reports: &[FileReport]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&serializable(ast, reports))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_and_column() {
        let src = "package p\n\nfunc f() {}\n";
        assert_eq!(byte_to_line_col(src, 0), (1, 1));
        assert_eq!(byte_to_line_col(src, 8), (1, 9));
        assert_eq!(byte_to_line_col(src, 11), (3, 1));
        assert_eq!(byte_to_line_col(src, 16), (3, 6));
        assert_eq!(byte_to_line_col(src, src.len()), (4, 1));
    }

    #[test]
    fn columns_count_characters() {
        let src = "x := \"é\" + 1";
        let plus = src.find('+').expect("operator");
        assert_eq!(byte_to_line_col(src, plus), (1, 10));
    }

    #[test]
    fn human_line() {
        let src = "package p\nvar a, b = 1\n";
        let diag = Diagnostic {
            rule: "assignment-count/count-mismatch".to_string(),
            message: "Assignment count mismatch: 1 element(s) assigned to 2 element(s)".to_string(),
            span: Span::new(10, 22),
            severity: Severity::Error,
        };
        assert_eq!(
            format_diagnostic("p.go", src, &diag),
            "p.go:2:1: error assignment-count/count-mismatch: \
             Assignment count mismatch: 1 element(s) assigned to 2 element(s)"
        );
    }
}
