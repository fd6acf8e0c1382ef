#![warn(rust_2024_compatibility, clippy::all)]

//! Plain data shared by the analyzer core and every inspection crate.

use serde::{Deserialize, Serialize};

/// Byte offsets into the source file (half-open range).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// Create a new span with the given start and end offsets.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Check if this span is empty (start >= end).
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// True when `other` lies entirely inside this span.
    #[must_use]
    pub const fn contains(&self, other: Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// How loudly a finding should be surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    #[default]
    Error,
    Warning,
    WeakWarning,
    Info,
}

impl Severity {
    /// Parse the configuration spelling (`error`, `warning`, `weak-warning`, `info`).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "error" => Some(Self::Error),
            "warning" => Some(Self::Warning),
            "weak-warning" => Some(Self::WeakWarning),
            "info" => Some(Self::Info),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::WeakWarning => "weak-warning",
            Self::Info => "info",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Rule identifier, e.g. "printf/unrecognized-verb".
    pub rule: String,
    pub message: String,
    pub span: Span,
    pub severity: Severity,
}

pub type Diagnostics = Vec<Diagnostic>;

/// Receiver of findings. The analyzer never prints; it reports here.
pub trait DiagnosticSink {
    fn report(&mut self, rule: &str, span: Span, message: String, severity: Severity);
}

impl DiagnosticSink for Diagnostics {
    fn report(&mut self, rule: &str, span: Span, message: String, severity: Severity) {
        self.push(Diagnostic {
            rule: rule.to_string(),
            message,
            span,
            severity,
        });
    }
}

/// Descriptive metadata for an inspection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectionMetadata {
    /// Inspection's own version.
    pub version: String,
    /// Human-readable description
    pub description: String,
    /// Rule names this inspection may emit, without the inspection prefix.
    pub rules: Vec<String>,
    pub default_severity: Severity,
}

impl InspectionMetadata {
    #[must_use]
    pub fn emits(&self, rule: &str) -> bool {
        self.rules.iter().any(|r| r == rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_contains_and_len() {
        let outer = Span::new(2, 10);
        assert!(outer.contains(Span::new(2, 10)));
        assert!(outer.contains(Span::new(4, 6)));
        assert!(!outer.contains(Span::new(1, 6)));
        assert_eq!(outer.len(), 8);
        assert!(Span::new(5, 5).is_empty());
    }

    #[test]
    fn severity_parses_config_spelling() {
        assert_eq!(Severity::parse("weak-warning"), Some(Severity::WeakWarning));
        assert_eq!(Severity::parse("fatal"), None);
        assert_eq!(Severity::Warning.to_string(), "warning");
    }

    #[test]
    fn vec_sink_collects_reports() {
        let mut diags = Diagnostics::new();
        diags.report("assign/count-mismatch", Span::new(0, 3), "boom".into(), Severity::Error);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].rule, "assign/count-mismatch");
    }

    #[test]
    fn diagnostic_serializes_kebab_severity() {
        let diag = Diagnostic {
            rule: "printf/missing-verb".into(),
            message: "m".into(),
            span: Span::new(1, 2),
            severity: Severity::WeakWarning,
        };
        let json = serde_json::to_string(&diag).unwrap();
        assert!(json.contains("\"weak-warning\""));
    }
}
