//! The contract every inspection crate implements.

use goanalyze_abi::{DiagnosticSink, InspectionMetadata, Severity, Span};
use goanalyze_ast::{FileId, NodeId};

use crate::{AnalysisPass, Canceled};

/// A check over one file of a snapshot.
pub trait Inspection: Send + Sync {
    /// Inspection name used as rule prefix and configuration key, e.g. "printf".
    #[must_use]
    fn name(&self) -> &str;

    #[must_use]
    fn metadata(&self) -> InspectionMetadata;

    /// Severity attached to every finding.
    #[must_use]
    fn severity(&self) -> Severity {
        self.metadata().default_severity
    }

    /// Inspect one file, reporting findings to `sink`.
    ///
    /// # Errors
    ///
    /// Returns [`Canceled`] when the pass is canceled midway.
    fn check_file(
        &self,
        pass: &AnalysisPass<'_>,
        file: FileId,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<(), Canceled>;

    /// Create rule identifier: `{inspection}/{rule}`.
    #[must_use]
    fn rule(&self, rule_name: &str) -> String {
        format!("{}/{}", self.name(), rule_name)
    }
}

/// Boxed inspection for dynamic dispatch.
pub type BoxInspection = Box<dyn Inspection>;

/// Sink adapter that stamps rule prefix and severity for one inspection.
pub struct Reporter<'s> {
    name: String,
    severity: Severity,
    sink: &'s mut dyn DiagnosticSink,
}

impl<'s> Reporter<'s> {
    pub fn new(inspection: &dyn Inspection, sink: &'s mut dyn DiagnosticSink) -> Self {
        Self {
            name: inspection.name().to_string(),
            severity: inspection.severity(),
            sink,
        }
    }

    pub fn report(&mut self, rule: &str, span: Span, message: impl Into<String>) {
        let rule = format!("{}/{rule}", self.name);
        self.sink.report(&rule, span, message.into(), self.severity);
    }

    /// Report on the source range of `node`.
    pub fn report_node(
        &mut self,
        pass: &AnalysisPass<'_>,
        rule: &str,
        node: NodeId,
        message: impl Into<String>,
    ) {
        self.report(rule, pass.ast().span(node), message);
    }
}
