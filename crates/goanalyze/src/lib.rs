#![warn(rust_2024_compatibility, clippy::all)]

//! goanalyze - semantic inspections for Go source.
//!
//! The facade wires the inspection crates into one [`Analyzer`] according to
//! `.goanalyze.toml`, loads packages through the tree-sitter front-end and
//! renders findings as `path:line:col` lines or JSON.

mod inspections;
pub mod output;
mod package;

pub use goanalyze_abi::{Diagnostic, Severity, Span};
pub use goanalyze_core::{Analyzer, AnalyzerConfig, CancellationToken, ConfigError, FileReport};
pub use inspections::{INSPECTIONS, init_analyzer};
pub use package::{PackageReport, analyze_package, analyze_sources, load_package};
