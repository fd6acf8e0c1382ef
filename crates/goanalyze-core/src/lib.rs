#![warn(rust_2024_compatibility, clippy::all)]

//! Analyzer core: the Go type model, type inference over a syntax snapshot,
//! and the host that runs inspections.

pub mod analyzer;
pub mod config;
mod constant;
mod infer;
pub mod inspection;
mod pass;
mod typeops;
pub mod types;

pub use analyzer::{Analyzer, FileReport};
pub use config::{AnalysisSettings, AnalyzerConfig, ConfigError, InspectionSettings};
pub use constant::unescape;
pub use infer::{CallTarget, Member};
pub use inspection::{BoxInspection, Inspection, Reporter};
pub use pass::{AnalysisPass, Canceled, CancellationToken, DEFAULT_MAX_DEPTH, MAX_INFERENCE_DEPTH};
pub use types::{
    BasicKind, ChanDir, InterfaceType, Method, NamedType, ParamGroup, Relative, Signature,
    StructField, StructType, Type, UntypedKind,
};
