#![warn(rust_2024_compatibility, clippy::all)]

//! Syntax tree access layer for goanalyze.
//!
//! The analyzer core only ever sees Go code through this crate: an arena of
//! typed nodes with parent/child/sibling navigation and source ranges, plus
//! the [`Resolve`] oracle that maps references to declarations.

mod arena;
pub mod node;
pub mod resolve;
pub mod universe;

pub use arena::{Ast, AstBuilder, Descendants, FileId, Mark, Node, NodeId, SourceFile};
pub use node::NodeKind;
pub use resolve::{CGO_PACKAGE, Resolution, Resolve, ScopeResolver};
pub use universe::{BasicKind, Builtin, BuiltinFunc};
