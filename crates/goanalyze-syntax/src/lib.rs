#![warn(rust_2024_compatibility, clippy::all)]

//! Go front-end: parses source with tree-sitter-go and lowers it into a
//! [`goanalyze_ast::Ast`] snapshot.

mod lower;

pub use lower::MAX_NESTING;

use camino::Utf8PathBuf;
use goanalyze_ast::{Ast, AstBuilder, FileId};
use tree_sitter::Parser;

#[derive(Debug, thiserror::Error)]
pub enum SyntaxError {
    #[error("failed to set Go language: {0}")]
    Language(String),
    #[error("parser produced no tree for {0}")]
    NoTree(String),
}

/// Accumulates files into one snapshot.
pub struct SnapshotBuilder {
    parser: Parser,
    builder: AstBuilder,
}

impl SnapshotBuilder {
    /// Create a builder with the Go grammar loaded.
    ///
    /// # Errors
    ///
    /// Returns `SyntaxError::Language` if the grammar ABI does not match the
    /// linked tree-sitter runtime.
    pub fn new() -> Result<Self, SyntaxError> {
        let mut parser = Parser::new();
        let lang = tree_sitter_go::LANGUAGE;
        parser
            .set_language(&lang.into())
            .map_err(|e| SyntaxError::Language(e.to_string()))?;
        Ok(Self {
            parser,
            builder: AstBuilder::new(),
        })
    }

    /// Parse and lower one file belonging to the package at `import_path`.
    ///
    /// Syntax errors do not fail the call; the affected regions become bad nodes.
    ///
    /// # Errors
    ///
    /// Returns `SyntaxError::NoTree` if tree-sitter gives up on the input.
    pub fn add_file(
        &mut self,
        path: impl Into<Utf8PathBuf>,
        import_path: &str,
        source: &str,
    ) -> Result<FileId, SyntaxError> {
        let path = path.into();
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| SyntaxError::NoTree(path.to_string()))?;
        let root = tree.root_node();
        if root.has_error() {
            tracing::debug!(%path, "source has syntax errors");
        }

        let file = self.builder.begin_file(path, import_path, source);
        lower::Lowerer::new(&mut self.builder, source).source_file(root);
        Ok(file)
    }

    #[must_use]
    pub fn finish(self) -> Ast {
        self.builder.finish()
    }
}

/// Parse a single-package set of `(path, source)` files.
///
/// # Errors
///
/// Returns an error if the grammar cannot be loaded or a file yields no tree.
pub fn parse_package(import_path: &str, files: &[(&str, &str)]) -> Result<Ast, SyntaxError> {
    let mut builder = SnapshotBuilder::new()?;
    for (path, source) in files {
        builder.add_file(*path, import_path, source)?;
    }
    Ok(builder.finish())
}
