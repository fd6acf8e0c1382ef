//! Loading Go packages and running the analyzer over them.

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use goanalyze_ast::Ast;
use goanalyze_core::{AnalyzerConfig, FileReport};
use goanalyze_syntax::SnapshotBuilder;

use crate::init_analyzer;
use crate::output::{render_human, render_json};

/// A parsed package and the findings for each of its files.
pub struct PackageReport {
    pub ast: Ast,
    pub reports: Vec<FileReport>,
}

impl PackageReport {
    #[must_use]
    pub fn diagnostic_count(&self) -> usize {
        self.reports.iter().map(|r| r.diagnostics.len()).sum()
    }

    #[must_use]
    pub fn render_human(&self) -> String {
        render_human(&self.ast, &self.reports)
    }

    /// # Errors
    ///
    /// Returns a `serde_json` error if serialization fails.
    pub fn render_json(&self) -> serde_json::Result<String> {
        render_json(&self.ast, &self.reports)
    }
}

/// `.go` files directly inside `dir`, sorted by name.
fn go_files(dir: &Utf8Path) -> Result<Vec<Utf8PathBuf>> {
    let mut files = Vec::new();
    for entry in dir
        .read_dir_utf8()
        .with_context(|| format!("failed to read package directory {dir}"))?
    {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_file() && path.extension() == Some("go") {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

/// Parse every `.go` file of one package directory into a snapshot.
///
/// # Errors
///
/// Returns an error if the directory or a file cannot be read, or the Go
/// grammar cannot be loaded.
pub fn load_package(dir: &Utf8Path, import_path: &str) -> Result<Ast> {
    let mut builder = SnapshotBuilder::new()?;
    for path in go_files(dir)? {
        let text =
            std::fs::read_to_string(&path).with_context(|| format!("failed to read {path}"))?;
        builder.add_file(path, import_path, &text)?;
    }
    let ast = builder.finish();
    tracing::debug!(%dir, import_path, files = ast.file_ids().count(), "package loaded");
    Ok(ast)
}

/// Load the package in `dir` and run every enabled inspection over it.
///
/// # Errors
///
/// Returns an error if loading fails or the run is canceled.
pub fn analyze_package(
    dir: &Utf8Path,
    import_path: &str,
    config: Option<&AnalyzerConfig>,
) -> Result<PackageReport> {
    let ast = load_package(dir, import_path)?;
    let reports = init_analyzer(config).analyze(&ast)?;
    Ok(PackageReport { ast, reports })
}

/// Analyze in-memory `(path, source)` files of one package.
///
/// # Errors
///
/// Returns an error if the Go grammar cannot be loaded, a file yields no
/// tree, or the run is canceled.
pub fn analyze_sources(
    import_path: &str,
    files: &[(&str, &str)],
    config: Option<&AnalyzerConfig>,
) -> Result<PackageReport> {
    let ast = goanalyze_syntax::parse_package(import_path, files)?;
    let reports = init_analyzer(config).analyze(&ast)?;
    Ok(PackageReport { ast, reports })
}
