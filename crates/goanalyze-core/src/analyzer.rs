//! The analyzer: owns inspections and runs them over a snapshot.

use std::sync::OnceLock;

use camino::Utf8PathBuf;
use goanalyze_abi::Diagnostics;
use goanalyze_ast::{Ast, FileId, Resolve, ScopeResolver};
use rayon::prelude::*;

use crate::inspection::BoxInspection;
use crate::pass::{
    AnalysisPass, Canceled, CancellationToken, DEFAULT_MAX_DEPTH, MAX_INFERENCE_DEPTH,
};

/// Worker stack size. Inference and AST walks recurse up to
/// [`MAX_INFERENCE_DEPTH`] frames, which overflows rayon's 2 MiB default.
const PASS_STACK_SIZE: usize = 64 * 1024 * 1024;

/// Findings for one file.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub file: FileId,
    pub path: Utf8PathBuf,
    pub diagnostics: Diagnostics,
}

pub struct Analyzer {
    inspections: Vec<BoxInspection>,
    resolver: Box<dyn Resolve>,
    max_depth: usize,
    cancel: CancellationToken,
    pool: OnceLock<Option<rayon::ThreadPool>>,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inspections: Vec::new(),
            resolver: Box::new(ScopeResolver),
            max_depth: DEFAULT_MAX_DEPTH,
            cancel: CancellationToken::new(),
            pool: OnceLock::new(),
        }
    }

    #[must_use]
    pub fn with_inspection(mut self, inspection: BoxInspection) -> Self {
        self.add_inspection(inspection);
        self
    }

    pub fn add_inspection(&mut self, inspection: BoxInspection) {
        tracing::info!(inspection = inspection.name(), "inspection enabled");
        self.inspections.push(inspection);
    }

    /// Replace the default lexical resolver with a host-provided oracle.
    #[must_use]
    pub fn with_resolver(mut self, resolver: Box<dyn Resolve>) -> Self {
        self.resolver = resolver;
        self
    }

    #[must_use]
    pub const fn with_max_inference_depth(mut self, depth: usize) -> Self {
        self.max_depth = if depth > MAX_INFERENCE_DEPTH {
            MAX_INFERENCE_DEPTH
        } else {
            depth
        };
        self
    }

    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Names of the loaded inspections, in run order.
    pub fn inspection_names(&self) -> impl Iterator<Item = &str> {
        self.inspections.iter().map(|i| i.name())
    }

    fn pass<'a>(&'a self, ast: &'a Ast) -> AnalysisPass<'a> {
        AnalysisPass::new(ast, self.resolver.as_ref())
            .with_max_depth(self.max_depth)
            .with_cancellation(self.cancel.clone())
    }

    /// Run every inspection over one file.
    ///
    /// A canceled run reports nothing: partial findings are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Canceled`] if the cancellation token fires during the run.
    pub fn analyze_file(&self, ast: &Ast, file: FileId) -> Result<Diagnostics, Canceled> {
        let pass = self.pass(ast);
        let mut diagnostics = Diagnostics::new();
        for inspection in &self.inspections {
            pass.check_canceled()?;
            inspection.check_file(&pass, file, &mut diagnostics)?;
        }
        diagnostics.sort_by_key(|d| (d.span.start, d.span.end));
        tracing::debug!(
            path = %ast.file(file).path,
            count = diagnostics.len(),
            "file analyzed"
        );
        Ok(diagnostics)
    }

    /// Analyze the given files in parallel, one pass per file.
    ///
    /// # Errors
    ///
    /// Returns [`Canceled`] if any pass was canceled.
    pub fn analyze_files(&self, ast: &Ast, files: &[FileId]) -> Result<Vec<FileReport>, Canceled> {
        let run = || -> Result<Vec<FileReport>, Canceled> {
            files
                .par_iter()
                .map(|&file| {
                    self.analyze_file(ast, file).map(|diagnostics| FileReport {
                        file,
                        path: ast.file(file).path.clone(),
                        diagnostics,
                    })
                })
                .collect()
        };
        match self.pool() {
            Some(pool) => pool.install(run),
            None => run(),
        }
    }

    fn pool(&self) -> Option<&rayon::ThreadPool> {
        self.pool
            .get_or_init(|| {
                rayon::ThreadPoolBuilder::new()
                    .stack_size(PASS_STACK_SIZE)
                    .thread_name(|i| format!("goanalyze-{i}"))
                    .build()
                    .map_err(|err| {
                        tracing::warn!(%err, "analysis pool unavailable, using the global pool");
                    })
                    .ok()
            })
            .as_ref()
    }

    /// Analyze every file in the snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`Canceled`] if any pass was canceled.
    pub fn analyze(&self, ast: &Ast) -> Result<Vec<FileReport>, Canceled> {
        let files: Vec<FileId> = ast.file_ids().collect();
        self.analyze_files(ast, &files)
    }
}
