//! One analysis pass: the unit that owns caches and the recursion guard.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use goanalyze_ast::{Ast, NodeId, Resolution, Resolve};

use crate::types::Type;

/// Default bound on nested inference requests.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Largest accepted inference depth; analysis threads are sized for it.
pub const MAX_INFERENCE_DEPTH: usize = 1024;

/// Returned when a pass notices its [`CancellationToken`] was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("analysis canceled")]
pub struct Canceled;

/// Cooperative cancellation flag shared between a host and running passes.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_canceled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Per-pass state for type computations over one [`Ast`] snapshot.
///
/// A pass is single-threaded. Inferred types are memoized per node and the
/// cache goes away with the pass; several passes over the same snapshot may
/// run on different threads.
pub struct AnalysisPass<'a> {
    ast: &'a Ast,
    resolver: &'a dyn Resolve,
    cache: RefCell<HashMap<NodeId, Option<Type>>>,
    in_progress: RefCell<HashSet<NodeId>>,
    depth: Cell<usize>,
    max_depth: usize,
    cancel: CancellationToken,
}

impl<'a> AnalysisPass<'a> {
    #[must_use]
    pub fn new(ast: &'a Ast, resolver: &'a dyn Resolve) -> Self {
        Self {
            ast,
            resolver,
            cache: RefCell::new(HashMap::new()),
            in_progress: RefCell::new(HashSet::new()),
            depth: Cell::new(0),
            max_depth: DEFAULT_MAX_DEPTH,
            cancel: CancellationToken::default(),
        }
    }

    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    #[must_use]
    pub const fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    #[must_use]
    pub const fn ast(&self) -> &'a Ast {
        self.ast
    }

    /// Ask the reference oracle about `reference`.
    #[must_use]
    pub fn resolve(&self, reference: NodeId) -> Option<Resolution> {
        self.resolver.resolve(self.ast, reference)
    }

    /// Poll the cancellation token.
    ///
    /// # Errors
    ///
    /// Returns [`Canceled`] once the token has been triggered.
    pub fn check_canceled(&self) -> Result<(), Canceled> {
        if self.cancel.is_canceled() {
            Err(Canceled)
        } else {
            Ok(())
        }
    }

    /// Memoized computation keyed by `node`.
    ///
    /// Re-entry for a node whose computation is still running, or nesting
    /// deeper than the configured bound, yields `None` instead of recursing.
    pub(crate) fn cached(&self, node: NodeId, compute: impl FnOnce() -> Option<Type>) -> Option<Type> {
        if let Some(hit) = self.cache.borrow().get(&node) {
            tracing::trace!(node = node.index(), "type cache hit");
            return hit.clone();
        }
        let result = self.guarded(node, compute)?;
        self.cache.borrow_mut().insert(node, Some(result.clone()));
        Some(result)
    }

    /// Run `compute` with `node` marked in progress; not memoized.
    ///
    /// Returns `None` past the depth limit or when `node` is already being computed,
    /// so walks over unbounded syntax such as long operator chains stay shallow.
    pub fn guarded<T>(&self, node: NodeId, compute: impl FnOnce() -> Option<T>) -> Option<T> {
        if self.depth.get() >= self.max_depth {
            tracing::debug!(node = node.index(), "inference depth limit reached");
            return None;
        }
        if !self.in_progress.borrow_mut().insert(node) {
            tracing::debug!(node = node.index(), "recursive inference request");
            return None;
        }
        self.depth.set(self.depth.get() + 1);
        let result = compute();
        self.depth.set(self.depth.get() - 1);
        self.in_progress.borrow_mut().remove(&node);
        result
    }
}
