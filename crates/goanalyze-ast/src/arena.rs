//! Arena storage for one immutable snapshot of a set of Go files.

use std::collections::HashMap;

use camino::{Utf8Path, Utf8PathBuf};
use goanalyze_abi::Span;

use crate::node::{DeclKeyword, FileNode, NodeKind};

/// Index of a node inside an [`Ast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Build an id from a raw index; lookups with it are only meaningful in
    /// the snapshot it came from.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(u32);

impl FileId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    pub file: FileId,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: Utf8PathBuf,
    /// Import path of the package the file belongs to (`fmt`, `example.com/x`).
    pub import_path: String,
    pub package_name: String,
    pub text: String,
    pub root: Option<NodeId>,
}

/// One snapshot of parsed files. Immutable once built, so it can be shared
/// across analysis passes running on different threads.
#[derive(Debug, Default)]
pub struct Ast {
    nodes: Vec<Node>,
    files: Vec<SourceFile>,
    /// import path -> name -> declaring `DefName`s (functions, vars, consts, types)
    package_index: HashMap<String, HashMap<String, Vec<NodeId>>>,
    /// (import path, receiver base type) -> `FuncDecl`s
    method_index: HashMap<(String, String), Vec<NodeId>>,
}

impl Ast {
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Checked lookup for ids that may come from another snapshot.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    #[must_use]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    #[must_use]
    pub fn span(&self, id: NodeId) -> Span {
        self.node(id).span
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let siblings = self.children(self.parent(id)?);
        let pos = siblings.iter().position(|&c| c == id)?;
        siblings.get(pos + 1).copied()
    }

    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let siblings = self.children(self.parent(id)?);
        let pos = siblings.iter().position(|&c| c == id)?;
        pos.checked_sub(1).map(|p| siblings[p])
    }

    /// Strict ancestors, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), |&n| self.parent(n))
    }

    /// Pre-order walk of `id` and everything below it.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            ast: self,
            stack: vec![id],
        }
    }

    /// Source text covered by a node.
    #[must_use]
    pub fn text(&self, id: NodeId) -> &str {
        let node = self.node(id);
        self.files[node.file.index()]
            .text
            .get(node.span.start..node.span.end)
            .unwrap_or("")
    }

    #[must_use]
    pub fn file(&self, id: FileId) -> &SourceFile {
        &self.files[id.index()]
    }

    #[must_use]
    pub fn file_of(&self, id: NodeId) -> &SourceFile {
        self.file(self.node(id).file)
    }

    pub fn file_ids(&self) -> impl Iterator<Item = FileId> + '_ {
        (0..self.files.len()).map(|i| FileId(u32::try_from(i).unwrap_or(u32::MAX)))
    }

    #[must_use]
    pub fn file_by_path(&self, path: &Utf8Path) -> Option<FileId> {
        self.file_ids().find(|&f| self.file(f).path == path)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Package-level declarations named `name` in the package at `import_path`.
    #[must_use]
    pub fn package_members(&self, import_path: &str, name: &str) -> &[NodeId] {
        self.package_index
            .get(import_path)
            .and_then(|members| members.get(name))
            .map_or(&[], Vec::as_slice)
    }

    /// Every package-level name of a package, in no particular order.
    pub fn package_names(&self, import_path: &str) -> impl Iterator<Item = (&str, &[NodeId])> {
        self.package_index
            .get(import_path)
            .into_iter()
            .flat_map(|members| members.iter().map(|(k, v)| (k.as_str(), v.as_slice())))
    }

    /// Methods declared on the named type `type_name` of a package.
    #[must_use]
    pub fn methods_of(&self, import_path: &str, type_name: &str) -> &[NodeId] {
        self.method_index
            .get(&(import_path.to_string(), type_name.to_string()))
            .map_or(&[], Vec::as_slice)
    }

    /// Receiver base types that have methods in the package.
    pub fn receiver_types(&self, import_path: &str) -> impl Iterator<Item = (&str, &[NodeId])> {
        self.method_index
            .iter()
            .filter(move |((path, _), _)| path == import_path)
            .map(|((_, ty), decls)| (ty.as_str(), decls.as_slice()))
    }

    /// Name of a `DefName`, `Ident` or `TypeName` node.
    #[must_use]
    pub fn name_of(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::DefName(d) => Some(&d.name),
            NodeKind::Ident(i) => Some(&i.name),
            NodeKind::TypeName(t) => Some(&t.name),
            _ => None,
        }
    }

    /// Base type name of a method receiver (`T` for both `T` and `*T`).
    #[must_use]
    pub fn receiver_base_name(&self, receiver: NodeId) -> Option<&str> {
        let NodeKind::Param(param) = self.kind(receiver) else {
            return None;
        };
        let mut ty = param.ty;
        loop {
            match self.kind(ty) {
                NodeKind::PointerType(p) => ty = p.elem,
                NodeKind::TypeName(t) => return Some(&t.name),
                _ => return None,
            }
        }
    }
}

pub struct Descendants<'a> {
    ast: &'a Ast,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.ast.children(id).iter().rev().copied());
        Some(id)
    }
}

/// Allocation position used to adopt freshly built children.
#[derive(Debug, Clone, Copy)]
pub struct Mark(usize);

/// Builds an [`Ast`] bottom-up.
///
/// Children are allocated before their parent; [`AstBuilder::push`] adopts every
/// still-orphaned node allocated since the given [`Mark`].
#[derive(Debug, Default)]
pub struct AstBuilder {
    nodes: Vec<Node>,
    files: Vec<SourceFile>,
    current: Option<FileId>,
    /// Indices of nodes without a parent yet, ascending.
    orphans: Vec<usize>,
}

impl AstBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_file(
        &mut self,
        path: impl Into<Utf8PathBuf>,
        import_path: impl Into<String>,
        text: impl Into<String>,
    ) -> FileId {
        let id = FileId(u32::try_from(self.files.len()).unwrap_or(u32::MAX));
        self.files.push(SourceFile {
            path: path.into(),
            import_path: import_path.into(),
            package_name: String::new(),
            text: text.into(),
            root: None,
        });
        self.current = Some(id);
        id
    }

    /// Text of the file being built.
    #[must_use]
    pub fn source(&self) -> &str {
        self.current
            .map_or("", |f| self.files[f.index()].text.as_str())
    }

    #[must_use]
    pub fn mark(&self) -> Mark {
        Mark(self.nodes.len())
    }

    pub fn push(&mut self, mark: Mark, kind: NodeKind, span: Span) -> NodeId {
        let index = self.nodes.len();
        let id = NodeId(u32::try_from(index).unwrap_or(u32::MAX));
        let first = self.orphans.partition_point(|&i| i < mark.0);
        let mut children = Vec::new();
        let mut kept = Vec::new();
        for i in self.orphans.drain(first..) {
            let node = &mut self.nodes[i];
            if matches!(node.kind, NodeKind::File(_)) {
                kept.push(i);
            } else {
                node.parent = Some(id);
                children.push(NodeId(u32::try_from(i).unwrap_or(u32::MAX)));
            }
        }
        self.orphans.extend(kept);
        self.orphans.push(index);
        children.sort_by_key(|c| self.nodes[c.index()].span.start);
        debug_assert!(self.current.is_some(), "push outside of a file");
        self.nodes.push(Node {
            kind,
            span,
            file: self.current.unwrap_or(FileId(0)),
            parent: None,
            children,
        });
        id
    }

    pub fn leaf(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let mark = self.mark();
        self.push(mark, kind, span)
    }

    /// Close the current file with its root node.
    pub fn end_file(&mut self, mark: Mark, file: FileNode, span: Span) -> NodeId {
        let package_name = file.package_name.clone();
        let root = self.push(mark, NodeKind::File(file), span);
        if let Some(current) = self.current.take() {
            let entry = &mut self.files[current.index()];
            entry.package_name = package_name;
            entry.root = Some(root);
        }
        root
    }

    #[must_use]
    pub fn finish(self) -> Ast {
        let mut ast = Ast {
            nodes: self.nodes,
            files: self.files,
            package_index: HashMap::new(),
            method_index: HashMap::new(),
        };
        ast.build_indices();
        tracing::debug!(
            files = ast.files.len(),
            nodes = ast.nodes.len(),
            "syntax snapshot built"
        );
        ast
    }
}

impl Ast {
    fn build_indices(&mut self) {
        let mut package_index: HashMap<String, HashMap<String, Vec<NodeId>>> = HashMap::new();
        let mut method_index: HashMap<(String, String), Vec<NodeId>> = HashMap::new();

        for file in &self.files {
            let Some(root) = file.root else { continue };
            let NodeKind::File(file_node) = self.kind(root) else {
                continue;
            };
            let members = package_index.entry(file.import_path.clone()).or_default();
            let mut add = |ast: &Self, name_id: NodeId| {
                if let Some(name) = ast.name_of(name_id)
                    && name != "_"
                {
                    members.entry(name.to_string()).or_default().push(name_id);
                }
            };

            for &decl in &file_node.decls {
                match self.kind(decl) {
                    NodeKind::FuncDecl(func) => match func.receiver {
                        None => add(self, func.name),
                        Some(receiver) => {
                            if let Some(base) = self.receiver_base_name(receiver) {
                                method_index
                                    .entry((file.import_path.clone(), base.to_string()))
                                    .or_default()
                                    .push(decl);
                            }
                        }
                    },
                    NodeKind::GenDecl(gen_decl) => {
                        for &spec in &gen_decl.specs {
                            match (gen_decl.keyword, self.kind(spec)) {
                                (
                                    DeclKeyword::Var | DeclKeyword::Const,
                                    NodeKind::VarSpec(v) | NodeKind::ConstSpec(v),
                                ) => {
                                    for &name in &v.names {
                                        add(self, name);
                                    }
                                }
                                (DeclKeyword::Type, NodeKind::TypeSpec(t)) => add(self, t.name),
                                _ => {}
                            }
                        }
                    }
                    _ => {}
                }
            }
        }

        self.package_index = package_index;
        self.method_index = method_index;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{DefName, Ident};

    fn ident(b: &mut AstBuilder, name: &str, start: usize) -> NodeId {
        b.leaf(
            NodeKind::Ident(Ident { name: name.into() }),
            Span::new(start, start + name.len()),
        )
    }

    #[test]
    fn push_adopts_orphans_in_source_order() {
        let mut b = AstBuilder::new();
        b.begin_file("a.go", "a", "b a");
        let mark = b.mark();
        let second = ident(&mut b, "a", 2);
        let first = ident(&mut b, "b", 0);
        let parent = b.push(
            mark,
            NodeKind::DefName(DefName { name: "p".into() }),
            Span::new(0, 3),
        );
        let file_mark = b.mark();
        let root = b.end_file(
            file_mark,
            FileNode {
                package_name: "a".into(),
                imports: vec![],
                decls: vec![],
            },
            Span::new(0, 3),
        );
        let ast = b.finish();

        assert_eq!(ast.children(parent), &[first, second]);
        assert_eq!(ast.parent(first), Some(parent));
        assert_eq!(ast.next_sibling(first), Some(second));
        assert_eq!(ast.prev_sibling(first), None);
        assert_eq!(ast.text(second), "a");
        assert_eq!(ast.file_of(first).package_name, "a");
        // nodes built before the file mark are not adopted by the file
        assert!(ast.children(root).is_empty());
    }

    #[test]
    fn descendants_walks_pre_order() {
        let mut b = AstBuilder::new();
        b.begin_file("a.go", "a", "x y");
        let mark = b.mark();
        let x = ident(&mut b, "x", 0);
        let y = ident(&mut b, "y", 2);
        let parent = b.push(
            mark,
            NodeKind::DefName(DefName { name: "p".into() }),
            Span::new(0, 3),
        );
        let ast = b.finish();
        let walked: Vec<_> = ast.descendants(parent).collect();
        assert_eq!(walked, vec![parent, x, y]);
    }
}
