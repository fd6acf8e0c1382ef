//! Reference resolution: the oracle that maps a reference to its declaration.

use crate::node::NodeKind;
use crate::universe::{self, Builtin};
use crate::{Ast, NodeId};

/// Import path that marks cgo pseudo-package references.
pub const CGO_PACKAGE: &str = "C";

/// What a reference denotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A `DefName` node (variable, constant, parameter, function, type, field, ...).
    Decl(NodeId),
    Builtin(Builtin),
    /// An imported package, by import path.
    Package(String),
    /// A symbol of the cgo pseudo-package `C`.
    CSymbol(String),
}

impl Resolution {
    #[must_use]
    pub const fn decl(&self) -> Option<NodeId> {
        match self {
            Self::Decl(id) => Some(*id),
            _ => None,
        }
    }
}

/// Pluggable reference oracle.
///
/// Implementations must be callable from several analysis passes at once.
pub trait Resolve: Send + Sync {
    /// Resolve an `Ident`, a package-qualified `Selector` or a `TypeName`.
    /// Member selections on values are not the oracle's business.
    fn resolve(&self, ast: &Ast, reference: NodeId) -> Option<Resolution>;
}

/// Default lexical resolver over block scopes, package scope, imports and
/// the universe.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScopeResolver;

impl Resolve for ScopeResolver {
    fn resolve(&self, ast: &Ast, reference: NodeId) -> Option<Resolution> {
        match ast.kind(reference) {
            NodeKind::Ident(ident) => lexical(ast, reference, &ident.name),
            NodeKind::TypeName(ty) => match &ty.package {
                None => lexical(ast, reference, &ty.name),
                Some(qualifier) => {
                    let path = import_path_for(ast, reference, qualifier)?;
                    package_member(ast, &path, &ty.name)
                }
            },
            NodeKind::Selector(sel) => {
                let NodeKind::Ident(operand) = ast.kind(sel.operand) else {
                    return None;
                };
                match lexical(ast, sel.operand, &operand.name)? {
                    Resolution::Package(path) => package_member(ast, &path, &sel.field),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

fn package_member(ast: &Ast, import_path: &str, name: &str) -> Option<Resolution> {
    if import_path == CGO_PACKAGE {
        return Some(Resolution::CSymbol(name.to_string()));
    }
    ast.package_members(import_path, name)
        .first()
        .map(|&d| Resolution::Decl(d))
}

fn import_path_for(ast: &Ast, from: NodeId, local: &str) -> Option<String> {
    let file = ast.file_of(from);
    let root = file.root?;
    let NodeKind::File(file_node) = ast.kind(root) else {
        return None;
    };
    file_node.imports.iter().find_map(|&imp| match ast.kind(imp) {
        NodeKind::Import(spec) if spec.local_name() == Some(local) => Some(spec.path.clone()),
        _ => None,
    })
}

fn lexical(ast: &Ast, reference: NodeId, name: &str) -> Option<Resolution> {
    if name == "_" {
        return None;
    }
    let pos = ast.span(reference).start;
    let mut child = reference;
    for scope in ast.ancestors(reference) {
        if let Some(found) = lookup_in_scope(ast, scope, child, pos, name) {
            return Some(Resolution::Decl(found));
        }
        child = scope;
    }

    let file = ast.file_of(reference);
    if let Some(&decl) = ast.package_members(&file.import_path, name).first() {
        return Some(Resolution::Decl(decl));
    }

    if let Some(root) = file.root
        && let NodeKind::File(file_node) = ast.kind(root)
    {
        for &imp in &file_node.imports {
            let NodeKind::Import(spec) = ast.kind(imp) else {
                continue;
            };
            if spec.local_name() == Some(name) {
                return Some(Resolution::Package(spec.path.clone()));
            }
            if spec.alias.as_deref() == Some(".")
                && let Some(&decl) = ast.package_members(&spec.path, name).first()
            {
                return Some(Resolution::Decl(decl));
            }
        }
    }

    universe::lookup(name).map(Resolution::Builtin)
}

fn lookup_in_scope(
    ast: &Ast,
    scope: NodeId,
    child: NodeId,
    pos: usize,
    name: &str,
) -> Option<NodeId> {
    let named = |ids: &[NodeId]| {
        ids.iter()
            .copied()
            .find(|&id| ast.name_of(id) == Some(name))
    };

    match ast.kind(scope) {
        NodeKind::Block(block) => preceding(ast, &block.stmts, pos, name),
        NodeKind::CaseClause(clause) => preceding(ast, &clause.body, pos, name),
        NodeKind::TypeCaseClause(clause) => preceding(ast, &clause.body, pos, name),
        NodeKind::CommClause(clause) => {
            if let Some(found) = preceding(ast, &clause.body, pos, name) {
                return Some(found);
            }
            match clause.comm.map(|c| (c, ast.kind(c))) {
                Some((comm, NodeKind::Recv(recv))) if comm != child && recv.define => {
                    named(&recv.lhs)
                }
                _ => None,
            }
        }
        NodeKind::If(stmt) => init_names(ast, stmt.init, child, name),
        NodeKind::For(stmt) => init_names(ast, stmt.init, child, name),
        NodeKind::Switch(stmt) => init_names(ast, stmt.init, child, name),
        NodeKind::TypeSwitch(stmt) => {
            if stmt.clauses.contains(&child)
                && let Some(binding) = stmt.binding
                && ast.name_of(binding) == Some(name)
            {
                return Some(binding);
            }
            init_names(ast, stmt.init, child, name)
        }
        NodeKind::Range(range) if range.define && child == range.body => {
            named(&[range.key, range.value].into_iter().flatten().collect::<Vec<_>>())
        }
        NodeKind::FuncDecl(func) if Some(child) == func.body => {
            let mut names = signature_names(ast, func.signature);
            if let Some(receiver) = func.receiver
                && let NodeKind::Param(param) = ast.kind(receiver)
            {
                names.extend(param.names.iter().copied());
            }
            named(&names)
        }
        NodeKind::FuncLit(lit) if child == lit.body => named(&signature_names(ast, lit.signature)),
        _ => None,
    }
}

/// Names declared by statements that end before `pos`, nearest first.
fn preceding(ast: &Ast, stmts: &[NodeId], pos: usize, name: &str) -> Option<NodeId> {
    stmts
        .iter()
        .rev()
        .filter(|&&s| ast.span(s).end <= pos)
        .find_map(|&s| {
            declared_names(ast, s)
                .into_iter()
                .rev()
                .find(|&d| ast.name_of(d) == Some(name))
        })
}

fn init_names(ast: &Ast, init: Option<NodeId>, child: NodeId, name: &str) -> Option<NodeId> {
    let init = init.filter(|&i| i != child)?;
    declared_names(ast, init)
        .into_iter()
        .find(|&d| ast.name_of(d) == Some(name))
}

/// `DefName`s a statement introduces into the enclosing block.
#[must_use]
pub fn declared_names(ast: &Ast, stmt: NodeId) -> Vec<NodeId> {
    match ast.kind(stmt) {
        NodeKind::ShortVarDecl(decl) => decl.names.clone(),
        NodeKind::GenDecl(decl) => decl
            .specs
            .iter()
            .flat_map(|&spec| match ast.kind(spec) {
                NodeKind::VarSpec(v) | NodeKind::ConstSpec(v) => v.names.clone(),
                NodeKind::TypeSpec(t) => vec![t.name],
                _ => Vec::new(),
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Parameter and named result `DefName`s of a signature.
#[must_use]
pub fn signature_names(ast: &Ast, signature: NodeId) -> Vec<NodeId> {
    let NodeKind::Signature(sig) = ast.kind(signature) else {
        return Vec::new();
    };
    sig.params
        .iter()
        .chain(&sig.results)
        .filter_map(|&p| match ast.kind(p) {
            NodeKind::Param(param) => Some(param.names.clone()),
            _ => None,
        })
        .flatten()
        .collect()
}
