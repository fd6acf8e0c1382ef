#![allow(dead_code)]

use goanalyze_ast::{Ast, NodeId, NodeKind};

pub fn parse(src: &str) -> Ast {
    goanalyze_syntax::parse_package("example.com/p", &[("p.go", src)]).expect("parse")
}

fn walk(ast: &Ast) -> impl Iterator<Item = NodeId> + '_ {
    ast.file_ids()
        .filter_map(|f| ast.file(f).root)
        .flat_map(|root| ast.descendants(root))
}

/// First `DefName` called `name`.
pub fn def(ast: &Ast, name: &str) -> NodeId {
    walk(ast)
        .find(|&id| matches!(ast.kind(id), NodeKind::DefName(d) if d.name == name))
        .unwrap_or_else(|| panic!("no declaration of {name}"))
}

/// Every `Ident` use of `name`, in source order.
pub fn uses(ast: &Ast, name: &str) -> Vec<NodeId> {
    walk(ast)
        .filter(|&id| matches!(ast.kind(id), NodeKind::Ident(i) if i.name == name))
        .collect()
}

/// First node whose source text is exactly `text` and that satisfies `pred`.
pub fn node_with_text(ast: &Ast, text: &str, pred: impl Fn(&NodeKind) -> bool) -> NodeId {
    walk(ast)
        .find(|&id| ast.text(id) == text && pred(ast.kind(id)))
        .unwrap_or_else(|| panic!("no node `{text}`"))
}
