//! Lowering of tree-sitter-go concrete syntax into the goanalyze arena.
//!
//! The walk is defensive: node kinds the lowering does not understand (parse
//! errors included) become `NodeKind::Bad` leaves instead of aborting the file.
//! So does anything nested deeper than [`MAX_NESTING`]; a left-leaning operator
//! chain such as `a + b + c + ...` is lowered iteratively and counts as one level.

use goanalyze_abi::Span;
use goanalyze_ast::node::{
    ArrayType, Assign, AssignOp, BasicLit, BinaryExpr, BinaryOp, Block, Branch, CallExpr,
    CallStmt, CaseClause, ChanDir, ChanType, CommClause, CompositeLit, DeclKeyword, DefName,
    ElemType, ExprStmt, FieldDecl, FileNode, ForStmt, FuncDecl, FuncLit, FuncType, GenDecl,
    Ident, IfStmt, ImportSpec, IncDec, IndexExpr, InterfaceType, KeyValue, LabeledStmt,
    LitKind, MapType, MethodSpec, Param, Paren, RangeStmt, RecvStmt, ReturnStmt, SelectStmt,
    Selector, SendStmt, ShortVarDecl, Signature, SliceExpr, StructType, SwitchStmt,
    TypeAssert, TypeCaseClause, TypeName, TypeSpec, TypeSwitchStmt, UnaryExpr, UnaryOp,
    ValueSpec,
};
use goanalyze_ast::{AstBuilder, NodeId, NodeKind};
use tree_sitter::Node;

/// Nesting of statements, expressions and types followed before giving up.
pub const MAX_NESTING: usize = 64;

pub struct Lowerer<'a> {
    b: &'a mut AstBuilder,
    src: &'a str,
    depth: usize,
}

fn span(n: Node<'_>) -> Span {
    Span::new(n.start_byte(), n.end_byte())
}

/// Named children without comments.
fn named<'t>(n: Node<'t>) -> Vec<Node<'t>> {
    n.named_children(&mut n.walk())
        .filter(|c| c.kind() != "comment")
        .collect()
}

fn field<'t>(n: Node<'t>, name: &str) -> Option<Node<'t>> {
    n.child_by_field_name(name)
}

fn fields<'t>(n: Node<'t>, name: &str) -> Vec<Node<'t>> {
    n.children_by_field_name(name, &mut n.walk()).collect()
}

fn has_token(n: Node<'_>, token: &str) -> bool {
    n.children(&mut n.walk()).any(|c| c.kind() == token)
}

fn is_type_kind(kind: &str) -> bool {
    matches!(
        kind,
        "type_identifier"
            | "qualified_type"
            | "generic_type"
            | "pointer_type"
            | "slice_type"
            | "array_type"
            | "implicit_length_array_type"
            | "map_type"
            | "channel_type"
            | "function_type"
            | "struct_type"
            | "interface_type"
            | "parenthesized_type"
    )
}

impl<'a> Lowerer<'a> {
    pub fn new(b: &'a mut AstBuilder, src: &'a str) -> Self {
        Self { b, src, depth: 0 }
    }

    /// Run `lower` one nesting level deeper, or give up on `n` past the limit.
    fn nested(&mut self, n: Node<'_>, lower: impl FnOnce(&mut Self) -> NodeId) -> NodeId {
        if self.depth >= MAX_NESTING {
            tracing::warn!(
                kind = n.kind(),
                at = n.start_byte(),
                "nesting limit reached, subtree skipped"
            );
            return self.b.leaf(NodeKind::Bad, span(n));
        }
        self.depth += 1;
        let id = lower(self);
        self.depth -= 1;
        id
    }

    fn text(&self, n: Node<'_>) -> &'a str {
        self.src.get(n.byte_range()).unwrap_or("")
    }

    fn bad(&mut self, n: Node<'_>) -> NodeId {
        if n.is_error() || n.is_missing() {
            tracing::debug!(at = n.start_byte(), "parse error lowered as bad node");
        } else {
            tracing::warn!(kind = n.kind(), at = n.start_byte(), "unsupported syntax");
        }
        self.b.leaf(NodeKind::Bad, span(n))
    }

    fn def_name(&mut self, n: Node<'_>) -> NodeId {
        let name = self.text(n).to_string();
        self.b.leaf(NodeKind::DefName(DefName { name }), span(n))
    }

    pub fn source_file(&mut self, root: Node<'_>) -> NodeId {
        let mark = self.b.mark();
        let mut file = FileNode {
            package_name: String::new(),
            imports: Vec::new(),
            decls: Vec::new(),
        };
        for child in named(root) {
            match child.kind() {
                "package_clause" => {
                    if let Some(id) = named(child).first() {
                        file.package_name = self.text(*id).to_string();
                    }
                }
                "import_declaration" => self.imports(child, &mut file.imports),
                "function_declaration" | "method_declaration" => {
                    file.decls.push(self.func_decl(child));
                }
                "var_declaration" | "const_declaration" | "type_declaration" => {
                    file.decls.push(self.gen_decl(child));
                }
                _ => {
                    self.bad(child);
                }
            }
        }
        self.b.end_file(mark, file, span(root))
    }

    fn imports(&mut self, n: Node<'_>, out: &mut Vec<NodeId>) {
        for child in named(n) {
            match child.kind() {
                "import_spec" => {
                    let alias = field(child, "name").map(|a| self.text(a).to_string());
                    let path = field(child, "path")
                        .map(|p| unquote(self.text(p)).to_string())
                        .unwrap_or_default();
                    out.push(
                        self.b
                            .leaf(NodeKind::Import(ImportSpec { alias, path }), span(child)),
                    );
                }
                "import_spec_list" => self.imports(child, out),
                _ => {}
            }
        }
    }

    fn func_decl(&mut self, n: Node<'_>) -> NodeId {
        let mark = self.b.mark();
        let receiver = field(n, "receiver").and_then(|r| self.params(r).into_iter().next());
        let name = match field(n, "name") {
            Some(name) => self.def_name(name),
            None => self.b.leaf(NodeKind::Bad, span(n)),
        };
        let signature = self.signature(n, field(n, "parameters"), field(n, "result"));
        let body = field(n, "body").map(|b| self.block(b));
        self.b.push(
            mark,
            NodeKind::FuncDecl(FuncDecl {
                name,
                receiver,
                signature,
                body,
            }),
            span(n),
        )
    }

    fn signature(&mut self, owner: Node<'_>, params: Option<Node<'_>>, result: Option<Node<'_>>) -> NodeId {
        let mark = self.b.mark();
        let start = params.map_or(owner.start_byte(), |p| p.start_byte());
        let end = result.or(params).map_or(owner.end_byte(), |r| r.end_byte());
        let params = params.map(|p| self.params(p)).unwrap_or_default();
        let results = match result {
            Some(r) if r.kind() == "parameter_list" => self.params(r),
            Some(r) => {
                let pmark = self.b.mark();
                let ty = self.ty(r);
                vec![self.b.push(
                    pmark,
                    NodeKind::Param(Param {
                        names: Vec::new(),
                        ty,
                        variadic: false,
                    }),
                    span(r),
                )]
            }
            None => Vec::new(),
        };
        self.b.push(
            mark,
            NodeKind::Signature(Signature { params, results }),
            Span::new(start, end),
        )
    }

    fn params(&mut self, list: Node<'_>) -> Vec<NodeId> {
        let mut out = Vec::new();
        for child in named(list) {
            let variadic = match child.kind() {
                "parameter_declaration" => false,
                "variadic_parameter_declaration" => true,
                _ => continue,
            };
            let mark = self.b.mark();
            let names = fields(child, "name")
                .into_iter()
                .map(|n| self.def_name(n))
                .collect();
            let ty = match field(child, "type") {
                Some(t) => self.ty(t),
                None => self.b.leaf(NodeKind::Bad, span(child)),
            };
            out.push(self.b.push(
                mark,
                NodeKind::Param(Param {
                    names,
                    ty,
                    variadic,
                }),
                span(child),
            ));
        }
        out
    }

    fn gen_decl(&mut self, n: Node<'_>) -> NodeId {
        let mark = self.b.mark();
        let keyword = match n.kind() {
            "var_declaration" => DeclKeyword::Var,
            "const_declaration" => DeclKeyword::Const,
            _ => DeclKeyword::Type,
        };
        let mut specs = Vec::new();
        self.specs(n, keyword, &mut specs);
        self.b
            .push(mark, NodeKind::GenDecl(GenDecl { keyword, specs }), span(n))
    }

    fn specs(&mut self, n: Node<'_>, keyword: DeclKeyword, out: &mut Vec<NodeId>) {
        for child in named(n) {
            match child.kind() {
                "var_spec" | "const_spec" => {
                    let index = out.len();
                    out.push(self.value_spec(child, keyword, index));
                }
                "type_spec" | "type_alias" => {
                    let mark = self.b.mark();
                    let name = match field(child, "name") {
                        Some(name) => self.def_name(name),
                        None => self.b.leaf(NodeKind::Bad, span(child)),
                    };
                    let ty = match field(child, "type") {
                        Some(t) => self.ty(t),
                        None => self.b.leaf(NodeKind::Bad, span(child)),
                    };
                    out.push(self.b.push(
                        mark,
                        NodeKind::TypeSpec(TypeSpec {
                            name,
                            ty,
                            alias: child.kind() == "type_alias",
                        }),
                        span(child),
                    ));
                }
                "var_spec_list" | "const_spec_list" | "type_spec_list" => {
                    self.specs(child, keyword, out);
                }
                _ => {}
            }
        }
    }

    fn value_spec(&mut self, n: Node<'_>, keyword: DeclKeyword, index: usize) -> NodeId {
        let mark = self.b.mark();
        let names = fields(n, "name")
            .into_iter()
            .map(|name| self.def_name(name))
            .collect();
        let ty = field(n, "type").map(|t| self.ty(t));
        let values = field(n, "value")
            .map(|v| self.expr_list(v))
            .unwrap_or_default();
        let spec = ValueSpec {
            names,
            ty,
            values,
            index,
        };
        let kind = if keyword == DeclKeyword::Const {
            NodeKind::ConstSpec(spec)
        } else {
            NodeKind::VarSpec(spec)
        };
        self.b.push(mark, kind, span(n))
    }

    fn block(&mut self, n: Node<'_>) -> NodeId {
        let mark = self.b.mark();
        let stmts = self.stmt_list(named(n));
        self.b.push(mark, NodeKind::Block(Block { stmts }), span(n))
    }

    fn stmt_list(&mut self, nodes: Vec<Node<'_>>) -> Vec<NodeId> {
        let mut out = Vec::new();
        for n in nodes {
            if n.kind() == "statement_list" {
                out.extend(self.stmt_list(named(n)));
            } else {
                out.push(self.stmt(n));
            }
        }
        out
    }

    fn names_or_exprs(&mut self, list: Option<Node<'_>>, define: bool) -> Vec<NodeId> {
        let Some(list) = list else {
            return Vec::new();
        };
        named(list)
            .into_iter()
            .map(|e| {
                if define && e.kind() == "identifier" {
                    self.def_name(e)
                } else {
                    self.expr(e)
                }
            })
            .collect()
    }

    fn stmt(&mut self, n: Node<'_>) -> NodeId {
        self.nested(n, |this| this.stmt_inner(n))
    }

    fn stmt_inner(&mut self, n: Node<'_>) -> NodeId {
        let mark = self.b.mark();
        let kind = match n.kind() {
            "block" => return self.block(n),
            "var_declaration" | "const_declaration" | "type_declaration" => {
                return self.gen_decl(n);
            }
            "expression_statement" => {
                let Some(inner) = named(n).into_iter().next() else {
                    return self.bad(n);
                };
                NodeKind::ExprStmt(ExprStmt {
                    expr: self.expr(inner),
                })
            }
            "short_var_declaration" => {
                let names = self.names_or_exprs(field(n, "left"), true);
                let values = self.names_or_exprs(field(n, "right"), false);
                NodeKind::ShortVarDecl(ShortVarDecl { names, values })
            }
            "assignment_statement" => {
                let lhs = self.names_or_exprs(field(n, "left"), false);
                let rhs = self.names_or_exprs(field(n, "right"), false);
                let op_text = field(n, "operator").map_or("=", |o| self.text(o));
                let op = match op_text.strip_suffix('=').and_then(BinaryOp::parse) {
                    Some(bin) if op_text != "=" => AssignOp::Compound(bin),
                    _ => AssignOp::Assign,
                };
                NodeKind::Assign(Assign { op, lhs, rhs })
            }
            "inc_statement" | "dec_statement" => {
                let Some(target) = named(n).into_iter().next() else {
                    return self.bad(n);
                };
                NodeKind::IncDec(IncDec {
                    target: self.expr(target),
                    increment: n.kind() == "inc_statement",
                })
            }
            "send_statement" => match (field(n, "channel"), field(n, "value")) {
                (Some(c), Some(v)) => NodeKind::Send(SendStmt {
                    channel: self.expr(c),
                    value: self.expr(v),
                }),
                _ => return self.bad(n),
            },
            "receive_statement" => {
                let define = has_token(n, ":=");
                let lhs = self.names_or_exprs(field(n, "left"), define);
                let rhs = field(n, "right").map(|r| self.expr(r)).into_iter().collect();
                NodeKind::Recv(RecvStmt { lhs, define, rhs })
            }
            "return_statement" => {
                let list = named(n).into_iter().find(|c| c.kind() == "expression_list");
                NodeKind::Return(ReturnStmt {
                    results: self.names_or_exprs(list, false),
                })
            }
            "if_statement" => {
                let init = field(n, "initializer").map(|i| self.stmt(i));
                let cond = match field(n, "condition") {
                    Some(c) => self.expr(c),
                    None => self.b.leaf(NodeKind::Bad, span(n)),
                };
                let then = match field(n, "consequence") {
                    Some(c) => self.block(c),
                    None => self.b.leaf(NodeKind::Bad, span(n)),
                };
                let els = field(n, "alternative").map(|a| self.stmt(a));
                NodeKind::If(IfStmt {
                    init,
                    cond,
                    then,
                    els,
                })
            }
            "for_statement" => return self.for_stmt(n),
            "expression_switch_statement" => {
                let init = field(n, "initializer").map(|i| self.stmt(i));
                let tag = field(n, "value").map(|v| self.expr(v));
                let clauses = named(n)
                    .into_iter()
                    .filter(|c| matches!(c.kind(), "expression_case" | "default_case"))
                    .map(|c| self.case_clause(c))
                    .collect();
                NodeKind::Switch(SwitchStmt { init, tag, clauses })
            }
            "type_switch_statement" => {
                let init = field(n, "initializer").map(|i| self.stmt(i));
                let binding = field(n, "alias")
                    .and_then(|a| named(a).into_iter().next())
                    .map(|a| self.def_name(a));
                let subject = match field(n, "value") {
                    Some(v) => self.expr(v),
                    None => self.b.leaf(NodeKind::Bad, span(n)),
                };
                let clauses = named(n)
                    .into_iter()
                    .filter(|c| matches!(c.kind(), "type_case" | "default_case"))
                    .map(|c| self.type_case_clause(c))
                    .collect();
                NodeKind::TypeSwitch(TypeSwitchStmt {
                    init,
                    binding,
                    subject,
                    clauses,
                })
            }
            "select_statement" => {
                let clauses = named(n)
                    .into_iter()
                    .filter(|c| matches!(c.kind(), "communication_case" | "default_case"))
                    .map(|c| self.comm_clause(c))
                    .collect();
                NodeKind::Select(SelectStmt { clauses })
            }
            "go_statement" | "defer_statement" => {
                let Some(call) = named(n).into_iter().next() else {
                    return self.bad(n);
                };
                let stmt = CallStmt {
                    call: self.expr(call),
                };
                if n.kind() == "go_statement" {
                    NodeKind::Go(stmt)
                } else {
                    NodeKind::Defer(stmt)
                }
            }
            "labeled_statement" => {
                let label = field(n, "label").map_or_else(String::new, |l| self.text(l).to_string());
                let stmt = named(n)
                    .into_iter()
                    .find(|c| c.kind() != "label_name")
                    .map(|s| self.stmt(s));
                NodeKind::Labeled(LabeledStmt { label, stmt })
            }
            "break_statement" | "continue_statement" | "goto_statement" | "fallthrough_statement" => {
                NodeKind::Branch(Branch {
                    keyword: n
                        .child(0)
                        .map_or_else(String::new, |k| self.text(k).to_string()),
                })
            }
            "empty_statement" => NodeKind::Empty,
            _ => return self.bad(n),
        };
        self.b.push(mark, kind, span(n))
    }

    fn for_stmt(&mut self, n: Node<'_>) -> NodeId {
        let mark = self.b.mark();
        let body_node = field(n, "body");
        let header = named(n)
            .into_iter()
            .find(|c| Some(c.id()) != body_node.map(|b| b.id()));

        let kind = match header {
            Some(h) if h.kind() == "range_clause" => {
                let define = has_token(h, ":=");
                let mut targets = self.names_or_exprs(field(h, "left"), define).into_iter();
                let key = targets.next();
                let value = targets.next();
                let expr = match field(h, "right") {
                    Some(r) => self.expr(r),
                    None => self.b.leaf(NodeKind::Bad, span(h)),
                };
                let body = self.body_or_bad(n, body_node);
                NodeKind::Range(RangeStmt {
                    key,
                    value,
                    define,
                    expr,
                    body,
                })
            }
            Some(h) if h.kind() == "for_clause" => {
                let init = field(h, "initializer").map(|i| self.stmt(i));
                let cond = field(h, "condition").map(|c| self.expr(c));
                let post = field(h, "update").map(|u| self.stmt(u));
                let body = self.body_or_bad(n, body_node);
                NodeKind::For(ForStmt {
                    init,
                    cond,
                    post,
                    body,
                })
            }
            other => {
                let cond = other.map(|c| self.expr(c));
                let body = self.body_or_bad(n, body_node);
                NodeKind::For(ForStmt {
                    init: None,
                    cond,
                    post: None,
                    body,
                })
            }
        };
        self.b.push(mark, kind, span(n))
    }

    fn body_or_bad(&mut self, owner: Node<'_>, body: Option<Node<'_>>) -> NodeId {
        match body {
            Some(b) => self.block(b),
            None => self.b.leaf(NodeKind::Bad, span(owner)),
        }
    }

    fn case_clause(&mut self, n: Node<'_>) -> NodeId {
        let mark = self.b.mark();
        let value = field(n, "value");
        let exprs = self.names_or_exprs(value, false);
        let rest = named(n)
            .into_iter()
            .filter(|c| Some(c.id()) != value.map(|v| v.id()))
            .collect();
        let body = self.stmt_list(rest);
        self.b
            .push(mark, NodeKind::CaseClause(CaseClause { exprs, body }), span(n))
    }

    fn type_case_clause(&mut self, n: Node<'_>) -> NodeId {
        let mark = self.b.mark();
        let type_nodes = fields(n, "type");
        let ids: Vec<usize> = type_nodes.iter().map(|t| t.id()).collect();
        let types = type_nodes.into_iter().map(|t| self.ty(t)).collect();
        let rest = named(n)
            .into_iter()
            .filter(|c| !ids.contains(&c.id()))
            .collect();
        let body = self.stmt_list(rest);
        self.b.push(
            mark,
            NodeKind::TypeCaseClause(TypeCaseClause { types, body }),
            span(n),
        )
    }

    fn comm_clause(&mut self, n: Node<'_>) -> NodeId {
        let mark = self.b.mark();
        let comm_node = field(n, "communication");
        let comm = comm_node.map(|c| self.stmt(c));
        let rest = named(n)
            .into_iter()
            .filter(|c| Some(c.id()) != comm_node.map(|v| v.id()))
            .collect();
        let body = self.stmt_list(rest);
        self.b
            .push(mark, NodeKind::CommClause(CommClause { comm, body }), span(n))
    }

    fn expr_list(&mut self, list: Node<'_>) -> Vec<NodeId> {
        if list.kind() == "expression_list" {
            named(list).into_iter().map(|e| self.expr(e)).collect()
        } else {
            vec![self.expr(list)]
        }
    }

    /// Expression, or type syntax where the grammar allows either.
    pub fn expr(&mut self, n: Node<'_>) -> NodeId {
        if is_type_kind(n.kind()) {
            return self.ty(n);
        }
        if n.kind() == "binary_expression" {
            return self.nested(n, |this| this.binary_chain(n));
        }
        self.nested(n, |this| this.expr_inner(n))
    }

    fn expr_inner(&mut self, n: Node<'_>) -> NodeId {
        let mark = self.b.mark();
        let kind = match n.kind() {
            "identifier" | "field_identifier" | "package_identifier" | "nil" | "true"
            | "false" | "iota" => NodeKind::Ident(Ident {
                name: self.text(n).to_string(),
            }),
            "int_literal" => lit(LitKind::Int, self.text(n)),
            "float_literal" => lit(LitKind::Float, self.text(n)),
            "imaginary_literal" => lit(imaginary_kind(self.text(n)), self.text(n)),
            "rune_literal" => lit(LitKind::Char, self.text(n)),
            "interpreted_string_literal" => lit(LitKind::String, self.text(n)),
            "raw_string_literal" => lit(LitKind::RawString, self.text(n)),
            "parenthesized_expression" => {
                let Some(inner) = named(n).into_iter().next() else {
                    return self.bad(n);
                };
                NodeKind::Paren(Paren {
                    expr: self.expr(inner),
                })
            }
            "unary_expression" => {
                let op = field(n, "operator").and_then(|o| UnaryOp::parse(self.text(o)));
                match (op, field(n, "operand")) {
                    (Some(op), Some(operand)) => NodeKind::Unary(UnaryExpr {
                        op,
                        operand: self.expr(operand),
                    }),
                    _ => return self.bad(n),
                }
            }
            "selector_expression" => match (field(n, "operand"), field(n, "field")) {
                (Some(operand), Some(f)) => NodeKind::Selector(Selector {
                    operand: self.expr(operand),
                    field: self.text(f).to_string(),
                }),
                _ => return self.bad(n),
            },
            "index_expression" => match (field(n, "operand"), field(n, "index")) {
                (Some(operand), Some(index)) => NodeKind::Index(IndexExpr {
                    operand: self.expr(operand),
                    index: self.expr(index),
                }),
                _ => return self.bad(n),
            },
            "slice_expression" => {
                let Some(operand) = field(n, "operand") else {
                    return self.bad(n);
                };
                NodeKind::Slice(SliceExpr {
                    operand: self.expr(operand),
                    low: field(n, "start").map(|s| self.expr(s)),
                    high: field(n, "end").map(|e| self.expr(e)),
                    max: field(n, "capacity").map(|c| self.expr(c)),
                })
            }
            "type_assertion_expression" => {
                let Some(operand) = field(n, "operand") else {
                    return self.bad(n);
                };
                NodeKind::TypeAssert(TypeAssert {
                    operand: self.expr(operand),
                    ty: field(n, "type").map(|t| self.ty(t)),
                })
            }
            "type_conversion_expression" => match (field(n, "type"), field(n, "operand")) {
                (Some(t), Some(operand)) => NodeKind::Call(CallExpr {
                    callee: self.ty(t),
                    args: vec![self.expr(operand)],
                    spread: false,
                }),
                _ => return self.bad(n),
            },
            "call_expression" => {
                let Some(function) = field(n, "function") else {
                    return self.bad(n);
                };
                let callee = self.expr(function);
                let (args, spread) = match field(n, "arguments") {
                    Some(list) => (
                        named(list).into_iter().map(|a| self.expr(a)).collect(),
                        has_token(list, "..."),
                    ),
                    None => (Vec::new(), false),
                };
                NodeKind::Call(CallExpr {
                    callee,
                    args,
                    spread,
                })
            }
            "composite_literal" => {
                let ty = field(n, "type").map(|t| self.ty(t));
                let elems = field(n, "body")
                    .map(|body| self.literal_elements(body))
                    .unwrap_or_default();
                NodeKind::CompositeLit(CompositeLit { ty, elems })
            }
            "literal_value" => NodeKind::CompositeLit(CompositeLit {
                ty: None,
                elems: self.literal_elements(n),
            }),
            "func_literal" => {
                let signature = self.signature(n, field(n, "parameters"), field(n, "result"));
                let body = self.body_or_bad(n, field(n, "body"));
                NodeKind::FuncLit(FuncLit { signature, body })
            }
            _ => return self.bad(n),
        };
        self.b.push(mark, kind, span(n))
    }

    /// A binary expression and every binary expression down its left spine,
    /// built bottom-up without recursing along the spine.
    fn binary_chain(&mut self, top: Node<'_>) -> NodeId {
        let mut spine = vec![top];
        let mut leftmost = None;
        while let Some(&n) = spine.last() {
            match field(n, "left") {
                Some(left) if left.kind() == "binary_expression" => spine.push(left),
                left => {
                    leftmost = left;
                    break;
                }
            }
        }

        let mark = self.b.mark();
        let mut left = match leftmost {
            Some(l) => self.expr(l),
            None => self.bad(top),
        };
        for n in spine.into_iter().rev() {
            let op = field(n, "operator").and_then(|o| BinaryOp::parse(self.text(o)));
            let right = field(n, "right").map(|r| self.expr(r));
            left = match (op, right) {
                (Some(op), Some(right)) => self.b.push(
                    mark,
                    NodeKind::Binary(BinaryExpr { op, left, right }),
                    span(n),
                ),
                _ => self.b.push(mark, NodeKind::Bad, span(n)),
            };
        }
        left
    }

    fn literal_elements(&mut self, body: Node<'_>) -> Vec<NodeId> {
        named(body)
            .into_iter()
            .map(|e| self.literal_element(e))
            .collect()
    }

    fn literal_element(&mut self, e: Node<'_>) -> NodeId {
        match e.kind() {
            "literal_element" => match named(e).into_iter().next() {
                Some(inner) => self.expr(inner),
                None => self.bad(e),
            },
            "keyed_element" => {
                let mark = self.b.mark();
                let parts = named(e);
                let key = field(e, "key").or_else(|| parts.first().copied());
                let value = field(e, "value").or_else(|| parts.get(1).copied());
                match (key, value) {
                    (Some(k), Some(v)) => {
                        let key = self.literal_element(k);
                        let value = self.literal_element(v);
                        self.b
                            .push(mark, NodeKind::KeyValue(KeyValue { key, value }), span(e))
                    }
                    _ => self.bad(e),
                }
            }
            _ => self.expr(e),
        }
    }

    /// Type syntax.
    pub fn ty(&mut self, n: Node<'_>) -> NodeId {
        self.nested(n, |this| this.ty_inner(n))
    }

    fn ty_inner(&mut self, n: Node<'_>) -> NodeId {
        let mark = self.b.mark();
        let kind = match n.kind() {
            "type_identifier" | "identifier" => NodeKind::TypeName(TypeName {
                package: None,
                name: self.text(n).to_string(),
            }),
            "qualified_type" => NodeKind::TypeName(TypeName {
                package: field(n, "package").map(|p| self.text(p).to_string()),
                name: field(n, "name").map_or_else(String::new, |p| self.text(p).to_string()),
            }),
            "generic_type" => match field(n, "type") {
                Some(base) => return self.ty(base),
                None => return self.bad(n),
            },
            "parenthesized_type" => match named(n).into_iter().next() {
                Some(inner) => return self.ty(inner),
                None => return self.bad(n),
            },
            "pointer_type" => match named(n).into_iter().next() {
                Some(inner) => NodeKind::PointerType(ElemType {
                    elem: self.ty(inner),
                }),
                None => return self.bad(n),
            },
            "slice_type" => match field(n, "element") {
                Some(elem) => NodeKind::SliceType(ElemType {
                    elem: self.ty(elem),
                }),
                None => return self.bad(n),
            },
            "array_type" | "implicit_length_array_type" => match field(n, "element") {
                Some(elem) => NodeKind::ArrayType(ArrayType {
                    len: field(n, "length").map(|l| self.expr(l)),
                    elem: self.ty(elem),
                }),
                None => return self.bad(n),
            },
            "map_type" => match (field(n, "key"), field(n, "value")) {
                (Some(k), Some(v)) => NodeKind::MapType(MapType {
                    key: self.ty(k),
                    value: self.ty(v),
                }),
                _ => return self.bad(n),
            },
            "channel_type" => {
                let text = self.text(n);
                let dir = if text.starts_with("<-") {
                    ChanDir::Recv
                } else if text.trim_start_matches("chan").trim_start().starts_with("<-") {
                    ChanDir::Send
                } else {
                    ChanDir::Both
                };
                match field(n, "value") {
                    Some(elem) => NodeKind::ChanType(ChanType {
                        dir,
                        elem: self.ty(elem),
                    }),
                    None => return self.bad(n),
                }
            }
            "function_type" => NodeKind::FuncType(FuncType {
                signature: self.signature(n, field(n, "parameters"), field(n, "result")),
            }),
            "struct_type" => {
                let fields = named(n)
                    .into_iter()
                    .filter(|c| c.kind() == "field_declaration_list")
                    .flat_map(named)
                    .filter(|f| f.kind() == "field_declaration")
                    .map(|f| self.field_decl(f))
                    .collect();
                NodeKind::StructType(StructType { fields })
            }
            "interface_type" => {
                let mut methods = Vec::new();
                let mut embeds = Vec::new();
                for elem in named(n) {
                    match elem.kind() {
                        "method_elem" | "method_spec" => methods.push(self.method_spec(elem)),
                        "type_elem" | "constraint_elem" => {
                            if let Some(inner) = named(elem).into_iter().next() {
                                embeds.push(self.ty(inner));
                            }
                        }
                        kind if is_type_kind(kind) => embeds.push(self.ty(elem)),
                        _ => {}
                    }
                }
                NodeKind::InterfaceType(InterfaceType { methods, embeds })
            }
            _ => return self.bad(n),
        };
        self.b.push(mark, kind, span(n))
    }

    fn field_decl(&mut self, f: Node<'_>) -> NodeId {
        let mark = self.b.mark();
        let names: Vec<NodeId> = fields(f, "name")
            .into_iter()
            .map(|n| self.def_name(n))
            .collect();
        let embedded = names.is_empty();
        let ty = match field(f, "type") {
            Some(t) if embedded && has_token(f, "*") => {
                let pmark = self.b.mark();
                let elem = self.ty(t);
                self.b.push(
                    pmark,
                    NodeKind::PointerType(ElemType { elem }),
                    Span::new(f.start_byte(), t.end_byte()),
                )
            }
            Some(t) => self.ty(t),
            None => self.b.leaf(NodeKind::Bad, span(f)),
        };
        let tag = field(f, "tag").map(|t| self.text(t).to_string());
        self.b.push(
            mark,
            NodeKind::FieldDecl(FieldDecl {
                names,
                ty,
                tag,
                embedded,
            }),
            span(f),
        )
    }

    fn method_spec(&mut self, m: Node<'_>) -> NodeId {
        let mark = self.b.mark();
        let name = match field(m, "name") {
            Some(n) => self.def_name(n),
            None => self.b.leaf(NodeKind::Bad, span(m)),
        };
        let signature = self.signature(m, field(m, "parameters"), field(m, "result"));
        self.b.push(
            mark,
            NodeKind::MethodSpec(MethodSpec { name, signature }),
            span(m),
        )
    }
}

fn lit(kind: LitKind, raw: &str) -> NodeKind {
    NodeKind::BasicLit(BasicLit {
        kind,
        raw: raw.to_string(),
    })
}

fn unquote(s: &str) -> &str {
    s.trim_matches(|c| c == '"' || c == '`')
}

fn imaginary_kind(text: &str) -> LitKind {
    let body = text.trim_end_matches('i');
    let lower = body.to_ascii_lowercase();
    let hex = lower.starts_with("0x");
    if body.contains('.') || (!hex && lower.contains('e')) || (hex && lower.contains('p')) {
        LitKind::ImagFloat
    } else {
        LitKind::ImagInt
    }
}
