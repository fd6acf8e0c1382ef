//! Compile-time string values, as far as format checking needs them.

use goanalyze_ast::node::{BinaryOp, LitKind};
use goanalyze_ast::{NodeId, NodeKind, Resolution};

use crate::AnalysisPass;

impl AnalysisPass<'_> {
    /// String value of `expr` when it is built from string literals, `+`
    /// concatenation and references to variables or constants initialized
    /// that way. Escapes are decoded as [`unescape`] does, so byte escapes
    /// above 0x7F do not survive exactly.
    #[must_use]
    pub fn string_value(&self, expr: NodeId) -> Option<String> {
        self.guarded(expr, || self.string_value_inner(expr))
    }

    fn string_value_inner(&self, expr: NodeId) -> Option<String> {
        let ast = self.ast();
        match ast.kind(expr) {
            NodeKind::BasicLit(lit) => match lit.kind {
                LitKind::RawString => lit.string_body().map(|b| b.replace('\r', "")),
                LitKind::String => lit.string_body().and_then(unescape),
                _ => None,
            },
            NodeKind::Paren(p) => self.string_value(p.expr),
            NodeKind::Binary(b) if b.op == BinaryOp::Add => {
                let mut left = self.string_value(b.left)?;
                left.push_str(&self.string_value(b.right)?);
                Some(left)
            }
            NodeKind::Ident(_) | NodeKind::Selector(_) => match self.resolve(expr)? {
                Resolution::Decl(def) => self.initializer(def).and_then(|v| self.string_value(v)),
                _ => None,
            },
            _ => None,
        }
    }

    /// Initializer expression of a variable or constant `DefName`, when it
    /// has exactly one of its own.
    #[must_use]
    pub fn initializer(&self, def: NodeId) -> Option<NodeId> {
        let ast = self.ast();
        let parent = ast.parent(def)?;
        let (names, values) = match ast.kind(parent) {
            NodeKind::VarSpec(spec) | NodeKind::ConstSpec(spec) => (&spec.names, &spec.values),
            NodeKind::ShortVarDecl(decl) => (&decl.names, &decl.values),
            _ => return None,
        };
        if names.len() != values.len() {
            return None;
        }
        let index = names.iter().position(|&n| n == def)?;
        values.get(index).copied()
    }
}

/// Decode the escapes of an interpreted string literal body.
///
/// Go strings are byte sequences but the result is a Rust `String`: a byte
/// escape (`\xNN`, `\NNN`) becomes the char with that code point, so values
/// above 0x7F come out as Latin-1 text rather than raw bytes. ASCII, which
/// covers every printf directive, decodes exactly.
#[must_use]
pub fn unescape(body: &str) -> Option<String> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let escaped = chars.next()?;
        match escaped {
            'a' => out.push('\u{7}'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\u{b}'),
            '\\' | '"' | '\'' => out.push(escaped),
            'x' => out.push(char::from(u8::try_from(hex_escape(&mut chars, 2)?).ok()?)),
            'u' => out.push(char::from_u32(hex_escape(&mut chars, 4)?)?),
            'U' => out.push(char::from_u32(hex_escape(&mut chars, 8)?)?),
            '0'..='7' => {
                let mut value = escaped.to_digit(8)?;
                for _ in 0..2 {
                    value = value * 8 + chars.next()?.to_digit(8)?;
                }
                out.push(char::from(u8::try_from(value).ok()?));
            }
            _ => return None,
        }
    }
    Some(out)
}

fn hex_escape(chars: &mut std::str::Chars<'_>, digits: usize) -> Option<u32> {
    let mut value = 0;
    for _ in 0..digits {
        value = value * 16 + chars.next()?.to_digit(16)?;
    }
    Some(value)
}
