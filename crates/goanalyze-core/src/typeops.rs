//! Building types from type syntax and the relations between types:
//! underlying types, identity, assignability and interface satisfaction.

use std::collections::HashSet;

use goanalyze_ast::node::{FieldDecl, LitKind};
use goanalyze_ast::{Builtin, NodeId, NodeKind, Resolution};

use crate::AnalysisPass;
use crate::types::{
    BasicKind, InterfaceType, Method, NamedType, ParamGroup, Signature, StructField, StructType,
    Type,
};

impl AnalysisPass<'_> {
    /// Type denoted by a type expression. Unknown names yield [`Type::Invalid`].
    #[must_use]
    pub fn type_of_syntax(&self, node: NodeId) -> Type {
        let ast = self.ast();
        match ast.kind(node) {
            NodeKind::TypeName(_) | NodeKind::Ident(_) | NodeKind::Selector(_) => self
                .resolve(node)
                .and_then(|r| self.type_of_resolution(&r))
                .unwrap_or(Type::Invalid),
            NodeKind::Paren(p) => self.type_of_syntax(p.expr),
            // `*T` written in expression position, as in `(*T)(nil)`
            NodeKind::Unary(u) if u.op == goanalyze_ast::node::UnaryOp::Deref => {
                Type::pointer(self.type_of_syntax(u.operand))
            }
            // generic instantiation: the base type stands in
            NodeKind::Index(i) => self.type_of_syntax(i.operand),
            NodeKind::PointerType(p) => Type::pointer(self.type_of_syntax(p.elem)),
            NodeKind::SliceType(s) => Type::slice(self.type_of_syntax(s.elem)),
            NodeKind::ArrayType(a) => Type::Array {
                elem: Box::new(self.type_of_syntax(a.elem)),
                len: a.len.and_then(|l| self.array_len(l)),
            },
            NodeKind::MapType(m) => {
                Type::map(self.type_of_syntax(m.key), self.type_of_syntax(m.value))
            }
            NodeKind::ChanType(c) => Type::chan(c.dir, self.type_of_syntax(c.elem)),
            NodeKind::StructType(s) => Type::Struct(StructType {
                fields: s
                    .fields
                    .iter()
                    .filter_map(|&f| match ast.kind(f) {
                        NodeKind::FieldDecl(decl) => Some(self.struct_fields(f, decl)),
                        _ => None,
                    })
                    .flatten()
                    .collect(),
            }),
            NodeKind::InterfaceType(i) => Type::Interface(InterfaceType {
                methods: i
                    .methods
                    .iter()
                    .filter_map(|&m| match ast.kind(m) {
                        NodeKind::MethodSpec(spec) => Some(Method {
                            name: ast.name_of(spec.name)?.to_string(),
                            sig: self.signature_of(spec.signature),
                        }),
                        _ => None,
                    })
                    .collect(),
                embedded: i.embeds.iter().map(|&e| self.type_of_syntax(e)).collect(),
            }),
            NodeKind::FuncType(f) => Type::Func(self.signature_of(f.signature)),
            _ => Type::Invalid,
        }
    }

    /// The type a reference denotes when it names a type.
    pub(crate) fn type_of_resolution(&self, resolution: &Resolution) -> Option<Type> {
        match resolution {
            Resolution::Builtin(Builtin::Type(kind)) => Some(Type::Basic(*kind)),
            Resolution::Builtin(Builtin::Error) => Some(Type::Named(NamedType::error())),
            Resolution::Builtin(Builtin::Any) => Some(Type::empty_interface()),
            Resolution::Decl(def) => self.named_from_def(*def),
            Resolution::CSymbol(_) => Some(Type::CType),
            _ => None,
        }
    }

    /// Named type for the `DefName` of a type spec. Aliases resolve to their target.
    #[must_use]
    pub fn named_from_def(&self, def: NodeId) -> Option<Type> {
        let ast = self.ast();
        let spec_id = ast.parent(def)?;
        let NodeKind::TypeSpec(spec) = ast.kind(spec_id) else {
            return None;
        };
        if spec.alias {
            return self.guarded(spec_id, || Some(self.type_of_syntax(spec.ty)));
        }
        let file = ast.file_of(def);
        Some(Type::Named(NamedType {
            decl: Some(def),
            name: ast.name_of(def)?.to_string(),
            package: Some(file.package_name.clone()),
            import_path: file.import_path.clone(),
        }))
    }

    /// Signature described by a `Signature` node.
    #[must_use]
    pub fn signature_of(&self, node: NodeId) -> Signature {
        let ast = self.ast();
        let NodeKind::Signature(sig) = ast.kind(node) else {
            return Signature::default();
        };
        let groups = |ids: &[NodeId]| {
            ids.iter()
                .filter_map(|&p| match ast.kind(p) {
                    NodeKind::Param(param) => Some(ParamGroup {
                        names: param
                            .names
                            .iter()
                            .filter_map(|&n| ast.name_of(n).map(str::to_string))
                            .collect(),
                        ty: self.type_of_syntax(param.ty),
                        variadic: param.variadic,
                    }),
                    _ => None,
                })
                .collect()
        };
        Signature {
            params: groups(&sig.params),
            results: groups(&sig.results),
        }
    }

    fn struct_fields(&self, node: NodeId, decl: &FieldDecl) -> Vec<StructField> {
        let ast = self.ast();
        let ty = self.type_of_syntax(decl.ty);
        let import_path = ast.file_of(node).import_path.clone();
        let tag = decl.tag.clone();
        if decl.embedded {
            let name = embedded_name(ast, decl.ty).unwrap_or_default();
            return vec![StructField {
                name,
                ty,
                tag,
                embedded: true,
                import_path,
            }];
        }
        decl.names
            .iter()
            .filter_map(|&n| ast.name_of(n))
            .map(|name| StructField {
                name: name.to_string(),
                ty: ty.clone(),
                tag: tag.clone(),
                embedded: false,
                import_path: import_path.clone(),
            })
            .collect()
    }

    fn array_len(&self, node: NodeId) -> Option<u64> {
        match self.ast().kind(node) {
            NodeKind::BasicLit(lit) if lit.kind == LitKind::Int => parse_int(&lit.raw),
            NodeKind::Paren(p) => self.array_len(p.expr),
            _ => None,
        }
    }

    /// Follow named types to their definition. Cycles stop at the last named
    /// type seen, so the result is always reached in finite steps.
    #[must_use]
    pub fn underlying(&self, ty: &Type) -> Type {
        let mut current = ty.clone();
        let mut seen = HashSet::new();
        loop {
            let Type::Named(named) = &current else {
                return current;
            };
            let Some(decl) = named.decl else {
                return error_interface();
            };
            if !seen.insert(decl) {
                return current;
            }
            let ast = self.ast();
            let next = ast.parent(decl).and_then(|spec| match ast.kind(spec) {
                NodeKind::TypeSpec(spec) => Some(self.type_of_syntax(spec.ty)),
                _ => None,
            });
            match next {
                Some(next) => current = next,
                None => return Type::Invalid,
            }
        }
    }

    /// Type identity.
    #[must_use]
    pub fn identical(&self, a: &Type, b: &Type) -> bool {
        match (a, b) {
            (Type::Invalid, Type::Invalid) | (Type::CType, Type::CType) => true,
            (Type::Invalid, _) | (_, Type::Invalid) => false,
            (Type::Untyped(x), Type::Untyped(y)) => x == y,
            (Type::Untyped(_), other) | (other, Type::Untyped(_)) => {
                !other.is_untyped() && self.is_numeric(other)
            }
            (Type::UntypedNil, Type::UntypedNil) => true,
            (Type::Basic(x), Type::Basic(y)) => x.canonical() == y.canonical(),
            (Type::Named(x), Type::Named(y)) => match (x.decl, y.decl) {
                (Some(dx), Some(dy)) => dx == dy,
                (None, None) => x.name == y.name,
                _ => false,
            },
            (Type::Pointer(x), Type::Pointer(y)) | (Type::Slice(x), Type::Slice(y)) => {
                self.identical(x, y)
            }
            (Type::Array { elem: ex, len: lx }, Type::Array { elem: ey, len: ly }) => {
                lx == ly && self.identical(ex, ey)
            }
            (Type::Map { key: kx, value: vx }, Type::Map { key: ky, value: vy }) => {
                self.identical(kx, ky) && self.identical(vx, vy)
            }
            (Type::Chan { dir: dx, elem: ex }, Type::Chan { dir: dy, elem: ey }) => {
                dx == dy && self.identical(ex, ey)
            }
            (Type::Struct(x), Type::Struct(y)) => {
                x.fields.len() == y.fields.len()
                    && x.fields
                        .iter()
                        .zip(&y.fields)
                        .all(|(fx, fy)| self.identical_fields(fx, fy))
            }
            (Type::Interface(_), Type::Interface(_)) => {
                let mx = self.interface_methods(a);
                let my = self.interface_methods(b);
                mx.len() == my.len()
                    && mx.iter().all(|m| {
                        my.iter()
                            .any(|o| o.name == m.name && self.identical_signatures(&o.sig, &m.sig))
                    })
            }
            (Type::Func(x), Type::Func(y)) => self.identical_signatures(x, y),
            (Type::Tuple(x), Type::Tuple(y)) => {
                x.len() == y.len() && x.iter().zip(y).all(|(a, b)| self.identical(a, b))
            }
            _ => false,
        }
    }

    fn identical_fields(&self, x: &StructField, y: &StructField) -> bool {
        x.name == y.name
            && x.embedded == y.embedded
            && x.tag == y.tag
            && (x.is_exported() || x.import_path == y.import_path)
            && self.identical(&x.ty, &y.ty)
    }

    /// Parameter and result types plus variadic-ness; names are ignored.
    #[must_use]
    pub fn identical_signatures(&self, x: &Signature, y: &Signature) -> bool {
        let (px, py) = (x.param_types(), y.param_types());
        let (rx, ry) = (x.result_types(), y.result_types());
        x.is_variadic() == y.is_variadic()
            && px.len() == py.len()
            && rx.len() == ry.len()
            && px.iter().zip(&py).all(|(a, b)| self.identical(a, b))
            && rx.iter().zip(&ry).all(|(a, b)| self.identical(a, b))
    }

    /// Whether a value of type `source` may be assigned to a variable of type `target`.
    #[must_use]
    pub fn is_assignable(&self, target: &Type, source: &Type) -> bool {
        match (target, source) {
            (Type::Invalid | Type::CType, _) | (_, Type::Invalid | Type::CType) => return true,
            (Type::Tuple(_), _) | (_, Type::Tuple(_)) => return false,
            _ => {}
        }
        if self.identical(target, source) {
            return true;
        }
        let target_u = self.underlying(target);
        match source {
            Type::UntypedNil => {
                return matches!(
                    target_u,
                    Type::Pointer(_)
                        | Type::Slice(_)
                        | Type::Map { .. }
                        | Type::Chan { .. }
                        | Type::Func(_)
                        | Type::Interface(_)
                        | Type::Basic(BasicKind::Uintptr)
                );
            }
            Type::Untyped(kind) => {
                if let Type::Interface(_) = target_u {
                    return self.implements(target, &Type::Basic(kind.default_type()));
                }
                return self.is_numeric(&target_u);
            }
            _ => {}
        }

        let source_u = self.underlying(source);
        let one_unnamed = !(target.is_named() && source.is_named());
        if one_unnamed && self.identical(&target_u, &source_u) {
            return true;
        }
        if let Type::Interface(_) = target_u {
            return self.implements(target, source);
        }
        if let (
            Type::Chan { elem: target_elem, .. },
            Type::Chan {
                dir: goanalyze_ast::node::ChanDir::Both,
                elem: source_elem,
            },
        ) = (&target_u, &source_u)
        {
            return one_unnamed && self.identical(target_elem, source_elem);
        }
        false
    }

    /// Whether `ty` has every method the interface `iface` requires.
    #[must_use]
    pub fn implements(&self, iface: &Type, ty: &Type) -> bool {
        let required = self.interface_methods(iface);
        if required.is_empty() {
            return true;
        }
        let provided = if let Type::Interface(_) = self.underlying(ty) {
            self.interface_methods(ty)
        } else {
            self.method_set(ty)
        };
        required.iter().all(|need| {
            provided
                .iter()
                .any(|have| have.name == need.name && self.identical_signatures(&have.sig, &need.sig))
        })
    }

    /// Methods of an interface type with embedded interfaces flattened.
    #[must_use]
    pub fn interface_methods(&self, iface: &Type) -> Vec<Method> {
        let mut out = Vec::new();
        self.collect_interface_methods(iface, &mut HashSet::new(), &mut out);
        out
    }

    /// Each named interface is expanded once, so `type I interface{ I }`
    /// terminates while arbitrarily long embedding chains are followed.
    fn collect_interface_methods(
        &self,
        iface: &Type,
        expanded: &mut HashSet<NodeId>,
        out: &mut Vec<Method>,
    ) {
        if let Type::Named(NamedType { decl: Some(decl), .. }) = iface
            && !expanded.insert(*decl)
        {
            return;
        }
        let Type::Interface(i) = self.underlying(iface) else {
            return;
        };
        for method in i.methods {
            if !out.iter().any(|m| m.name == method.name) {
                out.push(method);
            }
        }
        for embedded in &i.embedded {
            self.collect_interface_methods(embedded, expanded, out);
        }
    }

    /// Declared and promoted methods of a concrete type. Receiver kinds are
    /// not distinguished: `T` and `*T` share one set.
    #[must_use]
    pub fn method_set(&self, ty: &Type) -> Vec<Method> {
        let mut out = Vec::new();
        self.collect_methods(ty, true, &mut HashSet::new(), &mut out);
        out
    }

    fn collect_methods(
        &self,
        ty: &Type,
        top: bool,
        expanded: &mut HashSet<NodeId>,
        out: &mut Vec<Method>,
    ) {
        let base = match ty {
            Type::Pointer(inner) => inner.as_ref(),
            other => other,
        };
        if let Type::Named(named) = base {
            if let Some(decl) = named.decl
                && !expanded.insert(decl)
            {
                return;
            }
            for (name, decl) in self.declared_methods(named) {
                if !out.iter().any(|m| m.name == name) {
                    out.push(Method {
                        name,
                        sig: self.func_decl_signature(decl),
                    });
                }
            }
        }
        match self.underlying(base) {
            Type::Struct(s) => {
                for field in s.fields.iter().filter(|f| f.embedded) {
                    self.collect_methods(&field.ty, false, expanded, out);
                }
            }
            Type::Interface(_) if !top => {
                for method in self.interface_methods(base) {
                    if !out.iter().any(|m| m.name == method.name) {
                        out.push(method);
                    }
                }
            }
            _ => {}
        }
    }

    /// `(name, FuncDecl)` pairs of the methods declared on a named type.
    pub(crate) fn declared_methods(&self, named: &NamedType) -> Vec<(String, NodeId)> {
        let ast = self.ast();
        if named.is_builtin() {
            return Vec::new();
        }
        ast.methods_of(&named.import_path, &named.name)
            .iter()
            .filter_map(|&decl| match ast.kind(decl) {
                NodeKind::FuncDecl(f) => Some((ast.name_of(f.name)?.to_string(), decl)),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn func_decl_signature(&self, decl: NodeId) -> Signature {
        match self.ast().kind(decl) {
            NodeKind::FuncDecl(f) => self.signature_of(f.signature),
            NodeKind::FuncLit(f) => self.signature_of(f.signature),
            _ => Signature::default(),
        }
    }

    #[must_use]
    pub fn is_string(&self, ty: &Type) -> bool {
        matches!(self.underlying(ty), Type::Basic(BasicKind::String))
    }

    #[must_use]
    pub fn is_boolean(&self, ty: &Type) -> bool {
        matches!(self.underlying(ty), Type::Basic(BasicKind::Bool))
    }

    #[must_use]
    pub fn is_numeric(&self, ty: &Type) -> bool {
        match self.underlying(ty) {
            Type::Basic(kind) => kind.is_numeric(),
            Type::Untyped(_) => true,
            _ => false,
        }
    }

    #[must_use]
    pub fn is_integer(&self, ty: &Type) -> bool {
        match self.underlying(ty) {
            Type::Basic(kind) => kind.is_integer(),
            Type::Untyped(kind) => matches!(
                kind,
                crate::types::UntypedKind::Int | crate::types::UntypedKind::Rune
            ),
            _ => false,
        }
    }

    #[must_use]
    pub fn is_unsigned(&self, ty: &Type) -> bool {
        matches!(self.underlying(ty), Type::Basic(kind) if kind.is_unsigned())
    }

    #[must_use]
    pub fn is_function(&self, ty: &Type) -> bool {
        matches!(self.underlying(ty), Type::Func(_))
    }

    /// Whether `range` accepts a value of this type.
    #[must_use]
    pub fn is_iterable(&self, ty: &Type) -> bool {
        match self.underlying(ty) {
            Type::Basic(kind) => kind == BasicKind::String || kind.is_integer(),
            Type::Slice(_) | Type::Array { .. } | Type::Map { .. } | Type::Chan { .. } => true,
            Type::Pointer(inner) => matches!(self.underlying(&inner), Type::Array { .. }),
            Type::Func(_) | Type::Untyped(_) => true,
            _ => false,
        }
    }

    /// Type an untyped constant takes when nothing else constrains it.
    #[must_use]
    pub fn default_type(&self, ty: &Type) -> Type {
        ty.clone().defaulted()
    }
}

/// `interface{ Error() string }`
fn error_interface() -> Type {
    Type::Interface(InterfaceType {
        methods: vec![Method {
            name: "Error".to_string(),
            sig: Signature {
                params: Vec::new(),
                results: vec![ParamGroup {
                    names: Vec::new(),
                    ty: Type::Basic(BasicKind::String),
                    variadic: false,
                }],
            },
        }],
        embedded: Vec::new(),
    })
}

fn embedded_name(ast: &goanalyze_ast::Ast, ty: NodeId) -> Option<String> {
    match ast.kind(ty) {
        NodeKind::PointerType(p) => embedded_name(ast, p.elem),
        NodeKind::TypeName(t) => Some(t.name.clone()),
        _ => None,
    }
}

/// Parse a Go integer literal (`0x1F`, `0o17`, `017`, `0b1`, `1_000`).
pub(crate) fn parse_int(raw: &str) -> Option<u64> {
    let digits: String = raw.chars().filter(|&c| c != '_').collect();
    let lower = digits.to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix("0x") {
        u64::from_str_radix(hex, 16).ok()
    } else if let Some(bin) = lower.strip_prefix("0b") {
        u64::from_str_radix(bin, 2).ok()
    } else if let Some(oct) = lower.strip_prefix("0o") {
        u64::from_str_radix(oct, 8).ok()
    } else if lower.len() > 1 && lower.starts_with('0') {
        u64::from_str_radix(&lower[1..], 8).ok()
    } else {
        lower.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_integer_literals() {
        assert_eq!(parse_int("10"), Some(10));
        assert_eq!(parse_int("0x1F"), Some(31));
        assert_eq!(parse_int("0o17"), Some(15));
        assert_eq!(parse_int("017"), Some(15));
        assert_eq!(parse_int("0b101"), Some(5));
        assert_eq!(parse_int("1_000"), Some(1000));
        assert_eq!(parse_int("0"), Some(0));
    }

    #[test]
    fn error_interface_has_error_method() {
        let Type::Interface(i) = error_interface() else {
            panic!("not an interface");
        };
        assert_eq!(i.methods.len(), 1);
        assert_eq!(i.methods[0].name, "Error");
    }
}
