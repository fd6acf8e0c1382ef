//! Type inference for expressions and declarations.

use std::collections::HashSet;

use goanalyze_ast::node::{BinaryExpr, CallExpr, LitKind, UnaryOp, ValueSpec};
use goanalyze_ast::{Builtin, BuiltinFunc, NodeId, NodeKind, Resolution};

use crate::AnalysisPass;
use crate::types::{BasicKind, NamedType, Signature, Type, UntypedKind};

/// What a call expression invokes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallTarget {
    /// A function, method or function value with a known signature.
    Func {
        /// `DefName` of a declared function or method, or the `FuncLit` node.
        decl: Option<NodeId>,
        /// Import path of the package declaring the callee, when known.
        import_path: Option<String>,
        sig: Signature,
    },
    Builtin(BuiltinFunc),
    /// `T(x)`
    Conversion(Type),
    /// `C.f(...)`
    CSymbol,
    /// Callee could not be resolved.
    Unknown,
}

/// A field or method reached through a selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub ty: Type,
    /// `DefName` of a declared method.
    pub decl: Option<NodeId>,
    pub import_path: Option<String>,
}

impl AnalysisPass<'_> {
    /// Type of an expression, or `None` when it cannot be determined.
    #[must_use]
    pub fn infer(&self, expr: NodeId) -> Option<Type> {
        self.cached(expr, || self.infer_uncached(expr))
    }

    fn infer_uncached(&self, expr: NodeId) -> Option<Type> {
        let ast = self.ast();
        match ast.kind(expr) {
            NodeKind::Ident(_) => {
                let resolution = self.resolve(expr)?;
                self.type_of_reference(&resolution, expr)
            }
            NodeKind::Selector(sel) => {
                if let Some(resolution) = self.resolve(expr) {
                    return self.type_of_reference(&resolution, expr);
                }
                let operand = self.infer(sel.operand)?;
                self.select_member(&operand, &sel.field).map(|m| m.ty)
            }
            NodeKind::BasicLit(lit) => Some(Type::Basic(match lit.kind {
                LitKind::Int => BasicKind::Int,
                LitKind::Float => BasicKind::Float64,
                LitKind::ImagFloat => BasicKind::Complex64,
                LitKind::ImagInt => BasicKind::Complex128,
                LitKind::Char => BasicKind::Rune,
                LitKind::String | LitKind::RawString => BasicKind::String,
            })),
            NodeKind::Paren(p) => self.infer(p.expr),
            NodeKind::Unary(u) => {
                let operand = self.infer(u.operand);
                match u.op {
                    UnaryOp::Addr => operand.map(Type::pointer),
                    UnaryOp::Recv => match self.underlying(&operand?) {
                        Type::Chan { elem, .. } => Some(*elem),
                        _ => None,
                    },
                    UnaryOp::Deref => match self.underlying(&operand?) {
                        Type::Pointer(elem) => Some(*elem),
                        _ => None,
                    },
                    UnaryOp::Plus | UnaryOp::Neg | UnaryOp::Not | UnaryOp::Xor => operand,
                }
            }
            NodeKind::Binary(b) => self.infer_binary(b),
            NodeKind::CompositeLit(lit) => match lit.ty {
                Some(ty) => Some(self.type_of_syntax(ty)),
                None => self.elided_literal_type(expr),
            },
            NodeKind::FuncLit(f) => Some(Type::Func(self.signature_of(f.signature))),
            NodeKind::Call(call) => self.infer_call(call),
            NodeKind::Index(index) => {
                let operand = self.infer(index.operand)?;
                match self.underlying(&operand) {
                    Type::Map { value, .. } => Some(*value),
                    Type::Slice(elem) | Type::Array { elem, .. } => Some(*elem),
                    Type::Basic(BasicKind::String) => Some(Type::Basic(BasicKind::Byte)),
                    Type::Pointer(inner) => match self.underlying(&inner) {
                        Type::Array { elem, .. } => Some(*elem),
                        _ => None,
                    },
                    _ => None,
                }
            }
            NodeKind::Slice(slice) => {
                let operand = self.infer(slice.operand)?;
                match self.underlying(&operand) {
                    Type::Array { elem, .. } => Some(Type::Slice(elem)),
                    Type::Pointer(inner) => match self.underlying(&inner) {
                        Type::Array { elem, .. } => Some(Type::Slice(elem)),
                        _ => Some(operand),
                    },
                    _ => Some(operand),
                }
            }
            NodeKind::TypeAssert(assert) => match assert.ty {
                Some(ty) => Some(self.type_of_syntax(ty)),
                None => self.infer(assert.operand),
            },
            kind => {
                tracing::trace!(node = kind.name(), "no inference rule");
                None
            }
        }
    }

    fn infer_binary(&self, b: &BinaryExpr) -> Option<Type> {
        if b.op.is_comparison() || b.op.is_logical() {
            return Some(Type::Basic(BasicKind::Bool));
        }
        if b.op.is_multiplicative() && self.ast().kind(b.left).is_literal() {
            return self.infer(b.right);
        }
        self.infer(b.left)
    }

    /// Type of a composite literal whose type is elided inside an outer literal.
    fn elided_literal_type(&self, lit: NodeId) -> Option<Type> {
        let ast = self.ast();
        let parent = ast.parent(lit)?;
        let (outer, is_key) = match ast.kind(parent) {
            NodeKind::KeyValue(kv) => (ast.parent(parent)?, kv.key == lit),
            NodeKind::CompositeLit(_) => (parent, false),
            _ => return None,
        };
        let outer_ty = self.infer(outer)?;
        let base = match self.underlying(&outer_ty) {
            Type::Pointer(inner) => self.underlying(&inner),
            other => other,
        };
        match base {
            Type::Slice(elem) | Type::Array { elem, .. } => Some(*elem),
            Type::Map { key, .. } if is_key => Some(*key),
            Type::Map { value, .. } => Some(*value),
            _ => None,
        }
    }

    fn infer_call(&self, call: &CallExpr) -> Option<Type> {
        match self.resolve_call(call.callee) {
            CallTarget::Func { sig, .. } => sig.call_type(),
            CallTarget::Conversion(ty) => Some(ty),
            CallTarget::CSymbol => Some(Type::CType),
            CallTarget::Builtin(func) => self.builtin_result(func, &call.args),
            CallTarget::Unknown => None,
        }
    }

    fn builtin_result(&self, func: BuiltinFunc, args: &[NodeId]) -> Option<Type> {
        let first = args.first().copied();
        match func {
            BuiltinFunc::New => Some(Type::pointer(self.type_of_syntax(first?))),
            BuiltinFunc::Make => Some(self.type_of_syntax(first?)),
            BuiltinFunc::Append | BuiltinFunc::Min | BuiltinFunc::Max => self.infer(first?),
            BuiltinFunc::Len | BuiltinFunc::Cap | BuiltinFunc::Copy => {
                Some(Type::Basic(BasicKind::Int))
            }
            BuiltinFunc::Real | BuiltinFunc::Imag => {
                let arg = first.and_then(|a| self.infer(a));
                let narrow = arg.is_some_and(|t| {
                    matches!(self.underlying(&t), Type::Basic(BasicKind::Complex64))
                });
                Some(Type::Basic(if narrow {
                    BasicKind::Float32
                } else {
                    BasicKind::Float64
                }))
            }
            BuiltinFunc::Complex => {
                let arg = first.and_then(|a| self.infer(a));
                let narrow = arg.is_some_and(|t| {
                    matches!(self.underlying(&t), Type::Basic(BasicKind::Float32))
                });
                Some(Type::Basic(if narrow {
                    BasicKind::Complex64
                } else {
                    BasicKind::Complex128
                }))
            }
            BuiltinFunc::Recover => Some(Type::empty_interface()),
            BuiltinFunc::Clear
            | BuiltinFunc::Close
            | BuiltinFunc::Delete
            | BuiltinFunc::Panic
            | BuiltinFunc::Print
            | BuiltinFunc::Println => None,
        }
    }

    /// Classify the callee of a call expression.
    #[must_use]
    pub fn resolve_call(&self, callee: NodeId) -> CallTarget {
        let ast = self.ast();
        let kind = ast.kind(callee);
        if kind.is_type_syntax() {
            return CallTarget::Conversion(self.type_of_syntax(callee));
        }
        match kind {
            NodeKind::Paren(p) => return self.resolve_call(p.expr),
            NodeKind::Unary(u) if u.op == UnaryOp::Deref => {
                if let Some(resolution) = self.resolve(u.operand)
                    && let Some(ty) = self.type_of_resolution(&resolution)
                {
                    return CallTarget::Conversion(Type::pointer(ty));
                }
            }
            NodeKind::FuncLit(f) => {
                return CallTarget::Func {
                    decl: Some(callee),
                    import_path: Some(ast.file_of(callee).import_path.clone()),
                    sig: self.signature_of(f.signature),
                };
            }
            NodeKind::Ident(_) | NodeKind::Selector(_) => {
                if let Some(resolution) = self.resolve(callee) {
                    return self.call_target_of(&resolution, callee);
                }
                if let NodeKind::Selector(sel) = kind
                    && let Some(operand) = self.infer(sel.operand)
                    && let Some(member) = self.select_member(&operand, &sel.field)
                {
                    return match self.underlying(&member.ty) {
                        Type::Func(sig) => CallTarget::Func {
                            decl: member.decl,
                            import_path: member.import_path,
                            sig,
                        },
                        _ => CallTarget::Unknown,
                    };
                }
                return CallTarget::Unknown;
            }
            _ => {}
        }
        match self.infer(callee).map(|t| self.underlying(&t)) {
            Some(Type::Func(sig)) => CallTarget::Func {
                decl: None,
                import_path: None,
                sig,
            },
            Some(Type::CType) => CallTarget::CSymbol,
            _ => CallTarget::Unknown,
        }
    }

    fn call_target_of(&self, resolution: &Resolution, callee: NodeId) -> CallTarget {
        let ast = self.ast();
        match resolution {
            Resolution::Builtin(Builtin::Func(func)) => CallTarget::Builtin(*func),
            Resolution::Builtin(_) => self
                .type_of_resolution(resolution)
                .map_or(CallTarget::Unknown, CallTarget::Conversion),
            Resolution::CSymbol(_) => CallTarget::CSymbol,
            Resolution::Package(_) => CallTarget::Unknown,
            Resolution::Decl(def) => {
                let parent = ast.parent(*def).map(|p| ast.kind(p));
                match parent {
                    Some(NodeKind::TypeSpec(_)) => self
                        .named_from_def(*def)
                        .map_or(CallTarget::Unknown, CallTarget::Conversion),
                    Some(NodeKind::FuncDecl(f)) => CallTarget::Func {
                        decl: Some(*def),
                        import_path: Some(ast.file_of(*def).import_path.clone()),
                        sig: self.signature_of(f.signature),
                    },
                    _ => match self
                        .type_of_reference(resolution, callee)
                        .map(|t| self.underlying(&t))
                    {
                        Some(Type::Func(sig)) => CallTarget::Func {
                            decl: None,
                            import_path: None,
                            sig,
                        },
                        Some(Type::CType) => CallTarget::CSymbol,
                        _ => CallTarget::Unknown,
                    },
                }
            }
        }
    }

    /// Number of values a call yields, when the callee is known.
    #[must_use]
    pub fn call_result_count(&self, call: NodeId) -> Option<usize> {
        let NodeKind::Call(c) = self.ast().kind(call) else {
            return None;
        };
        match self.resolve_call(c.callee) {
            CallTarget::Func { sig, .. } => Some(sig.result_count()),
            CallTarget::Builtin(func) => Some(func.result_count()),
            CallTarget::Conversion(_) | CallTarget::CSymbol => Some(1),
            CallTarget::Unknown => None,
        }
    }

    /// Field or method `name` of a value of type `ty`, including promoted members.
    #[must_use]
    pub fn select_member(&self, ty: &Type, name: &str) -> Option<Member> {
        self.select_member_in(ty, name, &mut HashSet::new())
    }

    /// `visited` holds the named types already searched, which bounds
    /// recursive embedding without limiting its depth.
    fn select_member_in(
        &self,
        ty: &Type,
        name: &str,
        visited: &mut HashSet<NodeId>,
    ) -> Option<Member> {
        let base = match ty {
            Type::Pointer(inner) => inner.as_ref(),
            other => other,
        };
        if let Type::Named(NamedType { decl: Some(decl), .. }) = base
            && !visited.insert(*decl)
        {
            return None;
        }
        if let Type::Named(named) = base
            && let Some((_, decl)) = self
                .declared_methods(named)
                .into_iter()
                .find(|(n, _)| n == name)
        {
            let ast = self.ast();
            let def = match ast.kind(decl) {
                NodeKind::FuncDecl(f) => Some(f.name),
                _ => None,
            };
            return Some(Member {
                ty: Type::Func(self.func_decl_signature(decl)),
                decl: def,
                import_path: Some(ast.file_of(decl).import_path.clone()),
            });
        }
        let named_path = match base {
            Type::Named(named) if !named.is_builtin() => Some(named.import_path.clone()),
            _ => None,
        };
        match self.underlying(base) {
            Type::Struct(s) => {
                if let Some(field) = s.fields.iter().find(|f| f.name == name) {
                    return Some(Member {
                        ty: field.ty.clone(),
                        decl: None,
                        import_path: Some(field.import_path.clone()),
                    });
                }
                s.fields
                    .iter()
                    .filter(|f| f.embedded)
                    .find_map(|f| self.select_member_in(&f.ty, name, visited))
            }
            Type::Interface(_) => self
                .interface_methods(base)
                .into_iter()
                .find(|m| m.name == name)
                .map(|m| Member {
                    ty: Type::Func(m.sig),
                    decl: None,
                    import_path: named_path,
                }),
            _ => None,
        }
    }

    /// Type of a resolved reference used as a value.
    fn type_of_reference(&self, resolution: &Resolution, reference: NodeId) -> Option<Type> {
        match resolution {
            Resolution::Decl(def) => {
                let ast = self.ast();
                if let Some(parent) = ast.parent(*def)
                    && let NodeKind::TypeSwitch(_) = ast.kind(parent)
                {
                    return self.type_switch_binding(parent, reference);
                }
                self.type_of_def(*def)
            }
            Resolution::Builtin(Builtin::Nil) => Some(Type::UntypedNil),
            Resolution::Builtin(Builtin::True | Builtin::False) => {
                Some(Type::Basic(BasicKind::Bool))
            }
            Resolution::Builtin(Builtin::Iota) => Some(Type::Untyped(UntypedKind::Int)),
            Resolution::Builtin(Builtin::Func(_)) | Resolution::Package(_) => None,
            Resolution::Builtin(_) => self.type_of_resolution(resolution),
            Resolution::CSymbol(_) => Some(Type::CType),
        }
    }

    /// Type of the entity a `DefName` declares.
    #[must_use]
    pub fn type_of_def(&self, def: NodeId) -> Option<Type> {
        self.cached(def, || self.type_of_def_uncached(def))
    }

    fn type_of_def_uncached(&self, def: NodeId) -> Option<Type> {
        let ast = self.ast();
        let parent = ast.parent(def)?;
        match ast.kind(parent) {
            NodeKind::VarSpec(spec) => {
                let index = spec.names.iter().position(|&n| n == def)?;
                self.value_spec_type(spec, index, false)
            }
            NodeKind::ConstSpec(spec) => {
                let index = spec.names.iter().position(|&n| n == def)?;
                if spec.ty.is_none() && spec.values.is_empty() {
                    return self.guarded(parent, || self.repeated_const_type(parent, index));
                }
                self.value_spec_type(spec, index, true)
            }
            NodeKind::ShortVarDecl(decl) => {
                let index = decl.names.iter().position(|&n| n == def)?;
                self.values_type(&decl.values, decl.names.len(), index, false)
            }
            NodeKind::Param(param) => {
                let ty = self.type_of_syntax(param.ty);
                Some(if param.variadic { Type::slice(ty) } else { ty })
            }
            NodeKind::Range(range) => {
                let index = usize::from(range.key != Some(def));
                let ranged = self.infer(range.expr)?;
                self.range_value_type(&ranged, index)
            }
            NodeKind::Recv(recv) => {
                let index = recv.lhs.iter().position(|&n| n == def)?;
                match index {
                    0 => self.infer(*recv.rhs.first()?),
                    1 => Some(Type::Basic(BasicKind::Bool)),
                    _ => None,
                }
            }
            NodeKind::FuncDecl(func) => Some(Type::Func(self.signature_of(func.signature))),
            NodeKind::TypeSpec(_) => self.named_from_def(def),
            NodeKind::FieldDecl(field) => Some(self.type_of_syntax(field.ty)),
            NodeKind::MethodSpec(method) => Some(Type::Func(self.signature_of(method.signature))),
            kind => {
                tracing::debug!(parent = kind.name(), "unsupported declaration site");
                None
            }
        }
    }

    fn value_spec_type(&self, spec: &ValueSpec, index: usize, is_const: bool) -> Option<Type> {
        if let Some(ty) = spec.ty {
            return Some(self.type_of_syntax(ty));
        }
        self.values_type(&spec.values, spec.names.len(), index, is_const)
    }

    /// Constant spec without values: repeat the nearest previous spec of the group.
    fn repeated_const_type(&self, spec: NodeId, index: usize) -> Option<Type> {
        let ast = self.ast();
        let group = ast.parent(spec)?;
        let NodeKind::GenDecl(decl) = ast.kind(group) else {
            return None;
        };
        let pos = decl.specs.iter().position(|&s| s == spec)?;
        decl.specs[..pos].iter().rev().find_map(|&prev| match ast.kind(prev) {
            NodeKind::ConstSpec(p) if p.ty.is_some() || !p.values.is_empty() => {
                self.value_spec_type(p, index, true)
            }
            _ => None,
        })
    }

    /// Type of the `index`-th name of a declaration with `names` names.
    fn values_type(
        &self,
        values: &[NodeId],
        names: usize,
        index: usize,
        is_const: bool,
    ) -> Option<Type> {
        if values.len() == names {
            let value = values[index];
            if is_const && let Some(kind) = self.untyped_literal_kind(value) {
                return Some(Type::Untyped(kind));
            }
            let ty = self.infer(value)?;
            return Some(if is_const { ty } else { ty.defaulted() });
        }
        if values.len() != 1 {
            return None;
        }
        let value = values[0];
        match self.infer(value) {
            Some(Type::Tuple(items)) => items.get(index).cloned(),
            Some(ty) if index == 0 => Some(ty.defaulted()),
            _ if index == 1 && self.is_comma_ok(value) => Some(Type::Basic(BasicKind::Bool)),
            _ => None,
        }
    }

    fn untyped_literal_kind(&self, value: NodeId) -> Option<UntypedKind> {
        match self.ast().kind(value) {
            NodeKind::Paren(p) => self.untyped_literal_kind(p.expr),
            NodeKind::BasicLit(lit) => match lit.kind {
                LitKind::Int => Some(UntypedKind::Int),
                LitKind::Float => Some(UntypedKind::Float),
                LitKind::Char => Some(UntypedKind::Rune),
                LitKind::ImagFloat | LitKind::ImagInt => Some(UntypedKind::Complex),
                LitKind::String | LitKind::RawString => None,
            },
            _ => None,
        }
    }

    /// Map read, type assertion or channel receive: forms that may yield a second `ok` value.
    #[must_use]
    pub fn is_comma_ok(&self, expr: NodeId) -> bool {
        let ast = self.ast();
        match ast.kind(expr) {
            NodeKind::Paren(p) => self.is_comma_ok(p.expr),
            NodeKind::TypeAssert(a) => a.ty.is_some(),
            NodeKind::Unary(u) => u.op == UnaryOp::Recv,
            NodeKind::Index(i) => self
                .infer(i.operand)
                .is_some_and(|t| matches!(self.underlying(&t), Type::Map { .. })),
            _ => false,
        }
    }

    fn range_value_type(&self, ranged: &Type, index: usize) -> Option<Type> {
        let int = Type::Basic(BasicKind::Int);
        match self.underlying(ranged) {
            Type::Chan { elem, .. } => (index == 0).then_some(*elem),
            Type::Slice(elem) | Type::Array { elem, .. } => {
                Some(if index == 0 { int } else { *elem })
            }
            Type::Pointer(inner) => match self.underlying(&inner) {
                Type::Array { elem, .. } => Some(if index == 0 { int } else { *elem }),
                _ => None,
            },
            Type::Map { key, value } => Some(if index == 0 { *key } else { *value }),
            Type::Basic(BasicKind::String) => Some(if index == 0 {
                int
            } else {
                Type::Basic(BasicKind::Rune)
            }),
            Type::Basic(kind) if kind.is_integer() && index == 0 => Some(ranged.clone()),
            Type::Untyped(_) if index == 0 => Some(int),
            _ => None,
        }
    }

    /// `v` in `switch v := x.(type)`: the clause's single type, else the subject's type.
    fn type_switch_binding(&self, switch: NodeId, reference: NodeId) -> Option<Type> {
        let ast = self.ast();
        let NodeKind::TypeSwitch(stmt) = ast.kind(switch) else {
            return None;
        };
        let clause = ast
            .ancestors(reference)
            .take_while(|&a| a != switch)
            .find(|a| stmt.clauses.contains(a));
        if let Some(clause) = clause
            && let NodeKind::TypeCaseClause(c) = ast.kind(clause)
            && let [single] = c.types.as_slice()
            && !matches!(ast.kind(*single), NodeKind::Ident(i) if i.name == "nil")
        {
            return Some(self.type_of_syntax(*single));
        }
        match ast.kind(stmt.subject) {
            NodeKind::TypeAssert(assert) => self.infer(assert.operand),
            _ => self.infer(stmt.subject),
        }
    }

    /// Declaration a call expression invokes, for callers that care about identity.
    #[must_use]
    pub fn callee_decl(&self, call: NodeId) -> Option<NodeId> {
        let NodeKind::Call(c) = self.ast().kind(call) else {
            return None;
        };
        match self.resolve_call(c.callee) {
            CallTarget::Func { decl, .. } => decl,
            _ => None,
        }
    }
}
