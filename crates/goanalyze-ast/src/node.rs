//! Node kinds and their per-kind payloads.
//!
//! Every node carries a closed [`NodeKind`]; consumers match on it instead of
//! dispatching through a class hierarchy. Child links inside payloads are
//! [`NodeId`]s into the owning [`crate::Ast`].

use crate::NodeId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    File(FileNode),
    Import(ImportSpec),
    FuncDecl(FuncDecl),
    Signature(Signature),
    Param(Param),
    /// A declared identifier. Its parent says what kind of declaration it is.
    DefName(DefName),
    GenDecl(GenDecl),
    VarSpec(ValueSpec),
    ConstSpec(ValueSpec),
    TypeSpec(TypeSpec),

    Block(Block),
    ShortVarDecl(ShortVarDecl),
    Assign(Assign),
    IncDec(IncDec),
    ExprStmt(ExprStmt),
    Send(SendStmt),
    Recv(RecvStmt),
    Return(ReturnStmt),
    If(IfStmt),
    For(ForStmt),
    Range(RangeStmt),
    Switch(SwitchStmt),
    CaseClause(CaseClause),
    TypeSwitch(TypeSwitchStmt),
    TypeCaseClause(TypeCaseClause),
    Select(SelectStmt),
    CommClause(CommClause),
    Go(CallStmt),
    Defer(CallStmt),
    Labeled(LabeledStmt),
    Branch(Branch),
    Empty,

    Ident(Ident),
    BasicLit(BasicLit),
    CompositeLit(CompositeLit),
    KeyValue(KeyValue),
    FuncLit(FuncLit),
    Paren(Paren),
    Selector(Selector),
    Index(IndexExpr),
    Slice(SliceExpr),
    TypeAssert(TypeAssert),
    Call(CallExpr),
    Unary(UnaryExpr),
    Binary(BinaryExpr),

    TypeName(TypeName),
    PointerType(ElemType),
    SliceType(ElemType),
    ArrayType(ArrayType),
    MapType(MapType),
    ChanType(ChanType),
    StructType(StructType),
    FieldDecl(FieldDecl),
    InterfaceType(InterfaceType),
    MethodSpec(MethodSpec),
    FuncType(FuncType),

    /// Anything the front-end could not make sense of (parse errors, unsupported syntax).
    Bad,
}

impl NodeKind {
    /// Short name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Import(_) => "import",
            Self::FuncDecl(_) => "func-decl",
            Self::Signature(_) => "signature",
            Self::Param(_) => "param",
            Self::DefName(_) => "def-name",
            Self::GenDecl(_) => "gen-decl",
            Self::VarSpec(_) => "var-spec",
            Self::ConstSpec(_) => "const-spec",
            Self::TypeSpec(_) => "type-spec",
            Self::Block(_) => "block",
            Self::ShortVarDecl(_) => "short-var-decl",
            Self::Assign(_) => "assign",
            Self::IncDec(_) => "inc-dec",
            Self::ExprStmt(_) => "expr-stmt",
            Self::Send(_) => "send",
            Self::Recv(_) => "recv",
            Self::Return(_) => "return",
            Self::If(_) => "if",
            Self::For(_) => "for",
            Self::Range(_) => "range",
            Self::Switch(_) => "switch",
            Self::CaseClause(_) => "case-clause",
            Self::TypeSwitch(_) => "type-switch",
            Self::TypeCaseClause(_) => "type-case-clause",
            Self::Select(_) => "select",
            Self::CommClause(_) => "comm-clause",
            Self::Go(_) => "go",
            Self::Defer(_) => "defer",
            Self::Labeled(_) => "labeled",
            Self::Branch(_) => "branch",
            Self::Empty => "empty",
            Self::Ident(_) => "ident",
            Self::BasicLit(_) => "basic-lit",
            Self::CompositeLit(_) => "composite-lit",
            Self::KeyValue(_) => "key-value",
            Self::FuncLit(_) => "func-lit",
            Self::Paren(_) => "paren",
            Self::Selector(_) => "selector",
            Self::Index(_) => "index",
            Self::Slice(_) => "slice",
            Self::TypeAssert(_) => "type-assert",
            Self::Call(_) => "call",
            Self::Unary(_) => "unary",
            Self::Binary(_) => "binary",
            Self::TypeName(_) => "type-name",
            Self::PointerType(_) => "pointer-type",
            Self::SliceType(_) => "slice-type",
            Self::ArrayType(_) => "array-type",
            Self::MapType(_) => "map-type",
            Self::ChanType(_) => "chan-type",
            Self::StructType(_) => "struct-type",
            Self::FieldDecl(_) => "field-decl",
            Self::InterfaceType(_) => "interface-type",
            Self::MethodSpec(_) => "method-spec",
            Self::FuncType(_) => "func-type",
            Self::Bad => "bad",
        }
    }

    /// Nodes written in type syntax (`[]int`, `map[K]V`, `pkg.T`, ...).
    #[must_use]
    pub const fn is_type_syntax(&self) -> bool {
        matches!(
            self,
            Self::TypeName(_)
                | Self::PointerType(_)
                | Self::SliceType(_)
                | Self::ArrayType(_)
                | Self::MapType(_)
                | Self::ChanType(_)
                | Self::StructType(_)
                | Self::InterfaceType(_)
                | Self::FuncType(_)
        )
    }

    #[must_use]
    pub const fn is_literal(&self) -> bool {
        matches!(self, Self::BasicLit(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    pub package_name: String,
    pub imports: Vec<NodeId>,
    pub decls: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    /// Explicit local name (`f "fmt"`, `. "fmt"`, `_ "fmt"`).
    pub alias: Option<String>,
    pub path: String,
}

impl ImportSpec {
    /// Name the import binds in the file scope, if any.
    #[must_use]
    pub fn local_name(&self) -> Option<&str> {
        match self.alias.as_deref() {
            Some("." | "_") => None,
            Some(alias) => Some(alias),
            None => Some(self.path.rsplit('/').next().unwrap_or(&self.path)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncDecl {
    pub name: NodeId,
    /// `Param` node of the receiver for methods.
    pub receiver: Option<NodeId>,
    pub signature: NodeId,
    pub body: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub params: Vec<NodeId>,
    pub results: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// `DefName` nodes; empty for unnamed parameters.
    pub names: Vec<NodeId>,
    pub ty: NodeId,
    pub variadic: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefName {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKeyword {
    Var,
    Const,
    Type,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenDecl {
    pub keyword: DeclKeyword,
    pub specs: Vec<NodeId>,
}

/// A `var` or `const` spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueSpec {
    pub names: Vec<NodeId>,
    pub ty: Option<NodeId>,
    pub values: Vec<NodeId>,
    /// Position inside the enclosing group; the value of `iota` for constants.
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSpec {
    pub name: NodeId,
    pub ty: NodeId,
    pub alias: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub stmts: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortVarDecl {
    pub names: Vec<NodeId>,
    pub values: Vec<NodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Compound(BinaryOp),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assign {
    pub op: AssignOp,
    pub lhs: Vec<NodeId>,
    pub rhs: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncDec {
    pub target: NodeId,
    pub increment: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExprStmt {
    pub expr: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendStmt {
    pub channel: NodeId,
    pub value: NodeId,
}

/// `case v, ok := <-ch:` inside a select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecvStmt {
    /// `DefName`s when `define`, otherwise expressions.
    pub lhs: Vec<NodeId>,
    pub define: bool,
    pub rhs: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnStmt {
    pub results: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfStmt {
    pub init: Option<NodeId>,
    pub cond: NodeId,
    pub then: NodeId,
    pub els: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForStmt {
    pub init: Option<NodeId>,
    pub cond: Option<NodeId>,
    pub post: Option<NodeId>,
    pub body: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeStmt {
    pub key: Option<NodeId>,
    pub value: Option<NodeId>,
    /// `:=` form; key and value are `DefName`s.
    pub define: bool,
    pub expr: NodeId,
    pub body: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchStmt {
    pub init: Option<NodeId>,
    pub tag: Option<NodeId>,
    pub clauses: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseClause {
    /// Empty for `default`.
    pub exprs: Vec<NodeId>,
    pub body: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSwitchStmt {
    pub init: Option<NodeId>,
    /// `v` in `switch v := x.(type)`.
    pub binding: Option<NodeId>,
    pub subject: NodeId,
    pub clauses: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeCaseClause {
    /// Empty for `default`. `nil` appears as an `Ident`.
    pub types: Vec<NodeId>,
    pub body: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectStmt {
    pub clauses: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommClause {
    /// `Send`, `Recv` or `ExprStmt`; `None` for `default`.
    pub comm: Option<NodeId>,
    pub body: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallStmt {
    pub call: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledStmt {
    pub label: String,
    pub stmt: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub keyword: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LitKind {
    Int,
    Float,
    /// `1.5i`, `1e3i`
    ImagFloat,
    /// `2i`
    ImagInt,
    Char,
    String,
    RawString,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicLit {
    pub kind: LitKind,
    /// Literal source text, quotes included.
    pub raw: String,
}

impl BasicLit {
    /// Body of a string literal without its quotes, escapes left as written.
    #[must_use]
    pub fn string_body(&self) -> Option<&str> {
        match self.kind {
            LitKind::String => self.raw.strip_prefix('"')?.strip_suffix('"'),
            LitKind::RawString => self.raw.strip_prefix('`')?.strip_suffix('`'),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeLit {
    /// `None` for elided literals nested in a typed outer literal.
    pub ty: Option<NodeId>,
    pub elems: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: NodeId,
    pub value: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncLit {
    pub signature: NodeId,
    pub body: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paren {
    pub expr: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub operand: NodeId,
    pub field: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexExpr {
    pub operand: NodeId,
    pub index: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceExpr {
    pub operand: NodeId,
    pub low: Option<NodeId>,
    pub high: Option<NodeId>,
    pub max: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeAssert {
    pub operand: NodeId,
    /// `None` for the `.(type)` guard of a type switch.
    pub ty: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallExpr {
    pub callee: NodeId,
    pub args: Vec<NodeId>,
    /// Trailing `...` spread of the last argument.
    pub spread: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Neg,
    Not,
    Xor,
    Deref,
    Addr,
    Recv,
}

impl UnaryOp {
    #[must_use]
    pub fn parse(op: &str) -> Option<Self> {
        Some(match op {
            "+" => Self::Plus,
            "-" => Self::Neg,
            "!" => Self::Not,
            "^" => Self::Xor,
            "*" => Self::Deref,
            "&" => Self::Addr,
            "<-" => Self::Recv,
            _ => return None,
        })
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plus => "+",
            Self::Neg => "-",
            Self::Not => "!",
            Self::Xor => "^",
            Self::Deref => "*",
            Self::Addr => "&",
            Self::Recv => "<-",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub operand: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    LogOr,
    LogAnd,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Or,
    Xor,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    And,
    AndNot,
}

impl BinaryOp {
    #[must_use]
    pub fn parse(op: &str) -> Option<Self> {
        Some(match op {
            "||" => Self::LogOr,
            "&&" => Self::LogAnd,
            "==" => Self::Eq,
            "!=" => Self::Ne,
            "<" => Self::Lt,
            "<=" => Self::Le,
            ">" => Self::Gt,
            ">=" => Self::Ge,
            "+" => Self::Add,
            "-" => Self::Sub,
            "|" => Self::Or,
            "^" => Self::Xor,
            "*" => Self::Mul,
            "/" => Self::Div,
            "%" => Self::Rem,
            "<<" => Self::Shl,
            ">>" => Self::Shr,
            "&" => Self::And,
            "&^" => Self::AndNot,
            _ => return None,
        })
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LogOr => "||",
            Self::LogAnd => "&&",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Or => "|",
            Self::Xor => "^",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::And => "&",
            Self::AndNot => "&^",
        }
    }

    #[must_use]
    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Eq | Self::Ne | Self::Lt | Self::Le | Self::Gt | Self::Ge
        )
    }

    #[must_use]
    pub const fn is_logical(self) -> bool {
        matches!(self, Self::LogOr | Self::LogAnd)
    }

    /// `+ - | ^`
    #[must_use]
    pub const fn is_additive(self) -> bool {
        matches!(self, Self::Add | Self::Sub | Self::Or | Self::Xor)
    }

    /// `* / % << >> & &^`
    #[must_use]
    pub const fn is_multiplicative(self) -> bool {
        matches!(
            self,
            Self::Mul | Self::Div | Self::Rem | Self::Shl | Self::Shr | Self::And | Self::AndNot
        )
    }

    #[must_use]
    pub const fn is_shift(self) -> bool {
        matches!(self, Self::Shl | Self::Shr)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryExpr {
    pub op: BinaryOp,
    pub left: NodeId,
    pub right: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeName {
    /// Package qualifier as written (`io` in `io.Reader`).
    pub package: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElemType {
    pub elem: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayType {
    /// Length expression; `None` for `[...]T`.
    pub len: Option<NodeId>,
    pub elem: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapType {
    pub key: NodeId,
    pub value: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChanType {
    pub dir: ChanDir,
    pub elem: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructType {
    pub fields: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    /// `DefName`s; empty for embedded fields.
    pub names: Vec<NodeId>,
    pub ty: NodeId,
    pub tag: Option<String>,
    pub embedded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceType {
    pub methods: Vec<NodeId>,
    pub embeds: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSpec {
    pub name: NodeId,
    pub signature: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncType {
    pub signature: NodeId,
}
