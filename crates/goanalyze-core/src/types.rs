//! The type model: a closed set of Go type variants.
//!
//! Values here are plain data. Operations that need declarations
//! (underlying types, identity of named types, method sets) live on
//! [`crate::AnalysisPass`].

use std::fmt;

use goanalyze_ast::NodeId;
pub use goanalyze_ast::BasicKind;
pub use goanalyze_ast::node::ChanDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Basic(BasicKind),
    /// Category of an untyped numeric constant.
    Untyped(UntypedKind),
    /// The type of the bare `nil` identifier.
    UntypedNil,
    Named(NamedType),
    Pointer(Box<Type>),
    Slice(Box<Type>),
    Array { elem: Box<Type>, len: Option<u64> },
    Map { key: Box<Type>, value: Box<Type> },
    Chan { dir: ChanDir, elem: Box<Type> },
    Struct(StructType),
    Interface(InterfaceType),
    Func(Signature),
    /// Result list of a multi-value call. Never declared in source.
    Tuple(Vec<Type>),
    /// Opaque cgo symbol type.
    CType,
    /// A type expression that could not be built (unknown name, bad syntax).
    Invalid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UntypedKind {
    Int,
    Rune,
    Float,
    Complex,
}

impl UntypedKind {
    #[must_use]
    pub const fn default_type(self) -> BasicKind {
        match self {
            Self::Int => BasicKind::Int,
            Self::Rune => BasicKind::Rune,
            Self::Float => BasicKind::Float64,
            Self::Complex => BasicKind::Complex128,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int => "untyped int",
            Self::Rune => "untyped rune",
            Self::Float => "untyped float",
            Self::Complex => "untyped complex",
        }
    }
}

/// A type introduced by a `type` declaration, or the predeclared `error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedType {
    /// `DefName` of the declaring type spec; `None` for `error`.
    pub decl: Option<NodeId>,
    pub name: String,
    /// Package name used for rendering; `None` for `error`.
    pub package: Option<String>,
    pub import_path: String,
}

impl NamedType {
    #[must_use]
    pub fn error() -> Self {
        Self {
            decl: None,
            name: "error".to_string(),
            package: None,
            import_path: String::new(),
        }
    }

    #[must_use]
    pub fn is_builtin(&self) -> bool {
        self.decl.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StructType {
    pub fields: Vec<StructField>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructField {
    pub name: String,
    pub ty: Type,
    pub tag: Option<String>,
    pub embedded: bool,
    /// Import path of the declaring package; distinguishes unexported names.
    pub import_path: String,
}

impl StructField {
    #[must_use]
    pub fn is_exported(&self) -> bool {
        self.name.chars().next().is_some_and(char::is_uppercase)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InterfaceType {
    pub methods: Vec<Method>,
    pub embedded: Vec<Type>,
}

impl InterfaceType {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty() && self.embedded.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub name: String,
    pub sig: Signature,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Signature {
    pub params: Vec<ParamGroup>,
    pub results: Vec<ParamGroup>,
}

/// One parameter declaration: `a, b int` or `rest ...string`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamGroup {
    pub names: Vec<String>,
    /// Element type for variadic groups (`string` in `...string`).
    pub ty: Type,
    pub variadic: bool,
}

impl Signature {
    #[must_use]
    pub fn is_variadic(&self) -> bool {
        self.params.last().is_some_and(|p| p.variadic)
    }

    /// Parameter types, one per parameter; the variadic tail stays its element type.
    #[must_use]
    pub fn param_types(&self) -> Vec<Type> {
        expand(&self.params)
    }

    #[must_use]
    pub fn result_types(&self) -> Vec<Type> {
        expand(&self.results)
    }

    /// Number of values a call yields: per group, `max(1, names)`.
    #[must_use]
    pub fn result_count(&self) -> usize {
        self.results.iter().map(|g| g.names.len().max(1)).sum()
    }

    /// Type of a call expression: nothing, the single result, or a tuple.
    #[must_use]
    pub fn call_type(&self) -> Option<Type> {
        let mut results = self.result_types();
        match results.len() {
            0 => None,
            1 => results.pop(),
            _ => Some(Type::Tuple(results)),
        }
    }
}

fn expand(groups: &[ParamGroup]) -> Vec<Type> {
    groups
        .iter()
        .flat_map(|g| std::iter::repeat_n(g.ty.clone(), g.names.len().max(1)))
        .collect()
}

impl Type {
    #[must_use]
    pub fn pointer(to: Self) -> Self {
        Self::Pointer(Box::new(to))
    }

    #[must_use]
    pub fn slice(of: Self) -> Self {
        Self::Slice(Box::new(of))
    }

    #[must_use]
    pub fn chan(dir: ChanDir, elem: Self) -> Self {
        Self::Chan {
            dir,
            elem: Box::new(elem),
        }
    }

    #[must_use]
    pub fn map(key: Self, value: Self) -> Self {
        Self::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    #[must_use]
    pub fn empty_interface() -> Self {
        Self::Interface(InterfaceType::default())
    }

    #[must_use]
    pub const fn is_named(&self) -> bool {
        matches!(self, Self::Named(_) | Self::Basic(_))
    }

    #[must_use]
    pub const fn is_untyped(&self) -> bool {
        matches!(self, Self::Untyped(_) | Self::UntypedNil)
    }

    /// Replace untyped constant categories with their default types.
    #[must_use]
    pub fn defaulted(self) -> Self {
        match self {
            Self::Untyped(kind) => Self::Basic(kind.default_type()),
            other => other,
        }
    }

    /// Canonical rendering: named types carry their package name.
    #[must_use]
    pub fn text(&self) -> String {
        self.to_string()
    }

    /// Rendering for a diagnostic in the package `import_path`, whose own
    /// named types print without a qualifier.
    #[must_use]
    pub const fn relative_to<'a>(&'a self, import_path: &'a str) -> Relative<'a> {
        Relative {
            ty: self,
            local: import_path,
        }
    }

    fn write(&self, f: &mut fmt::Formatter<'_>, local: Option<&str>) -> fmt::Result {
        match self {
            Self::Basic(kind) => f.write_str(kind.name()),
            Self::Untyped(kind) => f.write_str(kind.name()),
            Self::UntypedNil => f.write_str("nil"),
            Self::Named(named) => match &named.package {
                Some(_) if local == Some(named.import_path.as_str()) => f.write_str(&named.name),
                Some(pkg) => write!(f, "{pkg}.{}", named.name),
                None => f.write_str(&named.name),
            },
            Self::Pointer(inner) => {
                f.write_str("*")?;
                inner.write(f, local)
            }
            Self::Slice(inner) => {
                f.write_str("[]")?;
                inner.write(f, local)
            }
            Self::Array { elem, len } => {
                match len {
                    Some(n) => write!(f, "[{n}]")?,
                    None => f.write_str("[...]")?,
                }
                elem.write(f, local)
            }
            Self::Map { key, value } => {
                f.write_str("map[")?;
                key.write(f, local)?;
                f.write_str("]")?;
                value.write(f, local)
            }
            Self::Chan { dir, elem } => {
                f.write_str(match dir {
                    ChanDir::Both => "chan ",
                    ChanDir::Send => "chan<- ",
                    ChanDir::Recv => "<-chan ",
                })?;
                elem.write(f, local)
            }
            Self::Struct(s) if s.fields.is_empty() => f.write_str("struct{}"),
            Self::Struct(_) => f.write_str("struct {...}"),
            Self::Interface(i) if i.is_empty() => f.write_str("interface{}"),
            Self::Interface(_) => f.write_str("interface {...}"),
            Self::Func(sig) => {
                f.write_str("func")?;
                sig.write(f, local)
            }
            Self::Tuple(items) => {
                f.write_str("(")?;
                write_list(f, items, local)?;
                f.write_str(")")
            }
            Self::CType => f.write_str("C"),
            Self::Invalid => f.write_str("invalid type"),
        }
    }
}

/// A [`Type`] rendered from inside one package, see [`Type::relative_to`].
#[derive(Debug, Clone, Copy)]
pub struct Relative<'a> {
    ty: &'a Type,
    local: &'a str,
}

impl fmt::Display for Relative<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.ty.write(f, Some(self.local))
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write(f, None)
    }
}

impl Signature {
    fn write(&self, f: &mut fmt::Formatter<'_>, local: Option<&str>) -> fmt::Result {
        f.write_str("(")?;
        let mut first = true;
        for group in &self.params {
            for _ in 0..group.names.len().max(1) {
                if !first {
                    f.write_str(", ")?;
                }
                first = false;
                if group.variadic {
                    f.write_str("...")?;
                }
                group.ty.write(f, local)?;
            }
        }
        f.write_str(")")?;
        let results = self.result_types();
        match results.as_slice() {
            [] => Ok(()),
            [single] if self.results.iter().all(|g| g.names.is_empty()) => {
                f.write_str(" ")?;
                single.write(f, local)
            }
            _ => {
                f.write_str(" (")?;
                write_list(f, &results, local)?;
                f.write_str(")")
            }
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write(f, None)
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Type], local: Option<&str>) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        item.write(f, local)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int() -> Type {
        Type::Basic(BasicKind::Int)
    }

    #[test]
    fn renders_composite_types() {
        assert_eq!(Type::slice(int()).text(), "[]int");
        assert_eq!(Type::map(Type::Basic(BasicKind::String), int()).text(), "map[string]int");
        assert_eq!(Type::chan(ChanDir::Send, int()).text(), "chan<- int");
        assert_eq!(Type::chan(ChanDir::Recv, int()).text(), "<-chan int");
        assert_eq!(Type::pointer(int()).text(), "*int");
        assert_eq!(Type::Struct(StructType::default()).text(), "struct{}");
        assert_eq!(Type::empty_interface().text(), "interface{}");
        assert_eq!(Type::Named(NamedType::error()).text(), "error");
    }

    fn named(package: &str, import_path: &str, name: &str) -> Type {
        Type::Named(NamedType {
            decl: None,
            name: name.into(),
            package: Some(package.into()),
            import_path: import_path.into(),
        })
    }

    #[test]
    fn local_named_types_render_bare() {
        let celsius = named("temp", "example.com/temp", "Celsius");
        let duration = named("time", "time", "Duration");
        let mixed = Type::map(celsius.clone(), Type::slice(Type::pointer(duration.clone())));

        assert_eq!(mixed.text(), "map[temp.Celsius][]*time.Duration");
        assert_eq!(
            mixed.relative_to("example.com/temp").to_string(),
            "map[Celsius][]*time.Duration"
        );
        assert_eq!(
            mixed.relative_to("time").to_string(),
            "map[temp.Celsius][]*Duration"
        );
        let sig = Signature {
            params: vec![ParamGroup {
                names: vec![],
                ty: celsius,
                variadic: true,
            }],
            results: vec![ParamGroup {
                names: vec![],
                ty: duration,
                variadic: false,
            }],
        };
        assert_eq!(
            Type::Func(sig).relative_to("example.com/temp").to_string(),
            "func(...Celsius) time.Duration"
        );
        assert_eq!(Type::Named(NamedType::error()).relative_to("").to_string(), "error");
    }

    #[test]
    fn renders_signatures() {
        let sig = Signature {
            params: vec![
                ParamGroup {
                    names: vec!["a".into(), "b".into()],
                    ty: int(),
                    variadic: false,
                },
                ParamGroup {
                    names: vec!["rest".into()],
                    ty: Type::Basic(BasicKind::String),
                    variadic: true,
                },
            ],
            results: vec![
                ParamGroup {
                    names: vec![],
                    ty: int(),
                    variadic: false,
                },
                ParamGroup {
                    names: vec![],
                    ty: Type::Named(NamedType::error()),
                    variadic: false,
                },
            ],
        };
        assert_eq!(Type::Func(sig.clone()).text(), "func(int, int, ...string) (int, error)");
        assert_eq!(sig.result_count(), 2);
        assert!(sig.is_variadic());
        assert_eq!(sig.param_types().len(), 3);
    }

    #[test]
    fn result_count_counts_named_results() {
        let sig = Signature {
            params: vec![],
            results: vec![ParamGroup {
                names: vec!["x".into(), "y".into()],
                ty: int(),
                variadic: false,
            }],
        };
        assert_eq!(sig.result_count(), 2);
        assert_eq!(sig.call_type(), Some(Type::Tuple(vec![int(), int()])));
        assert_eq!(Signature::default().call_type(), None);
    }

    #[test]
    fn untyped_defaults() {
        assert_eq!(Type::Untyped(UntypedKind::Float).defaulted(), Type::Basic(BasicKind::Float64));
        assert_eq!(Type::Untyped(UntypedKind::Rune).defaulted(), Type::Basic(BasicKind::Rune));
    }
}
