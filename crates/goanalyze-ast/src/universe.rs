//! The predeclared identifiers of the universe block.

/// Predeclared non-interface types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasicKind {
    Bool,
    String,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Float32,
    Float64,
    Complex64,
    Complex128,
    /// Alias of `uint8`, kept apart for rendering.
    Byte,
    /// Alias of `int32`, kept apart for rendering.
    Rune,
}

impl BasicKind {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "bool" => Self::Bool,
            "string" => Self::String,
            "int" => Self::Int,
            "int8" => Self::Int8,
            "int16" => Self::Int16,
            "int32" => Self::Int32,
            "int64" => Self::Int64,
            "uint" => Self::Uint,
            "uint8" => Self::Uint8,
            "uint16" => Self::Uint16,
            "uint32" => Self::Uint32,
            "uint64" => Self::Uint64,
            "uintptr" => Self::Uintptr,
            "float32" => Self::Float32,
            "float64" => Self::Float64,
            "complex64" => Self::Complex64,
            "complex128" => Self::Complex128,
            "byte" => Self::Byte,
            "rune" => Self::Rune,
            _ => return None,
        })
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::String => "string",
            Self::Int => "int",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint => "uint",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Uintptr => "uintptr",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Complex64 => "complex64",
            Self::Complex128 => "complex128",
            Self::Byte => "byte",
            Self::Rune => "rune",
        }
    }

    /// `byte` and `rune` collapse onto the types they alias.
    #[must_use]
    pub const fn canonical(self) -> Self {
        match self {
            Self::Byte => Self::Uint8,
            Self::Rune => Self::Int32,
            other => other,
        }
    }

    #[must_use]
    pub const fn is_integer(self) -> bool {
        matches!(
            self.canonical(),
            Self::Int
                | Self::Int8
                | Self::Int16
                | Self::Int32
                | Self::Int64
                | Self::Uint
                | Self::Uint8
                | Self::Uint16
                | Self::Uint32
                | Self::Uint64
                | Self::Uintptr
        )
    }

    #[must_use]
    pub const fn is_unsigned(self) -> bool {
        matches!(
            self.canonical(),
            Self::Uint | Self::Uint8 | Self::Uint16 | Self::Uint32 | Self::Uint64 | Self::Uintptr
        )
    }

    #[must_use]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    #[must_use]
    pub const fn is_complex(self) -> bool {
        matches!(self, Self::Complex64 | Self::Complex128)
    }

    #[must_use]
    pub const fn is_numeric(self) -> bool {
        self.is_integer() || self.is_float() || self.is_complex()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinFunc {
    Append,
    Cap,
    Clear,
    Close,
    Complex,
    Copy,
    Delete,
    Imag,
    Len,
    Make,
    Max,
    Min,
    New,
    Panic,
    Print,
    Println,
    Real,
    Recover,
}

impl BuiltinFunc {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "append" => Self::Append,
            "cap" => Self::Cap,
            "clear" => Self::Clear,
            "close" => Self::Close,
            "complex" => Self::Complex,
            "copy" => Self::Copy,
            "delete" => Self::Delete,
            "imag" => Self::Imag,
            "len" => Self::Len,
            "make" => Self::Make,
            "max" => Self::Max,
            "min" => Self::Min,
            "new" => Self::New,
            "panic" => Self::Panic,
            "print" => Self::Print,
            "println" => Self::Println,
            "real" => Self::Real,
            "recover" => Self::Recover,
            _ => return None,
        })
    }

    /// Number of values the builtin produces.
    #[must_use]
    pub const fn result_count(self) -> usize {
        match self {
            Self::Clear
            | Self::Close
            | Self::Delete
            | Self::Panic
            | Self::Print
            | Self::Println => 0,
            _ => 1,
        }
    }
}

/// What a universe-scope identifier denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Type(BasicKind),
    /// The predeclared `error` interface.
    Error,
    /// `any`, the empty interface.
    Any,
    Func(BuiltinFunc),
    Nil,
    True,
    False,
    Iota,
}

#[must_use]
pub fn lookup(name: &str) -> Option<Builtin> {
    if let Some(kind) = BasicKind::from_name(name) {
        return Some(Builtin::Type(kind));
    }
    if let Some(func) = BuiltinFunc::from_name(name) {
        return Some(Builtin::Func(func));
    }
    Some(match name {
        "error" => Builtin::Error,
        "any" => Builtin::Any,
        "nil" => Builtin::Nil,
        "true" => Builtin::True,
        "false" => Builtin::False,
        "iota" => Builtin::Iota,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_collapse() {
        assert_eq!(BasicKind::Byte.canonical(), BasicKind::Uint8);
        assert_eq!(BasicKind::Rune.canonical(), BasicKind::Int32);
        assert!(BasicKind::Byte.is_unsigned());
        assert!(BasicKind::Rune.is_integer());
    }

    #[test]
    fn lookup_finds_every_category() {
        assert_eq!(lookup("int"), Some(Builtin::Type(BasicKind::Int)));
        assert_eq!(lookup("make"), Some(Builtin::Func(BuiltinFunc::Make)));
        assert_eq!(lookup("nil"), Some(Builtin::Nil));
        assert_eq!(lookup("error"), Some(Builtin::Error));
        assert_eq!(lookup("fmt"), None);
    }
}
