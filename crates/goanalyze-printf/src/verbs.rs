//! Static tables: printf verbs and the functions that take format strings.

/// Set of argument categories a verb accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgKinds(u8);

impl ArgKinds {
    pub const NONE: Self = Self(0);
    pub const BOOL: Self = Self(1);
    pub const INT: Self = Self(1 << 1);
    pub const RUNE: Self = Self(1 << 2);
    pub const STRING: Self = Self(1 << 3);
    pub const FLOAT: Self = Self(1 << 4);
    pub const COMPLEX: Self = Self(1 << 5);
    pub const POINTER: Self = Self(1 << 6);
    pub const ANY: Self = Self(u8::MAX);

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// True when any category of `other` is accepted.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

/// One row of the verb table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verb {
    pub verb: char,
    /// Flags the verb tolerates; `.` stands for a precision.
    pub flags: &'static str,
    pub accepts: ArgKinds,
}

impl Verb {
    #[must_use]
    pub fn allows_flag(&self, flag: char) -> bool {
        self.flags.contains(flag)
    }

    /// `%p` and `%T` print function values meaningfully.
    #[must_use]
    pub const fn takes_function_values(&self) -> bool {
        matches!(self.verb, 'p' | 'T')
    }
}

const NUMERIC_FLAGS: &str = " -+.0";
const SHARP_FLAGS: &str = " -+.0#";

const INT_FLOAT_COMPLEX: ArgKinds = ArgKinds::INT
    .union(ArgKinds::FLOAT)
    .union(ArgKinds::COMPLEX);
const FLOAT_COMPLEX: ArgKinds = ArgKinds::FLOAT.union(ArgKinds::COMPLEX);
const RUNE_INT: ArgKinds = ArgKinds::RUNE.union(ArgKinds::INT);
const RUNE_INT_STRING: ArgKinds = RUNE_INT.union(ArgKinds::STRING);

static VERBS: [Verb; 20] = [
    Verb { verb: '%', flags: "", accepts: ArgKinds::NONE },
    Verb { verb: 'b', flags: NUMERIC_FLAGS, accepts: INT_FLOAT_COMPLEX },
    Verb { verb: 'c', flags: "-", accepts: RUNE_INT },
    Verb { verb: 'd', flags: NUMERIC_FLAGS, accepts: ArgKinds::INT },
    Verb { verb: 'e', flags: NUMERIC_FLAGS, accepts: FLOAT_COMPLEX },
    Verb { verb: 'E', flags: NUMERIC_FLAGS, accepts: FLOAT_COMPLEX },
    Verb { verb: 'f', flags: NUMERIC_FLAGS, accepts: FLOAT_COMPLEX },
    Verb { verb: 'F', flags: NUMERIC_FLAGS, accepts: FLOAT_COMPLEX },
    Verb { verb: 'g', flags: NUMERIC_FLAGS, accepts: FLOAT_COMPLEX },
    Verb { verb: 'G', flags: NUMERIC_FLAGS, accepts: FLOAT_COMPLEX },
    Verb { verb: 'o', flags: SHARP_FLAGS, accepts: ArgKinds::INT },
    Verb { verb: 'p', flags: "-#", accepts: ArgKinds::POINTER },
    Verb { verb: 'q', flags: SHARP_FLAGS, accepts: RUNE_INT_STRING },
    Verb { verb: 's', flags: NUMERIC_FLAGS, accepts: ArgKinds::STRING },
    Verb { verb: 't', flags: "-", accepts: ArgKinds::BOOL },
    Verb { verb: 'T', flags: "-", accepts: ArgKinds::ANY },
    Verb { verb: 'U', flags: "-#", accepts: RUNE_INT },
    Verb { verb: 'v', flags: SHARP_FLAGS, accepts: ArgKinds::ANY },
    Verb { verb: 'x', flags: SHARP_FLAGS, accepts: RUNE_INT_STRING },
    Verb { verb: 'X', flags: SHARP_FLAGS, accepts: RUNE_INT_STRING },
];

/// Verb table row for `verb`.
#[must_use]
pub fn lookup_verb(verb: char) -> Option<&'static Verb> {
    VERBS.iter().find(|v| v.verb == verb)
}

/// Lowercased function name to the index of its format argument.
static FORMATTING_FUNCTIONS: [(&str, usize); 11] = [
    ("errorf", 0),
    ("fatalf", 0),
    ("fprintf", 1),
    ("fscanf", 1),
    ("logf", 0),
    ("panicf", 0),
    ("printf", 0),
    ("scanf", 0),
    ("skipf", 0),
    ("sprintf", 0),
    ("sscanf", 1),
];

/// Lowercased names of functions that print their operands as-is.
static PRINTING_FUNCTIONS: [&str; 11] = [
    "error", "fatal", "fprint", "fprintln", "log", "panic", "panicln", "print", "println",
    "sprint", "sprintln",
];

/// Packages whose formatting functions are checked.
pub static FORMATTING_PACKAGES: [&str; 3] = ["fmt", "log", "testing"];

/// Format argument position of a known formatting function.
#[must_use]
pub fn formatting_position(name: &str) -> Option<usize> {
    let lower = name.to_lowercase();
    FORMATTING_FUNCTIONS
        .iter()
        .find(|(n, _)| *n == lower)
        .map(|(_, pos)| *pos)
}

#[must_use]
pub fn is_printing_function(name: &str) -> bool {
    let lower = name.to_lowercase();
    PRINTING_FUNCTIONS.contains(&lower.as_str())
}
