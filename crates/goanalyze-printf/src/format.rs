//! Format-string directive scanner.
//!
//! One left-to-right pass over a (decoded) format string yields a
//! [`Placeholder`] per `%` directive. Argument numbers are 1-based and
//! relative to the first argument after the format string, so in
//! `Printf("%d %s", a, b)` the `%s` consumes argument 2.

use memchr::memchr;

const KNOWN_FLAGS: &str = "#0+- ";

/// Outcome of scanning one directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderState {
    Ok,
    /// The string ended before a verb character.
    MissingVerbAtEnd,
    /// `[...]` did not hold a decimal number followed by `]`.
    ArgumentIndexNotNumeric,
}

/// A single `%...verb` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// Directive text from `%` through the verb (or as far as the scan got).
    pub raw: String,
    /// Byte offset of the `%` in the format string.
    pub offset: usize,
    /// `None` unless `state` is [`PlaceholderState::Ok`].
    pub verb: Option<char>,
    /// Flags as written, with `.` appended when a precision is present.
    pub flags: String,
    /// Arguments consumed, in order: `*` width/precision values first, the
    /// verb's own argument last. Empty for `%%`.
    pub arguments: Vec<usize>,
    /// An explicit `[n]` index appeared.
    pub indexed: bool,
    pub state: PlaceholderState,
}

impl Placeholder {
    /// Argument formatted by the verb itself.
    #[must_use]
    pub fn verb_argument(&self) -> Option<usize> {
        match self.verb {
            Some('%') | None => None,
            Some(_) => self.arguments.last().copied(),
        }
    }

    /// Arguments consumed by `*` width and precision.
    #[must_use]
    pub fn star_arguments(&self) -> &[usize] {
        match self.verb {
            Some('%') => &self.arguments,
            Some(_) => &self.arguments[..self.arguments.len().saturating_sub(1)],
            None => &[],
        }
    }
}

/// Scan state of one directive.
struct Scan<'f> {
    format: &'f str,
    /// Byte position inside `format`.
    pos: usize,
    arg_num: usize,
    index_pending: bool,
    indexed: bool,
    flags: String,
    arguments: Vec<usize>,
}

impl Scan<'_> {
    fn peek(&self) -> Option<u8> {
        self.format.as_bytes().get(self.pos).copied()
    }

    fn parse_flags(&mut self) {
        while let Some(b) = self.peek() {
            if !KNOWN_FLAGS.as_bytes().contains(&b) {
                break;
            }
            self.flags.push(char::from(b));
            self.pos += 1;
        }
    }

    fn scan_digits(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
    }

    /// `[n]`; moves the cursor to `n` without consuming an argument.
    fn parse_index(&mut self) -> Result<(), PlaceholderState> {
        if self.peek() != Some(b'[') {
            return Ok(());
        }
        self.indexed = true;
        self.pos += 1;
        let start = self.pos;
        self.scan_digits();
        if self.pos == start || self.peek() != Some(b']') {
            // absorb through the closing bracket so the raw text is readable
            if let Some(close) = memchr(b']', &self.format.as_bytes()[self.pos..]) {
                self.pos += close + 1;
            }
            return Err(PlaceholderState::ArgumentIndexNotNumeric);
        }
        let index = self.format[start..self.pos]
            .parse::<usize>()
            .map_err(|_| PlaceholderState::ArgumentIndexNotNumeric)?;
        self.pos += 1;
        self.arg_num = index;
        self.index_pending = true;
        Ok(())
    }

    /// Width or precision digits, or `*` which consumes an argument.
    fn parse_num(&mut self) {
        if self.peek() == Some(b'*') {
            self.index_pending = false;
            self.pos += 1;
            self.arguments.push(self.arg_num);
            self.arg_num += 1;
        } else {
            self.scan_digits();
        }
    }

    fn parse_precision(&mut self) -> Result<(), PlaceholderState> {
        if self.peek() == Some(b'.') {
            self.flags.push('.');
            self.pos += 1;
            self.parse_index()?;
            self.parse_num();
        }
        Ok(())
    }

    fn directive(&mut self) -> Result<char, PlaceholderState> {
        self.parse_flags();
        self.parse_index()?;
        self.parse_num();
        self.parse_precision()?;
        if !self.index_pending {
            self.parse_index()?;
        }
        let verb = self.format[self.pos..]
            .chars()
            .next()
            .ok_or(PlaceholderState::MissingVerbAtEnd)?;
        self.pos += verb.len_utf8();
        if verb != '%' {
            self.arguments.push(self.arg_num);
        }
        Ok(verb)
    }
}

/// Scan every directive of `format`.
#[must_use]
pub fn parse_format(format: &str) -> Vec<Placeholder> {
    let bytes = format.as_bytes();
    let mut placeholders = Vec::new();
    let mut arg_num = 1;
    let mut pos = 0;

    while let Some(found) = memchr(b'%', &bytes[pos..]) {
        let offset = pos + found;
        let mut scan = Scan {
            format,
            pos: offset + 1,
            arg_num,
            index_pending: false,
            indexed: false,
            flags: String::new(),
            arguments: Vec::new(),
        };
        let outcome = scan.directive();
        let (verb, state) = match outcome {
            Ok(verb) => (Some(verb), PlaceholderState::Ok),
            Err(state) => (None, state),
        };

        if let (Some(&max), Some(&last)) = (scan.arguments.iter().max(), scan.arguments.last()) {
            arg_num = if scan.indexed {
                last + 1
            } else {
                arg_num.max(max + 1)
            };
        }

        placeholders.push(Placeholder {
            raw: format[offset..scan.pos].to_string(),
            offset,
            verb,
            flags: scan.flags,
            arguments: scan.arguments,
            indexed: scan.indexed,
            state,
        });
        pos = scan.pos;
        if pos >= bytes.len() {
            break;
        }
    }
    placeholders
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(format: &str) -> Vec<Vec<usize>> {
        parse_format(format)
            .into_iter()
            .map(|p| p.arguments)
            .collect()
    }

    #[test]
    fn sequential_directives() {
        let ps = parse_format("%d items, %-8s!");
        assert_eq!(ps.len(), 2);
        assert_eq!(ps[0].verb, Some('d'));
        assert_eq!(ps[0].raw, "%d");
        assert_eq!(ps[1].flags, "-");
        assert_eq!(ps[1].offset, 10);
        assert_eq!(args("%d items, %-8s!"), vec![vec![1], vec![2]]);
    }

    #[test]
    fn explicit_index_moves_the_cursor() {
        assert_eq!(args("%[2]d %d"), vec![vec![2], vec![3]]);
        assert_eq!(args("%[3]d %[1]d %d"), vec![vec![3], vec![1], vec![2]]);
        assert!(parse_format("%[2]d")[0].indexed);
    }

    #[test]
    fn star_consumes_arguments() {
        let ps = parse_format("%*d %.*f");
        assert_eq!(ps[0].arguments, vec![1, 2]);
        assert_eq!(ps[0].star_arguments(), &[1]);
        assert_eq!(ps[0].verb_argument(), Some(2));
        assert_eq!(ps[1].arguments, vec![3, 4]);
        assert_eq!(ps[1].flags, ".");
        assert_eq!(args("%[2]*d"), vec![vec![2, 3]]);
    }

    #[test]
    fn percent_literal_takes_nothing() {
        let ps = parse_format("100%% of %v");
        assert_eq!(ps[0].verb, Some('%'));
        assert!(ps[0].arguments.is_empty());
        assert_eq!(ps[0].verb_argument(), None);
        assert_eq!(ps[1].arguments, vec![1]);
    }

    #[test]
    fn trailing_percent_is_missing_its_verb() {
        let ps = parse_format("50%");
        assert_eq!(ps.len(), 1);
        assert_eq!(ps[0].state, PlaceholderState::MissingVerbAtEnd);
        assert_eq!(ps[0].verb, None);
        assert_eq!(parse_format("%-0")[0].state, PlaceholderState::MissingVerbAtEnd);
    }

    #[test]
    fn malformed_index() {
        let ps = parse_format("%[x]d %d");
        assert_eq!(ps[0].state, PlaceholderState::ArgumentIndexNotNumeric);
        assert_eq!(ps[0].raw, "%[x]");
        assert_eq!(parse_format("%[1")[0].state, PlaceholderState::ArgumentIndexNotNumeric);
        assert_eq!(parse_format("%[]d")[0].state, PlaceholderState::ArgumentIndexNotNumeric);
    }

    #[test]
    fn zero_index_is_kept_for_the_checker() {
        assert_eq!(args("%[0]d"), vec![vec![0]]);
    }

    #[test]
    fn multibyte_verbs_and_text() {
        let ps = parse_format("héllo %é %s");
        assert_eq!(ps[0].verb, Some('é'));
        assert_eq!(ps[1].verb, Some('s'));
        assert_eq!(ps[1].arguments, vec![2]);
    }

    #[test]
    fn no_directives() {
        assert!(parse_format("plain text").is_empty());
        assert!(parse_format("").is_empty());
    }
}
