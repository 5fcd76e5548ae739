//! File reader

use std::{
    fmt,
    io::{Error, ErrorKind, Result},
    iter::Peekable,
};

/// A line and column in the input, both starting at 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "line {} column {}", self.line, self.column)
    }
}

/// A peekable iterator for bytes that records line and column information.
pub struct Input<'a> {
    /// The source of the input data
    source: Peekable<Box<dyn Iterator<Item = u8> + 'a>>,
    /// The position of the next byte
    position: Position,
}

impl<'a> Input<'a> {
    /// Create a new `Input` from some source
    pub fn new(source: Box<dyn Iterator<Item = u8> + 'a>) -> Self {
        Input {
            source: source.peekable(),
            position: Position { line: 1, column: 1 },
        }
    }
    /// Create an `Input` that reads from a string.
    pub fn from_text(text: &'a str) -> Self {
        Input::new(Box::new(text.bytes()))
    }
    /// Look at the next byte without consuming it
    pub fn peek(&mut self) -> Option<u8> {
        self.source.peek().cloned()
    }
    /// Returns the position of the next byte.
    pub fn location(&self) -> Position {
        self.position
    }
    /// Create an io::Error with the given message and the current position.
    pub fn error(&self, why: &'static str) -> Error {
        Input::error_at(why, self.position)
    }
    /// Create an io::Error with the given message and position.
    pub fn error_at(why: &'static str, position: Position) -> Error {
        Error::new(ErrorKind::InvalidData, format!("{} at {}", why, position))
    }

    /// Parse an unsigned decimal number.
    ///
    /// Consumes one or more decimal digits. Fails if there is no digit or if
    /// the number does not fit in a `u32`.
    pub fn parse_u32(&mut self) -> Result<u32> {
        if !self.peek().map_or(false, Input::is_digit) {
            return Err(self.error(Input::NUMBER));
        }
        let mut value: u32 = 0;
        while let Some(c) = self.peek() {
            if !Input::is_digit(c) {
                break;
            }
            // Does not unnecessarily overflow because of the order of operations
            value = value
                .checked_mul(10)
                .and_then(|val| val.checked_add(u32::from(c - b'0')))
                .ok_or_else(|| self.error(Input::OVERFLOW))?;
            self.next();
        }
        Ok(value)
    }

    /// Skip spaces, tabs and carriage returns, but not line breaks.
    pub fn skip_blanks(&mut self) {
        while let Some(c) = self.peek() {
            if !Input::is_blank(c) {
                break;
            }
            self.next();
        }
    }

    /// Consume everything up to and including the next line break (or the end of input).
    pub fn skip_line(&mut self) {
        while let Some(c) = self.next() {
            if c == b'\n' {
                break;
            }
        }
    }

    // Error messages.
    /// A numeric overflow. This should only happen for user input.
    pub const OVERFLOW: &'static str = "overflow while parsing number";
    /// Parser error (`expected ...`)
    pub const NUMBER: &'static str = "expected number";
    /// Parser error (`expected ...`)
    pub const FORMULA: &'static str = "expected atom, \"falsum\", \"~\" or \"(\"";
    /// Parser error (`expected ...`)
    pub const TURNSTILE: &'static str = "expected \",\" or \"|=\"";
    /// Parser error (`expected ...`)
    pub const CLOSING_PARENTHESIS: &'static str = "expected \")\"";
    /// Parser error (`expected ...`)
    pub const END_OF_SEQUENT: &'static str = "expected \",\" or end of line";
    /// Parser error (`expected ...`)
    pub const END_OF_FORMULA: &'static str = "expected end of formula";
    /// Parser error (`expected ...`)
    pub const ARROW: &'static str = "expected \"->\"";
    /// Parser error (`expected ...`)
    pub const LEFT_ARROW: &'static str = "expected \"<-\" or \"<->\"";
    /// Parser error (`expected ...`)
    pub const ATOM_INDEX: &'static str = "atom index too large";
    /// Lowercase words other than "falsum"
    pub const UNKNOWN_WORD: &'static str = "unknown keyword";
    /// Bytes that start no token
    pub const UNEXPECTED: &'static str = "unexpected character";
    /// Too many nested negations or parentheses
    pub const NESTING: &'static str = "formula nested too deeply";

    /// Check if a character is a decimal digit.
    pub fn is_digit(value: u8) -> bool {
        value.is_ascii_digit()
    }

    /// Returns true if the character separates tokens within a line.
    pub fn is_blank(c: u8) -> bool {
        [b' ', b'\t', b'\r'].iter().any(|&s| s == c)
    }
}

impl Iterator for Input<'_> {
    type Item = u8;
    fn next(&mut self) -> Option<u8> {
        self.source.next().map(|c| {
            if c == b'\n' {
                self.position.line += 1;
                self.position.column = 0;
            }
            self.position.column += 1;
            c
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_lines_and_columns() {
        let mut input = Input::from_text("ab\nc");
        assert_eq!(input.location(), Position { line: 1, column: 1 });
        input.next();
        input.next();
        assert_eq!(input.location(), Position { line: 1, column: 3 });
        input.next();
        assert_eq!(input.location(), Position { line: 2, column: 1 });
        assert_eq!(input.peek(), Some(b'c'));
        assert_eq!(
            format!("{}", input.error(Input::NUMBER)),
            "expected number at line 2 column 1"
        );
    }

    #[test]
    fn numbers() {
        let mut input = Input::from_text("0042x");
        assert_eq!(input.parse_u32().ok(), Some(42));
        assert_eq!(input.peek(), Some(b'x'));
        assert!(input.parse_u32().is_err());
        let mut input = Input::from_text("4294967296");
        assert_eq!(input.parse_u32().unwrap_err().kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn skipping() {
        let mut input = Input::from_text(" \t\r x comment\nnext");
        input.skip_blanks();
        assert_eq!(input.peek(), Some(b'x'));
        input.skip_line();
        assert_eq!(input.peek(), Some(b'n'));
        input.skip_line();
        assert_eq!(input.peek(), None);
    }
}
