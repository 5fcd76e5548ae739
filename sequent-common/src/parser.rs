//! Parser for the textual sequent notation, and file handling
//!
//! ```text
//! sequent  := list "|=" list
//! list     := (formula ("," formula)*)?
//! formula  := imp ("<->" imp)*
//! imp      := or ("->" imp | ("<-" or)*)
//! or       := and ("|" and)*
//! and      := unary ("&" unary)*
//! unary    := "~" unary | atom | "falsum" | "(" formula ")"
//! atom     := "A" | ... | "Z" | "P" digits
//! ```
//!
//! `U <- V` is the converse implication `V -> U`.
//! A sequent must fit on one line. Files contain one sequent per line;
//! empty lines and lines starting with `c` are comments.

use crate::{
    formula::{Atom, Formula},
    input::{Input, Position},
    memory::Vector,
    sequent::{FormulaList, Sequent},
};
use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Read, Result, StdinLock, Stdout, Write},
};

/// Formulas may not nest deeper than this.
///
/// Every negation, parenthesis and binary operator on the path from the
/// root of a formula to a leaf counts, so this bounds the depth of parsed
/// formula trees.
pub const MAX_NESTING: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Atom(Atom),
    Falsum,
    Not,
    And,
    Or,
    Implies,
    ConverseImplies,
    Iff,
    LeftParenthesis,
    RightParenthesis,
    Comma,
    Turnstile,
    Newline,
    End,
}

/// Recursive descent parser with one token of lookahead
struct SequentParser<'i, 'a> {
    input: &'i mut Input<'a>,
    /// The next token, not yet consumed
    token: Token,
    /// Where `token` starts
    position: Position,
    /// Current depth of the formula being parsed
    nesting: usize,
}

impl<'i, 'a> SequentParser<'i, 'a> {
    fn new(input: &'i mut Input<'a>) -> Result<SequentParser<'i, 'a>> {
        let mut parser = SequentParser {
            input,
            token: Token::End,
            position: Position { line: 1, column: 1 },
            nesting: 0,
        };
        parser.advance()?;
        Ok(parser)
    }

    fn error(&self, why: &'static str) -> io::Error {
        Input::error_at(why, self.position)
    }

    /// Read the next token into the lookahead.
    fn advance(&mut self) -> Result<()> {
        self.input.skip_blanks();
        self.position = self.input.location();
        self.token = self.lex()?;
        Ok(())
    }

    fn lex(&mut self) -> Result<Token> {
        let c = match self.input.next() {
            None => return Ok(Token::End),
            Some(c) => c,
        };
        Ok(match c {
            b'\n' => Token::Newline,
            b'~' => Token::Not,
            b'&' => Token::And,
            b',' => Token::Comma,
            b'(' => Token::LeftParenthesis,
            b')' => Token::RightParenthesis,
            b'|' => {
                if self.input.peek() == Some(b'=') {
                    self.input.next();
                    Token::Turnstile
                } else {
                    Token::Or
                }
            }
            b'-' => {
                if self.input.next() != Some(b'>') {
                    return Err(self.error(Input::ARROW));
                }
                Token::Implies
            }
            b'<' => {
                if self.input.next() != Some(b'-') {
                    return Err(self.error(Input::LEFT_ARROW));
                }
                if self.input.peek() == Some(b'>') {
                    self.input.next();
                    Token::Iff
                } else {
                    Token::ConverseImplies
                }
            }
            b'P' if self.input.peek().map_or(false, Input::is_digit) => {
                let n = self.input.parse_u32()?;
                if n > Atom::MAX_ID - Atom::LETTERS {
                    return Err(self.error(Input::ATOM_INDEX));
                }
                Token::Atom(Atom::numbered(n))
            }
            c if c.is_ascii_uppercase() => Token::Atom(Atom::letter(c as char)),
            c if c.is_ascii_lowercase() => {
                let mut word = vec![c];
                while let Some(c) = self.input.peek() {
                    if !c.is_ascii_lowercase() {
                        break;
                    }
                    word.push(c);
                    self.input.next();
                }
                if word != b"falsum" {
                    return Err(self.error(Input::UNKNOWN_WORD));
                }
                Token::Falsum
            }
            _ => return Err(self.error(Input::UNEXPECTED)),
        })
    }

    /// Consume the lookahead if it is `token`.
    fn accept(&mut self, token: Token) -> Result<bool> {
        if self.token == token {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn sequent(&mut self) -> Result<Sequent> {
        let premises = self.list()?;
        if !self.accept(Token::Turnstile)? {
            return Err(self.error(Input::TURNSTILE));
        }
        let conclusions = self.list()?;
        match self.token {
            Token::Newline | Token::End => Ok(Sequent::new(premises, conclusions)),
            _ => Err(self.error(Input::END_OF_SEQUENT)),
        }
    }

    fn list(&mut self) -> Result<FormulaList> {
        let mut formulas = Vector::new();
        if let Token::Turnstile | Token::Newline | Token::End = self.token {
            return Ok(formulas);
        }
        loop {
            formulas.push(self.formula()?);
            if !self.accept(Token::Comma)? {
                return Ok(formulas);
            }
        }
    }

    fn formula(&mut self) -> Result<Formula> {
        let nesting = self.nesting;
        let mut formula = self.implication()?;
        while self.accept(Token::Iff)? {
            self.enter()?;
            formula = Formula::iff(formula, self.implication()?);
        }
        self.nesting = nesting;
        Ok(formula)
    }

    fn implication(&mut self) -> Result<Formula> {
        let nesting = self.nesting;
        let mut formula = self.disjunction()?;
        if self.accept(Token::Implies)? {
            self.enter()?;
            let consequent = self.implication()?;
            self.nesting = nesting;
            return Ok(Formula::implies(formula, consequent));
        }
        while self.accept(Token::ConverseImplies)? {
            self.enter()?;
            formula = Formula::implies(self.disjunction()?, formula);
        }
        self.nesting = nesting;
        Ok(formula)
    }

    fn disjunction(&mut self) -> Result<Formula> {
        let nesting = self.nesting;
        let mut formula = self.conjunction()?;
        while self.accept(Token::Or)? {
            self.enter()?;
            formula = Formula::or(formula, self.conjunction()?);
        }
        self.nesting = nesting;
        Ok(formula)
    }

    fn conjunction(&mut self) -> Result<Formula> {
        let nesting = self.nesting;
        let mut formula = self.unary()?;
        while self.accept(Token::And)? {
            self.enter()?;
            formula = Formula::and(formula, self.unary()?);
        }
        self.nesting = nesting;
        Ok(formula)
    }

    fn unary(&mut self) -> Result<Formula> {
        let nesting = self.nesting;
        match self.token {
            Token::Atom(atom) => {
                self.advance()?;
                Ok(Formula::atom(atom))
            }
            Token::Falsum => {
                self.advance()?;
                Ok(Formula::falsum())
            }
            Token::Not => {
                self.enter()?;
                self.advance()?;
                let formula = Formula::negate(self.unary()?);
                self.nesting = nesting;
                Ok(formula)
            }
            Token::LeftParenthesis => {
                self.enter()?;
                self.advance()?;
                let formula = self.formula()?;
                if self.token != Token::RightParenthesis {
                    return Err(self.error(Input::CLOSING_PARENTHESIS));
                }
                self.advance()?;
                self.nesting = nesting;
                Ok(formula)
            }
            _ => Err(self.error(Input::FORMULA)),
        }
    }

    /// Go one level deeper, failing if the input nests too deeply.
    fn enter(&mut self) -> Result<()> {
        self.nesting += 1;
        if self.nesting > MAX_NESTING {
            return Err(self.error(Input::NESTING));
        }
        Ok(())
    }
}

/// Parse exactly one sequent from a string, for example `"P, P -> Q |= Q"`.
pub fn parse_sequent(text: &str) -> Result<Sequent> {
    let mut input = Input::from_text(text);
    let mut parser = SequentParser::new(&mut input)?;
    let sequent = parser.sequent()?;
    parser.accept(Token::Newline)?;
    if parser.token != Token::End {
        return Err(parser.error(Input::END_OF_SEQUENT));
    }
    Ok(sequent)
}

/// Parse exactly one formula from a string.
pub fn parse_formula(text: &str) -> Result<Formula> {
    let mut input = Input::from_text(text);
    let mut parser = SequentParser::new(&mut input)?;
    let formula = parser.formula()?;
    parser.accept(Token::Newline)?;
    if parser.token != Token::End {
        return Err(parser.error(Input::END_OF_FORMULA));
    }
    Ok(formula)
}

/// Parse a file of sequents, one per line.
///
/// Returns each sequent with the line it was found on.
pub fn parse_sequents(input: &mut Input) -> Result<Vector<(usize, Sequent)>> {
    let mut sequents = Vector::new();
    loop {
        input.skip_blanks();
        match input.peek() {
            None => return Ok(sequents),
            Some(b'\n') | Some(b'c') => input.skip_line(),
            Some(_) => {
                let line = input.location().line;
                let sequent = SequentParser::new(input)?.sequent()?;
                sequents.push((line, sequent));
            }
        }
    }
}

/// Open a file for reading.
pub fn open_file(filename: &str) -> Result<File> {
    File::open(filename)
        .map_err(|err| io::Error::new(err.kind(), format!("cannot open file {}: {}", filename, err)))
}

/// Open a file for writing.
///
/// If the filename is "-", writes to stdout instead.
pub fn open_file_for_writing<'a>(filename: &str, stdout: &'a Stdout) -> Result<Box<dyn Write + 'a>> {
    let writer: Box<dyn Write + 'a> = match filename {
        "-" => Box::new(BufWriter::new(stdout.lock())),
        filename => Box::new(BufWriter::new(File::create(filename).map_err(|err| {
            io::Error::new(
                err.kind(),
                format!("cannot open file {} for writing: {}", filename, err),
            )
        })?)),
    };
    Ok(writer)
}

/// File extension of Zstandard archives.
const ZSTD: &str = ".zst";
/// File extension of Gzip archives.
const GZIP: &str = ".gz";
/// File extension of Bzip2 archives.
const BZIP2: &str = ".bz2";
/// File extension of XZ archives.
const XZ: &str = ".xz";
/// File extension of LZ4 archives.
const LZ4: &str = ".lz4";

/// Strip the compression format off a filename.
///
/// If the filename ends with a known archive extension,
/// return the filname without extension and the extension.
/// Otherwise return the unmodified filename and the empty string.
fn compression_format_by_extension(filename: &str) -> (&str, &str) {
    for extension in &[ZSTD, GZIP, BZIP2, LZ4, XZ] {
        if filename.ends_with(extension) {
            return (&filename[0..filename.len() - extension.len()], extension);
        }
    }
    (filename, "")
}

/// Return an [Input](../input/struct.Input.html) to read from a possibly compressed file.
///
/// If the file is compressed it is transparently uncompressed.
/// If the filename is "-", returns an [Input](../input/struct.Input.html) reading data from stdin.
pub fn read_compressed_file_or_stdin<'a>(filename: &str, stdin: StdinLock<'a>) -> Result<Input<'a>> {
    match filename {
        "-" => Ok(Input::new(Box::new(stdin.bytes().map(panic_on_error)))),
        filename => read_compressed_file(filename),
    }
}

/// Return an [Input](../input/struct.Input.html) to read from a possibly compressed file.
pub fn read_compressed_file<'a>(filename: &str) -> Result<Input<'a>> {
    let file = open_file(filename)?;
    Ok(Input::new(read_from_compressed_file(file, filename)?))
}

/// Return an Iterator to read from a possibly compressed file.
///
/// If the file is compressed it is transparently uncompressed.
fn read_from_compressed_file(file: File, filename: &str) -> Result<Box<dyn Iterator<Item = u8>>> {
    let (_basename, compression_format) = compression_format_by_extension(filename);
    let bytes: Box<dyn Iterator<Item = u8>> = match compression_format {
        "" => Box::new(BufReader::new(file).bytes().map(panic_on_error)),
        ZSTD => Box::new(zstd::stream::read::Decoder::new(file)?.bytes().map(panic_on_error)),
        GZIP => Box::new(flate2::read::GzDecoder::new(file).bytes().map(panic_on_error)),
        BZIP2 => Box::new(bzip2::read::BzDecoder::new(file).bytes().map(panic_on_error)),
        XZ => Box::new(xz2::read::XzDecoder::new(file).bytes().map(panic_on_error)),
        LZ4 => Box::new(lz4::Decoder::new(file)?.bytes().map(panic_on_error)),
        _ => crate::output::unreachable(),
    };
    Ok(bytes)
}

/// Unwraps a result, exiting with an error message on failure.
///
/// Read errors in the middle of a file are not recoverable for us.
pub fn panic_on_error<T>(result: Result<T>) -> T {
    result.unwrap_or_else(|error| die!("{}", error))
}
