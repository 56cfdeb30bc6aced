//! This scanner tokenizes IPPcode18.
//!
//! It is a finite-state classifier over a forward-only character stream.
//! Over-read lookahead (a separator or line terminator that belongs to the
//! next token) is handed back through a small pushback buffer rather than
//! by repositioning the stream.

use std::str::Chars;

use super::error::ParseError;
use super::grammar::{Frame, Opcode, ValueType, HEADER};

/// A token is a pair of its kind and the literal text it was built from.
/// The text survives classification because the parser reads names and
/// constant values out of it regardless of the kind.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, text: &str) -> Token {
        Token {
            kind,
            text: text.to_owned(),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum TokenKind {
    Header,
    Opcode(Opcode),
    Type(ValueType),
    Frame(Frame),
    Separator,
    Newline,
    Eof,
    Unknown,
}

/// Result of one scanner call: the token plus how many comment spans were
/// skipped while producing it. The parser owns the running total.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Scan {
    pub token: Token,
    pub comments: usize,
}

impl Scan {
    fn new(kind: TokenKind, text: &str, comments: usize) -> Scan {
        Scan {
            token: Token::new(kind, text),
            comments,
        }
    }
}

pub struct Scanner<'a> {
    chars: Chars<'a>,
    // Characters given back after over-reading, read before the stream.
    pending: Vec<char>,
    // The last two characters consumed, for the separator adjacency rule.
    last: Option<char>,
    prior: Option<char>,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str) -> Scanner<'a> {
        Scanner {
            chars: input.chars(),
            pending: Vec::new(),
            last: None,
            prior: None,
        }
    }

    fn read_char(&mut self) -> Option<char> {
        let c = self.pending.pop().or_else(|| self.chars.next());
        if let Some(c) = c {
            self.prior = self.last;
            self.last = Some(c);
        }
        c
    }

    /// Hand back an over-read character; the next read returns it again.
    fn unread_char(&mut self, c: char) {
        self.pending.push(c);
        self.last = self.prior;
        self.prior = None;
    }

    /// Produce the next token. With `getting_value` set the `@` character
    /// loses its separator role, so constant values may contain it; the
    /// parser sets it exactly once, when reading a constant's literal text.
    pub fn next_token(&mut self, getting_value: bool) -> Result<Scan, ParseError> {
        let mut comments = 0;

        loop {
            let c = match self.read_char() {
                Some(c) => c,
                None => return Ok(Scan::new(TokenKind::Eof, "", comments)),
            };

            match c {
                '.' => return self.header_line(comments),
                '\n' => return Ok(Scan::new(TokenKind::Newline, "", comments)),
                '#' => {
                    comments += 1;
                    self.skip_comment();
                    return Ok(Scan::new(TokenKind::Newline, "", comments));
                }
                '@' if !getting_value => {
                    // Look back one position: whitespace directly before a
                    // separator is a lexical error.
                    if self.prior.map_or(false, |p| p.is_whitespace()) {
                        return Err(ParseError::SeparatorAfterSpace);
                    }
                    return Ok(Scan::new(TokenKind::Separator, "@", comments));
                }
                c if c.is_whitespace() => {
                    // A maximal whitespace run; a newline anywhere in it
                    // still separates instructions.
                    while let Some(c) = self.read_char() {
                        if c == '\n' {
                            return Ok(Scan::new(TokenKind::Newline, "", comments));
                        }
                        if !c.is_whitespace() {
                            self.unread_char(c);
                            break;
                        }
                    }
                }
                c => return self.word(c, getting_value, comments),
            }
        }
    }

    /// Accumulate a maximal run of non-whitespace characters and classify
    /// it: the opcode mnemonics case-insensitively, then the type and frame
    /// keywords case-sensitively, falling back to `Unknown`.
    fn word(&mut self, first: char, getting_value: bool, mut comments: usize) -> Result<Scan, ParseError> {
        let mut text = String::new();
        text.push(first);

        while let Some(c) = self.read_char() {
            if c.is_whitespace() {
                if c == '\n' {
                    self.unread_char(c);
                }
                break;
            }
            match c {
                '@' if !getting_value => {
                    // Belongs to the next token.
                    self.unread_char(c);
                    break;
                }
                '#' => {
                    // A trailing comment ends the token where the '#' began.
                    comments += 1;
                    self.skip_to_eol();
                    break;
                }
                '\\' => {
                    // Exactly three decimal digits must follow. The escape
                    // is retained verbatim; decoding it is a downstream
                    // concern.
                    text.push(c);
                    for _ in 0..3 {
                        match self.read_char() {
                            Some(d) if d.is_ascii_digit() => text.push(d),
                            _ => return Err(ParseError::InvalidEscape),
                        }
                    }
                }
                _ => text.push(c),
            }
        }

        Ok(Scan {
            token: classify(text),
            comments,
        })
    }

    /// Entered after a leading `.`: the rest of the line must be the header
    /// literal, modulo surrounding whitespace, letter case and a trailing
    /// comment.
    fn header_line(&mut self, mut comments: usize) -> Result<Scan, ParseError> {
        let mut text = String::new();
        let mut ignore = false;

        while let Some(c) = self.read_char() {
            if c == '\n' {
                self.unread_char(c);
                break;
            }
            if c == '#' {
                comments += 1;
                ignore = true;
            }
            if !ignore {
                text.push(c);
            }
        }

        if text.trim().to_lowercase() == HEADER {
            Ok(Scan::new(TokenKind::Header, "", comments))
        } else {
            Err(ParseError::MissingHeader)
        }
    }

    /// Whole-line comment: discard up to and including the line terminator,
    /// tolerating end of stream without one.
    fn skip_comment(&mut self) {
        while let Some(c) = self.read_char() {
            if c == '\n' {
                break;
            }
        }
    }

    /// Discard to the line terminator but keep it for the next call.
    fn skip_to_eol(&mut self) {
        while let Some(c) = self.read_char() {
            if c == '\n' {
                self.unread_char(c);
                break;
            }
        }
    }
}

fn classify(text: String) -> Token {
    if let Ok(op) = text.parse::<Opcode>() {
        return Token {
            kind: TokenKind::Opcode(op),
            text,
        };
    }

    let kind = match text.as_str() {
        "int" => TokenKind::Type(ValueType::Int),
        "string" => TokenKind::Type(ValueType::String),
        "bool" => TokenKind::Type(ValueType::Bool),
        "float" => TokenKind::Type(ValueType::Float),
        "GF" => TokenKind::Frame(Frame::GF),
        "LF" => TokenKind::Frame(Frame::LF),
        "TF" => TokenKind::Frame(Frame::TF),
        _ => TokenKind::Unknown,
    };

    Token { kind, text }
}
