//! Fatal conditions detected during scanning and parsing.
//!
//! The grammar has no resynchronization points, so every anomaly aborts
//! the whole run. All variants share one exit status class; the CLI keeps
//! its own codes for bad flags and file I/O.

use thiserror::Error;

/// Exit status shared by every lexical or syntactic failure.
pub const ERROR_CODE: i32 = 21;

#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum ParseError {
    #[error("missing .IPPcode18 header on the first line")]
    MissingHeader,
    #[error("separator not allowed after space")]
    SeparatorAfterSpace,
    #[error("invalid escape sequence")]
    InvalidEscape,
    #[error("illegal characters in name")]
    IllegalName,
    #[error("name cannot start with a digit")]
    NameStartsWithDigit,
    #[error("every instruction must be on its own line")]
    InstructionPerLine,
    #[error("expected instruction")]
    ExpectedInstruction,
    #[error("expected frame")]
    ExpectedFrame,
    #[error("expected separator")]
    ExpectedSeparator,
    #[error("expected type")]
    ExpectedType,
    #[error("expected symbol")]
    ExpectedSymbol,
    #[error("invalid bool value")]
    InvalidBool,
}

impl ParseError {
    pub fn exit_code(&self) -> i32 {
        ERROR_CODE
    }
}
