//! Keyword tables for IPPcode18: the 34 opcode mnemonics, the frame and
//! type keywords, and the per-opcode operand signatures the parser
//! dispatches on. None of these are mutated at runtime.

use std::fmt;
use std::str::FromStr;

/// The mandatory header line, compared after trimming and lowercasing.
pub const HEADER: &str = "ippcode18";

/// Dialect identifier carried on the root of the program tree.
pub const LANGUAGE: &str = "IPPcode18";

/// Variable storage scopes. Frame keywords are case-sensitive in the
/// source and always rendered uppercase in the output.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Frame {
    GF,
    LF,
    TF,
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Constant/type keywords. Case-sensitive, unlike the opcodes.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ValueType {
    Int,
    String,
    Bool,
    Float,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Int => "int",
            ValueType::String => "string",
            ValueType::Bool => "bool",
            ValueType::Float => "float",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What kind of operand an instruction slot accepts.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum OperandKind {
    Variable,
    Symbol,
    Label,
    Type,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Opcode {
    MOVE,
    CREATEFRAME,
    PUSHFRAME,
    POPFRAME,
    DEFVAR,
    CALL,
    RETURN,
    PUSHS,
    POPS,
    ADD,
    SUB,
    MUL,
    IDIV,
    LT,
    GT,
    EQ,
    AND,
    OR,
    NOT,
    INT2CHAR,
    STRI2INT,
    READ,
    WRITE,
    CONCAT,
    STRLEN,
    GETCHAR,
    SETCHAR,
    TYPE,
    LABEL,
    JUMP,
    JUMPIFEQ,
    JUMPIFNEQ,
    DPRINT,
    BREAK,
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl FromStr for Opcode {
    type Err = ();

    /// Mnemonics match case-insensitively.
    fn from_str(s: &str) -> Result<Self, ()> {
        use Opcode::*;
        Ok(match s.to_ascii_lowercase().as_str() {
            "move" => MOVE,
            "createframe" => CREATEFRAME,
            "pushframe" => PUSHFRAME,
            "popframe" => POPFRAME,
            "defvar" => DEFVAR,
            "call" => CALL,
            "return" => RETURN,
            "pushs" => PUSHS,
            "pops" => POPS,
            "add" => ADD,
            "sub" => SUB,
            "mul" => MUL,
            "idiv" => IDIV,
            "lt" => LT,
            "gt" => GT,
            "eq" => EQ,
            "and" => AND,
            "or" => OR,
            "not" => NOT,
            "int2char" => INT2CHAR,
            "stri2int" => STRI2INT,
            "read" => READ,
            "write" => WRITE,
            "concat" => CONCAT,
            "strlen" => STRLEN,
            "getchar" => GETCHAR,
            "setchar" => SETCHAR,
            "type" => TYPE,
            "label" => LABEL,
            "jump" => JUMP,
            "jumpifeq" => JUMPIFEQ,
            "jumpifneq" => JUMPIFNEQ,
            "dprint" => DPRINT,
            "break" => BREAK,
            _ => return Err(()),
        })
    }
}

impl Opcode {
    /// The ordered operand-kind signature for this opcode. This is the
    /// single source of truth the parser consults.
    pub fn signature(&self) -> &'static [OperandKind] {
        use OperandKind::*;
        match self {
            Opcode::CREATEFRAME
            | Opcode::PUSHFRAME
            | Opcode::POPFRAME
            | Opcode::RETURN
            | Opcode::BREAK => &[],

            Opcode::DEFVAR | Opcode::POPS => &[Variable],

            Opcode::CALL | Opcode::LABEL | Opcode::JUMP => &[Label],

            Opcode::PUSHS | Opcode::WRITE | Opcode::DPRINT => &[Symbol],

            Opcode::MOVE
            | Opcode::NOT
            | Opcode::INT2CHAR
            | Opcode::STRLEN
            | Opcode::TYPE => &[Variable, Symbol],

            Opcode::READ => &[Variable, Type],

            Opcode::ADD
            | Opcode::SUB
            | Opcode::MUL
            | Opcode::IDIV
            | Opcode::LT
            | Opcode::GT
            | Opcode::EQ
            | Opcode::AND
            | Opcode::OR
            | Opcode::STRI2INT
            | Opcode::CONCAT
            | Opcode::GETCHAR
            | Opcode::SETCHAR => &[Variable, Symbol, Symbol],

            Opcode::JUMPIFEQ | Opcode::JUMPIFNEQ => &[Label, Symbol, Symbol],
        }
    }
}
