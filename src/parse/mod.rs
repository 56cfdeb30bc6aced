//! The Parse module is in charge of taking IPPcode18
//! source text and producing an ordered program tree
//! ready for XML serialization.
//!
//! It does this by implementing a character-level
//! finite-state scanner and a recursive descent parser
//! that checks every instruction against a fixed
//! operand signature table.

pub mod ast;
pub mod error;
pub mod grammar;
pub mod parser;
pub mod scanner;
