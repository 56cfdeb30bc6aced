//! The Parser module drives the Scanner token by token and validates each
//! instruction against its operand signature, appending nodes to the
//! program tree as each construct is recognized.

use regex::Regex;

use super::ast::{Instruction, Operand, Program};
use super::error::ParseError;
use super::grammar::{Frame, OperandKind, ValueType};
use super::scanner::{Scanner, Token, TokenKind};

/// Characters permitted in variable and label names: letters (including
/// the accented Latin range), digits and `- * $ % _ &`. A name must not
/// start with a digit; that is checked separately.
const NAME_PATTERN: &str = r"^[A-Za-zÁ-Žá-ž0-9\-*$%_&]+$";

pub struct Parser<'a> {
    scanner: Scanner<'a>,
    // A newline read where a name or value was expected, handed back to
    // the instruction loop.
    pushed_back: Option<Token>,
    order: usize,
    comments: usize,
    name_re: Regex,
}

impl<'a> Parser<'a> {
    pub fn new(scanner: Scanner<'a>) -> Parser<'a> {
        Parser {
            scanner,
            pushed_back: None,
            order: 0,
            comments: 0,
            name_re: Regex::new(NAME_PATTERN).unwrap(),
        }
    }

    /// Number of instructions accepted. Meaningful after `run` succeeds.
    pub fn instruction_count(&self) -> usize {
        self.order
    }

    /// Number of comment spans the scanner skipped.
    pub fn comment_count(&self) -> usize {
        self.comments
    }

    /// Consume the whole stream and build the program tree. The first
    /// error encountered anywhere aborts the run; no partial tree is
    /// returned.
    pub fn run(&mut self) -> Result<Program, ParseError> {
        let first = self.next(false)?;
        if first.kind != TokenKind::Header {
            return Err(ParseError::MissingHeader);
        }

        let mut program = Program::new();
        loop {
            // The header and every instruction must end their line before
            // the next instruction begins.
            let mut token = self.next(false)?;
            match token.kind {
                TokenKind::Newline => {}
                TokenKind::Eof => break,
                _ => return Err(ParseError::InstructionPerLine),
            }

            // Blank lines are permitted between instructions.
            token = self.next(false)?;
            while token.kind == TokenKind::Newline {
                token = self.next(false)?;
            }
            if token.kind == TokenKind::Eof {
                break;
            }

            let opcode = match token.kind {
                TokenKind::Opcode(op) => op,
                _ => return Err(ParseError::ExpectedInstruction),
            };

            // Order is assigned before the operands are parsed.
            self.order += 1;
            let mut instruction = Instruction::new(self.order, opcode);

            for kind in opcode.signature() {
                let operand = match kind {
                    OperandKind::Variable => self.variable()?,
                    OperandKind::Symbol => self.symbol()?,
                    OperandKind::Label => self.label()?,
                    OperandKind::Type => self.type_arg()?,
                };
                instruction.operands.push(operand);
            }

            program.instructions.push(instruction);
        }

        Ok(program)
    }

    fn next(&mut self, getting_value: bool) -> Result<Token, ParseError> {
        if let Some(token) = self.pushed_back.take() {
            return Ok(token);
        }
        let scan = self.scanner.next_token(getting_value)?;
        self.comments += scan.comments;
        Ok(scan.token)
    }

    fn variable(&mut self) -> Result<Operand, ParseError> {
        let frame = self.frame()?;
        self.separator()?;
        let name = self.name()?;
        Ok(Operand::Variable { frame, name })
    }

    fn label(&mut self) -> Result<Operand, ParseError> {
        let name = self.name()?;
        Ok(Operand::Label(name))
    }

    fn type_arg(&mut self) -> Result<Operand, ParseError> {
        match self.next(false)?.kind {
            TokenKind::Type(keyword) => Ok(Operand::Type(keyword)),
            _ => Err(ParseError::ExpectedType),
        }
    }

    /// A symbol is either a variable reference or a literal constant.
    fn symbol(&mut self) -> Result<Operand, ParseError> {
        let token = self.next(false)?;
        match token.kind {
            TokenKind::Frame(frame) => {
                self.separator()?;
                let name = self.name()?;
                Ok(Operand::Variable { frame, name })
            }
            TokenKind::Type(kind) => {
                self.separator()?;
                let value = self.value()?;
                if kind == ValueType::Bool && value != "true" && value != "false" {
                    return Err(ParseError::InvalidBool);
                }
                // The value is stored raw; entity references are produced
                // uniformly when the tree is serialized.
                Ok(Operand::Constant { kind, value })
            }
            _ => Err(ParseError::ExpectedSymbol),
        }
    }

    fn frame(&mut self) -> Result<Frame, ParseError> {
        match self.next(false)?.kind {
            TokenKind::Frame(frame) => Ok(frame),
            _ => Err(ParseError::ExpectedFrame),
        }
    }

    fn separator(&mut self) -> Result<(), ParseError> {
        match self.next(false)?.kind {
            TokenKind::Separator => Ok(()),
            _ => Err(ParseError::ExpectedSeparator),
        }
    }

    /// Read a variable or label name. A newline in name position yields an
    /// empty name and is handed back for the instruction loop; an empty
    /// name passes the shape checks below.
    fn name(&mut self) -> Result<String, ParseError> {
        let token = self.next(false)?;
        let text = if token.kind == TokenKind::Newline {
            self.pushed_back = Some(token);
            String::new()
        } else {
            token.text
        };

        if !text.is_empty() && !self.name_re.is_match(&text) {
            return Err(ParseError::IllegalName);
        }
        if text.chars().next().map_or(false, |c| c.is_ascii_digit()) {
            return Err(ParseError::NameStartsWithDigit);
        }
        Ok(text)
    }

    /// Read a constant's literal text with the separator special-casing
    /// off, so the value may itself contain `@`.
    fn value(&mut self) -> Result<String, ParseError> {
        let token = self.next(true)?;
        if token.kind == TokenKind::Newline {
            self.pushed_back = Some(token);
            return Ok(String::new());
        }
        Ok(token.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::grammar::Opcode;

    fn parse(source: &str) -> Result<Program, ParseError> {
        Parser::new(Scanner::new(source)).run()
    }

    #[test]
    fn test_single_move() {
        let program = parse(".IPPcode18\nMOVE GF@x int@10\n").unwrap();

        assert_eq!(program.language, "IPPcode18");
        assert_eq!(program.instructions.len(), 1);

        let instruction = &program.instructions[0];
        assert_eq!(instruction.order, 1);
        assert_eq!(instruction.opcode, Opcode::MOVE);
        assert_eq!(
            instruction.operands,
            vec![
                Operand::Variable {
                    frame: Frame::GF,
                    name: "x".to_owned(),
                },
                Operand::Constant {
                    kind: ValueType::Int,
                    value: "10".to_owned(),
                },
            ]
        );
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(
            parse("MOVE GF@x int@10\n"),
            Err(ParseError::MissingHeader)
        );
    }

    #[test]
    fn test_empty_program() {
        let program = parse(".IPPcode18\n").unwrap();
        assert!(program.instructions.is_empty());

        let program = parse(".IPPcode18").unwrap();
        assert!(program.instructions.is_empty());
    }

    #[test]
    fn test_order_is_gapless() {
        let source = "\
.IPPcode18
CREATEFRAME

LABEL loop
ADD GF@sum GF@sum int@1

JUMPIFEQ loop GF@sum int@10
BREAK
";
        let program = parse(source).unwrap();

        assert_eq!(program.instructions.len(), 5);
        for (index, instruction) in program.instructions.iter().enumerate() {
            assert_eq!(instruction.order, index + 1);
        }
        assert_eq!(program.instructions[2].opcode, Opcode::ADD);
    }

    #[test]
    fn test_opcode_any_case() {
        let program = parse(".IPPcode18\nmOvE GF@x int@10\n").unwrap();
        assert_eq!(program.instructions[0].opcode, Opcode::MOVE);
        // The rendered mnemonic is always uppercase.
        assert_eq!(program.instructions[0].opcode.to_string(), "MOVE");
    }

    #[test]
    fn test_variable_rendering() {
        let program = parse(".IPPcode18\nDEFVAR TF@counter\n").unwrap();
        assert_eq!(program.instructions[0].operands[0].text(), "TF@counter");
        assert_eq!(program.instructions[0].operands[0].type_attr(), "var");
    }

    #[test]
    fn test_lowercase_frame_rejected() {
        assert_eq!(
            parse(".IPPcode18\nDEFVAR gf@x\n"),
            Err(ParseError::ExpectedFrame)
        );
    }

    #[test]
    fn test_string_entities() {
        let program = parse(".IPPcode18\nWRITE string@a<b&c\n").unwrap();
        // The tree stores the value raw; the emitted text carries the
        // entity references.
        assert_eq!(
            program.instructions[0].operands[0],
            Operand::Constant {
                kind: ValueType::String,
                value: "a<b&c".to_owned(),
            }
        );
        assert_eq!(
            program.instructions[0].operands[0].text(),
            "a&lt;b&amp;c"
        );

        let program = parse(".IPPcode18\nWRITE string@<&>\n").unwrap();
        assert_eq!(
            program.instructions[0].operands[0].text(),
            "&lt;&amp;&gt;"
        );
    }

    #[test]
    fn test_ampersand_names_in_xml() {
        // '&' is a legal name character, so the serialized document must
        // escape it to stay well-formed.
        let program = parse(".IPPcode18\nDEFVAR GF@a&b\nLABEL x&y\n").unwrap();

        assert_eq!(program.instructions[0].operands[0].text(), "GF@a&amp;b");
        assert_eq!(program.instructions[1].operands[0].text(), "x&amp;y");

        let xml = program.to_xml();
        assert!(xml.contains("<arg1 type=\"var\">GF@a&amp;b</arg1>"));
        assert!(xml.contains("<arg1 type=\"label\">x&amp;y</arg1>"));
        assert!(!xml.contains("a&b"));
        assert!(!xml.contains("x&y"));
    }

    #[test]
    fn test_string_keeps_escape_and_at() {
        let program = parse(".IPPcode18\nWRITE string@a\\032b@c\n").unwrap();
        assert_eq!(
            program.instructions[0].operands[0].text(),
            "a\\032b@c"
        );
    }

    #[test]
    fn test_bool_values() {
        assert!(parse(".IPPcode18\nPUSHS bool@true\n").is_ok());
        assert!(parse(".IPPcode18\nPUSHS bool@false\n").is_ok());

        for bad in &["bool@1", "bool@True", "bool@yes", "bool@"] {
            assert_eq!(
                parse(&format!(".IPPcode18\nPUSHS {}\n", bad)),
                Err(ParseError::InvalidBool),
                "accepted {}",
                bad
            );
        }
    }

    #[test]
    fn test_name_boundaries() {
        // Every character class member, not starting with a digit. The
        // name is kept unchanged in the tree; only the emitted text holds
        // the entity reference for the ampersand.
        let program = parse(".IPPcode18\nDEFVAR GF@a-b*c$d%e_f&g9\n").unwrap();
        assert_eq!(
            program.instructions[0].operands[0],
            Operand::Variable {
                frame: Frame::GF,
                name: "a-b*c$d%e_f&g9".to_owned(),
            }
        );
        assert_eq!(
            program.instructions[0].operands[0].text(),
            "GF@a-b*c$d%e_f&amp;g9"
        );

        assert_eq!(
            parse(".IPPcode18\nDEFVAR TF@1x\n"),
            Err(ParseError::NameStartsWithDigit)
        );
        assert_eq!(
            parse(".IPPcode18\nDEFVAR GF@bad!name\n"),
            Err(ParseError::IllegalName)
        );
        assert_eq!(
            parse(".IPPcode18\nLABEL sp{ce\n"),
            Err(ParseError::IllegalName)
        );
    }

    #[test]
    fn test_label_may_be_empty() {
        // A newline in name position yields an empty label; the original
        // front end accepts it, and that behavior is preserved.
        let program = parse(".IPPcode18\nLABEL\n").unwrap();
        assert_eq!(
            program.instructions[0].operands,
            vec![Operand::Label(String::new())]
        );
    }

    #[test]
    fn test_arity_too_few() {
        assert_eq!(
            parse(".IPPcode18\nMOVE GF@x\n"),
            Err(ParseError::ExpectedSymbol)
        );
        assert_eq!(
            parse(".IPPcode18\nREAD GF@x\n"),
            Err(ParseError::ExpectedType)
        );
        assert_eq!(
            parse(".IPPcode18\nADD GF@x int@1\n"),
            Err(ParseError::ExpectedSymbol)
        );
    }

    #[test]
    fn test_arity_too_many() {
        assert_eq!(
            parse(".IPPcode18\nBREAK GF@x\n"),
            Err(ParseError::InstructionPerLine)
        );
        assert_eq!(
            parse(".IPPcode18\nDEFVAR GF@x GF@y\n"),
            Err(ParseError::InstructionPerLine)
        );
    }

    #[test]
    fn test_two_instructions_one_line() {
        assert_eq!(
            parse(".IPPcode18\nBREAK BREAK\n"),
            Err(ParseError::InstructionPerLine)
        );
    }

    #[test]
    fn test_expected_instruction() {
        assert_eq!(
            parse(".IPPcode18\nnonsense\n"),
            Err(ParseError::ExpectedInstruction)
        );
    }

    #[test]
    fn test_read_takes_type_keyword() {
        let program = parse(".IPPcode18\nREAD GF@x int\n").unwrap();
        assert_eq!(
            program.instructions[0].operands[1],
            Operand::Type(ValueType::Int)
        );
    }

    #[test]
    fn test_counters() {
        let source = "\
.IPPcode18 # header comment
# a full-line comment
DEFVAR GF@x
MOVE GF@x int@3 # trailing comment
";
        let mut parser = Parser::new(Scanner::new(source));
        parser.run().unwrap();

        assert_eq!(parser.instruction_count(), 2);
        assert_eq!(parser.comment_count(), 3);
    }

    #[test]
    fn test_separator_needs_adjacency() {
        assert_eq!(
            parse(".IPPcode18\nDEFVAR GF @x\n"),
            Err(ParseError::SeparatorAfterSpace)
        );
    }

    #[test]
    fn test_trailing_blank_lines() {
        let program = parse(".IPPcode18\nBREAK\n\n\n").unwrap();
        assert_eq!(program.instructions.len(), 1);
    }
}
