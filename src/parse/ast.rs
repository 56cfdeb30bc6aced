//! The program tree built for a successfully parsed source.
//!
//! The tree is append-only and mirrors source order exactly: instruction
//! order in the tree equals source order, and operand order within an
//! instruction equals signature order. Operand text is stored raw; every
//! text node gets its `&`, `<` and `>` replaced with entity references at
//! emission time, since names may legally contain `&` and constant values
//! are not validated.

use std::fmt;

use super::grammar::{Frame, Opcode, ValueType, LANGUAGE};

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Program {
    pub language: &'static str,
    pub instructions: Vec<Instruction>,
}

impl Program {
    pub fn new() -> Program {
        Program {
            language: LANGUAGE,
            instructions: Vec::new(),
        }
    }
}

impl Default for Program {
    fn default() -> Program {
        Program::new()
    }
}

impl Program {

    /// Render the tree as an XML document.
    pub fn to_xml(&self) -> String {
        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str(&format!("<program language=\"{}\">\n", self.language));

        for instruction in &self.instructions {
            xml.push_str(&format!(
                "    <instruction order=\"{}\" opcode=\"{}\">\n",
                instruction.order, instruction.opcode
            ));
            for (position, operand) in instruction.operands.iter().enumerate() {
                xml.push_str(&format!(
                    "        <arg{n} type=\"{t}\">{v}</arg{n}>\n",
                    n = position + 1,
                    t = operand.type_attr(),
                    v = operand.text()
                ));
            }
            xml.push_str("    </instruction>\n");
        }

        xml.push_str("</program>\n");
        xml
    }
}

/// One instruction node. `order` is 1-based and gapless, assigned when the
/// opcode token was accepted.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Instruction {
    pub order: usize,
    pub opcode: Opcode,
    pub operands: Vec<Operand>,
}

impl Instruction {
    pub fn new(order: usize, opcode: Opcode) -> Instruction {
        Instruction {
            order,
            opcode,
            operands: Vec::new(),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.opcode)?;
        for operand in &self.operands {
            write!(f, " {}", operand)?;
        }
        Ok(())
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Operand {
    Variable { frame: Frame, name: String },
    Label(String),
    Type(ValueType),
    Constant { kind: ValueType, value: String },
}

impl Operand {
    /// Value of the `type` attribute on the emitted `arg` element.
    pub fn type_attr(&self) -> &'static str {
        match self {
            Operand::Variable { .. } => "var",
            Operand::Label(_) => "label",
            Operand::Type(_) => "type",
            Operand::Constant { kind, .. } => kind.as_str(),
        }
    }

    /// Text content of the emitted `arg` element, with entity references
    /// in place. Escaping applies to every operand kind: names may contain
    /// `&`, and int/float values pass through unvalidated.
    pub fn text(&self) -> String {
        let raw = match self {
            Operand::Variable { frame, name } => format!("{}@{}", frame, name),
            Operand::Label(name) => name.clone(),
            Operand::Type(keyword) => keyword.as_str().to_owned(),
            Operand::Constant { value, .. } => value.clone(),
        };
        escape_text(&raw)
    }
}

/// Replace `&`, `<` and `>` with entity references. The ampersand goes
/// first so the other replacements are not re-escaped.
fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Operand::Variable { frame, name } => write!(f, "{}@{}", frame, name),
            Operand::Label(name) => write!(f, "{}", name),
            Operand::Type(keyword) => write!(f, "{}", keyword),
            Operand::Constant { kind, value } => write!(f, "{}@{}", kind, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_xml() {
        let mut program = Program::new();

        let mut mov = Instruction::new(1, Opcode::MOVE);
        mov.operands.push(Operand::Variable {
            frame: Frame::GF,
            name: "x".to_owned(),
        });
        mov.operands.push(Operand::Constant {
            kind: ValueType::Int,
            value: "42".to_owned(),
        });
        program.instructions.push(mov);

        let mut lab = Instruction::new(2, Opcode::LABEL);
        lab.operands.push(Operand::Label("loop".to_owned()));
        program.instructions.push(lab);

        let expected = "\
<?xml version=\"1.0\" encoding=\"UTF-8\"?>
<program language=\"IPPcode18\">
    <instruction order=\"1\" opcode=\"MOVE\">
        <arg1 type=\"var\">GF@x</arg1>
        <arg2 type=\"int\">42</arg2>
    </instruction>
    <instruction order=\"2\" opcode=\"LABEL\">
        <arg1 type=\"label\">loop</arg1>
    </instruction>
</program>
";
        assert_eq!(program.to_xml(), expected);
    }

    #[test]
    fn test_empty_program_xml() {
        let expected = "\
<?xml version=\"1.0\" encoding=\"UTF-8\"?>
<program language=\"IPPcode18\">
</program>
";
        assert_eq!(Program::new().to_xml(), expected);
    }

    #[test]
    fn test_operand_text() {
        let var = Operand::Variable {
            frame: Frame::TF,
            name: "counter".to_owned(),
        };
        assert_eq!(var.type_attr(), "var");
        assert_eq!(var.text(), "TF@counter");

        let ty = Operand::Type(ValueType::Bool);
        assert_eq!(ty.type_attr(), "type");
        assert_eq!(ty.text(), "bool");

        let s = Operand::Constant {
            kind: ValueType::String,
            value: "a<b".to_owned(),
        };
        assert_eq!(s.type_attr(), "string");
        assert_eq!(s.text(), "a&lt;b");
    }

    #[test]
    fn test_text_escapes_every_kind() {
        // Names may legally contain an ampersand; values are unvalidated.
        let var = Operand::Variable {
            frame: Frame::GF,
            name: "a&b".to_owned(),
        };
        assert_eq!(var.text(), "GF@a&amp;b");

        let label = Operand::Label("x&y".to_owned());
        assert_eq!(label.text(), "x&amp;y");

        let num = Operand::Constant {
            kind: ValueType::Int,
            value: "a<b".to_owned(),
        };
        assert_eq!(num.text(), "a&lt;b");

        let s = Operand::Constant {
            kind: ValueType::String,
            value: "<&>".to_owned(),
        };
        // The ampersand replacement must not touch the entities produced
        // for the angle brackets.
        assert_eq!(s.text(), "&lt;&amp;&gt;");
    }

    #[test]
    fn test_default_is_empty_program() {
        assert_eq!(Program::default(), Program::new());
    }
}
