use std::fmt::Display;

use crate::{
    ast::{expressions::BinaryOp, expressions::UnaryOp, statements::IncDecOp},
    labels::location::Location,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Neg,
    Not,
    And,
    Or,
    Beq,
    Bne,
    Blt,
    Bgt,
    Ble,
    Bge,
    Asn,
    AddInPlace,
    Add1,
    Sub1,
    Goto,
    Label,
    Ret,
    Call,
    /// `dest = src1[src2]`
    Load,
    /// `dest[src2] = src1`
    Store,
}

impl Opcode {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::Mod => "MOD",
            Opcode::Neg => "NEG",
            Opcode::Not => "NOT",
            Opcode::And => "AND",
            Opcode::Or => "OR",
            Opcode::Beq => "BEQ",
            Opcode::Bne => "BNE",
            Opcode::Blt => "BLT",
            Opcode::Bgt => "BGT",
            Opcode::Ble => "BLE",
            Opcode::Bge => "BGE",
            Opcode::Asn => "ASN",
            Opcode::AddInPlace => "ADDASN",
            Opcode::Add1 => "ADD1",
            Opcode::Sub1 => "SUB1",
            Opcode::Goto => "GOTO",
            Opcode::Label => "LABEL",
            Opcode::Ret => "RET",
            Opcode::Call => "CALL",
            Opcode::Load => "LOAD",
            Opcode::Store => "STORE",
        }
    }
}

impl From<BinaryOp> for Opcode {
    fn from(operator: BinaryOp) -> Self {
        match operator {
            BinaryOp::Add => Opcode::Add,
            BinaryOp::Sub => Opcode::Sub,
            BinaryOp::Mul => Opcode::Mul,
            BinaryOp::Div => Opcode::Div,
            BinaryOp::Mod => Opcode::Mod,
            BinaryOp::Equals => Opcode::Beq,
            BinaryOp::NotEquals => Opcode::Bne,
            BinaryOp::Less => Opcode::Blt,
            BinaryOp::Greater => Opcode::Bgt,
            BinaryOp::LessEquals => Opcode::Ble,
            BinaryOp::GreaterEquals => Opcode::Bge,
            BinaryOp::And => Opcode::And,
            BinaryOp::Or => Opcode::Or,
        }
    }
}

impl From<UnaryOp> for Opcode {
    fn from(operator: UnaryOp) -> Self {
        match operator {
            UnaryOp::Negate => Opcode::Neg,
            UnaryOp::Not => Opcode::Not,
        }
    }
}

impl From<IncDecOp> for Opcode {
    fn from(operator: IncDecOp) -> Self {
        match operator {
            IncDecOp::Increment => Opcode::Add1,
            IncDecOp::Decrement => Opcode::Sub1,
        }
    }
}

impl Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}

/// One three-address instruction: `dest = opcode(src1, src2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    pub opcode: Opcode,
    pub src1: Option<Location>,
    pub src2: Option<Location>,
    pub dest: Location,
}

impl Operation {
    pub fn new(opcode: Opcode, src1: Option<Location>, src2: Option<Location>, dest: Location) -> Self {
        Operation {
            opcode,
            src1,
            src2,
            dest,
        }
    }

    /// An instruction that only names a target (`GOTO`, `LABEL`, `RET`, `CALL`).
    pub fn jump(opcode: Opcode, dest: Location) -> Self {
        Operation::new(opcode, None, None, dest)
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.opcode, self.dest)?;
        for source in [self.src1, self.src2].into_iter().flatten() {
            write!(f, ", {}", source)?;
        }
        Ok(())
    }
}
