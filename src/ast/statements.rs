use std::fmt::Display;

use crate::Position;

use super::{
    ast::{Attr, Block},
    expressions::{BinaryOp, Expr},
};

/// Expression statements, assignments and `++`/`--`.
#[derive(Debug, Clone)]
pub struct SimpleStmt {
    pub kind: SimpleKind,
    pub position: Position,
    pub address: Attr,
}

impl SimpleStmt {
    pub fn new(kind: SimpleKind, position: Position) -> Self {
        SimpleStmt {
            kind,
            position,
            address: Attr::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum SimpleKind {
    Expr(Expr),
    Assign(AssignStmt),
    IncDec(IncDecStmt),
}

#[derive(Debug, Clone)]
pub struct AssignStmt {
    pub target: Expr,
    pub operator: AssignOp,
    pub value: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
}

impl AssignOp {
    /// The arithmetic a compound assignment performs.
    pub fn binary_operator(&self) -> Option<BinaryOp> {
        match self {
            AssignOp::Assign => None,
            AssignOp::AddAssign => Some(BinaryOp::Add),
            AssignOp::SubAssign => Some(BinaryOp::Sub),
            AssignOp::MulAssign => Some(BinaryOp::Mul),
            AssignOp::DivAssign => Some(BinaryOp::Div),
            AssignOp::ModAssign => Some(BinaryOp::Mod),
        }
    }
}

impl Display for AssignOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            AssignOp::Assign => "=",
            AssignOp::AddAssign => "+=",
            AssignOp::SubAssign => "-=",
            AssignOp::MulAssign => "*=",
            AssignOp::DivAssign => "/=",
            AssignOp::ModAssign => "%=",
        };
        write!(f, "{}", text)
    }
}

#[derive(Debug, Clone)]
pub struct IncDecStmt {
    pub target: Expr,
    pub operator: IncDecOp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncDecOp {
    Increment,
    Decrement,
}

impl Display for IncDecOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IncDecOp::Increment => write!(f, "++"),
            IncDecOp::Decrement => write!(f, "--"),
        }
    }
}

/// The controlling expression of an `if` or `for`.
///
/// `if_true`/`if_false` hold the branch entry locations once labeled.
#[derive(Debug, Clone)]
pub struct Condition {
    pub expr: Expr,
    pub address: Attr,
    pub if_true: Attr,
    pub if_false: Attr,
}

impl Condition {
    pub fn new(expr: Expr) -> Self {
        Condition {
            expr,
            address: Attr::new(),
            if_true: Attr::new(),
            if_false: Attr::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IfStmt {
    pub init: Option<SimpleStmt>,
    pub condition: Condition,
    pub then_block: Block,
    pub else_branch: Option<ElseBranch>,
    pub position: Position,
}

#[derive(Debug, Clone)]
pub struct ElseBranch {
    pub body: ElseBody,
    pub address: Attr,
}

#[derive(Debug, Clone)]
pub enum ElseBody {
    Block(Block),
    If(Box<IfStmt>),
}

#[derive(Debug, Clone)]
pub struct ForStmt {
    pub init: Option<SimpleStmt>,
    pub cond: Option<Condition>,
    pub post: Option<SimpleStmt>,
    pub body: Block,
    pub position: Position,
}

#[derive(Debug, Clone)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub position: Position,
}
