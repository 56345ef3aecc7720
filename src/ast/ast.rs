use std::rc::Rc;

use crate::{
    errors::errors::{Error, ErrorImpl},
    labels::location::Location,
    Position,
};

use super::{
    statements::{ReturnStmt, SimpleStmt, IfStmt, ForStmt},
    types::TypeExpr,
    expressions::Expr,
};

/// A location attribute synthesized by the labeling pass.
///
/// Slots start empty and may be written exactly once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attr(Option<Location>);

impl Attr {
    pub fn new() -> Self {
        Attr(None)
    }

    pub fn get(&self) -> Option<Location> {
        self.0
    }

    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }

    /// Writes the slot. `attribute` names it in the error when the slot
    /// was already written.
    pub fn assign(
        &mut self,
        location: Location,
        attribute: &str,
        position: &Position,
    ) -> Result<(), Error> {
        if self.0.is_some() {
            return Err(Error::new(
                ErrorImpl::AttributeReassigned {
                    attribute: attribute.to_string(),
                },
                position.clone(),
            ));
        }
        self.0 = Some(location);
        Ok(())
    }

    /// Reads the slot, failing with a `MissingLocation` naming `node`.
    pub fn require(&self, node: &str, position: &Position) -> Result<Location, Error> {
        self.0.ok_or_else(|| {
            Error::new(
                ErrorImpl::MissingLocation {
                    node: node.to_string(),
                },
                position.clone(),
            )
        })
    }
}

/// One translation unit.
#[derive(Debug, Clone)]
pub struct Program {
    pub package: PackageClause,
    pub imports: Vec<ImportDecl>,
    pub decls: Vec<Decl>,
    pub file: Rc<String>,
}

#[derive(Debug, Clone)]
pub struct PackageClause {
    pub name: String,
    pub position: Position,
}

#[derive(Debug, Clone)]
pub struct ImportDecl {
    pub path: String,
    pub position: Position,
}

#[derive(Debug, Clone)]
pub enum Decl {
    Struct(StructDecl),
    Func(FuncDecl),
    Var(VarDecl),
}

#[derive(Debug, Clone)]
pub struct StructDecl {
    pub name: String,
    pub fields: Vec<FieldDecl>,
    pub position: Position,
}

/// `a, b int` inside a struct body.
#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub names: Vec<String>,
    pub ty: TypeExpr,
    pub position: Position,
}

#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub result: Option<TypeExpr>,
    pub body: Block,
    pub position: Position,
    pub first: Attr,
    pub follow: Attr,
}

/// A parameter as written. In `a, b int` only `b` carries the type.
#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub ty: Option<TypeExpr>,
    pub position: Position,
}

#[derive(Debug, Clone)]
pub struct DeclName {
    pub name: String,
    pub position: Position,
}

/// `var` and `const` declarations.
#[derive(Debug, Clone)]
pub struct VarDecl {
    pub names: Vec<DeclName>,
    pub ty: TypeExpr,
    pub values: Vec<Expr>,
    pub is_constant: bool,
    pub position: Position,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Var(VarDecl),
    Simple(SimpleStmt),
    If(IfStmt),
    For(ForStmt),
    Return(ReturnStmt),
    Block(Block),
}

impl Stmt {
    pub fn position(&self) -> &Position {
        match self {
            Stmt::Var(decl) => &decl.position,
            Stmt::Simple(stmt) => &stmt.position,
            Stmt::If(stmt) => &stmt.position,
            Stmt::For(stmt) => &stmt.position,
            Stmt::Return(stmt) => &stmt.position,
            Stmt::Block(block) => &block.position,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub position: Position,
    pub address: Attr,
    pub follow: Attr,
}

impl Block {
    pub fn new(stmts: Vec<Stmt>, position: Position) -> Self {
        Block {
            stmts,
            position,
            address: Attr::new(),
            follow: Attr::new(),
        }
    }
}
