//! Main code generation module.
//!
//! This module contains the Compiler structure that walks a labeled
//! program and produces its three-address instruction sequence.

use log::debug;

use crate::{
    ast::{
        ast::{Decl, Program},
        expressions::Expr,
    },
    errors::errors::{Error, ErrorImpl},
    labels::{labeler::effective_location, location::Location},
    symbols::symbol_table::{ScopeId, ScopeTree},
    Position,
};

use super::{
    operation::{Opcode, Operation},
    stmt::{gen_func_decl, gen_var_decl},
};

/// State of one code generation run.
///
/// Instructions are appended in emission order and never reordered.
pub struct Compiler<'a> {
    /// Scope tree with every location filled in
    pub scopes: &'a ScopeTree,
    /// Scope used for name lookups
    pub current: ScopeId,
    /// Result slot of the function being generated, `None` for void
    pub return_slot: Option<Location>,
    /// Exit label of the function being generated
    pub exit: Option<Location>,

    pub operations: Vec<Operation>,
}

impl<'a> Compiler<'a> {
    pub fn new(scopes: &'a ScopeTree) -> Self {
        Compiler {
            scopes,
            current: scopes.global(),
            return_slot: None,
            exit: None,
            operations: vec![],
        }
    }

    pub fn push(&mut self, operation: Operation) {
        self.operations.push(operation);
    }

    /// The location an operand is read from, failing when labeling
    /// left it without one.
    pub fn operand(&self, expr: &Expr) -> Result<Location, Error> {
        effective_location(expr).ok_or_else(|| {
            Error::new(
                ErrorImpl::MissingLocation {
                    node: format!("`{}`", expr),
                },
                expr.position.clone(),
            )
        })
    }

    /// Location of a named symbol as seen from the current scope.
    pub fn symbol_location(&self, name: &str, position: &Position) -> Result<Location, Error> {
        self.scopes
            .lookup(self.current, name)
            .and_then(|symbol| symbol.location)
            .ok_or_else(|| {
                Error::new(
                    ErrorImpl::MissingLocation {
                        node: name.to_string(),
                    },
                    position.clone(),
                )
            })
    }

    fn gen(&mut self, program: &Program) -> Result<(), Error> {
        for decl in program.decls.iter() {
            match decl {
                Decl::Struct(_) => {}
                Decl::Func(decl) => gen_func_decl(self, decl)?,
                Decl::Var(decl) => gen_var_decl(self, decl)?,
            }
        }
        Ok(())
    }
}

/// Generates the instruction sequence of a labeled program.
pub fn generate(program: &Program, scopes: &ScopeTree) -> Result<Vec<Operation>, Error> {
    debug!("generating code for {}", program.file);

    let mut compiler = Compiler::new(scopes);
    compiler.gen(program)?;

    debug!(
        "generated {} instructions ({} functions)",
        compiler.operations.len(),
        compiler
            .operations
            .iter()
            .filter(|operation| operation.opcode == Opcode::Label)
            .count()
    );
    Ok(compiler.operations)
}
