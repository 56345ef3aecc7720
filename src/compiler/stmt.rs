use crate::{
    ast::{
        ast::{Block, FuncDecl, Stmt, VarDecl},
        expressions::{Expr, ExprKind},
        statements::{AssignOp, ElseBody, IfStmt, SimpleKind, SimpleStmt},
    },
    errors::errors::{Error, ErrorImpl},
};

use super::{
    compiler::Compiler,
    expr::gen_expression,
    operation::{Opcode, Operation},
};

pub fn gen_simple_statement(compiler: &mut Compiler, statement: &SimpleStmt) -> Result<(), Error> {
    match &statement.kind {
        SimpleKind::Expr(expr) => gen_expression(compiler, expr),
        SimpleKind::Assign(assign) => {
            let target = compiler.operand(&assign.target)?;
            let value = compiler.operand(&assign.value)?;
            let operation = match assign.operator {
                AssignOp::Assign => Operation::new(Opcode::Asn, Some(value), None, target),
                AssignOp::AddAssign => {
                    Operation::new(Opcode::AddInPlace, Some(target), Some(value), target)
                }
                operator => {
                    return Err(Error::new(
                        ErrorImpl::UnhandledOperator {
                            operator: operator.to_string(),
                        },
                        statement.position.clone(),
                    ))
                }
            };
            let read = operation.opcode != Opcode::Asn;
            compiler.push(operation);

            gen_target(compiler, &assign.target, read)?;
            gen_expression(compiler, &assign.value)
        }
        SimpleKind::IncDec(inc_dec) => {
            let target = compiler.operand(&inc_dec.target)?;
            compiler.push(Operation::new(
                inc_dec.operator.into(),
                Some(target),
                None,
                target,
            ));

            gen_target(compiler, &inc_dec.target, true)
        }
    }
}

/// Emits the code of an assignment target. An array element is written
/// through its slot with `STORE`, after a `LOAD` when the statement also
/// reads it.
fn gen_target(compiler: &mut Compiler, target: &Expr, read: bool) -> Result<(), Error> {
    match &target.kind {
        ExprKind::Paren(inner) => gen_target(compiler, inner, read),
        ExprKind::Index(index) => {
            let slot = target.address.require("index expression", &target.position)?;
            let base = compiler.operand(&index.base)?;
            let offset = compiler.operand(&index.index)?;
            if read {
                compiler.push(Operation::new(Opcode::Load, Some(base), Some(offset), slot));
            }
            compiler.push(Operation::new(Opcode::Store, Some(slot), Some(offset), base));

            gen_expression(compiler, &index.index)
        }
        _ => gen_expression(compiler, target),
    }
}

/// Initializers are stored into the declared symbols.
pub fn gen_var_decl(compiler: &mut Compiler, decl: &VarDecl) -> Result<(), Error> {
    for (name, value) in decl.names.iter().zip(decl.values.iter()) {
        let dest = compiler.symbol_location(&name.name, &name.position)?;
        let source = compiler.operand(value)?;
        compiler.push(Operation::new(Opcode::Asn, Some(source), None, dest));

        gen_expression(compiler, value)?;
    }
    Ok(())
}

fn gen_block(compiler: &mut Compiler, block: &Block) -> Result<(), Error> {
    for statement in block.stmts.iter() {
        gen_statement(compiler, statement)?;
    }
    Ok(())
}

fn gen_if(compiler: &mut Compiler, statement: &IfStmt) -> Result<(), Error> {
    if let Some(init) = &statement.init {
        gen_simple_statement(compiler, init)?;
    }
    gen_expression(compiler, &statement.condition.expr)?;
    gen_block(compiler, &statement.then_block)?;

    match statement.else_branch.as_ref().map(|branch| &branch.body) {
        Some(ElseBody::Block(block)) => gen_block(compiler, block),
        Some(ElseBody::If(nested)) => gen_if(compiler, nested),
        None => Ok(()),
    }
}

pub fn gen_statement(compiler: &mut Compiler, statement: &Stmt) -> Result<(), Error> {
    match statement {
        Stmt::Var(decl) => gen_var_decl(compiler, decl),
        Stmt::Simple(statement) => gen_simple_statement(compiler, statement),
        Stmt::If(statement) => gen_if(compiler, statement),
        Stmt::For(statement) => {
            if let Some(init) = &statement.init {
                gen_simple_statement(compiler, init)?;
            }
            if let Some(cond) = &statement.cond {
                gen_expression(compiler, &cond.expr)?;
            }
            if let Some(post) = &statement.post {
                gen_simple_statement(compiler, post)?;
            }
            gen_block(compiler, &statement.body)
        }
        Stmt::Return(statement) => match &statement.value {
            Some(value) => {
                let slot = compiler.return_slot.ok_or_else(|| {
                    Error::new(
                        ErrorImpl::MissingLocation {
                            node: String::from("return slot"),
                        },
                        statement.position.clone(),
                    )
                })?;
                let source = compiler.operand(value)?;
                compiler.push(Operation::new(Opcode::Asn, Some(source), None, slot));

                gen_expression(compiler, value)
            }
            None => {
                let exit = compiler.exit.ok_or_else(|| {
                    Error::new(
                        ErrorImpl::MissingLocation {
                            node: String::from("function exit"),
                        },
                        statement.position.clone(),
                    )
                })?;
                compiler.push(Operation::jump(Opcode::Goto, exit));
                Ok(())
            }
        },
        Stmt::Block(block) => gen_block(compiler, block),
    }
}

/// `LABEL first`, the body, then `RET follow`.
pub fn gen_func_decl(compiler: &mut Compiler, decl: &FuncDecl) -> Result<(), Error> {
    let first = decl.first.require("function entry", &decl.position)?;
    let follow = decl.follow.require("function exit", &decl.position)?;
    let scope = compiler.scopes.require_scope(&decl.name, &decl.position)?;
    let global = compiler.scopes.global();

    compiler.return_slot = compiler
        .scopes
        .scope(global)
        .get(&decl.name)
        .and_then(|symbol| symbol.signature.as_ref())
        .and_then(|signature| signature.return_location);
    compiler.exit = Some(follow);
    compiler.current = scope;

    compiler.push(Operation::jump(Opcode::Label, first));
    let result = gen_block(compiler, &decl.body);

    compiler.current = global;
    compiler.return_slot = None;
    compiler.exit = None;
    result?;

    compiler.push(Operation::jump(Opcode::Ret, follow));
    Ok(())
}
