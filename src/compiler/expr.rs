use crate::{
    ast::expressions::{Expr, ExprKind},
    errors::errors::Error,
    labels::labeler::package_qualifier,
};

use super::{
    compiler::Compiler,
    operation::{Opcode, Operation},
};

/// Emits the instructions of an expression: its own instruction first,
/// then those of its children from left to right.
pub fn gen_expression(compiler: &mut Compiler, expression: &Expr) -> Result<(), Error> {
    match &expression.kind {
        ExprKind::Literal(_) | ExprKind::Ident(_) => Ok(()),
        ExprKind::Binary(binary) => {
            let dest = expression.address.require("binary expression", &expression.position)?;
            let left = compiler.operand(&binary.left)?;
            let right = compiler.operand(&binary.right)?;
            compiler.push(Operation::new(
                binary.operator.into(),
                Some(left),
                Some(right),
                dest,
            ));

            gen_expression(compiler, &binary.left)?;
            gen_expression(compiler, &binary.right)
        }
        ExprKind::Unary(unary) => {
            let dest = expression.address.require("unary expression", &expression.position)?;
            let operand = compiler.operand(&unary.operand)?;
            compiler.push(Operation::new(unary.operator.into(), Some(operand), None, dest));

            gen_expression(compiler, &unary.operand)
        }
        ExprKind::Call(call) => {
            let entry = compiler.operand(&call.callee)?;
            let builtin = match &call.callee.kind {
                ExprKind::Selector(selector) => {
                    package_qualifier(compiler.scopes, compiler.current, &selector.base).is_some()
                }
                _ => false,
            };
            let opcode = if builtin { Opcode::Call } else { Opcode::Goto };
            compiler.push(Operation::jump(opcode, entry));

            for arg in call.args.iter() {
                gen_expression(compiler, arg)?;
            }
            Ok(())
        }
        ExprKind::Selector(selector) => {
            if package_qualifier(compiler.scopes, compiler.current, &selector.base).is_some() {
                return Ok(());
            }
            gen_expression(compiler, &selector.base)
        }
        ExprKind::Index(index) => {
            let dest = expression.address.require("index expression", &expression.position)?;
            let base = compiler.operand(&index.base)?;
            let offset = compiler.operand(&index.index)?;
            compiler.push(Operation::new(Opcode::Load, Some(base), Some(offset), dest));

            gen_expression(compiler, &index.index)
        }
        ExprKind::Paren(inner) => gen_expression(compiler, inner),
    }
}
