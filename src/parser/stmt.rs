use crate::{
    ast::{
        ast::{
            Attr, Block, Decl, DeclName, FieldDecl, FuncDecl, Param, Stmt, StructDecl, VarDecl,
        },
        statements::{
            AssignOp, AssignStmt, Condition, ElseBody, ElseBranch, ForStmt, IfStmt, IncDecOp,
            IncDecStmt, ReturnStmt, SimpleKind, SimpleStmt,
        },
    },
    errors::errors::Error,
    lexer::tokens::TokenKind,
    parser::{expr::parse_expr, lookups::BindingPower},
};

use super::{
    parser::Parser,
    types::{at_type, parse_type},
};

pub fn parse_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    if let Some(handler) = parser
        .get_stmt_lookup()
        .get(&parser.current_token_kind())
        .copied()
    {
        return handler(parser);
    }

    Ok(Stmt::Simple(parse_simple_stmt(parser)?))
}

fn assign_operator(kind: TokenKind) -> Option<AssignOp> {
    let operator = match kind {
        TokenKind::Assignment => AssignOp::Assign,
        TokenKind::PlusEquals => AssignOp::AddAssign,
        TokenKind::MinusEquals => AssignOp::SubAssign,
        TokenKind::StarEquals => AssignOp::MulAssign,
        TokenKind::SlashEquals => AssignOp::DivAssign,
        TokenKind::PercentEquals => AssignOp::ModAssign,
        _ => return None,
    };
    Some(operator)
}

pub fn parse_simple_stmt(parser: &mut Parser) -> Result<SimpleStmt, Error> {
    let expr = parse_expr(parser, BindingPower::Default)?;
    let position = expr.position.clone();

    let kind = if let Some(operator) = assign_operator(parser.current_token_kind()) {
        parser.advance();
        let value = parse_expr(parser, BindingPower::Default)?;
        SimpleKind::Assign(AssignStmt {
            target: expr,
            operator,
            value,
        })
    } else {
        match parser.current_token_kind() {
            TokenKind::PlusPlus | TokenKind::MinusMinus => {
                let operator = if parser.advance().kind == TokenKind::PlusPlus {
                    IncDecOp::Increment
                } else {
                    IncDecOp::Decrement
                };
                SimpleKind::IncDec(IncDecStmt {
                    target: expr,
                    operator,
                })
            }
            _ => SimpleKind::Expr(expr),
        }
    };

    Ok(SimpleStmt::new(kind, position))
}

pub fn parse_var_decl(parser: &mut Parser) -> Result<VarDecl, Error> {
    let start_token = parser.advance();
    let is_constant = start_token.kind == TokenKind::Const;

    let mut names = vec![];
    loop {
        let error = parser.unexpected("expected identifier during variable declaration");
        let name = parser.expect_error(TokenKind::Identifier, Some(error))?;
        names.push(DeclName {
            name: name.value,
            position: name.span.start,
        });

        if parser.current_token_kind() != TokenKind::Comma {
            break;
        }
        parser.advance();
    }

    let ty = parse_type(parser)?;

    let mut values = vec![];
    if parser.current_token_kind() == TokenKind::Assignment {
        parser.advance();
        loop {
            values.push(parse_expr(parser, BindingPower::Default)?);
            if parser.current_token_kind() != TokenKind::Comma {
                break;
            }
            parser.advance();
        }

        if values.len() != names.len() {
            return Err(parser.unexpected(&format!(
                "expected {} initial values, found {}",
                names.len(),
                values.len()
            )));
        }
    } else if is_constant {
        return Err(parser.unexpected("expected rhs in constant definition"));
    }

    Ok(VarDecl {
        names,
        ty,
        values,
        is_constant,
        position: start_token.span.start,
    })
}

pub fn parse_var_decl_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    Ok(Stmt::Var(parse_var_decl(parser)?))
}

pub fn parse_block(parser: &mut Parser) -> Result<Block, Error> {
    let start = parser.expect(TokenKind::OpenCurly)?;

    let mut stmts = vec![];
    while parser.current_token_kind() != TokenKind::CloseCurly {
        if parser.current_token_kind() == TokenKind::Semicolon {
            parser.advance();
            continue;
        }
        if !parser.has_tokens() {
            return Err(parser.unexpected("expected `}` to close block"));
        }

        stmts.push(parse_stmt(parser)?);
        parser.expect_terminator()?;
    }

    parser.expect(TokenKind::CloseCurly)?;

    Ok(Block::new(stmts, start.span.start))
}

pub fn parse_block_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    Ok(Stmt::Block(parse_block(parser)?))
}

fn into_condition(parser: &Parser, stmt: SimpleStmt) -> Result<Condition, Error> {
    match stmt.kind {
        SimpleKind::Expr(expr) => Ok(Condition::new(expr)),
        _ => Err(parser.unexpected("expected condition expression")),
    }
}

fn parse_if(parser: &mut Parser) -> Result<IfStmt, Error> {
    let start = parser.expect(TokenKind::If)?;

    let first = parse_simple_stmt(parser)?;
    let (init, condition) = if parser.current_token_kind() == TokenKind::Semicolon {
        parser.advance();
        let condition = Condition::new(parse_expr(parser, BindingPower::Default)?);
        (Some(first), condition)
    } else {
        (None, into_condition(parser, first)?)
    };

    let then_block = parse_block(parser)?;

    let else_branch = if parser.current_token_kind() == TokenKind::Else {
        parser.advance();
        let body = if parser.current_token_kind() == TokenKind::If {
            ElseBody::If(Box::new(parse_if(parser)?))
        } else {
            ElseBody::Block(parse_block(parser)?)
        };
        Some(ElseBranch {
            body,
            address: Attr::new(),
        })
    } else {
        None
    };

    Ok(IfStmt {
        init,
        condition,
        then_block,
        else_branch,
        position: start.span.start,
    })
}

pub fn parse_if_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    Ok(Stmt::If(parse_if(parser)?))
}

pub fn parse_for_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.expect(TokenKind::For)?;

    let mut init = None;
    let mut cond = None;
    let mut post = None;

    if parser.current_token_kind() != TokenKind::OpenCurly {
        let first = if parser.current_token_kind() == TokenKind::Semicolon {
            None
        } else {
            Some(parse_simple_stmt(parser)?)
        };

        if parser.current_token_kind() == TokenKind::OpenCurly {
            // for cond { }
            if let Some(first) = first {
                cond = Some(into_condition(parser, first)?);
            }
        } else {
            init = first;
            parser.expect(TokenKind::Semicolon)?;

            if parser.current_token_kind() != TokenKind::Semicolon {
                cond = Some(Condition::new(parse_expr(parser, BindingPower::Default)?));
            }
            parser.expect(TokenKind::Semicolon)?;

            if parser.current_token_kind() != TokenKind::OpenCurly {
                post = Some(parse_simple_stmt(parser)?);
            }
        }
    }

    let body = parse_block(parser)?;

    Ok(Stmt::For(ForStmt {
        init,
        cond,
        post,
        body,
        position: start.span.start,
    }))
}

pub fn parse_return_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.expect(TokenKind::Return)?;

    let value = match parser.current_token_kind() {
        TokenKind::Semicolon | TokenKind::CloseCurly | TokenKind::EOF => None,
        _ => Some(parse_expr(parser, BindingPower::Default)?),
    };

    Ok(Stmt::Return(ReturnStmt {
        value,
        position: start.span.start,
    }))
}

fn parse_params(parser: &mut Parser) -> Result<Vec<Param>, Error> {
    parser.expect(TokenKind::OpenParen)?;

    let mut params = vec![];
    while parser.current_token_kind() != TokenKind::CloseParen {
        let error = parser.unexpected("expected parameter name");
        let name = parser.expect_error(TokenKind::Identifier, Some(error))?;

        // In `a, b int` only the last name of the group carries the type
        let ty = if at_type(parser) {
            Some(parse_type(parser)?)
        } else {
            None
        };

        params.push(Param {
            name: name.value,
            ty,
            position: name.span.start,
        });

        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
        } else if parser.current_token_kind() != TokenKind::CloseParen {
            return Err(parser.unexpected("expected `,` or `)` in parameter list"));
        }
    }

    parser.expect(TokenKind::CloseParen)?;
    Ok(params)
}

pub fn parse_func_decl(parser: &mut Parser) -> Result<FuncDecl, Error> {
    let start = parser.expect(TokenKind::Func)?;
    let error = parser.unexpected("expected function name");
    let name = parser.expect_error(TokenKind::Identifier, Some(error))?;

    let params = parse_params(parser)?;

    let result = if parser.current_token_kind() == TokenKind::OpenCurly {
        None
    } else {
        Some(parse_type(parser)?)
    };

    let body = parse_block(parser)?;

    Ok(FuncDecl {
        name: name.value,
        params,
        result,
        body,
        position: start.span.start,
        first: Attr::new(),
        follow: Attr::new(),
    })
}

pub fn parse_struct_decl(parser: &mut Parser) -> Result<StructDecl, Error> {
    let start = parser.expect(TokenKind::Type)?;
    let error = parser.unexpected("expected struct name");
    let name = parser.expect_error(TokenKind::Identifier, Some(error))?;
    let error = parser.unexpected("only struct types can be declared");
    parser.expect_error(TokenKind::Struct, Some(error))?;
    parser.expect(TokenKind::OpenCurly)?;

    let mut fields = vec![];
    while parser.current_token_kind() != TokenKind::CloseCurly {
        if parser.current_token_kind() == TokenKind::Semicolon {
            parser.advance();
            continue;
        }

        let first = parser.expect(TokenKind::Identifier)?;
        let position = first.span.start.clone();
        let mut names = vec![first.value];
        while parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
            names.push(parser.expect(TokenKind::Identifier)?.value);
        }

        let ty = parse_type(parser)?;
        fields.push(FieldDecl {
            names,
            ty,
            position,
        });
        parser.expect_terminator()?;
    }

    parser.expect(TokenKind::CloseCurly)?;

    Ok(StructDecl {
        name: name.value,
        fields,
        position: start.span.start,
    })
}

pub fn parse_top_level_decl(parser: &mut Parser) -> Result<Decl, Error> {
    match parser.current_token_kind() {
        TokenKind::Func => Ok(Decl::Func(parse_func_decl(parser)?)),
        TokenKind::Type => Ok(Decl::Struct(parse_struct_decl(parser)?)),
        TokenKind::Var | TokenKind::Const => Ok(Decl::Var(parse_var_decl(parser)?)),
        _ => Err(parser.unexpected("expected top-level declaration")),
    }
}
