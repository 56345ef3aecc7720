use crate::{
    ast::expressions::{
        BinaryExpr, BinaryOp, CallExpr, Expr, ExprKind, IndexExpr, Literal, LiteralKind,
        SelectorExpr, UnaryExpr, UnaryOp,
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
};

use super::{lookups::BindingPower, parser::Parser};

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<Expr, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let Some(nud_fn) = parser.get_nud_lookup().get(&token_kind).copied() else {
        return Err(parser.unexpected("expected expression"));
    };

    let mut left = nud_fn(parser)?;

    // While LED and current BP is less than BP of current token, continue parsing lhs
    loop {
        let token_kind = parser.current_token_kind();
        let next_bp = *parser
            .get_bp_lookup()
            .get(&token_kind)
            .unwrap_or(&BindingPower::Default);
        if next_bp <= bp {
            break;
        }

        let Some(led_fn) = parser.get_led_lookup().get(&token_kind).copied() else {
            break;
        };
        left = led_fn(parser, left, next_bp)?;
    }

    Ok(left)
}

fn number_error(token: &Token) -> Error {
    Error::new(
        ErrorImpl::NumberParseError {
            token: token.value.clone(),
        },
        token.span.start.clone(),
    )
}

fn parse_literal(token: &Token) -> Result<LiteralKind, Error> {
    let value = token.value.as_str();
    let kind = match token.kind {
        TokenKind::Int => LiteralKind::Int(value.parse().map_err(|_| number_error(token))?),
        TokenKind::Octal => LiteralKind::Octal(
            i64::from_str_radix(&value[1..], 8).map_err(|_| number_error(token))?,
        ),
        TokenKind::Hex => LiteralKind::Hex(
            i64::from_str_radix(&value[2..], 16).map_err(|_| number_error(token))?,
        ),
        TokenKind::Decimal => {
            LiteralKind::Decimal(value.parse().map_err(|_| number_error(token))?)
        }
        TokenKind::Scientific => {
            LiteralKind::Scientific(value.parse().map_err(|_| number_error(token))?)
        }
        TokenKind::String => LiteralKind::String,
        TokenKind::Char => LiteralKind::Char(value.chars().next().unwrap_or('\0')),
        TokenKind::True => LiteralKind::Bool(true),
        TokenKind::False => LiteralKind::Bool(false),
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken {
                    token: token.value.clone(),
                },
                token.span.start.clone(),
            ))
        }
    };
    Ok(kind)
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let token = parser.advance();

    if token.kind == TokenKind::Identifier {
        return Ok(Expr::new(ExprKind::Ident(token.value), token.span.start));
    }

    let kind = parse_literal(&token)?;
    Ok(Expr::new(
        ExprKind::Literal(Literal {
            kind,
            raw: token.value,
        }),
        token.span.start,
    ))
}

fn binary_operator(kind: TokenKind) -> Option<BinaryOp> {
    let operator = match kind {
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Dash => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Percent => BinaryOp::Mod,
        TokenKind::Equals => BinaryOp::Equals,
        TokenKind::NotEquals => BinaryOp::NotEquals,
        TokenKind::Less => BinaryOp::Less,
        TokenKind::Greater => BinaryOp::Greater,
        TokenKind::LessEquals => BinaryOp::LessEquals,
        TokenKind::GreaterEquals => BinaryOp::GreaterEquals,
        TokenKind::And => BinaryOp::And,
        TokenKind::Or => BinaryOp::Or,
        _ => return None,
    };
    Some(operator)
}

pub fn parse_binary_expr(parser: &mut Parser, left: Expr, bp: BindingPower) -> Result<Expr, Error> {
    let error = parser.unexpected("expected binary operator");
    let operator_token = parser.advance();
    let operator = binary_operator(operator_token.kind).ok_or(error)?;

    let right = parse_expr(parser, bp)?;
    let position = left.position.clone();

    Ok(Expr::new(
        ExprKind::Binary(BinaryExpr {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        }),
        position,
    ))
}

pub fn parse_prefix_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let operator_token = parser.advance();
    let operator = match operator_token.kind {
        TokenKind::Not => UnaryOp::Not,
        _ => UnaryOp::Negate,
    };
    let operand = parse_expr(parser, BindingPower::Unary)?;

    Ok(Expr::new(
        ExprKind::Unary(UnaryExpr {
            operator,
            operand: Box::new(operand),
        }),
        operator_token.span.start,
    ))
}

pub fn parse_grouping_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.advance();
    let expr = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;

    Ok(Expr::new(ExprKind::Paren(Box::new(expr)), start.span.start))
}

pub fn parse_call_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    parser.advance();

    let mut args = vec![];

    while parser.current_token_kind() != TokenKind::CloseParen {
        args.push(parse_expr(parser, BindingPower::Default)?);

        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
        } else if parser.current_token_kind() != TokenKind::CloseParen {
            return Err(parser.unexpected("expected `,` or `)` in argument list"));
        }
    }

    parser.expect(TokenKind::CloseParen)?;

    let position = left.position.clone();
    Ok(Expr::new(
        ExprKind::Call(CallExpr {
            callee: Box::new(left),
            args,
        }),
        position,
    ))
}

pub fn parse_selector_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    parser.advance();
    let error = parser.unexpected("expected field name after `.`");
    let field = parser.expect_error(TokenKind::Identifier, Some(error))?;

    let position = left.position.clone();
    Ok(Expr::new(
        ExprKind::Selector(SelectorExpr {
            base: Box::new(left),
            field: field.value,
        }),
        position,
    ))
}

pub fn parse_index_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    parser.advance();
    let index = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseBracket)?;

    let position = left.position.clone();
    Ok(Expr::new(
        ExprKind::Index(IndexExpr {
            base: Box::new(left),
            index: Box::new(index),
        }),
        position,
    ))
}
