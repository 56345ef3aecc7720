//! Type parsing implementation.
//!
//! Types are either a name (`int`, `Point`) or a sized array of a named
//! element type (`[10]int`). Handlers are looked up by the leading token.

use std::collections::HashMap;

use crate::{
    ast::types::{NamedType, TypeExpr},
    errors::errors::Error,
    lexer::tokens::TokenKind,
};

use super::{expr::parse_expr, lookups::BindingPower, parser::Parser};

/// Type alias for type handler functions.
pub type TypeNUDHandler = fn(&mut Parser) -> Result<TypeExpr, Error>;

/// Type alias for type lookup table.
pub type TypeNUDLookup = HashMap<TokenKind, TypeNUDHandler>;

pub fn create_token_type_lookups(parser: &mut Parser) {
    parser.type_nud(TokenKind::Identifier, parse_named_type);
    parser.type_nud(TokenKind::OpenBracket, parse_array_type);
}

/// Whether the current token can start a type.
pub fn at_type(parser: &Parser) -> bool {
    parser
        .get_type_nud_lookup()
        .contains_key(&parser.current_token_kind())
}

pub fn parse_type(parser: &mut Parser) -> Result<TypeExpr, Error> {
    let Some(handler) = parser
        .get_type_nud_lookup()
        .get(&parser.current_token_kind())
        .copied()
    else {
        return Err(parser.unexpected("expected type"));
    };

    handler(parser)
}

fn parse_type_name(parser: &mut Parser) -> Result<NamedType, Error> {
    let error = parser.unexpected("expected type name");
    let token = parser.expect_error(TokenKind::Identifier, Some(error))?;
    Ok(NamedType {
        name: token.value,
        position: token.span.start,
    })
}

pub fn parse_named_type(parser: &mut Parser) -> Result<TypeExpr, Error> {
    Ok(TypeExpr::Named(parse_type_name(parser)?))
}

pub fn parse_array_type(parser: &mut Parser) -> Result<TypeExpr, Error> {
    let start = parser.expect(TokenKind::OpenBracket)?;

    let size = if parser.current_token_kind() == TokenKind::CloseBracket {
        None
    } else {
        Some(Box::new(parse_expr(parser, BindingPower::Default)?))
    };
    parser.expect(TokenKind::CloseBracket)?;

    let elem = parse_type_name(parser)?;

    Ok(TypeExpr::Array {
        size,
        elem,
        position: start.span.start,
    })
}
