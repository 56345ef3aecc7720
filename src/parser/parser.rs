//! Parser implementation for building the Abstract Syntax Tree.
//!
//! This module contains the main Parser struct and the entry point that
//! parses a whole source file. Expressions use a Pratt parser with
//! NUD/LED handlers; statements and types dispatch on their leading
//! token through lookup tables.

use std::{collections::HashMap, rc::Rc};

use log::debug;

use crate::{
    ast::ast::{ImportDecl, PackageClause, Program},
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Token, TokenKind},
    Position, Span,
};

use super::{
    lookups::{
        create_token_lookups, BPLookup, BindingPower, LEDHandler, LEDLookup, NUDHandler,
        NUDLookup, StmtHandler, StmtLookup,
    },
    stmt::parse_top_level_decl,
    types::{create_token_type_lookups, TypeNUDHandler, TypeNUDLookup},
};

/// The main parser structure that maintains parsing state.
pub struct Parser {
    /// The list of tokens to parse, always ending in EOF
    tokens: Vec<Token>,
    /// Current position in the token stream
    pos: usize,
    /// The name of the source file being parsed
    file: Rc<String>,
    /// Lookup table for statement parsing handlers
    stmt_lookup: StmtLookup,
    /// Lookup table for null denotation (prefix) expression handlers
    nud_lookup: NUDLookup,
    /// Lookup table for left denotation (infix) expression handlers
    led_lookup: LEDLookup,
    /// Lookup table for expression binding powers (precedence)
    binding_power_lookup: BPLookup,
    /// Lookup table for type handlers
    type_nud_lookup: TypeNUDLookup,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>, file: Rc<String>) -> Self {
        if tokens.last().map(|token| token.kind) != Some(TokenKind::EOF) {
            let position = Position::new(0, 0, Rc::clone(&file));
            tokens.push(Token {
                kind: TokenKind::EOF,
                value: String::from("EOF"),
                span: Span {
                    start: position.clone(),
                    end: position,
                },
            });
        }

        Parser {
            tokens,
            pos: 0,
            file,
            stmt_lookup: HashMap::new(),
            nud_lookup: HashMap::new(),
            led_lookup: HashMap::new(),
            binding_power_lookup: HashMap::new(),
            type_nud_lookup: HashMap::new(),
        }
    }

    /// Returns the current token without advancing.
    ///
    /// Past the end of the stream this keeps returning the final EOF token.
    pub fn current_token(&self) -> &Token {
        let index = self.pos.min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    /// Returns the kind of the current token.
    pub fn current_token_kind(&self) -> TokenKind {
        self.current_token().kind
    }

    /// Advances to the next token and returns the previous token.
    pub fn advance(&mut self) -> Token {
        let token = self.current_token().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    /// Builds an unexpected-token error at the current token.
    pub fn unexpected(&self, message: &str) -> Error {
        let token = self.current_token();
        Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: describe(token),
                message: message.to_string(),
            },
            token.span.start.clone(),
        )
    }

    /// Expects a token of the specified kind, with optional custom error.
    pub fn expect_error(
        &mut self,
        expected_kind: TokenKind,
        error: Option<Error>,
    ) -> Result<Token, Error> {
        let token = self.current_token();
        if token.kind != expected_kind {
            return Err(error.unwrap_or_else(|| {
                Error::new(
                    ErrorImpl::UnexpectedToken {
                        token: describe(token),
                    },
                    token.span.start.clone(),
                )
            }));
        }
        Ok(self.advance())
    }

    /// Expects a token of the specified kind with default error message.
    pub fn expect(&mut self, expected_kind: TokenKind) -> Result<Token, Error> {
        self.expect_error(expected_kind, None)
    }

    /// Ends a statement: a semicolon, or nothing before a closing `)`/`}`.
    pub fn expect_terminator(&mut self) -> Result<(), Error> {
        match self.current_token_kind() {
            TokenKind::Semicolon => {
                self.advance();
                Ok(())
            }
            TokenKind::CloseCurly | TokenKind::CloseParen | TokenKind::EOF => Ok(()),
            _ => Err(self.unexpected("expected end of statement")),
        }
    }

    /// Checks if there are more tokens to parse.
    pub fn has_tokens(&self) -> bool {
        self.current_token_kind() != TokenKind::EOF
    }

    pub fn get_stmt_lookup(&self) -> &StmtLookup {
        &self.stmt_lookup
    }

    pub fn get_nud_lookup(&self) -> &NUDLookup {
        &self.nud_lookup
    }

    pub fn get_led_lookup(&self) -> &LEDLookup {
        &self.led_lookup
    }

    pub fn get_bp_lookup(&self) -> &BPLookup {
        &self.binding_power_lookup
    }

    pub fn get_type_nud_lookup(&self) -> &TypeNUDLookup {
        &self.type_nud_lookup
    }

    /// Registers a left denotation (infix) handler for a token.
    pub fn led(&mut self, kind: TokenKind, binding_power: BindingPower, led_fn: LEDHandler) {
        self.binding_power_lookup.insert(kind, binding_power);
        self.led_lookup.insert(kind, led_fn);
    }

    /// Registers a null denotation (prefix) handler for a token.
    ///
    /// Binding powers belong to infix uses only, so `-` keeps its
    /// additive power when it also has a prefix handler.
    pub fn nud(&mut self, kind: TokenKind, nud_fn: NUDHandler) {
        self.nud_lookup.insert(kind, nud_fn);
    }

    /// Registers a statement handler for a token.
    pub fn stmt(&mut self, kind: TokenKind, stmt_fn: StmtHandler) {
        self.stmt_lookup.insert(kind, stmt_fn);
    }

    /// Registers a type handler for a token.
    pub fn type_nud(&mut self, kind: TokenKind, nud_fn: TypeNUDHandler) {
        self.type_nud_lookup.insert(kind, nud_fn);
    }

    /// Returns the position of the current token.
    pub fn get_position(&self) -> Position {
        self.current_token().span.start.clone()
    }

    pub fn get_file(&self) -> Rc<String> {
        Rc::clone(&self.file)
    }
}

fn describe(token: &Token) -> String {
    match token.kind {
        TokenKind::Semicolon if token.value == "\n" => String::from("newline"),
        TokenKind::EOF => String::from("end of file"),
        _ => token.value.clone(),
    }
}

fn parse_package_clause(parser: &mut Parser) -> Result<PackageClause, Error> {
    let error = parser.unexpected("expected package clause");
    let start = parser.expect_error(TokenKind::Package, Some(error))?;
    let name = parser.expect(TokenKind::Identifier)?;
    parser.expect_terminator()?;

    Ok(PackageClause {
        name: name.value,
        position: start.span.start,
    })
}

fn parse_import_decl(parser: &mut Parser, imports: &mut Vec<ImportDecl>) -> Result<(), Error> {
    parser.expect(TokenKind::Import)?;

    if parser.current_token_kind() == TokenKind::OpenParen {
        parser.advance();
        while parser.current_token_kind() != TokenKind::CloseParen {
            let path = parser.expect(TokenKind::String)?;
            imports.push(ImportDecl {
                path: path.value,
                position: path.span.start,
            });
            parser.expect_terminator()?;
        }
        parser.expect(TokenKind::CloseParen)?;
    } else {
        let path = parser.expect(TokenKind::String)?;
        imports.push(ImportDecl {
            path: path.value,
            position: path.span.start,
        });
    }

    parser.expect_terminator()
}

/// Parses a stream of tokens into a `Program`.
///
/// This is the main entry point for parsing. It creates a parser instance,
/// initializes all lookup tables, and parses the package clause, imports
/// and top-level declarations until EOF.
pub fn parse(tokens: Vec<Token>, file: Rc<String>) -> Result<Program, Error> {
    let mut parser = Parser::new(tokens, Rc::clone(&file));
    create_token_lookups(&mut parser);
    create_token_type_lookups(&mut parser);

    let package = parse_package_clause(&mut parser)?;

    let mut imports = vec![];
    while parser.current_token_kind() == TokenKind::Import {
        parse_import_decl(&mut parser, &mut imports)?;
    }

    let mut decls = vec![];
    while parser.has_tokens() {
        if parser.current_token_kind() == TokenKind::Semicolon {
            parser.advance();
            continue;
        }
        decls.push(parse_top_level_decl(&mut parser)?);
        parser.expect_terminator()?;
    }

    debug!(
        "parsed {}: {} imports, {} declarations",
        file,
        imports.len(),
        decls.len()
    );

    Ok(Program {
        package,
        imports,
        decls,
        file,
    })
}
