//! Parser module for building an Abstract Syntax Tree (AST).
//!
//! This module contains the parser that transforms a stream of tokens
//! into a `Program`. It uses a Pratt parser for expressions with proper
//! operator precedence and handles:
//!
//! - Package clause, imports and top-level declarations
//! - Statement parsing (declarations, assignments, control flow)
//! - Expression parsing (binary ops, calls, selectors, indexing, literals)
//! - Type parsing for declarations and signatures
//!
//! The parser uses NUD (null denotation) and LED (left denotation) functions
//! for expression parsing with binding power for precedence handling.

pub mod expr;
pub mod lookups;
pub mod parser;
pub mod stmt;
pub mod types;
