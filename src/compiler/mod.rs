//! Intermediate code generation.
//!
//! Fourth pass. Lowers a labeled program into a flat sequence of
//! three-address operations over the locations assigned by the labeler.
//! Operands are read through their effective location.

pub mod compiler;
pub mod emitter;
pub mod expr;
pub mod operation;
pub mod stmt;

#[cfg(test)]
mod tests;
