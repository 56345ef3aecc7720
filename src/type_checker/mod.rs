//! Type checking module.
//!
//! Second pass over a resolved program. It verifies:
//!
//! - Operand compatibility of binary and unary operators
//! - Assignments and initializers against declared types
//! - Call arguments against function and built-in signatures
//! - Return values against the enclosing function's result type
//! - `if` and `for` conditions are boolean
//!
//! Types are computed against the scope tree built by the resolver; the
//! tree itself is not modified.

pub mod type_checker;

#[cfg(test)]
mod tests;
