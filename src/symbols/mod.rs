//! Symbols and scopes.
//!
//! All scopes of a compilation live in one `ScopeTree`, addressed by
//! `ScopeId`. Lookups walk from a scope up through its parents.

pub mod symbol_table;

#[cfg(test)]
mod tests;
