//! First pass: scopes and declarations.

pub mod resolver;

#[cfg(test)]
mod tests;
