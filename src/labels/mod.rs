//! Storage assignment.
//!
//! Third pass. Every symbol and every value-producing node receives a
//! `Location` in one of four regions, and control-flow nodes receive the
//! labels the code generator jumps to.

pub mod labeler;
pub mod location;
