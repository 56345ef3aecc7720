/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the AST structure
///
/// Submodules:
/// - ast: Program, declarations, statements and attribute slots
/// - expressions: Expression nodes and operators
/// - statements: Simple, if, for and return statements
/// - types: Written type expressions and resolved types
pub mod ast;
pub mod expressions;
pub mod statements;
pub mod types;
