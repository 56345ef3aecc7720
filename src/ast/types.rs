//! Type representations.
//!
//! - `TypeExpr`: a type as written in source (`int`, `[10]int`, `Point`)
//! - `Type`: the resolved type the checker reasons about
//!
//! Scalar types widen along `rune < int < float64`.

use std::fmt::Display;

use crate::Position;

use super::expressions::Expr;

#[derive(Debug, Clone)]
pub struct NamedType {
    pub name: String,
    pub position: Position,
}

#[derive(Debug, Clone)]
pub enum TypeExpr {
    Named(NamedType),
    /// `[size]elem`; the size is required by declarations but optional
    /// in the grammar.
    Array {
        size: Option<Box<Expr>>,
        elem: NamedType,
        position: Position,
    },
}

impl TypeExpr {
    pub fn position(&self) -> &Position {
        match self {
            TypeExpr::Named(named) => &named.position,
            TypeExpr::Array { position, .. } => position,
        }
    }
}

impl Display for TypeExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeExpr::Named(named) => write!(f, "{}", named.name),
            TypeExpr::Array { size: Some(size), elem, .. } => write!(f, "[{}]{}", size, elem.name),
            TypeExpr::Array { size: None, elem, .. } => write!(f, "[]{}", elem.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Int,
    Float64,
    Bool,
    String,
    Rune,
    Void,
    Struct(String),
    Function,
}

impl Type {
    /// Maps a built-in type name.
    pub fn from_builtin(name: &str) -> Option<Type> {
        match name {
            "int" => Some(Type::Int),
            "float64" => Some(Type::Float64),
            "bool" => Some(Type::Bool),
            "string" => Some(Type::String),
            "rune" => Some(Type::Rune),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Int | Type::Float64 | Type::Rune)
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Type::Int | Type::Rune)
    }

    fn rank(&self) -> Option<u8> {
        match self {
            Type::Rune => Some(0),
            Type::Int => Some(1),
            Type::Float64 => Some(2),
            _ => None,
        }
    }

    /// The common type of two operands: identical types unify to
    /// themselves, numeric types to the wider one.
    pub fn unify(&self, other: &Type) -> Option<Type> {
        if self == other {
            return Some(self.clone());
        }
        match (self.rank(), other.rank()) {
            (Some(left), Some(right)) if left >= right => Some(self.clone()),
            (Some(_), Some(_)) => Some(other.clone()),
            _ => None,
        }
    }

    /// Whether a value of type `value` may be stored in a slot of this type.
    pub fn accepts(&self, value: &Type) -> bool {
        if self == value {
            return true;
        }
        match (self.rank(), value.rank()) {
            (Some(slot), Some(value)) => slot >= value,
            _ => false,
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Float64 => write!(f, "float64"),
            Type::Bool => write!(f, "bool"),
            Type::String => write!(f, "string"),
            Type::Rune => write!(f, "rune"),
            Type::Void => write!(f, "void"),
            Type::Struct(name) => write!(f, "{}", name),
            Type::Function => write!(f, "function"),
        }
    }
}
