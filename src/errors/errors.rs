use std::fmt::Display;

use thiserror::Error;

use crate::Position;

#[derive(Debug, Clone, Error)]
#[error("{position}: {internal_error}")]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_impl(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn kind(&self) -> ErrorKind {
        self.internal_error.kind()
    }

    pub fn exit_code(&self) -> i32 {
        self.kind().exit_code()
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::UnterminatedLiteral { .. } => "UnterminatedLiteral",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::InvalidPackageName { .. } => "InvalidPackageName",
            ErrorImpl::UnsupportedImport { .. } => "UnsupportedImport",
            ErrorImpl::UnknownBuiltin { .. } => "UnknownBuiltin",
            ErrorImpl::PackageAsValue { .. } => "PackageAsValue",
            ErrorImpl::UndeclaredIdentifier { .. } => "UndeclaredIdentifier",
            ErrorImpl::DuplicateDeclaration { .. } => "DuplicateDeclaration",
            ErrorImpl::MissingArraySize => "MissingArraySize",
            ErrorImpl::NonConstantArraySize { .. } => "NonConstantArraySize",
            ErrorImpl::UnknownType { .. } => "UnknownType",
            ErrorImpl::UnsupportedArrayType => "UnsupportedArrayType",
            ErrorImpl::MissingParameterType { .. } => "MissingParameterType",
            ErrorImpl::NestedStruct { .. } => "NestedStruct",
            ErrorImpl::UnknownField { .. } => "UnknownField",
            ErrorImpl::DeclaredAfterOuterUse { .. } => "DeclaredAfterOuterUse",
            ErrorImpl::TypeMismatch { .. } => "TypeMismatch",
            ErrorImpl::InvalidOperand { .. } => "InvalidOperand",
            ErrorImpl::StructOperand { .. } => "StructOperand",
            ErrorImpl::ReturnTypeMismatch { .. } => "ReturnTypeMismatch",
            ErrorImpl::NonBooleanCondition { .. } => "NonBooleanCondition",
            ErrorImpl::UnexpectedArguments { .. } => "UnexpectedArguments",
            ErrorImpl::MissingArguments { .. } => "MissingArguments",
            ErrorImpl::ArgumentTypeMatchError { .. } => "ArgumentTypeMatchError",
            ErrorImpl::NotCallable { .. } => "NotCallable",
            ErrorImpl::NotAStruct { .. } => "NotAStruct",
            ErrorImpl::NotIndexable { .. } => "NotIndexable",
            ErrorImpl::ArrayAsValue { .. } => "ArrayAsValue",
            ErrorImpl::AssignToConstant { .. } => "AssignToConstant",
            ErrorImpl::UnhandledOperator { .. } => "UnhandledOperator",
            ErrorImpl::AttributeReassigned { .. } => "AttributeReassigned",
            ErrorImpl::MissingLocation { .. } => "MissingLocation",
            ErrorImpl::MissingScope { .. } => "MissingScope",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => ErrorTip::None,
            ErrorImpl::UnterminatedLiteral { .. } => {
                ErrorTip::Suggestion(String::from("Literal is missing its closing quote"))
            }
            ErrorImpl::UnexpectedToken { token } => ErrorTip::Suggestion(format!(
                "Unexpected token: `{}`, did you miss a semicolon or newline?",
                token
            )),
            ErrorImpl::UnexpectedTokenDetailed { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::NumberParseError { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, is it above the integer limit?",
                token
            )),
            ErrorImpl::InvalidPackageName { name } => ErrorTip::Suggestion(format!(
                "Package name must be `main`, found `{}`",
                name
            )),
            ErrorImpl::UnsupportedImport { path } => ErrorTip::Suggestion(format!(
                "Package `{}` is not supported, only fmt, time and math/rand are",
                path
            )),
            ErrorImpl::UnknownBuiltin { package, member } => ErrorTip::Suggestion(format!(
                "`{}.{}` is not available, the only supported member is `{}`",
                package,
                member,
                expected_member(package)
            )),
            ErrorImpl::PackageAsValue { package } => ErrorTip::Suggestion(format!(
                "Package `{}` can only be used to call its entry point",
                package
            )),
            ErrorImpl::UndeclaredIdentifier { name } => {
                ErrorTip::Suggestion(format!("Undeclared variable `{}`", name))
            }
            ErrorImpl::DuplicateDeclaration { name } => {
                ErrorTip::Suggestion(format!("`{}` is already declared in this scope", name))
            }
            ErrorImpl::MissingArraySize => ErrorTip::Suggestion(String::from(
                "Array declarations need to have a size",
            )),
            ErrorImpl::NonConstantArraySize { found } => ErrorTip::Suggestion(format!(
                "Found `{}` instead of a constant size in array",
                found
            )),
            ErrorImpl::UnknownType { type_ } => {
                ErrorTip::Suggestion(format!("Unknown type `{}` found", type_))
            }
            ErrorImpl::UnsupportedArrayType => ErrorTip::Suggestion(String::from(
                "Array types are only allowed in variable declarations",
            )),
            ErrorImpl::MissingParameterType { name } => ErrorTip::Suggestion(format!(
                "Parameter `{}` has no type and no later parameter provides one",
                name
            )),
            ErrorImpl::NestedStruct { field } => ErrorTip::Suggestion(format!(
                "Field `{}` has a struct type, nested structs are not supported",
                field
            )),
            ErrorImpl::UnknownField { struct_name, field } => {
                ErrorTip::Suggestion(format!("`{}` has no field `{}`", struct_name, field))
            }
            ErrorImpl::DeclaredAfterOuterUse { name } => ErrorTip::Suggestion(format!(
                "`{}` was already used from an enclosing scope in this function, rename the local",
                name
            )),
            ErrorImpl::TypeMismatch {
                left,
                right,
                operator,
            } => ErrorTip::Suggestion(format!(
                "Type `{}` != type `{}` in operation `{}`",
                left, right, operator
            )),
            ErrorImpl::InvalidOperand { operator, type_ } => ErrorTip::Suggestion(format!(
                "Operator `{}` is not defined on `{}`",
                operator, type_
            )),
            ErrorImpl::StructOperand { operator } => ErrorTip::Suggestion(format!(
                "Found a struct value in operation `{}`",
                operator
            )),
            ErrorImpl::ReturnTypeMismatch { expected, received } => ErrorTip::Suggestion(format!(
                "Expected return type `{}` but got `{}`",
                expected, received
            )),
            ErrorImpl::NonBooleanCondition { type_, tree } => ErrorTip::Suggestion(format!(
                "Conditional `{}` has type `{}` instead of `bool`",
                tree, type_
            )),
            ErrorImpl::UnexpectedArguments {
                function,
                expected,
                received,
            } => ErrorTip::Suggestion(format!(
                "`{}` expects {} arguments, received {}",
                function, expected, received
            )),
            ErrorImpl::MissingArguments {
                function,
                expected,
                received,
            } => ErrorTip::Suggestion(format!(
                "`{}` expects {} arguments, received {}",
                function, expected, received
            )),
            ErrorImpl::ArgumentTypeMatchError { expected, received } => {
                ErrorTip::Suggestion(format!(
                    "Expected argument types `{}`, received `{}`",
                    expected, received
                ))
            }
            ErrorImpl::NotCallable { name } => {
                ErrorTip::Suggestion(format!("`{}` is not a function", name))
            }
            ErrorImpl::NotAStruct { type_ } => {
                ErrorTip::Suggestion(format!("Type `{}` has no fields", type_))
            }
            ErrorImpl::NotIndexable { name } => {
                ErrorTip::Suggestion(format!("`{}` is not an array", name))
            }
            ErrorImpl::ArrayAsValue { name } => {
                ErrorTip::Suggestion(format!("Index `{}` to use one of its elements", name))
            }
            ErrorImpl::AssignToConstant { name } => {
                ErrorTip::Suggestion(format!("Cannot assign to constant `{}`", name))
            }
            ErrorImpl::UnhandledOperator { operator } => ErrorTip::Suggestion(format!(
                "Operator `{}` has no lowering to intermediate code",
                operator
            )),
            ErrorImpl::AttributeReassigned { attribute } => {
                ErrorTip::Suggestion(format!("Attribute `{}` was assigned twice", attribute))
            }
            ErrorImpl::MissingLocation { node } => {
                ErrorTip::Suggestion(format!("No location was assigned to `{}`", node))
            }
            ErrorImpl::MissingScope { name } => {
                ErrorTip::Suggestion(format!("No scope registered for `{}`", name))
            }
        }
    }
}

fn expected_member(package: &str) -> &'static str {
    match package {
        "fmt" => "Println",
        "time" => "Now",
        "rand" => "Intn",
        _ => "?",
    }
}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

/// Error categories, used to pick the process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lexical,
    Syntax,
    Configuration,
    Scope,
    Type,
    Internal,
}

impl ErrorKind {
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorKind::Lexical => 1,
            ErrorKind::Syntax => 2,
            ErrorKind::Configuration | ErrorKind::Scope | ErrorKind::Type => 3,
            ErrorKind::Internal => 4,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    // Lexical
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("unterminated literal: {literal:?}")]
    UnterminatedLiteral { literal: String },

    // Syntax
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },

    // Configuration
    #[error("package name must be main, found {name:?}")]
    InvalidPackageName { name: String },
    #[error("package {path:?} is not supported")]
    UnsupportedImport { path: String },
    #[error("{package}.{member} is not a supported built-in")]
    UnknownBuiltin { package: String, member: String },
    #[error("package {package:?} used as a value")]
    PackageAsValue { package: String },

    // Scope
    #[error("undeclared variable {name:?}")]
    UndeclaredIdentifier { name: String },
    #[error("{name:?} already declared")]
    DuplicateDeclaration { name: String },
    #[error("array declaration without a size")]
    MissingArraySize,
    #[error("array size {found:?} is not a constant")]
    NonConstantArraySize { found: String },
    #[error("unknown type {type_}")]
    UnknownType { type_: String },
    #[error("array type outside of a variable declaration")]
    UnsupportedArrayType,
    #[error("parameter {name:?} has no type")]
    MissingParameterType { name: String },
    #[error("field {field:?} has a struct type")]
    NestedStruct { field: String },
    #[error("{struct_name} has no field {field:?}")]
    UnknownField { struct_name: String, field: String },
    #[error("{name:?} declared after a use of the outer {name:?}")]
    DeclaredAfterOuterUse { name: String },

    // Type
    #[error("{left} != {right} in operation '{operator}'")]
    TypeMismatch {
        left: String,
        right: String,
        operator: String,
    },
    #[error("operator '{operator}' not defined on {type_}")]
    InvalidOperand { operator: String, type_: String },
    #[error("struct operand in operation '{operator}'")]
    StructOperand { operator: String },
    #[error("return type mismatch: expected {expected}, received {received}")]
    ReturnTypeMismatch { expected: String, received: String },
    #[error("conditional does not have type bool, found {type_} in `{tree}`")]
    NonBooleanCondition { type_: String, tree: String },
    #[error("{function}: unexpected arguments: expected {expected}, received {received}")]
    UnexpectedArguments {
        function: String,
        expected: usize,
        received: usize,
    },
    #[error("{function}: missing arguments: expected {expected}, received {received}")]
    MissingArguments {
        function: String,
        expected: usize,
        received: usize,
    },
    #[error("argument types do not match: expected {expected}, received {received}")]
    ArgumentTypeMatchError { expected: String, received: String },
    #[error("{name:?} is not callable")]
    NotCallable { name: String },
    #[error("{type_} is not a struct")]
    NotAStruct { type_: String },
    #[error("{name:?} is not an array")]
    NotIndexable { name: String },
    #[error("array {name:?} used as a value")]
    ArrayAsValue { name: String },
    #[error("cannot assign to constant {name:?}")]
    AssignToConstant { name: String },

    // Internal
    #[error("no lowering for operator '{operator}'")]
    UnhandledOperator { operator: String },
    #[error("attribute {attribute} assigned twice")]
    AttributeReassigned { attribute: String },
    #[error("no location for {node}")]
    MissingLocation { node: String },
    #[error("no scope registered for {name:?}")]
    MissingScope { name: String },
}

impl ErrorImpl {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ErrorImpl::UnrecognisedToken { .. } | ErrorImpl::UnterminatedLiteral { .. } => {
                ErrorKind::Lexical
            }
            ErrorImpl::UnexpectedToken { .. }
            | ErrorImpl::UnexpectedTokenDetailed { .. }
            | ErrorImpl::NumberParseError { .. } => ErrorKind::Syntax,
            ErrorImpl::InvalidPackageName { .. }
            | ErrorImpl::UnsupportedImport { .. }
            | ErrorImpl::UnknownBuiltin { .. }
            | ErrorImpl::PackageAsValue { .. } => ErrorKind::Configuration,
            ErrorImpl::UndeclaredIdentifier { .. }
            | ErrorImpl::DuplicateDeclaration { .. }
            | ErrorImpl::MissingArraySize
            | ErrorImpl::NonConstantArraySize { .. }
            | ErrorImpl::UnknownType { .. }
            | ErrorImpl::UnsupportedArrayType
            | ErrorImpl::MissingParameterType { .. }
            | ErrorImpl::NestedStruct { .. }
            | ErrorImpl::UnknownField { .. }
            | ErrorImpl::DeclaredAfterOuterUse { .. } => ErrorKind::Scope,
            ErrorImpl::TypeMismatch { .. }
            | ErrorImpl::InvalidOperand { .. }
            | ErrorImpl::StructOperand { .. }
            | ErrorImpl::ReturnTypeMismatch { .. }
            | ErrorImpl::NonBooleanCondition { .. }
            | ErrorImpl::UnexpectedArguments { .. }
            | ErrorImpl::MissingArguments { .. }
            | ErrorImpl::ArgumentTypeMatchError { .. }
            | ErrorImpl::NotCallable { .. }
            | ErrorImpl::NotAStruct { .. }
            | ErrorImpl::NotIndexable { .. }
            | ErrorImpl::ArrayAsValue { .. }
            | ErrorImpl::AssignToConstant { .. } => ErrorKind::Type,
            ErrorImpl::UnhandledOperator { .. }
            | ErrorImpl::AttributeReassigned { .. }
            | ErrorImpl::MissingLocation { .. }
            | ErrorImpl::MissingScope { .. } => ErrorKind::Internal,
        }
    }
}

/// Errors collected by one pass.
///
/// The resolver and type checker keep going after a statement fails so a
/// single run reports every problem of that pass.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    errors: Vec<Error>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics { errors: vec![] }
    }

    pub fn push(&mut self, error: Error) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn first(&self) -> Option<&Error> {
        self.errors.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Error> {
        self.errors.iter()
    }

    /// Exit status of the first reported error.
    pub fn exit_code(&self) -> i32 {
        self.first().map(Error::exit_code).unwrap_or(0)
    }

    pub fn into_vec(self) -> Vec<Error> {
        self.errors
    }
}

impl From<Error> for Diagnostics {
    fn from(error: Error) -> Self {
        Diagnostics {
            errors: vec![error],
        }
    }
}

impl Display for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for error in self.errors.iter() {
            writeln!(f, "{}", error)?;
        }
        Ok(())
    }
}
