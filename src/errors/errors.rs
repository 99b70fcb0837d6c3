use std::fmt::Display;

use thiserror::Error;

use crate::Position;

/// A semantic error, located at the statement or declaration that caused it.
///
/// Every error is fatal: the first one aborts the whole analysis.
#[derive(Debug, Clone)]
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

    pub fn kind(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::DuplicateDeclaration { .. } => "DuplicateDeclaration",
            ErrorImpl::DuplicateGlobalSymbol { .. } => "DuplicateGlobalSymbol",
            ErrorImpl::UndeclaredIdentifier { .. } => "UndeclaredIdentifier",
            ErrorImpl::UndefinedFunction { .. } => "UndefinedFunction",
            ErrorImpl::UnknownType { .. } => "UnknownType",
            ErrorImpl::NestedTypeDeclaration { .. } => "NestedTypeDeclaration",
            ErrorImpl::InvalidOperand { .. } => "InvalidOperand",
            ErrorImpl::InvalidOperandTypes { .. } => "InvalidOperandTypes",
            ErrorImpl::InvalidMemberAccess { .. } => "InvalidMemberAccess",
            ErrorImpl::ArrayDimensionError { .. } => "ArrayDimensionError",
            ErrorImpl::NotAnArray { .. } => "NotAnArray",
            ErrorImpl::NotAPointer { .. } => "NotAPointer",
            ErrorImpl::NotAllocatable { .. } => "NotAllocatable",
            ErrorImpl::NotConstant { .. } => "NotConstant",
            ErrorImpl::InvalidCast { .. } => "InvalidCast",
            ErrorImpl::InvalidArguments { .. } => "InvalidArguments",
            ErrorImpl::TypeMismatch { .. } => "TypeMismatch",
            ErrorImpl::AssignToConstant { .. } => "AssignToConstant",
            ErrorImpl::ReturnOutsideFunction => "ReturnOutsideFunction",
            ErrorImpl::InferenceError { .. } => "InferenceError",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::DuplicateDeclaration { identifier, .. } => ErrorTip::Suggestion(format!(
                "`{}` is already declared in this scope, rename one of them",
                identifier
            )),
            ErrorImpl::DuplicateGlobalSymbol { symbol, .. } => ErrorTip::Suggestion(format!(
                "Global `{}` is declared in more than one file",
                symbol
            )),
            ErrorImpl::UndeclaredIdentifier { identifier } => ErrorTip::Suggestion(format!(
                "`{}` is not declared before this point, or is not visible from here",
                identifier
            )),
            ErrorImpl::UndefinedFunction { function, arguments } => ErrorTip::Suggestion(format!(
                "No function `{}` accepts arguments ({})",
                function, arguments
            )),
            ErrorImpl::UnknownType { type_ } => {
                ErrorTip::Suggestion(format!("Unknown type `{}` found", type_))
            }
            ErrorImpl::NestedTypeDeclaration { type_ } => ErrorTip::Suggestion(format!(
                "Move the declaration of `{}` to the top level of the file",
                type_
            )),
            ErrorImpl::AssignToConstant { identifier } => ErrorTip::Suggestion(format!(
                "`{}` is a constant, declare it with `:=` to make it mutable",
                identifier
            )),
            ErrorImpl::InvalidOperandTypes { .. } => ErrorTip::Suggestion(String::from(
                "Use #cast to bring both operands to the same type",
            )),
            ErrorImpl::NotConstant { .. } => ErrorTip::Suggestion(String::from(
                "Constant initializers may only use literals, operators and other constants",
            )),
            ErrorImpl::TypeMismatch { expected, received } => ErrorTip::Suggestion(format!(
                "Expected type `{}`, received `{}`",
                expected, received
            )),
            ErrorImpl::InvalidArguments { expected, received } => ErrorTip::Suggestion(format!(
                "Expected arguments ({}), received ({})",
                expected, received
            )),
            ErrorImpl::InvalidOperand { .. }
            | ErrorImpl::InvalidMemberAccess { .. }
            | ErrorImpl::ArrayDimensionError { .. }
            | ErrorImpl::NotAnArray { .. }
            | ErrorImpl::NotAPointer { .. }
            | ErrorImpl::NotAllocatable { .. }
            | ErrorImpl::InvalidCast { .. }
            | ErrorImpl::ReturnOutsideFunction
            | ErrorImpl::InferenceError { .. } => ErrorTip::None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} ({})",
            self.get_error_name(),
            self.internal_error,
            self.position
        )
    }
}

impl std::error::Error for Error {}

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

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    #[error("identifier {identifier:?} already declared in file {file:?}")]
    DuplicateDeclaration { identifier: String, file: String },
    #[error("{symbol:?} in file {file:?} is already declared in another file")]
    DuplicateGlobalSymbol { symbol: String, file: String },
    #[error("undeclared identifier {identifier:?}")]
    UndeclaredIdentifier { identifier: String },
    #[error("undefined function {function}({arguments})")]
    UndefinedFunction { function: String, arguments: String },
    #[error("unknown type {type_}")]
    UnknownType { type_: String },
    #[error("type {type_} must be declared at the top level of a file")]
    NestedTypeDeclaration { type_: String },
    #[error("cannot apply {operator} to operand of type {operand}")]
    InvalidOperand { operator: String, operand: String },
    #[error("cannot apply operation on types {left} and {right}")]
    InvalidOperandTypes { left: String, right: String },
    #[error("invalid member access {member:?} on {type_}")]
    InvalidMemberAccess { member: String, type_: String },
    #[error("cannot access dimension {dimension} of {array_type}")]
    ArrayDimensionError { array_type: String, dimension: usize },
    #[error("{type_} is not an array type")]
    NotAnArray { type_: String },
    #[error("cannot dereference non-pointer type {type_}")]
    NotAPointer { type_: String },
    #[error("cannot allocate {type_}: {reason}")]
    NotAllocatable { type_: String, reason: String },
    #[error("{construct} is not allowed in a constant expression")]
    NotConstant { construct: String },
    #[error("cannot cast type {from} to {to}")]
    InvalidCast { from: String, to: String },
    #[error("invalid function arguments: expected ({expected}), received ({received})")]
    InvalidArguments { expected: String, received: String },
    #[error("types do not match: expected {expected}, received {received}")]
    TypeMismatch { expected: String, received: String },
    #[error("cannot assign to constant {identifier:?}")]
    AssignToConstant { identifier: String },
    #[error("return statement outside of a function")]
    ReturnOutsideFunction,
    #[error("cannot infer type of {identifier:?}: {reason}")]
    InferenceError { identifier: String, reason: String },
}
