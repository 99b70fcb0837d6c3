//! Unit tests for error handling.
//!
//! This module contains tests for error types and error reporting.

use crate::errors::errors::{Error, ErrorImpl, ErrorTip};
use crate::Position;
use std::sync::Arc;

fn at(offset: u32) -> Position {
    Position(offset, Arc::new("test.ryu".to_string()))
}

#[test]
fn test_error_creation() {
    let error = Error::new(
        ErrorImpl::UndeclaredIdentifier {
            identifier: "x".to_string(),
        },
        at(10),
    );

    assert_eq!(error.get_error_name(), "UndeclaredIdentifier");
}

#[test]
fn test_error_position() {
    let error = Error::new(
        ErrorImpl::DuplicateDeclaration {
            identifier: "x".to_string(),
            file: "test.ryu".to_string(),
        },
        at(42),
    );

    assert_eq!(error.get_position().0, 42);
    assert_eq!(error.get_position().file(), "test.ryu");
}

#[test]
fn test_type_mismatch_error() {
    let error = Error::new(
        ErrorImpl::TypeMismatch {
            expected: "s32".to_string(),
            received: "null".to_string(),
        },
        at(0),
    );

    assert_eq!(error.get_error_name(), "TypeMismatch");
    assert_eq!(
        error.get_tip().to_string(),
        "Expected type `s32`, received `null`"
    );
}

#[test]
fn test_duplicate_global_symbol_error() {
    let error = Error::new(
        ErrorImpl::DuplicateGlobalSymbol {
            symbol: "main".to_string(),
            file: "b.ryu".to_string(),
        },
        at(0),
    );

    assert_eq!(error.get_error_name(), "DuplicateGlobalSymbol");
    assert!(matches!(error.get_tip(), ErrorTip::Suggestion(_)));
}

#[test]
fn test_error_tip_none() {
    let error = Error::new(
        ErrorImpl::NotAPointer {
            type_: "s32".to_string(),
        },
        at(0),
    );

    assert!(matches!(error.get_tip(), ErrorTip::None));
}

#[test]
fn test_error_tip_display() {
    let tip = ErrorTip::Suggestion("Try this instead".to_string());
    assert_eq!(tip.to_string(), "Try this instead");

    let tip = ErrorTip::None;
    assert_eq!(tip.to_string(), "");
}

#[test]
fn test_error_display() {
    let error = Error::new(
        ErrorImpl::InvalidCast {
            from: "str".to_string(),
            to: "s32".to_string(),
        },
        at(7),
    );

    assert_eq!(
        error.to_string(),
        "InvalidCast: cannot cast type str to s32 (test.ryu:7)"
    );
}

#[test]
fn test_inference_error_kind() {
    let error = Error::new(
        ErrorImpl::InferenceError {
            identifier: "a".to_string(),
            reason: "cyclic initializer".to_string(),
        },
        at(0),
    );

    assert!(matches!(
        error.kind(),
        ErrorImpl::InferenceError { identifier, .. } if identifier == "a"
    ));
}
