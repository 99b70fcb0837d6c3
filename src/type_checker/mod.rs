//! Type inference and type checking.
//!
//! This module runs after the symbol tables are built. It:
//!
//! - Computes the type of any expression ([`expr_type`])
//! - Promotes operands of arithmetic operators and validates casts
//! - Infers the type of every declaration without an annotation
//! - Checks assignments, conditions, loop headers and returns against the
//!   declared types
//!
//! Inference and checking never rebuild the tree. Inferred types are written
//! into the symbol tables in place.

pub mod expr_type;
pub mod inferer;
pub mod promotion;
pub mod type_checker;
