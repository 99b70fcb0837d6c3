//! Error types and error handling for the semantic front-end.
//!
//! This module defines the error types used throughout the analysis. It
//! includes:
//!
//! - Error structures with source position information
//! - Specific error variants for every pass (tables, inference, checking)
//! - Error formatting and display functionality
//! - Helpful error messages and suggestions

pub mod errors;

#[cfg(test)]
mod tests;
