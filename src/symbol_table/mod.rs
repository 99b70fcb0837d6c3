//! Symbol tables for every file of a program.
//!
//! This module is the first semantic pass. It walks each file once and
//! records:
//!
//! - Every scope, with its parent
//! - Every variable, constant, parameter and function, with its scope and
//!   position
//! - Every struct and enum declared at the root of a file
//! - The declarations whose type has to be inferred later
//!
//! The [`manager::SymbolTableManager`] merges the per-file tables and
//! resolves names across `#load` dependencies.

pub mod generator;
pub mod manager;
pub mod symbol_table;
pub mod walker;

#[cfg(test)]
mod tests;
