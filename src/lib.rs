#![allow(clippy::module_inception)]

use std::{fmt::Display, sync::Arc};

use crate::{
    ast::ast::Program,
    config::AnalysisOptions,
    errors::errors::Error,
    symbol_table::manager::SymbolTableManager,
    type_checker::{inferer::TypeInferer, type_checker::TypeChecker},
};

pub mod ast;
pub mod config;
pub mod errors;
pub mod symbol_table;
pub mod type_checker;

/// A byte offset into a source file, paired with the file's path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Position(pub u32, pub Arc<String>);

impl Position {
    pub fn null() -> Self {
        Position(0, Arc::new(String::from("<null>")))
    }

    pub fn file(&self) -> &str {
        &self.1
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.1, self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(file: &Arc<String>, start: u32, end: u32) -> Self {
        Span {
            start: Position(start, Arc::clone(file)),
            end: Position(end, Arc::clone(file)),
        }
    }

    pub fn null() -> Self {
        Span {
            start: Position::null(),
            end: Position::null(),
        }
    }
}

/// Runs the whole semantic front-end over a parsed program.
///
/// Symbol tables are generated and merged first, then every un-annotated
/// declaration is inferred, and finally the whole program is type checked.
/// The first error aborts the analysis. On success the returned manager is
/// read-only and every identifier it holds carries a concrete type.
#[tracing::instrument(level = "debug", skip_all, fields(files = program.files.len()))]
pub fn analyze(program: Program, options: &AnalysisOptions) -> Result<SymbolTableManager, Error> {
    let mut manager = SymbolTableManager::new(program);
    manager.generate_symbol_tables(options)?;
    tracing::debug!("symbol tables generated");

    TypeInferer::new(&manager).infer_types()?;
    tracing::debug!("type inference complete");

    TypeChecker::new(&manager).type_check()?;
    tracing::debug!("type checking complete");

    Ok(manager)
}
