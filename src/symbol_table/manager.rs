use std::collections::{HashMap, HashSet};

use rayon::prelude::*;

use crate::{
    ast::{ast::Program, types::TypeAst},
    config::AnalysisOptions,
    errors::errors::{Error, ErrorImpl},
    Position,
};

use super::{
    generator::{GeneratedSymbolTable, IdentExpr, SymbolTableGenerator},
    symbol_table::{
        CustomTypeInfo, IdentifierInfo, IdentifierLocation, NodePosition, ScopeId, SymbolTable,
        ROOT_SCOPE,
    },
};

/// Owns the program and one symbol table per file, and answers lookups
/// that may cross file boundaries.
///
/// A lookup first searches the asking file at the given scope and position.
/// It then follows the file's `#load` dependencies depth-first, in load
/// order, searching each loaded file at its root scope with the position
/// check disabled. Every file is searched at most once per lookup, so
/// dependency cycles terminate.
#[derive(Debug)]
pub struct SymbolTableManager {
    program: Program,
    symbol_tables: HashMap<String, SymbolTable>,
    identifiers_to_be_inferred: Vec<IdentExpr>,
}

impl SymbolTableManager {
    pub fn new(program: Program) -> Self {
        SymbolTableManager {
            program,
            symbol_tables: HashMap::new(),
            identifiers_to_be_inferred: vec![],
        }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn symbol_table(&self, file: &str) -> Option<&SymbolTable> {
        self.symbol_tables.get(file)
    }

    /// Declarations awaiting inference, file by file in discovery order.
    pub fn identifiers_to_be_inferred(&self) -> &[IdentExpr] {
        &self.identifiers_to_be_inferred
    }

    pub fn get_identifier_info(
        &self,
        file: &str,
        location: &IdentifierLocation,
    ) -> Option<&IdentifierInfo> {
        self.symbol_tables.get(file)?.get_identifier(location)
    }

    /// Whether every identifier of every file carries a type.
    pub fn is_fully_typed(&self) -> bool {
        self.symbol_tables
            .values()
            .flat_map(SymbolTable::identifiers)
            .all(|identifier| identifier.type_ast().is_some())
    }

    /// Builds every file's table and merges them.
    ///
    /// Root-scope identifiers and types are global: a name declared at the
    /// root of two different files is rejected, reported at the later file
    /// in discovery order.
    #[tracing::instrument(level = "debug", skip_all, fields(
        files = self.program.files.len(),
        parallel = options.parallel_generation,
    ))]
    pub fn generate_symbol_tables(&mut self, options: &AnalysisOptions) -> Result<(), Error> {
        let generated: Vec<Result<GeneratedSymbolTable, Error>> = if options.parallel_generation {
            self.program
                .files
                .par_iter()
                .map(SymbolTableGenerator::generate)
                .collect()
        } else {
            self.program
                .files
                .iter()
                .map(SymbolTableGenerator::generate)
                .collect()
        };

        let mut global_identifiers: HashSet<String> = HashSet::new();
        let mut global_types: HashSet<String> = HashSet::new();

        for result in generated {
            let generated = result?;
            let file = generated.symbol_table.file_path.to_string();

            check_globals(&mut global_identifiers, generated.global_identifiers, &file)?;
            check_globals(&mut global_types, generated.global_types, &file)?;

            self.identifiers_to_be_inferred
                .extend(generated.identifiers_to_be_inferred);
            self.symbol_tables.insert(file, generated.symbol_table);
        }

        tracing::debug!(
            tables = self.symbol_tables.len(),
            pending = self.identifiers_to_be_inferred.len(),
            "symbol tables merged"
        );
        Ok(())
    }

    pub fn lookup_identifier_info(
        &self,
        file: &str,
        identifier: &str,
        scope_id: ScopeId,
        position: NodePosition,
        is_constant: bool,
    ) -> Option<&IdentifierInfo> {
        self.search(file, |table, is_origin| {
            if is_origin {
                table.lookup_identifier_info(identifier, scope_id, position, is_constant)
            } else {
                table.lookup_identifier_info(identifier, ROOT_SCOPE, -1, is_constant)
            }
        })
    }

    pub fn lookup_function_info(
        &self,
        file: &str,
        identifier: &str,
        scope_id: ScopeId,
        arguments: &[TypeAst],
    ) -> Option<&IdentifierInfo> {
        self.search(file, |table, is_origin| {
            let scope_id = if is_origin { scope_id } else { ROOT_SCOPE };
            table.lookup_function_info(identifier, scope_id, arguments)
        })
    }

    pub fn lookup_type_info(&self, file: &str, type_name: &str) -> Option<&CustomTypeInfo> {
        self.search(file, |table, _| table.lookup_type_info(type_name))
    }

    fn search<'s, T>(
        &'s self,
        file: &str,
        find: impl Fn(&'s SymbolTable, bool) -> Option<T>,
    ) -> Option<T> {
        let table = self.symbol_tables.get(file)?;
        if let Some(found) = find(table, true) {
            return Some(found);
        }

        let mut processed: HashSet<&'s str> = HashSet::new();
        processed.insert(table.file_path.as_str());
        self.search_dependencies(table, &mut processed, &find)
    }

    fn search_dependencies<'s, T>(
        &'s self,
        table: &'s SymbolTable,
        processed: &mut HashSet<&'s str>,
        find: &impl Fn(&'s SymbolTable, bool) -> Option<T>,
    ) -> Option<T> {
        for dependency in &table.file_dependencies {
            if !processed.insert(dependency.as_str()) {
                continue;
            }

            let Some(dependency_table) = self.symbol_tables.get(dependency) else {
                tracing::trace!(%dependency, "dependency has no symbol table");
                continue;
            };

            if let Some(found) = find(dependency_table, false) {
                return Some(found);
            }
            if let Some(found) = self.search_dependencies(dependency_table, processed, find) {
                return Some(found);
            }
        }

        None
    }
}

fn check_globals(
    seen: &mut HashSet<String>,
    declared: Vec<(String, Position)>,
    file: &str,
) -> Result<(), Error> {
    for (symbol, position) in declared {
        if !seen.insert(symbol.clone()) {
            return Err(Error::new(
                ErrorImpl::DuplicateGlobalSymbol {
                    symbol,
                    file: file.to_string(),
                },
                position,
            ));
        }
    }
    Ok(())
}
