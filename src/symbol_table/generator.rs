use std::sync::Arc;

use crate::{
    ast::{
        ast::{Expr, SourceFile, Stmt, StmtKind},
        builder,
        statements::{BlockStmt, EnumDeclStmt, FnDeclStmt, StructDeclStmt},
        types::TypeAst,
    },
    errors::errors::{Error, ErrorImpl},
    Position,
};

use super::{
    symbol_table::{
        CustomTypeInfo, IdentifierInfo, IdentifierLocation, ScopeInfo, SymbolTable, TypeKind,
        ROOT_SCOPE,
    },
    walker::ScopeWalker,
};

/// Name given to a loop variable the source leaves out.
pub const DEFAULT_LOOP_VARIABLE: &str = "it";

/// A declaration whose type must be computed from its initializer.
#[derive(Debug, Clone)]
pub struct IdentExpr {
    pub file: Arc<String>,
    pub location: IdentifierLocation,
    pub expression: Expr,
}

/// Everything one file contributes to the program-wide tables.
#[derive(Debug)]
pub struct GeneratedSymbolTable {
    pub symbol_table: SymbolTable,
    /// In traversal order.
    pub identifiers_to_be_inferred: Vec<IdentExpr>,
    /// Root-scope identifiers, exported to every other file.
    pub global_identifiers: Vec<(String, Position)>,
    /// Root-scope structs and enums.
    pub global_types: Vec<(String, Position)>,
}

/// Builds the symbol table of one file.
///
/// Files are independent of each other at this stage, which is what allows
/// the manager to run one generator per file in parallel.
pub struct SymbolTableGenerator {
    path: Arc<String>,
    walker: ScopeWalker,
    generated: GeneratedSymbolTable,
}

impl SymbolTableGenerator {
    pub fn new(file: &SourceFile) -> Self {
        let mut symbol_table = SymbolTable::new(
            Arc::clone(&file.path),
            file.root.file_dependencies.clone(),
        );
        symbol_table.add_scope(ScopeInfo {
            id: ROOT_SCOPE,
            parent: None,
        });

        SymbolTableGenerator {
            path: Arc::clone(&file.path),
            walker: ScopeWalker::new(),
            generated: GeneratedSymbolTable {
                symbol_table,
                identifiers_to_be_inferred: vec![],
                global_identifiers: vec![],
                global_types: vec![],
            },
        }
    }

    #[tracing::instrument(level = "debug", skip_all, fields(file = %file.path))]
    pub fn generate(file: &SourceFile) -> Result<GeneratedSymbolTable, Error> {
        let mut generator = SymbolTableGenerator::new(file);
        generator.visit_elements(&file.root.elements)?;

        tracing::debug!(
            pending = generator.generated.identifiers_to_be_inferred.len(),
            globals = generator.generated.global_identifiers.len(),
            "symbol table generated"
        );
        Ok(generator.generated)
    }

    fn visit_elements(&mut self, elements: &[Stmt]) -> Result<(), Error> {
        for element in elements {
            self.walker.advance();
            self.visit_stmt(element)?;
        }
        Ok(())
    }

    fn visit_block(&mut self, block: &BlockStmt) -> Result<(), Error> {
        let scope = self.walker.enter_scope();
        self.generated.symbol_table.add_scope(scope);
        self.visit_elements(&block.body)?;
        self.walker.exit_scope();
        Ok(())
    }

    fn visit_stmt(&mut self, stmt: &Stmt) -> Result<(), Error> {
        let declared_at = &stmt.span.start;

        match &stmt.kind {
            StmtKind::Block(block) => self.visit_block(block),
            StmtKind::VarDecl(var_decl) => self.declare(
                &var_decl.identifier,
                Some(var_decl.explicit_type.clone()),
                declared_at,
            ),
            StmtKind::VarDeclAssign(var_decl) => match &var_decl.explicit_type {
                Some(explicit_type) => self.declare(
                    &var_decl.identifier,
                    Some(explicit_type.clone()),
                    declared_at,
                ),
                None => {
                    self.declare(&var_decl.identifier, None, declared_at)?;
                    self.queue_inference(&var_decl.identifier, &var_decl.assigned_value);
                    Ok(())
                }
            },
            StmtKind::ConstDecl(const_decl) => {
                let identifier = self
                    .identifier(&const_decl.identifier, None, declared_at)
                    .constant();
                self.add_identifier(identifier)?;
                self.queue_inference(&const_decl.identifier, &const_decl.assigned_value);
                Ok(())
            }
            StmtKind::Function(function) => self.visit_function(function, declared_at),
            StmtKind::Struct(struct_decl) => self.visit_struct(struct_decl, declared_at),
            StmtKind::Enum(enum_decl) => self.visit_enum(enum_decl, declared_at),
            StmtKind::If(if_stmt) => {
                self.visit_stmt(&if_stmt.then_body)?;
                if let Some(else_body) = &if_stmt.else_body {
                    self.visit_stmt(else_body)?;
                }
                Ok(())
            }
            StmtKind::While(while_stmt) => self.visit_block(&while_stmt.body),
            StmtKind::DoWhile(do_while) => self.visit_block(&do_while.body),
            StmtKind::For(for_stmt) => {
                self.visit_loop(&for_stmt.variable, &for_stmt.from, &for_stmt.body, declared_at)
            }
            StmtKind::Foreach(foreach) => {
                let first_element = builder::index(foreach.array.clone(), vec![builder::num(0)]);
                self.visit_loop(&foreach.variable, &first_element, &foreach.body, declared_at)
            }
            StmtKind::Defer(defer) => self.visit_stmt(&defer.deferred),
            StmtKind::Assign(_)
            | StmtKind::MemberAssign(_)
            | StmtKind::ArrayAssign(_)
            | StmtKind::Expression(_)
            | StmtKind::Return(_)
            | StmtKind::Delete(_)
            | StmtKind::Break
            | StmtKind::Continue => Ok(()),
        }
    }

    fn visit_function(&mut self, function: &FnDeclStmt, declared_at: &Position) -> Result<(), Error> {
        let prototype = &function.prototype;
        self.declare(
            &prototype.identifier,
            Some(prototype.function_type()),
            declared_at,
        )?;

        // A bare prototype has no scope for its parameters to live in.
        let Some(body) = &function.body else {
            return Ok(());
        };

        let scope = self.walker.enter_scope();
        self.generated.symbol_table.add_scope(scope);

        for (index, parameter) in prototype.parameters.iter().enumerate() {
            self.walker.advance();
            let identifier = self
                .identifier(
                    &parameter.name,
                    Some(parameter.parameter_type.clone()),
                    declared_at,
                )
                .parameter(index);
            self.add_identifier(identifier)?;
        }

        self.visit_elements(&body.body)?;
        self.walker.exit_scope();
        Ok(())
    }

    /// Declares the loop variable inside the body scope, typed from `initializer`.
    fn visit_loop(
        &mut self,
        variable: &Option<String>,
        initializer: &Expr,
        body: &BlockStmt,
        declared_at: &Position,
    ) -> Result<(), Error> {
        let name = variable.as_deref().unwrap_or(DEFAULT_LOOP_VARIABLE);

        let scope = self.walker.enter_scope();
        self.generated.symbol_table.add_scope(scope);

        self.declare(name, None, declared_at)?;
        self.queue_inference(name, initializer);

        self.visit_elements(&body.body)?;
        self.walker.exit_scope();
        Ok(())
    }

    fn visit_struct(&mut self, struct_decl: &StructDeclStmt, declared_at: &Position) -> Result<(), Error> {
        let mut members = Vec::with_capacity(struct_decl.members.len());
        for member in &struct_decl.members {
            if members.iter().any(|(name, _)| name == &member.name) {
                return Err(self.duplicate(&member.name, declared_at));
            }
            members.push((member.name.clone(), member.member_type.clone()));
        }

        self.declare_type(&struct_decl.name, TypeKind::Struct, members, declared_at)
    }

    fn visit_enum(&mut self, enum_decl: &EnumDeclStmt, declared_at: &Position) -> Result<(), Error> {
        let enum_type = builder::ty(&enum_decl.name);

        let mut members = Vec::with_capacity(enum_decl.values.len());
        for value in &enum_decl.values {
            if members.iter().any(|(name, _)| name == &value.name) {
                return Err(self.duplicate(&value.name, declared_at));
            }
            members.push((value.name.clone(), enum_type.clone()));
        }

        self.declare_type(&enum_decl.name, TypeKind::Enum, members, declared_at)
    }

    fn declare_type(
        &mut self,
        name: &str,
        kind: TypeKind,
        members: Vec<(String, TypeAst)>,
        declared_at: &Position,
    ) -> Result<(), Error> {
        if self.walker.current_scope() != ROOT_SCOPE {
            return Err(Error::new(
                ErrorImpl::NestedTypeDeclaration {
                    type_: name.to_string(),
                },
                declared_at.clone(),
            ));
        }

        self.generated.symbol_table.add_type(CustomTypeInfo {
            name: name.to_string(),
            kind,
            scope_id: ROOT_SCOPE,
            position: self.walker.position(),
            members,
            declared_at: declared_at.clone(),
        })?;
        self.generated
            .global_types
            .push((name.to_string(), declared_at.clone()));
        Ok(())
    }

    fn identifier(
        &self,
        name: &str,
        type_ast: Option<TypeAst>,
        declared_at: &Position,
    ) -> IdentifierInfo {
        IdentifierInfo::new(
            name,
            type_ast,
            self.walker.position(),
            self.walker.current_scope(),
            Arc::clone(&self.path),
            declared_at.clone(),
        )
    }

    fn declare(
        &mut self,
        name: &str,
        type_ast: Option<TypeAst>,
        declared_at: &Position,
    ) -> Result<(), Error> {
        let identifier = self.identifier(name, type_ast, declared_at);
        self.add_identifier(identifier)
    }

    fn add_identifier(&mut self, identifier: IdentifierInfo) -> Result<(), Error> {
        if identifier.scope_id == ROOT_SCOPE {
            self.generated
                .global_identifiers
                .push((identifier.name.clone(), identifier.declared_at.clone()));
        }

        tracing::trace!(
            name = %identifier.name,
            scope = identifier.scope_id,
            position = identifier.position,
            "declared"
        );
        self.generated.symbol_table.add_identifier(identifier)
    }

    fn queue_inference(&mut self, name: &str, expression: &Expr) {
        self.generated.identifiers_to_be_inferred.push(IdentExpr {
            file: Arc::clone(&self.path),
            location: IdentifierLocation::new(name, self.walker.current_scope()),
            expression: expression.clone(),
        });
    }

    fn duplicate(&self, name: &str, declared_at: &Position) -> Error {
        Error::new(
            ErrorImpl::DuplicateDeclaration {
                identifier: name.to_string(),
                file: self.path.to_string(),
            },
            declared_at.clone(),
        )
    }
}
