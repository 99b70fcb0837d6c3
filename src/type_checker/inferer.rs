use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
};

use crate::{
    ast::types::{Primitive, TypeAst},
    errors::errors::{Error, ErrorImpl},
    symbol_table::{
        generator::IdentExpr,
        manager::SymbolTableManager,
        symbol_table::{IdentifierInfo, IdentifierLocation},
    },
    Position,
};

use super::expr_type::{ExprTypeVisitor, PendingTypeResolver, VisitContext};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PendingKey {
    file: String,
    location: IdentifierLocation,
}

impl PendingKey {
    fn of(identifier: &IdentifierInfo) -> Self {
        PendingKey {
            file: identifier.file().to_string(),
            location: identifier.location(),
        }
    }
}

/// Types every declaration that was written without a type annotation.
///
/// Declarations are processed in worklist order. When an initializer refers
/// to a declaration that is still untyped, that declaration is inferred
/// first, so order in the source does not matter. A declaration whose
/// initializer depends on itself is rejected.
pub struct TypeInferer<'m> {
    manager: &'m SymbolTableManager,
    pending: HashMap<PendingKey, usize>,
    in_progress: RefCell<HashSet<usize>>,
}

impl<'m> TypeInferer<'m> {
    pub fn new(manager: &'m SymbolTableManager) -> Self {
        let pending = manager
            .identifiers_to_be_inferred()
            .iter()
            .enumerate()
            .map(|(index, ident_expr)| {
                let key = PendingKey {
                    file: ident_expr.file.to_string(),
                    location: ident_expr.location.clone(),
                };
                (key, index)
            })
            .collect();

        TypeInferer {
            manager,
            pending,
            in_progress: RefCell::new(HashSet::new()),
        }
    }

    #[tracing::instrument(level = "debug", skip_all, fields(
        pending = self.manager.identifiers_to_be_inferred().len()
    ))]
    pub fn infer_types(&self) -> Result<(), Error> {
        for (index, ident_expr) in self.manager.identifiers_to_be_inferred().iter().enumerate() {
            let identifier = self.identifier_info(ident_expr)?;
            if identifier.type_ast().is_some() {
                tracing::trace!(name = %identifier.name, "already inferred on demand");
                continue;
            }

            self.infer(index, identifier)?;
        }
        Ok(())
    }

    fn identifier_info(&self, ident_expr: &'m IdentExpr) -> Result<&'m IdentifierInfo, Error> {
        self.manager
            .get_identifier_info(&ident_expr.file, &ident_expr.location)
            .ok_or_else(|| {
                Error::new(
                    ErrorImpl::UndeclaredIdentifier {
                        identifier: ident_expr.location.name.clone(),
                    },
                    Position(0, ident_expr.file.clone()),
                )
            })
    }

    fn infer(&self, index: usize, identifier: &IdentifierInfo) -> Result<TypeAst, Error> {
        if !self.in_progress.borrow_mut().insert(index) {
            return Err(Error::new(
                ErrorImpl::InferenceError {
                    identifier: identifier.name.clone(),
                    reason: String::from("its initializer depends on itself"),
                },
                identifier.declared_at.clone(),
            ));
        }

        let result = self.infer_initializer(index, identifier);
        self.in_progress.borrow_mut().remove(&index);
        let inferred = result?;

        if inferred.is_null() || inferred.is(Primitive::Void) {
            return Err(Error::new(
                ErrorImpl::InferenceError {
                    identifier: identifier.name.clone(),
                    reason: format!("cannot declare a value of type {}", inferred),
                },
                identifier.declared_at.clone(),
            ));
        }

        tracing::trace!(name = %identifier.name, type_ = %inferred, "inferred");
        let stored = identifier.set_type(inferred.clone());
        debug_assert!(stored, "{} was typed twice", identifier.name);
        Ok(inferred)
    }

    fn infer_initializer(&self, index: usize, identifier: &IdentifierInfo) -> Result<TypeAst, Error> {
        let ident_expr = &self.manager.identifiers_to_be_inferred()[index];
        let context = VisitContext {
            file: &ident_expr.file,
            scope_id: identifier.scope_id,
            position: identifier.position,
            is_const: identifier.is_constant,
            origin: &identifier.declared_at,
        };

        ExprTypeVisitor::with_resolver(self.manager, self).get_expr_type(&context, &ident_expr.expression)
    }
}

impl PendingTypeResolver for TypeInferer<'_> {
    fn resolve_pending(&self, identifier: &IdentifierInfo) -> Result<TypeAst, Error> {
        if let Some(type_ast) = identifier.type_ast() {
            return Ok(type_ast.clone());
        }

        match self.pending.get(&PendingKey::of(identifier)) {
            Some(&index) => self.infer(index, identifier),
            None => Err(Error::new(
                ErrorImpl::InferenceError {
                    identifier: identifier.name.clone(),
                    reason: String::from("declaration has neither a type nor an initializer"),
                },
                identifier.declared_at.clone(),
            )),
        }
    }
}
