use std::sync::Arc;

use crate::{
    ast::{
        ast::{Expr, SourceFile, Stmt, StmtKind},
        expressions::{BinaryExpr, VariableExpr},
        statements::{BlockStmt, FnDeclStmt, ReturnStmt},
        types::{ArrayKind, Primitive, TypeAst},
    },
    errors::errors::{Error, ErrorImpl},
    symbol_table::{manager::SymbolTableManager, walker::ScopeWalker},
    Position,
};

use super::expr_type::{ExprTypeVisitor, VisitContext};

/// Per-file state of the checker.
struct FileState {
    path: Arc<String>,
    walker: ScopeWalker,
    /// Return type of each enclosing function, innermost last.
    return_types: Vec<TypeAst>,
}

/// Validates every statement of every file once all types are known.
pub struct TypeChecker<'m> {
    manager: &'m SymbolTableManager,
    visitor: ExprTypeVisitor<'m>,
}

impl<'m> TypeChecker<'m> {
    pub fn new(manager: &'m SymbolTableManager) -> Self {
        TypeChecker {
            manager,
            visitor: ExprTypeVisitor::new(manager),
        }
    }

    #[tracing::instrument(level = "debug", skip_all)]
    pub fn type_check(&self) -> Result<(), Error> {
        for file in &self.manager.program().files {
            self.check_file(file)?;
        }
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip_all, fields(file = %file.path))]
    fn check_file(&self, file: &SourceFile) -> Result<(), Error> {
        let mut state = FileState {
            path: Arc::clone(&file.path),
            walker: ScopeWalker::new(),
            return_types: vec![],
        };

        self.check_elements(&mut state, &file.root.elements)
    }

    fn check_elements(&self, state: &mut FileState, elements: &[Stmt]) -> Result<(), Error> {
        for element in elements {
            state.walker.advance();
            self.check_stmt(state, element)?;
        }
        Ok(())
    }

    fn check_block(&self, state: &mut FileState, block: &BlockStmt) -> Result<(), Error> {
        state.walker.enter_scope();
        self.check_elements(state, &block.body)?;
        state.walker.exit_scope();
        Ok(())
    }

    fn context<'c>(&self, state: &'c FileState, origin: &'c Position) -> VisitContext<'c> {
        VisitContext {
            file: &state.path,
            scope_id: state.walker.current_scope(),
            position: state.walker.position(),
            is_const: false,
            origin,
        }
    }

    fn expr_type(&self, state: &FileState, origin: &Position, expr: &Expr) -> Result<TypeAst, Error> {
        self.visitor.get_expr_type(&self.context(state, origin), expr)
    }

    fn check_stmt(&self, state: &mut FileState, stmt: &Stmt) -> Result<(), Error> {
        let origin = &stmt.span.start;

        match &stmt.kind {
            StmtKind::Block(block) => self.check_block(state, block),
            StmtKind::VarDecl(var_decl) => {
                self.check_declared_type(state, origin, &var_decl.explicit_type)
            }
            StmtKind::VarDeclAssign(var_decl) => {
                // Declarations without a type were checked by inference.
                let Some(explicit_type) = &var_decl.explicit_type else {
                    return Ok(());
                };

                self.check_declared_type(state, origin, explicit_type)?;
                let value = self.expr_type(state, origin, &var_decl.assigned_value)?;
                expect_assignable(origin, explicit_type, &value)
            }
            StmtKind::ConstDecl(_) => Ok(()),
            StmtKind::Function(function) => self.check_function(state, origin, function),
            StmtKind::Struct(struct_decl) => {
                for member in &struct_decl.members {
                    self.check_known_type(state, origin, &member.member_type)?;
                    if let Some(default_value) = &member.default_value {
                        let value = self.expr_type(state, origin, default_value)?;
                        expect_assignable(origin, &member.member_type, &value)?;
                    }
                }
                Ok(())
            }
            StmtKind::Enum(enum_decl) => {
                let context = VisitContext {
                    is_const: true,
                    ..self.context(state, origin)
                };
                for value in enum_decl.values.iter().filter_map(|value| value.value.as_ref()) {
                    let value_type = self.visitor.get_expr_type(&context, value)?;
                    expect_integer(origin, &value_type)?;
                }
                Ok(())
            }
            StmtKind::Assign(assign) => {
                let context = self.context(state, origin);
                let Some(identifier) = self.manager.lookup_identifier_info(
                    context.file,
                    &assign.identifier,
                    context.scope_id,
                    context.position,
                    false,
                ) else {
                    return Err(Error::new(
                        ErrorImpl::UndeclaredIdentifier {
                            identifier: assign.identifier.clone(),
                        },
                        origin.clone(),
                    ));
                };

                if identifier.is_constant {
                    return Err(Error::new(
                        ErrorImpl::AssignToConstant {
                            identifier: assign.identifier.clone(),
                        },
                        origin.clone(),
                    ));
                }

                let Some(target) = identifier.type_ast() else {
                    return Err(Error::new(
                        ErrorImpl::InferenceError {
                            identifier: assign.identifier.clone(),
                            reason: String::from("type has not been inferred"),
                        },
                        origin.clone(),
                    ));
                };

                let value = match assign.operator.binary_operator() {
                    Some(operator) => {
                        let combined = Expr::Binary(BinaryExpr {
                            left: Box::new(Expr::Variable(VariableExpr {
                                name: assign.identifier.clone(),
                            })),
                            operator,
                            right: Box::new(assign.value.clone()),
                        });
                        self.visitor.get_expr_type(&context, &combined)?
                    }
                    None => self.visitor.get_expr_type(&context, &assign.value)?,
                };
                expect_assignable(origin, target, &value)
            }
            StmtKind::MemberAssign(member_assign) => {
                let target = self.expr_type(
                    state,
                    origin,
                    &Expr::MemberAccess(member_assign.target.clone()),
                )?;
                let value = self.expr_type(state, origin, &member_assign.value)?;
                expect_assignable(origin, &target, &value)
            }
            StmtKind::ArrayAssign(array_assign) => {
                let target = self.expr_type(
                    state,
                    origin,
                    &Expr::ArrayAccess(array_assign.target.clone()),
                )?;
                let value = self.expr_type(state, origin, &array_assign.value)?;
                expect_assignable(origin, &target, &value)
            }
            StmtKind::Expression(expression) => {
                self.expr_type(state, origin, &expression.expression)?;
                Ok(())
            }
            StmtKind::If(if_stmt) => {
                let condition = self.expr_type(state, origin, &if_stmt.condition)?;
                expect_bool(origin, &condition)?;

                self.check_stmt(state, &if_stmt.then_body)?;
                if let Some(else_body) = &if_stmt.else_body {
                    self.check_stmt(state, else_body)?;
                }
                Ok(())
            }
            StmtKind::While(while_stmt) => {
                let condition = self.expr_type(state, origin, &while_stmt.condition)?;
                expect_bool(origin, &condition)?;
                self.check_block(state, &while_stmt.body)
            }
            StmtKind::DoWhile(do_while) => {
                self.check_block(state, &do_while.body)?;
                let condition = self.expr_type(state, origin, &do_while.condition)?;
                expect_bool(origin, &condition)
            }
            StmtKind::For(for_stmt) => {
                let from = self.expr_type(state, origin, &for_stmt.from)?;
                expect_integer(origin, &from)?;
                let to = self.expr_type(state, origin, &for_stmt.to)?;
                expect_integer(origin, &to)?;
                self.check_block(state, &for_stmt.body)
            }
            StmtKind::Foreach(foreach) => {
                let array = self.expr_type(state, origin, &foreach.array)?;
                if !array.is_array() {
                    return Err(Error::new(
                        ErrorImpl::NotAnArray {
                            type_: array.to_string(),
                        },
                        origin.clone(),
                    ));
                }
                self.check_block(state, &foreach.body)
            }
            StmtKind::Return(return_stmt) => self.check_return(state, origin, return_stmt),
            StmtKind::Delete(delete) => {
                let context = self.context(state, origin);
                match self.manager.lookup_identifier_info(
                    context.file,
                    &delete.identifier,
                    context.scope_id,
                    context.position,
                    false,
                ) {
                    Some(_) => Ok(()),
                    None => Err(Error::new(
                        ErrorImpl::UndeclaredIdentifier {
                            identifier: delete.identifier.clone(),
                        },
                        origin.clone(),
                    )),
                }
            }
            StmtKind::Defer(defer) => self.check_stmt(state, &defer.deferred),
            StmtKind::Break | StmtKind::Continue => Ok(()),
        }
    }

    fn check_function(
        &self,
        state: &mut FileState,
        origin: &Position,
        function: &FnDeclStmt,
    ) -> Result<(), Error> {
        let prototype = &function.prototype;
        for parameter in &prototype.parameters {
            self.check_declared_type(state, origin, &parameter.parameter_type)?;
        }
        self.check_known_type(state, origin, &prototype.return_type)?;

        let Some(body) = &function.body else {
            return Ok(());
        };

        state.walker.enter_scope();
        for _ in &prototype.parameters {
            state.walker.advance();
        }

        state.return_types.push(prototype.return_type.clone());
        let result = self.check_elements(state, &body.body);
        state.return_types.pop();
        state.walker.exit_scope();
        result
    }

    fn check_return(
        &self,
        state: &FileState,
        origin: &Position,
        return_stmt: &ReturnStmt,
    ) -> Result<(), Error> {
        let Some(return_type) = state.return_types.last() else {
            return Err(Error::new(ErrorImpl::ReturnOutsideFunction, origin.clone()));
        };

        let value = match &return_stmt.value {
            Some(value) => self.expr_type(state, origin, value)?,
            None => Primitive::Void.into(),
        };

        if return_type.is(Primitive::Void) {
            // Not even a call that itself returns void.
            return match return_stmt.value {
                None => Ok(()),
                Some(_) => Err(Error::new(
                    ErrorImpl::TypeMismatch {
                        expected: String::from("no return value"),
                        received: value.to_string(),
                    },
                    origin.clone(),
                )),
            };
        }

        if return_type.accepts_value_of(&value) || is_array_widening(return_type, &value) {
            Ok(())
        } else {
            Err(type_mismatch(origin, return_type, &value))
        }
    }

    /// A variable or parameter type: known, and not `void`.
    fn check_declared_type(
        &self,
        state: &FileState,
        origin: &Position,
        declared: &TypeAst,
    ) -> Result<(), Error> {
        if declared.is(Primitive::Void) {
            return Err(Error::new(
                ErrorImpl::TypeMismatch {
                    expected: String::from("a non-void type"),
                    received: declared.to_string(),
                },
                origin.clone(),
            ));
        }
        self.check_known_type(state, origin, declared)
    }

    /// Every struct or enum named inside `type_ast` must be visible.
    fn check_known_type(
        &self,
        state: &FileState,
        origin: &Position,
        type_ast: &TypeAst,
    ) -> Result<(), Error> {
        match type_ast {
            TypeAst::Named(name) => match self.manager.lookup_type_info(&state.path, name) {
                Some(_) => Ok(()),
                None => Err(Error::new(
                    ErrorImpl::UnknownType {
                        type_: name.clone(),
                    },
                    origin.clone(),
                )),
            },
            TypeAst::Array(array) => self.check_known_type(state, origin, &array.element),
            TypeAst::Pointer(pointee) => self.check_known_type(state, origin, pointee),
            TypeAst::Function(function) => {
                for argument in &function.arguments {
                    self.check_known_type(state, origin, argument)?;
                }
                self.check_known_type(state, origin, &function.return_type)
            }
            TypeAst::Primitive(_) | TypeAst::Null => Ok(()),
        }
    }
}

/// `[] T` accepts a static or dynamic array of the same element type.
fn is_array_widening(target: &TypeAst, value: &TypeAst) -> bool {
    match (target, value) {
        (TypeAst::Array(target), TypeAst::Array(value)) => {
            target.kind == ArrayKind::Unsized && target.element == value.element
        }
        _ => false,
    }
}

fn type_mismatch(origin: &Position, expected: &TypeAst, received: &TypeAst) -> Error {
    Error::new(
        ErrorImpl::TypeMismatch {
            expected: expected.to_string(),
            received: received.to_string(),
        },
        origin.clone(),
    )
}

fn expect_assignable(origin: &Position, target: &TypeAst, value: &TypeAst) -> Result<(), Error> {
    if target.accepts_value_of(value) {
        Ok(())
    } else {
        Err(type_mismatch(origin, target, value))
    }
}

fn expect_bool(origin: &Position, condition: &TypeAst) -> Result<(), Error> {
    expect_assignable(origin, &Primitive::Bool.into(), condition)
}

fn expect_integer(origin: &Position, value: &TypeAst) -> Result<(), Error> {
    if value.is_integer() {
        Ok(())
    } else {
        Err(Error::new(
            ErrorImpl::TypeMismatch {
                expected: String::from("integer"),
                received: value.to_string(),
            },
            origin.clone(),
        ))
    }
}
