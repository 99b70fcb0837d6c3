use crate::{
    ast::{
        ast::Expr,
        expressions::{
            ArrayAccessExpr, CallExpr, CastExpr, ConstantKeyword, MemberAccessExpr, UnaryOperator,
        },
        types::{Primitive, TypeAst},
    },
    errors::errors::{Error, ErrorImpl},
    symbol_table::{
        manager::SymbolTableManager,
        symbol_table::{CustomTypeInfo, IdentifierInfo, NodePosition, ScopeId, TypeKind},
    },
    Position,
};

use super::promotion::{is_cast_allowed, promote, CastOperand};

/// Supplies the type of a declaration that has not been inferred yet.
///
/// The inferer implements this so that an initializer referring to a later
/// declaration triggers that declaration's inference on demand.
pub trait PendingTypeResolver {
    fn resolve_pending(&self, identifier: &IdentifierInfo) -> Result<TypeAst, Error>;
}

/// Where an expression is evaluated.
#[derive(Debug, Clone)]
pub struct VisitContext<'c> {
    pub file: &'c str,
    pub scope_id: ScopeId,
    pub position: NodePosition,
    /// Only constants and constant-safe constructs may appear.
    pub is_const: bool,
    /// Where errors are reported.
    pub origin: &'c Position,
}

/// The type a segment of a member chain is looked up in.
#[derive(Clone, Copy)]
struct MemberContext<'a> {
    custom_type: Option<&'a CustomTypeInfo>,
    /// Set on the first segment, which may name an enum instead of a value.
    look_for_enum: bool,
}

impl MemberContext<'_> {
    fn none() -> Self {
        MemberContext {
            custom_type: None,
            look_for_enum: false,
        }
    }
}

/// Computes the type of an expression without modifying anything.
pub struct ExprTypeVisitor<'a> {
    manager: &'a SymbolTableManager,
    resolver: Option<&'a dyn PendingTypeResolver>,
}

impl<'a> ExprTypeVisitor<'a> {
    /// A visitor for a fully inferred program. Reaching an un-inferred
    /// declaration is an error.
    pub fn new(manager: &'a SymbolTableManager) -> Self {
        ExprTypeVisitor {
            manager,
            resolver: None,
        }
    }

    pub fn with_resolver(
        manager: &'a SymbolTableManager,
        resolver: &'a dyn PendingTypeResolver,
    ) -> Self {
        ExprTypeVisitor {
            manager,
            resolver: Some(resolver),
        }
    }

    pub fn get_expr_type(&self, context: &VisitContext, expr: &Expr) -> Result<TypeAst, Error> {
        self.visit(context, expr, MemberContext::none())
    }

    fn error(&self, context: &VisitContext, error_impl: ErrorImpl) -> Error {
        Error::new(error_impl, context.origin.clone())
    }

    fn require_non_constant(&self, context: &VisitContext, construct: &str) -> Result<(), Error> {
        if context.is_const {
            return Err(self.error(
                context,
                ErrorImpl::NotConstant {
                    construct: construct.to_string(),
                },
            ));
        }
        Ok(())
    }

    fn visit(
        &self,
        context: &VisitContext,
        expr: &Expr,
        member: MemberContext<'a>,
    ) -> Result<TypeAst, Error> {
        match expr {
            Expr::Number(number) => Ok(number.explicit_type.unwrap_or(Primitive::S32).into()),
            Expr::HexNumber(number) => Ok(number.explicit_type.unwrap_or(Primitive::S32).into()),
            Expr::Float(number) => Ok(number.explicit_type.unwrap_or(Primitive::F32).into()),
            Expr::String(_) => Ok(Primitive::Str.into()),
            Expr::Constant(ConstantKeyword::Null) => Ok(TypeAst::Null),
            Expr::Constant(ConstantKeyword::True | ConstantKeyword::False) => {
                Ok(Primitive::Bool.into())
            }
            Expr::Variable(variable) => self.visit_variable(context, &variable.name, member),
            Expr::Binary(binary) => {
                let left = self.visit(context, &binary.left, MemberContext::none())?;
                let right = self.visit(context, &binary.right, MemberContext::none())?;

                if binary.operator.is_comparison() {
                    return Ok(Primitive::Bool.into());
                }

                let operator = binary.operator.symbol();
                let left = self.operand_primitive(context, operator, &left)?;
                let right = self.operand_primitive(context, operator, &right)?;
                promote(left, right)
                    .map(TypeAst::Primitive)
                    .map_err(|error_impl| self.error(context, error_impl))
            }
            Expr::Unary(unary) => {
                let operand = self.visit(context, &unary.operand, MemberContext::none())?;
                match unary.operator {
                    UnaryOperator::Not if !operand.is(Primitive::Bool) => Err(self.error(
                        context,
                        ErrorImpl::InvalidOperand {
                            operator: String::from("!"),
                            operand: operand.to_string(),
                        },
                    )),
                    _ => Ok(operand),
                }
            }
            Expr::Call(call) => {
                self.require_non_constant(context, "function call")?;
                self.visit_call(context, call, member)
            }
            Expr::ArrayAccess(array_access) => {
                self.require_non_constant(context, "array access")?;
                self.visit_array_access(context, array_access, member)
            }
            Expr::MemberAccess(member_access) => {
                self.require_non_constant(context, "member access")?;
                self.visit_member_access(context, member_access)
            }
            Expr::New(new) => {
                self.require_non_constant(context, "new")?;
                self.visit_new(context, &new.allocated_type)
            }
            Expr::Deref(deref) => {
                match self.visit(context, &deref.operand, MemberContext::none())? {
                    TypeAst::Pointer(pointee) => Ok(*pointee),
                    other => Err(self.error(
                        context,
                        ErrorImpl::NotAPointer {
                            type_: other.to_string(),
                        },
                    )),
                }
            }
            Expr::AddressOf(address_of) => Ok(TypeAst::pointer(self.visit(
                context,
                &address_of.operand,
                MemberContext::none(),
            )?)),
            Expr::Cast(cast) => self.visit_cast(context, cast),
        }
    }

    fn operand_primitive(
        &self,
        context: &VisitContext,
        operator: &str,
        operand: &TypeAst,
    ) -> Result<Primitive, Error> {
        operand.as_primitive().ok_or_else(|| {
            self.error(
                context,
                ErrorImpl::InvalidOperand {
                    operator: operator.to_string(),
                    operand: operand.to_string(),
                },
            )
        })
    }

    /// The type of an identifier that was found, inferring it if needed.
    fn identifier_type(
        &self,
        context: &VisitContext,
        identifier: &IdentifierInfo,
    ) -> Result<TypeAst, Error> {
        if let Some(type_ast) = identifier.type_ast() {
            return Ok(type_ast.clone());
        }

        match self.resolver {
            Some(resolver) => resolver.resolve_pending(identifier),
            None => Err(self.error(
                context,
                ErrorImpl::InferenceError {
                    identifier: identifier.name.clone(),
                    reason: String::from("type has not been inferred"),
                },
            )),
        }
    }

    fn visit_variable(
        &self,
        context: &VisitContext,
        name: &str,
        member: MemberContext<'a>,
    ) -> Result<TypeAst, Error> {
        if let Some(custom_type) = member.custom_type {
            return match custom_type.member_type(name) {
                Some(member_type) => Ok(member_type.clone()),
                None => Err(self.error(
                    context,
                    ErrorImpl::InvalidMemberAccess {
                        member: name.to_string(),
                        type_: custom_type.name.clone(),
                    },
                )),
            };
        }

        let identifier = self.manager.lookup_identifier_info(
            context.file,
            name,
            context.scope_id,
            context.position,
            context.is_const,
        );

        match identifier {
            Some(identifier) => self.identifier_type(context, identifier),
            None => {
                if member.look_for_enum {
                    if let Some(enum_type) = self
                        .manager
                        .lookup_type_info(context.file, name)
                        .filter(|custom_type| custom_type.kind == TypeKind::Enum)
                    {
                        return Ok(enum_type.type_ast());
                    }
                }

                Err(self.error(
                    context,
                    ErrorImpl::UndeclaredIdentifier {
                        identifier: name.to_string(),
                    },
                ))
            }
        }
    }

    fn visit_call(
        &self,
        context: &VisitContext,
        call: &CallExpr,
        member: MemberContext<'a>,
    ) -> Result<TypeAst, Error> {
        let arguments = call
            .arguments
            .iter()
            .map(|argument| self.visit(context, argument, MemberContext::none()))
            .collect::<Result<Vec<TypeAst>, Error>>()?;

        match call.callee.as_ref() {
            Expr::Variable(variable) if member.custom_type.is_none() => {
                let Some(function) = self.manager.lookup_function_info(
                    context.file,
                    &variable.name,
                    context.scope_id,
                    &arguments,
                ) else {
                    return Err(self.error(
                        context,
                        ErrorImpl::UndefinedFunction {
                            function: variable.name.clone(),
                            arguments: join_types(&arguments),
                        },
                    ));
                };

                let function_type = self.identifier_type(context, function)?;
                self.call_result(context, &function_type, &arguments)
            }
            callee => {
                // Function pointers held in arrays, struct members or behind
                // other expressions are matched against their own signature.
                let function_type = self.visit(context, callee, member)?;
                self.call_result(context, &function_type, &arguments)
            }
        }
    }

    fn call_result(
        &self,
        context: &VisitContext,
        callee: &TypeAst,
        arguments: &[TypeAst],
    ) -> Result<TypeAst, Error> {
        let Some(function) = callee.as_function() else {
            return Err(self.error(
                context,
                ErrorImpl::TypeMismatch {
                    expected: String::from("function"),
                    received: callee.to_string(),
                },
            ));
        };

        if !function.accepts(arguments) {
            return Err(self.error(
                context,
                ErrorImpl::InvalidArguments {
                    expected: join_types(&function.arguments),
                    received: join_types(arguments),
                },
            ));
        }

        Ok((*function.return_type).clone())
    }

    fn visit_array_access(
        &self,
        context: &VisitContext,
        array_access: &ArrayAccessExpr,
        member: MemberContext<'a>,
    ) -> Result<TypeAst, Error> {
        let array_type = self.visit(context, &array_access.array, member)?;

        for index in &array_access.indices {
            let index_type = self.visit(context, index, MemberContext::none())?;
            if !index_type.is_integer() {
                return Err(self.error(
                    context,
                    ErrorImpl::TypeMismatch {
                        expected: String::from("integer"),
                        received: index_type.to_string(),
                    },
                ));
            }
        }

        if !array_type.is_array() {
            return Err(self.error(
                context,
                ErrorImpl::NotAnArray {
                    type_: array_type.to_string(),
                },
            ));
        }

        let dimensions = array_access.indices.len();
        match array_type.element_type(dimensions) {
            Some(element) => Ok(element.clone()),
            None => Err(self.error(
                context,
                ErrorImpl::ArrayDimensionError {
                    array_type: array_type.to_string(),
                    dimension: dimensions,
                },
            )),
        }
    }

    /// Walks `a.b.c` left to right. Every segment but the last must have a
    /// struct or enum type, which the next segment is looked up in.
    fn visit_member_access(
        &self,
        context: &VisitContext,
        member_access: &MemberAccessExpr,
    ) -> Result<TypeAst, Error> {
        let mut custom_type: Option<&'a CustomTypeInfo> = None;
        let mut segment_type = None;
        let last = member_access.segments.len().saturating_sub(1);

        for (index, segment) in member_access.segments.iter().enumerate() {
            let member = MemberContext {
                custom_type,
                look_for_enum: index == 0,
            };
            let current = self.visit(context, segment, member)?;

            if index != last {
                let next = member_access.segments.get(index + 1);
                let Some(type_info) = self.manager.lookup_type_info(context.file, &current.canonical())
                else {
                    return Err(self.invalid_member(context, next, &current));
                };

                // Enum values are reached through the enum's name only.
                if type_info.kind == TypeKind::Enum && segment_name(segment) != Some(&type_info.name)
                {
                    return Err(self.invalid_member(context, next, &current));
                }

                custom_type = Some(type_info);
            }

            segment_type = Some(current);
        }

        segment_type.ok_or_else(|| {
            self.error(
                context,
                ErrorImpl::InvalidMemberAccess {
                    member: String::new(),
                    type_: String::from("empty member access"),
                },
            )
        })
    }

    fn invalid_member(&self, context: &VisitContext, next: Option<&Expr>, owner: &TypeAst) -> Error {
        self.error(
            context,
            ErrorImpl::InvalidMemberAccess {
                member: next
                    .and_then(segment_name)
                    .cloned()
                    .unwrap_or_default(),
                type_: owner.to_string(),
            },
        )
    }

    fn visit_new(&self, context: &VisitContext, allocated_type: &TypeAst) -> Result<TypeAst, Error> {
        let not_allocatable = |reason: &str| -> Result<TypeAst, Error> {
            Err(self.error(
                context,
                ErrorImpl::NotAllocatable {
                    type_: allocated_type.to_string(),
                    reason: reason.to_string(),
                },
            ))
        };

        if allocated_type.is_function() {
            return not_allocatable("functions cannot be allocated");
        }

        match allocated_type.innermost_element() {
            TypeAst::Pointer(_) => return not_allocatable("pointers cannot be allocated"),
            TypeAst::Primitive(Primitive::Void) => return not_allocatable("void has no size"),
            TypeAst::Null => return not_allocatable("null is not a type"),
            TypeAst::Named(name) => match self.manager.lookup_type_info(context.file, name) {
                Some(type_info) if type_info.kind == TypeKind::Struct => {}
                Some(_) => return not_allocatable("only structs can be allocated by name"),
                None => return not_allocatable("not a declared struct"),
            },
            TypeAst::Primitive(_) | TypeAst::Function(_) | TypeAst::Array(_) => {}
        }

        Ok(TypeAst::pointer(allocated_type.clone()))
    }

    fn visit_cast(&self, context: &VisitContext, cast: &CastExpr) -> Result<TypeAst, Error> {
        let source = self.visit(context, &cast.expression, MemberContext::none())?;
        let target = &cast.target;

        let invalid_cast = || {
            self.error(
                context,
                ErrorImpl::InvalidCast {
                    from: source.to_string(),
                    to: target.to_string(),
                },
            )
        };

        let target_operand = self.cast_operand(context, target).ok_or_else(invalid_cast)?;
        let source_operand = self.cast_operand(context, &source).ok_or_else(invalid_cast)?;

        if source.is(Primitive::Str) || target.is(Primitive::Str) {
            return Err(invalid_cast());
        }

        if &source == target || is_cast_allowed(source_operand, target_operand) {
            Ok(target.clone())
        } else {
            Err(invalid_cast())
        }
    }

    fn cast_operand(&self, context: &VisitContext, type_ast: &TypeAst) -> Option<CastOperand> {
        match type_ast {
            TypeAst::Primitive(primitive) => Some(CastOperand::Primitive(*primitive)),
            TypeAst::Named(name) => self
                .manager
                .lookup_type_info(context.file, name)
                .filter(|type_info| type_info.kind == TypeKind::Enum)
                .map(|_| CastOperand::Enum),
            _ => None,
        }
    }
}

fn segment_name(segment: &Expr) -> Option<&String> {
    match segment {
        Expr::Variable(variable) => Some(&variable.name),
        _ => None,
    }
}

fn join_types(types: &[TypeAst]) -> String {
    types
        .iter()
        .map(TypeAst::to_string)
        .collect::<Vec<String>>()
        .join(", ")
}
