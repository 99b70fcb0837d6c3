//! Constructors for assembling ASTs by hand.
//!
//! The parser builds trees through these helpers, and so do the tests. Spans
//! are assigned when a file is finished: every statement, at any depth, gets
//! a distinct byte offset inside that file, in source order.

use std::sync::Arc;

use crate::Span;

use super::{
    ast::{Expr, Program, RootScope, Stmt, StmtKind},
    expressions::{
        AddressOfExpr, ArrayAccessExpr, BinaryExpr, BinaryOperator, CallExpr, CastExpr,
        ConstantKeyword, DerefExpr, FloatExpr, HexNumberExpr, MemberAccessExpr, NewExpr,
        NumberExpr, StringExpr, UnaryExpr, UnaryOperator, VariableExpr,
    },
    statements::{
        ArrayAssignStmt, AssignOperator, AssignStmt, BlockStmt, ConstDeclStmt, DeferStmt,
        DeleteStmt, DoWhileStmt, EnumDeclStmt, EnumValue, ExpressionStmt, FnDeclStmt,
        ForStmt, ForeachStmt, FunctionProto, IfStmt, MemberAssignStmt, Parameter, ReturnStmt,
        StructDeclStmt, StructMember, VarDeclAssignStmt, VarDeclStmt, WhileStmt,
    },
    types::{Primitive, TypeAst},
};

/// Collects the top-level statements of one file.
#[derive(Debug)]
pub struct FileBuilder {
    path: Arc<String>,
    root: RootScope,
}

impl FileBuilder {
    pub fn new(path: &str) -> Self {
        FileBuilder {
            path: Arc::new(path.to_string()),
            root: RootScope::default(),
        }
    }

    /// Records a `#load` dependency, ignoring repeats.
    pub fn load(mut self, dependency: &str) -> Self {
        if !self.root.file_dependencies.iter().any(|file| file == dependency) {
            self.root.file_dependencies.push(dependency.to_string());
        }
        self
    }

    pub fn stmt(mut self, stmt: Stmt) -> Self {
        self.root.elements.push(stmt);
        self
    }

    pub fn stmts(mut self, stmts: Vec<Stmt>) -> Self {
        self.root.elements.extend(stmts);
        self
    }

    pub fn finish(mut self) -> (Arc<String>, RootScope) {
        let mut offset = 0;
        assign_spans(&mut self.root.elements, &self.path, &mut offset);
        (self.path, self.root)
    }

    /// Finishes the file and appends it to `program`.
    pub fn add_to(self, program: &mut Program) {
        let (path, root) = self.finish();
        program.add_file(&path, root);
    }
}

fn assign_spans(stmts: &mut [Stmt], path: &Arc<String>, offset: &mut u32) {
    for stmt in stmts.iter_mut() {
        let start = *offset;
        *offset += 1;

        match &mut stmt.kind {
            StmtKind::Block(block) => assign_spans(&mut block.body, path, offset),
            StmtKind::Function(function) => {
                if let Some(body) = &mut function.body {
                    assign_spans(&mut body.body, path, offset);
                }
            }
            StmtKind::If(if_stmt) => {
                assign_spans(std::slice::from_mut(&mut *if_stmt.then_body), path, offset);
                if let Some(else_body) = &mut if_stmt.else_body {
                    assign_spans(std::slice::from_mut(&mut **else_body), path, offset);
                }
            }
            StmtKind::While(while_stmt) => assign_spans(&mut while_stmt.body.body, path, offset),
            StmtKind::DoWhile(do_while) => assign_spans(&mut do_while.body.body, path, offset),
            StmtKind::For(for_stmt) => assign_spans(&mut for_stmt.body.body, path, offset),
            StmtKind::Foreach(foreach) => assign_spans(&mut foreach.body.body, path, offset),
            StmtKind::Defer(defer) => {
                assign_spans(std::slice::from_mut(&mut *defer.deferred), path, offset)
            }
            _ => {}
        }

        stmt.span = Span::new(path, start, *offset);
    }
}

/// Shorthand for [`TypeAst::from_name`].
pub fn ty(name: &str) -> TypeAst {
    TypeAst::from_name(name)
}

// EXPRESSIONS

pub fn num(value: i64) -> Expr {
    Expr::Number(NumberExpr {
        value,
        explicit_type: None,
    })
}

pub fn num_typed(value: i64, explicit_type: Primitive) -> Expr {
    Expr::Number(NumberExpr {
        value,
        explicit_type: Some(explicit_type),
    })
}

pub fn hex(value: &str) -> Expr {
    Expr::HexNumber(HexNumberExpr {
        value: value.to_string(),
        explicit_type: None,
    })
}

pub fn float(value: f64) -> Expr {
    Expr::Float(FloatExpr {
        value,
        explicit_type: None,
    })
}

pub fn float_typed(value: f64, explicit_type: Primitive) -> Expr {
    Expr::Float(FloatExpr {
        value,
        explicit_type: Some(explicit_type),
    })
}

pub fn string(value: &str) -> Expr {
    Expr::String(StringExpr {
        value: value.to_string(),
    })
}

pub fn boolean(value: bool) -> Expr {
    if value {
        Expr::Constant(ConstantKeyword::True)
    } else {
        Expr::Constant(ConstantKeyword::False)
    }
}

pub fn null() -> Expr {
    Expr::Constant(ConstantKeyword::Null)
}

pub fn var(name: &str) -> Expr {
    Expr::Variable(VariableExpr {
        name: name.to_string(),
    })
}

pub fn binary(left: Expr, operator: BinaryOperator, right: Expr) -> Expr {
    Expr::Binary(BinaryExpr {
        left: Box::new(left),
        operator,
        right: Box::new(right),
    })
}

pub fn unary(operator: UnaryOperator, operand: Expr) -> Expr {
    Expr::Unary(UnaryExpr {
        operator,
        operand: Box::new(operand),
    })
}

pub fn call(name: &str, arguments: Vec<Expr>) -> Expr {
    call_expr(var(name), arguments)
}

pub fn call_expr(callee: Expr, arguments: Vec<Expr>) -> Expr {
    Expr::Call(CallExpr {
        callee: Box::new(callee),
        arguments,
    })
}

pub fn index(array: Expr, indices: Vec<Expr>) -> Expr {
    Expr::ArrayAccess(array_access(array, indices))
}

fn array_access(array: Expr, indices: Vec<Expr>) -> ArrayAccessExpr {
    ArrayAccessExpr {
        array: Box::new(array),
        indices,
    }
}

pub fn member(segments: Vec<Expr>) -> Expr {
    Expr::MemberAccess(MemberAccessExpr { segments })
}

pub fn new(allocated_type: TypeAst) -> Expr {
    Expr::New(NewExpr { allocated_type })
}

pub fn deref(operand: Expr) -> Expr {
    Expr::Deref(DerefExpr {
        operand: Box::new(operand),
    })
}

pub fn address_of(operand: Expr) -> Expr {
    Expr::AddressOf(AddressOfExpr {
        operand: Box::new(operand),
    })
}

pub fn cast(expression: Expr, target: TypeAst) -> Expr {
    Expr::Cast(CastExpr {
        expression: Box::new(expression),
        target,
    })
}

// STATEMENTS

fn stmt(kind: StmtKind) -> Stmt {
    Stmt::new(kind, Span::null())
}

pub fn block(body: Vec<Stmt>) -> Stmt {
    stmt(StmtKind::Block(BlockStmt { body }))
}

/// `name : T;`
pub fn var_decl(identifier: &str, explicit_type: TypeAst) -> Stmt {
    stmt(StmtKind::VarDecl(VarDeclStmt {
        identifier: identifier.to_string(),
        explicit_type,
    }))
}

/// `name : T = value;`
pub fn typed_decl(identifier: &str, explicit_type: TypeAst, value: Expr) -> Stmt {
    stmt(StmtKind::VarDeclAssign(VarDeclAssignStmt {
        identifier: identifier.to_string(),
        explicit_type: Some(explicit_type),
        assigned_value: value,
    }))
}

/// `name := value;`
pub fn infer_decl(identifier: &str, value: Expr) -> Stmt {
    stmt(StmtKind::VarDeclAssign(VarDeclAssignStmt {
        identifier: identifier.to_string(),
        explicit_type: None,
        assigned_value: value,
    }))
}

/// `name :: value;`
pub fn const_decl(identifier: &str, value: Expr) -> Stmt {
    stmt(StmtKind::ConstDecl(ConstDeclStmt {
        identifier: identifier.to_string(),
        assigned_value: value,
    }))
}

fn prototype(
    identifier: &str,
    parameters: Vec<(&str, TypeAst)>,
    return_type: TypeAst,
    is_var_args: bool,
) -> FunctionProto {
    FunctionProto {
        identifier: identifier.to_string(),
        parameters: parameters
            .into_iter()
            .map(|(name, parameter_type)| Parameter {
                name: name.to_string(),
                parameter_type,
            })
            .collect(),
        return_type,
        is_var_args,
    }
}

/// `name :: (params) -> return_type { body }`
pub fn function(
    identifier: &str,
    parameters: Vec<(&str, TypeAst)>,
    return_type: TypeAst,
    body: Vec<Stmt>,
) -> Stmt {
    stmt(StmtKind::Function(FnDeclStmt {
        prototype: prototype(identifier, parameters, return_type, false),
        body: Some(BlockStmt { body }),
    }))
}

/// A body-less prototype, as used for external functions.
pub fn extern_function(
    identifier: &str,
    parameters: Vec<(&str, TypeAst)>,
    return_type: TypeAst,
    is_var_args: bool,
) -> Stmt {
    stmt(StmtKind::Function(FnDeclStmt {
        prototype: prototype(identifier, parameters, return_type, is_var_args),
        body: None,
    }))
}

pub fn struct_decl(name: &str, members: Vec<(&str, TypeAst)>) -> Stmt {
    struct_decl_with_defaults(
        name,
        members
            .into_iter()
            .map(|(member, member_type)| (member, member_type, None))
            .collect(),
    )
}

pub fn struct_decl_with_defaults(name: &str, members: Vec<(&str, TypeAst, Option<Expr>)>) -> Stmt {
    stmt(StmtKind::Struct(StructDeclStmt {
        name: name.to_string(),
        members: members
            .into_iter()
            .map(|(member, member_type, default_value)| StructMember {
                name: member.to_string(),
                member_type,
                default_value,
            })
            .collect(),
    }))
}

pub fn enum_decl(name: &str, values: Vec<(&str, Option<Expr>)>) -> Stmt {
    stmt(StmtKind::Enum(EnumDeclStmt {
        name: name.to_string(),
        values: values
            .into_iter()
            .map(|(value_name, value)| EnumValue {
                name: value_name.to_string(),
                value,
            })
            .collect(),
    }))
}

pub fn assign(identifier: &str, value: Expr) -> Stmt {
    compound_assign(identifier, AssignOperator::Assign, value)
}

pub fn compound_assign(identifier: &str, operator: AssignOperator, value: Expr) -> Stmt {
    stmt(StmtKind::Assign(AssignStmt {
        identifier: identifier.to_string(),
        operator,
        value,
    }))
}

pub fn member_assign(segments: Vec<Expr>, value: Expr) -> Stmt {
    stmt(StmtKind::MemberAssign(MemberAssignStmt {
        target: MemberAccessExpr { segments },
        value,
    }))
}

pub fn array_assign(array: Expr, indices: Vec<Expr>, value: Expr) -> Stmt {
    stmt(StmtKind::ArrayAssign(ArrayAssignStmt {
        target: array_access(array, indices),
        value,
    }))
}

pub fn expr_stmt(expression: Expr) -> Stmt {
    stmt(StmtKind::Expression(ExpressionStmt { expression }))
}

pub fn if_stmt(condition: Expr, then_body: Vec<Stmt>, else_body: Option<Vec<Stmt>>) -> Stmt {
    stmt(StmtKind::If(IfStmt {
        condition,
        then_body: Box::new(block(then_body)),
        else_body: else_body.map(|body| Box::new(block(body))),
    }))
}

pub fn while_stmt(condition: Expr, body: Vec<Stmt>) -> Stmt {
    stmt(StmtKind::While(WhileStmt {
        condition,
        body: BlockStmt { body },
    }))
}

pub fn do_while(body: Vec<Stmt>, condition: Expr) -> Stmt {
    stmt(StmtKind::DoWhile(DoWhileStmt {
        body: BlockStmt { body },
        condition,
    }))
}

pub fn for_range(variable: Option<&str>, from: Expr, to: Expr, body: Vec<Stmt>) -> Stmt {
    stmt(StmtKind::For(ForStmt {
        variable: variable.map(str::to_string),
        from,
        to,
        body: BlockStmt { body },
    }))
}

pub fn foreach(variable: Option<&str>, array: Expr, body: Vec<Stmt>) -> Stmt {
    stmt(StmtKind::Foreach(ForeachStmt {
        variable: variable.map(str::to_string),
        array,
        body: BlockStmt { body },
    }))
}

pub fn return_stmt(value: Option<Expr>) -> Stmt {
    stmt(StmtKind::Return(ReturnStmt { value }))
}

pub fn delete(identifier: &str) -> Stmt {
    stmt(StmtKind::Delete(DeleteStmt {
        identifier: identifier.to_string(),
    }))
}

pub fn defer(deferred: Stmt) -> Stmt {
    stmt(StmtKind::Defer(DeferStmt {
        deferred: Box::new(deferred),
    }))
}

pub fn break_stmt() -> Stmt {
    stmt(StmtKind::Break)
}

pub fn continue_stmt() -> Stmt {
    stmt(StmtKind::Continue)
}
