use std::sync::Arc;

use crate::Span;

use super::{
    expressions::{
        AddressOfExpr, ArrayAccessExpr, BinaryExpr, CallExpr, CastExpr, ConstantKeyword,
        DerefExpr, FloatExpr, HexNumberExpr, MemberAccessExpr, NewExpr, NumberExpr, StringExpr,
        UnaryExpr, VariableExpr,
    },
    statements::{
        ArrayAssignStmt, AssignStmt, BlockStmt, ConstDeclStmt, DeferStmt, DeleteStmt,
        DoWhileStmt, EnumDeclStmt, ExpressionStmt, FnDeclStmt, ForStmt, ForeachStmt, IfStmt,
        MemberAssignStmt, ReturnStmt, StructDeclStmt, VarDeclAssignStmt, VarDeclStmt, WhileStmt,
    },
};

/// Expression
///
/// The closed set of expression kinds the parser produces. Every pass
/// matches on it exhaustively.
#[derive(Debug, Clone)]
pub enum Expr {
    Number(NumberExpr),
    HexNumber(HexNumberExpr),
    Float(FloatExpr),
    String(StringExpr),
    Constant(ConstantKeyword),
    Variable(VariableExpr),
    Binary(BinaryExpr),
    Unary(UnaryExpr),
    Call(CallExpr),
    ArrayAccess(ArrayAccessExpr),
    MemberAccess(MemberAccessExpr),
    New(NewExpr),
    Deref(DerefExpr),
    AddressOf(AddressOfExpr),
    Cast(CastExpr),
}

/// Statement Types
#[derive(Debug, Clone)]
pub enum StmtKind {
    Block(BlockStmt),
    VarDecl(VarDeclStmt),
    VarDeclAssign(VarDeclAssignStmt),
    ConstDecl(ConstDeclStmt),
    Function(FnDeclStmt),
    Struct(StructDeclStmt),
    Enum(EnumDeclStmt),
    Assign(AssignStmt),
    MemberAssign(MemberAssignStmt),
    ArrayAssign(ArrayAssignStmt),
    Expression(ExpressionStmt),
    If(IfStmt),
    While(WhileStmt),
    DoWhile(DoWhileStmt),
    For(ForStmt),
    Foreach(ForeachStmt),
    Return(ReturnStmt),
    Delete(DeleteStmt),
    Defer(DeferStmt),
    Break,
    Continue,
}

/// A statement together with its source span.
///
/// Errors raised while typing an expression are reported at the span of the
/// statement that contains it.
#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Stmt { kind, span }
    }
}

/// The top-level scope of one file.
#[derive(Debug, Clone, Default)]
pub struct RootScope {
    pub elements: Vec<Stmt>,
    /// Files named by `#load`, resolved against the importing file,
    /// de-duplicated and in load order.
    pub file_dependencies: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: Arc<String>,
    pub root: RootScope,
}

/// Every file reachable from the entry point, in discovery order.
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub files: Vec<SourceFile>,
}

impl Program {
    pub fn new() -> Self {
        Program { files: vec![] }
    }

    pub fn add_file(&mut self, path: &str, root: RootScope) {
        self.files.push(SourceFile {
            path: Arc::new(path.to_string()),
            root,
        });
    }
}
