use super::{
    ast::{Expr, Stmt},
    expressions::{ArrayAccessExpr, BinaryOperator, MemberAccessExpr},
    types::{FunctionKind, FunctionType, TypeAst},
};

/// A nested `{ ... }` scope.
#[derive(Debug, Clone)]
pub struct BlockStmt {
    pub body: Vec<Stmt>,
}

/// `name : T;`
#[derive(Debug, Clone)]
pub struct VarDeclStmt {
    pub identifier: String,
    pub explicit_type: TypeAst,
}

/// `name : T = expr;` or `name := expr;`
#[derive(Debug, Clone)]
pub struct VarDeclAssignStmt {
    pub identifier: String,
    pub explicit_type: Option<TypeAst>,
    pub assigned_value: Expr,
}

/// `name :: expr;`
#[derive(Debug, Clone)]
pub struct ConstDeclStmt {
    pub identifier: String,
    pub assigned_value: Expr,
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub parameter_type: TypeAst,
}

#[derive(Debug, Clone)]
pub struct FunctionProto {
    pub identifier: String,
    pub parameters: Vec<Parameter>,
    pub return_type: TypeAst,
    pub is_var_args: bool,
}

impl FunctionProto {
    /// The type a call site sees for this declaration.
    pub fn function_type(&self) -> TypeAst {
        TypeAst::Function(FunctionType {
            arguments: self
                .parameters
                .iter()
                .map(|parameter| parameter.parameter_type.clone())
                .collect(),
            return_type: Box::new(self.return_type.clone()),
            is_var_args: self.is_var_args,
            kind: FunctionKind::Function,
        })
    }
}

/// A function prototype, with its body unless it is an external declaration.
#[derive(Debug, Clone)]
pub struct FnDeclStmt {
    pub prototype: FunctionProto,
    pub body: Option<BlockStmt>,
}

#[derive(Debug, Clone)]
pub struct StructMember {
    pub name: String,
    pub member_type: TypeAst,
    pub default_value: Option<Expr>,
}

#[derive(Debug, Clone)]
pub struct StructDeclStmt {
    pub name: String,
    pub members: Vec<StructMember>,
}

#[derive(Debug, Clone)]
pub struct EnumValue {
    pub name: String,
    pub value: Option<Expr>,
}

#[derive(Debug, Clone)]
pub struct EnumDeclStmt {
    pub name: String,
    pub values: Vec<EnumValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOperator {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
}

impl AssignOperator {
    /// `x op= e` is typed as `x = x op e`.
    pub fn binary_operator(self) -> Option<BinaryOperator> {
        match self {
            AssignOperator::Assign => None,
            AssignOperator::AddAssign => Some(BinaryOperator::Add),
            AssignOperator::SubAssign => Some(BinaryOperator::Sub),
            AssignOperator::MulAssign => Some(BinaryOperator::Mul),
            AssignOperator::DivAssign => Some(BinaryOperator::Div),
        }
    }
}

/// `name = expr;` (and the compound forms)
#[derive(Debug, Clone)]
pub struct AssignStmt {
    pub identifier: String,
    pub operator: AssignOperator,
    pub value: Expr,
}

/// `x.y.z = expr;`
#[derive(Debug, Clone)]
pub struct MemberAssignStmt {
    pub target: MemberAccessExpr,
    pub value: Expr,
}

/// `arr[i] = expr;`
#[derive(Debug, Clone)]
pub struct ArrayAssignStmt {
    pub target: ArrayAccessExpr,
    pub value: Expr,
}

#[derive(Debug, Clone)]
pub struct ExpressionStmt {
    pub expression: Expr,
}

#[derive(Debug, Clone)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_body: Box<Stmt>,
    pub else_body: Option<Box<Stmt>>,
}

#[derive(Debug, Clone)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: BlockStmt,
}

#[derive(Debug, Clone)]
pub struct DoWhileStmt {
    pub body: BlockStmt,
    pub condition: Expr,
}

/// `for a..b { }` or `for n: a..b { }`
#[derive(Debug, Clone)]
pub struct ForStmt {
    pub variable: Option<String>,
    pub from: Expr,
    pub to: Expr,
    pub body: BlockStmt,
}

/// `for arr { }` or `for x: arr { }`
#[derive(Debug, Clone)]
pub struct ForeachStmt {
    pub variable: Option<String>,
    pub array: Expr,
    pub body: BlockStmt,
}

#[derive(Debug, Clone)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
}

#[derive(Debug, Clone)]
pub struct DeleteStmt {
    pub identifier: String,
}

#[derive(Debug, Clone)]
pub struct DeferStmt {
    pub deferred: Box<Stmt>,
}
