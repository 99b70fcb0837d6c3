use super::{ast::Expr, types::{Primitive, TypeAst}};

// LITERALS

/// Number Expression
/// Represents a decimal integer literal, optionally suffixed with its type (`5u64`).
#[derive(Debug, Clone)]
pub struct NumberExpr {
    pub value: i64,
    pub explicit_type: Option<Primitive>,
}

/// Hex Number Expression
/// Represents a hexadecimal integer literal (`0xFF`), kept as written.
#[derive(Debug, Clone)]
pub struct HexNumberExpr {
    pub value: String,
    pub explicit_type: Option<Primitive>,
}

/// Float Expression
#[derive(Debug, Clone)]
pub struct FloatExpr {
    pub value: f64,
    pub explicit_type: Option<Primitive>,
}

/// String Expression
#[derive(Debug, Clone)]
pub struct StringExpr {
    pub value: String,
}

/// The keyword literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstantKeyword {
    True,
    False,
    Null,
}

/// Variable Expression
/// Represents an identifier in the AST. This includes functions and enum names.
#[derive(Debug, Clone)]
pub struct VariableExpr {
    pub name: String,
}

// COMPLEX

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    And,
    Or,
    Equals,
    NotEquals,
    Greater,
    GreaterEquals,
    Less,
    LessEquals,
}

impl BinaryOperator {
    /// `== != > >= < <=` always produce `bool`.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOperator::Equals
                | BinaryOperator::NotEquals
                | BinaryOperator::Greater
                | BinaryOperator::GreaterEquals
                | BinaryOperator::Less
                | BinaryOperator::LessEquals
        )
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Mod => "%",
            BinaryOperator::And => "&&",
            BinaryOperator::Or => "||",
            BinaryOperator::Equals => "==",
            BinaryOperator::NotEquals => "!=",
            BinaryOperator::Greater => ">",
            BinaryOperator::GreaterEquals => ">=",
            BinaryOperator::Less => "<",
            BinaryOperator::LessEquals => "<=",
        }
    }
}

/// Binary Expression
/// Represents an arithmetic, logical or comparison operation between two expressions.
#[derive(Debug, Clone)]
pub struct BinaryExpr {
    pub left: Box<Expr>,
    pub operator: BinaryOperator,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Not,
    Plus,
    Minus,
}

/// Unary Expression
/// `!x`, `+x` and `-x`.
#[derive(Debug, Clone)]
pub struct UnaryExpr {
    pub operator: UnaryOperator,
    pub operand: Box<Expr>,
}

/// Call Expression
/// The callee is either a name or an array access yielding a function (`table[i](x)`).
#[derive(Debug, Clone)]
pub struct CallExpr {
    pub callee: Box<Expr>,
    pub arguments: Vec<Expr>,
}

/// Array Access Expression
/// `arr[x][y]` holds two indices; each one strips one array dimension.
#[derive(Debug, Clone)]
pub struct ArrayAccessExpr {
    pub array: Box<Expr>,
    pub indices: Vec<Expr>,
}

/// Member Access Expression
/// `x.y.z`, resolved left to right. Segments are variables, calls or array accesses.
#[derive(Debug, Clone)]
pub struct MemberAccessExpr {
    pub segments: Vec<Expr>,
}

/// New Expression
/// Heap allocation, `new T` has type `^T`.
#[derive(Debug, Clone)]
pub struct NewExpr {
    pub allocated_type: TypeAst,
}

/// Dereference Expression (`*p`)
#[derive(Debug, Clone)]
pub struct DerefExpr {
    pub operand: Box<Expr>,
}

/// Address Of Expression (`&x`)
#[derive(Debug, Clone)]
pub struct AddressOfExpr {
    pub operand: Box<Expr>,
}

/// Cast Expression (`#cast(expr, T)`)
#[derive(Debug, Clone)]
pub struct CastExpr {
    pub expression: Box<Expr>,
    pub target: TypeAst,
}
