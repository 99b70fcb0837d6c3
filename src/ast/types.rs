//! Type system definitions for the AST.
//!
//! This module defines the types a declaration can be annotated with, and
//! the types the expression visitor computes:
//!
//! - Primitive types with explicit widths (`s32`, `u64`, `f32`, ...)
//! - Named types (references to a declared struct or enum)
//! - Arrays (unsized, static and dynamic), pointers and function types
//! - The `null` sentinel, only valid where a pointer is expected
//!
//! Types are compared through their canonical rendering (the `Display`
//! output), so two structurally different trees that render the same are
//! the same type.

use std::{
    collections::HashMap,
    fmt::{self, Display},
};

use lazy_static::lazy_static;

lazy_static! {
    pub static ref PRIMITIVE_LOOKUP: HashMap<&'static str, Primitive> = {
        let mut map = HashMap::new();
        map.insert("u16", Primitive::U16);
        map.insert("u32", Primitive::U32);
        map.insert("u64", Primitive::U64);
        map.insert("s16", Primitive::S16);
        map.insert("s32", Primitive::S32);
        map.insert("s64", Primitive::S64);
        map.insert("f32", Primitive::F32);
        map.insert("f64", Primitive::F64);
        map.insert("str", Primitive::Str);
        map.insert("char", Primitive::Char);
        map.insert("bool", Primitive::Bool);
        map.insert("void", Primitive::Void);
        map
    };
}

/// Represents the builtin types of the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    U16,
    U32,
    U64,
    S16,
    S32,
    S64,
    F32,
    F64,
    Str,
    Char,
    Bool,
    Void,
}

/// Coarse classification used by numeric promotion and cast rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveClass {
    Signed,
    Unsigned,
    Float,
    Str,
    Char,
    Bool,
    Void,
}

impl Primitive {
    pub fn from_name(name: &str) -> Option<Primitive> {
        PRIMITIVE_LOOKUP.get(name).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Primitive::U16 => "u16",
            Primitive::U32 => "u32",
            Primitive::U64 => "u64",
            Primitive::S16 => "s16",
            Primitive::S32 => "s32",
            Primitive::S64 => "s64",
            Primitive::F32 => "f32",
            Primitive::F64 => "f64",
            Primitive::Str => "str",
            Primitive::Char => "char",
            Primitive::Bool => "bool",
            Primitive::Void => "void",
        }
    }

    pub fn class(self) -> PrimitiveClass {
        match self {
            Primitive::S16 | Primitive::S32 | Primitive::S64 => PrimitiveClass::Signed,
            Primitive::U16 | Primitive::U32 | Primitive::U64 => PrimitiveClass::Unsigned,
            Primitive::F32 | Primitive::F64 => PrimitiveClass::Float,
            Primitive::Str => PrimitiveClass::Str,
            Primitive::Char => PrimitiveClass::Char,
            Primitive::Bool => PrimitiveClass::Bool,
            Primitive::Void => PrimitiveClass::Void,
        }
    }

    /// `s16` through `u64`. `char` is not an integer for indexing or loop bounds.
    pub fn is_integer(self) -> bool {
        matches!(
            self.class(),
            PrimitiveClass::Signed | PrimitiveClass::Unsigned
        )
    }
}

impl Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayKind {
    /// `[] T`
    Unsized,
    /// `[N] T`
    Static(u32),
    /// `[..] T`
    Dynamic,
}

#[derive(Debug, Clone)]
pub struct ArrayType {
    pub kind: ArrayKind,
    pub element: Box<TypeAst>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    /// The type of a declared function.
    Function,
    /// A function pointer written as a type annotation.
    FunctionPtr,
}

/// Represents a function signature.
#[derive(Debug, Clone)]
pub struct FunctionType {
    pub arguments: Vec<TypeAst>,
    pub return_type: Box<TypeAst>,
    /// Declared parameters are a prefix of the call's arguments.
    pub is_var_args: bool,
    pub kind: FunctionKind,
}

impl FunctionType {
    /// Whether a call supplying `arguments` matches this signature.
    ///
    /// Arity must be equal (or, for varargs, at least the declared arity) and
    /// every declared parameter must render exactly like the argument in the
    /// same position. There is no implicit widening at call sites.
    pub fn accepts(&self, arguments: &[TypeAst]) -> bool {
        let arity_matches = if self.is_var_args {
            self.arguments.len() <= arguments.len()
        } else {
            self.arguments.len() == arguments.len()
        };

        arity_matches
            && self
                .arguments
                .iter()
                .zip(arguments)
                .all(|(declared, supplied)| declared == supplied)
    }
}

/// A type annotation, or the computed type of an expression.
#[derive(Debug, Clone)]
pub enum TypeAst {
    Primitive(Primitive),
    /// A struct or enum, by name.
    Named(String),
    Array(ArrayType),
    Function(FunctionType),
    Pointer(Box<TypeAst>),
    /// Type of the `null` literal.
    Null,
}

impl TypeAst {
    /// Parses a bare type name: primitives map to [`TypeAst::Primitive`],
    /// anything else is treated as a struct or enum name.
    pub fn from_name(name: &str) -> TypeAst {
        match Primitive::from_name(name) {
            Some(primitive) => TypeAst::Primitive(primitive),
            None => TypeAst::Named(name.to_string()),
        }
    }

    pub fn pointer(pointee: TypeAst) -> TypeAst {
        TypeAst::Pointer(Box::new(pointee))
    }

    pub fn array(element: TypeAst) -> TypeAst {
        TypeAst::Array(ArrayType {
            kind: ArrayKind::Unsized,
            element: Box::new(element),
        })
    }

    pub fn static_array(size: u32, element: TypeAst) -> TypeAst {
        TypeAst::Array(ArrayType {
            kind: ArrayKind::Static(size),
            element: Box::new(element),
        })
    }

    pub fn dynamic_array(element: TypeAst) -> TypeAst {
        TypeAst::Array(ArrayType {
            kind: ArrayKind::Dynamic,
            element: Box::new(element),
        })
    }

    pub fn function(arguments: Vec<TypeAst>, return_type: TypeAst, is_var_args: bool) -> TypeAst {
        TypeAst::Function(FunctionType {
            arguments,
            return_type: Box::new(return_type),
            is_var_args,
            kind: FunctionKind::Function,
        })
    }

    pub fn function_ptr(arguments: Vec<TypeAst>, return_type: TypeAst) -> TypeAst {
        TypeAst::Function(FunctionType {
            arguments,
            return_type: Box::new(return_type),
            is_var_args: false,
            kind: FunctionKind::FunctionPtr,
        })
    }

    /// The equality key of a type.
    pub fn canonical(&self) -> String {
        self.to_string()
    }

    pub fn as_primitive(&self) -> Option<Primitive> {
        match self {
            TypeAst::Primitive(primitive) => Some(*primitive),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionType> {
        match self {
            TypeAst::Function(function) => Some(function),
            _ => None,
        }
    }

    pub fn is(&self, primitive: Primitive) -> bool {
        self.as_primitive() == Some(primitive)
    }

    pub fn is_integer(&self) -> bool {
        self.as_primitive().is_some_and(Primitive::is_integer)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, TypeAst::Array(_))
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, TypeAst::Pointer(_))
    }

    pub fn is_function(&self) -> bool {
        matches!(self, TypeAst::Function(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, TypeAst::Null)
    }

    /// Strips every array dimension, `[] [4] T` becomes `T`.
    pub fn innermost_element(&self) -> &TypeAst {
        let mut current = self;
        while let TypeAst::Array(array) = current {
            current = &array.element;
        }
        current
    }

    /// Strips `dimensions` array layers. Returns `None` when the type has
    /// fewer dimensions than requested.
    pub fn element_type(&self, dimensions: usize) -> Option<&TypeAst> {
        let mut current = self;
        for _ in 0..dimensions {
            match current {
                TypeAst::Array(array) => current = &array.element,
                _ => return None,
            }
        }
        Some(current)
    }

    /// Same type, or a `null` assigned to a pointer.
    pub fn accepts_value_of(&self, value: &TypeAst) -> bool {
        self == value || (self.is_pointer() && value.is_null())
    }
}

impl Display for TypeAst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeAst::Primitive(primitive) => write!(f, "{}", primitive),
            TypeAst::Named(name) => write!(f, "{}", name),
            TypeAst::Array(array) => match array.kind {
                ArrayKind::Unsized => write!(f, "[] {}", array.element),
                ArrayKind::Static(size) => write!(f, "[{}] {}", size, array.element),
                ArrayKind::Dynamic => write!(f, "[..] {}", array.element),
            },
            TypeAst::Function(function) => {
                let mut arguments = function
                    .arguments
                    .iter()
                    .map(|argument| argument.to_string())
                    .collect::<Vec<String>>();
                if function.is_var_args {
                    arguments.push(String::from("..."));
                }
                write!(f, "({}) -> {}", arguments.join(", "), function.return_type)
            }
            TypeAst::Pointer(pointee) => write!(f, "^{}", pointee),
            TypeAst::Null => write!(f, "null"),
        }
    }
}

impl PartialEq for TypeAst {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl Eq for TypeAst {}

impl From<Primitive> for TypeAst {
    fn from(primitive: Primitive) -> Self {
        TypeAst::Primitive(primitive)
    }
}
