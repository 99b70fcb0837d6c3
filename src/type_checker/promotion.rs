//! Arithmetic promotion and cast legality between primitive types.

use crate::{
    ast::types::{Primitive, PrimitiveClass},
    errors::errors::ErrorImpl,
};

/// The result type of an arithmetic operator applied to two primitives.
///
/// The rules are tried in a fixed order and the first match wins:
///
/// 1. equal types are unchanged
/// 2. anything combined with `str` is `str`
/// 3. two signed integers give `s64` if either is `s64`, else `s32`
/// 4. `u64` combined with a signed integer gives `u64`
/// 5. two unsigned integers give `u64` if either is `u64`, else `u32`
/// 6. anything combined with `f64` is `f64`
/// 7. signed or float with signed or float gives `f32`
/// 8. unsigned or float with unsigned or float gives `f32`
/// 9. an integer combined with `char` keeps the integer type
///
/// Every other pair, `s32` with `u32` among them, is rejected.
pub fn promote(left: Primitive, right: Primitive) -> Result<Primitive, ErrorImpl> {
    use PrimitiveClass::{Char, Float, Signed, Str, Unsigned};

    let (left_class, right_class) = (left.class(), right.class());
    let either = |primitive: Primitive| left == primitive || right == primitive;

    if left == right {
        return Ok(left);
    }
    if left_class == Str || right_class == Str {
        return Ok(Primitive::Str);
    }
    if left_class == Signed && right_class == Signed {
        return Ok(if either(Primitive::S64) {
            Primitive::S64
        } else {
            Primitive::S32
        });
    }
    if (left == Primitive::U64 && right_class == Signed)
        || (left_class == Signed && right == Primitive::U64)
    {
        return Ok(Primitive::U64);
    }
    if left_class == Unsigned && right_class == Unsigned {
        return Ok(if either(Primitive::U64) {
            Primitive::U64
        } else {
            Primitive::U32
        });
    }
    if either(Primitive::F64) {
        return Ok(Primitive::F64);
    }
    if matches!(left_class, Signed | Float) && matches!(right_class, Signed | Float) {
        return Ok(Primitive::F32);
    }
    if matches!(left_class, Unsigned | Float) && matches!(right_class, Unsigned | Float) {
        return Ok(Primitive::F32);
    }
    if left.is_integer() && right_class == Char {
        return Ok(left);
    }
    if left_class == Char && right.is_integer() {
        return Ok(right);
    }

    Err(ErrorImpl::InvalidOperandTypes {
        left: left.to_string(),
        right: right.to_string(),
    })
}

/// One side of a cast, once it is known to be castable at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastOperand {
    Primitive(Primitive),
    Enum,
}

impl CastOperand {
    fn is_integer(self) -> bool {
        matches!(self, CastOperand::Primitive(primitive) if primitive.is_integer())
    }

    fn is_str(self) -> bool {
        self == CastOperand::Primitive(Primitive::Str)
    }
}

/// Whether a value can be cast between two distinct types.
///
/// `str` never converts, and enums only convert to and from integers.
pub fn is_cast_allowed(from: CastOperand, to: CastOperand) -> bool {
    if from.is_str() || to.is_str() {
        return false;
    }

    match (from, to) {
        (CastOperand::Enum, other) | (other, CastOperand::Enum) => other.is_integer(),
        (CastOperand::Primitive(_), CastOperand::Primitive(_)) => true,
    }
}
