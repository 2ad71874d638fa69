//! Type-compatibility and promotion rules (§4.9 "Type checking").
//!
//! Grounded on `original_source/src/semantic/symbol_table.h`'s
//! `TypeUtils` namespace: a handful of free functions over `DataType`
//! rather than a trait, matching the original's own "utility namespace,
//! not a method on the type" shape.

pub use tinyc_par::ast::DataType;

/// `true` for every numeric type the arithmetic operators accept.
pub fn is_numeric(ty: DataType) -> bool {
    matches!(ty, DataType::Int | DataType::Float | DataType::Double | DataType::Char)
}

pub fn is_integer(ty: DataType) -> bool {
    matches!(ty, DataType::Int | DataType::Char)
}

pub fn is_floating(ty: DataType) -> bool {
    matches!(ty, DataType::Float | DataType::Double)
}

/// Human-readable spelling for diagnostics, matching the source
/// keyword spelling rather than the Rust identifier (`Str` -> `string`).
pub fn data_type_to_string(ty: DataType) -> &'static str {
    match ty {
        DataType::Void => "void",
        DataType::Int => "int",
        DataType::Float => "float",
        DataType::Double => "double",
        DataType::Char => "char",
        DataType::Str => "string",
        DataType::Bool => "bool",
        DataType::Array => "array",
        DataType::Pointer => "pointer",
        DataType::FunctionType => "function",
        DataType::Unknown => "<unknown>",
    }
}

/// Two types are compatible if they are identical, or both numeric
/// (implicit promotion covers the rest). `Unknown` is compatible with
/// anything so that one type error does not cascade into a chain of
/// follow-on errors for every later use of the same expression.
pub fn are_types_compatible(a: DataType, b: DataType) -> bool {
    if a == DataType::Unknown || b == DataType::Unknown {
        return true;
    }
    a == b || (is_numeric(a) && is_numeric(b))
}

/// `true` if a value of type `from` may be implicitly converted to
/// `to` (assignment, argument passing, return). Narrowing conversions
/// (e.g. `double` into `int`) are not implicit.
pub fn can_implicitly_convert(from: DataType, to: DataType) -> bool {
    if from == to || from == DataType::Unknown || to == DataType::Unknown {
        return true;
    }
    match (from, to) {
        (DataType::Char, DataType::Int) => true,
        (DataType::Int, DataType::Float) => true,
        (DataType::Int, DataType::Double) => true,
        (DataType::Float, DataType::Double) => true,
        _ => false,
    }
}

/// The promoted result type of a binary arithmetic or relational
/// operator applied to `lhs`/`rhs`, following the usual widening chain
/// `double > float > int > char`. Returns `Unknown` when the operand
/// types are not both numeric, letting the caller raise its own
/// `INVALID_OPERATION` diagnostic rather than guessing a result type.
pub fn binary_result_type(lhs: DataType, rhs: DataType) -> DataType {
    if !is_numeric(lhs) || !is_numeric(rhs) {
        return DataType::Unknown;
    }
    for candidate in [DataType::Double, DataType::Float, DataType::Int] {
        if lhs == candidate || rhs == candidate {
            return candidate;
        }
    }
    DataType::Char
}

/// Unary `-`/`+` preserve the operand's numeric type; unary `!`
/// produces `Bool` regardless of operand (the operand itself must
/// still be checked for truthiness-compatibility by the caller).
pub fn unary_result_type(operand: DataType, is_logical_not: bool) -> DataType {
    if is_logical_not {
        DataType::Bool
    } else {
        operand
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_promotion_widens_toward_double() {
        assert_eq!(binary_result_type(DataType::Int, DataType::Float), DataType::Float);
        assert_eq!(binary_result_type(DataType::Float, DataType::Double), DataType::Double);
        assert_eq!(binary_result_type(DataType::Char, DataType::Int), DataType::Int);
    }

    #[test]
    fn non_numeric_operands_are_unknown() {
        assert_eq!(binary_result_type(DataType::Bool, DataType::Int), DataType::Unknown);
    }

    #[test]
    fn char_widens_to_int_implicitly_but_not_the_reverse() {
        assert!(can_implicitly_convert(DataType::Char, DataType::Int));
        assert!(!can_implicitly_convert(DataType::Int, DataType::Char));
    }

    #[test]
    fn unknown_is_compatible_with_everything() {
        assert!(are_types_compatible(DataType::Unknown, DataType::Bool));
        assert!(are_types_compatible(DataType::Str, DataType::Unknown));
    }
}
