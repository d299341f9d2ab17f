//! The fixed operator table.
//!
//! Operators are resolved by exact `(operator, operand types)` lookup -
//! there is no implicit numeric promotion. The only rule outside the
//! table: equality and inequality between two non-builtin types is always
//! permitted (reference equality).

use quill_ir::{BinaryOp, TypeId, UnaryOp};

struct BinaryOperator {
    op: BinaryOp,
    left: TypeId,
    right: TypeId,
    result: TypeId,
}

const fn bin(op: BinaryOp, left: TypeId, right: TypeId, result: TypeId) -> BinaryOperator {
    BinaryOperator {
        op,
        left,
        right,
        result,
    }
}

const BINARY_OPERATORS: &[BinaryOperator] = &[
    // int arithmetic
    bin(BinaryOp::Add, TypeId::INT, TypeId::INT, TypeId::INT),
    bin(BinaryOp::Sub, TypeId::INT, TypeId::INT, TypeId::INT),
    bin(BinaryOp::Mul, TypeId::INT, TypeId::INT, TypeId::INT),
    bin(BinaryOp::Div, TypeId::INT, TypeId::INT, TypeId::INT),
    bin(BinaryOp::Rem, TypeId::INT, TypeId::INT, TypeId::INT),
    // int bitwise
    bin(BinaryOp::BitAnd, TypeId::INT, TypeId::INT, TypeId::INT),
    bin(BinaryOp::BitOr, TypeId::INT, TypeId::INT, TypeId::INT),
    bin(BinaryOp::BitXor, TypeId::INT, TypeId::INT, TypeId::INT),
    // int comparison
    bin(BinaryOp::Lt, TypeId::INT, TypeId::INT, TypeId::BOOL),
    bin(BinaryOp::Le, TypeId::INT, TypeId::INT, TypeId::BOOL),
    bin(BinaryOp::Gt, TypeId::INT, TypeId::INT, TypeId::BOOL),
    bin(BinaryOp::Ge, TypeId::INT, TypeId::INT, TypeId::BOOL),
    // int equality
    bin(BinaryOp::Eq, TypeId::INT, TypeId::INT, TypeId::BOOL),
    bin(BinaryOp::Ne, TypeId::INT, TypeId::INT, TypeId::BOOL),
    // bool logic
    bin(BinaryOp::LogicalAnd, TypeId::BOOL, TypeId::BOOL, TypeId::BOOL),
    bin(BinaryOp::LogicalOr, TypeId::BOOL, TypeId::BOOL, TypeId::BOOL),
    bin(BinaryOp::BitAnd, TypeId::BOOL, TypeId::BOOL, TypeId::BOOL),
    bin(BinaryOp::BitOr, TypeId::BOOL, TypeId::BOOL, TypeId::BOOL),
    bin(BinaryOp::BitXor, TypeId::BOOL, TypeId::BOOL, TypeId::BOOL),
    // bool equality
    bin(BinaryOp::Eq, TypeId::BOOL, TypeId::BOOL, TypeId::BOOL),
    bin(BinaryOp::Ne, TypeId::BOOL, TypeId::BOOL, TypeId::BOOL),
    // string concatenation and equality
    bin(BinaryOp::Add, TypeId::STRING, TypeId::STRING, TypeId::STRING),
    bin(BinaryOp::Eq, TypeId::STRING, TypeId::STRING, TypeId::BOOL),
    bin(BinaryOp::Ne, TypeId::STRING, TypeId::STRING, TypeId::BOOL),
];

struct UnaryOperator {
    op: UnaryOp,
    operand: TypeId,
    result: TypeId,
}

const fn una(op: UnaryOp, operand: TypeId, result: TypeId) -> UnaryOperator {
    UnaryOperator {
        op,
        operand,
        result,
    }
}

const UNARY_OPERATORS: &[UnaryOperator] = &[
    una(UnaryOp::Plus, TypeId::INT, TypeId::INT),
    una(UnaryOp::Neg, TypeId::INT, TypeId::INT),
    una(UnaryOp::Not, TypeId::BOOL, TypeId::BOOL),
];

/// Resolve a binary operator for the exact operand type signature.
///
/// Returns the result type, or `None` when the operator is not defined
/// for the signature.
pub fn bind_binary_operator(op: BinaryOp, left: TypeId, right: TypeId) -> Option<TypeId> {
    for entry in BINARY_OPERATORS {
        if entry.op == op && entry.left == left && entry.right == right {
            return Some(entry.result);
        }
    }
    // Reference equality between any two non-builtin types.
    if matches!(op, BinaryOp::Eq | BinaryOp::Ne) && !left.is_builtin() && !right.is_builtin() {
        return Some(TypeId::BOOL);
    }
    None
}

/// Resolve a unary operator for the exact operand type.
pub fn bind_unary_operator(op: UnaryOp, operand: TypeId) -> Option<TypeId> {
    UNARY_OPERATORS
        .iter()
        .find(|entry| entry.op == op && entry.operand == operand)
        .map(|entry| entry.result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_ir::{Span, StringInterner};
    use quill_types::{TypeData, TypeTable};

    #[test]
    fn exact_signature_lookup_no_promotion() {
        assert_eq!(
            bind_binary_operator(BinaryOp::Add, TypeId::INT, TypeId::INT),
            Some(TypeId::INT)
        );
        assert_eq!(
            bind_binary_operator(BinaryOp::Add, TypeId::INT, TypeId::STRING),
            None
        );
        assert_eq!(
            bind_binary_operator(BinaryOp::Add, TypeId::STRING, TypeId::STRING),
            Some(TypeId::STRING)
        );
        assert_eq!(
            bind_binary_operator(BinaryOp::Lt, TypeId::BOOL, TypeId::BOOL),
            None
        );
    }

    #[test]
    fn class_equality_is_unconditional() {
        let interner = StringInterner::new();
        let mut table = TypeTable::new(&interner);
        let a_name = interner.intern("A");
        let b_name = interner.intern("B");
        let a = table.alloc_type(TypeData::class(a_name, a_name, None, Span::new(0, 1)));
        let b = table.alloc_type(TypeData::class(b_name, b_name, None, Span::new(2, 3)));

        // Unrelated class types still compare by reference.
        assert_eq!(bind_binary_operator(BinaryOp::Eq, a, b), Some(TypeId::BOOL));
        assert_eq!(bind_binary_operator(BinaryOp::Ne, a, a), Some(TypeId::BOOL));
        // But not ordering, and not mixed with builtins.
        assert_eq!(bind_binary_operator(BinaryOp::Lt, a, b), None);
        assert_eq!(bind_binary_operator(BinaryOp::Eq, a, TypeId::INT), None);
    }

    #[test]
    fn unary_table() {
        assert_eq!(bind_unary_operator(UnaryOp::Neg, TypeId::INT), Some(TypeId::INT));
        assert_eq!(bind_unary_operator(UnaryOp::Not, TypeId::BOOL), Some(TypeId::BOOL));
        assert_eq!(bind_unary_operator(UnaryOp::Not, TypeId::INT), None);
        assert_eq!(bind_unary_operator(UnaryOp::Plus, TypeId::STRING), None);
    }
}
