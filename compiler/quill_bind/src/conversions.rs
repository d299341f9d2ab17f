//! Conversion classification.
//!
//! Only `Identity` and `Implicit` conversions are inserted automatically
//! at initializer, argument, and return sites; an `Explicit` conversion
//! requires a conversion call (`int("42")`), and `None` means the types
//! are unrelated.

use quill_ir::bound::ConversionKind;
use quill_ir::TypeId;
use quill_types::TypeTable;

/// Result of classifying a conversion between two types.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Conversion {
    /// Source and target are the same type.
    Identity,
    /// Safe widening: inserted automatically.
    Implicit,
    /// Possible but must be requested explicitly.
    Explicit,
    /// No conversion exists.
    None,
}

impl Conversion {
    /// Whether the conversion can be inserted without a conversion call.
    pub fn is_implicit(self) -> bool {
        matches!(self, Conversion::Identity | Conversion::Implicit)
    }

    /// Whether any conversion exists.
    pub fn exists(self) -> bool {
        !matches!(self, Conversion::None)
    }

    /// The bound-node kind for an existing conversion.
    ///
    /// # Panics
    /// Panics on `Conversion::None` - callers diagnose that case instead
    /// of materializing a node.
    pub fn kind(self) -> ConversionKind {
        match self {
            Conversion::Identity => ConversionKind::Identity,
            Conversion::Implicit => ConversionKind::Implicit,
            Conversion::Explicit => ConversionKind::Explicit,
            Conversion::None => unreachable!("no bound node for a nonexistent conversion"),
        }
    }
}

/// Classify the conversion from `from` to `to`.
///
/// - identity when the types are equal (one interned id per
///   instantiation signature, so `List<int>` to `List<int>` is identity);
/// - anything converts to `object` implicitly, `object` converts to
///   anything explicitly (checked downcast);
/// - `bool`/`int` to `string` and back are explicit;
/// - a type-parameter target accepts any source satisfying its whole
///   constraint list (implicitly); a type-parameter source converts to
///   whatever its constraints guarantee;
/// - an upcast to any ancestor is implicit, a downcast explicit;
/// - everything else: none.
pub fn classify_conversion(table: &TypeTable, from: TypeId, to: TypeId) -> Conversion {
    if from == to {
        return Conversion::Identity;
    }
    if from.is_error() || to.is_error() || from.is_void() || to.is_void() {
        return Conversion::None;
    }
    if to == TypeId::OBJECT {
        return Conversion::Implicit;
    }
    if from == TypeId::OBJECT {
        return Conversion::Explicit;
    }
    if (from == TypeId::BOOL || from == TypeId::INT) && to == TypeId::STRING {
        return Conversion::Explicit;
    }
    if from == TypeId::STRING && (to == TypeId::BOOL || to == TypeId::INT) {
        return Conversion::Explicit;
    }
    if table.type_data(to).is_type_parameter {
        let satisfied = table
            .type_data(to)
            .constraints
            .iter()
            .all(|&constraint| table.can_cast_to(from, constraint));
        return if satisfied {
            Conversion::Implicit
        } else {
            Conversion::None
        };
    }
    if table.type_data(from).is_type_parameter {
        let guaranteed = table
            .type_data(from)
            .constraints
            .iter()
            .any(|&constraint| table.can_cast_to(constraint, to));
        return if guaranteed {
            Conversion::Implicit
        } else {
            Conversion::None
        };
    }
    if table.is_subclass_of(from, to) {
        return Conversion::Implicit;
    }
    if table.is_subclass_of(to, from) {
        return Conversion::Explicit;
    }
    Conversion::None
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_ir::{Span, StringInterner};
    use quill_types::TypeData;

    fn class(table: &mut TypeTable, interner: &StringInterner, name: &str) -> TypeId {
        let n = interner.intern(name);
        table.alloc_type(TypeData::class(n, n, None, Span::new(0, 1)))
    }

    #[test]
    fn builtin_matrix() {
        let interner = StringInterner::new();
        let table = TypeTable::new(&interner);
        assert_eq!(
            classify_conversion(&table, TypeId::INT, TypeId::INT),
            Conversion::Identity
        );
        assert_eq!(
            classify_conversion(&table, TypeId::INT, TypeId::OBJECT),
            Conversion::Implicit
        );
        assert_eq!(
            classify_conversion(&table, TypeId::OBJECT, TypeId::INT),
            Conversion::Explicit
        );
        assert_eq!(
            classify_conversion(&table, TypeId::INT, TypeId::STRING),
            Conversion::Explicit
        );
        assert_eq!(
            classify_conversion(&table, TypeId::STRING, TypeId::BOOL),
            Conversion::Explicit
        );
        assert_eq!(
            classify_conversion(&table, TypeId::INT, TypeId::BOOL),
            Conversion::None
        );
        assert_eq!(
            classify_conversion(&table, TypeId::VOID, TypeId::INT),
            Conversion::None
        );
    }

    #[test]
    fn class_hierarchy_casts() {
        let interner = StringInterner::new();
        let mut table = TypeTable::new(&interner);
        let base = class(&mut table, &interner, "Base");
        let derived = class(&mut table, &interner, "Derived");
        let other = class(&mut table, &interner, "Other");
        table.set_bases(derived, vec![TypeId::OBJECT, base]);

        assert_eq!(
            classify_conversion(&table, derived, base),
            Conversion::Implicit
        );
        assert_eq!(
            classify_conversion(&table, base, derived),
            Conversion::Explicit
        );
        assert_eq!(classify_conversion(&table, base, other), Conversion::None);
        assert_eq!(
            classify_conversion(&table, derived, TypeId::OBJECT),
            Conversion::Implicit
        );
    }

    #[test]
    fn type_parameter_targets_use_constraints() {
        let interner = StringInterner::new();
        let mut table = TypeTable::new(&interner);
        let base = class(&mut table, &interner, "Base");
        let derived = class(&mut table, &interner, "Derived");
        table.set_bases(derived, vec![base]);
        let t = table.alloc_type(TypeData::type_parameter(interner.intern("T")));
        table.set_constraints(t, vec![base]);

        // Derived satisfies `T : Base`; Base itself does too.
        assert_eq!(classify_conversion(&table, derived, t), Conversion::Implicit);
        assert_eq!(classify_conversion(&table, base, t), Conversion::Implicit);
        // int does not.
        assert_eq!(classify_conversion(&table, TypeId::INT, t), Conversion::None);
        // A T value is usable where its constraint type is expected.
        assert_eq!(classify_conversion(&table, t, base), Conversion::Implicit);
        assert_eq!(classify_conversion(&table, t, TypeId::OBJECT), Conversion::Implicit);
    }
}
