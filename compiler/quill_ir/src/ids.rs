//! Symbol id newtypes.
//!
//! All symbols are stored in pools owned by the type table and referenced
//! by 32-bit indices. Type equality is O(1) index comparison: distinct
//! generic-instantiation signatures intern to distinct ids, so structural
//! identity is enforced at interning time, not comparison time.

use std::fmt;

/// A 32-bit index into the type pool.
///
/// The six builtin types occupy fixed indices and are pre-seeded at pool
/// creation; user classes, generic parameters, and instantiations follow.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct TypeId(u32);

impl TypeId {
    /// The `error` type - placeholder for failed binding, propagates
    /// silently through later checks.
    pub const ERROR: Self = Self(0);
    /// The `void` type (method with no return value).
    pub const VOID: Self = Self(1);
    /// The `bool` type.
    pub const BOOL: Self = Self(2);
    /// The `int` type (64-bit signed integer).
    pub const INT: Self = Self(3);
    /// The `string` type.
    pub const STRING: Self = Self(4);
    /// The `object` type - universal base of every class.
    pub const OBJECT: Self = Self(5);

    /// Number of pre-seeded builtin types.
    pub const BUILTIN_COUNT: u32 = 6;

    /// Create an id from a raw u32 value.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Index into the pool's storage.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Check if this is one of the builtin types.
    #[inline]
    pub const fn is_builtin(self) -> bool {
        self.0 < Self::BUILTIN_COUNT
    }

    /// Check if this is the `error` type.
    #[inline]
    pub const fn is_error(self) -> bool {
        self.0 == Self::ERROR.0
    }

    /// Check if this is the `void` type.
    #[inline]
    pub const fn is_void(self) -> bool {
        self.0 == Self::VOID.0
    }

    /// Get the name for builtin types, `None` for user types that require
    /// the type table to render.
    #[inline]
    pub const fn builtin_name(self) -> Option<&'static str> {
        match self.0 {
            0 => Some("error"),
            1 => Some("void"),
            2 => Some("bool"),
            3 => Some("int"),
            4 => Some("string"),
            5 => Some("object"),
            _ => None,
        }
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.builtin_name() {
            Some(name) => write!(f, "TypeId::{}", name.to_uppercase()),
            None => write!(f, "TypeId({})", self.0),
        }
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.builtin_name() {
            Some(name) => write!(f, "{name}"),
            None => write!(f, "type#{}", self.0),
        }
    }
}

macro_rules! symbol_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Create an id from a raw u32 value.
            #[inline]
            pub const fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            /// Get the raw u32 value.
            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }

            /// Index into the owning pool's storage.
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

symbol_id! {
    /// Index of a method symbol in the type table's method pool.
    MethodId
}
symbol_id! {
    /// Index of a field symbol in the type table's field pool.
    FieldId
}
symbol_id! {
    /// Index of a namespace symbol in the type table's namespace pool.
    NamespaceId
}
symbol_id! {
    /// Index of a lowered method body in the bound program.
    BodyId
}

// Compile-time size assertions: ids must stay 4 bytes.
const _: () = assert!(std::mem::size_of::<TypeId>() == 4);
const _: () = assert!(std::mem::size_of::<MethodId>() == 4);
