//! Symbol model: member symbols, namespaces, and symbol kinds.

use bitflags::bitflags;

use quill_ir::{BodyId, Name, Span, TypeId};

/// The kind of a symbol, used for scope-entry classification and
/// declaration identity.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum SymbolKind {
    Variable,
    Parameter,
    Type,
    Method,
    Field,
    Namespace,
}

bitflags! {
    /// Member modifier set.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct MemberFlags: u8 {
        const STATIC = 1 << 0;
        const VIRTUAL = 1 << 1;
        const OVERRIDE = 1 << 2;
    }
}

/// A method parameter.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ParameterSymbol {
    pub name: Name,
    pub ty: TypeId,
    pub span: Span,
}

/// A method symbol.
///
/// Dispatch is by name only - there is no parameter-list-based overload
/// resolution, so a type's method table holds at most one method per name.
#[derive(Clone, Debug)]
pub struct MethodSymbol {
    pub name: Name,
    /// Span of the declaring name, for diagnostics.
    pub span: Span,
    pub containing_type: TypeId,
    pub return_type: TypeId,
    pub flags: MemberFlags,
    pub params: Vec<ParameterSymbol>,
    /// Synthetic type-parameter symbols of a generic method.
    pub generic_params: Vec<TypeId>,
    /// Attached after body binding and lowering; `None` until then.
    pub body: Option<BodyId>,
}

impl MethodSymbol {
    pub fn is_static(&self) -> bool {
        self.flags.contains(MemberFlags::STATIC)
    }

    pub fn is_virtual(&self) -> bool {
        self.flags.contains(MemberFlags::VIRTUAL)
    }

    pub fn is_override(&self) -> bool {
        self.flags.contains(MemberFlags::OVERRIDE)
    }

    pub fn is_generic(&self) -> bool {
        !self.generic_params.is_empty()
    }
}

/// A field symbol.
#[derive(Clone, Debug)]
pub struct FieldSymbol {
    pub name: Name,
    /// Span of the declaring name, for diagnostics.
    pub span: Span,
    pub containing_type: TypeId,
    pub ty: TypeId,
    pub flags: MemberFlags,
}

impl FieldSymbol {
    pub fn is_static(&self) -> bool {
        self.flags.contains(MemberFlags::STATIC)
    }
}

/// A namespace symbol. Repeated namespace blocks with the same full name
/// merge into one symbol.
#[derive(Clone, Debug)]
pub struct NamespaceSymbol {
    /// Dotted full name, e.g. `Collections.Generic`.
    pub full_name: Name,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_flags_compose() {
        let flags = MemberFlags::STATIC | MemberFlags::VIRTUAL;
        assert!(flags.contains(MemberFlags::STATIC));
        assert!(!flags.contains(MemberFlags::OVERRIDE));
    }

    #[test]
    fn method_flag_helpers() {
        let method = MethodSymbol {
            name: Name::from_raw(1),
            span: Span::DUMMY,
            containing_type: TypeId::OBJECT,
            return_type: TypeId::VOID,
            flags: MemberFlags::OVERRIDE,
            params: Vec::new(),
            generic_params: Vec::new(),
            body: None,
        };
        assert!(method.is_override());
        assert!(!method.is_static());
        assert!(!method.is_generic());
    }
}
