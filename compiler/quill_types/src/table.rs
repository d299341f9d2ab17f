//! The type table: one pool of type symbols for a whole compilation.
//!
//! Types are referenced by `TypeId` and compared by id. The six builtins
//! occupy fixed indices; classes, generic parameters, and instantiations
//! follow. A distinct generic-instantiation signature (definition plus
//! element-wise argument list) interns to exactly one id, so structural
//! identity of instantiations is enforced at creation time.
//!
//! Member lookup is a depth-first search over the base-type set with a
//! visited set keyed by id, which both handles types reachable through
//! two inheritance paths and terminates on accidental cycles.

use rustc_hash::{FxHashMap, FxHashSet};

use quill_ir::{BodyId, FieldId, MethodId, Name, NamespaceId, Span, StringInterner, TypeId};

use crate::{FieldSymbol, MethodSymbol, NamespaceSymbol};

/// Data carried by one type symbol.
#[derive(Clone, Debug)]
pub struct TypeData {
    /// Simple name (`List`).
    pub name: Name,
    /// Namespace-qualified name (`Collections.List`); equals `name` for
    /// global types.
    pub full_name: Name,
    pub namespace: Option<NamespaceId>,
    /// Span of the declaring name; `None` for builtins and synthesized
    /// symbols.
    pub declaration: Option<Span>,
    /// Base types. A set: never contains duplicates. Cycles back to the
    /// type itself are diagnosed explicitly, not prevented by
    /// construction.
    pub bases: Vec<TypeId>,
    /// Method table, insertion order.
    pub methods: Vec<MethodId>,
    /// Field table, insertion order.
    pub fields: Vec<FieldId>,
    /// An unbound declaration with type parameters (`List<T>`).
    pub is_generic_definition: bool,
    /// Synthetic per-parameter type symbols of a generic definition.
    pub generic_params: Vec<TypeId>,
    /// Constraint list; only type-parameter symbols carry one.
    pub constraints: Vec<TypeId>,
    /// Set on instantiations only.
    pub generic_definition: Option<TypeId>,
    /// Identity of an instantiation: substituted argument list.
    pub generic_args: Vec<TypeId>,
    pub is_type_parameter: bool,
    /// Phase-1 symbol usable only for name resolution in the throwaway
    /// search scope; excluded from program enumeration.
    pub provisional: bool,
}

impl TypeData {
    /// A class declaration shell; member tables start empty.
    pub fn class(name: Name, full_name: Name, namespace: Option<NamespaceId>, span: Span) -> Self {
        TypeData {
            name,
            full_name,
            namespace,
            declaration: Some(span),
            bases: Vec::new(),
            methods: Vec::new(),
            fields: Vec::new(),
            is_generic_definition: false,
            generic_params: Vec::new(),
            constraints: Vec::new(),
            generic_definition: None,
            generic_args: Vec::new(),
            is_type_parameter: false,
            provisional: false,
        }
    }

    /// A synthetic generic-parameter symbol with the implicit `object`
    /// base and an initially empty constraint list.
    pub fn type_parameter(name: Name) -> Self {
        TypeData {
            name,
            full_name: name,
            namespace: None,
            declaration: None,
            bases: vec![TypeId::OBJECT],
            methods: Vec::new(),
            fields: Vec::new(),
            is_generic_definition: false,
            generic_params: Vec::new(),
            constraints: Vec::new(),
            generic_definition: None,
            generic_args: Vec::new(),
            is_type_parameter: true,
            provisional: false,
        }
    }

    fn builtin(name: Name) -> Self {
        TypeData {
            name,
            full_name: name,
            namespace: None,
            declaration: None,
            bases: Vec::new(),
            methods: Vec::new(),
            fields: Vec::new(),
            is_generic_definition: false,
            generic_params: Vec::new(),
            constraints: Vec::new(),
            generic_definition: None,
            generic_args: Vec::new(),
            is_type_parameter: false,
            provisional: false,
        }
    }

    pub fn is_generic_instantiation(&self) -> bool {
        self.generic_definition.is_some()
    }
}

/// Why a method could not be declared.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MethodDeclareError {
    /// The method name equals the containing type's name.
    SharesTypeName,
    /// A method of this name is already in the type's own table.
    DuplicateMethod(MethodId),
    /// A field of this name exists on the type or a base.
    CollidesWithField(FieldId),
    /// A same-named inherited method is not virtual.
    HidesNonVirtual(MethodId),
    /// Every same-named inherited method is virtual but the new method is
    /// not marked `override`.
    MissingOverride(MethodId),
    /// The method is marked `override` but no base declares the name.
    OverrideWithoutBase,
}

/// Why a field could not be declared.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldDeclareError {
    /// The field name equals the containing type's name.
    SharesTypeName,
    /// A field of this name exists on the type or a base.
    DuplicateField(FieldId),
    /// A method of this name exists on the type or a base.
    CollidesWithMethod(MethodId),
}

/// A generic argument failing a constraint.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ConstraintViolation {
    /// Position of the offending argument.
    pub index: usize,
    /// The constrained type parameter.
    pub param: TypeId,
    /// The supplied argument.
    pub argument: TypeId,
    /// The violated constraint type.
    pub constraint: TypeId,
}

/// The pool of type, method, field, and namespace symbols.
pub struct TypeTable {
    types: Vec<TypeData>,
    methods: Vec<MethodSymbol>,
    fields: Vec<FieldSymbol>,
    namespaces: Vec<NamespaceSymbol>,
    namespace_by_name: FxHashMap<Name, NamespaceId>,
    type_by_full_name: FxHashMap<Name, TypeId>,
    instantiations: FxHashMap<(TypeId, Vec<TypeId>), TypeId>,
    sealed: bool,
}

impl TypeTable {
    /// Create a table with the six builtins pre-seeded at their fixed
    /// indices.
    pub fn new(interner: &StringInterner) -> Self {
        let mut table = TypeTable {
            types: Vec::with_capacity(16),
            methods: Vec::new(),
            fields: Vec::new(),
            namespaces: Vec::new(),
            namespace_by_name: FxHashMap::default(),
            type_by_full_name: FxHashMap::default(),
            instantiations: FxHashMap::default(),
            sealed: false,
        };
        for builtin in ["error", "void", "bool", "int", "string", "object"] {
            table.types.push(TypeData::builtin(interner.intern(builtin)));
        }
        debug_assert_eq!(table.types.len() as u32, TypeId::BUILTIN_COUNT);
        table
    }

    fn assert_unsealed(&self) {
        debug_assert!(!self.sealed, "type table mutated after sealing");
    }

    /// Seal the table: declaration and base-set mutation past this point
    /// is a defect. Interning new instantiations and attaching bodies
    /// stays legal - both happen during body binding, and each touches a
    /// symbol exactly once.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    // Accessors

    pub fn type_data(&self, ty: TypeId) -> &TypeData {
        &self.types[ty.index()]
    }

    /// The symbol whose member tables and base set back `ty`: the type
    /// itself, or - for a generic instantiation - its definition.
    /// Instantiations share the definition's tables rather than owning
    /// copies, so members and bases declared after interning are visible.
    fn backing(&self, ty: TypeId) -> &TypeData {
        let data = &self.types[ty.index()];
        match data.generic_definition {
            Some(definition) => &self.types[definition.index()],
            None => data,
        }
    }

    /// Method table backing a type (shared with the definition for
    /// instantiations), insertion order.
    pub fn methods_of(&self, ty: TypeId) -> &[MethodId] {
        &self.backing(ty).methods
    }

    /// Field table backing a type, insertion order.
    pub fn fields_of(&self, ty: TypeId) -> &[FieldId] {
        &self.backing(ty).fields
    }

    /// Base set backing a type.
    pub fn bases_of(&self, ty: TypeId) -> &[TypeId] {
        &self.backing(ty).bases
    }

    pub fn method(&self, id: MethodId) -> &MethodSymbol {
        &self.methods[id.index()]
    }

    pub fn field(&self, id: FieldId) -> &FieldSymbol {
        &self.fields[id.index()]
    }

    pub fn namespace(&self, id: NamespaceId) -> &NamespaceSymbol {
        &self.namespaces[id.index()]
    }

    /// All methods in declaration order.
    pub fn methods(&self) -> impl Iterator<Item = (MethodId, &MethodSymbol)> {
        self.methods
            .iter()
            .enumerate()
            .map(|(i, m)| (MethodId::from_raw(i as u32), m))
    }

    /// Ids of all program-level types: declared classes and their
    /// instantiations, excluding builtins, type parameters, and
    /// provisional phase-1 symbols.
    pub fn declared_types(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.types.iter().enumerate().filter_map(|(i, data)| {
            let id = TypeId::from_raw(i as u32);
            if id.is_builtin() || data.is_type_parameter || data.provisional {
                None
            } else {
                Some(id)
            }
        })
    }

    // Allocation

    pub fn alloc_type(&mut self, data: TypeData) -> TypeId {
        let id = TypeId::from_raw(index_u32(self.types.len()));
        self.types.push(data);
        id
    }

    /// Record a class under its full name for cross-namespace lookup. The
    /// first declaration wins; redeclarations are diagnosed separately.
    pub fn register_full_name(&mut self, ty: TypeId) {
        self.assert_unsealed();
        let full_name = self.types[ty.index()].full_name;
        self.type_by_full_name.entry(full_name).or_insert(ty);
    }

    pub fn type_named(&self, full_name: Name) -> Option<TypeId> {
        self.type_by_full_name.get(&full_name).copied()
    }

    /// Replace a type's base set. The caller guarantees set semantics
    /// (no duplicates).
    pub fn set_bases(&mut self, ty: TypeId, bases: Vec<TypeId>) {
        self.assert_unsealed();
        debug_assert!(no_duplicates(&bases), "base set contains duplicates");
        self.types[ty.index()].bases = bases;
    }

    /// Replace a type parameter's constraint list.
    pub fn set_constraints(&mut self, param: TypeId, constraints: Vec<TypeId>) {
        self.assert_unsealed();
        debug_assert!(self.types[param.index()].is_type_parameter);
        self.types[param.index()].constraints = constraints;
    }

    /// Declare or merge a namespace by full name.
    pub fn declare_namespace(&mut self, full_name: Name) -> NamespaceId {
        if let Some(&id) = self.namespace_by_name.get(&full_name) {
            return id;
        }
        self.assert_unsealed();
        let id = NamespaceId::from_raw(index_u32(self.namespaces.len()));
        self.namespaces.push(NamespaceSymbol { full_name });
        self.namespace_by_name.insert(full_name, id);
        id
    }

    pub fn namespace_named(&self, full_name: Name) -> Option<NamespaceId> {
        self.namespace_by_name.get(&full_name).copied()
    }

    // Member lookup

    /// Find a method by name on a type or any of its bases, depth-first.
    ///
    /// The visited set guards against revisiting a type reached through
    /// two inheritance paths and terminates on accidental base cycles.
    pub fn lookup_method(&self, ty: TypeId, name: Name) -> Option<MethodId> {
        let mut visited = FxHashSet::default();
        self.lookup_method_inner(ty, name, &mut visited)
    }

    fn lookup_method_inner(
        &self,
        ty: TypeId,
        name: Name,
        visited: &mut FxHashSet<TypeId>,
    ) -> Option<MethodId> {
        if !visited.insert(ty) {
            return None;
        }
        let data = self.backing(ty);
        for &method in &data.methods {
            if self.methods[method.index()].name == name {
                return Some(method);
            }
        }
        for &base in &data.bases {
            if let Some(found) = self.lookup_method_inner(base, name, visited) {
                return Some(found);
            }
        }
        None
    }

    /// Find a field by name on a type or any of its bases, depth-first.
    pub fn lookup_field(&self, ty: TypeId, name: Name) -> Option<FieldId> {
        let mut visited = FxHashSet::default();
        self.lookup_field_inner(ty, name, &mut visited)
    }

    fn lookup_field_inner(
        &self,
        ty: TypeId,
        name: Name,
        visited: &mut FxHashSet<TypeId>,
    ) -> Option<FieldId> {
        if !visited.insert(ty) {
            return None;
        }
        let data = self.backing(ty);
        for &field in &data.fields {
            if self.fields[field.index()].name == name {
                return Some(field);
            }
        }
        for &base in &data.bases {
            if let Some(found) = self.lookup_field_inner(base, name, visited) {
                return Some(found);
            }
        }
        None
    }

    /// Every same-named method contributed by the base closure (the type's
    /// own table excluded), in depth-first order.
    pub fn inherited_methods_named(&self, ty: TypeId, name: Name) -> Vec<MethodId> {
        let mut visited = FxHashSet::default();
        visited.insert(ty);
        let mut found = Vec::new();
        for &base in &self.backing(ty).bases {
            self.collect_methods_named(base, name, &mut visited, &mut found);
        }
        found
    }

    fn collect_methods_named(
        &self,
        ty: TypeId,
        name: Name,
        visited: &mut FxHashSet<TypeId>,
        found: &mut Vec<MethodId>,
    ) {
        if !visited.insert(ty) {
            return;
        }
        let data = self.backing(ty);
        for &method in &data.methods {
            if self.methods[method.index()].name == name {
                found.push(method);
            }
        }
        for &base in &data.bases {
            self.collect_methods_named(base, name, visited, found);
        }
    }

    /// The deduplicated transitive base closure of a type, in depth-first
    /// discovery order. The type itself is not included.
    pub fn base_closure(&self, ty: TypeId) -> Vec<TypeId> {
        let mut visited = FxHashSet::default();
        visited.insert(ty);
        let mut closure = Vec::new();
        self.collect_bases(ty, &mut visited, &mut closure);
        closure
    }

    fn collect_bases(&self, ty: TypeId, visited: &mut FxHashSet<TypeId>, out: &mut Vec<TypeId>) {
        for &base in &self.backing(ty).bases {
            if visited.insert(base) {
                out.push(base);
                self.collect_bases(base, visited, out);
            }
        }
    }

    // Member declaration

    /// Declare a method into a type's method table.
    ///
    /// Rejects a method whose name equals the containing type's name,
    /// collides with a field, or collides with an inherited method -
    /// unless every same-named inherited method is virtual and the new
    /// method is `override`. On success, appends in insertion order.
    pub fn try_declare_method(
        &mut self,
        ty: TypeId,
        method: MethodSymbol,
    ) -> Result<MethodId, MethodDeclareError> {
        self.assert_unsealed();
        let name = method.name;
        if name == self.types[ty.index()].name {
            return Err(MethodDeclareError::SharesTypeName);
        }
        for &existing in &self.types[ty.index()].methods {
            if self.methods[existing.index()].name == name {
                return Err(MethodDeclareError::DuplicateMethod(existing));
            }
        }
        if let Some(field) = self.lookup_field(ty, name) {
            return Err(MethodDeclareError::CollidesWithField(field));
        }
        let inherited = self.inherited_methods_named(ty, name);
        if inherited.is_empty() {
            if method.is_override() {
                return Err(MethodDeclareError::OverrideWithoutBase);
            }
        } else {
            if let Some(&non_virtual) = inherited
                .iter()
                .find(|&&m| !self.methods[m.index()].is_virtual())
            {
                return Err(MethodDeclareError::HidesNonVirtual(non_virtual));
            }
            if !method.is_override() {
                return Err(MethodDeclareError::MissingOverride(inherited[0]));
            }
        }

        let id = MethodId::from_raw(index_u32(self.methods.len()));
        self.methods.push(method);
        self.types[ty.index()].methods.push(id);
        Ok(id)
    }

    /// Declare a field into a type's field table.
    pub fn try_declare_field(
        &mut self,
        ty: TypeId,
        field: FieldSymbol,
    ) -> Result<FieldId, FieldDeclareError> {
        self.assert_unsealed();
        let name = field.name;
        if name == self.types[ty.index()].name {
            return Err(FieldDeclareError::SharesTypeName);
        }
        if let Some(existing) = self.lookup_field(ty, name) {
            return Err(FieldDeclareError::DuplicateField(existing));
        }
        if let Some(method) = self.lookup_method(ty, name) {
            return Err(FieldDeclareError::CollidesWithMethod(method));
        }

        let id = FieldId::from_raw(index_u32(self.fields.len()));
        self.fields.push(field);
        self.types[ty.index()].fields.push(id);
        Ok(id)
    }

    /// Attach a lowered body to a method. Bodies are attached exactly
    /// once.
    pub fn attach_body(&mut self, method: MethodId, body: BodyId) {
        let slot = &mut self.methods[method.index()].body;
        assert!(slot.is_none(), "method body attached twice");
        *slot = Some(body);
    }

    // Casting and constraints

    /// Transitive base-walk subtype check. Identity is not included.
    pub fn is_subclass_of(&self, ty: TypeId, ancestor: TypeId) -> bool {
        let mut visited = FxHashSet::default();
        self.is_subclass_inner(ty, ancestor, &mut visited)
    }

    fn is_subclass_inner(
        &self,
        ty: TypeId,
        ancestor: TypeId,
        visited: &mut FxHashSet<TypeId>,
    ) -> bool {
        if !visited.insert(ty) {
            return false;
        }
        for &base in &self.backing(ty).bases {
            if base == ancestor || self.is_subclass_inner(base, ancestor, visited) {
                return true;
            }
        }
        false
    }

    /// A type can always be cast to itself, to `object`, or to any of its
    /// (possibly repeated, multi-path) ancestors.
    pub fn can_cast_to(&self, from: TypeId, to: TypeId) -> bool {
        from == to || to == TypeId::OBJECT || self.is_subclass_of(from, to)
    }

    /// Validate generic arguments against the corresponding parameters'
    /// constraint lists. Satisfaction means the argument can be cast to
    /// every constraint type.
    pub fn check_constraints(&self, params: &[TypeId], args: &[TypeId]) -> Vec<ConstraintViolation> {
        debug_assert_eq!(params.len(), args.len());
        let mut violations = Vec::new();
        for (index, (&param, &arg)) in params.iter().zip(args).enumerate() {
            if arg.is_error() {
                continue;
            }
            for &constraint in &self.types[param.index()].constraints {
                if !self.can_cast_to(arg, constraint) {
                    violations.push(ConstraintViolation {
                        index,
                        param,
                        argument: arg,
                        constraint,
                    });
                }
            }
        }
        violations
    }

    /// Intern the instantiation of a generic definition with the given
    /// argument list.
    ///
    /// The instantiation shares the definition's method and field tables;
    /// the substituted argument list is its identity. Repeated requests
    /// with an equal argument list return the same id.
    pub fn instantiate(&mut self, definition: TypeId, args: Vec<TypeId>) -> TypeId {
        debug_assert!(self.types[definition.index()].is_generic_definition);
        debug_assert_eq!(args.len(), self.types[definition.index()].generic_params.len());
        if let Some(&id) = self.instantiations.get(&(definition, args.clone())) {
            return id;
        }

        // Member tables and the base set stay with the definition; the
        // instantiation's own vectors stay empty and every lookup
        // delegates through `backing`.
        let def = &self.types[definition.index()];
        let data = TypeData {
            name: def.name,
            full_name: def.full_name,
            namespace: def.namespace,
            declaration: def.declaration,
            bases: Vec::new(),
            methods: Vec::new(),
            fields: Vec::new(),
            is_generic_definition: false,
            generic_params: Vec::new(),
            constraints: Vec::new(),
            generic_definition: Some(definition),
            generic_args: args.clone(),
            is_type_parameter: false,
            provisional: def.provisional,
        };
        let id = self.alloc_type(data);
        self.instantiations.insert((definition, args), id);
        tracing::debug!(definition = definition.raw(), instantiation = id.raw(), "interned generic instantiation");
        id
    }

    /// Render a type for diagnostics: `int`, `Point`, `Ns.List<int>`.
    pub fn display(&self, ty: TypeId, interner: &StringInterner) -> String {
        if let Some(builtin) = ty.builtin_name() {
            return builtin.to_owned();
        }
        let data = &self.types[ty.index()];
        let base = interner.lookup(data.full_name).to_owned();
        if data.generic_args.is_empty() && data.generic_params.is_empty() {
            return base;
        }
        let args: Vec<String> = if data.generic_args.is_empty() {
            data.generic_params
                .iter()
                .map(|&p| self.display(p, interner))
                .collect()
        } else {
            data.generic_args
                .iter()
                .map(|&a| self.display(a, interner))
                .collect()
        };
        format!("{base}<{}>", args.join(", "))
    }
}

fn index_u32(len: usize) -> u32 {
    u32::try_from(len).unwrap_or_else(|_| panic!("symbol pool overflow: {len} entries"))
}

fn no_duplicates(ids: &[TypeId]) -> bool {
    let mut seen = FxHashSet::default();
    ids.iter().all(|&id| seen.insert(id))
}
