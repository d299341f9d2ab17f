use quill_ir::bound::LocalId;
use quill_ir::{Span, StringInterner};

use super::*;
use crate::TypeData;

fn setup() -> (StringInterner, TypeTable) {
    let interner = StringInterner::new();
    let table = TypeTable::new(&interner);
    (interner, table)
}

#[test]
fn variable_declaration_fails_against_enclosing_scopes() {
    let (interner, _table) = setup();
    let x = interner.intern("x");
    let y = interner.intern("y");

    let mut scopes = ScopeArena::new();
    let outer = scopes.push_scope(None);
    let inner = scopes.push_scope(Some(outer));

    assert!(scopes.declare_variable(outer, x, LocalId::from_raw(0)));
    // Same name anywhere up the chain collides...
    assert!(!scopes.declare_variable(inner, x, LocalId::from_raw(1)));
    // ...and so does a duplicate in the same scope.
    assert!(scopes.declare_variable(inner, y, LocalId::from_raw(1)));
    assert!(!scopes.declare_variable(inner, y, LocalId::from_raw(2)));

    assert_eq!(scopes.lookup_variable(inner, x), Some(LocalId::from_raw(0)));
    assert_eq!(scopes.lookup_variable(inner, y), Some(LocalId::from_raw(1)));
    assert_eq!(scopes.lookup_variable(outer, y), None);
}

#[test]
fn variable_may_shadow_type_or_member() {
    let (interner, mut table) = setup();
    let point = interner.intern("Point");
    let ty = table.alloc_type(TypeData::class(point, point, None, Span::new(0, 1)));

    let mut scopes = ScopeArena::new();
    let global = scopes.push_scope(None);
    let body = scopes.push_scope(Some(global));
    assert!(scopes.declare_type(global, point, ty, false, None, &table, &interner));

    // A variable named like a visible type is shadowing, not a collision.
    assert!(scopes.declare_variable(body, point, LocalId::from_raw(0)));
    assert_eq!(
        scopes.lookup_variable(body, point),
        Some(LocalId::from_raw(0))
    );
    // The type is still findable.
    assert_eq!(
        scopes.lookup_type(body, point, None, &table, &interner),
        Some(ty)
    );
}

#[test]
fn type_declaration_rejects_visible_duplicate() {
    let (interner, mut table) = setup();
    let name = interner.intern("C");
    let a = table.alloc_type(TypeData::class(name, name, None, Span::new(0, 1)));
    let b = table.alloc_type(TypeData::class(name, name, None, Span::new(2, 3)));

    let mut scopes = ScopeArena::new();
    let global = scopes.push_scope(None);
    let inner = scopes.push_scope(Some(global));

    assert!(scopes.declare_type(global, name, a, false, None, &table, &interner));
    // Visible through the chain: rejected, no mutation.
    assert!(!scopes.declare_type(inner, name, b, false, None, &table, &interner));
    assert_eq!(scopes.all_types(), &[a]);
}

#[test]
fn scope_tied_types_stay_out_of_all_types() {
    let (interner, mut table) = setup();
    let t = interner.intern("T");
    let param = table.alloc_type(TypeData::type_parameter(t));

    let mut scopes = ScopeArena::new();
    let global = scopes.push_scope(None);
    let class_scope = scopes.push_scope(Some(global));

    assert!(scopes.declare_type(class_scope, t, param, true, None, &table, &interner));
    assert!(scopes.all_types().is_empty());
    // Visible while the defining scope is active...
    assert_eq!(
        scopes.lookup_type(class_scope, t, None, &table, &interner),
        Some(param)
    );
    // ...but not from a sibling chain.
    let sibling = scopes.push_scope(Some(global));
    assert_eq!(scopes.lookup_type(sibling, t, None, &table, &interner), None);
}

#[test]
fn namespace_qualified_lookup() {
    let (interner, mut table) = setup();
    let ns_name = interner.intern("Collections");
    let ns = table.declare_namespace(ns_name);
    let list = interner.intern("List");
    let full = interner.intern("Collections.List");
    let ty = table.alloc_type(TypeData::class(list, full, Some(ns), Span::new(0, 1)));

    let mut scopes = ScopeArena::new();
    let global = scopes.push_scope(None);
    let ns_scope = scopes.push_scope(Some(global));
    assert!(scopes.declare_type(ns_scope, list, ty, false, Some(ns), &table, &interner));

    // Bare name resolves inside the namespace's own chain.
    assert_eq!(
        scopes.lookup_type(ns_scope, list, Some(ns), &table, &interner),
        Some(ty)
    );
    // From the global chain the bare name is not in scope, but the
    // qualified name and the supplied-namespace qualification both hit the
    // chain-wide list.
    assert_eq!(scopes.lookup_type(global, list, None, &table, &interner), None);
    assert_eq!(
        scopes.lookup_type(global, full, None, &table, &interner),
        Some(ty)
    );
    assert_eq!(
        scopes.lookup_type(global, list, Some(ns), &table, &interner),
        Some(ty)
    );
}

#[test]
fn namespace_merging_is_not_an_error() {
    let (interner, mut table) = setup();
    let a = interner.intern("A");
    let ns1 = table.declare_namespace(a);
    let ns2 = table.declare_namespace(a);
    assert_eq!(ns1, ns2);

    let mut scopes = ScopeArena::new();
    let global = scopes.push_scope(None);
    scopes.declare_namespace(global, a, ns1);
    scopes.declare_namespace(global, a, ns2);
    assert_eq!(scopes.declared_namespaces(global), &[ns1]);
    assert_eq!(scopes.lookup_namespace(global, a), Some(ns1));
}

#[test]
fn member_entries_block_type_declaration() {
    let (interner, mut table) = setup();
    let name = interner.intern("x");
    let ty = table.alloc_type(TypeData::class(name, name, None, Span::new(0, 1)));

    let mut scopes = ScopeArena::new();
    let class_scope = scopes.push_scope(None);
    scopes.declare_member(
        class_scope,
        name,
        ScopeEntry::Field(quill_ir::FieldId::from_raw(0)),
    );
    assert!(!scopes.declare_type(class_scope, name, ty, false, None, &table, &interner));
}
