use std::rc::Rc;

use super::symbol_table::{ScopeKind, ScopeTree, Signature, Symbol, SymbolKind};
use crate::{
    ast::types::Type,
    labels::location::{Location, Region},
    Position,
};

fn at(line: u32) -> Position {
    Position::new(0, line, Rc::new("test.go".to_string()))
}

#[test]
fn test_lookup_walks_parents() {
    let mut tree = ScopeTree::new();
    let global = tree.global();
    tree.insert(global, Symbol::new("x", Type::Int, SymbolKind::Variable, at(1)))
        .unwrap();

    let main = tree.create_scope("main", ScopeKind::Function, Some(global));
    tree.insert(main, Symbol::new("y", Type::Bool, SymbolKind::Variable, at(2)))
        .unwrap();

    assert_eq!(tree.lookup(main, "x").unwrap().ty, Type::Int);
    assert_eq!(tree.lookup(main, "y").unwrap().ty, Type::Bool);
    assert!(tree.lookup(global, "y").is_none());
    assert_eq!(tree.lookup_scope(main, "x"), Some(global));
}

#[test]
fn test_inner_declaration_shadows_outer() {
    let mut tree = ScopeTree::new();
    let global = tree.global();
    tree.insert(global, Symbol::new("x", Type::Int, SymbolKind::Variable, at(1)))
        .unwrap();
    let main = tree.create_scope("main", ScopeKind::Function, Some(global));
    tree.insert(main, Symbol::new("x", Type::String, SymbolKind::Variable, at(3)))
        .unwrap();

    assert_eq!(tree.lookup(main, "x").unwrap().ty, Type::String);
}

#[test]
fn test_duplicate_insert_reported() {
    let mut tree = ScopeTree::new();
    let global = tree.global();
    tree.insert(global, Symbol::new("x", Type::Int, SymbolKind::Variable, at(1)))
        .unwrap();

    let error = tree
        .insert(global, Symbol::new("x", Type::Int, SymbolKind::Variable, at(4)))
        .unwrap_err();

    assert_eq!(error.get_error_name(), "DuplicateDeclaration");
    assert_eq!(error.get_position().line, 4);
    // The original declaration is kept
    assert_eq!(tree.scope(global).len(), 1);
    assert_eq!(tree.lookup(global, "x").unwrap().position.line, 1);
}

#[test]
fn test_find_scope_registry() {
    let mut tree = ScopeTree::new();
    let global = tree.global();
    let point = tree.create_scope("Point", ScopeKind::Struct, Some(global));
    let fmt = tree.create_scope("fmt", ScopeKind::Package, Some(global));

    assert_eq!(tree.find_scope("Point"), Some(point));
    assert_eq!(tree.find_scope("fmt"), Some(fmt));
    assert_eq!(tree.scope(fmt).kind, ScopeKind::Package);
    assert!(tree.find_scope("missing").is_none());
    assert!(tree.require_scope("missing", &at(1)).is_err());
}

#[test]
fn test_symbols_keep_insertion_order() {
    let mut tree = ScopeTree::new();
    let scope = tree.create_scope("f", ScopeKind::Function, Some(tree.global()));
    for name in ["c", "a", "b"] {
        tree.insert(scope, Symbol::new(name, Type::Int, SymbolKind::Variable, at(1)))
            .unwrap();
    }

    let names: Vec<&str> = tree
        .scope(scope)
        .symbols()
        .iter()
        .map(|symbol| symbol.name.as_str())
        .collect();
    assert_eq!(names, vec!["c", "a", "b"]);
}

#[test]
fn test_location_written_once() {
    let mut symbol = Symbol::new("x", Type::Int, SymbolKind::Variable, at(1));

    symbol
        .assign_location(Location::new(Region::Global, 0))
        .unwrap();
    let error = symbol
        .assign_location(Location::new(Region::Global, 8))
        .unwrap_err();

    assert_eq!(error.get_error_name(), "AttributeReassigned");
    assert_eq!(symbol.location, Some(Location::new(Region::Global, 0)));
}

#[test]
fn test_dump_lists_scopes() {
    let mut tree = ScopeTree::new();
    let global = tree.global();
    tree.insert(
        global,
        Symbol::function("add", Signature::new(vec![Type::Int, Type::Int], Type::Int), at(1)),
    )
    .unwrap();
    tree.create_scope("add", ScopeKind::Function, Some(global));

    let dump = tree.to_string();
    assert!(dump.contains("scope global (global)"));
    assert!(dump.contains("add: function function (int, int) int"));
    assert!(dump.contains("scope add (function, parent global)"));
}
