use std::rc::Rc;

use super::resolver::resolve;
use crate::{
    ast::{ast::Program, types::Type},
    driver::CompileOptions,
    errors::errors::{Diagnostics, ErrorKind},
    lexer::lexer::tokenize,
    parser::parser::parse,
    symbols::symbol_table::{ScopeKind, ScopeTree, SymbolKind},
};

fn program(source: &str) -> Program {
    let tokens = tokenize(source.to_string(), Some("test.go".to_string())).unwrap();
    parse(tokens, Rc::new("test.go".to_string())).unwrap()
}

fn resolve_source(source: &str) -> Result<ScopeTree, Diagnostics> {
    resolve(&program(source), &CompileOptions::default())
}

fn error_names(diagnostics: &Diagnostics) -> Vec<&str> {
    diagnostics.iter().map(|error| error.get_error_name()).collect()
}

#[test]
fn test_resolve_package_only() {
    let scopes = resolve_source("package main\n").unwrap();

    assert_eq!(scopes.len(), 1);
    assert!(scopes.scope(scopes.global()).is_empty());
}

#[test]
fn test_wrong_package_name() {
    let diagnostics = resolve_source("package notmain\n").unwrap_err();

    let error = diagnostics.first().unwrap();
    assert_eq!(error.get_error_name(), "InvalidPackageName");
    assert_eq!(error.kind(), ErrorKind::Configuration);
}

#[test]
fn test_imports_create_package_scopes() {
    let scopes = resolve_source("package main\nimport (\n\"fmt\"\n\"time\"\n\"math/rand\"\n)\nimport \"fmt\"\n").unwrap();

    let fmt = scopes.find_scope("fmt").unwrap();
    assert_eq!(scopes.scope(fmt).kind, ScopeKind::Package);
    assert!(scopes.scope(fmt).get("Println").is_some());
    // Repeated import does not add a second scope
    assert_eq!(scopes.scope(fmt).len(), 1);

    let rand = scopes.find_scope("rand").unwrap();
    let intn = scopes.scope(rand).get("Intn").unwrap();
    assert_eq!(intn.signature.as_ref().unwrap().params, vec![Type::Int]);

    assert!(scopes.find_scope("time").is_some());
}

#[test]
fn test_unsupported_import() {
    let diagnostics = resolve_source("package main\nimport \"os\"\n").unwrap_err();

    assert_eq!(error_names(&diagnostics), vec!["UnsupportedImport"]);
    assert_eq!(diagnostics.exit_code(), 3);
}

#[test]
fn test_grouped_parameters_back_filled() {
    let scopes = resolve_source("package main\nfunc add(a, b int, s string) int {\nreturn a + b\n}\n").unwrap();

    let add = scopes.find_scope("add").unwrap();
    let table = scopes.scope(add);
    assert_eq!(table.get("a").unwrap().ty, Type::Int);
    assert_eq!(table.get("b").unwrap().ty, Type::Int);
    assert_eq!(table.get("s").unwrap().ty, Type::String);
    assert_eq!(table.get("a").unwrap().kind, SymbolKind::Parameter);

    let symbol = scopes.lookup(scopes.global(), "add").unwrap();
    let signature = symbol.signature.as_ref().unwrap();
    assert_eq!(signature.params, vec![Type::Int, Type::Int, Type::String]);
    assert_eq!(signature.return_type, Type::Int);
}

#[test]
fn test_trailing_parameter_without_type() {
    let diagnostics = resolve_source("package main\nfunc f(a int, b) {\n}\n").unwrap_err();

    assert_eq!(error_names(&diagnostics), vec!["MissingParameterType"]);
}

#[test]
fn test_default_return_type_is_void() {
    let scopes = resolve_source("package main\nfunc main() {\n}\n").unwrap();

    let main = scopes.lookup(scopes.global(), "main").unwrap();
    assert_eq!(main.signature.as_ref().unwrap().return_type, Type::Void);
}

#[test]
fn test_recursive_call_resolves() {
    assert!(resolve_source("package main\nfunc f(n int) int {\nreturn f(n - 1)\n}\n").is_ok());
}

#[test]
fn test_locals_live_in_function_scope() {
    let scopes = resolve_source(
        "package main\nfunc main() {\nvar a int\nif a > 0 {\nvar b int\n}\nfor {\nvar c int\n}\n}\n",
    )
    .unwrap();

    let main = scopes.find_scope("main").unwrap();
    let names: Vec<&str> = scopes
        .scope(main)
        .symbols()
        .iter()
        .map(|symbol| symbol.name.as_str())
        .collect();
    assert_eq!(names, vec!["a", "b", "c"]);
}

#[test]
fn test_undeclared_identifier() {
    let diagnostics = resolve_source("package main\nfunc main() {\nx = 1\n}\n").unwrap_err();

    let error = diagnostics.first().unwrap();
    assert_eq!(error.get_error_name(), "UndeclaredIdentifier");
    assert_eq!(error.get_position().line, 3);
    assert_eq!(error.kind(), ErrorKind::Scope);
}

#[test]
fn test_use_before_declaration() {
    let diagnostics = resolve_source("package main\nfunc main() {\nx = 1\nvar x int\n}\n").unwrap_err();

    assert_eq!(error_names(&diagnostics), vec!["UndeclaredIdentifier"]);
}

#[test]
fn test_collects_errors_per_statement() {
    let diagnostics = resolve_source("package main\nfunc main() {\na = 1\nvar x int\nb = x\n}\n").unwrap_err();

    assert_eq!(diagnostics.len(), 2);
    assert_eq!(diagnostics.iter().nth(1).unwrap().get_position().line, 5);
}

#[test]
fn test_fail_fast_stops_at_first_error() {
    let options = CompileOptions {
        fail_fast: true,
        ..CompileOptions::default()
    };
    let diagnostics = resolve(
        &program("package main\nfunc main() {\na = 1\nb = 2\n}\n"),
        &options,
    )
    .unwrap_err();

    assert_eq!(diagnostics.len(), 1);
}

#[test]
fn test_for_with_undeclared_variable() {
    let diagnostics = resolve_source("package main\nfunc main() {\nfor ; x > 0; x-- {\n}\n}\n").unwrap_err();

    assert_eq!(diagnostics.first().unwrap().get_error_name(), "UndeclaredIdentifier");
}

#[test]
fn test_duplicate_declaration() {
    let diagnostics = resolve_source("package main\nvar x int\nvar x string\n").unwrap_err();

    assert_eq!(error_names(&diagnostics), vec!["DuplicateDeclaration"]);
    assert_eq!(diagnostics.first().unwrap().get_position().line, 3);
}

#[test]
fn test_array_sizes() {
    let scopes = resolve_source("package main\nvar values [4]int\n").unwrap();
    let values = scopes.lookup(scopes.global(), "values").unwrap();
    assert_eq!(values.array_size, Some(4));
    assert_eq!(values.ty, Type::Int);

    let diagnostics = resolve_source("package main\nvar values []int\n").unwrap_err();
    assert_eq!(error_names(&diagnostics), vec!["MissingArraySize"]);

    let diagnostics = resolve_source("package main\nconst n int = 3\nvar values [n]int\n").unwrap_err();
    assert_eq!(error_names(&diagnostics), vec!["NonConstantArraySize"]);
}

#[test]
fn test_constants_marked() {
    let scopes = resolve_source("package main\nconst limit int = 10\n").unwrap();

    assert!(scopes.lookup(scopes.global(), "limit").unwrap().is_constant);
}

#[test]
fn test_struct_scope_and_fields() {
    let scopes = resolve_source("package main\ntype Point struct {\nx, y int\n}\nvar p Point\n").unwrap();

    let point = scopes.find_scope("Point").unwrap();
    assert_eq!(scopes.scope(point).kind, ScopeKind::Struct);
    assert_eq!(scopes.scope(point).get("y").unwrap().kind, SymbolKind::Field);
    assert_eq!(
        scopes.lookup(scopes.global(), "p").unwrap().ty,
        Type::Struct("Point".to_string())
    );
}

#[test]
fn test_nested_struct_rejected() {
    let diagnostics = resolve_source(
        "package main\ntype A struct {\nx int\n}\ntype B struct {\na A\n}\n",
    )
    .unwrap_err();

    assert_eq!(error_names(&diagnostics), vec!["NestedStruct"]);
}

#[test]
fn test_unknown_type() {
    let diagnostics = resolve_source("package main\nvar x complex\n").unwrap_err();

    assert_eq!(error_names(&diagnostics), vec!["UnknownType"]);
}

#[test]
fn test_package_qualifier_accepted() {
    assert!(resolve_source("package main\nimport \"fmt\"\nfunc main() {\nfmt.Println(1)\n}\n").is_ok());

    let diagnostics = resolve_source("package main\nfunc main() {\nfmt.Println(1)\n}\n").unwrap_err();
    assert_eq!(error_names(&diagnostics), vec!["UndeclaredIdentifier"]);
}

#[test]
fn test_package_as_value() {
    let diagnostics =
        resolve_source("package main\nimport \"fmt\"\nvar x int = fmt\n").unwrap_err();

    assert_eq!(error_names(&diagnostics), vec!["PackageAsValue"]);
}

#[test]
fn test_scope_restored_after_function() {
    // `a` belongs to f; using it at top level afterwards must fail
    let diagnostics = resolve_source(
        "package main\nfunc f(a int) {\n}\nvar b int = a\n",
    )
    .unwrap_err();

    assert_eq!(error_names(&diagnostics), vec!["UndeclaredIdentifier"]);
}

#[test]
fn test_local_declared_after_outer_use() {
    let diagnostics = resolve_source(
        "package main\nvar x int\nfunc main() {\nx = 1\nvar x string\n}\n",
    )
    .unwrap_err();

    let error = diagnostics.first().unwrap();
    assert_eq!(error.get_error_name(), "DeclaredAfterOuterUse");
    assert_eq!(error.get_position().line, 5);
    assert_eq!(error.kind(), ErrorKind::Scope);

    // The initializer reads the global before the local exists
    let diagnostics = resolve_source("package main\nvar x int\nfunc main() {\nvar x int = x\n}\n").unwrap_err();
    assert_eq!(diagnostics.first().unwrap().get_error_name(), "DeclaredAfterOuterUse");
}

#[test]
fn test_local_before_any_outer_use_is_accepted() {
    let scopes = resolve_source(
        "package main\nvar x int\nfunc main() {\nvar x string\nx = \"a\"\n}\nfunc other() {\nvar x int\n}\n",
    )
    .unwrap();

    let main = scopes.find_scope("main").unwrap();
    assert_eq!(scopes.scope(main).get("x").unwrap().ty, Type::String);
}
