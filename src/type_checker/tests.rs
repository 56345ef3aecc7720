use std::rc::Rc;

use super::type_checker::{type_check, TypeChecker};
use crate::{
    ast::{ast::Program, types::Type},
    driver::CompileOptions,
    errors::errors::{Diagnostics, ErrorImpl, ErrorKind},
    lexer::lexer::tokenize,
    parser::{
        expr::parse_expr,
        lookups::{create_token_lookups, BindingPower},
        parser::Parser,
        types::create_token_type_lookups,
    },
    resolver::resolver::resolve,
};

fn program(source: &str) -> Program {
    let tokens = tokenize(source.to_string(), Some("test.go".to_string())).unwrap();
    crate::parser::parser::parse(tokens, Rc::new("test.go".to_string())).unwrap()
}

fn check_source(source: &str) -> Result<(), Diagnostics> {
    let program = program(source);
    let options = CompileOptions::default();
    let scopes = resolve(&program, &options).unwrap();
    type_check(&program, &scopes, &options)
}

fn check_body(body: &str) -> Result<(), Diagnostics> {
    check_source(&format!(
        "package main\nimport \"fmt\"\nimport \"math/rand\"\nfunc main() {{\n{}\n}}\n",
        body
    ))
}

fn first_error(body: &str) -> ErrorImpl {
    check_body(body).unwrap_err().first().unwrap().get_impl().clone()
}

/// Types a standalone expression against the globals of `source`.
fn expr_type(source: &str, expr: &str) -> Type {
    let program = program(source);
    let options = CompileOptions::default();
    let scopes = resolve(&program, &options).unwrap();

    let tokens = tokenize(expr.to_string(), Some("expr.go".to_string())).unwrap();
    let mut parser = Parser::new(tokens, Rc::new("expr.go".to_string()));
    create_token_lookups(&mut parser);
    create_token_type_lookups(&mut parser);
    let expr = parse_expr(&mut parser, BindingPower::Default).unwrap();

    TypeChecker::new(&scopes, &options).check_expr(&expr).unwrap()
}

#[test]
fn test_literal_types() {
    let source = "package main\n";
    assert_eq!(expr_type(source, "1"), Type::Int);
    assert_eq!(expr_type(source, "0x1F"), Type::Int);
    assert_eq!(expr_type(source, "1.5"), Type::Float64);
    assert_eq!(expr_type(source, "1e3"), Type::Float64);
    assert_eq!(expr_type(source, "\"hi\""), Type::String);
    assert_eq!(expr_type(source, "'a'"), Type::Rune);
    assert_eq!(expr_type(source, "true"), Type::Bool);
}

#[test]
fn test_numeric_widening() {
    let source = "package main\nvar i int\nvar f float64\nvar r rune\n";
    assert_eq!(expr_type(source, "i + f"), Type::Float64);
    assert_eq!(expr_type(source, "r * i"), Type::Int);
    assert_eq!(expr_type(source, "i % r"), Type::Int);
    assert_eq!(expr_type(source, "i < f"), Type::Bool);
    assert_eq!(expr_type(source, "-f"), Type::Float64);
}

#[test]
fn test_string_concatenation() {
    let source = "package main\nvar s string\n";
    assert_eq!(expr_type(source, "s + \"!\""), Type::String);
    assert_eq!(expr_type(source, "s == \"a\""), Type::Bool);
}

#[test]
fn test_call_result_type() {
    let source = "package main\nfunc add(a, b int) int {\nreturn a + b\n}\n";
    assert_eq!(expr_type(source, "add(1, 2)"), Type::Int);
    assert_eq!(expr_type(source, "add"), Type::Function);
}

#[test]
fn test_valid_program() {
    assert!(check_body(
        "var x int = 1\nvar y float64 = x\nx += 2\nx++\nif x > 0 && y < 2.5 {\nfmt.Println(x, y)\n}\nfor x < 10 {\nx = x + rand.Intn(3)\n}"
    )
    .is_ok());
}

#[test]
fn test_assignment_mismatch() {
    let error = first_error("var x int\nx = \"hello\"");

    assert_eq!(error.to_string(), "int != string in operation '='");
    assert_eq!(error.kind(), ErrorKind::Type);
}

#[test]
fn test_narrowing_initializer_rejected() {
    let error = first_error("var x int = 1.5");

    assert_eq!(error.to_string(), "int != float64 in operation '='");
}

#[test]
fn test_mixed_operand_mismatch() {
    let error = first_error("var s string\nvar x int\nfmt.Println(s + x)");

    assert_eq!(error.to_string(), "string != int in operation '+'");
}

#[test]
fn test_non_boolean_condition() {
    let error = first_error("var x int\nif x {\n}");

    assert_eq!(
        error,
        ErrorImpl::NonBooleanCondition {
            type_: "int".to_string(),
            tree: "x".to_string(),
        }
    );
}

#[test]
fn test_for_condition_must_be_bool() {
    let error = first_error("var x int\nfor x + 1 {\n}");

    assert!(matches!(error, ErrorImpl::NonBooleanCondition { .. }));
}

#[test]
fn test_logical_operands() {
    let error = first_error("var x int\nvar b bool = x && true");

    assert!(matches!(error, ErrorImpl::TypeMismatch { .. }));

    let error = first_error("var b bool = !1");
    assert_eq!(error.to_string(), "operator '!' not defined on int");
}

#[test]
fn test_modulo_requires_integers() {
    let error = first_error("var f float64\nf = f % 2.0");

    assert_eq!(error.to_string(), "operator '%' not defined on float64");
}

#[test]
fn test_return_type_checked() {
    let diagnostics = check_source("package main\nfunc f() int {\nreturn \"x\"\n}\n").unwrap_err();
    assert_eq!(
        diagnostics.first().unwrap().get_impl(),
        &ErrorImpl::ReturnTypeMismatch {
            expected: "int".to_string(),
            received: "string".to_string(),
        }
    );

    let diagnostics = check_source("package main\nfunc f() int {\nreturn\n}\n").unwrap_err();
    assert_eq!(diagnostics.first().unwrap().get_error_name(), "ReturnTypeMismatch");

    assert!(check_source("package main\nfunc f() {\nreturn\n}\n").is_ok());
}

#[test]
fn test_argument_checks() {
    let source = "package main\nfunc add(a, b int) int {\nreturn a + b\n}\nfunc main() {\n";

    let diagnostics = check_source(&format!("{}add(1, 2, 3)\n}}\n", source)).unwrap_err();
    assert_eq!(diagnostics.first().unwrap().get_error_name(), "UnexpectedArguments");

    let diagnostics = check_source(&format!("{}add(1)\n}}\n", source)).unwrap_err();
    assert_eq!(diagnostics.first().unwrap().get_error_name(), "MissingArguments");

    let diagnostics = check_source(&format!("{}add(1, \"2\")\n}}\n", source)).unwrap_err();
    assert_eq!(
        diagnostics.first().unwrap().get_impl(),
        &ErrorImpl::ArgumentTypeMatchError {
            expected: "[int, int]".to_string(),
            received: "[int, string]".to_string(),
        }
    );
}

#[test]
fn test_builtin_calls() {
    assert!(check_body("var n int = rand.Intn(10)\nfmt.Println(\"n =\", n)").is_ok());

    let error = first_error("var s string = rand.Intn(10)");
    assert_eq!(error.to_string(), "string != int in operation '='");

    let error = first_error("fmt.Printf(\"x\")");
    assert!(matches!(error, ErrorImpl::UnknownBuiltin { .. }));
}

#[test]
fn test_not_callable() {
    let error = first_error("var x int\nx(1)");

    assert!(matches!(error, ErrorImpl::NotCallable { .. }));
}

#[test]
fn test_assign_to_constant() {
    let error = first_error("const limit int = 3\nlimit = 4");

    assert_eq!(
        error,
        ErrorImpl::AssignToConstant {
            name: "limit".to_string()
        }
    );
}

#[test]
fn test_struct_fields() {
    let source = "package main\ntype Point struct {\nx, y int\n}\nvar p Point\nfunc main() {\n";

    assert!(check_source(&format!("{}p.x = 3\n}}\n", source)).is_ok());

    let diagnostics = check_source(&format!("{}p.z = 3\n}}\n", source)).unwrap_err();
    assert_eq!(diagnostics.first().unwrap().get_error_name(), "UnknownField");

    let diagnostics = check_source(&format!("{}var q int = p + 1\n}}\n", source)).unwrap_err();
    assert_eq!(diagnostics.first().unwrap().get_error_name(), "StructOperand");
}

#[test]
fn test_array_indexing() {
    assert!(check_body("var values [4]int\nvalues[1] = 2\nvar v int = values[0]").is_ok());

    let error = first_error("var values [4]int\nvalues[1.5] = 2");
    assert!(matches!(error, ErrorImpl::TypeMismatch { .. }));

    let error = first_error("var x int\nx[0] = 1");
    assert!(matches!(error, ErrorImpl::NotIndexable { .. }));
}

#[test]
fn test_whole_array_is_not_a_value() {
    let diagnostics = check_body("var a [3]int\nvar b int = a + 1\na = 5\nfmt.Println(a)").unwrap_err();

    let names: Vec<&str> = diagnostics.iter().map(|error| error.get_error_name()).collect();
    assert_eq!(names, vec!["ArrayAsValue", "ArrayAsValue", "ArrayAsValue"]);
    assert_eq!(diagnostics.first().unwrap().get_position().line, 6);
    assert_eq!(
        diagnostics.first().unwrap().to_string(),
        "test.go:6: array \"a\" used as a value"
    );
}

#[test]
fn test_increment_requires_numeric() {
    let error = first_error("var s string\ns++");

    assert_eq!(error.to_string(), "operator '++' not defined on string");
}

#[test]
fn test_errors_collected_per_statement() {
    let diagnostics = check_body("var x int\nx = \"a\"\nx = true\nx = 1").unwrap_err();

    assert_eq!(diagnostics.len(), 2);
    assert_eq!(diagnostics.exit_code(), 3);
}

#[test]
fn test_fail_fast() {
    let program = program("package main\nfunc main() {\nvar x int\nx = \"a\"\nx = true\n}\n");
    let options = CompileOptions {
        fail_fast: true,
        ..CompileOptions::default()
    };
    let scopes = resolve(&program, &options).unwrap();

    assert_eq!(type_check(&program, &scopes, &options).unwrap_err().len(), 1);
}
