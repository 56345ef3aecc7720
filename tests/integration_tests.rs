//! Integration tests for end-to-end compilation.
//!
//! These tests drive source text through the whole pipeline: tokenizing,
//! parsing, scope resolution, type checking, labeling and code generation.

use std::collections::HashSet;

use vgoc::{
    compiler::{
        emitter::{Emitter, TextEmitter},
        operation::{Opcode, Operation},
    },
    driver::{compile_source, CompileOptions, CompileOutput},
    errors::errors::{Diagnostics, ErrorKind},
    labels::location::{Location, Region},
};

fn compile(source: &str) -> Result<CompileOutput, Diagnostics> {
    compile_source(source, "main.go", &CompileOptions::default())
}

fn count(operations: &[Operation], opcode: Opcode) -> usize {
    operations
        .iter()
        .filter(|operation| operation.opcode == opcode)
        .count()
}

#[test]
fn test_package_only_produces_no_code() {
    let output = compile("package main\n").unwrap();

    assert!(output.operations.is_empty());
    assert_eq!(output.counters.total_allocated(), 0);
}

#[test]
fn test_wrong_package_aborts() {
    let diagnostics = compile("package notmain\nfunc main() {\n}\n").unwrap_err();

    let error = diagnostics.first().unwrap();
    assert_eq!(error.get_error_name(), "InvalidPackageName");
    assert_eq!(error.kind(), ErrorKind::Configuration);
    assert_eq!(diagnostics.exit_code(), 3);
}

#[test]
fn test_call_jumps_to_function_entry() {
    let source = "package main
import \"fmt\"

func add(a, b int) int {
    return a + b
}

func main() {
    var sum int = add(1, 2)
    fmt.Println(sum)
}
";
    let output = compile(source).unwrap();

    let add = output.scopes.lookup(output.scopes.global(), "add").unwrap();
    let entry = add.location.unwrap();
    assert_eq!(add.signature.as_ref().unwrap().params.len(), 2);

    let labels: Vec<Location> = output
        .operations
        .iter()
        .filter(|operation| operation.opcode == Opcode::Label)
        .map(|operation| operation.dest)
        .collect();
    assert_eq!(labels[0], entry);
    assert!(output
        .operations
        .contains(&Operation::jump(Opcode::Goto, entry)));
    assert_eq!(count(&output.operations, Opcode::Call), 1);
}

#[test]
fn test_assignment_type_mismatch() {
    let diagnostics = compile("package main\nfunc main() {\nvar x int\nx = \"hello\"\n}\n").unwrap_err();

    let error = diagnostics.first().unwrap();
    assert_eq!(error.kind(), ErrorKind::Type);
    assert!(error.to_string().contains("int != string"));
    assert_eq!(error.get_position().line, 4);
}

#[test]
fn test_scope_errors_stop_before_type_checking() {
    let diagnostics = compile("package main\nfunc main() {\nfor ; x > 0; x-- {\n}\n}\n").unwrap_err();

    assert!(diagnostics
        .iter()
        .all(|error| error.get_error_name() == "UndeclaredIdentifier"));

    // The type error on line 4 is never reported
    let diagnostics = compile("package main\nfunc main() {\nvar s string\ns = 1\ny = 2\n}\n").unwrap_err();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics.first().unwrap().kind(), ErrorKind::Scope);
}

#[test]
fn test_non_boolean_if_condition() {
    let diagnostics = compile("package main\nfunc main() {\nvar x int\nif x {\n}\n}\n").unwrap_err();

    let error = diagnostics.first().unwrap();
    assert_eq!(error.get_error_name(), "NonBooleanCondition");
    assert_eq!(diagnostics.exit_code(), 3);
}

#[test]
fn test_lexical_and_syntax_exit_codes() {
    let diagnostics = compile("package main\nvar x int = 1 @ 2\n").unwrap_err();
    assert_eq!(diagnostics.first().unwrap().kind(), ErrorKind::Lexical);
    assert_eq!(diagnostics.exit_code(), 1);

    let diagnostics = compile("package main\nfunc main( {\n}\n").unwrap_err();
    assert_eq!(diagnostics.first().unwrap().kind(), ErrorKind::Syntax);
    assert_eq!(diagnostics.exit_code(), 2);
}

#[test]
fn test_internal_error_exit_code() {
    let diagnostics = compile("package main\nfunc main() {\nvar x int\nx *= 2\n}\n").unwrap_err();

    assert_eq!(diagnostics.first().unwrap().kind(), ErrorKind::Internal);
    assert_eq!(diagnostics.exit_code(), 4);
}

#[test]
fn test_grouped_parameters_share_type() {
    let output = compile("package main\nfunc f(a, b float64, c string) {\n}\n").unwrap();

    let f = output.scopes.lookup(output.scopes.global(), "f").unwrap();
    let params: Vec<String> = f
        .signature
        .as_ref()
        .unwrap()
        .params
        .iter()
        .map(|ty| ty.to_string())
        .collect();
    assert_eq!(params, vec!["float64", "float64", "string"]);
}

#[test]
fn test_every_symbol_gets_a_distinct_location() {
    let source = "package main
import \"math/rand\"

var total int
const limit int = 10

type Point struct {
    x, y int
}

func scale(n int, f float64) float64 {
    var result float64 = f * n
    return result
}

func main() {
    var p Point
    var roll int = rand.Intn(limit)
    for roll < limit {
        roll++
        total += roll
    }
    if total > 100 {
        p.x = total
    } else {
        p.y = 0
    }
    var scaled float64 = scale(roll, 1.5)
}
";
    let output = compile(source).unwrap();

    let mut seen = HashSet::new();
    for id in output.scopes.ids() {
        for symbol in output.scopes.scope(id).symbols() {
            if let Some(location) = symbol.location {
                assert!(seen.insert(location), "{} reused {}", symbol.name, location);
            }
        }
    }

}

#[test]
fn test_every_operator_is_lowered() {
    let source = "package main
func main() {
    var a int = 1 + 2 * 3
    var b bool = a > 2 && !(a == 4) || a <= 0
    a = -a % 5
}
";
    let output = compile(source).unwrap();
    let operations = &output.operations;

    // One instruction per operator node
    assert_eq!(count(operations, Opcode::Add), 1);
    assert_eq!(count(operations, Opcode::Mul), 1);
    assert_eq!(count(operations, Opcode::Bgt), 1);
    assert_eq!(count(operations, Opcode::Beq), 1);
    assert_eq!(count(operations, Opcode::Ble), 1);
    assert_eq!(count(operations, Opcode::And), 1);
    assert_eq!(count(operations, Opcode::Or), 1);
    assert_eq!(count(operations, Opcode::Not), 1);
    assert_eq!(count(operations, Opcode::Neg), 1);
    assert_eq!(count(operations, Opcode::Mod), 1);
    assert_eq!(count(operations, Opcode::Asn), 3);

    for operation in operations.iter() {
        for source in [operation.src1, operation.src2].into_iter().flatten() {
            assert_ne!(source.region, Region::String);
        }
    }
}

#[test]
fn test_diagnostics_collected_across_statements() {
    let source = "package main\nfunc main() {\nvar x int\nx = \"a\"\nx = true\nx = 2.5\n}\n";

    let diagnostics = compile(source).unwrap_err();
    assert_eq!(diagnostics.len(), 3);

    let options = CompileOptions {
        fail_fast: true,
        ..CompileOptions::default()
    };
    let diagnostics = compile_source(source, "main.go", &options).unwrap_err();
    assert_eq!(diagnostics.len(), 1);
}

#[test]
fn test_listing_output() {
    let output = compile("package main\nfunc main() {\nvar x int = 7\n}\n").unwrap();

    let mut emitter = TextEmitter::new(Vec::new());
    emitter.emit(&output.operations, "main.go").unwrap();

    assert_eq!(
        String::from_utf8(emitter.into_inner()).unwrap(),
        "# main.go\nLABEL local:0\nASN local:8, const:0\nRET local:16\n"
    );
}

#[test]
fn test_local_declared_after_outer_use() {
    let source = "package main\nvar x int\nfunc main() {\n x = \"hello\"\n var x string\n}\n";
    let diagnostics = compile(source).unwrap_err();

    let error = diagnostics.first().unwrap();
    assert_eq!(error.get_error_name(), "DeclaredAfterOuterUse");
    assert_eq!(error.get_position().line, 5);
    assert_eq!(diagnostics.exit_code(), 3);
}

#[test]
fn test_whole_array_is_rejected() {
    let source = "package main\nfunc main() {\nvar a [3]int\nvar b int = a + 1\na = 5\n}\n";
    let diagnostics = compile(source).unwrap_err();

    assert_eq!(diagnostics.len(), 2);
    assert!(diagnostics
        .iter()
        .all(|error| error.get_error_name() == "ArrayAsValue"));
    assert_eq!(diagnostics.exit_code(), 3);
}

#[test]
fn test_every_temporary_read_is_written() {
    let source = "package main
func main() {
    var a [3]int
    var i int
    var b int = a[i] + 1
    a[i] = b * 2
}
";
    let output = compile(source).unwrap();

    let written: HashSet<Location> = output
        .operations
        .iter()
        .map(|operation| operation.dest)
        .collect();
    let main = output.scopes.find_scope("main").unwrap();
    let locals: HashSet<Location> = output
        .scopes
        .scope(main)
        .symbols()
        .iter()
        .filter_map(|symbol| symbol.location)
        .collect();

    for operation in output.operations.iter() {
        for source in [operation.src1, operation.src2].into_iter().flatten() {
            if source.region == Region::Function && !locals.contains(&source) {
                assert!(written.contains(&source), "{} is never written", source);
            }
        }
    }
    assert_eq!(count(&output.operations, Opcode::Load), 1);
    assert_eq!(count(&output.operations, Opcode::Store), 1);
}
