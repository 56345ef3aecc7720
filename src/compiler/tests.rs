use std::rc::Rc;

use super::{
    compiler::generate,
    emitter::{Emitter, TextEmitter},
    operation::{Opcode, Operation},
};
use crate::{
    driver::CompileOptions,
    errors::errors::Error,
    labels::{
        labeler::assign_labels,
        location::{Location, Region},
    },
    lexer::lexer::tokenize,
    parser::parser::parse,
    resolver::resolver::resolve,
    type_checker::type_checker::type_check,
};

fn generate_source(source: &str) -> Result<Vec<Operation>, Error> {
    let tokens = tokenize(source.to_string(), Some("test.go".to_string())).unwrap();
    let mut program = parse(tokens, Rc::new("test.go".to_string())).unwrap();
    let options = CompileOptions::default();
    let mut scopes = resolve(&program, &options).unwrap();
    type_check(&program, &scopes, &options).unwrap();
    assign_labels(&mut program, &mut scopes).unwrap();
    generate(&program, &scopes)
}

fn opcodes(operations: &[Operation]) -> Vec<Opcode> {
    operations.iter().map(|operation| operation.opcode).collect()
}

fn local(offset: u32) -> Location {
    Location::new(Region::Function, offset)
}

fn main_body(body: &str) -> Vec<Operation> {
    generate_source(&format!("package main\nfunc main() {{\n{}\n}}\n", body)).unwrap()
}

const PROGRAM: &str = "package main
import \"fmt\"
var g int = 5
func add(a, b int) int {
return a + b
}
func main() {
var x int = add(1, 2)
fmt.Println(x)
}
";

#[test]
fn test_empty_program() {
    assert!(generate_source("package main\n").unwrap().is_empty());
}

#[test]
fn test_full_program() {
    let operations = generate_source(PROGRAM).unwrap();

    assert_eq!(
        operations,
        vec![
            Operation::new(
                Opcode::Asn,
                Some(Location::new(Region::Const, 0)),
                None,
                Location::new(Region::Global, 8)
            ),
            Operation::jump(Opcode::Label, local(0)),
            Operation::new(Opcode::Asn, Some(local(32)), None, local(24)),
            Operation::new(Opcode::Add, Some(local(8)), Some(local(16)), local(32)),
            Operation::jump(Opcode::Ret, local(40)),
            Operation::jump(Opcode::Label, local(48)),
            Operation::new(Opcode::Asn, Some(local(24)), None, local(56)),
            Operation::jump(Opcode::Goto, local(0)),
            Operation::jump(Opcode::Call, Location::new(Region::Global, 0)),
            Operation::jump(Opcode::Ret, local(64)),
        ]
    );
}

#[test]
fn test_binary_opcodes() {
    let operations = main_body(
        "var a int\nvar b bool\nb = a == 1\nb = a != 1\nb = a < 1\nb = a > 1\nb = a <= 1\nb = a >= 1\nb = b && b\nb = b || b\na = a * 2\na = a / 2\na = a % 2\na = a - 2",
    );

    let arithmetic: Vec<Opcode> = opcodes(&operations)
        .into_iter()
        .filter(|opcode| !matches!(opcode, Opcode::Asn | Opcode::Label | Opcode::Ret))
        .collect();
    assert_eq!(
        arithmetic,
        vec![
            Opcode::Beq,
            Opcode::Bne,
            Opcode::Blt,
            Opcode::Bgt,
            Opcode::Ble,
            Opcode::Bge,
            Opcode::And,
            Opcode::Or,
            Opcode::Mul,
            Opcode::Div,
            Opcode::Mod,
            Opcode::Sub,
        ]
    );
}

#[test]
fn test_instruction_precedes_children() {
    let operations = main_body("var a int\na = a - (a + 1)");

    assert_eq!(
        opcodes(&operations),
        vec![Opcode::Label, Opcode::Asn, Opcode::Sub, Opcode::Add, Opcode::Ret]
    );
    // The parenthesized operand is read from the inner sum
    let sub = operations[2];
    let add = operations[3];
    assert_eq!(sub.src2, Some(add.dest));
    assert_eq!(operations[1].src1, Some(sub.dest));
}

#[test]
fn test_unary_operators() {
    let operations = main_body("var a int\nvar b bool\na = -a\nb = !b");

    assert_eq!(
        opcodes(&operations),
        vec![
            Opcode::Label,
            Opcode::Asn,
            Opcode::Neg,
            Opcode::Asn,
            Opcode::Not,
            Opcode::Ret
        ]
    );
}

#[test]
fn test_compound_assignment() {
    let operations = main_body("var a int\na += 2\na++\na--");

    let a = local(8);
    assert_eq!(
        operations[1],
        Operation::new(
            Opcode::AddInPlace,
            Some(a),
            Some(Location::new(Region::Const, 0)),
            a
        )
    );
    assert_eq!(operations[2], Operation::new(Opcode::Add1, Some(a), None, a));
    assert_eq!(operations[3], Operation::new(Opcode::Sub1, Some(a), None, a));
}

#[test]
fn test_unhandled_compound_operator() {
    let source = "package main\nfunc main() {\nvar a int\na -= 2\n}\n";
    let error = generate_source(source).unwrap_err();

    assert_eq!(error.get_error_name(), "UnhandledOperator");
    assert_eq!(error.to_string(), "test.go:4: no lowering for operator '-='");
    assert_eq!(error.exit_code(), 4);
}

#[test]
fn test_bare_return_jumps_to_exit() {
    let operations = generate_source("package main\nfunc f() {\nreturn\n}\n").unwrap();

    assert_eq!(
        operations,
        vec![
            Operation::jump(Opcode::Label, local(0)),
            Operation::jump(Opcode::Goto, local(8)),
            Operation::jump(Opcode::Ret, local(8)),
        ]
    );
}

#[test]
fn test_control_flow_bodies_in_order() {
    let operations = main_body("var a int\nif a > 0 {\na = 1\n} else {\na = 2\n}\nfor a < 10 {\na++\n}");

    assert_eq!(
        opcodes(&operations),
        vec![
            Opcode::Label,
            Opcode::Bgt,
            Opcode::Asn,
            Opcode::Asn,
            Opcode::Blt,
            Opcode::Add1,
            Opcode::Ret
        ]
    );
}

#[test]
fn test_statements_without_instructions() {
    let operations = main_body("var a int\nvar b bool\nif b {\n}\nfor a > 0 {\n}");

    assert_eq!(opcodes(&operations), vec![Opcode::Label, Opcode::Bgt, Opcode::Ret]);
}

#[test]
fn test_element_read_loads_into_slot() {
    let operations = main_body("var a [3]int\nvar i int\nvar b int = a[i]");

    assert_eq!(
        operations,
        vec![
            Operation::jump(Opcode::Label, local(0)),
            Operation::new(Opcode::Asn, Some(local(32)), None, local(24)),
            Operation::new(Opcode::Load, Some(local(8)), Some(local(16)), local(32)),
            Operation::jump(Opcode::Ret, local(40)),
        ]
    );
}

#[test]
fn test_element_write_stores_from_slot() {
    let operations = main_body("var a [3]int\nvar i int\na[i] = 7\na[i] += 1");

    let (a, i) = (local(8), local(16));
    assert_eq!(
        operations,
        vec![
            Operation::jump(Opcode::Label, local(0)),
            Operation::new(Opcode::Asn, Some(Location::new(Region::Const, 0)), None, local(24)),
            Operation::new(Opcode::Store, Some(local(24)), Some(i), a),
            Operation::new(
                Opcode::AddInPlace,
                Some(local(32)),
                Some(Location::new(Region::Const, 8)),
                local(32)
            ),
            Operation::new(Opcode::Load, Some(a), Some(i), local(32)),
            Operation::new(Opcode::Store, Some(local(32)), Some(i), a),
            Operation::jump(Opcode::Ret, local(40)),
        ]
    );
}

#[test]
fn test_operation_display() {
    let add = Operation::new(Opcode::Add, Some(local(8)), Some(local(16)), local(32));
    assert_eq!(add.to_string(), "ADD local:32, local:8, local:16");
    assert_eq!(Operation::jump(Opcode::Goto, local(0)).to_string(), "GOTO local:0");
    assert_eq!(Opcode::AddInPlace.to_string(), "ADDASN");
    let store = Operation::new(Opcode::Store, Some(local(24)), Some(local(16)), local(8));
    assert_eq!(store.to_string(), "STORE local:8, local:24, local:16");
}

#[test]
fn test_text_emitter() {
    let operations = generate_source("package main\nfunc f() {\nreturn\n}\n").unwrap();

    let mut emitter = TextEmitter::new(Vec::new());
    emitter.emit(&operations, "test.go").unwrap();
    let output = String::from_utf8(emitter.into_inner()).unwrap();

    assert_eq!(output, "# test.go\nLABEL local:0\nGOTO local:8\nRET local:8\n");
}
