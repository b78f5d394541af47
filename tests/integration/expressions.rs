mod common;
use common::{analyze_ok, analyze_should_fail_with, find_user};

use mic::parser::ast::NodeKind;
use mic::typeck::types::Datatype;

fn in_function(body: &str) -> String {
    format!("module m {{ fn f {{ {body} }} }}")
}

fn value_of(body: &str) -> (String, Option<Datatype>) {
    let analysis = analyze_ok(&in_function(body));
    let defs = find_user(&analysis, NodeKind::VarDefAndSetValue);
    let value = &defs[0].child(NodeKind::Value).unwrap().children[0];
    (value.to_sexpr(), value.ty.clone())
}

#[test]
fn call_resolves_to_definition() {
    let analysis = analyze_ok(
        "module m { fn add :: int (int a, int b) { ret a + b; } fn main { int r = add(3, 4); } }",
    );
    let calls = find_user(&analysis, NodeKind::FunctionCall);
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].to_sexpr(),
        "(FUNCTION_CALL (IDENTIFIER m.add) (PARAMETERS (INTEGER_LITERAL 3) (INTEGER_LITERAL 4)))"
    );
    assert_eq!(calls[0].ty, Some(Datatype::INT));
}

#[test]
fn multiplication_binds_tighter() {
    let (sexpr, ty) = value_of("int v = 1 + 2 * 3;");
    assert_eq!(sexpr, "(ADD (INTEGER_LITERAL 1) (MULTIPLY (INTEGER_LITERAL 2) (INTEGER_LITERAL 3)))");
    assert_eq!(ty, Some(Datatype::INT));
}

#[test]
fn shift_below_additive() {
    let (sexpr, _) = value_of("int v = 1 << 2 + 3;");
    assert_eq!(sexpr, "(L_SHIFT (INTEGER_LITERAL 1) (ADD (INTEGER_LITERAL 2) (INTEGER_LITERAL 3)))");
}

#[test]
fn logical_or_loosest_binary() {
    let (sexpr, ty) = value_of("bool v = 1 < 2 && 3 == 3 || false;");
    assert_eq!(
        sexpr,
        "(LOGICAL_OR (LOGICAL_AND (LESS_THAN (INTEGER_LITERAL 1) (INTEGER_LITERAL 2)) \
         (EQUALS (INTEGER_LITERAL 3) (INTEGER_LITERAL 3))) (BOOL_LITERAL false))"
    );
    assert_eq!(ty, Some(Datatype::BOOL));
}

#[test]
fn mixed_numeric_promotes() {
    let (_, ty) = value_of("double v = 1 + 2L * 1.5f;");
    assert_eq!(ty, Some(Datatype::FLOAT));
    let (_, ty) = value_of("double v = 'a' + 2.0;");
    assert_eq!(ty, Some(Datatype::DOUBLE));
}

#[test]
fn string_concatenation() {
    let (_, ty) = value_of("string v = \"n = \" + 42 + '!';");
    assert_eq!(ty, Some(Datatype::STRING));
}

#[test]
fn ternary_result_type() {
    let (sexpr, ty) = value_of("long v = 1 < 2 ? 10L : 20L;");
    assert_eq!(
        sexpr,
        "(TERNARY_OPERATOR (LESS_THAN (INTEGER_LITERAL 1) (INTEGER_LITERAL 2)) \
         (TERNARY_IF (LONG_LITERAL 10L)) (TERNARY_ELSE (LONG_LITERAL 20L)))"
    );
    assert_eq!(ty, Some(Datatype::LONG));
}

#[test]
fn ternary_arms_must_agree() {
    analyze_should_fail_with(
        &in_function("int v = true ? 1 : \"x\";"),
        "'if' part of ternary operator should have the same type as the 'else' part",
    );
}

#[test]
fn operator_on_wrong_types() {
    analyze_should_fail_with(
        &in_function("bool v = true + 1;"),
        "Cannot use '+' operator on types 'bool' and 'int'",
    );
    analyze_should_fail_with(
        &in_function("bool v = \"a\" < \"b\";"),
        "Cannot use '<' operator on types 'string' and 'string'",
    );
}

#[test]
fn cast_changes_type() {
    let (sexpr, ty) = value_of("int v = int 2.75;");
    assert_eq!(sexpr, "(CAST_VALUE int (DOUBLE_LITERAL 2.75))");
    assert_eq!(ty, Some(Datatype::INT));
}

#[test]
fn unary_operators() {
    let (sexpr, ty) = value_of("int v = -(1 + 2);");
    assert_eq!(sexpr, "(NEGATE (ADD (INTEGER_LITERAL 1) (INTEGER_LITERAL 2)))");
    assert_eq!(ty, Some(Datatype::INT));
    let (sexpr, _) = value_of("bool v = !true;");
    assert_eq!(sexpr, "(BOOL_NOT (BOOL_LITERAL true))");
}

#[test]
fn enum_equality() {
    analyze_ok("module m { enum E { A, B; } fn f { E e = E::A; bool same = e == E::B; } }");
}

#[test]
fn unknown_variable() {
    analyze_should_fail_with(&in_function("int v = w + 1;"), "Cannot find any variable called 'w'");
}

#[test]
fn unknown_function() {
    analyze_should_fail_with(
        &in_function("int v = nope(1);"),
        "Cannot find any function called 'nope' in module 'm'",
    );
}

#[test]
fn void_call_cannot_initialize() {
    analyze_should_fail_with(
        "module m { fn g { } fn f { int v = g(); } }",
        "Datatypes are not equal on both sides, trying to assign void to a int variable.",
    );
}

#[test]
fn int_literal_out_of_range() {
    analyze_should_fail_with(&in_function("int v = 3000000000;"), "Integer literal '3000000000' is out of range for 'int'");
}

#[test]
fn every_user_expression_typed() {
    let analysis = analyze_ok(
        "module m {
            enum E { A; }
            fn g :: long (int a) { ret a * 2L; }
            fn f {
                long v = g(1) + (3 > 2 ? 4 : 5);
                E e = E::A;
                string s = \"x\" + v + int 1.5;
                bool b = !(v == 2) && ~1 == -2;
            }
        }",
    );
    for node in common::user_nodes(&analysis) {
        node.walk(&mut |n| {
            if n.kind.is_expression() {
                assert!(n.ty.is_some(), "untyped {:?}", n.kind);
            }
        });
    }
}
