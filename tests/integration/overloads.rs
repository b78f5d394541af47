mod common;
use common::{analyze_ok, analyze_should_fail_with, find_user, module};

use mic::parser::ast::NodeKind;
use mic::typeck::types::Datatype;

const FOO: &str = "fn foo (int a) { } fn foo (string a) { }";

#[test]
fn overload_picked_by_argument_type() {
    let analysis = analyze_ok(&format!("module m {{ {FOO} fn main {{ foo(1); foo(\"s\"); }} }}"));
    let m = module(&analysis.modules, "m");
    assert_eq!(analysis.modules.get(m).overloads("foo").len(), 2);
    let calls = find_user(&analysis, NodeKind::FunctionCall);
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].child(NodeKind::Parameters).unwrap().children[0].ty, Some(Datatype::INT));
    assert_eq!(calls[1].child(NodeKind::Parameters).unwrap().children[0].ty, Some(Datatype::STRING));
}

#[test]
fn no_matching_overload() {
    analyze_should_fail_with(
        &format!("module m {{ {FOO} fn main {{ foo(true); }} }}"),
        "Cannot find any implementation for function 'foo' with argument types (bool)",
    );
}

#[test]
fn arity_must_match() {
    analyze_should_fail_with(
        &format!("module m {{ {FOO} fn main {{ foo(); }} }}"),
        "Cannot find any implementation for function 'foo' with no arguments",
    );
}

#[test]
fn exact_match_beats_promotion() {
    let analysis = analyze_ok(
        "module m {
            fn pick :: int (int a) { ret 1; }
            fn pick :: int (long a) { ret 2; }
            fn main { int a = pick(1); int b = pick(1L); }
        }",
    );
    assert_eq!(find_user(&analysis, NodeKind::FunctionCall).len(), 2);
}

#[test]
fn promotion_when_no_exact_match() {
    analyze_ok("module m { fn wide (double d) { } fn main { wide(1); wide('c'); wide(2L); } }");
}

#[test]
fn ambiguous_promotion() {
    analyze_should_fail_with(
        "module m { fn g (long a) { } fn g (double a) { } fn main { g(1); } }",
        "Ambiguous call to function 'g' with argument types (int), 2 overloads match",
    );
}

#[test]
fn null_argument_needs_nullable_parameter() {
    analyze_ok("module m { fn h (nullable string s) { } fn main { h(null); } }");
    analyze_should_fail_with(
        "module m { fn h (string s) { } fn main { h(null); } }",
        "Cannot find any implementation for function 'h' with argument types (null)",
    );
}

#[test]
fn nullable_argument_rejected_by_nonnull_parameter() {
    analyze_should_fail_with(
        "module m { fn h (int a) { } fn main { nullable int n = 1; h(n); } }",
        "Cannot find any implementation for function 'h' with argument types (nullable int)",
    );
}

#[test]
fn overloads_differ_by_parameter_types_only() {
    analyze_should_fail_with(
        "module m { fn k :: int (int a) { ret a; } fn k :: long (int b) { ret 1L; } }",
        "Redefinition of function 'k'",
    );
}

#[test]
fn stdlib_println_overloads() {
    let analysis = analyze_ok(
        "module m { fn main { std.println(1); std.println(\"s\"); std.println(2.5); std.println('c'); } }",
    );
    for call in find_user(&analysis, NodeKind::FunctionCall) {
        assert_eq!(call.children[0].lexeme(), Some("std.println"));
        assert_eq!(call.ty, Some(Datatype::VOID));
    }
}

#[test]
fn method_overloads_resolve_inside_class() {
    analyze_ok(
        "module m {
            class Counter {
                mut int n = 0;
                fn add (int k) { n += k; }
                fn add (int k, int times) { n += k * times; }
                fn bump { add(1); add(2, 3); }
            }
        }",
    );
}
