mod common;
use common::{analyze_ok, analyze_should_fail_with, find_user};

use mic::parser::ast::NodeKind;

fn in_function(body: &str) -> String {
    format!("module m {{ fn f {{ {body} }} }}")
}

// ═══════════════════════════════════════════════════════════════════════════════
// LOOPS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn for_loop_structure() {
    let analysis = analyze_ok(&in_function("for (mut int i = 0, i < 3, i++) { std.println(i); }"));
    let fake = find_user(&analysis, NodeKind::ForFakeScope);
    assert_eq!(fake.len(), 1);
    let kinds: Vec<NodeKind> = fake[0].children.iter().map(|c| c.kind).collect();
    assert_eq!(
        kinds,
        vec![NodeKind::VarDefAndSetValue, NodeKind::Condition, NodeKind::ForInstruct, NodeKind::ForStatement]
    );
    let body = &fake[0].children[3];
    assert_eq!(
        body.to_sexpr(),
        "(FOR_STATEMENT (FUNCTION_CALL (IDENTIFIER std.println) (PARAMETERS (VARIABLE_REFERENCE i))))"
    );
}

#[test]
fn loop_variable_not_visible_after_loop() {
    analyze_should_fail_with(
        &in_function("for (mut int i = 0, i < 3, i++) { } int j = i;"),
        "Cannot find any variable called 'i'",
    );
}

#[test]
fn for_step_may_be_a_call() {
    let analysis = analyze_ok(&in_function("for (mut int i = 0, i < 3, std.println(i)) { i++; }"));
    let instruct = find_user(&analysis, NodeKind::ForInstruct);
    assert_eq!(
        instruct[0].to_sexpr(),
        "(FOR_INSTRUCT (FUNCTION_CALL (IDENTIFIER std.println) (PARAMETERS (VARIABLE_REFERENCE i))))"
    );
}

#[test]
fn for_init_must_define_with_value() {
    analyze_should_fail_with(
        &in_function("mut int i; for (i = 0, i < 10, i += 2) { }"),
        "Expected variable definition",
    );
    analyze_should_fail_with(&in_function("for (mut int i, i < 10, i++) { }"), "Expected variable definition");
}

#[test]
fn for_step_rejects_plain_expressions() {
    analyze_should_fail_with(
        &in_function("for (mut int i = 0, i < 10, i + 1) { }"),
        "Expected variable set or function call as for loop instruct",
    );
}

#[test]
fn transitional_for_loop() {
    let analysis = analyze_ok(&in_function("for (int i = 0, i -> 10) { std.println(i); }"));
    let condition = find_user(&analysis, NodeKind::Condition);
    assert_eq!(
        condition[0].to_sexpr(),
        "(CONDITION (LESS_THAN (VARIABLE_REFERENCE i) (INTEGER_LITERAL 10)))"
    );
}

#[test]
fn while_and_do_while() {
    let analysis = analyze_ok(&in_function(
        "mut int n = 0; while (n < 5) { n++; } do { n--; } while (n > 0);",
    ));
    let whiles = find_user(&analysis, NodeKind::WhileStatement);
    assert_eq!(whiles.len(), 1);
    let dos = find_user(&analysis, NodeKind::DoStatement);
    assert_eq!(
        dos[0].to_sexpr(),
        "(DO_STATEMENT (VAR_SET_VALUE (IDENTIFIER n) (OPERATOR --) (VALUE (INTEGER_LITERAL 1))) \
         (CONDITION (GREATER_THAN (VARIABLE_REFERENCE n) (INTEGER_LITERAL 0))))"
    );
}

#[test]
fn break_and_continue_inside_loops() {
    let analysis = analyze_ok(&in_function(
        "mut int n = 0; while (true) { n++; if (n > 3) { break; } continue; }",
    ));
    for node in find_user(&analysis, NodeKind::BreakStatement)
        .into_iter()
        .chain(find_user(&analysis, NodeKind::ContinueStatement))
    {
        assert_eq!(node.children.len(), 0);
    }
}

#[test]
fn break_outside_loop() {
    analyze_should_fail_with(&in_function("break;"), "Expected statement to be inside of a loop");
    analyze_should_fail_with(&in_function("if (true) { continue; }"), "Expected statement to be inside of a loop");
}

#[test]
fn conditions_must_be_nonnull_bool() {
    analyze_should_fail_with(&in_function("if (1) { }"), "Expected boolean condition, but got 'int'");
    analyze_should_fail_with(
        &in_function("nullable bool b = null; while (b) { }"),
        "Expected boolean condition, but got 'nullable bool'",
    );
}

#[test]
fn condition_needs_parentheses() {
    analyze_should_fail_with(&in_function("if true { }"), "Expected condition in parentheses after 'if'");
}

// ═══════════════════════════════════════════════════════════════════════════════
// RETURNS & REACHABILITY
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn returns_checked_against_declaration() {
    analyze_ok("module m { fn f :: long (long a) { ret a; } }");
    analyze_should_fail_with(
        "module m { fn f :: long (int a) { ret a; } }",
        "Expected datatype of return value to be 'long', but got 'int' instead",
    );
    analyze_should_fail_with(
        "module m { fn f :: long (int a) { ret true; } }",
        "Expected datatype of return value to be 'long', but got 'bool' instead",
    );
}

#[test]
fn void_function_returns_nothing() {
    analyze_ok("module m { fn f { ret; } }");
    analyze_should_fail_with(
        "module m { fn f :: int () { ret; } }",
        "Expected datatype of return value to be 'int', but got 'void' instead",
    );
}

#[test]
fn unreachable_statement_warns() {
    let analysis = analyze_ok("module m { fn f { while (true) { break; int x = 1; } } }");
    let warnings: Vec<_> = analysis.diagnostics.warnings().map(|d| d.message.clone()).collect();
    assert_eq!(warnings, vec!["Unreachable statement".to_string()]);
}

// ═══════════════════════════════════════════════════════════════════════════════
// ASSIGNMENT
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn assign_once_without_mut() {
    analyze_ok(&in_function("int x; x = 4;"));
    analyze_should_fail_with(&in_function("int x = 1; x = 4;"), "Cannot reassign immutable variable 'x'");
}

#[test]
fn compound_assignment_rules() {
    analyze_ok(&in_function("mut long x = 1; x *= 3; x <<= 2; x %= 5;"));
    analyze_should_fail_with(
        &in_function("mut string s = \"a\"; s -= 1;"),
        "Cannot use '-' operator on types 'string' and 'int'",
    );
    analyze_ok(&in_function("mut string s = \"a\"; s += 1;"));
}

#[test]
fn increment_on_non_numeric() {
    analyze_should_fail_with(&in_function("mut bool b = true; b++;"), "Cannot use '++' operator on type 'bool'");
}

#[test]
fn local_redefinition_in_nested_block() {
    analyze_should_fail_with(
        &in_function("int x = 1; if (true) { int x = 2; }"),
        "Redefinition of variable 'x'",
    );
}

#[test]
fn use_outside_function() {
    analyze_should_fail_with("module m { use std; }", "Expected statement to be inside of a function");
}
