mod common;
use common::{analyze_ok, analyze_should_fail_with, find_user, module};

use mic::lang::FunctionBody;
use mic::parser::ast::NodeKind;
use mic::typeck::types::Datatype;

// ═══════════════════════════════════════════════════════════════════════════════
// GLOBALS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn inferred_global_and_getter() {
    let analysis = analyze_ok("module m { pub? x = 5; fn get :: int () { ret x; } }");
    let m = module(&analysis.modules, "m");
    let x = &analysis.modules.get(m).variables["x"];
    assert_eq!(x.ty, Datatype::INT);
    assert!(x.initialized);
    assert_eq!(x.value.as_ref().map(|v| v.kind), Some(NodeKind::IntegerLiteral));

    let get = &analysis.modules.get(m).overloads("get")[0];
    assert_eq!(get.return_type, Datatype::INT);
    let FunctionBody::Ast(body) = &get.body else {
        panic!("get has no analyzed body");
    };
    let refs = body.find_all(NodeKind::VariableReference);
    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0].lexeme(), Some("m.x"));
    assert_eq!(refs[0].ty, Some(Datatype::INT));
}

#[test]
fn block_comments_between_declarations() {
    let analysis = analyze_ok("/* c */ module m { /* a * b **/ int x = 1; /*\n*/ }");
    let m = module(&analysis.modules, "m");
    assert!(analysis.modules.get(m).variables.contains_key("x"));
}

#[test]
fn global_definition_node() {
    let analysis = analyze_ok("module m { const long L = 3; }");
    let defs = find_user(&analysis, NodeKind::VarDefAndSetValue);
    assert_eq!(
        defs[0].to_sexpr(),
        "(VAR_DEF_AND_SET_VALUE (MODIFIERS (MODIFIER const)) (IDENTIFIER L) (TYPE long) (VALUE (INTEGER_LITERAL 3)))"
    );
}

#[test]
fn stdlib_global_visible_from_user_modules() {
    analyze_ok("module m { fn f { string v = MI_VERSION; } }");
}

#[test]
fn globals_rejected_at_root_level() {
    analyze_should_fail_with("int x = 1;", "Cannot define global variables at root level");
}

#[test]
fn global_redefinition() {
    analyze_should_fail_with("module m { int x; bool x; }", "Redefinition of variable 'x'");
}

#[test]
fn name_shared_with_class_rejected() {
    analyze_should_fail_with("module m { class C { } int C = 1; }", "Redefinition of variable 'C'");
}

#[test]
fn null_requires_nullable() {
    analyze_ok("module m { nullable int x = null; }");
    analyze_should_fail_with(
        "module m { int x = null; }",
        "Datatypes are not equal on both sides, trying to assign null to a int variable.",
    );
}

#[test]
fn narrowing_rejected() {
    analyze_should_fail_with(
        "module m { int x = 5L; }",
        "Datatypes are not equal on both sides, trying to assign long to a int variable.",
    );
}

#[test]
fn unknown_datatype() {
    analyze_should_fail_with("module m { Missing x; }", "Cannot find datatype 'Missing'");
}

// ═══════════════════════════════════════════════════════════════════════════════
// CLASSES & ENUMS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn class_members_registered() {
    let analysis = analyze_ok(
        "module shapes {
            class Point {
                mut int x = 0;
                mut int y = 0;
                new (int sx, int sy) { x = sx; y = sy; }
                fn sum :: int () { ret x + y; }
            }
            fn origin :: Point () { ret new Point(); }
        }",
    );
    let shapes = module(&analysis.modules, "shapes");
    let point = &analysis.modules.get(shapes).classes["Point"];
    assert_eq!(point.fields.len(), 2);
    assert_eq!(point.overloads("sum").len(), 1);
    let ctor = point.constructor.as_ref().unwrap();
    assert_eq!(ctor.parameters.len(), 2);

    let origin = &analysis.modules.get(shapes).overloads("origin")[0];
    assert_eq!(origin.return_type, Datatype::named("shapes.Point"));
}

#[test]
fn class_node_shape() {
    let analysis = analyze_ok("module m { pub class C { int v = 1; } }");
    let classes = find_user(&analysis, NodeKind::CreateClass);
    assert_eq!(
        classes[0].to_sexpr(),
        "(CREATE_CLASS (IDENTIFIER C) (MODIFIERS (MODIFIER pub)) (VAR_DEF_AND_SET_VALUE MODIFIERS (IDENTIFIER v) (TYPE int) (VALUE (INTEGER_LITERAL 1))))"
    );
}

#[test]
fn classes_rejected_at_root_level() {
    analyze_should_fail_with("class C { }", "Cannot define classes at root level");
    analyze_should_fail_with("enum E { A; }", "Cannot define enums at root level");
}

#[test]
fn const_class_rejected() {
    analyze_should_fail_with("module m { const class C { } }", "Cannot declare classes as const or mut");
}

#[test]
fn enum_definition() {
    let analysis = analyze_ok("module m { enum Color { RED, GREEN, BLUE; } }");
    let m = module(&analysis.modules, "m");
    assert_eq!(analysis.modules.get(m).enums["Color"].members, vec!["RED", "GREEN", "BLUE"]);
    let enums = find_user(&analysis, NodeKind::CreateEnum);
    assert_eq!(
        enums[0].to_sexpr(),
        "(CREATE_ENUM (IDENTIFIER Color) MODIFIERS (ENUM_VALUES (IDENTIFIER RED) (IDENTIFIER GREEN) (IDENTIFIER BLUE)))"
    );
}

#[test]
fn enum_typed_variable() {
    let analysis = analyze_ok("module m { enum E { A, B; } } module n { m.E v = m.E::A; }");
    let n = module(&analysis.modules, "n");
    let v = &analysis.modules.get(n).variables["v"];
    assert_eq!(v.ty, Datatype::named("m.E"));
    let get = find_user(&analysis, NodeKind::GetEnumMember);
    assert_eq!(get[0].to_sexpr(), "(GET_ENUM_MEMBER (IDENTIFIER m.E) (IDENTIFIER A))");
    assert_eq!(get[0].ty, Some(Datatype::named("m.E")));
}

#[test]
fn unknown_enum_member() {
    analyze_should_fail_with("module m { enum E { A; } E v = E::Z; }", "Cannot find member 'Z' in enum 'm.E'");
}

#[test]
fn enum_members_listed_twice() {
    analyze_should_fail_with("module m { enum E { A; B; } }", "Redefinition of enum members");
}

// ═══════════════════════════════════════════════════════════════════════════════
// FUNCTIONS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn function_definition_node() {
    let analysis = analyze_ok("module m { pub fn add :: int (int a, mut int b) { ret a + b; } }");
    let defs = find_user(&analysis, NodeKind::FunctionDefinition);
    assert_eq!(
        defs[0].to_sexpr(),
        "(FUNCTION_DEFINITION (IDENTIFIER add) (TYPE int) (MODIFIERS (MODIFIER pub)) \
         (PARAMETERS (PARAMETER MODIFIERS (IDENTIFIER a) (TYPE int)) \
         (PARAMETER (MODIFIERS (MODIFIER mut)) (IDENTIFIER b) (TYPE int))) \
         (RETURN_VALUE (ADD (VARIABLE_REFERENCE a) (VARIABLE_REFERENCE b))))"
    );
}

#[test]
fn functions_rejected_at_root_level() {
    analyze_should_fail_with("fn main { }", "Cannot define functions at root level");
}

#[test]
fn duplicate_signature_rejected() {
    analyze_should_fail_with(
        "module m { fn f (int a) { } fn f (int b) { } }",
        "Redefinition of function 'f'",
    );
}

#[test]
fn nullable_return_type() {
    let analysis = analyze_ok("module m { nullable fn find :: string () { ret null; } }");
    let m = module(&analysis.modules, "m");
    assert_eq!(
        analysis.modules.get(m).overloads("find")[0].return_type,
        Datatype::STRING.with_nullable(true)
    );
}

#[test]
fn nullable_value_cannot_return_as_nonnull() {
    analyze_should_fail_with(
        "module m { fn f :: int (nullable int a) { ret a; } }",
        "Expected datatype of return value to be 'int', but got 'nullable int' instead",
    );
}

#[test]
fn missing_return_value() {
    analyze_should_fail_with(
        "module m { fn f :: int (bool b) { if (b) { ret 1; } } }",
        "Missing return statement, expected a value of type 'int'",
    );
}
