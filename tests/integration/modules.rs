mod common;
use common::{analyze_ok, analyze_should_fail_with, errors, find_user, module};

use mic::config::AnalyzerConfig;
use mic::lexer::lex_unit;
use mic::native::HostRegistry;
use mic::parser::Analyzer;
use mic::parser::ast::NodeKind;
use mic::span::{STDLIB_FILE, USER_FILE};

#[test]
fn nested_modules_form_a_tree() {
    let analysis = analyze_ok("module outer { module inner { pub int v = 1; } }");
    let inner = module(&analysis.modules, "outer.inner");
    assert_eq!(analysis.modules.path(inner), "outer.inner");
    assert!(analysis.modules.get(inner).variables.contains_key("v"));
}

#[test]
fn reopened_module_merges() {
    let analysis = analyze_ok("module m { int a = 1; } module m { int b = a; }");
    let m = module(&analysis.modules, "m");
    assert_eq!(analysis.modules.get(m).variables.len(), 2);
}

#[test]
fn qualified_access_across_modules() {
    let analysis = analyze_ok(
        "module a { pub int v = 1; pub fn get :: int () { ret v; } }
         module b { fn f { int x = a.v + a.get(); } }",
    );
    let refs = find_user(&analysis, NodeKind::VariableReference);
    assert!(refs.iter().any(|r| r.lexeme() == Some("a.v")));
}

#[test]
fn enclosing_modules_are_searched() {
    analyze_ok("module outer { int shared = 1; module inner { fn f { int x = shared; } } }");
}

#[test]
fn sibling_modules_are_not_searched() {
    analyze_should_fail_with(
        "module a { int hidden = 1; } module b { fn f { int x = hidden; } }",
        "Cannot find any variable called 'hidden'",
    );
}

#[test]
fn use_brings_names_into_scope() {
    analyze_ok("module a { pub int v = 1; pub fn hi { } } module b { fn f { use a; hi(); int x = v; } }");
}

#[test]
fn use_is_scoped_to_the_function() {
    analyze_should_fail_with(
        "module a { pub fn hi { } } module b { fn f { use a; } fn g { hi(); } }",
        "Cannot find any function called 'hi' in module 'b'",
    );
}

#[test]
fn use_of_unknown_module() {
    analyze_should_fail_with("module b { fn f { use missing; } }", "Cannot find module 'missing'");
}

#[test]
fn ambiguous_variable_from_two_uses() {
    analyze_should_fail_with(
        "module a { pub int v = 1; } module c { pub int v = 2; } module b { fn f { use a; use c; int x = v; } }",
        "Ambiguous variable 'v', found in modules a, c",
    );
}

#[test]
fn ambiguous_function_from_two_uses() {
    analyze_should_fail_with(
        "module a { pub fn hi { } } module c { pub fn hi { } } module b { fn f { use a; use c; hi(); } }",
        "Ambiguous call to function 'hi' with no arguments, 2 overloads match",
    );
}

#[test]
fn unknown_module_in_path() {
    analyze_should_fail_with("module b { fn f { int x = nowhere.v; } }", "Cannot find module 'nowhere'");
}

#[test]
fn priv_visible_only_inside_declaring_module() {
    analyze_ok("module a { priv int v = 1; module sub { fn f { int x = v; } } }");
    analyze_should_fail_with(
        "module a { priv int v = 1; } module b { fn f { int x = a.v; } }",
        "Cannot access priv variable 'a.v' of module 'a' from here",
    );
    analyze_should_fail_with(
        "module a { priv fn p { } } module b { fn f { a.p(); } }",
        "Cannot access priv function 'a.p' of module 'a' from here",
    );
}

#[test]
fn own_visible_only_in_declaring_source() {
    let host = HostRegistry::standard();
    let config = AnalyzerConfig::default();
    let library = "module lib { own int secret = 1; pub int open = 2; } STANDARDLIB_MI_FINISH_CODE;";
    let user = "module m { fn f { int a = lib.open; int b = lib.secret; } }";
    let mut tokens = lex_unit(library, STDLIB_FILE, 0).unwrap();
    tokens.extend(lex_unit(user, USER_FILE, 1).unwrap());

    let analysis = Analyzer::new(tokens, &host, &config).run();
    assert_eq!(
        errors(&analysis),
        vec!["Cannot access own variable 'lib.secret' of module 'lib' from here".to_string()]
    );
}

#[test]
fn module_inside_function_rejected() {
    analyze_should_fail_with(
        "module a { fn f { module b { } } }",
        "Modules can only be defined at root level or inside of other modules",
    );
}

#[test]
fn class_and_enum_need_module_scope() {
    analyze_should_fail_with("module a { fn f { enum E { A; } } }", "Enums can only be defined inside of modules");
    analyze_should_fail_with("module a { class C { class D { } } }", "Classes can only be defined inside of modules");
}

#[test]
fn stdlib_finish_only_once() {
    analyze_should_fail_with(
        "STANDARDLIB_MI_FINISH_CODE;",
        "Unexpected parsing error, standard library ended outside of the root scope",
    );
}
