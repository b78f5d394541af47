mod common;
use common::{analyze_ok, analyze_should_fail_with, errors, find_user, module};

use mic::config::AnalyzerConfig;
use mic::lang::FunctionBody;
use mic::native::{HostClass, HostMethod, HostParam, HostRegistry, HostType, NativeValue};
use mic::parser::Analysis;
use mic::parser::ast::NodeKind;
use mic::typeck::types::{Datatype, Primitive};

fn noop(_: &[NativeValue]) -> Option<NativeValue> {
    None
}

fn sleep() -> HostMethod {
    HostMethod::callable_static("sleep", vec![HostParam::boxed(Primitive::Long)], HostType::Void, noop)
}

fn with_host(method: HostMethod, source: &str) -> Analysis {
    let mut host = HostRegistry::new();
    host.register(HostClass::new("host.Std").method(method));
    let config = AnalyzerConfig { stdlib: false, ..AnalyzerConfig::default() };
    mic::analyze(source, &config, &host)
}

const SLEEP: &str = "module m { nat fn sleep~ (long millis) -> \"host.Std\"; }";

#[test]
fn native_binds_to_static_callable() {
    let analysis = with_host(sleep(), SLEEP);
    assert!(analysis.is_ok(), "{:?}", errors(&analysis));
    let m = module(&analysis.modules, "m");
    let def = &analysis.modules.get(m).overloads("sleep")[0];
    let FunctionBody::Native(binding) = &def.body else {
        panic!("sleep is not bound");
    };
    assert_eq!(binding.class, "host.Std");
    assert_eq!(binding.invoke(&[NativeValue::Long(0)]), None);

    let nodes = find_user(&analysis, NodeKind::NativeFunctionDefinition);
    assert_eq!(
        nodes[0].to_sexpr(),
        "(NATIVE_FUNCTION_DEFINITION (IDENTIFIER sleep) TYPE (MODIFIERS (MODIFIER nat)) \
         (PARAMETERS (PARAMETER MODIFIERS (IDENTIFIER millis) (TYPE long))) (NATIVE_HOST_CLASS host.Std))"
    );
}

#[test]
fn missing_callable_marker() {
    let mut method = sleep();
    method.callable = false;
    let analysis = with_host(method, SLEEP);
    assert_eq!(
        errors(&analysis),
        vec!["May only use native methods annotated as callable, but 'void sleep(Long)' is not".to_string()]
    );
    let hints = &analysis.diagnostics.errors().next().unwrap().hints;
    assert_eq!(hints, &vec!["Annotate the host method as callable".to_string()]);
}

#[test]
fn unboxed_host_parameter() {
    let mut method = sleep();
    method.params = vec![HostParam { ty: HostType::Unboxed(Primitive::Long), nonnull: false }];
    let analysis = with_host(method, SLEEP);
    assert_eq!(
        errors(&analysis),
        vec!["Native method 'void sleep(long)' in class 'host.Std' takes unboxed parameters".to_string()]
    );
}

#[test]
fn instance_method_rejected() {
    let mut method = sleep();
    method.is_static = false;
    let analysis = with_host(method, SLEEP);
    assert_eq!(errors(&analysis), vec!["Native methods must be static, but 'void sleep(Long)' is not".to_string()]);
}

#[test]
fn unknown_host_class_and_method() {
    let analysis = with_host(sleep(), "module m { nat fn sleep~ (long ms) -> \"host.Missing\"; }");
    assert_eq!(errors(&analysis), vec!["Cannot find native class 'host.Missing'".to_string()]);
    let analysis = with_host(sleep(), "module m { nat fn nap~ (long ms) -> \"host.Std\"; }");
    assert_eq!(errors(&analysis), vec!["Cannot find native method 'nap(Long)' in class 'host.Std'".to_string()]);
}

#[test]
fn non_primitive_parameter() {
    let analysis = with_host(sleep(), "module m { enum E { A; } nat fn sleep~ (E e) -> \"host.Std\"; }");
    assert_eq!(
        errors(&analysis),
        vec!["Only primitive datatypes may be used as native function arguments, but parameter #1 is 'm.E'".to_string()]
    );
}

#[test]
fn native_with_body_rejected() {
    analyze_should_fail_with("module m { nat fn f { } }", "Native function 'f' cannot have a body");
}

#[test]
fn host_class_without_nat_rejected() {
    analyze_should_fail_with(
        "module m { fn f~ () -> \"mi.std.Std\"; }",
        "Function 'f' is bound to a host class but not declared 'nat'",
    );
}

#[test]
fn native_errors_stop_before_body_pass() {
    let mut method = sleep();
    method.callable = false;
    let analysis = with_host(method, "module m { nat fn sleep~ (long ms) -> \"host.Std\"; fn f { int x = true; } }");
    assert_eq!(analysis.diagnostics.error_count(), 1);
}

#[test]
fn stdlib_natives_callable_from_user_code() {
    let analysis = analyze_ok(
        "module m {
            fn f {
                std.sleep(10L);
                long id = std.random_uuid_long();
                string red = termion.color_fg(255, 0, 0);
                string reset = termion.reset();
                std.print(red + id + reset);
            }
        }",
    );
    let calls = find_user(&analysis, NodeKind::FunctionCall);
    assert_eq!(calls.len(), 5);
    assert_eq!(calls[1].ty, Some(Datatype::LONG));
    assert_eq!(calls[2].ty, Some(Datatype::STRING));
}

#[test]
fn stdlib_natives_reject_wrong_arguments() {
    analyze_should_fail_with(
        "module m { fn f { std.sleep(true); } }",
        "Cannot find any implementation for function 'std.sleep' with argument types (bool)",
    );
}
