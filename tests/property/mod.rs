// Property tests for the expression parser and the analyzer as a whole.
//
// Run with more cases:
//   PROPTEST_CASES=1000 cargo test --test property

use proptest::prelude::*;

use mic::config::AnalyzerConfig;
use mic::native::HostRegistry;
use mic::parser::Analysis;
use mic::parser::ast::NodeKind;
use mic::typeck::types::Datatype;

const OPS: &[(&str, u8)] = &[
    ("|", 1),
    ("^", 2),
    ("&", 3),
    ("<<", 4),
    (">>", 4),
    ("+", 5),
    ("-", 5),
    ("*", 6),
    ("/", 6),
    ("%", 6),
];

fn analyze(source: &str) -> Analysis {
    let config = AnalyzerConfig { stdlib: false, ..AnalyzerConfig::default() };
    mic::analyze(source, &config, &HostRegistry::new())
}

/// Sexpr of the initializer of `int v = <expr>;`.
fn initializer(expr: &str) -> (String, Option<Datatype>) {
    let analysis = analyze(&format!("module m {{ fn f {{ int v = {expr}; }} }}"));
    assert!(analysis.is_ok(), "{expr}: {:?}", analysis.diagnostics.iter().collect::<Vec<_>>());
    let defs = analysis.root.find_all(NodeKind::VarDefAndSetValue);
    let value = &defs[0].child(NodeKind::Value).unwrap().children[0];
    (value.to_sexpr(), value.ty.clone())
}

/// Fully parenthesize a flat operator chain using left-associative precedence climbing.
fn parenthesize(operands: &[u32], ops: &[usize]) -> String {
    fn climb(operands: &[u32], ops: &[usize], pos: &mut usize, min: u8) -> String {
        let mut lhs = operands[*pos].to_string();
        while *pos < ops.len() {
            let (symbol, prec) = OPS[ops[*pos]];
            if prec < min {
                break;
            }
            *pos += 1;
            let rhs = climb(operands, ops, pos, prec + 1);
            lhs = format!("({lhs} {symbol} {rhs})");
        }
        lhs
    }
    let mut pos = 0;
    climb(operands, ops, &mut pos, 0)
}

fn chain() -> impl Strategy<Value = (Vec<u32>, Vec<usize>)> {
    (1usize..7).prop_flat_map(|n| {
        (
            prop::collection::vec(0u32..1000, n + 1),
            prop::collection::vec(0..OPS.len(), n),
        )
    })
}

proptest! {
    #[test]
    fn prop_precedence_matches_explicit_grouping((operands, ops) in chain()) {
        let mut flat = operands[0].to_string();
        for (i, op) in ops.iter().enumerate() {
            flat.push_str(&format!(" {} {}", OPS[*op].0, operands[i + 1]));
        }
        let grouped = parenthesize(&operands, &ops);

        let (plain, plain_ty) = initializer(&flat);
        let (explicit, _) = initializer(&grouped);
        prop_assert_eq!(plain, explicit, "{} vs {}", flat, grouped);
        prop_assert_eq!(plain_ty, Some(Datatype::INT));
    }

    #[test]
    fn prop_every_expression_node_is_typed((operands, ops) in chain()) {
        let mut flat = operands[0].to_string();
        for (i, op) in ops.iter().enumerate() {
            flat.push_str(&format!(" {} -{}", OPS[*op].0, operands[i + 1]));
        }
        let analysis = analyze(&format!("module m {{ fn f {{ long v = {flat}; bool b = v > 0; }} }}"));
        prop_assert!(analysis.is_ok());
        let mut untyped = Vec::new();
        analysis.root.walk(&mut |n| {
            if n.kind.is_expression() && n.ty.is_none() {
                untyped.push(n.kind);
            }
        });
        prop_assert!(untyped.is_empty(), "untyped nodes: {:?}", untyped);
    }

    #[test]
    fn prop_int_literals_in_range(n in 0i64..=i32::MAX as i64) {
        let (sexpr, ty) = initializer(&n.to_string());
        prop_assert_eq!(sexpr, format!("(INTEGER_LITERAL {n})"));
        prop_assert_eq!(ty, Some(Datatype::INT));
    }

    #[test]
    fn prop_int_literals_out_of_range(n in (i32::MAX as i64 + 1)..i64::MAX) {
        let analysis = analyze(&format!("module m {{ fn f {{ int v = {n}; }} }}"));
        let messages: Vec<String> = analysis.diagnostics.errors().map(|d| d.message.clone()).collect();
        prop_assert_eq!(messages, vec![format!("Integer literal '{n}' is out of range for 'int'")]);
    }

    #[test]
    fn prop_analysis_never_panics(source in "\\PC{0,300}") {
        let analysis = mic::analyze_source(&source);
        prop_assert_eq!(analysis.is_ok(), analysis.diagnostics.error_count() == 0);
    }

    #[test]
    fn prop_analysis_is_deterministic(source in "[a-z{}();=+ 0-9]{0,120}") {
        let first = analyze(&source);
        let second = analyze(&source);
        prop_assert_eq!(first.root, second.root);
        let a: Vec<&str> = first.diagnostics.iter().map(|d| d.message.as_str()).collect();
        let b: Vec<&str> = second.diagnostics.iter().map(|d| d.message.as_str()).collect();
        prop_assert_eq!(a, b);
    }
}
