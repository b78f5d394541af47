#![allow(dead_code)]

use std::process::Command;

use mic::lang::{ModuleId, ModuleTree};
use mic::parser::Analysis;
use mic::parser::ast::{Node, NodeKind};

pub fn mic() -> Command {
    Command::new(env!("CARGO_BIN_EXE_mic"))
}

pub fn errors(analysis: &Analysis) -> Vec<String> {
    analysis.diagnostics.errors().map(|d| d.message.clone()).collect()
}

/// Analyze with the standard library and assert no errors were recorded.
pub fn analyze_ok(source: &str) -> Analysis {
    let analysis = mic::analyze_source(source);
    assert!(analysis.is_ok(), "Analysis should have succeeded, got: {:?}", errors(&analysis));
    analysis
}

pub fn analyze_should_fail(source: &str) -> Analysis {
    let analysis = mic::analyze_source(source);
    assert!(!analysis.is_ok(), "Analysis should have failed");
    analysis
}

pub fn analyze_should_fail_with(source: &str, expected_msg: &str) -> Analysis {
    let analysis = analyze_should_fail(source);
    let errors = errors(&analysis);
    assert!(
        errors.iter().any(|e| e.contains(expected_msg)),
        "Expected error containing '{}', got: {:?}",
        expected_msg,
        errors
    );
    analysis
}

/// Module at a dotted path from the root.
pub fn module(tree: &ModuleTree, path: &str) -> ModuleId {
    tree.descend(tree.root(), path)
        .unwrap_or_else(|| panic!("module '{path}' not found"))
}

/// The user part of the tree: everything after the stdlib end marker.
pub fn user_nodes(analysis: &Analysis) -> &[Node] {
    let children = &analysis.root.children;
    match children.iter().position(|c| c.kind == NodeKind::StdlibFinish) {
        Some(i) => &children[i + 1..],
        None => children,
    }
}

pub fn find_user(analysis: &Analysis, kind: NodeKind) -> Vec<&Node> {
    user_nodes(analysis).iter().flat_map(|n| n.find_all(kind)).collect()
}
