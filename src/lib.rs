pub mod config;
pub mod diagnostics;
pub mod lang;
pub mod lexer;
pub mod native;
pub mod parser;
pub mod prelude;
pub mod span;
pub mod typeck;

use config::AnalyzerConfig;
use diagnostics::{CompileError, Diagnostic, DiagnosticKind, Diagnostics};
use lang::ModuleTree;
use native::{HostLookup, HostRegistry};
use parser::ast::{Node, NodeKind};
use parser::{Analysis, Analyzer};

/// Analyze `source` (preceded by the standard library unless disabled) and return the
/// annotated tree together with every diagnostic. Lexical errors become diagnostics.
pub fn analyze(source: &str, config: &AnalyzerConfig, host: &dyn HostLookup) -> Analysis {
    match prelude::token_stream(source, config.stdlib) {
        Ok(tokens) => Analyzer::new(tokens, host, config).run(),
        Err(err) => {
            let mut diagnostics = Diagnostics::new(config.max_errors);
            diagnostics.report(lexical_diagnostic(source, &err));
            Analysis { root: Node::new(NodeKind::Parent, 0), modules: ModuleTree::new(), diagnostics }
        }
    }
}

fn lexical_diagnostic(source: &str, err: &CompileError) -> Diagnostic {
    let mut diagnostic = Diagnostic::error(DiagnosticKind::Lexical, err.to_string());
    if let CompileError::Syntax { span, .. } = err {
        let text = if span.is_stdlib() { prelude::STDLIB_SOURCE } else { source };
        let (line, column) = lexer::position(text, span.start);
        diagnostic.line = line;
        diagnostic.column = column;
        diagnostic.span = Some(*span);
    }
    diagnostic
}

/// Analyze with default settings and the built-in host classes.
pub fn analyze_source(source: &str) -> Analysis {
    analyze(source, &AnalyzerConfig::default(), &HostRegistry::standard())
}

/// Analyze with default settings, failing if any error was recorded.
pub fn check(source: &str) -> Result<Analysis, CompileError> {
    check_with(source, &AnalyzerConfig::default(), &HostRegistry::standard())
}

/// Analyze under `config`, failing on errors, or on warnings when `deny_warnings` is set.
pub fn check_with(
    source: &str,
    config: &AnalyzerConfig,
    host: &dyn HostLookup,
) -> Result<Analysis, CompileError> {
    let analysis = analyze(source, config, host);
    let denied = config.deny_warnings && analysis.diagnostics.warnings().next().is_some();
    if !analysis.is_ok() || denied {
        return Err(CompileError::Analysis { diagnostics: analysis.diagnostics });
    }
    Ok(analysis)
}
