use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::lexer::token::Token;
use crate::span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Error,
    Warning,
}

/// Which stage of analysis rejected the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagnosticKind {
    Lexical,
    Syntax,
    Scope,
    Resolution,
    Type,
    Native,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub message: String,
    pub line: usize,
    pub column: usize,
    pub span: Option<Span>,
    pub hints: Vec<String>,
}

impl Diagnostic {
    pub fn error(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            kind,
            message: message.into(),
            line: 0,
            column: 0,
            span: None,
            hints: Vec::new(),
        }
    }

    pub fn warning(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self { severity: Severity::Warning, ..Self::error(kind, message) }
    }

    /// Attach the offending token's position.
    pub fn at(mut self, token: &Token) -> Self {
        self.line = token.line;
        self.column = token.column;
        self.span = Some(token.span);
        self
    }

    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{level} at {}:{}: {}", self.line, self.column, self.message)
    }
}

/// Accumulates diagnostics for one analysis run. The error flag is sticky.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
    encountered_error: bool,
    /// 0 means unlimited.
    max_errors: usize,
    suppressed: usize,
}

impl Diagnostics {
    pub fn new(max_errors: usize) -> Self {
        Self { max_errors, ..Self::default() }
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        if diagnostic.is_error() {
            self.encountered_error = true;
            if self.max_errors != 0 && self.error_count() >= self.max_errors {
                self.suppressed += 1;
                return;
            }
        }
        tracing::trace!(%diagnostic, "recorded diagnostic");
        self.entries.push(diagnostic);
    }

    pub fn encountered_error(&self) -> bool {
        self.encountered_error
    }

    pub fn error_count(&self) -> usize {
        self.entries.iter().filter(|d| d.is_error()).count()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(|d| !d.is_error())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Errors dropped after `max_errors` was reached.
    pub fn suppressed(&self) -> usize {
        self.suppressed
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("Syntax error: {msg}")]
    Syntax { msg: String, span: Span },

    #[error("analysis failed with {} error(s)", .diagnostics.error_count().max(1))]
    Analysis { diagnostics: Diagnostics },

    #[error("Config error: {msg}")]
    Config { msg: String, path: PathBuf },

    #[error("I/O error: {msg}")]
    Io { msg: String },
}

impl CompileError {
    pub fn syntax(msg: impl Into<String>, span: Span) -> Self {
        Self::Syntax { msg: msg.into(), span }
    }

    pub fn config(msg: impl Into<String>, path: PathBuf) -> Self {
        Self::Config { msg: msg.into(), path }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io { msg: msg.into() }
    }
}

fn source_for<'a>(span: &Span, user: &'a str, stdlib: &'a str) -> &'a str {
    if span.is_stdlib() { stdlib } else { user }
}

/// Render one diagnostic with ariadne. Diagnostics without a span print as a plain line.
pub fn render_diagnostic(user_source: &str, stdlib_source: &str, diagnostic: &Diagnostic) {
    use ariadne::{Label, Report, ReportKind, Source};

    let Some(span) = diagnostic.span else {
        eprintln!("{diagnostic}");
        for hint in &diagnostic.hints {
            eprintln!("  help: {hint}");
        }
        return;
    };
    let kind = match diagnostic.severity {
        Severity::Error => ReportKind::Error,
        Severity::Warning => ReportKind::Warning,
    };
    let mut report = Report::build(kind, (), span.start)
        .with_message(&diagnostic.message)
        .with_label(Label::new(span.start..span.end).with_message(&diagnostic.message));
    for hint in &diagnostic.hints {
        report = report.with_help(hint);
    }
    let _ = report
        .finish()
        .eprint(Source::from(source_for(&span, user_source, stdlib_source)));
}

pub fn render_diagnostics(user_source: &str, stdlib_source: &str, diagnostics: &Diagnostics) {
    for diagnostic in diagnostics.iter() {
        render_diagnostic(user_source, stdlib_source, diagnostic);
    }
    if diagnostics.suppressed() > 0 {
        eprintln!("note: {} further error(s) suppressed", diagnostics.suppressed());
    }
}

/// Render a CompileError with ariadne for nice terminal output.
pub fn render_error(user_source: &str, stdlib_source: &str, err: &CompileError) {
    use ariadne::{Label, Report, ReportKind, Source};

    match err {
        CompileError::Syntax { msg, span } => {
            let _ = Report::build(ReportKind::Error, (), span.start)
                .with_message("syntax error")
                .with_label(Label::new(span.start..span.end).with_message(msg))
                .finish()
                .eprint(Source::from(source_for(span, user_source, stdlib_source)));
        }
        CompileError::Analysis { diagnostics } => {
            render_diagnostics(user_source, stdlib_source, diagnostics);
        }
        CompileError::Config { msg, path } => {
            eprintln!("error[config]: {msg}");
            eprintln!("  --> {}", path.display());
        }
        CompileError::Io { msg } => {
            eprintln!("error: {msg}");
        }
    }
}
