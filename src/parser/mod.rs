pub mod ast;
mod expr;
mod resolve;
mod statements;

use crate::config::AnalyzerConfig;
use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::lang::{FunctionBody, Modifier, Modifiers, ModuleTree, Owner};
use crate::lexer::token::{Token, TokenKind};
use crate::native::HostLookup;
use crate::typeck::scope::{BlockScope, BodyOwner, Scope, ScopeData, ScopeKind, ScopeStack};
use ast::{Node, NodeKind};

/// Result of analyzing one token stream.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Parent node holding every top-level statement. Empty when the declaration pass failed.
    pub root: Node,
    pub modules: ModuleTree,
    pub diagnostics: Diagnostics,
}

impl Analysis {
    pub fn is_ok(&self) -> bool {
        !self.diagnostics.encountered_error()
    }
}

/// Leading modifiers of a statement.
#[derive(Debug, Clone, Default)]
pub(crate) struct Mods {
    pub set: Modifiers,
    pub tokens: Vec<Token>,
}

impl Mods {
    pub fn node(&self, line: usize) -> Node {
        Node::new(NodeKind::Modifiers, line)
            .with_children(self.tokens.iter().map(|t| Node::leaf(NodeKind::Modifier, t)))
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Two-pass semantic analyzer. The first pass records declarations and skips
/// function bodies; the second builds the annotated tree.
pub struct Analyzer<'h> {
    tokens: Vec<Token>,
    pos: usize,
    pub(crate) modules: ModuleTree,
    pub(crate) scopes: ScopeStack,
    pub(crate) diagnostics: Diagnostics,
    pub(crate) host: &'h dyn HostLookup,
    pub(crate) skimming: bool,
    /// Currently analyzing stdlib text.
    pub(crate) stdlib: bool,
    starts_in_stdlib: bool,
    pending_do: Option<Node>,
    skipped_block: bool,
}

impl<'h> Analyzer<'h> {
    pub fn new(tokens: Vec<Token>, host: &'h dyn HostLookup, config: &AnalyzerConfig) -> Self {
        let starts_in_stdlib = tokens.first().is_some_and(|t| t.span.is_stdlib());
        let modules = ModuleTree::new();
        let scopes = ScopeStack::new(modules.root(), Node::new(NodeKind::Parent, 0));
        Self {
            tokens,
            pos: 0,
            modules,
            scopes,
            diagnostics: Diagnostics::new(config.max_errors),
            host,
            skimming: true,
            stdlib: starts_in_stdlib,
            starts_in_stdlib,
            pending_do: None,
            skipped_block: false,
        }
    }

    pub fn run(mut self) -> Analysis {
        let _span = tracing::debug_span!("analyze", tokens = self.tokens.len()).entered();
        self.pass(true);
        if self.diagnostics.encountered_error() {
            tracing::debug!(errors = self.diagnostics.error_count(), "declaration pass failed");
            return Analysis {
                root: Node::new(NodeKind::Parent, 0),
                modules: self.modules,
                diagnostics: self.diagnostics,
            };
        }
        let root = self.pass(false);
        tracing::debug!(
            modules = self.modules.len(),
            errors = self.diagnostics.error_count(),
            warnings = self.diagnostics.warnings().count(),
            "analysis finished"
        );
        Analysis { root, modules: self.modules, diagnostics: self.diagnostics }
    }

    fn pass(&mut self, skimming: bool) -> Node {
        tracing::trace!(skimming, "starting pass");
        self.skimming = skimming;
        self.pos = 0;
        self.stdlib = self.starts_in_stdlib;
        self.pending_do = None;
        self.scopes = ScopeStack::new(self.modules.root(), Node::new(NodeKind::Parent, 0));

        while let Some(statement) = self.next_statement() {
            self.statement(&statement);
        }
        if self.pending_do.is_some() {
            if let Some(last) = self.tokens.last().cloned() {
                self.error(DiagnosticKind::Syntax, "Expected 'while' after 'do' block", &last);
            }
            self.flush_pending_do();
        }
        if self.scopes.depth() > 1 {
            if let Some(last) = self.tokens.last().cloned() {
                self.report(
                    Diagnostic::error(DiagnosticKind::Syntax, "Expected '}' before end of input")
                        .at(&last)
                        .hint("Every opened scope must be closed"),
                );
            }
            while let Some(scope) = self.scopes.pop() {
                if !scope.discard {
                    self.append(scope.node);
                }
            }
        }
        let scopes = std::mem::replace(
            &mut self.scopes,
            ScopeStack::new(self.modules.root(), Node::new(NodeKind::Parent, 0)),
        );
        scopes.into_root()
    }

    // ---- Diagnostics ----

    pub(crate) fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.report(diagnostic);
    }

    pub(crate) fn error(&mut self, kind: DiagnosticKind, message: impl Into<String>, at: &Token) {
        self.report(Diagnostic::error(kind, message).at(at));
    }

    pub(crate) fn error_hint(
        &mut self,
        kind: DiagnosticKind,
        message: impl Into<String>,
        at: &Token,
        hint: impl Into<String>,
    ) {
        self.report(Diagnostic::error(kind, message).at(at).hint(hint));
    }

    // ---- Statement splitting ----

    /// Tokens up to and including the next `;` or `{`, or a lone `}`.
    fn next_statement(&mut self) -> Option<Vec<Token>> {
        let mut statement: Vec<Token> = Vec::new();
        while let Some(token) = self.tokens.get(self.pos) {
            if token.is(TokenKind::RBrace) && !statement.is_empty() {
                let token = token.clone();
                self.error(DiagnosticKind::Syntax, "Expected ';' before '}'", &token);
                return Some(Vec::new());
            }
            self.pos += 1;
            let terminates = token.kind.is_terminator();
            statement.push(token.clone());
            if terminates {
                return Some(statement);
            }
        }
        if let Some(last) = statement.last().cloned() {
            self.error(DiagnosticKind::Syntax, "Expected ';' at end of input", &last);
            return Some(Vec::new());
        }
        None
    }

    /// Skip a function body during the declaration pass; the opening `{` was consumed.
    fn skip_block(&mut self, opened_at: &Token) {
        self.skipped_block = true;
        let mut depth = 1usize;
        while let Some(token) = self.tokens.get(self.pos) {
            self.pos += 1;
            match token.kind {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        return;
                    }
                }
                _ => {}
            }
        }
        self.error(DiagnosticKind::Syntax, "Expected '}' to close this block", opened_at);
    }

    fn statement(&mut self, tokens: &[Token]) {
        let Some(first) = tokens.first() else {
            return;
        };
        if self.pending_do.is_some() && self.finish_do(tokens) {
            return;
        }
        if first.is(TokenKind::RBrace) {
            self.close_scope(first);
            return;
        }
        self.check_reachable(first);

        let depth = self.scopes.depth();
        self.skipped_block = false;
        let opens_block = tokens.last().is_some_and(|t| t.is(TokenKind::LBrace));

        let node = match self.parse_modifiers(tokens) {
            Some((mods, rest)) if !rest.is_empty() => self.dispatch(rest, mods),
            Some(_) => {
                self.error(DiagnosticKind::Syntax, "Expected statement after modifiers", first);
                None
            }
            None => None,
        };

        if opens_block && !self.skipped_block && self.scopes.depth() == depth {
            let head = tokens.iter().find(|t| !t.kind.is_modifier()).unwrap_or(first);
            // A rejected enum or class body is not analyzed as statements.
            let skip = matches!(head.kind, TokenKind::Enum | TokenKind::Class)
                || (self.skimming && matches!(head.kind, TokenKind::Fn | TokenKind::New));
            if skip {
                if let Some(brace) = tokens.last() {
                    self.skip_block(brace);
                }
            } else {
                self.push_recovery_scope(head);
            }
        }
        if let Some(node) = node {
            self.append(node);
        }
    }

    fn parse_modifiers<'t>(&mut self, tokens: &'t [Token]) -> Option<(Mods, &'t [Token])> {
        let mut mods = Mods::default();
        let mut i = 0;
        while let Some(token) = tokens.get(i) {
            let Some(modifier) = Modifier::from_token(token.kind) else {
                break;
            };
            if let Err(existing) = mods.set.insert(modifier) {
                self.error_hint(
                    DiagnosticKind::Syntax,
                    format!("Conflicting modifiers, '{modifier}' cannot be used together with '{existing}'"),
                    token,
                    "Remove one of the conflicting modifiers",
                );
                return None;
            }
            mods.tokens.push(token.clone());
            i += 1;
        }
        Some((mods, &tokens[i..]))
    }

    fn dispatch(&mut self, rest: &[Token], mods: Mods) -> Option<Node> {
        let first = &rest[0];
        match first.kind {
            TokenKind::Module => self.eval_module(rest, &mods),
            TokenKind::Class => self.eval_class(rest, &mods),
            TokenKind::Enum => self.eval_enum(rest, &mods),
            TokenKind::Fn => self.eval_function(rest, &mods),
            TokenKind::New => self.eval_constructor(rest, &mods),
            TokenKind::If => self.eval_conditional(rest, &mods, ScopeKind::If),
            TokenKind::While => self.eval_conditional(rest, &mods, ScopeKind::While),
            TokenKind::Do => self.eval_do(rest, &mods),
            TokenKind::For => self.eval_for(rest, &mods),
            TokenKind::Ret => self.eval_return(rest, &mods),
            TokenKind::Break | TokenKind::Continue => self.eval_loop_exit(rest, &mods),
            TokenKind::Use => self.eval_use(rest, &mods),
            TokenKind::StdlibFinish => self.eval_stdlib_finish(rest, &mods),
            TokenKind::Question => self.eval_variable_definition(rest, &mods),
            kind if kind.is_datatype() => self.eval_variable_definition(rest, &mods),
            TokenKind::Ident => self.eval_first_identifier(rest, &mods),
            _ => {
                self.error(
                    DiagnosticKind::Syntax,
                    format!("Unexpected token '{}', expected a statement", first.lexeme),
                    first,
                );
                None
            }
        }
    }

    // ---- Scope bookkeeping ----

    /// Add a finished statement to the node of the innermost scope.
    pub(crate) fn append(&mut self, node: Node) {
        if self.skimming {
            return;
        }
        self.scopes.current_mut().node.push(node);
    }

    fn check_reachable(&mut self, first: &Token) {
        if self.skimming {
            return;
        }
        let warn = match self.scopes.current_mut().block_mut() {
            Some(block) if block.terminated && !block.warned_unreachable => {
                block.warned_unreachable = true;
                true
            }
            _ => false,
        };
        if warn {
            self.report(
                Diagnostic::warning(DiagnosticKind::Syntax, "Unreachable statement")
                    .at(first)
                    .hint("Remove the statements after 'ret', 'break' or 'continue'"),
            );
        }
    }

    /// Keep braces balanced after a statement that should have opened a scope failed.
    fn push_recovery_scope(&mut self, at: &Token) {
        let kind = match at.kind {
            TokenKind::If => ScopeKind::If,
            TokenKind::While => ScopeKind::While,
            TokenKind::Do => ScopeKind::Do,
            TokenKind::For => ScopeKind::For,
            TokenKind::Fn | TokenKind::New => ScopeKind::Function,
            _ if self.scopes.current().kind.is_block() => ScopeKind::If,
            _ => ScopeKind::Module,
        };
        let data = match kind {
            ScopeKind::Module => ScopeData::Module(self.scopes.current_module()),
            _ => ScopeData::Block(BlockScope::default()),
        };
        let mut scope = Scope::new(kind, data, Node::new(NodeKind::Parent, at.actual_line));
        scope.discard = true;
        self.scopes.push(scope);
    }

    fn close_scope(&mut self, brace: &Token) {
        let Some(scope) = self.scopes.pop() else {
            self.error_hint(DiagnosticKind::Syntax, "Unexpected '}'", brace, "Remove the extra closing brace");
            return;
        };
        tracing::trace!(kind = ?scope.kind, depth = self.scopes.depth(), "pop scope");
        if scope.discard {
            return;
        }
        match scope.data {
            ScopeData::Class(class) => {
                if self.skimming {
                    let name = class.class.name.clone();
                    self.modules.get_mut(class.module).classes.insert(name, class.into());
                }
                self.append(scope.node);
            }
            ScopeData::Enum(decl) => {
                if self.skimming {
                    let name = decl.decl.name.clone();
                    self.modules.get_mut(decl.module).enums.insert(name, decl.into());
                }
                self.append(scope.node);
            }
            ScopeData::Module(_) => self.append(scope.node),
            ScopeData::Block(block) => match scope.kind {
                ScopeKind::Function => self.close_function(block, scope.node, brace),
                ScopeKind::Do => self.pending_do = Some(scope.node),
                ScopeKind::For => {
                    self.append(scope.node);
                    if let Some(fake) = self.scopes.pop() {
                        self.append(fake.node);
                    }
                }
                _ => self.append(scope.node),
            },
        }
    }

    fn close_function(&mut self, block: BlockScope, node: Node, brace: &Token) {
        if let Some(ret) = &block.return_type {
            if !ret.is_void() && !block.reached_end {
                self.error_hint(
                    DiagnosticKind::Type,
                    format!("Missing return statement, expected a value of type '{ret}'"),
                    brace,
                    "End the function with a 'ret' statement",
                );
            }
        }
        if let Some(owner) = block.body_of {
            self.attach_body(owner, node.clone());
        }
        self.append(node);
    }

    fn attach_body(&mut self, owner: BodyOwner, body: Node) {
        let def = match &owner {
            BodyOwner::Function { owner: Owner::Module(m), name, params } => {
                self.modules.get_mut(*m).function_mut(name, params)
            }
            BodyOwner::Function { owner: Owner::Class { module, class }, name, params } => self
                .modules
                .get_mut(*module)
                .classes
                .get_mut(class)
                .and_then(|c| c.method_mut(name, params)),
            BodyOwner::Constructor { module, class } => self
                .modules
                .get_mut(*module)
                .classes
                .get_mut(class)
                .and_then(|c| c.constructor.as_mut()),
        };
        match def {
            Some(def) => def.body = FunctionBody::Ast(body),
            None => tracing::warn!(?owner, "function body has no matching declaration"),
        }
    }

    /// Complete a pending `do` block with its trailing `while (cond);`.
    /// Returns true if `tokens` was that trailer.
    fn finish_do(&mut self, tokens: &[Token]) -> bool {
        let first = &tokens[0];
        let is_trailer = first.is(TokenKind::While) && tokens.last().is_some_and(|t| t.is(TokenKind::Semi));
        if !is_trailer {
            self.error_hint(
                DiagnosticKind::Syntax,
                "Expected 'while' after 'do' block",
                first,
                "Add 'while (condition);' after the closing brace",
            );
            self.flush_pending_do();
            return false;
        }
        let condition = self.condition(&tokens[1..tokens.len() - 1], first);
        if let Some(mut node) = self.pending_do.take() {
            if let Some(condition) = condition {
                node.push(condition);
            }
            self.append(node);
        }
        true
    }

    fn flush_pending_do(&mut self) {
        if let Some(node) = self.pending_do.take() {
            self.append(node);
        }
    }
}
