//! Statement productions. Each `eval_*` receives the statement without its leading
//! modifiers and returns the node to append to the current scope, if any. Productions
//! that open a block push a scope instead and return `None`.

use super::ast::{BinaryOp, Node, NodeKind};
use super::{Analyzer, Mods};
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::lang::{
    Class, Enum, FunctionBody, FunctionDefinition, FunctionParameter, Modifier, Modifiers, Origin, Owner,
    Variable,
};
use crate::lexer::token::{Token, TokenKind};
use crate::native;
use crate::typeck::scope::{BlockScope, BodyOwner, ClassScope, EnumScope, Scope, ScopeData, ScopeKind};
use crate::typeck::types::{Datatype, type_list};

/// A parsed function or constructor header.
struct Header {
    name: Token,
    return_type: Datatype,
    /// Token after `::`, if the header names a return type.
    return_token: Option<Token>,
    parameters: Vec<FunctionParameter>,
    parameter_nodes: Vec<Node>,
    /// Host class of a native binding, with its quotes removed.
    host_class: Option<Token>,
    opens_body: bool,
}

/// Where a variable definition puts the variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    Global,
    Field,
    Local,
}

/// Split on commas outside parentheses.
fn split_top_level(tokens: &[Token], separator: TokenKind) -> Vec<&[Token]> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, tok) in tokens.iter().enumerate() {
        match tok.kind {
            TokenKind::LParen => depth += 1,
            TokenKind::RParen => depth = depth.saturating_sub(1),
            kind if kind == separator && depth == 0 => {
                parts.push(&tokens[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&tokens[start..]);
    parts
}

/// Index of the `)` matching the `(` at `open`.
fn matching_paren(tokens: &[Token], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, tok) in tokens.iter().enumerate().skip(open) {
        match tok.kind {
            TokenKind::LParen => depth += 1,
            TokenKind::RParen => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn type_node(token: Option<&Token>, ty: &Datatype, line: usize) -> Node {
    let node = match token {
        Some(tok) => Node::leaf(NodeKind::Type, tok),
        None => Node::new(NodeKind::Type, line),
    };
    node.typed(ty.clone())
}

impl<'h> Analyzer<'h> {
    // ---- Shared checks ----

    fn reject_modifiers(&mut self, mods: &Mods) -> bool {
        match mods.tokens.first() {
            Some(first) => {
                self.error_hint(
                    DiagnosticKind::Syntax,
                    "Unexpected modifiers",
                    first,
                    "This statement does not take modifiers",
                );
                false
            }
            None => true,
        }
    }

    /// The current position is inside a function body.
    fn expect_block(&mut self, at: &Token) -> bool {
        if self.scopes.current().kind.is_block() {
            return true;
        }
        self.error(DiagnosticKind::Scope, "Expected statement to be inside of a function", at);
        false
    }

    fn expect_end(&mut self, rest: &[Token], end: usize, what: &str) -> bool {
        match rest.get(end) {
            Some(tok) if end + 1 == rest.len() && tok.is(TokenKind::Semi) => true,
            Some(tok) => {
                self.error(
                    DiagnosticKind::Syntax,
                    format!("Unexpected token '{}', expected ';' after {what}", tok.lexeme),
                    tok,
                );
                false
            }
            None => {
                let last = &rest[rest.len() - 1];
                self.error(DiagnosticKind::Syntax, format!("Expected ';' after {what}"), last);
                false
            }
        }
    }

    /// A declarable name: a plain identifier without module separators.
    fn declared_name<'t>(&mut self, tok: Option<&'t Token>, after: &Token, what: &str) -> Option<&'t Token> {
        let Some(tok) = tok.filter(|t| t.is(TokenKind::Ident)) else {
            let found = tok.map(|t| t.lexeme.as_str()).unwrap_or("end of statement");
            self.error(
                DiagnosticKind::Syntax,
                format!("Expected {what} name, but got '{found}'"),
                tok.unwrap_or(after),
            );
            return None;
        };
        if tok.lexeme.contains('.') {
            self.error_hint(
                DiagnosticKind::Syntax,
                format!("Cannot use restricted name '{}'", tok.lexeme),
                tok,
                "Names of declarations cannot contain '.'",
            );
            return None;
        }
        Some(tok)
    }

    fn reject_mutability(&mut self, mods: &Mods, what: &str) -> bool {
        let Some(m) = mods.set.first_mutability() else {
            return true;
        };
        let at = mods.tokens.iter().find(|t| Modifier::from_token(t.kind) == Some(m));
        if let Some(at) = at {
            self.error(DiagnosticKind::Syntax, format!("Cannot declare {what} as const or mut"), at);
        }
        false
    }

    fn origin(&self, tok: &Token) -> Origin {
        Origin { module: self.scopes.current_module(), file_id: tok.span.file_id }
    }

    fn push_scope(&mut self, kind: ScopeKind, data: ScopeData, node: Node) {
        tracing::trace!(?kind, depth = self.scopes.depth(), "push scope");
        self.scopes.push(Scope::new(kind, data, node));
    }

    // ---- Modules, classes, enums ----

    pub(super) fn eval_module(&mut self, rest: &[Token], mods: &Mods) -> Option<Node> {
        let keyword = &rest[0];
        if !self.reject_modifiers(mods) {
            return None;
        }
        if !matches!(self.scopes.current().kind, ScopeKind::Parent | ScopeKind::Module) {
            self.error(
                DiagnosticKind::Scope,
                "Modules can only be defined at root level or inside of other modules",
                keyword,
            );
            return None;
        }
        let name = self.declared_name(rest.get(1), keyword, "module")?;
        if rest.len() != 3 || !rest[2].is(TokenKind::LBrace) {
            self.error(DiagnosticKind::Syntax, "Expected '{' after module name", rest.get(2).unwrap_or(name));
            return None;
        }

        let parent = self.scopes.current_module();
        let id = if self.skimming {
            self.modules.add_child(parent, &name.lexeme)
        } else {
            match self.modules.child(parent, &name.lexeme) {
                Some(id) => id,
                None => {
                    self.error(DiagnosticKind::Internal, "Unexpected parsing error, module was not declared", name);
                    return None;
                }
            }
        };
        let node = Node::new(NodeKind::CreateModule, keyword.actual_line).with_child(Node::leaf(NodeKind::Identifier, name));
        self.push_scope(ScopeKind::Module, ScopeData::Module(id), node);
        None
    }

    /// Shared placement rule for classes and enums: inside a module, or at root level in the stdlib.
    fn type_declaration_allowed(&mut self, keyword: &Token, plural: &str, title: &str) -> bool {
        match self.scopes.current().kind {
            ScopeKind::Module => true,
            ScopeKind::Parent if self.stdlib => true,
            ScopeKind::Parent => {
                self.error(DiagnosticKind::Scope, format!("Cannot define {plural} at root level"), keyword);
                false
            }
            _ => {
                self.error(DiagnosticKind::Scope, format!("{title} can only be defined inside of modules"), keyword);
                false
            }
        }
    }

    fn only_visibility(&mut self, mods: &Mods, what: &str) -> bool {
        if !self.reject_mutability(mods, what) {
            return false;
        }
        let other = mods
            .tokens
            .iter()
            .find(|t| Modifier::from_token(t.kind).is_some_and(|m| !m.is_visibility()));
        if let Some(tok) = other {
            self.error(DiagnosticKind::Syntax, format!("Cannot use modifier '{}' on {what}", tok.lexeme), tok);
            return false;
        }
        true
    }

    pub(super) fn eval_class(&mut self, rest: &[Token], mods: &Mods) -> Option<Node> {
        let keyword = &rest[0];
        if !self.only_visibility(mods, "classes") || !self.type_declaration_allowed(keyword, "classes", "Classes") {
            return None;
        }
        let name = self.declared_name(rest.get(1), keyword, "class")?;
        if rest.len() != 3 || !rest[2].is(TokenKind::LBrace) {
            self.error(DiagnosticKind::Syntax, "Expected '{' after class name", rest.get(2).unwrap_or(name));
            return None;
        }

        let module = self.scopes.current_module();
        let class = if self.skimming {
            if self.modules.get(module).name_taken(&name.lexeme) {
                self.error(DiagnosticKind::Resolution, format!("Redefinition of '{}'", name.lexeme), name);
                return None;
            }
            let class = Class::new(&name.lexeme, mods.set.clone(), self.origin(name));
            // Registered now so members can refer to the class; replaced when the body closes.
            self.modules.get_mut(module).classes.insert(name.lexeme.clone(), class.clone());
            class
        } else {
            self.modules.get(module).classes.get(&name.lexeme).cloned()?
        };

        let node = Node::new(NodeKind::CreateClass, keyword.actual_line)
            .with_child(Node::leaf(NodeKind::Identifier, name))
            .with_child(mods.node(keyword.actual_line));
        self.push_scope(ScopeKind::Class, ScopeData::Class(ClassScope { class, module }), node);
        None
    }

    pub(super) fn eval_enum(&mut self, rest: &[Token], mods: &Mods) -> Option<Node> {
        let keyword = &rest[0];
        if !self.only_visibility(mods, "enums") || !self.type_declaration_allowed(keyword, "enums", "Enums") {
            return None;
        }
        let name = self.declared_name(rest.get(1), keyword, "enum")?;
        if rest.len() != 3 || !rest[2].is(TokenKind::LBrace) {
            self.error(DiagnosticKind::Syntax, "Expected '{' after enum name", rest.get(2).unwrap_or(name));
            return None;
        }

        let module = self.scopes.current_module();
        let decl = if self.skimming {
            if self.modules.get(module).name_taken(&name.lexeme) {
                self.error(DiagnosticKind::Resolution, format!("Redefinition of '{}'", name.lexeme), name);
                return None;
            }
            let decl = Enum {
                name: name.lexeme.clone(),
                members: Vec::new(),
                modifiers: mods.set.clone(),
                origin: self.origin(name),
            };
            self.modules.get_mut(module).enums.insert(name.lexeme.clone(), decl.clone());
            decl
        } else {
            self.modules.get(module).enums.get(&name.lexeme).cloned()?
        };

        let node = Node::new(NodeKind::CreateEnum, keyword.actual_line)
            .with_child(Node::leaf(NodeKind::Identifier, name))
            .with_child(mods.node(keyword.actual_line));
        self.push_scope(ScopeKind::Enum, ScopeData::Enum(EnumScope { decl, module }), node);
        None
    }

    /// `A, B, C;` inside an enum body.
    fn eval_enum_members(&mut self, rest: &[Token], mods: &Mods) -> Option<Node> {
        if !self.reject_modifiers(mods) {
            return None;
        }
        let last = &rest[rest.len() - 1];
        if !last.is(TokenKind::Semi) {
            self.error(DiagnosticKind::Syntax, "Expected ';' after enum members", last);
            return None;
        }

        let mut names: Vec<&Token> = Vec::new();
        for part in split_top_level(&rest[..rest.len() - 1], TokenKind::Comma) {
            let [tok] = part else {
                let at = part.get(1).or(part.first()).unwrap_or(last);
                self.error(DiagnosticKind::Syntax, "Expected a single identifier for each enum member", at);
                return None;
            };
            names.push(self.declared_name(Some(tok), tok, "enum member")?);
        }

        if self.skimming {
            let ScopeData::Enum(scope) = &mut self.scopes.current_mut().data else {
                return None;
            };
            if !scope.decl.members.is_empty() {
                let first = rest[0].clone();
                self.error_hint(
                    DiagnosticKind::Syntax,
                    "Redefinition of enum members",
                    &first,
                    "List every member in a single statement",
                );
                return None;
            }
            let mut duplicate = None;
            for tok in &names {
                if !scope.add_member(&tok.lexeme) {
                    duplicate = Some(*tok);
                    break;
                }
            }
            if let Some(tok) = duplicate {
                self.error(DiagnosticKind::Syntax, format!("Duplicate enum member '{}'", tok.lexeme), tok);
                return None;
            }
        }

        Some(
            Node::new(NodeKind::EnumValues, rest[0].actual_line)
                .with_children(names.into_iter().map(|t| Node::leaf(NodeKind::Identifier, t))),
        )
    }

    // ---- Functions ----

    /// Parameters between the parentheses of a header.
    fn parse_parameters(&mut self, tokens: &[Token], open: &Token) -> Option<(Vec<FunctionParameter>, Vec<Node>)> {
        let mut params: Vec<FunctionParameter> = Vec::new();
        let mut nodes = Vec::new();
        if tokens.is_empty() {
            return Some((params, nodes));
        }

        for part in split_top_level(tokens, TokenKind::Comma) {
            let Some(first) = part.first() else {
                self.error(DiagnosticKind::Syntax, "Expected function argument", open);
                return None;
            };

            let mut modifiers = Modifiers::new();
            let mut modifier_tokens = Vec::new();
            let mut i = 0;
            while let Some(m) = part.get(i).and_then(|t| Modifier::from_token(t.kind)) {
                let tok = &part[i];
                if m.is_visibility() {
                    self.error(
                        DiagnosticKind::Syntax,
                        format!("Cannot use visibility modifier '{m}' on function arguments"),
                        tok,
                    );
                    return None;
                }
                if let Err(existing) = modifiers.insert(m) {
                    self.error(
                        DiagnosticKind::Syntax,
                        format!("Conflicting modifiers, '{m}' cannot be used together with '{existing}'"),
                        tok,
                    );
                    return None;
                }
                modifier_tokens.push(tok.clone());
                i += 1;
            }

            let Some(type_tok) = part.get(i) else {
                self.error(DiagnosticKind::Syntax, "Expected datatype of function argument", first);
                return None;
            };
            if type_tok.is(TokenKind::Question) {
                self.error(
                    DiagnosticKind::Type,
                    "Unexpected token '?', function arguments need a definite datatype",
                    type_tok,
                );
                return None;
            }
            if Modifier::from_token(type_tok.kind).is_none()
                && !type_tok.kind.is_datatype()
                && !type_tok.is(TokenKind::Ident)
            {
                self.error(
                    DiagnosticKind::Syntax,
                    format!("Expected datatype of function argument, but got '{}'", type_tok.lexeme),
                    type_tok,
                );
                return None;
            }
            let ty = self.resolve_datatype(type_tok, modifiers.is_nullable())?;
            let name = self.declared_name(part.get(i + 1), type_tok, "function argument")?;
            if let Some(extra) = part.get(i + 2) {
                self.error(
                    DiagnosticKind::Syntax,
                    format!("Unexpected token '{}' in function arguments", extra.lexeme),
                    extra,
                );
                return None;
            }
            if params.iter().any(|p| p.name == name.lexeme) {
                self.error(
                    DiagnosticKind::Resolution,
                    format!("Redefinition of function argument '{}'", name.lexeme),
                    name,
                );
                return None;
            }

            let mods = Mods { set: modifiers.clone(), tokens: modifier_tokens };
            nodes.push(
                Node::new(NodeKind::Parameter, name.actual_line)
                    .with_child(mods.node(name.actual_line))
                    .with_child(Node::leaf(NodeKind::Identifier, name))
                    .with_child(type_node(Some(type_tok), &ty, name.actual_line)),
            );
            params.push(FunctionParameter { ty, name: name.lexeme.clone(), modifiers });
        }
        Some((params, nodes))
    }

    /// `( params )` starting at `rest[at]`, if present. Returns the index after the `)`.
    fn header_parameters(
        &mut self,
        rest: &[Token],
        at: usize,
        header: &mut Header,
    ) -> Option<usize> {
        let Some(open) = rest.get(at).filter(|t| t.is(TokenKind::LParen)) else {
            return Some(at);
        };
        let Some(close) = matching_paren(rest, at) else {
            self.error(DiagnosticKind::Syntax, "Expected ')' to close function arguments", open);
            return None;
        };
        let (params, nodes) = self.parse_parameters(&rest[at + 1..close], open)?;
        header.parameters = params;
        header.parameter_nodes = nodes;
        Some(close + 1)
    }

    /// Tail of a header: `{`, or `-> "host.Class" ;` for natives.
    fn header_tail(&mut self, rest: &[Token], at: usize, header: &mut Header) -> Option<()> {
        let last = &rest[rest.len() - 1];
        match rest.get(at).map(|t| t.kind) {
            Some(TokenKind::LBrace) if at + 1 == rest.len() => {
                header.opens_body = true;
                Some(())
            }
            Some(TokenKind::Arrow) => {
                let Some(class) = rest.get(at + 1).filter(|t| t.is(TokenKind::StringLit)) else {
                    self.error(DiagnosticKind::Syntax, "Expected host class name after '->'", &rest[at]);
                    return None;
                };
                if !(at + 3 == rest.len() && last.is(TokenKind::Semi)) {
                    self.error(DiagnosticKind::Syntax, "Expected ';' after host class name", class);
                    return None;
                }
                let unquoted = class.lexeme.trim_matches('"').to_string();
                header.host_class = Some(Token::synthetic(TokenKind::StringLit, unquoted, class));
                Some(())
            }
            Some(_) => {
                let tok = &rest[at];
                self.error(
                    DiagnosticKind::Syntax,
                    format!("Unexpected token '{}' in function header", tok.lexeme),
                    tok,
                );
                None
            }
            None => {
                self.error(DiagnosticKind::Syntax, "Expected '{' after function header", last);
                None
            }
        }
    }

    fn parse_function_header(&mut self, rest: &[Token], mods: &Mods) -> Option<Header> {
        let keyword = &rest[0];
        let name = self.declared_name(rest.get(1), keyword, "function")?.clone();
        let mut header = Header {
            name,
            return_type: Datatype::VOID,
            return_token: None,
            parameters: Vec::new(),
            parameter_nodes: Vec::new(),
            host_class: None,
            opens_body: false,
        };

        let mut at = 2;
        match rest.get(at).map(|t| t.kind) {
            Some(TokenKind::Tilde) => at += 1,
            Some(TokenKind::DoubleColon) => {
                let Some(ty_tok) = rest.get(at + 1) else {
                    self.error(DiagnosticKind::Syntax, "Expected return type after '::'", &rest[at]);
                    return None;
                };
                header.return_type = if ty_tok.is(TokenKind::VoidType) {
                    Datatype::VOID
                } else {
                    self.resolve_datatype(ty_tok, mods.set.is_nullable())?
                };
                header.return_token = Some(ty_tok.clone());
                at += 2;
            }
            Some(TokenKind::LParen | TokenKind::LBrace | TokenKind::Arrow) => {}
            _ => {
                let tok = rest.get(at).unwrap_or(&rest[rest.len() - 1]);
                self.error(
                    DiagnosticKind::Syntax,
                    format!("Expected '(', '::', '~' or '{{' after function name, but got '{}'", tok.lexeme),
                    tok,
                );
                return None;
            }
        }

        let at = self.header_parameters(rest, at, &mut header)?;
        self.header_tail(rest, at, &mut header)?;

        if mods.set.is_native() && header.opens_body {
            self.error_hint(
                DiagnosticKind::Native,
                format!("Native function '{}' cannot have a body", header.name.lexeme),
                &header.name,
                "Replace the body with -> \"host.Class\";",
            );
            return None;
        }
        if !mods.set.is_native() && header.host_class.is_some() {
            self.error_hint(
                DiagnosticKind::Native,
                format!("Function '{}' is bound to a host class but not declared 'nat'", header.name.lexeme),
                &header.name,
                "Add the 'nat' modifier",
            );
            return None;
        }
        Some(header)
    }

    fn function_allowed(&mut self, keyword: &Token) -> bool {
        let message = match self.scopes.current().kind {
            ScopeKind::Module | ScopeKind::Class => return true,
            ScopeKind::Parent if self.stdlib => return true,
            ScopeKind::Parent => "Cannot define functions at root level",
            ScopeKind::Enum => "Cannot define functions inside of an enum",
            _ => "Cannot define functions inside of other functions",
        };
        self.error(DiagnosticKind::Scope, message, keyword);
        false
    }

    fn current_owner(&self) -> Owner {
        match self.scopes.current().data {
            ScopeData::Class(ref c) => Owner::Class { module: c.module, class: c.class.name.clone() },
            _ => Owner::Module(self.scopes.current_module()),
        }
    }

    fn register_function(&mut self, def: FunctionDefinition, at: &Token) -> bool {
        let result = match &def.owner {
            Owner::Class { .. } => match self.scopes.class_mut() {
                Some(scope) => scope.class.add_method(def),
                None => Err(def),
            },
            Owner::Module(m) => self.modules.get_mut(*m).add_function(def),
        };
        match result {
            Ok(()) => true,
            Err(def) => {
                self.report(
                    Diagnostic::error(DiagnosticKind::Resolution, format!("Redefinition of function '{}'", def.name))
                        .at(at)
                        .hint(format!("An overload with argument types ({}) already exists", type_list(&def.param_types()))),
                );
                false
            }
        }
    }

    pub(super) fn eval_function(&mut self, rest: &[Token], mods: &Mods) -> Option<Node> {
        let keyword = &rest[0];
        if !self.reject_mutability(mods, "functions") || !self.function_allowed(keyword) {
            return None;
        }
        let header = self.parse_function_header(rest, mods)?;
        let owner = self.current_owner();
        let line = keyword.actual_line;
        let params_node = Node::new(NodeKind::Parameters, line).with_children(header.parameter_nodes.clone());

        if let Some(host_class) = &header.host_class {
            if self.skimming {
                let bound = native::bind(
                    self.host,
                    &host_class.lexeme,
                    &header.name.lexeme,
                    &header.parameters,
                    &header.return_type,
                );
                let binding = match bound {
                    Ok(binding) => binding,
                    Err(err) => {
                        let mut diagnostic = Diagnostic::error(DiagnosticKind::Native, err.to_string()).at(&header.name);
                        for hint in err.hints() {
                            diagnostic = diagnostic.hint(hint);
                        }
                        self.report(diagnostic);
                        return None;
                    }
                };
                tracing::debug!(
                    function = %header.name.lexeme,
                    class = %host_class.lexeme,
                    "bound native function"
                );
                let def = FunctionDefinition {
                    name: header.name.lexeme.clone(),
                    return_type: header.return_type.clone(),
                    parameters: header.parameters.clone(),
                    modifiers: mods.set.clone(),
                    owner,
                    file_id: header.name.span.file_id,
                    line: header.name.actual_line,
                    body: FunctionBody::Native(binding),
                };
                self.register_function(def, &header.name);
                return None;
            }
            return Some(
                Node::new(NodeKind::NativeFunctionDefinition, line)
                    .with_child(Node::leaf(NodeKind::Identifier, &header.name))
                    .with_child(type_node(header.return_token.as_ref(), &header.return_type, line))
                    .with_child(mods.node(line))
                    .with_child(params_node)
                    .with_child(Node::leaf(NodeKind::NativeHostClass, host_class)),
            );
        }

        if self.skimming {
            let def = FunctionDefinition {
                name: header.name.lexeme.clone(),
                return_type: header.return_type.clone(),
                parameters: header.parameters.clone(),
                modifiers: mods.set.clone(),
                owner,
                file_id: header.name.span.file_id,
                line: header.name.actual_line,
                body: FunctionBody::Pending,
            };
            self.register_function(def, &header.name);
            return None;
        }

        let body_of = BodyOwner::Function {
            owner,
            name: header.name.lexeme.clone(),
            params: header.parameters.iter().map(|p| p.ty.clone()).collect(),
        };
        let node = Node::new(NodeKind::FunctionDefinition, line)
            .with_child(Node::leaf(NodeKind::Identifier, &header.name))
            .with_child(type_node(header.return_token.as_ref(), &header.return_type, line))
            .with_child(mods.node(line))
            .with_child(params_node);
        self.open_body(header.return_type.clone(), body_of, &header.parameters, &header.name, node);
        None
    }

    /// Push the function scope of a body and declare its parameters as locals.
    fn open_body(
        &mut self,
        return_type: Datatype,
        body_of: BodyOwner,
        parameters: &[FunctionParameter],
        at: &Token,
        node: Node,
    ) {
        self.push_scope(ScopeKind::Function, ScopeData::Block(BlockScope::body(return_type, body_of)), node);
        for p in parameters {
            let var = Variable {
                name: p.name.clone(),
                ty: p.ty.clone(),
                modifiers: p.modifiers.clone(),
                origin: self.origin(at),
                initialized: true,
                value: None,
            };
            if let Err(var) = self.scopes.declare_local(var) {
                tracing::warn!(name = %var.name, "parameter shadows an existing local");
            }
        }
    }

    pub(super) fn eval_constructor(&mut self, rest: &[Token], mods: &Mods) -> Option<Node> {
        let keyword = &rest[0];
        let Some(class) = self.scopes.class().filter(|_| self.scopes.current().kind == ScopeKind::Class) else {
            self.error(DiagnosticKind::Scope, "Expected constructor to be inside of a class", keyword);
            return None;
        };
        let (module, class_name) = (class.module, class.class.name.clone());
        if !self.reject_mutability(mods, "constructors") {
            return None;
        }

        let mut header = Header {
            name: keyword.clone(),
            return_type: Datatype::VOID,
            return_token: None,
            parameters: Vec::new(),
            parameter_nodes: Vec::new(),
            host_class: None,
            opens_body: false,
        };
        let at = self.header_parameters(rest, 1, &mut header)?;
        if !(rest.get(at).is_some_and(|t| t.is(TokenKind::LBrace)) && at + 1 == rest.len()) {
            let tok = rest.get(at).unwrap_or(&rest[rest.len() - 1]);
            self.error(DiagnosticKind::Syntax, "Expected '{' after constructor arguments", tok);
            return None;
        }

        let line = keyword.actual_line;
        if self.skimming {
            let def = FunctionDefinition {
                name: "new".to_string(),
                return_type: Datatype::VOID,
                parameters: header.parameters,
                modifiers: mods.set.clone(),
                owner: Owner::Class { module, class: class_name },
                file_id: keyword.span.file_id,
                line,
                body: FunctionBody::Pending,
            };
            let scope = self.scopes.class_mut()?;
            if scope.class.constructor.is_some() {
                self.error_hint(
                    DiagnosticKind::Resolution,
                    "Redefinition of constructor",
                    keyword,
                    "A class can only have one constructor",
                );
                return None;
            }
            scope.class.constructor = Some(def);
            return None;
        }

        let node = Node::new(NodeKind::CreateConstructor, line)
            .with_child(mods.node(line))
            .with_child(Node::new(NodeKind::Parameters, line).with_children(header.parameter_nodes.clone()));
        let body_of = BodyOwner::Constructor { module, class: class_name };
        self.open_body(Datatype::VOID, body_of, &header.parameters, keyword, node);
        None
    }

    // ---- Control flow ----

    /// `( expr )` following `keyword`, typed as a non-null bool.
    pub(super) fn condition(&mut self, tokens: &[Token], keyword: &Token) -> Option<Node> {
        let wrapped = tokens.len() >= 2
            && tokens[0].is(TokenKind::LParen)
            && matching_paren(tokens, 0) == Some(tokens.len() - 1);
        if !wrapped {
            let at = tokens.first().unwrap_or(keyword);
            self.error(
                DiagnosticKind::Syntax,
                format!("Expected condition in parentheses after '{}'", keyword.lexeme),
                at,
            );
            return None;
        }
        self.condition_expr(&tokens[1..tokens.len() - 1], &tokens[0])
    }

    fn condition_expr(&mut self, tokens: &[Token], at: &Token) -> Option<Node> {
        let expr = self.expression(tokens, at)?;
        if !expr.ty.is_condition() {
            self.error_hint(
                DiagnosticKind::Type,
                format!("Expected boolean condition, but got '{}'", expr.ty),
                tokens.first().unwrap_or(at),
                "Conditions must be of type 'nonnull bool'",
            );
            return None;
        }
        Some(Node::new(NodeKind::Condition, at.actual_line).with_child(expr.node))
    }

    fn expect_opening_brace(&mut self, rest: &[Token], what: &str) -> bool {
        let last = &rest[rest.len() - 1];
        if last.is(TokenKind::LBrace) {
            return true;
        }
        self.error(DiagnosticKind::Syntax, format!("Expected '{{' after {what}"), last);
        false
    }

    pub(super) fn eval_conditional(&mut self, rest: &[Token], mods: &Mods, kind: ScopeKind) -> Option<Node> {
        let keyword = &rest[0];
        if !self.reject_modifiers(mods) || !self.expect_block(keyword) {
            return None;
        }
        if !self.expect_opening_brace(rest, &format!("'{}' condition", keyword.lexeme)) {
            return None;
        }
        let condition = self.condition(&rest[1..rest.len() - 1], keyword)?;
        let node_kind = match kind {
            ScopeKind::While => NodeKind::WhileStatement,
            _ => NodeKind::IfStatement,
        };
        let node = Node::new(node_kind, keyword.actual_line).with_child(condition);
        self.push_scope(kind, ScopeData::Block(BlockScope::default()), node);
        None
    }

    pub(super) fn eval_do(&mut self, rest: &[Token], mods: &Mods) -> Option<Node> {
        let keyword = &rest[0];
        if !self.reject_modifiers(mods) || !self.expect_block(keyword) {
            return None;
        }
        if rest.len() != 2 || !rest[1].is(TokenKind::LBrace) {
            self.error(DiagnosticKind::Syntax, "Expected '{' after 'do'", rest.get(1).unwrap_or(keyword));
            return None;
        }
        let node = Node::new(NodeKind::DoStatement, keyword.actual_line);
        self.push_scope(ScopeKind::Do, ScopeData::Block(BlockScope::default()), node);
        None
    }

    pub(super) fn eval_for(&mut self, rest: &[Token], mods: &Mods) -> Option<Node> {
        let keyword = &rest[0];
        if !self.reject_modifiers(mods) || !self.expect_block(keyword) {
            return None;
        }
        if !self.expect_opening_brace(rest, "'for' header") {
            return None;
        }
        let header = &rest[1..rest.len() - 1];
        let wrapped = header.len() >= 2
            && header[0].is(TokenKind::LParen)
            && matching_paren(header, 0) == Some(header.len() - 1);
        if !wrapped {
            self.error(DiagnosticKind::Syntax, "Expected '(' after 'for'", header.first().unwrap_or(keyword));
            return None;
        }
        let inner = &header[1..header.len() - 1];
        let parts = split_top_level(inner, TokenKind::Comma);

        let (init, condition, step, implicit_step) = match parts.as_slice() {
            [init, condition, step] => (*init, condition.to_vec(), step.to_vec(), false),
            [init, range] => {
                let (condition, step) = self.desugar_range(range, keyword)?;
                (*init, condition, step, true)
            }
            _ => {
                self.error_hint(
                    DiagnosticKind::Syntax,
                    "Malformed 'for' header",
                    keyword,
                    "Use 'for (init, condition, step)' or 'for (init, var -> end)'",
                );
                return None;
            }
        };

        let line = keyword.actual_line;
        self.push_scope(ScopeKind::Fake, ScopeData::Block(BlockScope::default()), Node::new(NodeKind::ForFakeScope, line));
        let parsed = self.for_parts(init, &condition, &step, implicit_step, keyword);
        let Some((init, condition, step)) = parsed else {
            self.scopes.pop();
            return None;
        };
        self.append(init);
        self.append(condition);
        self.append(Node::new(NodeKind::ForInstruct, line).with_child(step));
        self.push_scope(ScopeKind::For, ScopeData::Block(BlockScope::default()), Node::new(NodeKind::ForStatement, line));
        None
    }

    /// `var -> end` becomes `var < (end)` and `var ++`.
    fn desugar_range(&mut self, range: &[Token], keyword: &Token) -> Option<(Vec<Token>, Vec<Token>)> {
        let arrow = range.iter().position(|t| t.is(TokenKind::Arrow));
        let (Some(arrow), Some(var)) = (arrow, range.first()) else {
            self.error_hint(
                DiagnosticKind::Syntax,
                "Malformed 'for' header",
                range.first().unwrap_or(keyword),
                "Use 'for (init, condition, step)' or 'for (init, var -> end)'",
            );
            return None;
        };
        if arrow != 1 || !var.is(TokenKind::Ident) {
            self.error(DiagnosticKind::Syntax, "Expected loop variable before '->'", var);
            return None;
        }
        let arrow_tok = &range[arrow];
        let mut condition = vec![
            var.clone(),
            Token::synthetic(TokenKind::Lt, "<", arrow_tok),
            Token::synthetic(TokenKind::LParen, "(", arrow_tok),
        ];
        condition.extend(range[arrow + 1..].iter().cloned());
        condition.push(Token::synthetic(TokenKind::RParen, ")", arrow_tok));
        let step = vec![var.clone(), Token::synthetic(TokenKind::PlusPlus, "++", arrow_tok)];
        Some((condition, step))
    }

    fn for_parts(
        &mut self,
        init: &[Token],
        condition: &[Token],
        step: &[Token],
        implicit_step: bool,
        keyword: &Token,
    ) -> Option<(Node, Node, Node)> {
        let (mods, init_rest) = self.parse_modifiers(init)?;
        let Some(first) = init_rest.first() else {
            self.error(DiagnosticKind::Syntax, "Expected variable definition", keyword);
            return None;
        };
        let is_definition = first.is(TokenKind::Question)
            || first.kind.is_datatype()
            || (first.is(TokenKind::Ident) && init_rest.get(1).is_some_and(|t| t.is(TokenKind::Ident)));
        if !is_definition {
            self.error(DiagnosticKind::Syntax, "Expected variable definition", first);
            return None;
        }
        let init = self.define_variable(init_rest, &mods, keyword)?;
        if init.kind != NodeKind::VarDefAndSetValue {
            self.error_hint(
                DiagnosticKind::Syntax,
                "Expected variable definition",
                first,
                "Give the loop variable an initial value",
            );
            return None;
        }
        let condition = self.condition_expr(condition, keyword)?;
        let step = self.for_instruct(step, implicit_step, keyword)?;
        Some((init, condition, step))
    }

    /// Third part of a `for` header: an assignment or a function call.
    fn for_instruct(&mut self, step: &[Token], implicit_step: bool, keyword: &Token) -> Option<Node> {
        let at = step.first().unwrap_or(keyword);
        if step.get(1).is_some_and(|t| t.kind.is_assign_op()) {
            return self.assignment(step, !implicit_step, keyword);
        }
        if !step.is_empty() {
            let expr = self.expression(step, at)?;
            if expr.node.kind == NodeKind::FunctionCall {
                return Some(expr.node);
            }
        }
        self.error(DiagnosticKind::Syntax, "Expected variable set or function call as for loop instruct", at);
        None
    }

    pub(super) fn eval_return(&mut self, rest: &[Token], mods: &Mods) -> Option<Node> {
        let keyword = &rest[0];
        if !self.reject_modifiers(mods) || !self.expect_block(keyword) {
            return None;
        }
        let last = &rest[rest.len() - 1];
        if !last.is(TokenKind::Semi) {
            self.error(DiagnosticKind::Syntax, "Expected ';' after return value", last);
            return None;
        }
        let expected = self.scopes.return_type().cloned();
        let value = &rest[1..rest.len() - 1];

        let mut node = Node::new(NodeKind::ReturnValue, keyword.actual_line);
        let found = if value.is_empty() {
            Datatype::VOID
        } else {
            let expr = self.expression(value, keyword)?;
            node.push(expr.node);
            expr.ty
        };
        if let Some(expected) = &expected {
            let ok = if expected.is_void() || found.is_void() {
                expected.is_void() && found.is_void()
            } else {
                found.fits(expected)
            };
            if !ok {
                self.error(
                    DiagnosticKind::Type,
                    format!("Expected datatype of return value to be '{expected}', but got '{found}' instead"),
                    value.first().unwrap_or(keyword),
                );
                return None;
            }
        }

        if let Some(block) = self.scopes.current_mut().block_mut() {
            block.reached_end = true;
            block.terminated = true;
        }
        Some(node)
    }

    pub(super) fn eval_loop_exit(&mut self, rest: &[Token], mods: &Mods) -> Option<Node> {
        let keyword = &rest[0];
        if !self.reject_modifiers(mods) || !self.expect_block(keyword) {
            return None;
        }
        if !self.expect_end(rest, 1, &format!("'{}'", keyword.lexeme)) {
            return None;
        }
        if !self.scopes.in_loop() {
            self.error_hint(
                DiagnosticKind::Scope,
                "Expected statement to be inside of a loop",
                keyword,
                "Delete unavailable statement",
            );
            return None;
        }
        if let Some(block) = self.scopes.current_mut().block_mut() {
            block.terminated = true;
        }
        let kind = if keyword.is(TokenKind::Break) { NodeKind::BreakStatement } else { NodeKind::ContinueStatement };
        Some(Node::leaf(kind, keyword))
    }

    pub(super) fn eval_use(&mut self, rest: &[Token], mods: &Mods) -> Option<Node> {
        let keyword = &rest[0];
        if !self.reject_modifiers(mods) || !self.expect_block(keyword) {
            return None;
        }
        let Some(path) = rest.get(1).filter(|t| t.is(TokenKind::Ident)) else {
            self.error(DiagnosticKind::Syntax, "Expected module name after 'use'", rest.get(1).unwrap_or(keyword));
            return None;
        };
        if !self.expect_end(rest, 2, "module name") {
            return None;
        }
        let Some(module) = self.resolve_module(&path.lexeme) else {
            self.error(DiagnosticKind::Resolution, format!("Cannot find module '{}'", path.lexeme), path);
            return None;
        };
        self.scopes.add_using(module);
        let qualified = Token::synthetic(TokenKind::Ident, self.modules.path(module), path);
        Some(Node::leaf(NodeKind::UseStatement, &qualified))
    }

    pub(super) fn eval_stdlib_finish(&mut self, rest: &[Token], mods: &Mods) -> Option<Node> {
        let sentinel = &rest[0];
        if !self.reject_modifiers(mods) || !self.expect_end(rest, 1, "standard library end marker") {
            return None;
        }
        if !self.stdlib || self.scopes.depth() != 1 {
            self.error(
                DiagnosticKind::Internal,
                "Unexpected parsing error, standard library ended outside of the root scope",
                sentinel,
            );
            return None;
        }
        self.stdlib = false;
        tracing::trace!("leaving standard library");
        Some(Node::leaf(NodeKind::StdlibFinish, sentinel))
    }

    // ---- Variables ----

    pub(super) fn eval_variable_definition(&mut self, rest: &[Token], mods: &Mods) -> Option<Node> {
        let last = &rest[rest.len() - 1];
        if !last.is(TokenKind::Semi) {
            self.error(DiagnosticKind::Syntax, "Expected ';' after variable definition", last);
            return None;
        }
        self.define_variable(&rest[..rest.len() - 1], mods, last)
    }

    fn placement(&mut self, at: &Token) -> Option<Placement> {
        let message = match self.scopes.current().kind {
            ScopeKind::Module => return Some(Placement::Global),
            ScopeKind::Parent if self.stdlib => return Some(Placement::Global),
            ScopeKind::Class => return Some(Placement::Field),
            kind if kind.is_block() => return Some(Placement::Local),
            ScopeKind::Parent => "Cannot define global variables at root level",
            _ => "Cannot define variables inside of an enum",
        };
        self.error(DiagnosticKind::Scope, message, at);
        None
    }

    /// `type name [= value]` without the terminator. `end` anchors errors at the end.
    fn define_variable(&mut self, rest: &[Token], mods: &Mods, end: &Token) -> Option<Node> {
        let type_tok = &rest[0];
        let placement = self.placement(type_tok)?;
        if !self.skimming && placement != Placement::Local {
            return self.redefine_member(rest, mods, placement);
        }
        if mods.set.is_native() {
            if let Some(tok) = mods.tokens.iter().find(|t| t.is(TokenKind::Nat)) {
                self.error(DiagnosticKind::Syntax, "Cannot use modifier 'nat' on variables", tok);
            }
            return None;
        }
        let name = self.declared_name(rest.get(1), type_tok, "variable")?;

        let value_tokens = match rest.get(2) {
            None => None,
            Some(eq) if eq.is(TokenKind::Eq) => Some((eq, &rest[3..])),
            Some(tok) => {
                self.error(
                    DiagnosticKind::Syntax,
                    format!("Unexpected token '{}', expected '=' or ';' after variable name", tok.lexeme),
                    tok,
                );
                return None;
            }
        };

        let declared = if type_tok.is(TokenKind::Question) {
            None
        } else {
            Some(self.resolve_datatype(type_tok, mods.set.is_nullable())?)
        };
        let value = match value_tokens {
            Some((eq, tokens)) => Some(self.expression(tokens, eq)?),
            None => None,
        };

        let ty = match (declared, &value) {
            (None, Some(value)) if !value.ty.is_null() && !value.ty.is_void() => {
                value.ty.clone().with_nullable(value.ty.nullable || mods.set.is_nullable())
            }
            (None, _) => {
                self.error_hint(
                    DiagnosticKind::Type,
                    "Unexpected token '?', expected a definite datatype",
                    type_tok,
                    "Inferred variables need a non-null initial value",
                );
                return None;
            }
            (Some(ty), Some(value)) => {
                if !value.ty.assignable_to(&ty) {
                    self.error_hint(
                        DiagnosticKind::Type,
                        format!(
                            "Datatypes are not equal on both sides, trying to assign {} to a {} variable.",
                            value.ty, ty
                        ),
                        rest.get(3).unwrap_or(end),
                        format!("Change the datatype of '{}' to '{}'", name.lexeme, value.ty),
                    );
                    return None;
                }
                ty
            }
            (Some(ty), None) => ty,
        };
        if mods.set.is_const() && value.is_none() {
            self.error_hint(
                DiagnosticKind::Type,
                format!("Constant variable '{}' must be initialized", name.lexeme),
                name,
                "Assign a value in the definition",
            );
            return None;
        }

        let var = Variable {
            name: name.lexeme.clone(),
            ty: ty.clone(),
            modifiers: mods.set.clone(),
            origin: self.origin(name),
            initialized: value.is_some(),
            value: value.as_ref().map(|v| v.node.clone()),
        };
        if !self.declare_variable(var, placement, name) {
            return None;
        }
        Some(self.variable_node(rest, mods, &ty, value.map(|v| v.node)))
    }

    fn declare_variable(&mut self, var: Variable, placement: Placement, name: &Token) -> bool {
        let taken = match placement {
            Placement::Local => self.scopes.declare_local(var).is_err(),
            Placement::Global => {
                let module = self.modules.get_mut(self.scopes.current_module());
                let taken = module.name_taken(&var.name);
                if !taken {
                    module.variables.insert(var.name.clone(), var);
                }
                taken
            }
            Placement::Field => match self.scopes.class_mut() {
                Some(scope) if !scope.class.fields.contains_key(&var.name) => {
                    scope.class.fields.insert(var.name.clone(), var);
                    false
                }
                _ => true,
            },
        };
        if taken {
            self.error(DiagnosticKind::Resolution, format!("Redefinition of variable '{}'", name.lexeme), name);
        }
        !taken
    }

    /// Second-pass node of a global or field recorded during the declaration pass.
    fn redefine_member(&mut self, rest: &[Token], mods: &Mods, placement: Placement) -> Option<Node> {
        let name = rest.get(1)?;
        let var = match placement {
            Placement::Field => self.scopes.class()?.class.fields.get(&name.lexeme)?.clone(),
            _ => self.modules.get(self.scopes.current_module()).variables.get(&name.lexeme)?.clone(),
        };
        Some(self.variable_node(rest, mods, &var.ty, var.value))
    }

    fn variable_node(&self, rest: &[Token], mods: &Mods, ty: &Datatype, value: Option<Node>) -> Node {
        let (type_tok, name) = (&rest[0], &rest[1]);
        let line = type_tok.actual_line;
        let kind = if value.is_some() { NodeKind::VarDefAndSetValue } else { NodeKind::VarDefinition };
        let mut node = Node::new(kind, line)
            .with_child(mods.node(line))
            .with_child(Node::leaf(NodeKind::Identifier, name))
            .with_child(type_node(Some(type_tok), ty, line));
        if let Some(value) = value {
            node.push(Node::new(NodeKind::Value, line).with_child(value));
        }
        node
    }

    pub(super) fn eval_first_identifier(&mut self, rest: &[Token], mods: &Mods) -> Option<Node> {
        let first = &rest[0];
        if self.scopes.current().kind == ScopeKind::Enum {
            return self.eval_enum_members(rest, mods);
        }
        let Some(second) = rest.get(1) else {
            self.error(DiagnosticKind::Syntax, format!("Unexpected token '{}'", first.lexeme), first);
            return None;
        };
        match second.kind {
            TokenKind::Ident => self.eval_variable_definition(rest, mods),
            TokenKind::LParen => self.eval_call_statement(rest, mods),
            kind if kind.is_assign_op() => {
                if !self.reject_modifiers(mods) || !self.expect_block(first) {
                    return None;
                }
                let last = &rest[rest.len() - 1];
                if !last.is(TokenKind::Semi) {
                    self.error(DiagnosticKind::Syntax, "Expected ';' after assignment", last);
                    return None;
                }
                self.assignment(&rest[..rest.len() - 1], true, last)
            }
            _ => {
                self.error(
                    DiagnosticKind::Syntax,
                    format!("Unexpected token '{}' after '{}'", second.lexeme, first.lexeme),
                    second,
                );
                None
            }
        }
    }

    fn eval_call_statement(&mut self, rest: &[Token], mods: &Mods) -> Option<Node> {
        let first = &rest[0];
        if !self.reject_modifiers(mods) || !self.expect_block(first) {
            return None;
        }
        let last = &rest[rest.len() - 1];
        if !last.is(TokenKind::Semi) {
            self.error(DiagnosticKind::Syntax, "Expected ';' after function call", last);
            return None;
        }
        let expr = self.expression(&rest[..rest.len() - 1], first)?;
        if expr.node.kind != NodeKind::FunctionCall {
            self.error_hint(
                DiagnosticKind::Syntax,
                "Unexpected expression statement",
                first,
                "Only function calls can be used as statements",
            );
            return None;
        }
        Some(expr.node)
    }

    /// `target op [value]` without the terminator. `check_mutability` is off for the
    /// implicit step of a `for (init, var -> end)` loop.
    fn assignment(&mut self, tokens: &[Token], check_mutability: bool, end: &Token) -> Option<Node> {
        let (Some(target), Some(op)) = (tokens.first(), tokens.get(1).filter(|t| t.kind.is_assign_op())) else {
            self.error(DiagnosticKind::Syntax, "Expected assignment", tokens.first().unwrap_or(end));
            return None;
        };
        if !target.is(TokenKind::Ident) {
            self.error(
                DiagnosticKind::Syntax,
                format!("Unexpected token '{}', expected a variable name", target.lexeme),
                target,
            );
            return None;
        }
        let var = self.resolve_variable(target)?;

        if var.modifiers.is_const() {
            self.error_hint(
                DiagnosticKind::Type,
                format!("Cannot reassign constant variable '{}'", target.lexeme),
                target,
                "Remove the 'const' modifier from the definition",
            );
            return None;
        }
        if check_mutability && !var.can_assign() {
            self.error_hint(
                DiagnosticKind::Type,
                format!("Cannot reassign immutable variable '{}'", target.lexeme),
                target,
                "Declare the variable with the 'mut' modifier",
            );
            return None;
        }

        let value = if matches!(op.kind, TokenKind::PlusPlus | TokenKind::MinusMinus) {
            if let Some(extra) = tokens.get(2) {
                self.error(
                    DiagnosticKind::Syntax,
                    format!("Unexpected token '{}' after '{}'", extra.lexeme, op.lexeme),
                    extra,
                );
                return None;
            }
            let one = Token::synthetic(TokenKind::IntLit, "1", op);
            Node::leaf(NodeKind::IntegerLiteral, &one).typed(Datatype::INT)
        } else {
            let expr = self.expression(&tokens[2..], op)?;
            let result = match BinaryOp::from_compound_assign(op.kind) {
                None => expr.ty.clone(),
                Some(binary) => match Datatype::binary_result(binary, &var.ty, &expr.ty) {
                    Some(ty) => ty,
                    None => {
                        self.error(
                            DiagnosticKind::Type,
                            format!(
                                "Cannot use '{}' operator on types '{}' and '{}'",
                                binary.symbol(),
                                var.ty,
                                expr.ty
                            ),
                            op,
                        );
                        return None;
                    }
                },
            };
            let fits = result.is_null() || result.clone().with_nullable(var.ty.nullable).assignable_to(&var.ty);
            if !fits {
                self.error(
                    DiagnosticKind::Type,
                    format!(
                        "Datatypes are not equal on both sides, trying to assign {} to a {} variable.",
                        result, var.ty
                    ),
                    tokens.get(2).unwrap_or(op),
                );
                return None;
            }
            expr.node
        };
        if let Some(binary) = BinaryOp::from_compound_assign(op.kind) {
            if matches!(op.kind, TokenKind::PlusPlus | TokenKind::MinusMinus)
                && Datatype::binary_result(binary, &var.ty, &Datatype::INT).is_none()
            {
                self.error(
                    DiagnosticKind::Type,
                    format!("Cannot use '{}' operator on type '{}'", op.lexeme, var.ty),
                    op,
                );
                return None;
            }
        }

        self.mark_initialized(&var);
        let qualified = Token::synthetic(TokenKind::Ident, var.qualified.clone(), target);
        Some(
            Node::new(NodeKind::VarSetValue, target.actual_line)
                .with_child(Node::leaf(NodeKind::Identifier, &qualified))
                .with_child(Node::leaf(NodeKind::Operator, op))
                .with_child(Node::new(NodeKind::Value, op.actual_line).with_child(value)),
        )
    }
}
