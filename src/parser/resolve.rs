//! Identifier lookup: locals, class members, qualified paths, `use`d modules and
//! the enclosing module chain, followed by access checks.

use super::Analyzer;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::lang::{FunctionDefinition, Modifiers, Module, ModuleId, Origin, Visibility};
use crate::lexer::token::Token;
use crate::typeck::overload::{self, OverloadError};
use crate::typeck::types::{Datatype, type_list};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum VarLocation {
    Local,
    Global(ModuleId),
    Field,
}

#[derive(Debug, Clone)]
pub(crate) struct ResolvedVar {
    pub name: String,
    /// Name the tree refers to the variable by: plain for locals, qualified otherwise.
    pub qualified: String,
    pub ty: Datatype,
    pub modifiers: Modifiers,
    pub initialized: bool,
    pub location: VarLocation,
}

impl ResolvedVar {
    /// Whether a plain `=` may store into this variable right now.
    pub fn can_assign(&self) -> bool {
        !self.modifiers.is_const() && (self.modifiers.is_mutable() || !self.initialized)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ResolvedCall {
    pub qualified: String,
    pub return_type: Datatype,
    pub modifiers: Modifiers,
    pub origin: Origin,
}

impl ResolvedCall {
    fn of(def: &FunctionDefinition, analyzer: &Analyzer<'_>) -> Self {
        Self {
            qualified: def.qualified_name(&analyzer.modules),
            return_type: def.return_type.clone(),
            modifiers: def.modifiers.clone(),
            origin: def.origin(),
        }
    }
}

enum LookupError {
    ModuleNotFound(String),
    NotFound,
    Ambiguous(Vec<ModuleId>),
}

impl<'h> Analyzer<'h> {
    /// Resolve a dotted module path relative to the current module chain.
    pub(crate) fn resolve_module(&self, path: &str) -> Option<ModuleId> {
        self.modules.resolve_path(self.scopes.current_module(), path)
    }

    fn module_description(&self, id: ModuleId) -> String {
        let path = self.modules.path(id);
        if path.is_empty() { "<root>".to_string() } else { path }
    }

    /// Find a module-level symbol by qualified path, `use`d modules, then the module chain.
    fn lookup_in_modules<T>(
        &self,
        name: &str,
        get: impl for<'m> Fn(&'m Module, &str) -> Option<&'m T>,
    ) -> Result<ModuleId, LookupError> {
        if let Some((path, last)) = name.rsplit_once('.') {
            let module = self
                .resolve_module(path)
                .ok_or_else(|| LookupError::ModuleNotFound(path.to_string()))?;
            return get(self.modules.get(module), last).map(|_| module).ok_or(LookupError::NotFound);
        }

        let hits: Vec<ModuleId> = self
            .scopes
            .using()
            .into_iter()
            .filter(|m| get(self.modules.get(*m), name).is_some())
            .collect();
        match hits.len() {
            0 => {}
            1 => return Ok(hits[0]),
            _ => return Err(LookupError::Ambiguous(hits)),
        }

        self.modules
            .ancestors(self.scopes.current_module())
            .find(|m| get(self.modules.get(*m), name).is_some())
            .ok_or(LookupError::NotFound)
    }

    fn report_lookup(&mut self, err: LookupError, what: &str, tok: &Token) {
        let name = tok.lexeme.rsplit('.').next().unwrap_or(&tok.lexeme).to_string();
        let message = match err {
            LookupError::ModuleNotFound(path) => format!("Cannot find module '{path}'"),
            LookupError::NotFound => match tok.lexeme.rsplit_once('.') {
                Some((path, _)) => format!("Cannot find any {what} called '{name}' in module '{path}'"),
                None => format!("Cannot find any {what} called '{name}'"),
            },
            LookupError::Ambiguous(modules) => {
                let paths: Vec<String> = modules.iter().map(|m| self.module_description(*m)).collect();
                format!("Ambiguous {what} '{name}', found in modules {}", paths.join(", "))
            }
        };
        self.error(DiagnosticKind::Resolution, message, tok);
    }

    /// Whether the current position may access a symbol declared at `origin`.
    fn accessible(&self, modifiers: &Modifiers, origin: &Origin, tok: &Token) -> bool {
        match modifiers.visibility() {
            Visibility::Default | Visibility::Pub => true,
            Visibility::Priv => self.modules.is_within(self.scopes.current_module(), origin.module),
            Visibility::Own => tok.span.file_id == origin.file_id,
        }
    }

    fn check_access(&mut self, modifiers: &Modifiers, origin: &Origin, tok: &Token, what: &str) -> bool {
        if self.accessible(modifiers, origin, tok) {
            return true;
        }
        let keyword = modifiers.first_visibility().map(|m| m.keyword()).unwrap_or("pub");
        let owner = self.module_description(origin.module);
        self.report(
            Diagnostic::error(
                DiagnosticKind::Resolution,
                format!("Cannot access {keyword} {what} '{}' of module '{owner}' from here", tok.lexeme),
            )
            .at(tok)
            .hint(format!("Remove the '{keyword}' modifier from the declaration to make it accessible")),
        );
        false
    }

    pub(crate) fn resolve_variable(&mut self, tok: &Token) -> Option<ResolvedVar> {
        let name = tok.lexeme.as_str();
        if !name.contains('.') {
            if let Some(local) = self.scopes.lookup_local(name) {
                return Some(ResolvedVar {
                    name: name.to_string(),
                    qualified: name.to_string(),
                    ty: local.var.ty.clone(),
                    modifiers: local.var.modifiers.clone(),
                    initialized: local.var.initialized,
                    location: VarLocation::Local,
                });
            }
            if let Some(class) = self.scopes.class() {
                if let Some(field) = class.class.fields.get(name) {
                    return Some(ResolvedVar {
                        name: name.to_string(),
                        qualified: format!("{}.{name}", self.modules.qualify(class.module, &class.class.name)),
                        ty: field.ty.clone(),
                        modifiers: field.modifiers.clone(),
                        initialized: field.initialized,
                        location: VarLocation::Field,
                    });
                }
            }
        }

        let module = match self.lookup_in_modules(name, |m, n| m.variables.get(n)) {
            Ok(module) => module,
            Err(err) => {
                self.report_lookup(err, "variable", tok);
                return None;
            }
        };
        let short = name.rsplit('.').next().unwrap_or(name);
        let var = self.modules.get(module).variables.get(short)?.clone();
        if !self.check_access(&var.modifiers, &var.origin, tok, "variable") {
            return None;
        }
        Some(ResolvedVar {
            name: short.to_string(),
            qualified: self.modules.qualify(module, short),
            ty: var.ty,
            modifiers: var.modifiers,
            initialized: var.initialized,
            location: VarLocation::Global(module),
        })
    }

    /// Record a plain `=` to a variable declared without a value.
    pub(crate) fn mark_initialized(&mut self, var: &ResolvedVar) {
        match &var.location {
            VarLocation::Local => {
                if let Some(local) = self.scopes.lookup_local_mut(&var.name) {
                    local.var.initialized = true;
                }
            }
            VarLocation::Global(module) => {
                if let Some(global) = self.modules.get_mut(*module).variables.get_mut(&var.name) {
                    global.initialized = true;
                }
            }
            VarLocation::Field => {
                if let Some(field) = self.scopes.class_mut().and_then(|c| c.class.fields.get_mut(&var.name)) {
                    field.initialized = true;
                }
            }
        }
    }

    /// Candidate overloads for `name`: class methods, a qualified module, `use`d modules,
    /// then the first module in the chain that declares the name.
    fn call_candidates(&self, name: &str) -> Result<Vec<&FunctionDefinition>, String> {
        if let Some((path, last)) = name.rsplit_once('.') {
            let module = self
                .resolve_module(path)
                .ok_or_else(|| format!("Cannot find module '{path}'"))?;
            let found: Vec<&FunctionDefinition> = self.modules.get(module).overloads(last).iter().collect();
            if found.is_empty() {
                return Err(format!("Cannot find any function called '{last}' in module '{path}'"));
            }
            return Ok(found);
        }

        if let Some(class) = self.scopes.class() {
            let methods = class.class.overloads(name);
            if !methods.is_empty() {
                return Ok(methods.iter().collect());
            }
        }

        let from_using: Vec<&FunctionDefinition> = self
            .scopes
            .using()
            .into_iter()
            .flat_map(|m| self.modules.get(m).overloads(name).iter())
            .collect();
        if !from_using.is_empty() {
            return Ok(from_using);
        }

        let current = self.scopes.current_module();
        self.modules
            .ancestors(current)
            .map(|m| self.modules.get(m).overloads(name))
            .find(|found| !found.is_empty())
            .map(|found| found.iter().collect())
            .ok_or_else(|| {
                format!(
                    "Cannot find any function called '{name}' in module '{}'",
                    self.module_description(current)
                )
            })
    }

    pub(crate) fn resolve_call(&mut self, tok: &Token, args: &[Datatype]) -> Option<ResolvedCall> {
        let outcome = self.call_candidates(&tok.lexeme).and_then(|candidates| {
            match overload::select(&candidates, args) {
                Ok(def) => Ok(ResolvedCall::of(def, self)),
                Err(err) => {
                    let with = if args.is_empty() {
                        "with no arguments".to_string()
                    } else {
                        format!("with argument types ({})", type_list(args))
                    };
                    Err(match err {
                        OverloadError::NoMatch => {
                            format!("Cannot find any implementation for function '{}' {with}", tok.lexeme)
                        }
                        OverloadError::Ambiguous(n) => {
                            format!("Ambiguous call to function '{}' {with}, {n} overloads match", tok.lexeme)
                        }
                    })
                }
            }
        });
        match outcome {
            Ok(call) => self.check_access(&call.modifiers, &call.origin, tok, "function").then_some(call),
            Err(message) => {
                self.error(DiagnosticKind::Resolution, message, tok);
                None
            }
        }
    }

    /// Resolve an enum by name; returns its qualified name and members.
    pub(crate) fn resolve_enum(&mut self, tok: &Token) -> Option<(String, Vec<String>)> {
        let module = match self.lookup_in_modules(&tok.lexeme, |m, n| m.enums.get(n)) {
            Ok(module) => module,
            Err(err) => {
                self.report_lookup(err, "enum", tok);
                return None;
            }
        };
        let short = tok.lexeme.rsplit('.').next().unwrap_or(&tok.lexeme);
        let decl = self.modules.get(module).enums.get(short)?.clone();
        if !self.check_access(&decl.modifiers, &decl.origin, tok, "enum") {
            return None;
        }
        Some((self.modules.qualify(module, short), decl.members))
    }

    /// Resolve a class by name to its qualified name.
    pub(crate) fn resolve_class(&mut self, tok: &Token) -> Option<String> {
        if let Some(class) = self.scopes.class() {
            if class.class.name == tok.lexeme {
                return Some(self.modules.qualify(class.module, &class.class.name));
            }
        }
        let module = match self.lookup_in_modules(&tok.lexeme, |m, n| m.classes.get(n)) {
            Ok(module) => module,
            Err(err) => {
                self.report_lookup(err, "class", tok);
                return None;
            }
        };
        let short = tok.lexeme.rsplit('.').next().unwrap_or(&tok.lexeme);
        let class = self.modules.get(module).classes.get(short)?;
        let (modifiers, origin) = (class.modifiers.clone(), class.origin.clone());
        if !self.check_access(&modifiers, &origin, tok, "class") {
            return None;
        }
        Some(self.modules.qualify(module, short))
    }

    /// The datatype a type token denotes: a keyword, or an enum or class name.
    pub(crate) fn resolve_datatype(&mut self, tok: &Token, nullable: bool) -> Option<Datatype> {
        if let Some(ty) = Datatype::from_token(tok.kind) {
            return Some(ty.with_nullable(nullable));
        }
        if !tok.is(crate::lexer::token::TokenKind::Ident) {
            self.error(
                DiagnosticKind::Syntax,
                format!("Unexpected token '{}', expected a datatype", tok.lexeme),
                tok,
            );
            return None;
        }
        let in_enums = self.lookup_in_modules(&tok.lexeme, |m, n| m.enums.get(n)).is_ok();
        let qualified = if in_enums {
            self.resolve_enum(tok).map(|(name, _)| name)
        } else {
            let own_class = self.scopes.class().is_some_and(|c| c.class.name == tok.lexeme);
            let is_class = own_class || self.lookup_in_modules(&tok.lexeme, |m, n| m.classes.get(n)).is_ok();
            if !is_class {
                self.error(
                    DiagnosticKind::Resolution,
                    format!("Cannot find datatype '{}'", tok.lexeme),
                    tok,
                );
                return None;
            }
            self.resolve_class(tok)
        };
        qualified.map(|name| Datatype::named(name).with_nullable(nullable))
    }
}
