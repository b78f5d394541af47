use std::collections::BTreeMap;

use crate::lang::{Class, Enum, LocalVariable, ModuleId, Owner, Variable};
use crate::parser::ast::Node;
use crate::typeck::types::Datatype;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Parent,
    Module,
    Class,
    Enum,
    Function,
    If,
    While,
    Do,
    For,
    /// Holds the loop variable of a `for`, around the loop body scope.
    Fake,
}

impl ScopeKind {
    pub fn is_loop(self) -> bool {
        matches!(self, ScopeKind::While | ScopeKind::Do | ScopeKind::For)
    }

    /// Scopes that hold statements and locals.
    pub fn is_block(self) -> bool {
        matches!(
            self,
            ScopeKind::Function | ScopeKind::If | ScopeKind::While | ScopeKind::Do | ScopeKind::For | ScopeKind::Fake
        )
    }
}

/// The declaration a function scope's body belongs to.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyOwner {
    Function { owner: Owner, name: String, params: Vec<Datatype> },
    Constructor { module: ModuleId, class: String },
}

#[derive(Debug, Clone, Default)]
pub struct BlockScope {
    pub locals: BTreeMap<String, LocalVariable>,
    pub using: Vec<ModuleId>,
    /// Set on function scopes only.
    pub return_type: Option<Datatype>,
    pub body_of: Option<BodyOwner>,
    /// A `ret` was seen directly in this block.
    pub reached_end: bool,
    /// A `ret`, `break` or `continue` was seen directly in this block.
    pub terminated: bool,
    pub warned_unreachable: bool,
}

impl BlockScope {
    pub fn function(return_type: Datatype) -> Self {
        Self { return_type: Some(return_type), ..Self::default() }
    }

    pub fn body(return_type: Datatype, owner: BodyOwner) -> Self {
        Self { body_of: Some(owner), ..Self::function(return_type) }
    }
}

/// Members collected while a class body is open.
#[derive(Debug, Clone)]
pub struct ClassScope {
    pub class: Class,
    pub module: ModuleId,
}

/// Members collected while an enum body is open.
#[derive(Debug, Clone)]
pub struct EnumScope {
    pub decl: Enum,
    pub module: ModuleId,
}

impl EnumScope {
    /// Adds `name`, or returns false if it is already a member.
    pub fn add_member(&mut self, name: &str) -> bool {
        if self.decl.has_member(name) {
            return false;
        }
        self.decl.members.push(name.to_string());
        true
    }
}

#[derive(Debug, Clone)]
pub enum ScopeData {
    Module(ModuleId),
    Class(ClassScope),
    Enum(EnumScope),
    Block(BlockScope),
}

#[derive(Debug, Clone)]
pub struct Scope {
    pub kind: ScopeKind,
    pub data: ScopeData,
    /// Node under construction; statements inside the scope become its children.
    pub node: Node,
    /// Recovery scopes keep braces balanced after a failed header; their node is dropped.
    pub discard: bool,
}

impl Scope {
    pub fn new(kind: ScopeKind, data: ScopeData, node: Node) -> Self {
        Self { kind, data, node, discard: false }
    }

    pub fn block(&self) -> Option<&BlockScope> {
        match &self.data {
            ScopeData::Block(b) => Some(b),
            _ => None,
        }
    }

    pub fn block_mut(&mut self) -> Option<&mut BlockScope> {
        match &mut self.data {
            ScopeData::Block(b) => Some(b),
            _ => None,
        }
    }
}

/// Lexical scope stack. The bottom entry is always the parent scope of the root module.
#[derive(Debug, Clone)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
}

impl ScopeStack {
    pub fn new(root: ModuleId, node: Node) -> Self {
        Self { scopes: vec![Scope::new(ScopeKind::Parent, ScopeData::Module(root), node)] }
    }

    pub fn push(&mut self, scope: Scope) {
        self.scopes.push(scope);
    }

    /// Pop the innermost scope. The parent scope is never popped.
    pub fn pop(&mut self) -> Option<Scope> {
        if self.scopes.len() <= 1 {
            return None;
        }
        self.scopes.pop()
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn current(&self) -> &Scope {
        &self.scopes[self.scopes.len() - 1]
    }

    pub fn current_mut(&mut self) -> &mut Scope {
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    pub fn into_root(mut self) -> Node {
        self.scopes.swap_remove(0).node
    }

    /// Nearest scope of `kind`, innermost first.
    pub fn find(&self, kind: ScopeKind) -> Option<&Scope> {
        self.scopes.iter().rev().find(|s| s.kind == kind)
    }

    fn function_index(&self) -> Option<usize> {
        self.scopes.iter().rposition(|s| s.kind == ScopeKind::Function)
    }

    /// Scopes from the innermost out to the enclosing function scope, inclusive.
    fn function_frames(&self) -> &[Scope] {
        match self.function_index() {
            Some(i) => &self.scopes[i..],
            None => &[],
        }
    }

    /// Whether a loop scope encloses the current position within the current function.
    pub fn in_loop(&self) -> bool {
        self.function_frames().iter().any(|s| s.kind.is_loop())
    }

    pub fn return_type(&self) -> Option<&Datatype> {
        self.find(ScopeKind::Function)?.block()?.return_type.as_ref()
    }

    /// Module the current position belongs to.
    pub fn current_module(&self) -> ModuleId {
        self.scopes
            .iter()
            .rev()
            .find_map(|s| match &s.data {
                ScopeData::Module(m) => Some(*m),
                ScopeData::Class(c) => Some(c.module),
                ScopeData::Enum(e) => Some(e.module),
                ScopeData::Block(_) => None,
            })
            .unwrap_or(ModuleId(0))
    }

    /// Innermost enclosing class scope, if the current position is inside a class.
    pub fn class(&self) -> Option<&ClassScope> {
        self.scopes.iter().rev().find_map(|s| match &s.data {
            ScopeData::Class(c) => Some(c),
            _ => None,
        })
    }

    pub fn class_mut(&mut self) -> Option<&mut ClassScope> {
        self.scopes.iter_mut().rev().find_map(|s| match &mut s.data {
            ScopeData::Class(c) => Some(c),
            _ => None,
        })
    }

    pub fn lookup_local(&self, name: &str) -> Option<&LocalVariable> {
        self.function_frames()
            .iter()
            .rev()
            .find_map(|s| s.block()?.locals.get(name))
    }

    pub fn lookup_local_mut(&mut self, name: &str) -> Option<&mut LocalVariable> {
        let start = self.function_index()?;
        self.scopes[start..]
            .iter_mut()
            .rev()
            .find_map(|s| s.block_mut()?.locals.get_mut(name))
    }

    /// Declare a local in the current block. Returns the variable back if the name
    /// is already visible in the enclosing function.
    pub fn declare_local(&mut self, var: Variable) -> Result<(), Variable> {
        if self.lookup_local(&var.name).is_some() {
            return Err(var);
        }
        let Some(function_scope) = self.function_index() else {
            return Err(var);
        };
        let Some(block) = self.current_mut().block_mut() else {
            return Err(var);
        };
        block.locals.insert(var.name.clone(), LocalVariable { var, function_scope });
        Ok(())
    }

    /// Modules brought in with `use`, innermost block first.
    pub fn using(&self) -> Vec<ModuleId> {
        let mut modules = Vec::new();
        for scope in self.function_frames().iter().rev() {
            if let Some(block) = scope.block() {
                for m in &block.using {
                    if !modules.contains(m) {
                        modules.push(*m);
                    }
                }
            }
        }
        modules
    }

    /// Record a `use` on the enclosing function scope. Returns false outside functions.
    pub fn add_using(&mut self, module: ModuleId) -> bool {
        let Some(i) = self.function_index() else {
            return false;
        };
        match self.scopes[i].block_mut() {
            Some(block) => {
                if !block.using.contains(&module) {
                    block.using.push(module);
                }
                true
            }
            None => false,
        }
    }
}

/// Enum and class payloads leave their scope as finished declarations.
impl From<ClassScope> for Class {
    fn from(scope: ClassScope) -> Self {
        scope.class
    }
}

impl From<EnumScope> for Enum {
    fn from(scope: EnumScope) -> Self {
        scope.decl
    }
}
