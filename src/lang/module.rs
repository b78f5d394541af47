use std::collections::BTreeMap;

use super::{Class, Enum, FunctionDefinition, Variable};
use crate::typeck::types::Datatype;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(pub usize);

#[derive(Debug, Clone)]
pub struct Module {
    pub name: String,
    pub parent: Option<ModuleId>,
    pub children: BTreeMap<String, ModuleId>,
    pub functions: BTreeMap<String, Vec<FunctionDefinition>>,
    pub variables: BTreeMap<String, Variable>,
    pub classes: BTreeMap<String, Class>,
    pub enums: BTreeMap<String, Enum>,
}

impl Module {
    fn new(name: &str, parent: Option<ModuleId>) -> Self {
        Self {
            name: name.to_string(),
            parent,
            children: BTreeMap::new(),
            functions: BTreeMap::new(),
            variables: BTreeMap::new(),
            classes: BTreeMap::new(),
            enums: BTreeMap::new(),
        }
    }

    pub fn overloads(&self, name: &str) -> &[FunctionDefinition] {
        self.functions.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Register `def`, or return it back if an overload with the same parameter types exists.
    pub fn add_function(&mut self, def: FunctionDefinition) -> Result<(), FunctionDefinition> {
        let overloads = self.functions.entry(def.name.clone()).or_default();
        if overloads.iter().any(|f| f.same_signature(&def)) {
            return Err(def);
        }
        overloads.push(def);
        Ok(())
    }

    pub fn function_mut(&mut self, name: &str, params: &[Datatype]) -> Option<&mut FunctionDefinition> {
        self.functions
            .get_mut(name)?
            .iter_mut()
            .find(|f| f.param_types() == params)
    }

    /// Whether a variable, class, enum or child module already uses `name`.
    pub fn name_taken(&self, name: &str) -> bool {
        self.variables.contains_key(name)
            || self.classes.contains_key(name)
            || self.enums.contains_key(name)
            || self.children.contains_key(name)
    }
}

/// Arena of modules. Index 0 is the root (parent) module, which has an empty name.
#[derive(Debug, Clone)]
pub struct ModuleTree {
    modules: Vec<Module>,
}

impl Default for ModuleTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleTree {
    pub fn new() -> Self {
        Self { modules: vec![Module::new("", None)] }
    }

    pub fn root(&self) -> ModuleId {
        ModuleId(0)
    }

    pub fn get(&self, id: ModuleId) -> &Module {
        &self.modules[id.0]
    }

    pub fn get_mut(&mut self, id: ModuleId) -> &mut Module {
        &mut self.modules[id.0]
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.len() <= 1
    }

    pub fn child(&self, parent: ModuleId, name: &str) -> Option<ModuleId> {
        self.get(parent).children.get(name).copied()
    }

    /// Child `name` of `parent`, created if missing. Reopening a module merges into it.
    pub fn add_child(&mut self, parent: ModuleId, name: &str) -> ModuleId {
        if let Some(existing) = self.child(parent, name) {
            return existing;
        }
        let id = ModuleId(self.modules.len());
        self.modules.push(Module::new(name, Some(parent)));
        self.get_mut(parent).children.insert(name.to_string(), id);
        id
    }

    /// `id` followed by each enclosing module up to and including the root.
    pub fn ancestors(&self, id: ModuleId) -> impl Iterator<Item = ModuleId> + '_ {
        std::iter::successors(Some(id), |m| self.get(*m).parent)
    }

    pub fn is_within(&self, id: ModuleId, ancestor: ModuleId) -> bool {
        self.ancestors(id).any(|m| m == ancestor)
    }

    /// Dotted path from the root, e.g. `std.io`. The root's path is empty.
    pub fn path(&self, id: ModuleId) -> String {
        let mut names: Vec<&str> = self
            .ancestors(id)
            .filter(|m| *m != self.root())
            .map(|m| self.get(m).name.as_str())
            .collect();
        names.reverse();
        names.join(".")
    }

    /// `path.name`, or just `name` for the root.
    pub fn qualify(&self, id: ModuleId, name: &str) -> String {
        let path = self.path(id);
        if path.is_empty() { name.to_string() } else { format!("{path}.{name}") }
    }

    /// Follow a dotted child path starting at `from`.
    pub fn descend(&self, from: ModuleId, path: &str) -> Option<ModuleId> {
        path.split('.').try_fold(from, |m, segment| self.child(m, segment))
    }

    /// Resolve a dotted module path relative to `from`, trying each enclosing module
    /// innermost first.
    pub fn resolve_path(&self, from: ModuleId, path: &str) -> Option<ModuleId> {
        self.ancestors(from).find_map(|m| self.descend(m, path))
    }
}
