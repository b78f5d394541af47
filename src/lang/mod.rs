pub mod modifiers;
pub mod module;

use std::collections::BTreeMap;

pub use modifiers::{Modifier, Modifiers, Visibility};
pub use module::{Module, ModuleId, ModuleTree};

use crate::native::NativeBinding;
use crate::parser::ast::Node;
use crate::typeck::types::Datatype;

/// Where a variable or function lives. Access checks compare the accessor against this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    pub module: ModuleId,
    /// Source unit of the declaration; `own` restricts access to it.
    pub file_id: u32,
}

#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub ty: Datatype,
    pub modifiers: Modifiers,
    pub origin: Origin,
    pub initialized: bool,
    /// Initializer of a global or field, as analyzed during declaration.
    pub value: Option<Node>,
}

impl Variable {
    /// Whether a plain `=` may store into this variable right now.
    pub fn can_assign(&self) -> bool {
        !self.modifiers.is_const() && (self.modifiers.is_mutable() || !self.initialized)
    }
}

/// A variable declared inside a function body.
#[derive(Debug, Clone)]
pub struct LocalVariable {
    pub var: Variable,
    /// Stack index of the function scope that owns this local.
    pub function_scope: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionParameter {
    pub ty: Datatype,
    pub name: String,
    pub modifiers: Modifiers,
}

#[derive(Debug, Clone)]
pub enum FunctionBody {
    /// Declared during the first pass; the body has not been analyzed yet.
    Pending,
    Ast(Node),
    Native(NativeBinding),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Owner {
    Module(ModuleId),
    Class { module: ModuleId, class: String },
}

impl Owner {
    pub fn module(&self) -> ModuleId {
        match self {
            Owner::Module(m) => *m,
            Owner::Class { module, .. } => *module,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FunctionDefinition {
    pub name: String,
    pub return_type: Datatype,
    pub parameters: Vec<FunctionParameter>,
    pub modifiers: Modifiers,
    pub owner: Owner,
    pub file_id: u32,
    pub line: usize,
    pub body: FunctionBody,
}

impl FunctionDefinition {
    pub fn param_types(&self) -> Vec<Datatype> {
        self.parameters.iter().map(|p| p.ty.clone()).collect()
    }

    pub fn same_signature(&self, other: &FunctionDefinition) -> bool {
        self.name == other.name && self.param_types() == other.param_types()
    }

    pub fn is_native(&self) -> bool {
        matches!(self.body, FunctionBody::Native(_))
    }

    pub fn origin(&self) -> Origin {
        Origin { module: self.owner.module(), file_id: self.file_id }
    }

    pub fn qualified_name(&self, modules: &ModuleTree) -> String {
        match &self.owner {
            Owner::Module(m) => modules.qualify(*m, &self.name),
            Owner::Class { module, class } => {
                format!("{}.{}", modules.qualify(*module, class), self.name)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Enum {
    pub name: String,
    pub members: Vec<String>,
    pub modifiers: Modifiers,
    pub origin: Origin,
}

impl Enum {
    pub fn has_member(&self, name: &str) -> bool {
        self.members.iter().any(|m| m == name)
    }
}

#[derive(Debug, Clone)]
pub struct Class {
    pub name: String,
    pub fields: BTreeMap<String, Variable>,
    pub methods: BTreeMap<String, Vec<FunctionDefinition>>,
    pub constructor: Option<FunctionDefinition>,
    pub modifiers: Modifiers,
    pub origin: Origin,
}

impl Class {
    pub fn new(name: &str, modifiers: Modifiers, origin: Origin) -> Self {
        Self {
            name: name.to_string(),
            fields: BTreeMap::new(),
            methods: BTreeMap::new(),
            constructor: None,
            modifiers,
            origin,
        }
    }

    pub fn overloads(&self, name: &str) -> &[FunctionDefinition] {
        self.methods.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn add_method(&mut self, def: FunctionDefinition) -> Result<(), FunctionDefinition> {
        let overloads = self.methods.entry(def.name.clone()).or_default();
        if overloads.iter().any(|f| f.same_signature(&def)) {
            return Err(def);
        }
        overloads.push(def);
        Ok(())
    }

    pub fn method_mut(&mut self, name: &str, params: &[Datatype]) -> Option<&mut FunctionDefinition> {
        self.methods
            .get_mut(name)?
            .iter_mut()
            .find(|f| f.param_types() == params)
    }
}
