pub mod std_host;
pub mod value;

use std::collections::HashMap;

use thiserror::Error;

use crate::lang::FunctionParameter;
use crate::typeck::types::{Datatype, Primitive};
pub use value::NativeValue;

pub type NativeFn = fn(&[NativeValue]) -> Option<NativeValue>;

/// Host-side type of a native parameter or return value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostType {
    /// Reference form of a primitive; the only form Mi binds to.
    Boxed(Primitive),
    /// Raw machine form of a primitive; never binds.
    Unboxed(Primitive),
    Void,
    Object,
}

impl HostType {
    /// The host type Mi expects for a declared datatype.
    pub fn expected_for(ty: &Datatype) -> HostType {
        match ty.as_primitive() {
            Some(Primitive::Void) => HostType::Void,
            Some(Primitive::Null) | None => HostType::Object,
            Some(p) => HostType::Boxed(p),
        }
    }
}

impl std::fmt::Display for HostType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HostType::Boxed(p) => {
                let name = p.name();
                let mut chars = name.chars();
                match chars.next() {
                    Some(first) => write!(f, "{}{}", first.to_ascii_uppercase(), chars.as_str()),
                    None => Ok(()),
                }
            }
            HostType::Unboxed(p) => write!(f, "{}", p.name()),
            HostType::Void => write!(f, "void"),
            HostType::Object => write!(f, "Object"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostParam {
    pub ty: HostType,
    pub nonnull: bool,
}

impl HostParam {
    pub fn boxed(p: Primitive) -> Self {
        Self { ty: HostType::Boxed(p), nonnull: false }
    }

    pub fn nonnull(mut self) -> Self {
        self.nonnull = true;
        self
    }
}

#[derive(Debug, Clone)]
pub struct HostMethod {
    pub name: String,
    pub params: Vec<HostParam>,
    pub returns: HostType,
    pub returns_nonnull: bool,
    pub is_static: bool,
    /// Carries the marker that permits binding from Mi.
    pub callable: bool,
    pub func: NativeFn,
}

impl HostMethod {
    /// A static, callable method; the usual shape of a bindable host method.
    pub fn callable_static(name: &str, params: Vec<HostParam>, returns: HostType, func: NativeFn) -> Self {
        Self {
            name: name.to_string(),
            params,
            returns,
            returns_nonnull: false,
            is_static: true,
            callable: true,
            func,
        }
    }

    pub fn nonnull_return(mut self) -> Self {
        self.returns_nonnull = true;
        self
    }

    fn signature(&self) -> String {
        let params: Vec<String> = self.params.iter().map(|p| p.ty.to_string()).collect();
        format!("{} {}({})", self.returns, self.name, params.join(", "))
    }
}

#[derive(Debug, Clone)]
pub struct HostClass {
    pub name: String,
    pub methods: Vec<HostMethod>,
}

impl HostClass {
    pub fn new(name: &str) -> Self {
        Self { name: name.to_string(), methods: Vec::new() }
    }

    pub fn method(mut self, method: HostMethod) -> Self {
        self.methods.push(method);
        self
    }
}

/// Host classes visible to `nat fn` declarations.
pub trait HostLookup {
    fn class(&self, name: &str) -> Option<&HostClass>;
}

/// A map of host classes by name.
#[derive(Debug, Clone, Default)]
pub struct HostRegistry {
    classes: HashMap<String, HostClass>,
}

impl HostRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry preloaded with the classes the standard library binds to.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        std_host::register(&mut registry);
        registry
    }

    pub fn register(&mut self, class: HostClass) {
        self.classes.insert(class.name.clone(), class);
    }
}

impl HostLookup for HostRegistry {
    fn class(&self, name: &str) -> Option<&HostClass> {
        self.classes.get(name)
    }
}

/// A `nat fn` declaration bound to its host method.
#[derive(Debug, Clone)]
pub struct NativeBinding {
    pub class: String,
    pub method: String,
    pub func: NativeFn,
}

impl NativeBinding {
    pub fn invoke(&self, args: &[NativeValue]) -> Option<NativeValue> {
        (self.func)(args)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NativeError {
    #[error("Only primitive datatypes may be used as native function arguments, but parameter #{index} is '{ty}'")]
    NonPrimitiveParameter { index: usize, ty: String },

    #[error("Only primitive datatypes may be returned from native functions, but got '{ty}'")]
    NonPrimitiveReturn { ty: String },

    #[error("Cannot find native class '{class}'")]
    ClassNotFound { class: String },

    #[error("Cannot find native method '{signature}' in class '{class}'")]
    MethodNotFound { class: String, signature: String },

    #[error("Native method '{method}' in class '{class}' takes unboxed parameters")]
    UnboxedParameter { class: String, method: String, boxed: String },

    #[error("Parameter #{index} of native function is nullable, but the host method marks it nonnull")]
    NullableParameterMarkedNonnull { index: usize },

    #[error("Native method returns '{found}', but the function declares '{expected}'")]
    ReturnTypeMismatch { expected: String, found: String },

    #[error("Return type of native function must be nullable, since the host method does not mark its result nonnull")]
    ReturnMustBeNullable,

    #[error("May only use native methods annotated as callable, but '{method}' is not")]
    NotCallable { method: String },

    #[error("Native methods must be static, but '{method}' is not")]
    NotStatic { method: String },
}

impl NativeError {
    pub fn hints(&self) -> Vec<String> {
        match self {
            NativeError::UnboxedParameter { boxed, .. } => {
                vec![format!("Use the boxed parameter form instead: {boxed}")]
            }
            NativeError::ReturnMustBeNullable => {
                vec!["Add the 'nullable' modifier to the function, or mark the host result nonnull".into()]
            }
            NativeError::NotCallable { .. } => vec!["Annotate the host method as callable".into()],
            _ => Vec::new(),
        }
    }
}

fn is_bindable(ty: &Datatype) -> bool {
    matches!(HostType::expected_for(ty), HostType::Boxed(_) | HostType::Void)
}

/// Bind a native declaration to a host method. Checks run in a fixed order and the
/// first failure is returned.
pub fn bind(
    host: &dyn HostLookup,
    class_name: &str,
    function: &str,
    params: &[FunctionParameter],
    return_type: &Datatype,
) -> Result<NativeBinding, NativeError> {
    for (i, p) in params.iter().enumerate() {
        if !is_bindable(&p.ty) || p.ty.is_void() {
            return Err(NativeError::NonPrimitiveParameter { index: i + 1, ty: p.ty.to_string() });
        }
    }
    if !is_bindable(return_type) {
        return Err(NativeError::NonPrimitiveReturn { ty: return_type.to_string() });
    }

    let class = host
        .class(class_name)
        .ok_or_else(|| NativeError::ClassNotFound { class: class_name.to_string() })?;

    let boxed: Vec<HostType> = params.iter().map(|p| HostType::expected_for(&p.ty)).collect();
    let method = class
        .methods
        .iter()
        .find(|m| m.name == function && m.params.iter().map(|p| p.ty).eq(boxed.iter().copied()))
        .ok_or_else(|| {
            let wanted: Vec<String> = boxed.iter().map(|t| t.to_string()).collect();
            let signature = format!("{function}({})", wanted.join(", "));
            let unboxed = class.methods.iter().find(|m| {
                m.name == function
                    && m.params.len() == boxed.len()
                    && m.params.iter().zip(&boxed).all(|(hp, want)| match (hp.ty, want) {
                        (HostType::Unboxed(a), HostType::Boxed(b)) => a == *b,
                        (a, b) => a == *b,
                    })
            });
            match unboxed {
                Some(m) => NativeError::UnboxedParameter {
                    class: class_name.to_string(),
                    method: m.signature(),
                    boxed: signature,
                },
                None => NativeError::MethodNotFound { class: class_name.to_string(), signature },
            }
        })?;

    for (i, (declared, host_param)) in params.iter().zip(&method.params).enumerate() {
        if declared.ty.nullable && host_param.nonnull {
            return Err(NativeError::NullableParameterMarkedNonnull { index: i + 1 });
        }
    }

    let expected_return = HostType::expected_for(return_type);
    if method.returns != expected_return {
        return Err(NativeError::ReturnTypeMismatch {
            expected: expected_return.to_string(),
            found: method.returns.to_string(),
        });
    }
    if !return_type.is_void() && !return_type.nullable && !method.returns_nonnull {
        return Err(NativeError::ReturnMustBeNullable);
    }

    if !method.callable {
        return Err(NativeError::NotCallable { method: method.signature() });
    }
    if !method.is_static {
        return Err(NativeError::NotStatic { method: method.signature() });
    }

    Ok(NativeBinding { class: class_name.to_string(), method: function.to_string(), func: method.func })
}
