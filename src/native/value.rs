use serde::Serialize;

use crate::typeck::types::Primitive;

/// A value crossing the native boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NativeValue {
    Int(i32),
    Long(i64),
    Double(f64),
    Float(f32),
    Bool(bool),
    Char(char),
    String(String),
    Null,
}

impl NativeValue {
    pub fn primitive(&self) -> Primitive {
        match self {
            NativeValue::Int(_) => Primitive::Int,
            NativeValue::Long(_) => Primitive::Long,
            NativeValue::Double(_) => Primitive::Double,
            NativeValue::Float(_) => Primitive::Float,
            NativeValue::Bool(_) => Primitive::Bool,
            NativeValue::Char(_) => Primitive::Char,
            NativeValue::String(_) => Primitive::String,
            NativeValue::Null => Primitive::Null,
        }
    }

    /// Integer view for int, long and char arguments.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            NativeValue::Int(v) => Some(i64::from(*v)),
            NativeValue::Long(v) => Some(*v),
            NativeValue::Char(c) => Some(i64::from(u32::from(*c))),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            NativeValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for NativeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NativeValue::Int(v) => write!(f, "{v}"),
            NativeValue::Long(v) => write!(f, "{v}"),
            NativeValue::Double(v) => write!(f, "{v}"),
            NativeValue::Float(v) => write!(f, "{v}"),
            NativeValue::Bool(v) => write!(f, "{v}"),
            NativeValue::Char(v) => write!(f, "{v}"),
            NativeValue::String(v) => write!(f, "{v}"),
            NativeValue::Null => write!(f, "null"),
        }
    }
}

impl From<i32> for NativeValue {
    fn from(v: i32) -> Self {
        NativeValue::Int(v)
    }
}

impl From<i64> for NativeValue {
    fn from(v: i64) -> Self {
        NativeValue::Long(v)
    }
}

impl From<String> for NativeValue {
    fn from(v: String) -> Self {
        NativeValue::String(v)
    }
}

impl From<bool> for NativeValue {
    fn from(v: bool) -> Self {
        NativeValue::Bool(v)
    }
}
