use serde::Serialize;

use crate::lexer::token::TokenKind;
use crate::parser::ast::{BinaryOp, OpClass};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    Int,
    Long,
    Double,
    Float,
    Bool,
    Char,
    String,
    Void,
    /// Type of the `null` literal.
    Null,
}

impl Primitive {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        Some(match kind {
            TokenKind::IntType => Primitive::Int,
            TokenKind::LongType => Primitive::Long,
            TokenKind::DoubleType => Primitive::Double,
            TokenKind::FloatType => Primitive::Float,
            TokenKind::BoolType => Primitive::Bool,
            TokenKind::CharType => Primitive::Char,
            TokenKind::StringType => Primitive::String,
            TokenKind::VoidType => Primitive::Void,
            _ => return None,
        })
    }

    /// Promotion rank: double > float > long > int > char.
    pub fn rank(self) -> Option<u8> {
        match self {
            Primitive::Char => Some(0),
            Primitive::Int => Some(1),
            Primitive::Long => Some(2),
            Primitive::Float => Some(3),
            Primitive::Double => Some(4),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Double => "double",
            Primitive::Float => "float",
            Primitive::Bool => "bool",
            Primitive::Char => "char",
            Primitive::String => "string",
            Primitive::Void => "void",
            Primitive::Null => "null",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum TypeKind {
    Primitive(Primitive),
    /// Enum or class, by qualified name (`m.E`).
    Named(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Datatype {
    pub kind: TypeKind,
    pub nullable: bool,
}

impl Datatype {
    pub const INT: Datatype = Datatype::primitive(Primitive::Int);
    pub const LONG: Datatype = Datatype::primitive(Primitive::Long);
    pub const DOUBLE: Datatype = Datatype::primitive(Primitive::Double);
    pub const FLOAT: Datatype = Datatype::primitive(Primitive::Float);
    pub const BOOL: Datatype = Datatype::primitive(Primitive::Bool);
    pub const CHAR: Datatype = Datatype::primitive(Primitive::Char);
    pub const STRING: Datatype = Datatype::primitive(Primitive::String);
    pub const VOID: Datatype = Datatype::primitive(Primitive::Void);
    pub const NULL: Datatype = Datatype { kind: TypeKind::Primitive(Primitive::Null), nullable: true };

    pub const fn primitive(p: Primitive) -> Self {
        Self { kind: TypeKind::Primitive(p), nullable: false }
    }

    pub fn named(qualified: impl Into<String>) -> Self {
        Self { kind: TypeKind::Named(qualified.into()), nullable: false }
    }

    /// The datatype a keyword token denotes, `void` included.
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        Primitive::from_token(kind).map(Self::primitive)
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn as_primitive(&self) -> Option<Primitive> {
        match self.kind {
            TypeKind::Primitive(p) => Some(p),
            TypeKind::Named(_) => None,
        }
    }

    fn is(&self, p: Primitive) -> bool {
        self.as_primitive() == Some(p)
    }

    pub fn is_void(&self) -> bool {
        self.is(Primitive::Void)
    }

    pub fn is_null(&self) -> bool {
        self.is(Primitive::Null)
    }

    pub fn is_bool(&self) -> bool {
        self.is(Primitive::Bool)
    }

    pub fn is_string(&self) -> bool {
        self.is(Primitive::String)
    }

    /// Non-null `bool`, the only type accepted as a condition.
    pub fn is_condition(&self) -> bool {
        self.is_bool() && !self.nullable
    }

    /// Ranked types: char, int, long, float, double.
    pub fn is_numeric(&self) -> bool {
        self.as_primitive().and_then(Primitive::rank).is_some()
    }

    /// Types accepted by unary `-`.
    pub fn is_signed_number(&self) -> bool {
        matches!(
            self.as_primitive(),
            Some(Primitive::Int | Primitive::Long | Primitive::Double | Primitive::Float)
        )
    }

    pub fn is_integral(&self) -> bool {
        matches!(self.as_primitive(), Some(Primitive::Int | Primitive::Long | Primitive::Char))
    }

    fn rank(&self) -> Option<u8> {
        self.as_primitive().and_then(Primitive::rank)
    }

    /// Same base type, ignoring nullability. `null` matches any nullable type.
    pub fn equal(&self, other: &Datatype) -> bool {
        if self.is_null() || other.is_null() {
            return (self.is_null() || self.nullable) && (other.is_null() || other.nullable);
        }
        self.kind == other.kind
    }

    /// Whether `self` widens to `target` under the promotion ranking.
    pub fn promotable_to(&self, target: &Datatype) -> bool {
        match (self.rank(), target.rank()) {
            (Some(from), Some(to)) => from < to,
            _ => false,
        }
    }

    /// Whether a value of type `self` may be stored in a slot of type `target`.
    pub fn assignable_to(&self, target: &Datatype) -> bool {
        if self.is_null() {
            return target.nullable;
        }
        if self.nullable && !target.nullable {
            return false;
        }
        self.kind == target.kind || self.promotable_to(target)
    }

    /// Same base type as `target`, where only `target` may add nullability. No promotion.
    pub fn fits(&self, target: &Datatype) -> bool {
        if self.is_null() {
            return target.nullable;
        }
        self.kind == target.kind && (target.nullable || !self.nullable)
    }

    /// Identical type, or `null` into a nullable slot.
    pub fn exactly_assignable_to(&self, target: &Datatype) -> bool {
        if self.is_null() {
            return target.nullable;
        }
        self == target
    }

    /// The higher-ranked of two numeric types; nullable if either side is.
    pub fn heavier(a: &Datatype, b: &Datatype) -> Option<Datatype> {
        let (ra, rb) = (a.rank()?, b.rank()?);
        let winner = if ra >= rb { a } else { b };
        Some(winner.clone().with_nullable(a.nullable || b.nullable))
    }

    /// Result type of `lhs op rhs`, or None if the operator is undefined for the pair.
    pub fn binary_result(op: BinaryOp, lhs: &Datatype, rhs: &Datatype) -> Option<Datatype> {
        match op.class() {
            OpClass::Arithmetic => {
                if op == BinaryOp::Add && (lhs.is_string() || rhs.is_string()) {
                    let other = if lhs.is_string() { rhs } else { lhs };
                    let concatenable = other.as_primitive().is_some_and(|p| {
                        !matches!(p, Primitive::Void | Primitive::Null)
                    });
                    return concatenable.then_some(Datatype::STRING);
                }
                Datatype::heavier(lhs, rhs)
            }
            OpClass::Shift | OpClass::Bitwise => {
                if lhs.is_integral() && rhs.is_integral() {
                    return Datatype::heavier(lhs, rhs);
                }
                let logical = op.class() == OpClass::Bitwise && lhs.is_bool() && rhs.is_bool();
                logical.then(|| Datatype::BOOL.with_nullable(lhs.nullable || rhs.nullable))
            }
            OpClass::Relational => {
                (lhs.is_numeric() && rhs.is_numeric()).then_some(Datatype::BOOL)
            }
            OpClass::Equality => {
                let comparable = lhs.equal(rhs) || (lhs.is_numeric() && rhs.is_numeric());
                comparable.then_some(Datatype::BOOL)
            }
            OpClass::Logical => (lhs.is_bool() && rhs.is_bool()).then_some(Datatype::BOOL),
        }
    }

    /// Base name without the nullable prefix.
    pub fn base_name(&self) -> &str {
        match &self.kind {
            TypeKind::Primitive(p) => p.name(),
            TypeKind::Named(name) => name,
        }
    }
}

impl std::fmt::Display for Datatype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.nullable && !self.is_null() {
            write!(f, "nullable {}", self.base_name())
        } else {
            write!(f, "{}", self.base_name())
        }
    }
}

/// Comma-separated type list for diagnostics.
pub fn type_list(types: &[Datatype]) -> String {
    types.iter().map(|t| t.to_string()).collect::<Vec<_>>().join(", ")
}
