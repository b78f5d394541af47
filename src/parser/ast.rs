use serde::Serialize;

use crate::lexer::token::{Token, TokenKind};
use crate::typeck::types::Datatype;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    Parent,

    // Declarations
    CreateModule,
    CreateClass,
    CreateEnum,
    EnumValues,
    CreateConstructor,
    FunctionDefinition,
    NativeFunctionDefinition,
    NativeHostClass,
    Parameters,
    Parameter,
    VarDefinition,
    VarDefAndSetValue,
    VarSetValue,
    Modifiers,
    Modifier,
    Identifier,
    Type,
    Value,
    Operator,
    StdlibFinish,

    // Statements
    IfStatement,
    WhileStatement,
    DoStatement,
    ForFakeScope,
    ForStatement,
    Condition,
    ForInstruct,
    ReturnValue,
    BreakStatement,
    ContinueStatement,
    UseStatement,

    // Expressions
    FunctionCall,
    VariableReference,
    GetEnumMember,
    StructConstruct,
    TernaryOperator,
    TernaryIf,
    TernaryElse,
    CastValue,
    Negate,
    BoolNot,
    BitNot,
    IntegerLiteral,
    LongLiteral,
    DoubleLiteral,
    FloatLiteral,
    CharLiteral,
    StringLiteral,
    BoolLiteral,
    NullLiteral,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulus,
    LShift,
    RShift,
    BitAnd,
    BitOr,
    Xor,
    LogicalAnd,
    LogicalOr,
    Equals,
    NotEquals,
    LessThan,
    LessThanEq,
    GreaterThan,
    GreaterThanEq,
}

impl NodeKind {
    /// Kinds produced by the expression parser. These always carry a datatype.
    pub fn is_expression(self) -> bool {
        use NodeKind::*;
        matches!(
            self,
            FunctionCall
                | VariableReference
                | GetEnumMember
                | StructConstruct
                | TernaryOperator
                | CastValue
                | Negate
                | BoolNot
                | BitNot
                | IntegerLiteral
                | LongLiteral
                | DoubleLiteral
                | FloatLiteral
                | CharLiteral
                | StringLiteral
                | BoolLiteral
                | NullLiteral
        ) || BinaryOp::from_node_kind(self).is_some()
    }
}

/// Uniform tree node. `value` holds the token the node was built from, if any;
/// identifiers that were resolved carry a synthetic token with the qualified name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "serialize_token")]
    pub value: Option<Token>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
    pub line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ty: Option<Datatype>,
}

fn serialize_token<S: serde::Serializer>(token: &Option<Token>, s: S) -> Result<S::Ok, S::Error> {
    match token {
        Some(t) => s.serialize_str(&t.lexeme),
        None => s.serialize_none(),
    }
}

impl Node {
    pub fn new(kind: NodeKind, line: usize) -> Self {
        Self { kind, value: None, children: Vec::new(), line, ty: None }
    }

    pub fn leaf(kind: NodeKind, token: &Token) -> Self {
        Self { kind, value: Some(token.clone()), children: Vec::new(), line: token.actual_line, ty: None }
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn typed(mut self, ty: Datatype) -> Self {
        self.ty = Some(ty);
        self
    }

    pub fn push(&mut self, child: Node) {
        self.children.push(child);
    }

    pub fn lexeme(&self) -> Option<&str> {
        self.value.as_ref().map(|t| t.lexeme.as_str())
    }

    pub fn child(&self, kind: NodeKind) -> Option<&Node> {
        self.children.iter().find(|c| c.kind == kind)
    }

    /// Preorder walk over this node and all descendants.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Node)) {
        f(self);
        for child in &self.children {
            child.walk(f);
        }
    }

    /// All descendants (and self) of the given kind, in preorder.
    pub fn find_all(&self, kind: NodeKind) -> Vec<&Node> {
        let mut found = Vec::new();
        self.walk(&mut |n| {
            if n.kind == kind {
                found.push(n);
            }
        });
        found
    }

    /// Compact s-expression rendering, used by `--dump-ast` and tests.
    pub fn to_sexpr(&self) -> String {
        let mut out = String::new();
        self.write_sexpr(&mut out);
        out
    }

    fn write_sexpr(&self, out: &mut String) {
        let kind = serde_json::to_value(self.kind)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        let bare = self.children.is_empty() && self.value.is_none();
        if !bare {
            out.push('(');
        }
        out.push_str(&kind);
        if let Some(lexeme) = self.lexeme() {
            out.push(' ');
            out.push_str(lexeme);
        }
        for child in &self.children {
            out.push(' ');
            child.write_sexpr(out);
        }
        if !bare {
            out.push(')');
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Mul,
    Div,
    Mod,
    Add,
    Sub,
    Shl,
    Shr,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Eq,
    Neq,
    BitAnd,
    Xor,
    BitOr,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpClass {
    Arithmetic,
    Shift,
    Bitwise,
    Relational,
    Equality,
    Logical,
}

impl BinaryOp {
    pub const ALL: [BinaryOp; 18] = [
        BinaryOp::Mul,
        BinaryOp::Div,
        BinaryOp::Mod,
        BinaryOp::Add,
        BinaryOp::Sub,
        BinaryOp::Shl,
        BinaryOp::Shr,
        BinaryOp::Lt,
        BinaryOp::LtEq,
        BinaryOp::Gt,
        BinaryOp::GtEq,
        BinaryOp::Eq,
        BinaryOp::Neq,
        BinaryOp::BitAnd,
        BinaryOp::Xor,
        BinaryOp::BitOr,
        BinaryOp::And,
        BinaryOp::Or,
    ];

    pub fn from_token(kind: TokenKind) -> Option<Self> {
        Some(match kind {
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            TokenKind::Percent => BinaryOp::Mod,
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Shl => BinaryOp::Shl,
            TokenKind::Shr => BinaryOp::Shr,
            TokenKind::Lt => BinaryOp::Lt,
            TokenKind::LtEq => BinaryOp::LtEq,
            TokenKind::Gt => BinaryOp::Gt,
            TokenKind::GtEq => BinaryOp::GtEq,
            TokenKind::EqEq => BinaryOp::Eq,
            TokenKind::BangEq => BinaryOp::Neq,
            TokenKind::Amp => BinaryOp::BitAnd,
            TokenKind::Caret => BinaryOp::Xor,
            TokenKind::Pipe => BinaryOp::BitOr,
            TokenKind::AmpAmp => BinaryOp::And,
            TokenKind::PipePipe => BinaryOp::Or,
            _ => return None,
        })
    }

    /// The operator a compound assignment applies; `++`/`--` count as `+= 1`/`-= 1`.
    pub fn from_compound_assign(kind: TokenKind) -> Option<Self> {
        Some(match kind {
            TokenKind::PlusEq | TokenKind::PlusPlus => BinaryOp::Add,
            TokenKind::MinusEq | TokenKind::MinusMinus => BinaryOp::Sub,
            TokenKind::StarEq => BinaryOp::Mul,
            TokenKind::SlashEq => BinaryOp::Div,
            TokenKind::PercentEq => BinaryOp::Mod,
            TokenKind::AmpEq => BinaryOp::BitAnd,
            TokenKind::PipeEq => BinaryOp::BitOr,
            TokenKind::CaretEq => BinaryOp::Xor,
            TokenKind::ShlEq => BinaryOp::Shl,
            TokenKind::ShrEq => BinaryOp::Shr,
            _ => return None,
        })
    }

    pub fn node_kind(self) -> NodeKind {
        match self {
            BinaryOp::Mul => NodeKind::Multiply,
            BinaryOp::Div => NodeKind::Divide,
            BinaryOp::Mod => NodeKind::Modulus,
            BinaryOp::Add => NodeKind::Add,
            BinaryOp::Sub => NodeKind::Subtract,
            BinaryOp::Shl => NodeKind::LShift,
            BinaryOp::Shr => NodeKind::RShift,
            BinaryOp::Lt => NodeKind::LessThan,
            BinaryOp::LtEq => NodeKind::LessThanEq,
            BinaryOp::Gt => NodeKind::GreaterThan,
            BinaryOp::GtEq => NodeKind::GreaterThanEq,
            BinaryOp::Eq => NodeKind::Equals,
            BinaryOp::Neq => NodeKind::NotEquals,
            BinaryOp::BitAnd => NodeKind::BitAnd,
            BinaryOp::Xor => NodeKind::Xor,
            BinaryOp::BitOr => NodeKind::BitOr,
            BinaryOp::And => NodeKind::LogicalAnd,
            BinaryOp::Or => NodeKind::LogicalOr,
        }
    }

    pub fn from_node_kind(kind: NodeKind) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.node_kind() == kind)
    }

    pub fn class(self) -> OpClass {
        match self {
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod | BinaryOp::Add | BinaryOp::Sub => {
                OpClass::Arithmetic
            }
            BinaryOp::Shl | BinaryOp::Shr => OpClass::Shift,
            BinaryOp::BitAnd | BinaryOp::Xor | BinaryOp::BitOr => OpClass::Bitwise,
            BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => OpClass::Relational,
            BinaryOp::Eq | BinaryOp::Neq => OpClass::Equality,
            BinaryOp::And | BinaryOp::Or => OpClass::Logical,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Neq => "!=",
            BinaryOp::BitAnd => "&",
            BinaryOp::Xor => "^",
            BinaryOp::BitOr => "|",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}
