use serde::Serialize;

use crate::lexer::token::TokenKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Modifier {
    Pub,
    Priv,
    Own,
    Const,
    Mut,
    Nullable,
    Nat,
}

impl Modifier {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        Some(match kind {
            TokenKind::Pub => Modifier::Pub,
            TokenKind::Priv => Modifier::Priv,
            TokenKind::Own => Modifier::Own,
            TokenKind::Const => Modifier::Const,
            TokenKind::Mut => Modifier::Mut,
            TokenKind::Nullable => Modifier::Nullable,
            TokenKind::Nat => Modifier::Nat,
            _ => return None,
        })
    }

    pub fn is_visibility(self) -> bool {
        matches!(self, Modifier::Pub | Modifier::Priv | Modifier::Own)
    }

    pub fn is_mutability(self) -> bool {
        matches!(self, Modifier::Const | Modifier::Mut)
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Modifier::Pub => "pub",
            Modifier::Priv => "priv",
            Modifier::Own => "own",
            Modifier::Const => "const",
            Modifier::Mut => "mut",
            Modifier::Nullable => "nullable",
            Modifier::Nat => "nat",
        }
    }

    /// Whether `self` may not appear alongside `other`.
    pub fn conflicts_with(self, other: Modifier) -> bool {
        self == other
            || (self.is_visibility() && other.is_visibility())
            || (self.is_mutability() && other.is_mutability())
    }
}

impl std::fmt::Display for Modifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// No visibility modifier given; accessible everywhere, like `pub`.
    Default,
    Pub,
    Priv,
    Own,
}

/// A conflict-free modifier set, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Modifiers(Vec<Modifier>);

impl Modifiers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `modifier`, or return the already present modifier it conflicts with.
    pub fn insert(&mut self, modifier: Modifier) -> Result<(), Modifier> {
        if let Some(existing) = self.0.iter().find(|m| m.conflicts_with(modifier)) {
            return Err(*existing);
        }
        self.0.push(modifier);
        Ok(())
    }

    pub fn contains(&self, modifier: Modifier) -> bool {
        self.0.contains(&modifier)
    }

    pub fn iter(&self) -> impl Iterator<Item = Modifier> + '_ {
        self.0.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn visibility(&self) -> Visibility {
        if self.contains(Modifier::Priv) {
            Visibility::Priv
        } else if self.contains(Modifier::Own) {
            Visibility::Own
        } else if self.contains(Modifier::Pub) {
            Visibility::Pub
        } else {
            Visibility::Default
        }
    }

    pub fn is_nullable(&self) -> bool {
        self.contains(Modifier::Nullable)
    }

    pub fn is_native(&self) -> bool {
        self.contains(Modifier::Nat)
    }

    pub fn is_mutable(&self) -> bool {
        self.contains(Modifier::Mut)
    }

    pub fn is_const(&self) -> bool {
        self.contains(Modifier::Const)
    }

    pub fn first_mutability(&self) -> Option<Modifier> {
        self.iter().find(|m| m.is_mutability())
    }

    pub fn first_visibility(&self) -> Option<Modifier> {
        self.iter().find(|m| m.is_visibility())
    }
}
