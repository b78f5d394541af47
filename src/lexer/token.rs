use logos::{FilterResult, Lexer, Logos};
use serde::Serialize;

use crate::span::Span;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
pub enum TokenKind {
    // Declarations
    #[token("module")]
    Module,
    #[token("class")]
    Class,
    #[token("enum")]
    Enum,
    #[token("fn")]
    Fn,
    #[token("new")]
    New,

    // Control flow
    #[token("if")]
    If,
    #[token("while")]
    While,
    #[token("do")]
    Do,
    #[token("for")]
    For,
    #[token("ret")]
    Ret,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("use")]
    Use,

    // Modifiers
    #[token("nat")]
    Nat,
    #[token("pub")]
    Pub,
    #[token("priv")]
    Priv,
    #[token("own")]
    Own,
    #[token("const")]
    Const,
    #[token("mut")]
    Mut,
    #[token("nullable")]
    Nullable,

    // Datatype keywords
    #[token("int")]
    IntType,
    #[token("long")]
    LongType,
    #[token("double")]
    DoubleType,
    #[token("float")]
    FloatType,
    #[token("bool")]
    BoolType,
    #[token("char")]
    CharType,
    #[token("string")]
    StringType,
    #[token("void")]
    VoidType,

    #[token("STANDARDLIB_MI_FINISH_CODE")]
    StdlibFinish,

    // Literals
    #[token("null")]
    Null,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[regex(r"[01]b")]
    BoolLit,
    #[regex(r"0[xX][0-9a-fA-F]+|[0-9]+")]
    IntLit,
    #[regex(r"[0-9]+[lL]")]
    LongLit,
    #[regex(r"[0-9]+\.[0-9]+")]
    DoubleLit,
    #[regex(r"[0-9]+(\.[0-9]+)?[fF]")]
    FloatLit,
    #[regex(r"'([^'\\]|\\.)'")]
    CharLit,
    #[regex(r#""([^"\\]|\\.)*""#)]
    StringLit,

    /// Possibly dotted: `a`, `std.println`, `m.E`.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*(\.[a-zA-Z_][a-zA-Z0-9_]*)*")]
    Ident,

    // Operators
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("~")]
    Tilde,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("!")]
    Bang,

    // Assignment
    #[token("=")]
    Eq,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("%=")]
    PercentEq,
    #[token("&=")]
    AmpEq,
    #[token("|=")]
    PipeEq,
    #[token("^=")]
    CaretEq,
    #[token("<<=")]
    ShlEq,
    #[token(">>=")]
    ShrEq,

    // Punctuation
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,
    #[token("::")]
    DoubleColon,
    #[token(":")]
    Colon,
    #[token("?")]
    Question,
    #[token("->")]
    Arrow,

    /// Never emitted: the callback skips through the closing `*/`.
    #[token("/*", block_comment)]
    BlockComment,
}

fn block_comment(lex: &mut Lexer<TokenKind>) -> FilterResult<(), ()> {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            FilterResult::Skip
        }
        None => FilterResult::Error(()),
    }
}

impl TokenKind {
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            TokenKind::Nat
                | TokenKind::Pub
                | TokenKind::Priv
                | TokenKind::Own
                | TokenKind::Const
                | TokenKind::Mut
                | TokenKind::Nullable
        )
    }

    /// Datatype keywords usable for variables and parameters (everything but `void`).
    pub fn is_datatype(self) -> bool {
        matches!(
            self,
            TokenKind::IntType
                | TokenKind::LongType
                | TokenKind::DoubleType
                | TokenKind::FloatType
                | TokenKind::BoolType
                | TokenKind::CharType
                | TokenKind::StringType
        )
    }

    pub fn is_literal(self) -> bool {
        matches!(
            self,
            TokenKind::Null
                | TokenKind::True
                | TokenKind::False
                | TokenKind::BoolLit
                | TokenKind::IntLit
                | TokenKind::LongLit
                | TokenKind::DoubleLit
                | TokenKind::FloatLit
                | TokenKind::CharLit
                | TokenKind::StringLit
        )
    }

    pub fn is_assign_op(self) -> bool {
        matches!(
            self,
            TokenKind::Eq
                | TokenKind::PlusEq
                | TokenKind::MinusEq
                | TokenKind::StarEq
                | TokenKind::SlashEq
                | TokenKind::PercentEq
                | TokenKind::AmpEq
                | TokenKind::PipeEq
                | TokenKind::CaretEq
                | TokenKind::ShlEq
                | TokenKind::ShrEq
                | TokenKind::PlusPlus
                | TokenKind::MinusMinus
        )
    }

    /// Tokens that end a statement when seen at nesting depth zero.
    pub fn is_terminator(self) -> bool {
        matches!(self, TokenKind::Semi | TokenKind::LBrace | TokenKind::RBrace)
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TokenKind::Module => "module",
            TokenKind::Class => "class",
            TokenKind::Enum => "enum",
            TokenKind::Fn => "fn",
            TokenKind::New => "new",
            TokenKind::If => "if",
            TokenKind::While => "while",
            TokenKind::Do => "do",
            TokenKind::For => "for",
            TokenKind::Ret => "ret",
            TokenKind::Break => "break",
            TokenKind::Continue => "continue",
            TokenKind::Use => "use",
            TokenKind::Nat => "nat",
            TokenKind::Pub => "pub",
            TokenKind::Priv => "priv",
            TokenKind::Own => "own",
            TokenKind::Const => "const",
            TokenKind::Mut => "mut",
            TokenKind::Nullable => "nullable",
            TokenKind::IntType => "int",
            TokenKind::LongType => "long",
            TokenKind::DoubleType => "double",
            TokenKind::FloatType => "float",
            TokenKind::BoolType => "bool",
            TokenKind::CharType => "char",
            TokenKind::StringType => "string",
            TokenKind::VoidType => "void",
            TokenKind::StdlibFinish => "STANDARDLIB_MI_FINISH_CODE",
            TokenKind::Null => "null",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::BoolLit => "bool literal",
            TokenKind::IntLit => "integer literal",
            TokenKind::LongLit => "long literal",
            TokenKind::DoubleLit => "double literal",
            TokenKind::FloatLit => "float literal",
            TokenKind::CharLit => "char literal",
            TokenKind::StringLit => "string literal",
            TokenKind::Ident => "identifier",
            TokenKind::PlusPlus => "++",
            TokenKind::MinusMinus => "--",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::EqEq => "==",
            TokenKind::BangEq => "!=",
            TokenKind::Lt => "<",
            TokenKind::LtEq => "<=",
            TokenKind::Gt => ">",
            TokenKind::GtEq => ">=",
            TokenKind::Shl => "<<",
            TokenKind::Shr => ">>",
            TokenKind::Amp => "&",
            TokenKind::Pipe => "|",
            TokenKind::Caret => "^",
            TokenKind::Tilde => "~",
            TokenKind::AmpAmp => "&&",
            TokenKind::PipePipe => "||",
            TokenKind::Bang => "!",
            TokenKind::Eq => "=",
            TokenKind::PlusEq => "+=",
            TokenKind::MinusEq => "-=",
            TokenKind::StarEq => "*=",
            TokenKind::SlashEq => "/=",
            TokenKind::PercentEq => "%=",
            TokenKind::AmpEq => "&=",
            TokenKind::PipeEq => "|=",
            TokenKind::CaretEq => "^=",
            TokenKind::ShlEq => "<<=",
            TokenKind::ShrEq => ">>=",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Comma => ",",
            TokenKind::Semi => ";",
            TokenKind::DoubleColon => "::",
            TokenKind::Colon => ":",
            TokenKind::Question => "?",
            TokenKind::Arrow => "->",
            TokenKind::BlockComment => "/*",
        };
        write!(f, "{s}")
    }
}

/// A lexed token. `line`/`column` are 1-based within the token's own source unit;
/// `actual_line` counts through the whole stdlib+user stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: usize,
    pub column: usize,
    pub actual_line: usize,
    pub span: Span,
}

impl Token {
    /// A token the analyzer fabricates while desugaring, positioned at `at`.
    pub fn synthetic(kind: TokenKind, lexeme: impl Into<String>, at: &Token) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            line: at.line,
            column: at.column,
            actual_line: at.actual_line,
            span: at.span,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.lexeme)
    }
}
