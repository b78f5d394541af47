//! Precedence-climbing expression parser. Every node it produces carries a datatype.

use super::Analyzer;
use super::ast::{BinaryOp, Node, NodeKind};
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::lexer::token::{Token, TokenKind};
use crate::typeck::types::Datatype;

/// Binding power of `? :`; the else arm is parsed at this level, so it associates right.
const TERNARY_BP: u8 = 2;

fn infix_binding_power(op: BinaryOp) -> (u8, u8) {
    match op {
        BinaryOp::Or => (3, 4),
        BinaryOp::And => (5, 6),
        BinaryOp::BitOr => (7, 8),
        BinaryOp::Xor => (9, 10),
        BinaryOp::BitAnd => (11, 12),
        BinaryOp::Eq | BinaryOp::Neq => (13, 14),
        BinaryOp::Lt | BinaryOp::Gt | BinaryOp::LtEq | BinaryOp::GtEq => (15, 16),
        BinaryOp::Shl | BinaryOp::Shr => (17, 18),
        BinaryOp::Add | BinaryOp::Sub => (19, 20),
        BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => (21, 22),
    }
}

/// An analyzed expression and its datatype.
#[derive(Debug, Clone)]
pub(crate) struct TypedNode {
    pub node: Node,
    pub ty: Datatype,
}

impl TypedNode {
    fn new(node: Node, ty: Datatype) -> Self {
        Self { node: node.typed(ty.clone()), ty }
    }
}

struct ExprParser<'a, 't, 'h> {
    tokens: &'t [Token],
    pos: usize,
    /// Token reported against when the range ends early.
    anchor: &'t Token,
    analyzer: &'a mut Analyzer<'h>,
}

impl<'h> Analyzer<'h> {
    /// Parse and type `tokens` as one expression. `at` anchors errors for an empty range.
    pub(crate) fn expression(&mut self, tokens: &[Token], at: &Token) -> Option<TypedNode> {
        if tokens.is_empty() {
            self.error(DiagnosticKind::Syntax, "Expected expression", at);
            return None;
        }
        let anchor = tokens.last().unwrap_or(at);
        let mut parser = ExprParser { tokens, pos: 0, anchor, analyzer: self };
        let expr = parser.parse_expr(0)?;
        if let Some(extra) = parser.peek() {
            let extra = extra.clone();
            parser.analyzer.error(
                DiagnosticKind::Syntax,
                format!("Unexpected token '{}' after expression", extra.lexeme),
                &extra,
            );
            return None;
        }
        Some(expr)
    }
}

impl<'a, 't, 'h> ExprParser<'a, 't, 'h> {
    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn peek_is(&self, kind: TokenKind) -> bool {
        self.peek().is_some_and(|t| t.is(kind))
    }

    fn advance(&mut self) -> Option<&'t Token> {
        let tok = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(tok)
    }

    fn expect(&mut self, kind: TokenKind, context: &str) -> Option<&'t Token> {
        match self.peek() {
            Some(tok) if tok.is(kind) => self.advance(),
            Some(tok) => {
                self.analyzer.error(
                    DiagnosticKind::Syntax,
                    format!("Expected '{kind}' {context}, but got '{}'", tok.lexeme),
                    tok,
                );
                None
            }
            None => {
                self.analyzer
                    .error(DiagnosticKind::Syntax, format!("Expected '{kind}' {context}"), self.anchor);
                None
            }
        }
    }

    fn parse_expr(&mut self, min_bp: u8) -> Option<TypedNode> {
        let mut lhs = self.parse_prefix()?;

        loop {
            let Some(tok) = self.peek() else { break };

            if tok.is(TokenKind::Question) {
                if TERNARY_BP < min_bp {
                    break;
                }
                self.advance();
                let then = self.parse_expr(0)?;
                self.expect(TokenKind::Colon, "in ternary operator")?;
                let otherwise = self.parse_expr(TERNARY_BP)?;
                lhs = self.ternary(lhs, then, otherwise, tok)?;
                continue;
            }

            let Some(op) = BinaryOp::from_token(tok.kind) else { break };
            let (l_bp, r_bp) = infix_binding_power(op);
            if l_bp < min_bp {
                break;
            }
            self.advance();
            let rhs = self.parse_expr(r_bp)?;
            lhs = self.binary(op, lhs, rhs, tok)?;
        }

        Some(lhs)
    }

    fn binary(&mut self, op: BinaryOp, lhs: TypedNode, rhs: TypedNode, tok: &Token) -> Option<TypedNode> {
        let Some(ty) = Datatype::binary_result(op, &lhs.ty, &rhs.ty) else {
            self.analyzer.error(
                DiagnosticKind::Type,
                format!("Cannot use '{}' operator on types '{}' and '{}'", op.symbol(), lhs.ty, rhs.ty),
                tok,
            );
            return None;
        };
        let node = Node::new(op.node_kind(), tok.actual_line).with_child(lhs.node).with_child(rhs.node);
        Some(TypedNode::new(node, ty))
    }

    fn ternary(
        &mut self,
        condition: TypedNode,
        then: TypedNode,
        otherwise: TypedNode,
        tok: &Token,
    ) -> Option<TypedNode> {
        if !condition.ty.is_condition() {
            self.analyzer.report(
                Diagnostic::error(DiagnosticKind::Type, "Ternary operator condition should be of type 'nonnull bool'")
                    .at(tok)
                    .hint(format!("The condition has type '{}'", condition.ty)),
            );
            return None;
        }
        if !then.ty.equal(&otherwise.ty) {
            self.analyzer.report(
                Diagnostic::error(
                    DiagnosticKind::Type,
                    "'if' part of ternary operator should have the same type as the 'else' part",
                )
                .at(tok)
                .hint(format!("Found '{}' and '{}'", then.ty, otherwise.ty)),
            );
            return None;
        }
        let ty = if then.ty.is_null() { otherwise.ty.clone() } else { then.ty.clone() };
        let node = Node::new(NodeKind::TernaryOperator, tok.actual_line)
            .with_child(condition.node)
            .with_child(Node::new(NodeKind::TernaryIf, tok.actual_line).with_child(then.node))
            .with_child(Node::new(NodeKind::TernaryElse, tok.actual_line).with_child(otherwise.node));
        Some(TypedNode::new(node, ty))
    }

    fn parse_prefix(&mut self) -> Option<TypedNode> {
        let Some(tok) = self.advance() else {
            self.analyzer.error(DiagnosticKind::Syntax, "Expected expression", self.anchor);
            return None;
        };

        match tok.kind {
            TokenKind::Plus | TokenKind::PlusPlus | TokenKind::MinusMinus => {
                let operand = self.parse_prefix()?;
                self.unary_check(tok, &operand, operand.ty.is_numeric(), "a number")?;
                Some(operand)
            }
            TokenKind::Minus => {
                if self.peek_is(TokenKind::IntLit) {
                    let lit = self.advance()?;
                    let operand = self.int_literal(lit, true)?;
                    return Some(self.unary(NodeKind::Negate, tok, operand));
                }
                let operand = self.parse_prefix()?;
                self.unary_check(tok, &operand, operand.ty.is_signed_number(), "a signed number")?;
                Some(self.unary(NodeKind::Negate, tok, operand))
            }
            TokenKind::Bang => {
                let operand = self.parse_prefix()?;
                self.unary_check(tok, &operand, operand.ty.is_bool(), "'bool'")?;
                Some(self.unary(NodeKind::BoolNot, tok, operand))
            }
            TokenKind::Tilde => {
                let operand = self.parse_prefix()?;
                self.unary_check(tok, &operand, operand.ty.is_integral(), "an integer")?;
                Some(self.unary(NodeKind::BitNot, tok, operand))
            }
            kind if kind.is_datatype() => {
                let target = Datatype::from_token(kind)?;
                let operand = self.parse_prefix()?;
                let node = Node::leaf(NodeKind::CastValue, tok).with_child(operand.node);
                Some(TypedNode::new(node, target))
            }
            TokenKind::LParen => {
                let inner = self.parse_expr(0)?;
                self.expect(TokenKind::RParen, "to close parenthesized expression")?;
                Some(inner)
            }
            TokenKind::Ident => self.parse_after_ident(tok),
            TokenKind::New => self.parse_construct(tok),
            kind if kind.is_literal() => self.literal(tok),
            _ => {
                self.analyzer.error(
                    DiagnosticKind::Syntax,
                    format!("Unexpected token '{}', expected an expression", tok.lexeme),
                    tok,
                );
                None
            }
        }
    }

    fn unary(&self, kind: NodeKind, tok: &Token, operand: TypedNode) -> TypedNode {
        let ty = operand.ty.clone();
        TypedNode::new(Node::new(kind, tok.actual_line).with_child(operand.node), ty)
    }

    fn unary_check(&mut self, tok: &Token, operand: &TypedNode, ok: bool, expected: &str) -> Option<()> {
        if ok {
            return Some(());
        }
        self.analyzer.error(
            DiagnosticKind::Type,
            format!("Cannot use '{}' operator on type '{}', expected {expected}", tok.lexeme, operand.ty),
            tok,
        );
        None
    }

    fn literal(&mut self, tok: &Token) -> Option<TypedNode> {
        let (kind, ty) = match tok.kind {
            TokenKind::IntLit => return self.int_literal(tok, false),
            TokenKind::LongLit => {
                let digits = tok.lexeme.trim_end_matches(['l', 'L']);
                if digits.parse::<i64>().is_err() {
                    self.analyzer.error(
                        DiagnosticKind::Type,
                        format!("Long literal '{}' is out of range", tok.lexeme),
                        tok,
                    );
                    return None;
                }
                (NodeKind::LongLiteral, Datatype::LONG)
            }
            TokenKind::DoubleLit => (NodeKind::DoubleLiteral, Datatype::DOUBLE),
            TokenKind::FloatLit => (NodeKind::FloatLiteral, Datatype::FLOAT),
            TokenKind::CharLit => (NodeKind::CharLiteral, Datatype::CHAR),
            TokenKind::StringLit => (NodeKind::StringLiteral, Datatype::STRING),
            TokenKind::True | TokenKind::False | TokenKind::BoolLit => (NodeKind::BoolLiteral, Datatype::BOOL),
            TokenKind::Null => (NodeKind::NullLiteral, Datatype::NULL),
            _ => {
                self.analyzer.error(
                    DiagnosticKind::Internal,
                    format!("Unexpected parsing error at '{}'", tok.lexeme),
                    tok,
                );
                return None;
            }
        };
        Some(TypedNode::new(Node::leaf(kind, tok), ty))
    }

    /// `int` literals must fit in 32 bits; `negated` admits the one extra negative value.
    fn int_literal(&mut self, tok: &Token, negated: bool) -> Option<TypedNode> {
        let lexeme = tok.lexeme.as_str();
        let parsed = match lexeme.strip_prefix("0x").or_else(|| lexeme.strip_prefix("0X")) {
            Some(hex) => i64::from_str_radix(hex, 16),
            None => lexeme.parse::<i64>(),
        };
        let limit = if negated { i64::from(i32::MAX) + 1 } else { i64::from(i32::MAX) };
        match parsed {
            Ok(value) if value <= limit => {
                Some(TypedNode::new(Node::leaf(NodeKind::IntegerLiteral, tok), Datatype::INT))
            }
            _ => {
                self.analyzer.report(
                    Diagnostic::error(DiagnosticKind::Type, format!("Integer literal '{lexeme}' is out of range for 'int'"))
                        .at(tok)
                        .hint(format!("Use a long literal instead: {lexeme}L")),
                );
                None
            }
        }
    }

    fn parse_after_ident(&mut self, ident: &Token) -> Option<TypedNode> {
        if self.peek_is(TokenKind::LParen) {
            self.advance();
            return self.parse_call(ident);
        }
        if self.peek_is(TokenKind::DoubleColon) {
            self.advance();
            let member = self.expect(TokenKind::Ident, "after '::'")?;
            return self.enum_member(ident, member);
        }

        let var = self.analyzer.resolve_variable(ident)?;
        let reference = Token::synthetic(TokenKind::Ident, var.qualified, ident);
        Some(TypedNode::new(Node::leaf(NodeKind::VariableReference, &reference), var.ty))
    }

    /// Arguments up to the closing `)`; the opening `(` was consumed.
    fn parse_call(&mut self, ident: &Token) -> Option<TypedNode> {
        let mut args: Vec<TypedNode> = Vec::new();
        if !self.peek_is(TokenKind::RParen) {
            loop {
                args.push(self.parse_expr(0)?);
                if self.peek_is(TokenKind::Comma) {
                    self.advance();
                    continue;
                }
                break;
            }
        }
        self.expect(TokenKind::RParen, "to close argument list")?;

        let arg_types: Vec<Datatype> = args.iter().map(|a| a.ty.clone()).collect();
        let call = self.analyzer.resolve_call(ident, &arg_types)?;
        let callee = Token::synthetic(TokenKind::Ident, call.qualified, ident);
        let parameters = Node::new(NodeKind::Parameters, ident.actual_line)
            .with_children(args.into_iter().map(|a| a.node));
        let node = Node::new(NodeKind::FunctionCall, ident.actual_line)
            .with_child(Node::leaf(NodeKind::Identifier, &callee))
            .with_child(parameters);
        Some(TypedNode::new(node, call.return_type))
    }

    fn enum_member(&mut self, enum_tok: &Token, member: &Token) -> Option<TypedNode> {
        let (qualified, members) = self.analyzer.resolve_enum(enum_tok)?;
        if !members.iter().any(|m| *m == member.lexeme) {
            self.analyzer.error(
                DiagnosticKind::Resolution,
                format!("Cannot find member '{}' in enum '{qualified}'", member.lexeme),
                member,
            );
            return None;
        }
        let name = Token::synthetic(TokenKind::Ident, qualified.clone(), enum_tok);
        let node = Node::new(NodeKind::GetEnumMember, enum_tok.actual_line)
            .with_child(Node::leaf(NodeKind::Identifier, &name))
            .with_child(Node::leaf(NodeKind::Identifier, member));
        Some(TypedNode::new(node, Datatype::named(qualified)))
    }

    /// `new C` or `new C()`.
    fn parse_construct(&mut self, new: &Token) -> Option<TypedNode> {
        let class = self.expect(TokenKind::Ident, "after 'new'")?;
        if self.peek_is(TokenKind::LParen) {
            self.advance();
            self.expect(TokenKind::RParen, "after 'new', constructors take no arguments here")?;
        }
        let qualified = self.analyzer.resolve_class(class)?;
        let name = Token::synthetic(TokenKind::Ident, qualified.clone(), class);
        let node = Node::leaf(NodeKind::StructConstruct, &name);
        let mut typed = TypedNode::new(node, Datatype::named(qualified));
        typed.node.line = new.actual_line;
        Some(typed)
    }
}
