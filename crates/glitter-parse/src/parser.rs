//! Parser core: token-stream plumbing, synchronizing error recovery, and
//! the expression grammar (assignment down through primary), per spec
//! §4.2. Statement and declaration productions live in `stmt.rs`.

use std::mem::discriminant;

use glitter_lex::{Token, TokenKind};
use glitter_util::{Handler, Span};

use crate::ast::*;

/// Parameter lists and argument lists are capped at 32 entries (spec
/// §4.2's `params`/`args` productions).
pub const MAX_PARAMS: usize = 32;

pub struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    pub(crate) handler: &'a mut Handler,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token>, handler: &'a mut Handler) -> Self {
        Self {
            tokens,
            pos: 0,
            handler,
        }
    }

    /// Parses `program → declaration* EOF` and returns the top-level
    /// statement list. Parse errors are reported into the handler and the
    /// parser resynchronizes rather than aborting (spec §4.2).
    pub fn parse_program(&mut self) -> Program {
        let mut stmts = Vec::new();
        while !self.is_at_end() {
            match self.declaration() {
                Some(stmt) => stmts.push(stmt),
                None => self.synchronize(),
            }
        }
        stmts
    }

    // -- token stream plumbing -----------------------------------------

    pub(crate) fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.pos - 1]
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.current().kind == TokenKind::Eof
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.pos += 1;
        }
        self.previous()
    }

    /// Compares by discriminant only, ignoring any payload — used for
    /// punctuators/keywords where the exact payload doesn't matter (and
    /// for which we never have one to compare anyway).
    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        !self.is_at_end() && discriminant(&self.current().kind) == discriminant(kind)
    }

    pub(crate) fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consumes the current token if it matches `kind`, else reports
    /// `message` at the current token's span and returns `None`.
    pub(crate) fn expect(&mut self, kind: &TokenKind, message: &str) -> Option<&Token> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            let span = self.current().span.clone();
            self.handler.error(message.to_string(), span);
            None
        }
    }

    /// Consumes an identifier token, returning its name, or reports an
    /// error and returns `None`.
    pub(crate) fn expect_identifier(&mut self, message: &str) -> Option<(String, Span)> {
        if let TokenKind::Identifier(name) = &self.current().kind {
            let name = name.clone();
            let span = self.current().span.clone();
            self.advance();
            Some((name, span))
        } else {
            let span = self.current().span.clone();
            self.handler.error(message.to_string(), span);
            None
        }
    }

    /// Discards tokens until the previous one was a `;` or the next one
    /// starts a declaration/statement, per spec §4.2's recovery rule.
    pub(crate) fn synchronize(&mut self) {
        if !self.is_at_end() {
            self.advance();
        }
        while !self.is_at_end() {
            if self.previous().kind == TokenKind::Semicolon {
                return;
            }
            match self.current().kind {
                TokenKind::Class
                | TokenKind::Function
                | TokenKind::Var
                | TokenKind::Let
                | TokenKind::For
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Print
                | TokenKind::Return => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    // -- expression grammar ----------------------------------------------
    // expression -> assignment
    // assignment -> IDENT "=" assignment | logic_or

    pub(crate) fn expression(&mut self) -> Option<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> Option<Expr> {
        let expr = self.logic_or()?;

        if self.match_token(&TokenKind::Equal) {
            let equals_span = self.previous().span.clone();
            let value = self.assignment()?;
            return match expr {
                Expr::Variable(v) => Some(Expr::Assignment(AssignmentExpr {
                    name: v.name,
                    span: v.span.merge(&equals_span),
                    value: Box::new(value),
                    resolution: Resolution::Unresolved,
                })),
                other => {
                    self.handler.error("Invalid assignment target", other.span().clone());
                    Some(other)
                }
            };
        }

        Some(expr)
    }

    fn logic_or(&mut self) -> Option<Expr> {
        let mut expr = self.logic_and()?;
        while self.match_token(&TokenKind::Or) {
            let right = self.logic_and()?;
            let span = expr.span().merge(right.span());
            expr = Expr::Logical(LogicalExpr {
                left: Box::new(expr),
                op: LogicalOp::Or,
                right: Box::new(right),
                span,
            });
        }
        Some(expr)
    }

    fn logic_and(&mut self) -> Option<Expr> {
        let mut expr = self.equality()?;
        while self.match_token(&TokenKind::And) {
            let right = self.equality()?;
            let span = expr.span().merge(right.span());
            expr = Expr::Logical(LogicalExpr {
                left: Box::new(expr),
                op: LogicalOp::And,
                right: Box::new(right),
                span,
            });
        }
        Some(expr)
    }

    fn equality(&mut self) -> Option<Expr> {
        self.left_assoc_binary(Self::comparison, &[TokenKind::EqualEqual, TokenKind::BangEqual])
    }

    fn comparison(&mut self) -> Option<Expr> {
        self.left_assoc_binary(
            Self::addition,
            &[
                TokenKind::Greater,
                TokenKind::GreaterEqual,
                TokenKind::Less,
                TokenKind::LessEqual,
            ],
        )
    }

    fn addition(&mut self) -> Option<Expr> {
        self.left_assoc_binary(Self::multiplication, &[TokenKind::Plus, TokenKind::Minus])
    }

    fn multiplication(&mut self) -> Option<Expr> {
        self.left_assoc_binary(Self::unary, &[TokenKind::Slash, TokenKind::Star])
    }

    /// Shared left-associative binary-operator loop used by equality
    /// through multiplication, matching the `X → Y (op Y)*` shape spec
    /// §4.2 gives for each of those productions.
    fn left_assoc_binary(
        &mut self,
        mut operand: impl FnMut(&mut Self) -> Option<Expr>,
        ops: &[TokenKind],
    ) -> Option<Expr> {
        let mut expr = operand(self)?;
        while let Some(op) = ops.iter().find(|op| self.check(op)) {
            let op = op.clone();
            self.advance();
            let right = operand(self)?;
            let span = expr.span().merge(right.span());
            expr = Expr::Binary(BinaryExpr {
                left: Box::new(expr),
                op,
                right: Box::new(right),
                span,
            });
        }
        Some(expr)
    }

    fn unary(&mut self) -> Option<Expr> {
        if self.check(&TokenKind::Bang) || self.check(&TokenKind::Minus) {
            let op_span = self.current().span.clone();
            let op = self.advance().kind.clone();
            let right = self.unary()?;
            let span = op_span.merge(right.span());
            return Some(Expr::Unary(UnaryExpr {
                op,
                right: Box::new(right),
                span,
            }));
        }
        self.call()
    }

    fn call(&mut self) -> Option<Expr> {
        let mut expr = self.primary()?;
        while self.check(&TokenKind::LeftParen) {
            self.advance();
            let args = self.call_args()?;
            let end = self.expect(&TokenKind::RightParen, "expected ')' after arguments")?;
            let span = expr.span().merge(&end.span.clone());
            expr = Expr::Call(CallExpr {
                callee: Box::new(expr),
                args,
                span,
            });
        }
        Some(expr)
    }

    fn call_args(&mut self) -> Option<Vec<Expr>> {
        let mut args = Vec::new();
        if !self.check(&TokenKind::RightParen) {
            loop {
                if args.len() >= MAX_PARAMS {
                    let span = self.current().span.clone();
                    self.handler.error("cannot have more than 32 arguments", span);
                } else {
                    args.push(self.expression()?);
                }
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
        }
        Some(args)
    }

    fn primary(&mut self) -> Option<Expr> {
        let span = self.current().span.clone();
        match &self.current().kind {
            TokenKind::Number(n) => {
                let n = *n;
                self.advance();
                Some(Expr::Literal(Literal::Number(n), span))
            }
            TokenKind::Str(s) => {
                let s = s.clone();
                self.advance();
                Some(Expr::Literal(Literal::Str(s), span))
            }
            TokenKind::True => {
                self.advance();
                Some(Expr::Literal(Literal::Bool(true), span))
            }
            TokenKind::False => {
                self.advance();
                Some(Expr::Literal(Literal::Bool(false), span))
            }
            TokenKind::Undefined => {
                self.advance();
                Some(Expr::Literal(Literal::Undefined, span))
            }
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Some(Expr::Variable(VariableExpr {
                    name,
                    resolution: Resolution::Unresolved,
                    span,
                }))
            }
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.expression()?;
                let end = self.expect(&TokenKind::RightParen, "expected ')' after expression")?;
                let full = span.merge(&end.span.clone());
                Some(Expr::Grouping(Box::new(inner), full))
            }
            _ => {
                self.handler.error("expected expression", span);
                None
            }
        }
    }
}
