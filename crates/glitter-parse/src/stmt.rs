//! Statement and declaration productions (spec §4.2): `declaration`,
//! `varDecl`, `funDecl`, `statement`, `block`, `ifStmt`, `whileStmt`,
//! `forStmt` (desugared into `while`), `returnStmt`, `printStmt`, and
//! `exprStmt`.

use std::rc::Rc;

use glitter_lex::TokenKind;
use glitter_util::Span;

use crate::ast::*;
use crate::parser::{Parser, MAX_PARAMS};

impl<'a> Parser<'a> {
    // declaration -> funDecl | varDecl | statement
    pub(crate) fn declaration(&mut self) -> Option<Stmt> {
        if self.match_token(&TokenKind::Function) {
            self.function_decl()
        } else if self.match_token(&TokenKind::Var) || self.match_token(&TokenKind::Let) {
            self.var_decl()
        } else {
            self.statement()
        }
    }

    // funDecl -> "function" IDENT "(" params? ")" block
    fn function_decl(&mut self) -> Option<Stmt> {
        let start = self.previous().span.clone();
        let (name, _) = self.expect_identifier("expected function name")?;
        self.expect(&TokenKind::LeftParen, "expected '(' after function name")?;
        let params = self.params()?;
        self.expect(&TokenKind::RightParen, "expected ')' after parameters")?;
        self.expect(&TokenKind::LeftBrace, "expected '{' before function body")?;
        let body = self.block()?;
        let span = start.merge(&self.previous().span.clone());
        Some(Stmt::FunctionDecl(Rc::new(FunctionDecl {
            name,
            params,
            body,
            span,
        })))
    }

    fn params(&mut self) -> Option<Vec<String>> {
        let mut params = Vec::new();
        if !self.check(&TokenKind::RightParen) {
            loop {
                let (name, span) = self.expect_identifier("expected parameter name")?;
                if params.len() >= MAX_PARAMS {
                    self.handler.error("cannot have more than 32 parameters", span);
                } else {
                    params.push(name);
                }
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
        }
        Some(params)
    }

    // varDecl -> ("var" | "let") IDENT ("=" expression)? ";"
    fn var_decl(&mut self) -> Option<Stmt> {
        let start = self.previous().span.clone();
        let (name, _) = self.expect_identifier("expected variable name")?;
        let initializer = if self.match_token(&TokenKind::Equal) {
            Some(self.expression()?)
        } else {
            None
        };
        let end = self.expect(&TokenKind::Semicolon, "expected ';' after variable declaration")?;
        let span = start.merge(&end.span.clone());
        Some(Stmt::VarDecl(VarDeclStmt {
            name,
            initializer,
            span,
        }))
    }

    // statement -> exprStmt | printStmt | block | ifStmt | whileStmt
    //            | forStmt | returnStmt
    pub(crate) fn statement(&mut self) -> Option<Stmt> {
        if self.match_token(&TokenKind::Print) {
            self.print_stmt()
        } else if self.match_token(&TokenKind::LeftBrace) {
            Some(Stmt::Block(self.block()?))
        } else if self.match_token(&TokenKind::If) {
            self.if_stmt()
        } else if self.match_token(&TokenKind::While) {
            self.while_stmt()
        } else if self.match_token(&TokenKind::For) {
            self.for_stmt()
        } else if self.match_token(&TokenKind::Return) {
            self.return_stmt()
        } else {
            self.expr_stmt()
        }
    }

    fn print_stmt(&mut self) -> Option<Stmt> {
        let value = self.expression()?;
        self.expect(&TokenKind::Semicolon, "expected ';' after value")?;
        Some(Stmt::Print(value))
    }

    fn expr_stmt(&mut self) -> Option<Stmt> {
        let expr = self.expression()?;
        self.expect(&TokenKind::Semicolon, "expected ';' after expression")?;
        Some(Stmt::Expr(expr))
    }

    // block -> "{" declaration* "}"  (opening brace already consumed)
    pub(crate) fn block(&mut self) -> Option<Vec<Stmt>> {
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RightBrace) && !self.is_at_end() {
            match self.declaration() {
                Some(stmt) => stmts.push(stmt),
                None => self.synchronize(),
            }
        }
        self.expect(&TokenKind::RightBrace, "expected '}' after block")?;
        Some(stmts)
    }

    // ifStmt -> "if" "(" expression ")" statement ("else" statement)?
    fn if_stmt(&mut self) -> Option<Stmt> {
        self.expect(&TokenKind::LeftParen, "expected '(' after 'if'")?;
        let condition = self.expression()?;
        self.expect(&TokenKind::RightParen, "expected ')' after condition")?;
        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.match_token(&TokenKind::Else) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };
        Some(Stmt::If(IfStmt {
            condition,
            then_branch,
            else_branch,
        }))
    }

    // whileStmt -> "while" "(" expression ")" statement
    fn while_stmt(&mut self) -> Option<Stmt> {
        self.expect(&TokenKind::LeftParen, "expected '(' after 'while'")?;
        let condition = self.expression()?;
        self.expect(&TokenKind::RightParen, "expected ')' after condition")?;
        let body = Box::new(self.statement()?);
        Some(Stmt::While(WhileStmt { condition, body }))
    }

    // forStmt -> "for" "(" (varDecl | exprStmt | ";")
    //            expression? ";" expression? ")" statement
    //
    // Desugared entirely into a `Block` wrapping a `While`, per spec §4.2 —
    // there is no dedicated `For` AST node.
    fn for_stmt(&mut self) -> Option<Stmt> {
        self.expect(&TokenKind::LeftParen, "expected '(' after 'for'")?;

        let initializer = if self.match_token(&TokenKind::Semicolon) {
            None
        } else if self.match_token(&TokenKind::Var) || self.match_token(&TokenKind::Let) {
            Some(self.var_decl()?)
        } else {
            Some(self.expr_stmt()?)
        };

        let condition = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        self.expect(&TokenKind::Semicolon, "expected ';' after loop condition")?;

        let increment = if self.check(&TokenKind::RightParen) {
            None
        } else {
            Some(self.expression()?)
        };
        self.expect(&TokenKind::RightParen, "expected ')' after for clauses")?;

        let mut body = self.statement()?;

        if let Some(increment) = increment {
            body = Stmt::Block(vec![body, Stmt::Expr(increment)]);
        }

        let condition = condition.unwrap_or(Expr::Literal(Literal::Bool(true), Span::dummy()));
        body = Stmt::While(WhileStmt {
            condition,
            body: Box::new(body),
        });

        if let Some(initializer) = initializer {
            body = Stmt::Block(vec![initializer, body]);
        }

        Some(body)
    }

    // returnStmt -> "return" expression? ";"
    fn return_stmt(&mut self) -> Option<Stmt> {
        let start = self.previous().span.clone();
        let value = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        let end = self.expect(&TokenKind::Semicolon, "expected ';' after return value")?;
        let span = start.merge(&end.span.clone());
        Some(Stmt::Return(ReturnStmt { value, span }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glitter_lex::{ScanConfig, Scanner};
    use glitter_util::Handler;

    fn parse(source: &str) -> (Program, Handler) {
        let mut handler = Handler::new();
        let tokens: Vec<_> =
            Scanner::new(source, "t.glit", ScanConfig::default(), &mut handler).collect();
        let program = {
            let mut parser = Parser::new(tokens, &mut handler);
            parser.parse_program()
        };
        (program, handler)
    }

    #[test]
    fn for_loop_desugars_to_block_of_init_and_while() {
        let (program, handler) = parse("for (var i = 0; i < 3; i = i + 1) print i;");
        assert!(!handler.has_errors());
        match &program[0] {
            Stmt::Block(stmts) => {
                assert!(matches!(stmts[0], Stmt::VarDecl(_)));
                match &stmts[1] {
                    Stmt::While(w) => {
                        assert!(matches!(w.body.as_ref(), Stmt::Block(_)));
                    }
                    other => panic!("unexpected: {other:?}"),
                }
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn for_loop_without_condition_defaults_to_true() {
        let (program, handler) = parse("for (;;) print 1;");
        assert!(!handler.has_errors());
        match &program[0] {
            Stmt::While(w) => assert!(matches!(w.condition, Expr::Literal(Literal::Bool(true), _))),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn if_without_else_parses() {
        let (program, handler) = parse("if (true) print 1;");
        assert!(!handler.has_errors());
        match &program[0] {
            Stmt::If(s) => assert!(s.else_branch.is_none()),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn function_decl_collects_params_and_body() {
        let (program, handler) = parse("function add(a, b) { return a + b; }");
        assert!(!handler.has_errors());
        match &program[0] {
            Stmt::FunctionDecl(f) => {
                assert_eq!(f.params, vec!["a".to_string(), "b".to_string()]);
                assert_eq!(f.body.len(), 1);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn param_cap_is_enforced() {
        let params = (0..40).map(|i| format!("p{i}")).collect::<Vec<_>>().join(", ");
        let (_, handler) = parse(&format!("function f({params}) {{ }}"));
        assert!(handler.has_errors());
    }
}
