//! The resolver visitor: walks a parsed program once, annotating every
//! `Variable`/`Assignment` node with its `Resolution` and reporting the
//! static errors spec §4.3 names. Never evaluates anything.

use std::rc::Rc;

use glitter_parse::{
    AssignmentExpr, Expr, FunctionDecl, IfStmt, Program, ReturnStmt, Stmt, VarDeclStmt,
    VariableExpr, WhileStmt,
};
use glitter_util::{Handler, IntoDiagnostic, ResolverError, Span};

use crate::scope::{BindingState, ScopeStack};

pub struct Resolver<'a> {
    scopes: ScopeStack,
    handler: &'a mut Handler,
    function_depth: u32,
}

impl<'a> Resolver<'a> {
    pub fn new(handler: &'a mut Handler) -> Self {
        Self {
            scopes: ScopeStack::new(),
            handler,
            function_depth: 0,
        }
    }

    pub fn resolve_program(&mut self, program: &mut Program) {
        for stmt in program.iter_mut() {
            self.resolve_stmt(stmt);
        }
    }

    fn report(&mut self, err: ResolverError) {
        self.handler.push(err.into_diagnostic());
    }

    /// Declares `name`, reporting a duplicate-declaration error if it is
    /// already bound in the *current* non-global scope. No-op check at
    /// global scope, which permits redeclaration.
    fn declare(&mut self, name: &str, span: &Span) {
        let is_global = self.scopes.is_global();
        if let Some(_previous) = self.scopes.declare(name) {
            if !is_global {
                self.report(ResolverError::DuplicateDeclaration {
                    name: name.to_string(),
                    span: span.clone(),
                });
            }
        }
    }

    fn define(&mut self, name: &str) {
        self.scopes.define(name);
    }

    fn resolve_stmt(&mut self, stmt: &mut Stmt) {
        match stmt {
            Stmt::Expr(expr) => self.resolve_expr(expr),
            Stmt::Print(expr) => self.resolve_expr(expr),
            Stmt::VarDecl(decl) => self.resolve_var_decl(decl),
            Stmt::FunctionDecl(decl) => self.resolve_function_decl(decl),
            Stmt::Block(stmts) => self.resolve_block(stmts),
            Stmt::If(stmt) => self.resolve_if(stmt),
            Stmt::While(stmt) => self.resolve_while(stmt),
            Stmt::Return(stmt) => self.resolve_return(stmt),
        }
    }

    fn resolve_var_decl(&mut self, decl: &mut VarDeclStmt) {
        self.declare(&decl.name, &decl.span);
        if let Some(initializer) = &mut decl.initializer {
            self.resolve_expr(initializer);
        }
        self.define(&decl.name);
    }

    /// Functions declare *and* define their own name immediately (spec
    /// §4.3: "functions may recurse in their own body"), unlike `var`
    /// which leaves a self-reference-detecting gap between the two.
    fn resolve_function_decl(&mut self, decl: &mut Rc<FunctionDecl>) {
        let span = decl.span.clone();
        self.declare(&decl.name, &span);
        self.define(&decl.name);
        self.resolve_function_body(decl);
    }

    fn resolve_function_body(&mut self, decl: &mut Rc<FunctionDecl>) {
        self.function_depth += 1;
        self.scopes.push();
        {
            let function = Rc::get_mut(decl).expect(
                "function body resolved before any closure could have cloned its Rc",
            );
            for param in &function.params {
                self.declare(param, &function.span);
                self.define(param);
            }
            for stmt in function.body.iter_mut() {
                self.resolve_stmt(stmt);
            }
        }
        self.scopes.pop();
        self.function_depth -= 1;
    }

    fn resolve_block(&mut self, stmts: &mut [Stmt]) {
        self.scopes.push();
        for stmt in stmts.iter_mut() {
            self.resolve_stmt(stmt);
        }
        self.scopes.pop();
    }

    fn resolve_if(&mut self, stmt: &mut IfStmt) {
        self.resolve_expr(&mut stmt.condition);
        self.resolve_stmt(&mut stmt.then_branch);
        if let Some(else_branch) = &mut stmt.else_branch {
            self.resolve_stmt(else_branch);
        }
    }

    fn resolve_while(&mut self, stmt: &mut WhileStmt) {
        self.resolve_expr(&mut stmt.condition);
        self.resolve_stmt(&mut stmt.body);
    }

    fn resolve_return(&mut self, stmt: &mut ReturnStmt) {
        if self.function_depth == 0 {
            self.report(ResolverError::ReturnOutsideFunction {
                span: stmt.span.clone(),
            });
        }
        if let Some(value) = &mut stmt.value {
            self.resolve_expr(value);
        }
    }

    fn resolve_expr(&mut self, expr: &mut Expr) {
        match expr {
            Expr::Literal(_, _) => {}
            Expr::Variable(v) => self.resolve_variable(v),
            Expr::Grouping(inner, _) => self.resolve_expr(inner),
            Expr::Unary(u) => self.resolve_expr(&mut u.right),
            Expr::Binary(b) => {
                self.resolve_expr(&mut b.left);
                self.resolve_expr(&mut b.right);
            }
            Expr::Logical(l) => {
                self.resolve_expr(&mut l.left);
                self.resolve_expr(&mut l.right);
            }
            Expr::Assignment(a) => self.resolve_assignment(a),
            Expr::Call(c) => {
                self.resolve_expr(&mut c.callee);
                for arg in c.args.iter_mut() {
                    self.resolve_expr(arg);
                }
            }
        }
    }

    fn resolve_variable(&mut self, v: &mut VariableExpr) {
        v.resolution = self.resolve_name(&v.name, &v.span);
    }

    fn resolve_assignment(&mut self, a: &mut AssignmentExpr) {
        self.resolve_expr(&mut a.value);
        a.resolution = self.resolve_name(&a.name, &a.span);
    }

    /// Shared by `Variable` and `Assignment`: searches local scopes
    /// innermost-out, falling back to the global rib, reporting a
    /// self-reference error if the match is still `Declared` rather than
    /// `Defined` (spec §4.3).
    fn resolve_name(&mut self, name: &str, span: &Span) -> glitter_parse::Resolution {
        if let Some((distance, state)) = self.scopes.resolve_local(name) {
            if state == BindingState::Declared {
                self.report(ResolverError::SelfReferenceInInitializer {
                    name: name.to_string(),
                    span: span.clone(),
                });
            }
            return glitter_parse::Resolution::Local(distance);
        }

        if self.scopes.resolve_global(name) == Some(BindingState::Declared) {
            self.report(ResolverError::SelfReferenceInInitializer {
                name: name.to_string(),
                span: span.clone(),
            });
        }
        glitter_parse::Resolution::Global
    }
}
