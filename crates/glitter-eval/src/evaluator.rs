//! The tree-walking evaluator (spec §4.5): a visitor over a resolved AST,
//! driven by a `current` environment pointer.
//!
//! Control flow uses a small control-flow-value (`Signal`) instead of
//! exceptions to implement `return` — the strategy spec §9 recommends
//! when the host language has no cheap unchecked non-local exit that
//! composes with `?`.

use std::io::Write;
use std::rc::Rc;

use glitter_lex::TokenKind;
use glitter_parse::{
    AssignmentExpr, BinaryExpr, CallExpr, Expr, FunctionDecl, IfStmt, Literal, LogicalExpr,
    LogicalOp, Program, Resolution, ReturnStmt, Stmt, UnaryExpr, VarDeclStmt, VariableExpr,
    WhileStmt,
};
use glitter_util::RuntimeError;

use crate::environment::{EnvRef, Environment};
use crate::value::{FunctionValue, Value};

/// What happened while executing a statement: either control fell
/// through normally, or a `return` is unwinding toward the innermost
/// enclosing function call.
pub enum Signal {
    Normal,
    Return(Value),
}

pub struct Evaluator<'a> {
    root: EnvRef,
    current: EnvRef,
    output: &'a mut dyn Write,
}

impl<'a> Evaluator<'a> {
    pub fn new(root: EnvRef, output: &'a mut dyn Write) -> Self {
        let current = Rc::clone(&root);
        Self { root, current, output }
    }

    pub fn root(&self) -> &EnvRef {
        &self.root
    }

    /// Runs a full program's top-level statements in order (spec §4.5:
    /// `currentEnv` starts at `root`). Stops at the first runtime error.
    pub fn run(&mut self, program: &Program) -> Result<(), RuntimeError> {
        for stmt in program {
            match self.execute_stmt(stmt)? {
                Signal::Normal => {}
                Signal::Return(_) => {
                    // A `return` reaching top level has nowhere further to
                    // unwind to; the resolver already rejects this case
                    // (`ReturnOutsideFunction`), so this can't be reached
                    // from a program that resolved without errors.
                }
            }
        }
        Ok(())
    }

    fn execute_stmt(&mut self, stmt: &Stmt) -> Result<Signal, RuntimeError> {
        match stmt {
            Stmt::Expr(expr) => {
                self.evaluate(expr)?;
                Ok(Signal::Normal)
            }
            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                let _ = writeln!(self.output, "{value}");
                Ok(Signal::Normal)
            }
            Stmt::VarDecl(decl) => self.execute_var_decl(decl),
            Stmt::FunctionDecl(decl) => self.execute_function_decl(decl),
            Stmt::Block(stmts) => {
                let child = Environment::new_child(&self.current);
                self.execute_block(stmts, child)
            }
            Stmt::If(stmt) => self.execute_if(stmt),
            Stmt::While(stmt) => self.execute_while(stmt),
            Stmt::Return(stmt) => self.execute_return(stmt),
        }
    }

    fn execute_var_decl(&mut self, decl: &VarDeclStmt) -> Result<Signal, RuntimeError> {
        let value = match &decl.initializer {
            Some(expr) => self.evaluate(expr)?,
            None => Value::Undefined,
        };
        self.current.borrow_mut().define(decl.name.clone(), value);
        Ok(Signal::Normal)
    }

    fn execute_function_decl(&mut self, decl: &Rc<FunctionDecl>) -> Result<Signal, RuntimeError> {
        let function = Value::Function(Rc::new(FunctionValue {
            decl: Rc::clone(decl),
            closure: Rc::clone(&self.current),
        }));
        self.current.borrow_mut().define(decl.name.clone(), function);
        Ok(Signal::Normal)
    }

    /// Executes `stmts` with `current` swapped to `env`, restoring the
    /// previous environment on every exit path — including a runtime
    /// error propagating out (spec §4.5's "restore on exit" rule).
    fn execute_block(&mut self, stmts: &[Stmt], env: EnvRef) -> Result<Signal, RuntimeError> {
        let previous = std::mem::replace(&mut self.current, env);
        let result = self.run_block_body(stmts);
        self.current = previous;
        result
    }

    fn run_block_body(&mut self, stmts: &[Stmt]) -> Result<Signal, RuntimeError> {
        for stmt in stmts {
            match self.execute_stmt(stmt)? {
                Signal::Normal => {}
                signal @ Signal::Return(_) => return Ok(signal),
            }
        }
        Ok(Signal::Normal)
    }

    fn execute_if(&mut self, stmt: &IfStmt) -> Result<Signal, RuntimeError> {
        if self.evaluate(&stmt.condition)?.is_truthy() {
            self.execute_stmt(&stmt.then_branch)
        } else if let Some(else_branch) = &stmt.else_branch {
            self.execute_stmt(else_branch)
        } else {
            Ok(Signal::Normal)
        }
    }

    fn execute_while(&mut self, stmt: &WhileStmt) -> Result<Signal, RuntimeError> {
        while self.evaluate(&stmt.condition)?.is_truthy() {
            match self.execute_stmt(&stmt.body)? {
                Signal::Normal => {}
                signal @ Signal::Return(_) => return Ok(signal),
            }
        }
        Ok(Signal::Normal)
    }

    fn execute_return(&mut self, stmt: &ReturnStmt) -> Result<Signal, RuntimeError> {
        let value = match &stmt.value {
            Some(expr) => self.evaluate(expr)?,
            None => Value::Undefined,
        };
        Ok(Signal::Return(value))
    }

    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal(lit, _) => Ok(self.evaluate_literal(lit)),
            Expr::Variable(v) => self.evaluate_variable(v),
            Expr::Grouping(inner, _) => self.evaluate(inner),
            Expr::Unary(u) => self.evaluate_unary(u),
            Expr::Binary(b) => self.evaluate_binary(b),
            Expr::Logical(l) => self.evaluate_logical(l),
            Expr::Assignment(a) => self.evaluate_assignment(a),
            Expr::Call(c) => self.evaluate_call(c),
        }
    }

    fn evaluate_literal(&self, lit: &Literal) -> Value {
        match lit {
            Literal::Number(n) => Value::Number(*n),
            Literal::Str(s) => Value::string(s.as_str()),
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Undefined => Value::Undefined,
        }
    }

    fn evaluate_variable(&mut self, v: &VariableExpr) -> Result<Value, RuntimeError> {
        match v.resolution {
            Resolution::Local(distance) => Environment::get_at(&self.current, distance, &v.name, &v.span),
            Resolution::Global => Environment::get_global(&self.current, &v.name, &v.span),
            Resolution::Unresolved => unreachable!("evaluated before resolver ran"),
        }
    }

    fn evaluate_assignment(&mut self, a: &AssignmentExpr) -> Result<Value, RuntimeError> {
        let value = self.evaluate(&a.value)?;
        match a.resolution {
            Resolution::Local(distance) => {
                Environment::set_at(&self.current, distance, &a.name, value.clone(), &a.span)?;
            }
            Resolution::Global => {
                Environment::set_global(&self.current, a.name.clone(), value.clone());
            }
            Resolution::Unresolved => unreachable!("evaluated before resolver ran"),
        }
        Ok(value)
    }

    fn evaluate_unary(&mut self, u: &UnaryExpr) -> Result<Value, RuntimeError> {
        let right = self.evaluate(&u.right)?;
        match &u.op {
            TokenKind::Minus => match right {
                Value::Number(n) => Ok(Value::Number(-n)),
                _ => Err(RuntimeError::UnaryOperandMismatch { span: u.span.clone() }),
            },
            TokenKind::Bang => Ok(Value::Bool(!right.is_truthy())),
            other => unreachable!("unary operator {other:?} not produced by the parser"),
        }
    }

    fn evaluate_binary(&mut self, b: &BinaryExpr) -> Result<Value, RuntimeError> {
        let left = self.evaluate(&b.left)?;
        let right = self.evaluate(&b.right)?;
        match &b.op {
            TokenKind::Plus => match (&left, &right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::Str(a), Value::Str(b)) => Ok(Value::string(format!("{a}{b}"))),
                _ => Err(RuntimeError::AddOperandMismatch { span: b.span.clone() }),
            },
            TokenKind::Minus => self.numeric_binop(&left, &right, &b.span, |a, b| a - b).map(Value::Number),
            TokenKind::Star => self.numeric_binop(&left, &right, &b.span, |a, b| a * b).map(Value::Number),
            TokenKind::Slash => self.numeric_binop(&left, &right, &b.span, |a, b| a / b).map(Value::Number),
            TokenKind::Greater => self.comparison(&left, &right, &b.span, |a, b| a > b),
            TokenKind::GreaterEqual => self.comparison(&left, &right, &b.span, |a, b| a >= b),
            TokenKind::Less => self.comparison(&left, &right, &b.span, |a, b| a < b),
            TokenKind::LessEqual => self.comparison(&left, &right, &b.span, |a, b| a <= b),
            TokenKind::EqualEqual => Ok(Value::Bool(left.equals(&right))),
            TokenKind::BangEqual => Ok(Value::Bool(!left.equals(&right))),
            other => unreachable!("binary operator {other:?} not produced by the parser"),
        }
    }

    fn numeric_binop(
        &self,
        left: &Value,
        right: &Value,
        span: &glitter_util::Span,
        f: impl Fn(f64, f64) -> f64,
    ) -> Result<f64, RuntimeError> {
        match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok(f(*a, *b)),
            _ => Err(RuntimeError::NumericOperandMismatch { span: span.clone() }),
        }
    }

    fn comparison(
        &self,
        left: &Value,
        right: &Value,
        span: &glitter_util::Span,
        f: impl Fn(f64, f64) -> bool,
    ) -> Result<Value, RuntimeError> {
        match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(f(*a, *b))),
            _ => Err(RuntimeError::NumericOperandMismatch { span: span.clone() }),
        }
    }

    /// Short-circuit `and`/`or` that preserve value identity across the
    /// short circuit rather than coercing to `Bool` (spec §4.5).
    fn evaluate_logical(&mut self, l: &LogicalExpr) -> Result<Value, RuntimeError> {
        let left = self.evaluate(&l.left)?;
        match l.op {
            LogicalOp::Or if left.is_truthy() => Ok(left),
            LogicalOp::And if !left.is_truthy() => Ok(left),
            _ => self.evaluate(&l.right),
        }
    }

    fn evaluate_call(&mut self, c: &CallExpr) -> Result<Value, RuntimeError> {
        let callee = self.evaluate(&c.callee)?;
        let mut args = Vec::with_capacity(c.args.len());
        for arg in &c.args {
            args.push(self.evaluate(arg)?);
        }

        let arity = callee.arity().ok_or_else(|| RuntimeError::NotCallable { span: c.span.clone() })?;
        if args.len() != arity {
            return Err(RuntimeError::ArityMismatch {
                expected: arity,
                got: args.len(),
                span: c.span.clone(),
            });
        }

        match callee {
            Value::Function(function) => self.call_function(&function, &args),
            Value::Native(native) => (native.call)(self, &args),
            _ => unreachable!("arity() returned Some for a non-callable value"),
        }
    }

    /// Invokes a user function: a fresh environment parented to the
    /// function's captured closure, parameters bound in order, body
    /// executed; control flowing off the end yields `Undefined` (spec
    /// §4.5's "User-function invocation").
    fn call_function(&mut self, function: &FunctionValue, args: &[Value]) -> Result<Value, RuntimeError> {
        let call_env = Environment::new_child(&function.closure);
        for (param, arg) in function.decl.params.iter().zip(args) {
            call_env.borrow_mut().define(param.clone(), arg.clone());
        }
        match self.execute_block(&function.decl.body, call_env)? {
            Signal::Return(value) => Ok(value),
            Signal::Normal => Ok(Value::Undefined),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glitter_util::Handler;

    fn run_program(source: &str) -> (String, bool) {
        let mut handler = Handler::new();
        let mut program = glitter_parse::parse(source, "t.glit", &mut handler);
        glitter_resolve::resolve(&mut program, &mut handler);
        assert!(!handler.has_errors(), "unexpected static errors: {:?}", handler.diagnostics());

        let root = Environment::new_root();
        let mut output = Vec::new();
        let mut evaluator = Evaluator::new(root, &mut output);
        let result = evaluator.run(&program);
        (String::from_utf8(output).unwrap(), result.is_ok())
    }

    #[test]
    fn prints_hello_world() {
        let (out, ok) = run_program(r#"print "Hello World";"#);
        assert!(ok);
        assert_eq!(out, "Hello World\n");
    }

    #[test]
    fn assignment_and_arithmetic() {
        let (out, ok) = run_program("var a = 1; a = a + 2; print a;");
        assert!(ok);
        assert_eq!(out, "3\n");
    }

    #[test]
    fn recursive_fibonacci_like_function() {
        let (out, ok) = run_program(
            "function f(n){ if (n<=1) return n; return f(n-2)+f(n-1); } print f(7);",
        );
        assert!(ok);
        assert_eq!(out, "13\n");
    }

    #[test]
    fn closures_capture_independent_counters() {
        let (out, ok) = run_program(
            "function make(){ var c=0; function inc(){ c=c+1; print c; } return inc; } \
             var a=make(); a(); a(); var b=make(); b();",
        );
        assert!(ok);
        assert_eq!(out, "1\n2\n1\n");
    }

    #[test]
    fn for_loop_prints_each_iteration() {
        let (out, ok) = run_program("for (var i=0; i<3; i=i+1) print i;");
        assert!(ok);
        assert_eq!(out, "0\n1\n2\n");
    }

    #[test]
    fn adding_string_and_number_is_a_runtime_error() {
        let (out, ok) = run_program(r#"print "x" + 1;"#);
        assert!(!ok);
        assert_eq!(out, "");
    }

    #[test]
    fn or_preserves_truthy_left_value_unchanged() {
        let (out, ok) = run_program(r#"print 5 or "fallback";"#);
        assert!(ok);
        assert_eq!(out, "5\n");
    }

    #[test]
    fn and_preserves_falsy_left_value_unchanged() {
        let (out, ok) = run_program("print undefined and 1;");
        assert!(ok);
        assert_eq!(out, "undefined\n");
    }

    #[test]
    fn error_isolation_leaves_previous_globals_intact() {
        let mut handler = Handler::new();
        let root = Environment::new_root();
        let mut output = Vec::new();

        let mut first = glitter_parse::parse("var a = 1;", "t.glit", &mut handler);
        glitter_resolve::resolve(&mut first, &mut handler);
        Evaluator::new(Rc::clone(&root), &mut output).run(&first).unwrap();

        let mut second = glitter_parse::parse(r#"print "x" + 1;"#, "t.glit", &mut handler);
        glitter_resolve::resolve(&mut second, &mut handler);
        assert!(Evaluator::new(Rc::clone(&root), &mut output).run(&second).is_err());

        let mut third = glitter_parse::parse("print a;", "t.glit", &mut handler);
        glitter_resolve::resolve(&mut third, &mut handler);
        Evaluator::new(Rc::clone(&root), &mut output).run(&third).unwrap();

        assert_eq!(String::from_utf8(output).unwrap(), "1\n");
    }
}
