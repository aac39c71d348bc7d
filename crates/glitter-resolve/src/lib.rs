//! glitter-resolve — the static scope-distance resolver.
//!
//! A single pre-evaluation pass (spec §4.3) that walks a parsed program
//! and annotates every `Variable`/`Assignment` node with a `Resolution`,
//! so the evaluator never has to walk a live scope chain at runtime.

mod resolver;
mod scope;

use glitter_parse::Program;
use glitter_util::Handler;

pub use resolver::Resolver;

/// Resolves `program` in place. Errors are reported into `handler`;
/// callers should check `handler.has_errors()` before evaluating.
pub fn resolve(program: &mut Program, handler: &mut Handler) {
    Resolver::new(handler).resolve_program(program);
}

#[cfg(test)]
mod tests {
    use super::*;
    use glitter_parse::{Expr, Resolution, Stmt};

    fn resolved(source: &str) -> (Program, Handler) {
        let mut handler = Handler::new();
        let mut program = glitter_parse::parse(source, "t.glit", &mut handler);
        resolve(&mut program, &mut handler);
        (program, handler)
    }

    #[test]
    fn local_redeclaration_in_same_block_is_an_error() {
        let (_, handler) = resolved("{ var a = 1; var a = 2; }");
        assert!(handler.has_errors());
    }

    #[test]
    fn global_redeclaration_is_permitted() {
        let (_, handler) = resolved("var a = 1; var a = 2;");
        assert!(!handler.has_errors());
    }

    #[test]
    fn self_reference_in_local_initializer_is_an_error() {
        let (_, handler) = resolved("{ var a = a; }");
        assert!(handler.has_errors());
    }

    #[test]
    fn return_outside_function_is_an_error() {
        let (_, handler) = resolved("return 1;");
        assert!(handler.has_errors());
    }

    #[test]
    fn return_inside_function_is_fine() {
        let (_, handler) = resolved("function f() { return 1; }");
        assert!(!handler.has_errors());
    }

    #[test]
    fn nested_block_variable_resolves_to_nonzero_distance() {
        let (program, handler) = resolved("{ var a = 1; { a; } }");
        assert!(!handler.has_errors());
        let Stmt::Block(outer) = &program[0] else { panic!() };
        let Stmt::Block(inner) = &outer[1] else { panic!() };
        let Stmt::Expr(Expr::Variable(v)) = &inner[0] else { panic!() };
        assert_eq!(v.resolution, Resolution::Local(1));
    }

    #[test]
    fn undeclared_reference_resolves_to_global() {
        let (program, handler) = resolved("clock;");
        assert!(!handler.has_errors());
        let Stmt::Expr(Expr::Variable(v)) = &program[0] else { panic!() };
        assert_eq!(v.resolution, Resolution::Global);
    }

    #[test]
    fn resolving_twice_is_idempotent() {
        let (mut program, mut handler) = resolved("{ var a = 1; fn_missing(a); }");
        let before: Vec<_> = collect_resolutions(&program);
        resolve(&mut program, &mut handler);
        let after = collect_resolutions(&program);
        assert_eq!(before, after);
    }

    fn collect_resolutions(program: &Program) -> Vec<Resolution> {
        fn walk_stmt(stmt: &Stmt, out: &mut Vec<Resolution>) {
            match stmt {
                Stmt::Expr(e) | Stmt::Print(e) => walk_expr(e, out),
                Stmt::VarDecl(d) => {
                    if let Some(init) = &d.initializer {
                        walk_expr(init, out);
                    }
                }
                Stmt::FunctionDecl(f) => f.body.iter().for_each(|s| walk_stmt(s, out)),
                Stmt::Block(stmts) => stmts.iter().for_each(|s| walk_stmt(s, out)),
                Stmt::If(s) => {
                    walk_expr(&s.condition, out);
                    walk_stmt(&s.then_branch, out);
                    if let Some(e) = &s.else_branch {
                        walk_stmt(e, out);
                    }
                }
                Stmt::While(s) => {
                    walk_expr(&s.condition, out);
                    walk_stmt(&s.body, out);
                }
                Stmt::Return(s) => {
                    if let Some(v) = &s.value {
                        walk_expr(v, out);
                    }
                }
            }
        }
        fn walk_expr(expr: &Expr, out: &mut Vec<Resolution>) {
            match expr {
                Expr::Variable(v) => out.push(v.resolution),
                Expr::Assignment(a) => {
                    out.push(a.resolution);
                    walk_expr(&a.value, out);
                }
                Expr::Grouping(inner, _) => walk_expr(inner, out),
                Expr::Unary(u) => walk_expr(&u.right, out),
                Expr::Binary(b) => {
                    walk_expr(&b.left, out);
                    walk_expr(&b.right, out);
                }
                Expr::Logical(l) => {
                    walk_expr(&l.left, out);
                    walk_expr(&l.right, out);
                }
                Expr::Call(c) => {
                    walk_expr(&c.callee, out);
                    c.args.iter().for_each(|a| walk_expr(a, out));
                }
                Expr::Literal(_, _) => {}
            }
        }
        let mut out = Vec::new();
        program.iter().for_each(|s| walk_stmt(s, &mut out));
        out
    }
}
