//! glitter — the embedding surface.
//!
//! `Session` wires the full pipeline (spec §2, §6.1): scan → parse →
//! resolve → evaluate, holding the root environment and the two abstract
//! text streams a host constructs it with.

use std::io::{BufRead, Write};
use std::path::Path;
use std::rc::Rc;

use glitter_eval::{Environment, EnvRef, Evaluator, NativeFunction, Value};
use glitter_util::{Diagnostic, Handler, IntoDiagnostic, Level};

/// The result of one `Session::run` call: every diagnostic produced by
/// scanning, parsing, resolving, or evaluating that source, in order.
pub struct RunOutcome {
    pub diagnostics: Vec<Diagnostic>,
}

impl RunOutcome {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.level >= Level::Error)
    }
}

pub struct Session {
    root: EnvRef,
    input: Box<dyn BufRead>,
    output: Box<dyn Write>,
}

impl Session {
    pub fn new(input: Box<dyn BufRead>, output: Box<dyn Write>) -> Self {
        Self {
            root: Environment::new_root(),
            input,
            output,
        }
    }

    /// The session's input stream, reserved for natives or hosts that
    /// need to read from it; nothing in the core pipeline does.
    pub fn input(&mut self) -> &mut dyn BufRead {
        &mut self.input
    }

    /// Adds a named callable to the root environment. Must be called
    /// before the first `run` that references it (spec §6.1).
    pub fn register_native(
        &mut self,
        name: &str,
        arity: usize,
        call: impl Fn(&mut Evaluator, &[Value]) -> Result<Value, glitter_util::RuntimeError> + 'static,
    ) {
        let native = Value::Native(Rc::new(NativeFunction {
            name: name.to_string(),
            arity,
            call: Box::new(call),
        }));
        self.root.borrow_mut().define(name, native);
    }

    /// Scans, parses, resolves, and — if no static errors were produced —
    /// evaluates `source`. The root environment persists across calls on
    /// the same session (spec §4.5's failure semantics, §8 property 8).
    pub fn run(&mut self, source: &str, path: impl AsRef<Path>) -> RunOutcome {
        let mut handler = Handler::new();
        let mut program = glitter_parse::parse(source, path, &mut handler);

        if !handler.has_errors() {
            glitter_resolve::resolve(&mut program, &mut handler);
        }

        if !handler.has_errors() {
            let mut evaluator = Evaluator::new(Rc::clone(&self.root), &mut self.output);
            if let Err(err) = evaluator.run(&program) {
                handler.push(err.into_diagnostic());
            }
        }

        RunOutcome {
            diagnostics: handler.take(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(Box::new(std::io::BufReader::new(std::io::empty())), Box::new(Vec::new()))
    }

    #[test]
    fn globals_persist_across_runs() {
        let mut s = session();
        assert!(!s.run("var a = 1;", "t.glit").has_errors());
        assert!(!s.run("a = a + 1;", "t.glit").has_errors());
    }

    #[test]
    fn static_errors_prevent_evaluation() {
        let mut s = session();
        let outcome = s.run("1 = 2;", "t.glit");
        assert!(outcome.has_errors());
    }

    #[test]
    fn registered_native_is_callable() {
        let mut s = session();
        s.register_native("answer", 0, |_, _| Ok(Value::Number(42.0)));
        assert!(!s.run("print answer();", "t.glit").has_errors());
    }

    #[test]
    fn runtime_error_does_not_clear_previously_defined_globals() {
        let mut s = session();
        assert!(!s.run("var a = 1;", "t.glit").has_errors());
        assert!(s.run(r#"print "x" + 1;"#, "t.glit").has_errors());
        assert!(!s.run("print a;", "t.glit").has_errors());
    }
}
