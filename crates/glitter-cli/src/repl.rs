//! Interactive REPL: reads lines from stdin until `!quit`, running each
//! completed statement through the same `Session` so globals persist
//! across inputs (spec §8 property 8).
//!
//! A line whose braces/parens aren't yet balanced is held and appended to
//! until they are, so a multi-line `function`/`if`/`while` body can be
//! typed across several lines rather than forcing everything onto one.

use std::io::{self, Write as _};

use glitter::Session;

use crate::diagnostics::print_diagnostic;

const QUIT_COMMAND: &str = "!quit";

pub fn run(session: &mut Session, use_color: bool) -> io::Result<()> {
    let stdin = io::stdin();
    let mut buffer = String::new();

    loop {
        print_prompt(buffer.is_empty())?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break; // EOF (e.g. piped input, or Ctrl-D)
        }

        if buffer.is_empty() && line.trim() == QUIT_COMMAND {
            break;
        }

        buffer.push_str(&line);
        if !is_balanced(&buffer) {
            continue;
        }

        let source = std::mem::take(&mut buffer);
        let outcome = session.run(&source, "<repl>");
        for diagnostic in &outcome.diagnostics {
            print_diagnostic(&source, diagnostic, use_color);
        }
    }

    Ok(())
}

fn print_prompt(fresh: bool) -> io::Result<()> {
    print!("{}", if fresh { "glitter> " } else { "...... > " });
    io::stdout().flush()
}

/// Counts unmatched `{`/`(` ignoring the contents of string literals, so
/// a lone brace inside a string doesn't stall the prompt forever.
fn is_balanced(source: &str) -> bool {
    let mut depth = 0i32;
    let mut in_string = false;
    for c in source.chars() {
        match c {
            '"' => in_string = !in_string,
            '{' | '(' if !in_string => depth += 1,
            '}' | ')' if !in_string => depth -= 1,
            _ => {}
        }
    }
    depth <= 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_statement_is_balanced() {
        assert!(is_balanced("print 1;\n"));
    }

    #[test]
    fn open_brace_is_unbalanced() {
        assert!(!is_balanced("function f() {\n"));
    }

    #[test]
    fn closing_brace_completes_balance() {
        assert!(is_balanced("function f() {\n print 1;\n }\n"));
    }

    #[test]
    fn brace_inside_string_is_ignored() {
        assert!(is_balanced(r#"print "{";"#));
    }
}
