//! glitter-parse — recursive-descent parser for Glitter.
//!
//! Consumes the token stream from `glitter-lex` and produces an AST per
//! spec §4.2, reporting syntax errors into a shared `Handler` and
//! resynchronizing instead of aborting on the first one.

mod ast;
mod parser;
mod stmt;

use glitter_lex::{ScanConfig, Scanner};
use glitter_util::Handler;
use std::path::Path;

pub use ast::*;
pub use parser::Parser;

/// Scans and parses `source` in one call, returning the resulting program.
/// Errors are reported into `handler`; callers should check
/// `handler.has_errors()` before trusting the returned AST for anything
/// beyond further diagnostics.
pub fn parse(source: &str, path: impl AsRef<Path>, handler: &mut Handler) -> Program {
    let tokens: Vec<_> = Scanner::new(source, path, ScanConfig::default(), handler).collect();
    let mut parser = Parser::new(tokens, handler);
    parser.parse_program()
}
