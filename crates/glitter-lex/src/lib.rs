//! glitter-lex — the Glitter scanner.
//!
//! Turns UTF-8 source text into a lazy stream of [`Token`]s terminated by
//! exactly one `Eof`, per spec §4.1 and §8 property 1.

mod cursor;
mod lexer;
mod token;

pub use lexer::{ScanConfig, Scanner};
pub use token::{Token, TokenKind};
