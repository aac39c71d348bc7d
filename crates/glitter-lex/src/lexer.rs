//! The scanner: source text -> lazy token stream.
//!
//! Implements spec §4.1 in full: punctuator/operator dispatch, whitespace
//! and comment coalescing into a single `Whitespace` token, number and
//! string literals, identifier/keyword classification, and the
//! unexpected-character error. `Scanner` is an `Iterator<Item = Token>`
//! that always ends with exactly one `Eof` token (spec §8 property 1).

use glitter_util::{Handler, Span};

use crate::cursor::Cursor;
use crate::token::{Token, TokenKind};
use std::path::{Path, PathBuf};

/// Controls whether [`Scanner`] yields `Whitespace` tokens or swallows them
/// silently. `Eof` is always emitted regardless of this flag.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScanConfig {
    pub emit_whitespace: bool,
}

pub struct Scanner<'a> {
    cursor: Cursor<'a>,
    path: PathBuf,
    config: ScanConfig,
    handler: &'a mut Handler,
    done: bool,
    /// Kind of the last non-whitespace token produced, used to disambiguate
    /// a `-` immediately before a digit: it starts a negative literal only
    /// where a binary `-` couldn't appear (start of input, or right after
    /// an operator/punctuator/keyword), never right after a value.
    prev_significant: Option<TokenKind>,
}

impl<'a> Scanner<'a> {
    pub fn new(
        source: &'a str,
        path: impl AsRef<Path>,
        config: ScanConfig,
        handler: &'a mut Handler,
    ) -> Self {
        Self {
            cursor: Cursor::new(source),
            path: path.as_ref().to_path_buf(),
            config,
            handler,
            done: false,
            prev_significant: None,
        }
    }

    /// Whether the previous significant token leaves `-` in binary-operator
    /// position (a value or a closing paren just ended), as opposed to
    /// unary/literal position.
    fn prev_ends_a_value(&self) -> bool {
        matches!(
            self.prev_significant,
            Some(
                TokenKind::Number(_)
                    | TokenKind::Str(_)
                    | TokenKind::Identifier(_)
                    | TokenKind::RightParen
                    | TokenKind::True
                    | TokenKind::False
                    | TokenKind::Undefined
                    | TokenKind::This
            )
        )
    }

    fn span(&self, start: usize, line: u32) -> Span {
        Span::new(self.path.clone(), start, self.cursor.position() - start, line)
    }

    fn report(&mut self, message: impl Into<String>, start: usize, line: u32) {
        let span = self.span(start, line);
        self.handler.error(message, span);
    }

    /// Skips runs of whitespace and comments, reporting an error for an
    /// unterminated block comment. Returns whether anything was skipped.
    fn skip_whitespace_and_comments(&mut self) -> bool {
        let mut skipped = false;
        loop {
            match self.cursor.current() {
                ' ' | '\t' | '\r' | '\n' => {
                    self.cursor.advance();
                    skipped = true;
                }
                '/' if self.cursor.peek_next() == '/' => {
                    while self.cursor.current() != '\n' && !self.cursor.is_at_end() {
                        self.cursor.advance();
                    }
                    skipped = true;
                }
                '/' if self.cursor.peek_next() == '*' => {
                    let start = self.cursor.position();
                    let line = self.cursor.line();
                    self.cursor.advance();
                    self.cursor.advance();
                    let mut closed = false;
                    while !self.cursor.is_at_end() {
                        if self.cursor.current() == '*' && self.cursor.peek_next() == '/' {
                            self.cursor.advance();
                            self.cursor.advance();
                            closed = true;
                            break;
                        }
                        self.cursor.advance();
                    }
                    if !closed {
                        self.report("unterminated block comment", start, line);
                    }
                    skipped = true;
                }
                _ => break,
            }
        }
        skipped
    }

    /// Produces the next token. Never returns `None`-equivalent; callers
    /// that want a finite stream use the `Iterator` impl, which stops
    /// after yielding `Eof` once.
    pub fn next_token(&mut self) -> Token {
        let ws_start = self.cursor.position();
        let ws_line = self.cursor.line();
        if self.skip_whitespace_and_comments() && self.config.emit_whitespace {
            let lexeme = self.cursor.slice(ws_start, self.cursor.position()).to_string();
            return Token::new(TokenKind::Whitespace, lexeme, self.span(ws_start, ws_line));
        }

        let start = self.cursor.position();
        let line = self.cursor.line();

        if self.cursor.is_at_end() {
            return Token::new(TokenKind::Eof, String::new(), self.span(start, line));
        }

        let c = self.cursor.current();
        let kind = if c == '-' && self.cursor.peek_next().is_ascii_digit() && !self.prev_ends_a_value() {
            self.lex_number()
        } else {
            match c {
                '(' => self.simple(TokenKind::LeftParen),
                ')' => self.simple(TokenKind::RightParen),
                '{' => self.simple(TokenKind::LeftBrace),
                '}' => self.simple(TokenKind::RightBrace),
                ',' => self.simple(TokenKind::Comma),
                '.' => self.simple(TokenKind::Dot),
                '-' => self.simple(TokenKind::Minus),
                '+' => self.simple(TokenKind::Plus),
                ';' => self.simple(TokenKind::Semicolon),
                '*' => self.simple(TokenKind::Star),
                '!' => self.two_char('=', TokenKind::BangEqual, TokenKind::Bang),
                '=' => self.two_char('=', TokenKind::EqualEqual, TokenKind::Equal),
                '<' => self.two_char('=', TokenKind::LessEqual, TokenKind::Less),
                '>' => self.two_char('=', TokenKind::GreaterEqual, TokenKind::Greater),
                '/' => self.simple(TokenKind::Slash),
                '"' => self.lex_string(start, line),
                c if c.is_ascii_digit() => self.lex_number(),
                c if is_ident_start(c) => self.lex_identifier(),
                c => {
                    self.cursor.advance();
                    self.report(format!("unexpected character '{c}'"), start, line);
                    TokenKind::Invalid
                }
            }
        };

        self.prev_significant = Some(kind.clone());
        let lexeme = self.cursor.slice(start, self.cursor.position()).to_string();
        Token::new(kind, lexeme, self.span(start, line))
    }

    fn simple(&mut self, kind: TokenKind) -> TokenKind {
        self.cursor.advance();
        kind
    }

    fn two_char(&mut self, second: char, matched: TokenKind, unmatched: TokenKind) -> TokenKind {
        self.cursor.advance();
        if self.cursor.matches(second) {
            matched
        } else {
            unmatched
        }
    }

    /// Lexes a number literal, including the leading-minus rule from §4.1:
    /// a `-` directly followed by a digit is part of the literal rather
    /// than the `Minus` operator, except where `prev_ends_a_value` says
    /// the `-` is sitting right after a value and so must be binary.
    fn lex_number(&mut self) -> TokenKind {
        let start = self.cursor.position();
        if self.cursor.current() == '-' {
            self.cursor.advance();
        }
        while self.cursor.current().is_ascii_digit() {
            self.cursor.advance();
        }
        if self.cursor.current() == '.' && self.cursor.peek_next().is_ascii_digit() {
            self.cursor.advance();
            while self.cursor.current().is_ascii_digit() {
                self.cursor.advance();
            }
        }
        let text = self.cursor.slice(start, self.cursor.position());
        let value: f64 = text.parse().unwrap_or(f64::NAN);
        TokenKind::Number(value)
    }

    /// Lexes a string literal. Strings may span newlines; no escape
    /// processing is performed in this core (spec §4.1).
    fn lex_string(&mut self, start: usize, line: u32) -> TokenKind {
        self.cursor.advance(); // opening quote
        let content_start = self.cursor.position();
        while self.cursor.current() != '"' && !self.cursor.is_at_end() {
            self.cursor.advance();
        }
        if self.cursor.is_at_end() {
            self.report("unterminated string", start, line);
            let text = self.cursor.slice(content_start, self.cursor.position());
            return TokenKind::Str(text.to_string());
        }
        let text = self.cursor.slice(content_start, self.cursor.position()).to_string();
        self.cursor.advance(); // closing quote
        TokenKind::Str(text)
    }

    fn lex_identifier(&mut self) -> TokenKind {
        let start = self.cursor.position();
        while is_ident_continue(self.cursor.current()) {
            self.cursor.advance();
        }
        let text = self.cursor.slice(start, self.cursor.position());
        TokenKind::keyword(text).unwrap_or_else(|| TokenKind::Identifier(text.to_string()))
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.done {
            return None;
        }
        let token = self.next_token();
        if token.is_eof() {
            self.done = true;
        }
        Some(token)
    }
}
