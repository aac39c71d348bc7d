//! Source location tracking.
//!
//! A [`Span`] identifies a range of source text by byte offset, together
//! with the 1-based line the range starts on. Every token and AST node
//! downstream of the scanner carries one, so diagnostics can always point
//! back at the exact source text that produced them.

use std::path::{Path, PathBuf};

/// A byte range in a single source file, plus the line it starts on.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Span {
    /// Path of the source file this span belongs to.
    pub file: PathBuf,
    /// Start byte offset (0-based).
    pub start: usize,
    /// Length in bytes.
    pub len: usize,
    /// Line number (1-based) the span starts on.
    pub line: u32,
}

impl Span {
    pub fn new(file: impl Into<PathBuf>, start: usize, len: usize, line: u32) -> Self {
        Self {
            file: file.into(),
            start,
            len,
            line,
        }
    }

    /// A span with no real source behind it, used for synthesized nodes
    /// (e.g. desugared `for` loops) that still need a span to satisfy the
    /// AST shape but whose exact column never gets printed in a diagnostic.
    pub fn dummy() -> Self {
        Self {
            file: PathBuf::new(),
            start: 0,
            len: 0,
            line: 0,
        }
    }

    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Merge two spans from the same file into one covering both.
    pub fn merge(&self, other: &Span) -> Span {
        let start = self.start.min(other.start);
        let end = self.end().max(other.end());
        Span {
            file: self.file.clone(),
            start,
            len: end - start,
            line: self.line.min(other.line),
        }
    }
}
