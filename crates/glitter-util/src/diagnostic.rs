//! Diagnostics: the error taxonomy from the specification's error-handling
//! section, plus the [`Handler`] that scan/parse/resolve/eval phases report
//! into and that `Session::run` inspects before deciding whether to
//! evaluate at all.

use std::fmt;

use thiserror::Error;

use crate::span::Span;

/// Severity of a diagnostic. Only `Error` gates evaluation (see
/// `Handler::has_errors`); `Warning` and `Note` are collected for display
/// but never block a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Note,
    Warning,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Error => write!(f, "error"),
            Level::Warning => write!(f, "warning"),
            Level::Note => write!(f, "note"),
        }
    }
}

/// A single reportable problem: a severity, a human-readable message, and
/// the span of source text it concerns.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
    pub span: Span,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} (line {})",
            self.level, self.message, self.span.line
        )
    }
}

/// Fluent constructor for a [`Diagnostic`], mirroring the teacher's
/// `DiagnosticBuilder` API shape.
pub struct DiagnosticBuilder {
    level: Level,
    message: String,
    span: Option<Span>,
}

impl DiagnosticBuilder {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
            span: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: Level::Warning,
            message: message.into(),
            span: None,
        }
    }

    pub fn span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn emit(self, handler: &mut Handler) {
        handler.push(Diagnostic {
            level: self.level,
            message: self.message,
            span: self.span.unwrap_or_else(Span::dummy),
        });
    }
}

/// Collects diagnostics produced while scanning, parsing, resolving, and
/// evaluating a single `Session::run` call. Never panics on its own
/// account; it is the sink every phase reports errors into instead of
/// aborting early, so a run can surface every problem it found (the
/// parser's synchronizing recovery in particular depends on this).
#[derive(Default, Debug)]
pub struct Handler {
    diagnostics: Vec<Diagnostic>,
}

impl Handler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn error(&mut self, message: impl Into<String>, span: Span) {
        DiagnosticBuilder::error(message).span(span).emit(self);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.level == Level::Error)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Drains all collected diagnostics, leaving the handler empty so the
    /// same `Session` can reuse it for the next `run` call.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}

/// Errors the resolver can report. Each is reported through a [`Handler`]
/// as an `Error`-level [`Diagnostic`]; they gate evaluation the same way
/// scan/parse errors do.
#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("a variable named '{name}' is already declared in this scope")]
    DuplicateDeclaration { name: String, span: Span },

    #[error("cannot read local variable '{name}' in its own initializer")]
    SelfReferenceInInitializer { name: String, span: Span },

    #[error("cannot return from top-level code")]
    ReturnOutsideFunction { span: Span },
}

impl ResolverError {
    pub fn span(&self) -> &Span {
        match self {
            ResolverError::DuplicateDeclaration { span, .. }
            | ResolverError::SelfReferenceInInitializer { span, .. }
            | ResolverError::ReturnOutsideFunction { span } => span,
        }
    }
}

/// Errors the evaluator can report while running a fully resolved AST.
/// Each aborts evaluation of the current `run` but leaves the session's
/// root environment untouched (spec §7/§8 property 8).
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("LHS and RHS must be two numbers or strings")]
    AddOperandMismatch { span: Span },

    #[error("operands must be numbers")]
    NumericOperandMismatch { span: Span },

    #[error("operand must be a number")]
    UnaryOperandMismatch { span: Span },

    #[error("undefined variable '{name}'")]
    UndefinedVariable { name: String, span: Span },

    #[error("expected {expected} arguments but got {got}")]
    ArityMismatch {
        expected: usize,
        got: usize,
        span: Span,
    },

    #[error("can only call functions")]
    NotCallable { span: Span },
}

impl RuntimeError {
    pub fn span(&self) -> &Span {
        match self {
            RuntimeError::AddOperandMismatch { span }
            | RuntimeError::NumericOperandMismatch { span }
            | RuntimeError::UnaryOperandMismatch { span }
            | RuntimeError::UndefinedVariable { span, .. }
            | RuntimeError::ArityMismatch { span, .. }
            | RuntimeError::NotCallable { span } => span,
        }
    }
}

/// Converts a typed phase error into a generic [`Diagnostic`] for the
/// shared [`Handler`].
pub trait IntoDiagnostic {
    fn into_diagnostic(self) -> Diagnostic;
}

impl IntoDiagnostic for ResolverError {
    fn into_diagnostic(self) -> Diagnostic {
        let span = self.span().clone();
        Diagnostic {
            level: Level::Error,
            message: self.to_string(),
            span,
        }
    }
}

impl IntoDiagnostic for RuntimeError {
    fn into_diagnostic(self) -> Diagnostic {
        let span = self.span().clone();
        Diagnostic {
            level: Level::Error,
            message: self.to_string(),
            span,
        }
    }
}
