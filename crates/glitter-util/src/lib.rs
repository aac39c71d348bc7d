//! glitter-util — shared span and diagnostic plumbing.
//!
//! Every crate in the Glitter pipeline (`glitter-lex`, `glitter-parse`,
//! `glitter-resolve`, `glitter-eval`) depends on this crate for [`Span`]
//! and the [`Handler`]/[`Diagnostic`] pair used to accumulate errors
//! without aborting a phase early.

mod diagnostic;
mod span;

pub use diagnostic::{
    Diagnostic, DiagnosticBuilder, Handler, IntoDiagnostic, Level, ResolverError, RuntimeError,
};
pub use span::Span;

pub use rustc_hash::FxHashMap;
