//! glitter-eval — runtime values, environments, and the evaluator.
//!
//! Implements spec §4.4 (`Environment`) and §4.5 (`Evaluator`) over an
//! AST that has already been through `glitter-resolve`.

mod environment;
mod evaluator;
mod value;

pub use environment::{EnvRef, Environment};
pub use evaluator::{Evaluator, Signal};
pub use value::{FunctionValue, NativeFunction, Value};
