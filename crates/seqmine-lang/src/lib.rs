//! The seqmine program language.
//!
//! Programs are flat sequences of operations over a sparse memory of
//! arbitrary-precision cells. The model is designed to be:
//! - Mutation-friendly: random edits preserve structural validity
//! - Enumerable: programs form a total order for exhaustive search
//! - Round-trippable: a line-oriented text format with comments
//!
//! Execution semantics live in `seqmine-eval`; this crate owns the
//! model, the text format and the structural utilities.

pub mod operation;
pub mod parse;
pub mod program;
pub mod util;

pub use operation::{OpKind, OpMeta, Operand, OperandKind, Operation};
pub use parse::{parse_lines, parse_str};
pub use program::Program;
