//! Program execution for the seqmine toolkit.
//!
//! The [`Interpreter`] runs a program against a [`seqmine_core::Memory`]
//! with saturating big-integer semantics and configurable resource
//! ceilings. The [`IncrementalEvaluator`] recognizes programs of the
//! canonical single-loop shape and computes successive sequence terms
//! without re-running the loop from scratch. The [`Evaluator`] facade
//! picks the incremental path when it applies and falls back to full
//! evaluation otherwise.

pub mod evaluator;
pub mod incremental;
pub mod interpreter;
pub mod store;

pub use evaluator::Evaluator;
pub use incremental::IncrementalEvaluator;
pub use interpreter::{CheckStatus, Interpreter};
pub use store::{InMemoryStore, ProgramStore};
