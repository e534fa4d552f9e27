//! Core types for the seqmine integer-sequence program mining toolkit.

pub mod config;
pub mod error;
pub mod memory;
pub mod number;
pub mod semantics;
pub mod sequence;

pub use config::EvalConfig;
pub use error::{Error, Result};
pub use memory::Memory;
pub use number::Number;
pub use sequence::Sequence;
