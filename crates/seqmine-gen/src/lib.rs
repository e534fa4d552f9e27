//! Program search space exploration: exhaustive enumeration, random
//! generation and targeted mutation.

pub mod generator;
pub mod iterator;
pub mod mutator;
pub mod stats;

pub use generator::{Generator, GeneratorConfig, MultiGenerator};
pub use iterator::ProgramIterator;
pub use mutator::Mutator;
pub use stats::{RandomProgramIds, Stats};
