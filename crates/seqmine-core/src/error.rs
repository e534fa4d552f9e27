//! Error types shared across the toolkit.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error at line {line}: {msg}")]
    Parse { line: usize, msg: String },

    #[error("invalid program: {0}")]
    InvalidProgram(String),

    #[error("exceeded maximum number of cycles ({0})")]
    CyclesExceeded(u64),

    #[error("exceeded maximum number of memory cells ({0})")]
    MemoryExceeded(u64),

    #[error("invalid loop region length")]
    InvalidLoopLength,

    #[error("program {0} not found")]
    ProgramNotFound(u64),

    #[error("cyclic dependency on program {0}")]
    CyclicDependency(u64),

    #[error("maximum call depth exceeded")]
    CallDepthExceeded,

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("checkpoint error: {0}")]
    Checkpoint(String),

    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
