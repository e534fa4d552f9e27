//! Program structure.

use crate::operation::{OpKind, Operand, Operation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A program: an ordered, finite sequence of operations. Valid programs
/// have balanced `lpb`/`lpe` nesting. The input argument is placed in
/// cell 0 and the result is read from cell 0 after execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Program {
    pub ops: Vec<Operation>,
}

impl Program {
    pub const INPUT_CELL: u64 = 0;
    pub const OUTPUT_CELL: u64 = 0;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ops(ops: Vec<Operation>) -> Self {
        Self { ops }
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn push(&mut self, op: Operation) {
        self.ops.push(op);
    }

    pub fn push_binary(&mut self, kind: OpKind, target: Operand, source: Operand) {
        self.ops.push(Operation::binary(kind, target, source));
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut indent = 0usize;
        for op in &self.ops {
            if op.kind == OpKind::Lpe {
                indent = indent.saturating_sub(2);
            }
            writeln!(f, "{:indent$}{}", "", op, indent = indent)?;
            if op.kind == OpKind::Lpb {
                indent += 2;
            }
        }
        Ok(())
    }
}

impl FromStr for Program {
    type Err = seqmine_core::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parse::parse_str(s)
    }
}
