//! Operands and operations.

use seqmine_core::Number;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An operand of an operation: a literal value, a memory cell, or a
/// cell addressed through another cell.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Operand {
    Constant(Number),
    Direct(u64),
    Indirect(u64),
}

/// Discriminant of [`Operand`], used where only the addressing mode
/// matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperandKind {
    Constant,
    Direct,
    Indirect,
}

impl Operand {
    pub fn constant(value: u64) -> Self {
        Operand::Constant(Number::from(value))
    }

    pub fn kind(&self) -> OperandKind {
        match self {
            Operand::Constant(_) => OperandKind::Constant,
            Operand::Direct(_) => OperandKind::Direct,
            Operand::Indirect(_) => OperandKind::Indirect,
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Operand::Constant(_))
    }

    /// The referenced cell index for direct and indirect operands.
    pub fn cell(&self) -> Option<u64> {
        match self {
            Operand::Direct(i) | Operand::Indirect(i) => Some(*i),
            Operand::Constant(_) => None,
        }
    }

    /// The literal value of a constant operand.
    pub fn constant_value(&self) -> Option<&Number> {
        match self {
            Operand::Constant(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Constant(v) => write!(f, "{}", v),
            Operand::Direct(i) => write!(f, "${}", i),
            Operand::Indirect(i) => write!(f, "$${}", i),
        }
    }
}

/// Operation kinds of the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OpKind {
    Nop,
    Dbg,
    Mov,
    Add,
    Sub,
    Trn,
    Mul,
    Div,
    Dif,
    Mod,
    Pow,
    Gcd,
    Bin,
    Cmp,
    Fac,
    Log,
    Min,
    Max,
    Seq,
    Clr,
    Lpb,
    Lpe,
}

/// Per-kind metadata. Single source of truth consulted by the parser,
/// printer, validator, generator and rewriters; arity is never
/// hard-coded elsewhere.
#[derive(Debug, Clone, Copy)]
pub struct OpMeta {
    pub mnemonic: &'static str,
    pub num_operands: usize,
    pub reads_target: bool,
    pub writes_target: bool,
}

impl OpKind {
    pub const ALL: [OpKind; 22] = [
        OpKind::Nop,
        OpKind::Dbg,
        OpKind::Mov,
        OpKind::Add,
        OpKind::Sub,
        OpKind::Trn,
        OpKind::Mul,
        OpKind::Div,
        OpKind::Dif,
        OpKind::Mod,
        OpKind::Pow,
        OpKind::Gcd,
        OpKind::Bin,
        OpKind::Cmp,
        OpKind::Fac,
        OpKind::Log,
        OpKind::Min,
        OpKind::Max,
        OpKind::Seq,
        OpKind::Clr,
        OpKind::Lpb,
        OpKind::Lpe,
    ];

    pub fn meta(self) -> &'static OpMeta {
        const M: &[(OpKind, OpMeta)] = &[
            (OpKind::Nop, OpMeta { mnemonic: "nop", num_operands: 0, reads_target: false, writes_target: false }),
            (OpKind::Dbg, OpMeta { mnemonic: "dbg", num_operands: 0, reads_target: false, writes_target: false }),
            (OpKind::Mov, OpMeta { mnemonic: "mov", num_operands: 2, reads_target: false, writes_target: true }),
            (OpKind::Add, OpMeta { mnemonic: "add", num_operands: 2, reads_target: true, writes_target: true }),
            (OpKind::Sub, OpMeta { mnemonic: "sub", num_operands: 2, reads_target: true, writes_target: true }),
            (OpKind::Trn, OpMeta { mnemonic: "trn", num_operands: 2, reads_target: true, writes_target: true }),
            (OpKind::Mul, OpMeta { mnemonic: "mul", num_operands: 2, reads_target: true, writes_target: true }),
            (OpKind::Div, OpMeta { mnemonic: "div", num_operands: 2, reads_target: true, writes_target: true }),
            (OpKind::Dif, OpMeta { mnemonic: "dif", num_operands: 2, reads_target: true, writes_target: true }),
            (OpKind::Mod, OpMeta { mnemonic: "mod", num_operands: 2, reads_target: true, writes_target: true }),
            (OpKind::Pow, OpMeta { mnemonic: "pow", num_operands: 2, reads_target: true, writes_target: true }),
            (OpKind::Gcd, OpMeta { mnemonic: "gcd", num_operands: 2, reads_target: true, writes_target: true }),
            (OpKind::Bin, OpMeta { mnemonic: "bin", num_operands: 2, reads_target: true, writes_target: true }),
            (OpKind::Cmp, OpMeta { mnemonic: "cmp", num_operands: 2, reads_target: true, writes_target: true }),
            (OpKind::Fac, OpMeta { mnemonic: "fac", num_operands: 1, reads_target: true, writes_target: true }),
            (OpKind::Log, OpMeta { mnemonic: "log", num_operands: 2, reads_target: true, writes_target: true }),
            (OpKind::Min, OpMeta { mnemonic: "min", num_operands: 2, reads_target: true, writes_target: true }),
            (OpKind::Max, OpMeta { mnemonic: "max", num_operands: 2, reads_target: true, writes_target: true }),
            (OpKind::Seq, OpMeta { mnemonic: "seq", num_operands: 2, reads_target: true, writes_target: true }),
            (OpKind::Clr, OpMeta { mnemonic: "clr", num_operands: 2, reads_target: false, writes_target: true }),
            (OpKind::Lpb, OpMeta { mnemonic: "lpb", num_operands: 2, reads_target: true, writes_target: false }),
            (OpKind::Lpe, OpMeta { mnemonic: "lpe", num_operands: 0, reads_target: false, writes_target: false }),
        ];
        // kinds appear in declaration order
        &M[self as usize].1
    }

    pub fn mnemonic(self) -> &'static str {
        self.meta().mnemonic
    }

    pub fn from_mnemonic(name: &str) -> Option<OpKind> {
        let lower = name.to_ascii_lowercase();
        OpKind::ALL.iter().copied().find(|k| k.mnemonic() == lower)
    }
}

/// A single operation: kind, target and source operand, and an optional
/// free-form comment that execution ignores.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Operation {
    pub kind: OpKind,
    pub target: Operand,
    pub source: Operand,
    pub comment: Option<String>,
}

impl Operation {
    pub fn new(kind: OpKind) -> Self {
        Self {
            kind,
            target: Operand::constant(0),
            source: Operand::constant(0),
            comment: None,
        }
    }

    pub fn binary(kind: OpKind, target: Operand, source: Operand) -> Self {
        Self {
            kind,
            target,
            source,
            comment: None,
        }
    }

    pub fn nop() -> Self {
        Self::new(OpKind::Nop)
    }

    pub fn comment_only(text: impl Into<String>) -> Self {
        let mut op = Self::new(OpKind::Nop);
        op.comment = Some(text.into());
        op
    }

    /// Loop begin over a single counter cell.
    pub fn lpb(cell: u64) -> Self {
        Self::binary(OpKind::Lpb, Operand::Direct(cell), Operand::constant(1))
    }

    pub fn lpe() -> Self {
        Self::new(OpKind::Lpe)
    }

    pub fn meta(&self) -> &'static OpMeta {
        self.kind.meta()
    }
}

impl Default for Operation {
    fn default() -> Self {
        Self::nop()
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let meta = self.meta();
        let mut text = String::new();
        if meta.num_operands == 0 && self.kind != OpKind::Nop {
            text.push_str(meta.mnemonic);
        } else if meta.num_operands == 1
            || (self.kind == OpKind::Lpb && self.source == Operand::constant(1))
        {
            // lpb prints its region length only when it is not the default
            text = format!("{} {}", meta.mnemonic, self.target);
        } else if meta.num_operands == 2 {
            text = format!("{} {},{}", meta.mnemonic, self.target, self.source);
        }
        if let Some(comment) = &self.comment {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str("; ");
            text.push_str(comment);
        }
        write!(f, "{}", text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_table_is_aligned() {
        for kind in OpKind::ALL {
            // meta() indexes by discriminant; the mnemonic must resolve back
            assert_eq!(OpKind::from_mnemonic(kind.mnemonic()), Some(kind));
        }
    }

    #[test]
    fn test_arities() {
        assert_eq!(OpKind::Nop.meta().num_operands, 0);
        assert_eq!(OpKind::Lpe.meta().num_operands, 0);
        assert_eq!(OpKind::Fac.meta().num_operands, 1);
        assert_eq!(OpKind::Add.meta().num_operands, 2);
        assert_eq!(OpKind::Lpb.meta().num_operands, 2);
    }

    #[test]
    fn test_reads_writes() {
        assert!(!OpKind::Mov.meta().reads_target);
        assert!(OpKind::Mov.meta().writes_target);
        assert!(OpKind::Add.meta().reads_target);
        assert!(OpKind::Lpb.meta().reads_target);
        assert!(!OpKind::Lpb.meta().writes_target);
        assert!(!OpKind::Clr.meta().reads_target);
    }

    #[test]
    fn test_mnemonic_case_insensitive() {
        assert_eq!(OpKind::from_mnemonic("MOV"), Some(OpKind::Mov));
        assert_eq!(OpKind::from_mnemonic("Lpb"), Some(OpKind::Lpb));
        assert_eq!(OpKind::from_mnemonic("frobnicate"), None);
    }

    #[test]
    fn test_display() {
        let op = Operation::binary(OpKind::Mov, Operand::Direct(1), Operand::constant(2));
        assert_eq!(op.to_string(), "mov $1,2");
        assert_eq!(Operation::lpb(0).to_string(), "lpb $0");
        let lpb2 = Operation::binary(OpKind::Lpb, Operand::Direct(0), Operand::constant(2));
        assert_eq!(lpb2.to_string(), "lpb $0,2");
        assert_eq!(Operation::lpe().to_string(), "lpe");
        let op = Operation::binary(OpKind::Seq, Operand::Direct(0), Operand::constant(45));
        assert_eq!(op.to_string(), "seq $0,45");
        assert_eq!(Operation::comment_only("hello").to_string(), "; hello");
    }

    #[test]
    fn test_indirect_display() {
        let op = Operation::binary(OpKind::Add, Operand::Indirect(3), Operand::Direct(2));
        assert_eq!(op.to_string(), "add $$3,$2");
    }
}
