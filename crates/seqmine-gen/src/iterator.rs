//! Exhaustive enumeration of well-formed programs in a total order.

use seqmine_core::Number;
use seqmine_lang::{util, OpKind, Operand, Operation, Program};
use tracing::trace;

// curated kind order for enumeration; nop, dbg, clr, seq, fac, log,
// min and max are excluded
const KIND_ORDER: &[OpKind] = &[
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
    OpKind::Lpb,
    OpKind::Lpe,
];

/// Enumerates valid programs in a total order: a ripple-carry counter
/// over operations, growing the program when every position overflows.
#[derive(Debug, Clone, Default)]
pub struct ProgramIterator {
    program: Program,
    size: usize,
    skipped: u64,
}

impl ProgramIterator {
    // never overwrite the input cell with the smallest operation
    fn smallest_operation() -> Operation {
        Operation::binary(OpKind::Mov, Operand::Direct(1), Operand::constant(0))
    }

    pub fn new() -> Self {
        Self::default()
    }

    /// Number of structurally invalid candidates skipped so far.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    fn inc_operand(size: usize, operand: &mut Operand, direct_allowed: bool) -> bool {
        let value = match operand {
            Operand::Constant(v) => v.to_u64().unwrap_or(u64::MAX),
            Operand::Direct(i) | Operand::Indirect(i) => *i,
        };
        if value.saturating_mul(4) < size as u64 {
            *operand = match operand {
                Operand::Constant(_) => Operand::Constant(Number::from(value + 1)),
                Operand::Direct(_) => Operand::Direct(value + 1),
                Operand::Indirect(_) => Operand::Indirect(value + 1),
            };
            return true;
        }
        match operand {
            Operand::Constant(_) => {
                if direct_allowed {
                    *operand = Operand::Direct(0);
                    true
                } else {
                    false
                }
            }
            // indirect memory access is excluded from enumeration
            Operand::Direct(_) | Operand::Indirect(_) => false,
        }
    }

    fn inc_operation(size: usize, op: &mut Operation) -> bool {
        if op.kind == OpKind::Lpe {
            return false;
        }

        // try to increase the source operand
        if Self::inc_operand(size, &mut op.source, op.kind != OpKind::Lpb) {
            return true;
        }
        op.source = Operand::constant(0);

        // try to increase the target operand
        if Self::inc_operand(size, &mut op.target, true) {
            return true;
        }
        op.target = Operand::Direct(0);

        // advance the kind through the curated order
        let pos = KIND_ORDER.iter().position(|k| *k == op.kind);
        match pos {
            Some(i) if i + 1 < KIND_ORDER.len() => {
                op.kind = KIND_ORDER[i + 1];
                true
            }
            _ => false,
        }
    }

    /// Skips trivially reducible operations during enumeration.
    fn should_skip(op: &Operation) -> bool {
        if util::is_nop(op) {
            return true;
        }
        // operations that can be expressed in a simpler way
        if op.source == op.target
            && matches!(
                op.kind,
                OpKind::Add
                    | OpKind::Sub
                    | OpKind::Trn
                    | OpKind::Mul
                    | OpKind::Div
                    | OpKind::Dif
                    | OpKind::Mod
                    | OpKind::Gcd
                    | OpKind::Bin
                    | OpKind::Cmp
            )
        {
            return true;
        }
        if op.source == Operand::constant(0)
            && matches!(
                op.kind,
                OpKind::Mul
                    | OpKind::Div
                    | OpKind::Dif
                    | OpKind::Mod
                    | OpKind::Pow
                    | OpKind::Gcd
                    | OpKind::Bin
                    | OpKind::Lpb
            )
        {
            return true;
        }
        if op.source == Operand::constant(1)
            && matches!(
                op.kind,
                OpKind::Mod | OpKind::Pow | OpKind::Gcd | OpKind::Bin
            )
        {
            return true;
        }
        false
    }

    fn inc_with_skip(size: usize, op: &mut Operation) -> bool {
        loop {
            if !Self::inc_operation(size, op) {
                return false;
            }
            if !Self::should_skip(op) {
                return true;
            }
        }
    }

    /// Produces the next valid program, skipping invalid candidates.
    pub fn next(&mut self) -> Program {
        loop {
            self.do_next();
            match util::validate(&self.program) {
                Ok(()) => break,
                Err(_) => {
                    trace!(skipped = self.skipped, "skipping invalid candidate");
                    self.skipped += 1;
                }
            }
        }
        self.program.clone()
    }

    fn do_next(&mut self) {
        let mut increased = false;
        let size = self.size;
        let mut i = size as i64;
        while i > 0 {
            i -= 1;
            let pos = i as usize;
            if Self::inc_with_skip(size, &mut self.program.ops[pos]) {
                increased = true;

                // a fresh loop too close to the end can never be closed
                if self.program.ops[pos].kind == OpKind::Lpb && pos + 3 > self.size {
                    self.program.ops[pos] = Operation::lpe();
                }
                // an lpe directly after an lpb makes an empty loop
                if self.program.ops[pos].kind == OpKind::Lpe
                    && pos > 0
                    && self.program.ops[pos - 1].kind == OpKind::Lpb
                {
                    increased = false;
                }
            }
            if increased {
                break;
            }
            self.program.ops[pos] = Self::smallest_operation();
        }
        if !increased {
            self.program.ops.insert(0, Self::smallest_operation());
            self.size = self.program.ops.len();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_first_programs() {
        let mut it = ProgramIterator::new();
        assert_eq!(it.next().to_string(), "mov $1,0\n");
        assert_eq!(it.next().to_string(), "mov $1,1\n");
        assert_eq!(it.next().to_string(), "mov $1,$0\n");
    }

    #[test]
    fn test_all_emitted_programs_are_valid() {
        let mut it = ProgramIterator::new();
        for _ in 0..2000 {
            let p = it.next();
            assert!(util::validate(&p).is_ok());
        }
    }

    #[test]
    fn test_no_duplicates() {
        let mut it = ProgramIterator::new();
        let mut seen = HashSet::new();
        for _ in 0..2000 {
            let p = it.next();
            assert!(seen.insert(p.to_string()), "duplicate: {}", p);
        }
    }

    #[test]
    fn test_skips_trivially_reducible_ops() {
        let mut it = ProgramIterator::new();
        for _ in 0..2000 {
            let p = it.next();
            for op in &p.ops {
                assert!(!ProgramIterator::should_skip(op), "reducible: {}", op);
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let mut a = ProgramIterator::new();
        let mut b = ProgramIterator::new();
        for _ in 0..500 {
            assert_eq!(a.next(), b.next());
        }
    }

    #[test]
    fn test_eventually_emits_loops() {
        let mut it = ProgramIterator::new();
        let mut found_loop = false;
        for _ in 0..200_000 {
            let p = it.next();
            if p.ops.iter().any(|op| op.kind == OpKind::Lpb) {
                found_loop = true;
                break;
            }
        }
        assert!(found_loop);
    }
}
