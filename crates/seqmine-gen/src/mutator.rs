//! Targeted small edits on programs.

use crate::stats::{RandomProgramIds, Stats};
use rand::distributions::{Distribution, WeightedIndex};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use seqmine_core::Number;
use seqmine_lang::{util, OpKind, Operand, Operation, Program};

const CONSTANTS_START: i64 = -100;
const CONSTANTS_END: i64 = 1000;

/// Produces small program variants: random operation edits weighted by
/// corpus statistics, and neighborhoods of constant perturbations.
pub struct Mutator {
    mutation_rate: f64,
    constants: Vec<i64>,
    constants_dist: WeightedIndex<u64>,
    operation_kinds: Vec<OpKind>,
    operation_kinds_dist: WeightedIndex<u64>,
    program_ids: RandomProgramIds,
    rng: ChaCha8Rng,
}

impl Mutator {
    pub fn new(stats: &Stats, mutation_rate: f64, seed: u64) -> Self {
        // constants distribution from stats, with add-one smoothing so
        // unseen values stay reachable
        let constants: Vec<i64> = (CONSTANTS_START..=CONSTANTS_END).collect();
        let constants_dist = WeightedIndex::new(
            constants
                .iter()
                .map(|c| stats.num_constants.get(c).copied().unwrap_or(0) + 1),
        )
        .expect("constant weights are positive");

        // operation kind distribution from stats
        let operation_kinds: Vec<OpKind> = OpKind::ALL
            .iter()
            .copied()
            .filter(|k| util::is_arithmetic(*k))
            .collect();
        let operation_kinds_dist = WeightedIndex::new(
            operation_kinds
                .iter()
                .map(|k| stats.num_operation_kinds.get(k).copied().unwrap_or(0) + 1),
        )
        .expect("operation weights are positive");

        Self {
            mutation_rate,
            constants,
            constants_dist,
            operation_kinds,
            operation_kinds_dist,
            program_ids: RandomProgramIds::new(stats),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// A mutation position, stepping off loop boundaries into the body.
    fn random_position(&mut self, program: &Program) -> usize {
        let mut pos = self.rng.gen_range(0..program.ops.len());
        if program.ops[pos].kind == OpKind::Lpb && pos + 1 < program.ops.len() {
            pos += 1;
        }
        if program.ops[pos].kind == OpKind::Lpe && pos > 0 {
            pos -= 1;
        }
        pos
    }

    /// Applies `~rate * |program|` random mutations in place, at least
    /// one. Each mutation either edits an existing operation or
    /// inserts a fresh one and edits that.
    pub fn mutate_random(&mut self, program: &mut Program) {
        let num_cells = util::get_largest_direct_cell(program) + 1;
        let bound = (program.ops.len() as f64 * self.mutation_rate) as u64 + 1;
        let mut num_mutations = self.rng.gen_range(0..bound);
        if self.mutation_rate > 0.0 {
            num_mutations += 1;
        }
        for _ in 0..num_mutations {
            let pos = if program.ops.is_empty() || self.rng.gen_bool(0.5) {
                let pos = if program.ops.is_empty() {
                    0
                } else {
                    self.rng.gen_range(0..program.ops.len())
                };
                program.ops.insert(
                    pos,
                    Operation::binary(OpKind::Mov, Operand::Direct(0), Operand::constant(0)),
                );
                pos
            } else {
                self.random_position(program)
            };
            self.mutate_operation(&mut program.ops[pos], num_cells);
        }
    }

    fn mutate_operation(&mut self, op: &mut Operation, num_cells: u64) {
        if util::is_arithmetic(op.kind) {
            op.kind = self.operation_kinds[self.operation_kinds_dist.sample(&mut self.rng)];
            if self.rng.gen_range(0..3) != 0 {
                let value = self.constants[self.constants_dist.sample(&mut self.rng)];
                op.source = Operand::Constant(Number::from_i64_clamped(value));
            } else {
                op.source = Operand::Direct(self.rng.gen_range(0..num_cells));
            }
            op.target = Operand::Direct(self.rng.gen_range(0..num_cells));
            util::avoid_nop_or_overflow(op);
        } else if op.kind == OpKind::Seq {
            let id = self.program_ids.get(&mut self.rng);
            op.source = Operand::Constant(Number::from(id));
        }
    }

    /// Pushes variants of the program where one constant is perturbed
    /// by small deltas around its original value.
    pub fn mutate_constants(&self, program: &Program, num_results: usize, result: &mut Vec<Program>) {
        let mut indices = Vec::new();
        for (i, op) in program.ops.iter().enumerate() {
            if op.meta().num_operands == 2 && op.source.is_constant() {
                indices.push(i);
            }
        }
        if indices.is_empty() {
            return;
        }
        let var = std::cmp::max(1, (num_results / indices.len()) as i64);
        for i in indices {
            let base = match program.ops[i].source.constant_value().and_then(|v| v.to_i64()) {
                Some(b) => b,
                None => continue, // out of the perturbation range
            };
            let start = base - std::cmp::min(var / 2, base);
            for value in start..=start + var {
                if value != base {
                    let mut p = program.clone();
                    p.ops[i].source = Operand::Constant(Number::from_i64_clamped(value));
                    result.push(p);
                }
            }
        }
    }

    /// Produces `n/2` constant mutants plus `n/2` random mutants.
    pub fn mutate_copies(&mut self, program: &Program, num_results: usize, result: &mut Vec<Program>) {
        let half = num_results / 2;
        self.mutate_constants(program, half, result);
        for _ in 0..half {
            let mut p = program.clone();
            self.mutate_random(&mut p);
            result.push(p);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seqmine_lang::parse_str;

    fn mutator(rate: f64) -> Mutator {
        Mutator::new(&Stats::new(), rate, 42)
    }

    #[test]
    fn test_mutate_random_changes_program() {
        let original = parse_str("mov $1,2\nadd $1,$0\nmov $0,$1\n").unwrap();
        let mut m = mutator(1.0);
        let mut changed = false;
        for _ in 0..10 {
            let mut p = original.clone();
            m.mutate_random(&mut p);
            assert!(util::validate(&p).is_ok());
            if p != original {
                changed = true;
            }
        }
        assert!(changed);
    }

    #[test]
    fn test_mutate_random_preserves_loop_structure() {
        let original = parse_str("lpb $0\nadd $1,$0\nsub $0,1\nlpe\nmov $0,$1\n").unwrap();
        let mut m = mutator(1.0);
        for _ in 0..20 {
            let mut p = original.clone();
            m.mutate_random(&mut p);
            assert!(util::validate(&p).is_ok(), "invalid after mutation:\n{}", p);
            assert_eq!(util::num_ops_of_kind(&p, OpKind::Lpb), 1);
            assert_eq!(util::num_ops_of_kind(&p, OpKind::Lpe), 1);
        }
    }

    #[test]
    fn test_mutated_ops_avoid_nops() {
        let original = parse_str("add $1,$0\nsub $1,3\nmul $1,2\n").unwrap();
        let mut m = mutator(1.0);
        for _ in 0..20 {
            let mut p = original.clone();
            m.mutate_random(&mut p);
            for op in &p.ops {
                assert!(!util::is_nop(op), "mutated into a nop: {}", op);
            }
        }
    }

    #[test]
    fn test_mutate_constants() {
        let program = parse_str("mov $1,10\nadd $1,$0\n").unwrap();
        let m = mutator(0.5);
        let mut result = Vec::new();
        m.mutate_constants(&program, 8, &mut result);
        assert!(!result.is_empty());
        for p in &result {
            assert_eq!(p.len(), program.len());
            assert_ne!(p, &program);
            // only the constant differs
            assert_eq!(p.ops[1], program.ops[1]);
            assert_eq!(p.ops[0].kind, OpKind::Mov);
        }
    }

    #[test]
    fn test_mutate_constants_without_constants() {
        let program = parse_str("add $1,$0\n").unwrap();
        let m = mutator(0.5);
        let mut result = Vec::new();
        m.mutate_constants(&program, 10, &mut result);
        assert!(result.is_empty());
    }

    #[test]
    fn test_mutate_copies_count() {
        let program = parse_str("mov $1,10\nadd $1,$0\n").unwrap();
        let mut m = mutator(0.5);
        let mut result = Vec::new();
        m.mutate_copies(&program, 10, &mut result);
        assert!(result.len() >= 5);
    }

    #[test]
    fn test_determinism() {
        let program = parse_str("mov $1,2\nadd $1,$0\n").unwrap();
        let mut a = mutator(1.0);
        let mut b = mutator(1.0);
        for _ in 0..5 {
            let mut pa = program.clone();
            let mut pb = program.clone();
            a.mutate_random(&mut pa);
            b.mutate_random(&mut pb);
            assert_eq!(pa, pb);
        }
    }

    #[test]
    fn test_seq_mutation_uses_known_ids() {
        let mut stats = Stats::new();
        let p = parse_str("add $0,1\n").unwrap();
        stats.update_program_stats(7, &p);
        stats.update_program_stats(12, &p);
        let mut m = Mutator::new(&stats, 1.0, 3);
        let mut op = Operation::binary(OpKind::Seq, Operand::Direct(0), Operand::constant(45));
        m.mutate_operation(&mut op, 2);
        let id = op.source.constant_value().unwrap().to_u64().unwrap();
        assert!(id == 7 || id == 12);
    }
}
