//! Corpus statistics driving weighted sampling.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use seqmine_lang::{util, OpKind, Operation, Program};
use std::collections::{BTreeMap, BTreeSet};

/// Aggregated statistics over a corpus of found programs. The v2
/// generator and the mutator sample from these histograms.
#[derive(Debug, Clone, Default)]
pub struct Stats {
    pub num_programs: u64,
    /// constant source value -> occurrences (small constants only)
    pub num_constants: BTreeMap<i64, u64>,
    /// full operation (without comment) -> occurrences
    pub num_operations: BTreeMap<Operation, u64>,
    /// operation kind -> occurrences
    pub num_operation_kinds: BTreeMap<OpKind, u64>,
    /// program length bucket -> number of programs
    pub num_programs_per_length: Vec<u64>,
    /// ids of sequences with a known program
    pub program_ids: BTreeSet<u64>,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_program_stats(&mut self, id: u64, program: &Program) {
        self.num_programs += 1;
        self.program_ids.insert(id);
        let length = util::num_ops(program, false);
        if self.num_programs_per_length.len() <= length {
            self.num_programs_per_length.resize(length + 1, 0);
        }
        self.num_programs_per_length[length] += 1;
        for op in &program.ops {
            if op.kind == OpKind::Nop {
                continue;
            }
            if let Some(value) = op.source.constant_value().and_then(|v| v.to_i64()) {
                *self.num_constants.entry(value).or_insert(0) += 1;
            }
            let mut key = op.clone();
            key.comment = None;
            *self.num_operations.entry(key).or_insert(0) += 1;
            *self.num_operation_kinds.entry(op.kind).or_insert(0) += 1;
        }
    }
}

/// Uniform sampling over the program ids known to the corpus.
#[derive(Debug, Clone, Default)]
pub struct RandomProgramIds {
    ids: Vec<u64>,
}

impl RandomProgramIds {
    pub fn new(stats: &Stats) -> Self {
        Self {
            ids: stats.program_ids.iter().copied().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn exists(&self, id: u64) -> bool {
        self.ids.binary_search(&id).is_ok()
    }

    pub fn get(&self, rng: &mut ChaCha8Rng) -> u64 {
        if self.ids.is_empty() {
            0
        } else {
            self.ids[rng.gen_range(0..self.ids.len())]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use seqmine_lang::parse_str;

    #[test]
    fn test_update_program_stats() {
        let mut stats = Stats::new();
        let p = parse_str("mov $1,2\nadd $1,$0\nlpb $0\n  sub $0,1\nlpe\nmov $0,$1\n").unwrap();
        stats.update_program_stats(45, &p);
        assert_eq!(stats.num_programs, 1);
        assert!(stats.program_ids.contains(&45));
        assert_eq!(stats.num_programs_per_length[6], 1);
        assert_eq!(stats.num_constants.get(&2), Some(&1));
        assert_eq!(stats.num_operation_kinds.get(&OpKind::Mov), Some(&2));
        assert_eq!(stats.num_operation_kinds.get(&OpKind::Sub), Some(&1));
    }

    #[test]
    fn test_random_program_ids() {
        let mut stats = Stats::new();
        let p = parse_str("add $0,1\n").unwrap();
        stats.update_program_stats(7, &p);
        stats.update_program_stats(12, &p);
        let ids = RandomProgramIds::new(&stats);
        assert!(ids.exists(7));
        assert!(ids.exists(12));
        assert!(!ids.exists(8));
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..10 {
            let id = ids.get(&mut rng);
            assert!(id == 7 || id == 12);
        }
    }

    #[test]
    fn test_empty_ids() {
        let ids = RandomProgramIds::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(ids.is_empty());
        assert_eq!(ids.get(&mut rng), 0);
    }
}
