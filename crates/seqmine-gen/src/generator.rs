//! Randomized program generation.

use crate::stats::Stats;
use rand::distributions::{Distribution, WeightedIndex};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use seqmine_core::Number;
use seqmine_lang::{OpKind, Operand, Operation, Program};
use serde::{Deserialize, Serialize};
use tracing::debug;

// kinds emitted by the uniform sampling strategy
const V1_KINDS: &[OpKind] = &[
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
];

/// Configuration of one generator instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Sampling strategy: 1 = uniform, 2 = weighted by corpus stats
    pub version: u32,
    /// Target number of operations
    pub length: usize,
    /// Upper bound for constant source values
    pub max_constant: u64,
    /// Upper bound for direct cell indices
    pub max_index: u64,
    /// Whether loops may be emitted
    pub loops: bool,
    /// Whether indirect operands may be emitted
    pub indirect_access: bool,
    /// Optional program text seeding every generated program
    pub program_template: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            version: 1,
            length: 30,
            max_constant: 4,
            max_index: 4,
            loops: true,
            indirect_access: false,
            program_template: None,
        }
    }
}

/// Randomized program generator with structural post-processing. All
/// randomness flows through one seeded generator, so output is a pure
/// function of (config, stats, seed).
pub struct Generator {
    config: GeneratorConfig,
    rng: ChaCha8Rng,
    template: Program,
    // v2 sampling state
    length_dist: Option<WeightedIndex<u64>>,
    operations: Vec<Operation>,
    operation_dist: Option<WeightedIndex<u64>>,
}

impl Generator {
    pub fn new(config: GeneratorConfig, seed: u64) -> seqmine_core::Result<Self> {
        Self::with_stats(config, &Stats::new(), seed)
    }

    pub fn with_stats(
        config: GeneratorConfig,
        stats: &Stats,
        seed: u64,
    ) -> seqmine_core::Result<Self> {
        let template = match &config.program_template {
            Some(text) => seqmine_lang::parse_str(text)?,
            None => Program::new(),
        };
        let mut length_dist = None;
        let mut operations = Vec::new();
        let mut operation_dist = None;
        if config.version >= 2 {
            if !stats.num_programs_per_length.is_empty() {
                length_dist = WeightedIndex::new(
                    stats.num_programs_per_length.iter().map(|c| c + 1),
                )
                .ok();
            }
            let mut weights = Vec::new();
            for (op, count) in &stats.num_operations {
                if config.loops || (op.kind != OpKind::Lpb && op.kind != OpKind::Lpe) {
                    operations.push(op.clone());
                    weights.push(count + 1);
                }
            }
            if !operations.is_empty() {
                operation_dist = WeightedIndex::new(weights).ok();
            }
        }
        Ok(Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
            template,
            length_dist,
            operations,
            operation_dist,
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generates one program: random fill followed by the repair
    /// pipeline that makes it structurally meaningful.
    pub fn generate(&mut self) -> Program {
        let mut p = self.template.clone();
        let length = match &self.length_dist {
            Some(dist) => dist.sample(&mut self.rng).max(2),
            None => self.config.length,
        };
        self.generate_stateless(&mut p, length);
        let written_cells = fix_causality(&mut p);
        ensure_source_not_overwritten(&mut p);
        self.ensure_target_written(&mut p, &written_cells);
        self.ensure_meaningful_loops(&mut p);
        fix_causality(&mut p);
        debug!(ops = p.len(), "generated program");
        p
    }

    /// Draws one operation and a relative insertion position.
    fn generate_operation(&mut self) -> (Operation, f64) {
        let position = self.rng.gen_range(0.0..1.0);
        if let (Some(dist), false) = (&self.operation_dist, self.operations.is_empty()) {
            let op = self.operations[dist.sample(&mut self.rng)].clone();
            return (op, position);
        }
        let mut kinds: Vec<OpKind> = V1_KINDS.to_vec();
        if self.config.loops {
            kinds.push(OpKind::Lpb);
        }
        let kind = kinds[self.rng.gen_range(0..kinds.len())];
        let target = Operand::Direct(self.rng.gen_range(0..=self.config.max_index));
        let source = if kind == OpKind::Lpb {
            Operand::constant(1)
        } else if self.rng.gen_bool(0.5) {
            Operand::Constant(Number::from(
                self.rng.gen_range(0..=self.config.max_constant),
            ))
        } else if self.config.indirect_access && self.rng.gen_bool(0.1) {
            Operand::Indirect(self.rng.gen_range(0..=self.config.max_index))
        } else {
            Operand::Direct(self.rng.gen_range(0..=self.config.max_index))
        };
        (Operation::binary(kind, target, source), position)
    }

    /// Fills the program with random operations; a loop begin gets its
    /// matching end inserted somewhere after it.
    fn generate_stateless(&mut self, p: &mut Program, num_operations: usize) {
        let mut nops = 0usize;
        while p.ops.len() + nops < num_operations {
            let (op, position) = self.generate_operation();
            if op.kind == OpKind::Nop || op.kind == OpKind::Lpe {
                nops += 1;
                continue;
            }
            let mut pos = (position * (p.ops.len() + 1) as f64) as usize;
            p.ops.insert(pos.min(p.ops.len()), op.clone());
            if op.kind == OpKind::Lpb {
                pos = ((pos + p.ops.len()) / 2) + 1;
                p.ops.insert(pos.min(p.ops.len()), Operation::lpe());
            }
        }
    }

    /// Appends a write to the output area when no operation produces
    /// one.
    fn ensure_target_written(&mut self, p: &mut Program, written_cells: &[u64]) {
        let written = p.ops.iter().any(|op| {
            op.kind != OpKind::Lpb
                && op.meta().num_operands == 2
                && op.target == Operand::Direct(1)
        });
        if !written {
            let source = if written_cells.is_empty() {
                0
            } else {
                written_cells[self.rng.gen_range(0..written_cells.len())]
            };
            p.push_binary(OpKind::Mov, Operand::Direct(1), Operand::Direct(source));
        }
    }

    /// Makes every loop body able to decrease its counter and gives
    /// bodies of fewer than two operations some substance.
    fn ensure_meaningful_loops(&mut self, p: &mut Program) {
        // (counter cell, can descend, body op count) per open loop
        let mut open_loops: Vec<(u64, bool, usize)> = Vec::new();
        let mut i = 0usize;
        while i < p.ops.len() {
            match p.ops[i].kind {
                OpKind::Lpb => {
                    let counter_cell = p.ops[i].target.cell().unwrap_or(0);
                    open_loops.push((counter_cell, false, 0));
                }
                OpKind::Lpe => {
                    if let Some((counter_cell, can_descend, num_ops)) = open_loops.pop() {
                        if !can_descend {
                            let constant = self.rng.gen_range(1..=4u64);
                            let (kind, constant) = match self.rng.gen_range(0..3) {
                                0 => (OpKind::Sub, constant),
                                1 => (OpKind::Div, constant + 1),
                                _ => (OpKind::Mod, constant + 1),
                            };
                            let dec = Operation::binary(
                                kind,
                                Operand::Direct(counter_cell),
                                Operand::Constant(Number::from(constant)),
                            );
                            p.ops.insert(i, dec);
                            i += 1;
                        }
                        if num_ops < 2 {
                            for _ in 0..self.rng.gen_range(1..=3) {
                                let (op, _) = self.generate_operation();
                                if op.kind != OpKind::Lpb && op.kind != OpKind::Lpe {
                                    p.ops.insert(i, op);
                                    i += 1;
                                }
                            }
                        }
                    }
                }
                kind => {
                    if let Some(top) = open_loops.last_mut() {
                        top.2 += 1;
                        let can_decrease = matches!(
                            kind,
                            OpKind::Sub
                                | OpKind::Trn
                                | OpKind::Log
                                | OpKind::Mov
                                | OpKind::Div
                                | OpKind::Mod
                                | OpKind::Gcd
                                | OpKind::Bin
                                | OpKind::Cmp
                        );
                        if can_decrease && p.ops[i].target.cell() == Some(top.0) {
                            top.1 = true;
                        }
                    }
                }
            }
            i += 1;
        }
    }
}

/// Remaps direct reads of never-written cells onto cells that have
/// been written before, left to right. Cell 0 always counts as
/// written. Returns the written cells in first-write order.
pub fn fix_causality(p: &mut Program) -> Vec<u64> {
    let mut written_cells: Vec<u64> = vec![0];
    for op in &mut p.ops {
        let meta = op.meta();

        // fix the source operand
        if meta.num_operands == 2 {
            if let Operand::Direct(source) = op.source {
                if !written_cells.contains(&source) {
                    op.source =
                        Operand::Direct(written_cells[source as usize % written_cells.len()]);
                }
            }
        }

        // fix the target operand of reading operations
        if meta.num_operands > 0 && meta.reads_target {
            if let Operand::Direct(target) = op.target {
                if !written_cells.contains(&target) {
                    let mut index = target as usize % written_cells.len();
                    if op.source == Operand::Direct(written_cells[index]) {
                        index = written_cells.len() - index - 1;
                    }
                    op.target = Operand::Direct(written_cells[index]);
                }
            }
        }

        // record freshly written cells
        if meta.writes_target {
            if let Operand::Direct(target) = op.target {
                if !written_cells.contains(&target) {
                    written_cells.push(target);
                }
            }
        }
    }
    written_cells
}

/// Deletes leading operations that would clobber the input argument
/// before anything reads it.
pub fn ensure_source_not_overwritten(p: &mut Program) {
    let mut i = 0usize;
    while i < p.ops.len() {
        let op = &p.ops[i];
        let clobbers_input = op.target == Operand::Direct(0)
            && (op.kind == OpKind::Mov
                || ((op.kind == OpKind::Sub || op.kind == OpKind::Trn)
                    && op.source.cell() == Some(0)));
        if clobbers_input {
            p.ops.remove(i);
            continue;
        }
        if op.source.cell() == Some(0) {
            break;
        }
        i += 1;
    }
}

/// Configured generators scheduled proportionally to their replica
/// weights. Successful configurations earn more replicas from the
/// mining loop.
pub struct MultiGenerator {
    entries: Vec<(Generator, u64)>,
    index: usize,
    budget: u64,
}

impl MultiGenerator {
    pub fn new(
        configs: Vec<GeneratorConfig>,
        stats: &Stats,
        seed: u64,
    ) -> seqmine_core::Result<Self> {
        let mut entries = Vec::new();
        for (i, config) in configs.into_iter().enumerate() {
            let generator = Generator::with_stats(config, stats, seed.wrapping_add(i as u64))?;
            entries.push((generator, 1));
        }
        let budget = entries.first().map(|(_, r)| *r).unwrap_or(0);
        Ok(Self {
            entries,
            index: 0,
            budget,
        })
    }

    pub fn num_generators(&self) -> usize {
        self.entries.len()
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn replicas(&self, index: usize) -> u64 {
        self.entries[index].1
    }

    pub fn set_replicas(&mut self, index: usize, replicas: u64) {
        self.entries[index].1 = replicas.max(1);
    }

    /// Advances the round-robin schedule; must be called before taking
    /// the current generator.
    pub fn next(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        if self.budget == 0 {
            self.index = (self.index + 1) % self.entries.len();
            self.budget = self.entries[self.index].1;
        }
        self.budget -= 1;
    }

    pub fn generator(&mut self) -> &mut Generator {
        &mut self.entries[self.index].0
    }
}
