//! Incremental evaluation of canonical single-loop programs.
//!
//! A program of the shape `pre-loop · lpb · body · lpe · post-loop`
//! whose pre-loop is monotone in the input and whose body only
//! accumulates commutatively into the cells the post-loop reads can be
//! evaluated for successive inputs by appending loop iterations to a
//! carried state instead of re-running the loop from scratch.

use crate::interpreter::Interpreter;
use seqmine_core::{Error, Memory, Number, Result};
use seqmine_lang::{util, OpKind, Operand, OperandKind, Program};
use std::collections::HashSet;

pub struct IncrementalEvaluator<'i, 's> {
    interpreter: &'i Interpreter<'s>,

    // compiled shape, immutable after init
    pre_loop: Program,
    loop_body: Program,
    post_loop: Program,
    aggregation_cells: HashSet<u64>,
    loop_counter_cell: u64,
    initialized: bool,

    // runtime state
    argument: u64,
    previous_loop_count: u64,
    total_loop_steps: u64,
    loop_state: Memory,
}

impl<'i, 's> IncrementalEvaluator<'i, 's> {
    pub fn new(interpreter: &'i Interpreter<'s>) -> Self {
        Self {
            interpreter,
            pre_loop: Program::new(),
            loop_body: Program::new(),
            post_loop: Program::new(),
            aggregation_cells: HashSet::new(),
            loop_counter_cell: 0,
            initialized: false,
            argument: 0,
            previous_loop_count: 0,
            total_loop_steps: 0,
            loop_state: Memory::new(),
        }
    }

    pub fn reset(&mut self) {
        self.pre_loop = Program::new();
        self.loop_body = Program::new();
        self.post_loop = Program::new();
        self.aggregation_cells.clear();
        self.loop_counter_cell = 0;
        self.initialized = false;
        self.argument = 0;
        self.previous_loop_count = 0;
        self.total_loop_steps = 0;
        self.loop_state.clear();
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Static analysis: accepts the program iff it has the canonical
    /// shape. Returns `false` (not an error) when the shape does not
    /// apply and full evaluation must be used instead.
    pub fn init(&mut self, program: &Program) -> bool {
        self.reset();
        if !self.extract_fragments(program) {
            return false;
        }
        if !self.check_pre_loop() {
            return false;
        }
        if !self.check_post_loop() {
            return false;
        }
        if !self.check_loop_body() {
            return false;
        }
        self.initialized = true;
        true
    }

    /// Splits the program into pre-loop, body and post-loop around a
    /// single outermost loop with counter source 1.
    fn extract_fragments(&mut self, program: &Program) -> bool {
        let mut phase = 0;
        for op in &program.ops {
            if op.kind == OpKind::Nop {
                continue;
            }
            if op.kind == OpKind::Clr || util::has_indirect_operand(op) {
                return false;
            }
            if op.meta().num_operands > 0 && op.target.kind() == OperandKind::Constant {
                return false;
            }
            if op.kind == OpKind::Lpb {
                if phase != 0
                    || op.target.kind() != OperandKind::Direct
                    || op.source != Operand::constant(1)
                {
                    return false;
                }
                self.loop_counter_cell = match op.target.cell() {
                    Some(cell) => cell,
                    None => return false,
                };
                phase = 1;
                continue;
            }
            if op.kind == OpKind::Lpe {
                if phase != 1 {
                    return false;
                }
                phase = 2;
                continue;
            }
            match phase {
                0 => self.pre_loop.push(op.clone()),
                1 => self.loop_body.push(op.clone()),
                _ => self.post_loop.push(op.clone()),
            }
        }
        phase == 2
    }

    /// The pre-loop must keep the loop counter monotonically
    /// non-decreasing in the input argument.
    fn check_pre_loop(&self) -> bool {
        for op in &self.pre_loop.ops {
            match op.kind {
                // assigning is okay
                OpKind::Mov => {}
                // adding or subtracting constants is fine
                OpKind::Add | OpKind::Sub | OpKind::Trn => {
                    if !op.source.is_constant() {
                        return false;
                    }
                }
                // multiplying or dividing by constants is fine
                OpKind::Mul | OpKind::Div => {
                    if !op.source.is_constant() {
                        return false;
                    }
                }
                _ => return false,
            }
        }
        true
    }

    /// Every cell the post-loop reads becomes an aggregation cell; the
    /// output cell is one too unless the post-loop overwrites it
    /// without reading it first.
    fn check_post_loop(&mut self) -> bool {
        let mut is_overwriting_output = false;
        for op in &self.post_loop.ops {
            let meta = op.meta();
            if meta.num_operands > 0 {
                if let Some(target) = op.target.cell() {
                    if meta.reads_target {
                        self.aggregation_cells.insert(target);
                    } else if meta.writes_target && target == Program::OUTPUT_CELL {
                        is_overwriting_output = true;
                    }
                }
            }
            if meta.num_operands > 1 {
                if let Operand::Direct(source) = op.source {
                    self.aggregation_cells.insert(source);
                }
            }
        }
        if !is_overwriting_output {
            self.aggregation_cells.insert(Program::OUTPUT_CELL);
        }
        true
    }

    /// Writes to aggregation cells must be commutative accumulators;
    /// writes to the counter cell must decrease it by exactly one.
    fn check_loop_body(&self) -> bool {
        for op in &self.loop_body.ops {
            if op.meta().num_operands == 0 {
                continue;
            }
            let target = match op.target.cell() {
                Some(cell) => cell,
                None => return false,
            };
            if self.aggregation_cells.contains(&target)
                && op.kind != OpKind::Add
                && op.kind != OpKind::Mul
            {
                return false;
            }
            if target == self.loop_counter_cell {
                if op.kind != OpKind::Sub && op.kind != OpKind::Trn {
                    return false;
                }
                if op.source != Operand::constant(1) {
                    return false;
                }
            }
        }
        true
    }

    /// Computes the next term and its step count. Call `n` returns the
    /// value of the program at input `n`.
    pub fn next(&mut self) -> Result<(Number, u64)> {
        if !self.initialized {
            return Err(Error::Other(
                "incremental evaluator not initialized".to_string(),
            ));
        }

        // execute pre-loop code
        let mut tmp = Memory::new();
        tmp.set(Program::INPUT_CELL, Number::from(self.argument));
        let mut steps = self.interpreter.run(&self.pre_loop, &mut tmp)?;

        // calculate new loop count; it must be monotone in the input
        let new_loop_count = tmp
            .get(self.loop_counter_cell)
            .to_u64()
            .ok_or_else(|| Error::Other("unexpected loop count".to_string()))?;
        if new_loop_count < self.previous_loop_count {
            return Err(Error::Other("unexpected loop count".to_string()));
        }
        let mut additional_loops = new_loop_count - self.previous_loop_count;
        self.previous_loop_count = new_loop_count;

        // update loop state
        if self.argument == 0 {
            self.loop_state = tmp.clone();
        } else {
            self.loop_state
                .set(self.loop_counter_cell, Number::from(new_loop_count));
        }

        // append the additional loop iterations
        while additional_loops > 0 {
            self.total_loop_steps +=
                self.interpreter.run(&self.loop_body, &mut self.loop_state)? + 1; // +1 for lpe
            additional_loops -= 1;
        }

        // one rolled-back iteration is needed for the correct step count
        if self.argument == 0 {
            let mut scratch = self.loop_state.clone();
            self.total_loop_steps =
                self.total_loop_steps + self.interpreter.run(&self.loop_body, &mut scratch)? + 2; // +2 for lpb and lpe
        }
        steps += self.total_loop_steps;

        // execute post-loop code
        tmp = self.loop_state.clone();
        steps += self.interpreter.run(&self.post_loop, &mut tmp)?;

        self.argument += 1;
        Ok((tmp.get(Program::OUTPUT_CELL), steps))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seqmine_core::EvalConfig;
    use seqmine_lang::parse_str;

    const FIBONACCI: &str = "\
        mov $3,1\n\
        lpb $0\n\
        sub $0,1\n\
        mov $2,$1\n\
        add $1,$3\n\
        mov $3,$2\n\
        lpe\n\
        mov $0,$1\n";

    #[test]
    fn test_init_accepts_canonical_shape() {
        let program = parse_str(FIBONACCI).unwrap();
        let interpreter = Interpreter::new(EvalConfig::default());
        let mut inc = IncrementalEvaluator::new(&interpreter);
        assert!(inc.init(&program));
        assert!(inc.is_initialized());
    }

    #[test]
    fn test_init_rejects_nested_loops() {
        let program =
            parse_str("lpb $0\nlpb $1\nsub $1,1\nlpe\nsub $0,1\nlpe\nmov $0,$1\n").unwrap();
        let interpreter = Interpreter::new(EvalConfig::default());
        let mut inc = IncrementalEvaluator::new(&interpreter);
        assert!(!inc.init(&program));
    }

    #[test]
    fn test_init_rejects_indirect_operands() {
        let program = parse_str("lpb $0\nsub $0,1\nadd $1,$$2\nlpe\nmov $0,$1\n").unwrap();
        let interpreter = Interpreter::new(EvalConfig::default());
        let mut inc = IncrementalEvaluator::new(&interpreter);
        assert!(!inc.init(&program));
    }

    #[test]
    fn test_init_rejects_clr() {
        let program = parse_str("lpb $0\nsub $0,1\nclr $1,2\nlpe\nmov $0,$1\n").unwrap();
        let interpreter = Interpreter::new(EvalConfig::default());
        let mut inc = IncrementalEvaluator::new(&interpreter);
        assert!(!inc.init(&program));
    }

    #[test]
    fn test_init_rejects_missing_loop() {
        let program = parse_str("add $0,1\n").unwrap();
        let interpreter = Interpreter::new(EvalConfig::default());
        let mut inc = IncrementalEvaluator::new(&interpreter);
        assert!(!inc.init(&program));
    }

    #[test]
    fn test_init_rejects_region_loops() {
        let program = parse_str("lpb $0,2\nsub $0,1\nlpe\nmov $0,$1\n").unwrap();
        let interpreter = Interpreter::new(EvalConfig::default());
        let mut inc = IncrementalEvaluator::new(&interpreter);
        assert!(!inc.init(&program));
    }

    #[test]
    fn test_init_rejects_non_monotone_pre_loop() {
        // pre-loop subtracting a cell is not provably monotone
        let program = parse_str("sub $0,$2\nlpb $0\nsub $0,1\nlpe\nmov $0,$1\n").unwrap();
        let interpreter = Interpreter::new(EvalConfig::default());
        let mut inc = IncrementalEvaluator::new(&interpreter);
        assert!(!inc.init(&program));
    }

    #[test]
    fn test_init_rejects_non_commutative_aggregation() {
        // post-loop reads $1, but the body overwrites it with mov
        let program = parse_str("lpb $0\nsub $0,1\nmov $1,$0\nlpe\nmov $0,$1\n").unwrap();
        let interpreter = Interpreter::new(EvalConfig::default());
        let mut inc = IncrementalEvaluator::new(&interpreter);
        assert!(!inc.init(&program));
    }

    #[test]
    fn test_incremental_agrees_with_full_evaluation() {
        let program = parse_str(FIBONACCI).unwrap();
        let interpreter = Interpreter::new(EvalConfig::default());
        let mut inc = IncrementalEvaluator::new(&interpreter);
        assert!(inc.init(&program));
        let (full, full_steps) = interpreter.eval_with_steps(&program, 100).unwrap();
        for n in 0..100 {
            let (term, steps) = inc.next().unwrap();
            assert_eq!(term, full[n], "value mismatch at n={}", n);
            assert_eq!(steps, full_steps[n], "steps mismatch at n={}", n);
        }
    }

    #[test]
    fn test_sum_aggregation() {
        // a(n) = n*(n+1)/2 as a plain accumulator loop
        let program = parse_str("lpb $0\nadd $1,$0\nsub $0,1\nlpe\nmov $0,$1\n").unwrap();
        let interpreter = Interpreter::new(EvalConfig::default());
        let mut inc = IncrementalEvaluator::new(&interpreter);
        assert!(inc.init(&program));
        let full = interpreter.eval(&program, 20).unwrap();
        for n in 0..20 {
            let (term, _) = inc.next().unwrap();
            assert_eq!(term, full[n]);
            assert_eq!(term, Number::from((n * (n + 1) / 2) as u64));
        }
    }

    #[test]
    fn test_next_requires_init() {
        let interpreter = Interpreter::new(EvalConfig::default());
        let mut inc = IncrementalEvaluator::new(&interpreter);
        assert!(inc.next().is_err());
    }
}
