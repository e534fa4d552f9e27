//! The program interpreter.

use crate::store::{EmptyStore, ProgramStore};
use seqmine_core::{semantics, EvalConfig, Error, Memory, Number, Result, Sequence};
use seqmine_lang::{OpKind, Operand, Program};
use std::collections::HashSet;
use tracing::{debug, trace};

static EMPTY_STORE: EmptyStore = EmptyStore;

/// Result of checking a program against expected sequence terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    /// All available terms match
    Ok,
    /// The required prefix matches but later terms diverge
    Warning,
    /// The required prefix itself diverges
    Error,
}

/// One open loop: where its body starts, which region it watches, and
/// the memory at the start of the current iteration. The loop
/// continues while the region strictly decreases; the failing final
/// iteration is rolled back to `mem_snapshot`.
struct LoopFrame {
    body_start: usize,
    counter_start: u64,
    region: Vec<Number>,
    mem_snapshot: Memory,
}

/// Per-run bookkeeping shared across `seq` recursion.
struct RunState {
    total_steps: u64,
    call_stack: HashSet<u64>,
    depth: usize,
}

/// Executes programs against a memory, counting executed operations.
pub struct Interpreter<'s> {
    config: EvalConfig,
    store: &'s dyn ProgramStore,
}

impl<'s> Interpreter<'s> {
    pub fn new(config: EvalConfig) -> Self {
        Self {
            config,
            store: &EMPTY_STORE,
        }
    }

    pub fn with_store(config: EvalConfig, store: &'s dyn ProgramStore) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Runs `program` on `mem` and returns the number of executed
    /// operations, counting loop bodies once per iteration.
    pub fn run(&self, program: &Program, mem: &mut Memory) -> Result<u64> {
        let mut state = RunState {
            total_steps: 0,
            call_stack: HashSet::new(),
            depth: 0,
        };
        self.run_inner(program, mem, &mut state)
    }

    fn run_inner(&self, program: &Program, mem: &mut Memory, state: &mut RunState) -> Result<u64> {
        let start_steps = state.total_steps;
        let mut loop_stack: Vec<LoopFrame> = Vec::new();
        let mut pc = 0usize;
        while pc < program.ops.len() {
            let op = &program.ops[pc];
            state.total_steps += 1;
            if state.total_steps > self.config.max_cycles {
                return Err(Error::CyclesExceeded(self.config.max_cycles));
            }
            match op.kind {
                OpKind::Nop => {}
                OpKind::Dbg => trace!(memory = %mem, "dbg"),
                OpKind::Lpb => {
                    let counter_start = self.resolve_target_cell(&op.target, mem)?;
                    let length = self.resolve_region_length(&op.source, mem)?;
                    loop_stack.push(LoopFrame {
                        body_start: pc + 1,
                        counter_start,
                        region: mem.region(counter_start, length),
                        mem_snapshot: mem.clone(),
                    });
                }
                OpKind::Lpe => {
                    let frame = loop_stack
                        .last_mut()
                        .ok_or_else(|| Error::InvalidProgram("unexpected lpe".to_string()))?;
                    if mem.region_less_than(frame.counter_start, &frame.region) {
                        // counter region strictly decreased: next iteration
                        frame.region =
                            mem.region(frame.counter_start, frame.region.len() as u64);
                        frame.mem_snapshot = mem.clone();
                        pc = frame.body_start;
                        continue;
                    }
                    // roll back the failed final iteration
                    let frame = loop_stack.pop().ok_or_else(|| {
                        Error::InvalidProgram("unexpected lpe".to_string())
                    })?;
                    *mem = frame.mem_snapshot;
                }
                OpKind::Clr => {
                    let start = self.resolve_target_cell(&op.target, mem)?;
                    let length = self.resolve_region_length(&op.source, mem)?;
                    mem.clear_region(start, length);
                }
                OpKind::Seq => {
                    let target = self.resolve_target_cell(&op.target, mem)?;
                    let argument = mem.get(target);
                    let id = self
                        .resolve_source_value(op, mem)?
                        .to_u64()
                        .ok_or_else(|| Error::InvalidProgram("invalid program id".to_string()))?;
                    let result = self.call_program(id, argument, state)?;
                    self.write_cell(mem, target, result)?;
                }
                OpKind::Mov => {
                    let target = self.resolve_target_cell(&op.target, mem)?;
                    let value = self.resolve_source_value(op, mem)?;
                    self.write_cell(mem, target, value)?;
                }
                OpKind::Fac => {
                    let target = self.resolve_target_cell(&op.target, mem)?;
                    let value = semantics::fac(&mem.get(target));
                    self.write_cell(mem, target, value)?;
                }
                kind => {
                    let target = self.resolve_target_cell(&op.target, mem)?;
                    let t = mem.get(target);
                    let s = self.resolve_source_value(op, mem)?;
                    let value = match kind {
                        OpKind::Add => semantics::add(&t, &s),
                        OpKind::Sub | OpKind::Trn => semantics::sub(&t, &s),
                        OpKind::Mul => semantics::mul(&t, &s),
                        OpKind::Div => semantics::div(&t, &s),
                        OpKind::Dif => semantics::dif(&t, &s),
                        OpKind::Mod => semantics::modulo(&t, &s),
                        OpKind::Pow => semantics::pow(&t, &s),
                        OpKind::Gcd => semantics::gcd(&t, &s),
                        OpKind::Bin => semantics::bin(&t, &s),
                        OpKind::Cmp => semantics::cmp(&t, &s),
                        OpKind::Min => semantics::min(&t, &s),
                        OpKind::Max => semantics::max(&t, &s),
                        OpKind::Log => semantics::log(&t, &s),
                        _ => {
                            return Err(Error::InvalidProgram(format!(
                                "unsupported operation: {}",
                                op
                            )));
                        }
                    };
                    self.write_cell(mem, target, value)?;
                }
            }
            pc += 1;
        }
        if !loop_stack.is_empty() {
            return Err(Error::InvalidProgram("unbalanced loop".to_string()));
        }
        Ok(state.total_steps - start_steps)
    }

    fn call_program(&self, id: u64, argument: Number, state: &mut RunState) -> Result<Number> {
        let callee = self
            .store
            .get(id)
            .ok_or(Error::ProgramNotFound(id))?;
        if !state.call_stack.insert(id) {
            return Err(Error::CyclicDependency(id));
        }
        if state.depth + 1 > self.config.max_call_depth {
            state.call_stack.remove(&id);
            return Err(Error::CallDepthExceeded);
        }
        state.depth += 1;
        let mut mem = Memory::new();
        mem.set(Program::INPUT_CELL, argument);
        let result = self.run_inner(callee, &mut mem, state);
        state.depth -= 1;
        state.call_stack.remove(&id);
        result?;
        Ok(mem.get(Program::OUTPUT_CELL))
    }

    fn resolve_target_cell(&self, operand: &Operand, mem: &Memory) -> Result<u64> {
        let cell = match operand {
            Operand::Direct(i) => *i,
            Operand::Indirect(i) => mem
                .get(*i)
                .to_u64()
                .ok_or_else(|| Error::InvalidProgram("invalid indirect index".to_string()))?,
            Operand::Constant(_) => {
                return Err(Error::InvalidProgram("constant target operand".to_string()));
            }
        };
        if cell > self.config.max_memory {
            return Err(Error::MemoryExceeded(self.config.max_memory));
        }
        Ok(cell)
    }

    fn resolve_source_value(&self, op: &seqmine_lang::Operation, mem: &Memory) -> Result<Number> {
        match &op.source {
            Operand::Constant(v) => Ok(v.clone()),
            Operand::Direct(i) => Ok(mem.get(*i)),
            Operand::Indirect(i) => {
                let index = mem
                    .get(*i)
                    .to_u64()
                    .ok_or_else(|| Error::InvalidProgram("invalid indirect index".to_string()))?;
                if index > self.config.max_memory {
                    return Err(Error::MemoryExceeded(self.config.max_memory));
                }
                Ok(mem.get(index))
            }
        }
    }

    fn resolve_region_length(&self, source: &Operand, mem: &Memory) -> Result<u64> {
        let value = match source {
            Operand::Constant(v) => v.clone(),
            Operand::Direct(i) => mem.get(*i),
            Operand::Indirect(_) => return Err(Error::InvalidLoopLength),
        };
        let length = value.to_u64().ok_or(Error::InvalidLoopLength)?;
        if length > self.config.max_memory {
            return Err(Error::InvalidLoopLength);
        }
        Ok(length.max(1))
    }

    fn write_cell(&self, mem: &mut Memory, cell: u64, value: Number) -> Result<()> {
        mem.set(cell, value);
        if mem.num_nonzero_cells() as u64 > self.config.max_memory {
            return Err(Error::MemoryExceeded(self.config.max_memory));
        }
        Ok(())
    }

    /// Evaluates `a(0), a(1), …` for `num_terms` inputs, with a fresh
    /// memory per input.
    pub fn eval(&self, program: &Program, num_terms: usize) -> Result<Sequence> {
        Ok(self.eval_with_steps(program, num_terms)?.0)
    }

    /// Like [`Interpreter::eval`], additionally reporting the step
    /// count of every evaluation.
    pub fn eval_with_steps(
        &self,
        program: &Program,
        num_terms: usize,
    ) -> Result<(Sequence, Vec<u64>)> {
        let mut seq = Sequence::new();
        let mut steps = Vec::with_capacity(num_terms);
        for n in 0..num_terms {
            let mut mem = Memory::new();
            mem.set(Program::INPUT_CELL, Number::from(n as u64));
            steps.push(self.run(program, &mut mem)?);
            seq.push(mem.get(Program::OUTPUT_CELL));
        }
        Ok((seq, steps))
    }

    /// Compares program output against expected terms. `Error` means
    /// the required prefix diverges; `Warning` means only later terms
    /// do; resource exhaustion past the required prefix also degrades
    /// to `Warning`.
    pub fn check(
        &self,
        program: &Program,
        expected: &Sequence,
        required_prefix: usize,
        id: u64,
    ) -> Result<CheckStatus> {
        for n in 0..expected.len() {
            let mut mem = Memory::new();
            mem.set(Program::INPUT_CELL, Number::from(n as u64));
            let term = match self.run(program, &mut mem) {
                Ok(_) => mem.get(Program::OUTPUT_CELL),
                Err(e) => {
                    debug!(id, term = n, error = %e, "evaluation failed during check");
                    return Ok(if n < required_prefix {
                        CheckStatus::Error
                    } else {
                        CheckStatus::Warning
                    });
                }
            };
            if term != expected[n] {
                return Ok(if n < required_prefix {
                    CheckStatus::Error
                } else {
                    CheckStatus::Warning
                });
            }
        }
        Ok(CheckStatus::Ok)
    }
}
