//! Evaluation facade choosing between incremental and full evaluation.

use crate::incremental::IncrementalEvaluator;
use crate::interpreter::{CheckStatus, Interpreter};
use seqmine_core::{Result, Sequence};
use seqmine_lang::Program;
use tracing::debug;

/// Evaluates programs to sequences, using the incremental evaluator
/// whenever the program has the canonical loop shape.
pub struct Evaluator<'s> {
    interpreter: Interpreter<'s>,
}

impl<'s> Evaluator<'s> {
    pub fn new(interpreter: Interpreter<'s>) -> Self {
        Self { interpreter }
    }

    pub fn interpreter(&self) -> &Interpreter<'s> {
        &self.interpreter
    }

    /// Evaluates the first `num_terms` terms of the program's sequence.
    pub fn eval(&self, program: &Program, num_terms: usize) -> Result<Sequence> {
        let mut inc = IncrementalEvaluator::new(&self.interpreter);
        if inc.init(program) {
            debug!("using incremental evaluation");
            let mut seq = Sequence::new();
            for _ in 0..num_terms {
                let (term, _) = inc.next()?;
                seq.push(term);
            }
            return Ok(seq);
        }
        self.interpreter.eval(program, num_terms)
    }

    /// Checks the program against expected terms; see
    /// [`Interpreter::check`].
    pub fn check(
        &self,
        program: &Program,
        expected: &Sequence,
        required_prefix: usize,
        id: u64,
    ) -> Result<CheckStatus> {
        self.interpreter.check(program, expected, required_prefix, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seqmine_core::EvalConfig;
    use seqmine_lang::parse_str;

    #[test]
    fn test_eval_uses_incremental_path() {
        let program =
            parse_str("mov $3,1\nlpb $0\nsub $0,1\nmov $2,$1\nadd $1,$3\nmov $3,$2\nlpe\nmov $0,$1\n")
                .unwrap();
        let evaluator = Evaluator::new(Interpreter::new(EvalConfig::default()));
        let seq = evaluator.eval(&program, 10).unwrap();
        assert_eq!(seq.to_string(), "0,1,1,2,3,5,8,13,21,34");
    }

    #[test]
    fn test_eval_falls_back_to_full() {
        // nested loops reject the incremental shape
        let program = parse_str(
            "lpb $0\nmov $2,$0\nlpb $2\nadd $1,1\nsub $2,1\nlpe\nsub $0,1\nlpe\nmov $0,$1\n",
        )
        .unwrap();
        let evaluator = Evaluator::new(Interpreter::new(EvalConfig::default()));
        let seq = evaluator.eval(&program, 5).unwrap();
        // a(n) = n + (n-1) + ... + 1
        assert_eq!(seq.to_string(), "0,1,3,6,10");
    }
}
