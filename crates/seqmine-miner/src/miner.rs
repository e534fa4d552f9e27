//! The mining loop.

use crate::catalog::{Matcher, ProgramUpdater, SequenceCatalog, UpdateOutcome};
use crate::scheduler::AdaptiveScheduler;
use seqmine_core::{EvalConfig, Result, Sequence};
use seqmine_eval::Interpreter;
use seqmine_gen::{GeneratorConfig, MultiGenerator, Mutator, Stats};
use seqmine_lang::{util, Program};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

const BACKLOG_LIMIT: usize = 1000;
const CONSTANT_MUTANTS_PER_MATCH: usize = 100;
const REPORT_INTERVAL_SECONDS: u64 = 120;

/// A named mining profile: which generators to run, how aggressively
/// to mutate successful programs, and who to credit in found programs.
/// Profiles are stored as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinerProfile {
    pub name: String,
    pub generators: Vec<GeneratorConfig>,
    pub mutation_rate: f64,
    pub submitted_by: Option<String>,
}

impl Default for MinerProfile {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            generators: vec![GeneratorConfig::default()],
            mutation_rate: 0.3,
            submitted_by: None,
        }
    }
}

impl MinerProfile {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Counters reported by the mining loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MinerStats {
    pub generated: u64,
    pub fresh: u64,
    pub updated: u64,
    pub failed: u64,
    pub special: u64,
}

/// Drives generator, interpreter, matcher and updater. One miner owns
/// all of its collaborators; several miners run as independent
/// processes.
pub struct Miner<'a> {
    interpreter: Interpreter<'a>,
    catalog: &'a dyn SequenceCatalog,
    matcher: &'a dyn Matcher,
    updater: &'a mut dyn ProgramUpdater,
    multi_generator: MultiGenerator,
    mutator: Mutator,
    profile_name: String,
    submitted_by: Option<String>,
    num_terms: usize,
    use_steps: bool,
    backlog: Vec<Program>,
    stats: MinerStats,
}

impl<'a> Miner<'a> {
    pub fn new(
        profile: &MinerProfile,
        eval_config: EvalConfig,
        corpus_stats: &Stats,
        catalog: &'a dyn SequenceCatalog,
        matcher: &'a dyn Matcher,
        updater: &'a mut dyn ProgramUpdater,
        seed: u64,
    ) -> Result<Self> {
        let num_terms = eval_config.num_terms;
        let use_steps = eval_config.use_steps;
        let multi_generator =
            MultiGenerator::new(profile.generators.clone(), corpus_stats, seed)?;
        let mutator = Mutator::new(corpus_stats, profile.mutation_rate, seed.wrapping_add(1));
        Ok(Self {
            interpreter: Interpreter::new(eval_config),
            catalog,
            matcher,
            updater,
            multi_generator,
            mutator,
            profile_name: profile.name.clone(),
            submitted_by: profile.submitted_by.clone(),
            num_terms,
            use_steps,
            backlog: Vec::new(),
            stats: MinerStats::default(),
        })
    }

    pub fn stats(&self) -> MinerStats {
        self.stats
    }

    /// Seeds the candidate backlog, e.g. with programs to re-check.
    pub fn push_candidate(&mut self, program: Program) {
        self.backlog.push(program);
    }

    /// Processes one candidate program: evaluate, match, update, and
    /// feed mutants of successes back into the backlog.
    pub fn step(&mut self) {
        if self.backlog.is_empty() {
            self.multi_generator.next();
            let program = self.multi_generator.generator().generate();
            self.backlog.push(program);
        }
        let program = match self.backlog.pop() {
            Some(p) => p,
            None => return,
        };
        self.stats.generated += 1;

        // in step mode the mined sequence is the program's step counts
        let evaluated = if self.use_steps {
            self.interpreter
                .eval_with_steps(&program, self.num_terms)
                .map(|(_, steps)| Sequence::from(steps))
        } else {
            self.interpreter.eval(&program, self.num_terms)
        };
        let seq = match evaluated {
            Ok(seq) => seq,
            Err(e) => {
                debug!(error = %e, "evaluation failed");
                self.stats.failed += 1;
                return;
            }
        };

        let mut matched = false;
        let mut stamped: Option<Program> = None;
        for id in self.matcher.find_matches(self.catalog, &seq) {
            let stamped = stamped.get_or_insert_with(|| self.stamp_provenance(&program));
            match self.updater.update(id, stamped) {
                UpdateOutcome::Fresh => {
                    info!(id, "found program for new sequence");
                    self.stats.fresh += 1;
                    self.boost_active_generator(2, 0);
                    matched = true;
                }
                UpdateOutcome::Updated => {
                    info!(id, "found better program for known sequence");
                    self.stats.updated += 1;
                    self.boost_active_generator(1, 1);
                    matched = true;
                }
                UpdateOutcome::Rejected => {}
            }
        }
        if matched && self.backlog.len() < BACKLOG_LIMIT {
            self.mutator
                .mutate_constants(&program, CONSTANT_MUTANTS_PER_MATCH, &mut self.backlog);
        }
        if !matched && is_collatz_valuation(&seq) {
            info!(sequence = %seq, "found possible collatz-style valuation sequence");
            self.stats.special += 1;
            let stamped = self.stamp_provenance(&program);
            self.updater.report_special("collatz", &stamped, &seq);
        }
    }

    /// Stamps provenance comments on a found program: who submitted it
    /// and which miner profile produced it.
    fn stamp_provenance(&self, program: &Program) -> Program {
        let mut stamped = program.clone();
        if let Some(author) = &self.submitted_by {
            if util::get_comment_field(&stamped, util::PREFIX_SUBMITTED_BY).is_none() {
                util::add_comment(
                    &mut stamped,
                    format!("{} {}", util::PREFIX_SUBMITTED_BY, author),
                );
            }
        }
        util::remove_comment_field(&mut stamped, util::PREFIX_MINER_PROFILE);
        util::add_comment(
            &mut stamped,
            format!("{} {}", util::PREFIX_MINER_PROFILE, self.profile_name),
        );
        stamped
    }

    fn boost_active_generator(&mut self, factor: u64, add: u64) {
        let index = self.multi_generator.current_index();
        let replicas = self.multi_generator.replicas(index);
        self.multi_generator
            .set_replicas(index, replicas.saturating_mul(factor).saturating_add(add));
    }

    /// Mines until the halt flag is raised, logging progress
    /// periodically. In-flight evaluations finish before the loop
    /// exits.
    pub fn mine(&mut self, halt: &AtomicBool) {
        info!("mining programs for catalog sequences");
        let mut report = AdaptiveScheduler::new(REPORT_INTERVAL_SECONDS);
        while !halt.load(Ordering::Relaxed) {
            self.step();
            if report.is_target_reached() {
                report.reset();
                info!(
                    generated = self.stats.generated,
                    fresh = self.stats.fresh,
                    updated = self.stats.updated,
                    failed = self.stats.failed,
                    "mining progress"
                );
            }
        }
        info!("mining halted");
    }
}

/// Heuristic for Collatz-style valuation sequences, with terms indexed
/// by `n = i + 1`: the value at any even `n` must exceed the value at
/// `n / 2`, and the value at odd `n` must exceed the one at
/// `(3n + 1) / 2` when that index is known.
pub fn is_collatz_valuation(seq: &Sequence) -> bool {
    if seq.len() < 10 {
        return false;
    }
    for i in 1..seq.len() - 1 {
        let n = i + 1;
        if n % 2 == 0 {
            let j = (n / 2) - 1;
            if seq[j] >= seq[i] {
                return false;
            }
        } else {
            let j = (((3 * n) + 1) / 2) - 1;
            if j < seq.len() && seq[j] >= seq[i] {
                return false;
            }
        }
    }
    true
}
