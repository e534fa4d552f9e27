//! Catalog and updater interfaces the mining loop consumes.

use seqmine_core::Sequence;
use seqmine_lang::{util, Program};
use std::collections::BTreeMap;

/// One catalog sequence: its identifier, known terms, and how many
/// leading terms a program must reproduce to count as a match.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub id: u64,
    pub name: String,
    pub terms: Sequence,
    pub required_prefix: usize,
}

/// Read-only access to the reference catalog.
pub trait SequenceCatalog {
    fn get(&self, id: u64) -> Option<&CatalogEntry>;
    fn entries(&self) -> Box<dyn Iterator<Item = &CatalogEntry> + '_>;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A catalog held in memory, keyed by id.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCatalog {
    entries: BTreeMap<u64, CatalogEntry>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry: CatalogEntry) {
        self.entries.insert(entry.id, entry);
    }
}

impl SequenceCatalog for InMemoryCatalog {
    fn get(&self, id: u64) -> Option<&CatalogEntry> {
        self.entries.get(&id)
    }

    fn entries(&self) -> Box<dyn Iterator<Item = &CatalogEntry> + '_> {
        Box::new(self.entries.values())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Finds catalog sequences matching an evaluated output sequence.
pub trait Matcher {
    fn find_matches(&self, catalog: &dyn SequenceCatalog, seq: &Sequence) -> Vec<u64>;
}

/// Matches by direct term comparison: the overlap of the evaluated
/// terms and the known terms must cover the required prefix and agree
/// elementwise.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectMatcher;

impl Matcher for DirectMatcher {
    fn find_matches(&self, catalog: &dyn SequenceCatalog, seq: &Sequence) -> Vec<u64> {
        let mut matches = Vec::new();
        for entry in catalog.entries() {
            let overlap = seq.len().min(entry.terms.len());
            if overlap < entry.required_prefix || overlap == 0 {
                continue;
            }
            if (0..overlap).all(|i| seq[i] == entry.terms[i]) {
                matches.push(entry.id);
            }
        }
        matches
    }
}

/// Result of offering a matched program to the updater.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// No program was known for this sequence
    Fresh,
    /// A better program replaced the known one
    Updated,
    /// The known program is at least as good
    Rejected,
}

/// Consumes mining results. Matched programs arrive as `(id, program)`
/// pairs; programs whose output matched nothing but looks noteworthy
/// arrive through [`ProgramUpdater::report_special`]. The store behind
/// it (file layout, submission) is an external collaborator.
pub trait ProgramUpdater {
    fn update(&mut self, id: u64, program: &Program) -> UpdateOutcome;

    /// Records a program with an unmatched but special-looking output,
    /// e.g. a collatz-style valuation. `kind` names the heuristic that
    /// fired.
    fn report_special(&mut self, kind: &str, program: &Program, seq: &Sequence);
}

/// Keeps the shortest known program per sequence in memory, plus the
/// special finds.
#[derive(Debug, Default, Clone)]
pub struct InMemoryUpdater {
    programs: BTreeMap<u64, Program>,
    specials: Vec<(String, Program, Sequence)>,
}

impl InMemoryUpdater {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: u64) -> Option<&Program> {
        self.programs.get(&id)
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn specials(&self) -> &[(String, Program, Sequence)] {
        &self.specials
    }
}

impl ProgramUpdater for InMemoryUpdater {
    fn update(&mut self, id: u64, program: &Program) -> UpdateOutcome {
        match self.programs.get(&id) {
            None => {
                self.programs.insert(id, program.clone());
                UpdateOutcome::Fresh
            }
            Some(known) => {
                if util::num_ops(program, false) < util::num_ops(known, false) {
                    self.programs.insert(id, program.clone());
                    UpdateOutcome::Updated
                } else {
                    UpdateOutcome::Rejected
                }
            }
        }
    }

    fn report_special(&mut self, kind: &str, program: &Program, seq: &Sequence) {
        self.specials
            .push((kind.to_string(), program.clone(), seq.clone()));
    }
}
