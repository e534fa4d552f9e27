//! The mining loop: generate candidate programs, evaluate them, match
//! their outputs against a sequence catalog, and feed successes back
//! into generation.

pub mod catalog;
pub mod miner;
pub mod progress;
pub mod scheduler;

pub use catalog::{
    CatalogEntry, DirectMatcher, InMemoryCatalog, InMemoryUpdater, Matcher, ProgramUpdater,
    SequenceCatalog, UpdateOutcome,
};
pub use miner::{Miner, MinerProfile, MinerStats};
pub use progress::ProgressMonitor;
pub use scheduler::AdaptiveScheduler;
