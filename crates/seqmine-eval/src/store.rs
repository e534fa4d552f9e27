//! Program lookup for the `seq` operation.

use seqmine_lang::Program;
use std::collections::HashMap;

/// By-id program lookup. The interpreter resolves `seq` calls through
/// this seam; the catalog directory layout behind it is not its
/// concern.
pub trait ProgramStore {
    fn get(&self, id: u64) -> Option<&Program>;
}

/// An empty store: every `seq` operation fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyStore;

impl ProgramStore for EmptyStore {
    fn get(&self, _id: u64) -> Option<&Program> {
        None
    }
}

/// A store backed by a map, for tests and in-process mining.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    programs: HashMap<u64, Program>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: u64, program: Program) {
        self.programs.insert(id, program);
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}

impl ProgramStore for InMemoryStore {
    fn get(&self, id: u64) -> Option<&Program> {
        self.programs.get(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seqmine_lang::parse_str;

    #[test]
    fn test_in_memory_store() {
        let mut store = InMemoryStore::new();
        assert!(store.is_empty());
        store.insert(45, parse_str("add $0,1\n").unwrap());
        assert_eq!(store.len(), 1);
        assert!(store.get(45).is_some());
        assert!(store.get(46).is_none());
    }

    #[test]
    fn test_empty_store() {
        assert!(EmptyStore.get(0).is_none());
    }
}
