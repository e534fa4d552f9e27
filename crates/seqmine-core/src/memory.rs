//! Sparse memory for program evaluation.

use crate::number::Number;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A sparse mapping from nonnegative cell indices to [`Number`] values.
/// Unset cells read as zero. One `Memory` lives for one evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memory {
    cells: BTreeMap<u64, Number>,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads cell `index`; unset cells are zero.
    pub fn get(&self, index: u64) -> Number {
        self.cells.get(&index).cloned().unwrap_or_else(Number::zero)
    }

    /// Writes cell `index`. Zero values are not stored, so equality is
    /// over nonzero cells.
    pub fn set(&mut self, index: u64, value: Number) {
        if value.is_zero() {
            self.cells.remove(&index);
        } else {
            self.cells.insert(index, value);
        }
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Number of cells holding a nonzero value.
    pub fn num_nonzero_cells(&self) -> usize {
        self.cells.len()
    }

    /// Largest index holding a nonzero value.
    pub fn largest_used_cell(&self) -> Option<u64> {
        self.cells.keys().next_back().copied()
    }

    /// Extracts the region of `length` cells starting at `start`.
    pub fn region(&self, start: u64, length: u64) -> Vec<Number> {
        (0..length).map(|i| self.get(start + i)).collect()
    }

    /// Zeroes `length` cells starting at `start`.
    pub fn clear_region(&mut self, start: u64, length: u64) {
        for i in 0..length {
            self.cells.remove(&(start + i));
        }
    }

    /// Lexicographic strictly-less comparison of the region starting at
    /// `start` against a previously captured snapshot. Drives loop
    /// termination: the loop continues only while its counter region
    /// strictly decreases.
    pub fn region_less_than(&self, start: u64, snapshot: &[Number]) -> bool {
        for (i, prev) in snapshot.iter().enumerate() {
            let cur = self.get(start + i as u64);
            if cur < *prev {
                return true;
            }
            if cur > *prev {
                return false;
            }
        }
        false
    }
}

impl fmt::Display for Memory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (index, value) in &self.cells {
            if !first {
                write!(f, ",")?;
            }
            write!(f, "${}={}", index, value)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_cells_read_zero() {
        let mem = Memory::new();
        assert_eq!(mem.get(0), Number::zero());
        assert_eq!(mem.get(12345), Number::zero());
    }

    #[test]
    fn test_set_get_clear() {
        let mut mem = Memory::new();
        mem.set(3, Number::from(42u64));
        assert_eq!(mem.get(3), Number::from(42u64));
        mem.set(3, Number::zero());
        assert_eq!(mem.get(3), Number::zero());
        assert_eq!(mem.num_nonzero_cells(), 0);
    }

    #[test]
    fn test_equality_ignores_zero_writes() {
        let mut a = Memory::new();
        let mut b = Memory::new();
        a.set(1, Number::from(5u64));
        a.set(2, Number::zero());
        b.set(1, Number::from(5u64));
        assert_eq!(a, b);
    }

    #[test]
    fn test_region_compare() {
        let mut mem = Memory::new();
        mem.set(0, Number::from(3u64));
        let snapshot = vec![Number::from(4u64)];
        assert!(mem.region_less_than(0, &snapshot));
        let snapshot = vec![Number::from(3u64)];
        assert!(!mem.region_less_than(0, &snapshot));
        let snapshot = vec![Number::from(2u64)];
        assert!(!mem.region_less_than(0, &snapshot));
    }

    #[test]
    fn test_region_compare_vector() {
        let mut mem = Memory::new();
        mem.set(0, Number::from(1u64));
        mem.set(1, Number::from(9u64));
        // first cell equal, second decides
        let snapshot = vec![Number::from(1u64), Number::from(10u64)];
        assert!(mem.region_less_than(0, &snapshot));
        // first cell decides regardless of the rest
        let snapshot = vec![Number::from(2u64), Number::zero()];
        assert!(mem.region_less_than(0, &snapshot));
    }

    #[test]
    fn test_clear_region() {
        let mut mem = Memory::new();
        for i in 0..5 {
            mem.set(i, Number::from(i + 1));
        }
        mem.clear_region(1, 3);
        assert_eq!(mem.get(0), Number::from(1u64));
        assert_eq!(mem.get(1), Number::zero());
        assert_eq!(mem.get(3), Number::zero());
        assert_eq!(mem.get(4), Number::from(5u64));
    }
}
