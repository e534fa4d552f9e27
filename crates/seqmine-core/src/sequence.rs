//! Integer sequences.

use crate::number::Number;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

/// An ordered sequence of [`Number`] terms. Equality is elementwise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sequence(pub Vec<Number>);

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, term: Number) {
        self.0.push(term);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Number> {
        self.0.iter()
    }

    /// True iff `other` equals the first `other.len()` terms of `self`.
    pub fn starts_with(&self, other: &Sequence) -> bool {
        other.len() <= self.len() && self.0[..other.len()] == other.0[..]
    }
}

impl Index<usize> for Sequence {
    type Output = Number;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl From<Vec<Number>> for Sequence {
    fn from(terms: Vec<Number>) -> Self {
        Sequence(terms)
    }
}

impl From<Vec<u64>> for Sequence {
    fn from(terms: Vec<u64>) -> Self {
        Sequence(terms.into_iter().map(Number::from).collect())
    }
}

impl FromIterator<Number> for Sequence {
    fn from_iter<T: IntoIterator<Item = Number>>(iter: T) -> Self {
        Sequence(iter.into_iter().collect())
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, term) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", term)?;
        }
        Ok(())
    }
}
