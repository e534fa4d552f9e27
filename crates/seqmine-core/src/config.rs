//! Evaluation configuration.

use serde::{Deserialize, Serialize};

/// Resource limits and evaluation parameters, threaded explicitly into
/// the interpreter and the miner instead of living in process globals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Number of sequence terms to evaluate by default
    pub num_terms: usize,
    /// Maximum number of nonzero memory cells per evaluation
    pub max_memory: u64,
    /// Maximum number of executed operations per evaluation
    pub max_cycles: u64,
    /// Maximum SEQ call depth
    pub max_call_depth: usize,
    /// Whether evaluation reports step counts instead of terms
    pub use_steps: bool,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            num_terms: 10,
            max_memory: 100_000,
            max_cycles: 10_000_000,
            max_call_depth: 100,
            use_steps: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EvalConfig::default();
        assert_eq!(config.num_terms, 10);
        assert_eq!(config.max_cycles, 10_000_000);
        assert!(!config.use_steps);
    }

    #[test]
    fn test_serialization() {
        let config = EvalConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: EvalConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.max_memory, config.max_memory);
    }
}
