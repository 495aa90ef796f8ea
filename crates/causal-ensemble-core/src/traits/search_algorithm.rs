//! Graph search contracts.

use crate::error::CoreResult;
use crate::params::Parameters;
use crate::types::{Dataset, Graph, Knowledge};

use super::independence::IndependenceTest;

/// A complete causal discovery algorithm (FGES, GFCI, PC variants, ...).
///
/// `search` must not rely on global mutable state: the subsampling harness
/// calls it from many worker threads at once, each with its own dataset.
pub trait SearchAlgorithm: Send + Sync {
    /// Human-readable description used in logs.
    fn description(&self) -> String;

    fn search(&self, data: &Dataset, params: &Parameters, knowledge: &Knowledge) -> CoreResult<Graph>;
}

/// Constraint-based pattern search driven by an independence test
/// (the stable-skeleton PC variant used by stability selection).
pub trait PatternSearch: Send + Sync {
    fn search(&self, test: &dyn IndependenceTest) -> CoreResult<Graph>;
}
