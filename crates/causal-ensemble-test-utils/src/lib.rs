//! Test utilities for the causal-ensemble workspace.
//!
//! REAL data generation (seeded `ChaCha8Rng`, no mocked values) plus small
//! reference implementations of the external collaborators so the engine can
//! be exercised end to end.

pub mod algorithms;
pub mod collaborators;
pub mod datasets;
pub mod stats;

pub use algorithms::{
    CorrelationSkeletonSearch, FailingAlgorithm, FixedGraphAlgorithm, FlakyAlgorithm,
    PanickingAlgorithm,
};
pub use collaborators::{
    AdjacencyPatternSearch, CorrelationEffectEstimator, CorrelationTest, CorrelationTestFactory,
    FailingEstimator,
};
pub use datasets::{indexed_dataset, signal_and_noise_dataset, SyntheticData};
