//! Seams to the external collaborators of the ensemble engine.
//!
//! Discovery algorithms, independence tests and effect estimators are opaque
//! to the engine. Implementations must be safe to call concurrently with
//! distinct datasets: every trait here requires `Send + Sync`.

mod effect_estimator;
mod independence;
mod search_algorithm;

pub use effect_estimator::EffectEstimator;
pub use independence::{IndependenceTest, IndependenceTestFactory, TestSettings, TestType};
pub use search_algorithm::{PatternSearch, SearchAlgorithm};
