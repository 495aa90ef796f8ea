//! Edge-ensemble combination of candidate graphs.

mod combiner;
mod policy;


pub use combiner::{EdgeEnsembleCombiner, EdgeProbabilities, EnsembleSummary, PairProbabilities};
pub use policy::{decide, most_frequent, EdgeVariant, PREFERENCE};
