//! Resampling-ensemble causal search.
//!
//! Two entry points share the same machinery:
//!
//! - [`SubsamplingSearch`] runs any [`SearchAlgorithm`](causal_ensemble_core::SearchAlgorithm)
//!   on many bootstrap or subsample draws and merges the graphs with an
//!   [`EdgeEnsemble`](causal_ensemble_core::EdgeEnsemble) policy.
//! - [`StabilitySelector`] (CStaS) ranks the causes of a target by how
//!   stably they appear among the top effects across subsamples.
//!
//! # Architecture
//!
//! - [`resample`]: bootstrap / subsample draws and per-task RNGs
//! - [`task`]: the `SearchTask` unit of work
//! - [`executor`]: bounded rayon pool with failure isolation and cancellation
//! - [`ensemble`]: count-based graph consensus and edge-type probabilities
//! - [`stability`]: screening, error bounds, q search and records
//! - [`report`]: text tables and derived graphs
//!
//! # Example
//!
//! ```
//! use causal_ensemble_core::{Edge, EdgeEnsemble, Graph, Node};
//! use causal_ensemble_search::EdgeEnsembleCombiner;
//!
//! let (a, b) = (Node::continuous("a"), Node::continuous("b"));
//! let forward = Graph::from_edges([a.clone(), b.clone()], [Edge::directed(a.clone(), b.clone())]).unwrap();
//! let empty = Graph::with_nodes([a.clone(), b.clone()]);
//!
//! let graphs = vec![forward.clone(), forward, empty];
//! let consensus = EdgeEnsembleCombiner::combine(&graphs, EdgeEnsemble::Majority).unwrap();
//! assert!(consensus.is_directed_from_to(&a, &b));
//! ```

pub mod ensemble;
pub mod executor;
pub mod report;
pub mod resample;
pub mod stability;
pub mod subsampling;
pub mod task;

pub use ensemble::{EdgeEnsembleCombiner, EdgeProbabilities, EdgeVariant, EnsembleSummary};
pub use executor::{
    BatchOutcome, BatchReport, CancellationToken, CompletedTask, ParallelExecutor, TaskFailure,
};
pub use report::ReportFormatter;
pub use resample::{default_subsample_size, task_rng, Resampler};
pub use stability::{Record, StabilityReport, StabilitySelector};
pub use subsampling::{SubsamplingOutcome, SubsamplingSearch};
pub use task::{GraphSearchTask, SearchTask};
