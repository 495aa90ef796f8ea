//! Causal Ensemble Core Library
//!
//! Provides the domain types, collaborator traits, errors and configuration
//! shared by the resampling-ensemble causal search engine.
//!
//! # Architecture
//!
//! This crate defines:
//! - Domain types (`Dataset`, `Node`, `Graph`, `Edge`, `Knowledge`, `EffectRanking`)
//! - Collaborator traits (`SearchAlgorithm`, `PatternSearch`, `IndependenceTest`,
//!   `IndependenceTestFactory`, `EffectEstimator`)
//! - Named-option `Parameters`
//! - Error types and result aliases
//! - Configuration structures and tracing bootstrap
//!
//! # Example
//!
//! ```
//! use causal_ensemble_core::{Edge, Graph, Node};
//!
//! let (x, y) = (Node::continuous("x"), Node::continuous("y"));
//! let mut graph = Graph::with_nodes([x.clone(), y.clone()]);
//! graph.add_edge(Edge::directed(x.clone(), y.clone())).unwrap();
//! assert!(graph.is_directed_from_to(&x, &y));
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod params;
pub mod traits;
pub mod types;

// Re-exports for convenience
pub use config::{EngineConfig, LoggingConfig, StabilityConfig, SubsamplingConfig};
pub use error::{CoreError, CoreResult};
pub use params::{ParamValue, Parameters};
pub use traits::{
    EffectEstimator, IndependenceTest, IndependenceTestFactory, PatternSearch, SearchAlgorithm,
    TestSettings, TestType,
};
pub use types::{
    DataKind, Dataset, DatasetValues, Edge, EdgeEnsemble, EffectRanking, Endpoint, Graph,
    Knowledge, Node, NodeType,
};
