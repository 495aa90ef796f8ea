//! Domain types: variables, datasets, graphs, knowledge and effect rankings.

mod dataset;
mod edge;
mod effects;
mod ensemble;
mod graph;
mod knowledge;
mod node;

pub use dataset::{DataKind, Dataset, DatasetValues};
pub use edge::{Edge, Endpoint};
pub use effects::EffectRanking;
pub use ensemble::EdgeEnsemble;
pub use graph::Graph;
pub use knowledge::Knowledge;
pub use node::{Node, NodeType};
