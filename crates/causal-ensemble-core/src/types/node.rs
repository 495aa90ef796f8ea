//! Variables (graph nodes).
//!
//! A node is identified by its name alone. Two `Node` values with the same
//! name compare equal even when they come from different dataset copies, so
//! statistics keyed by node survive resampling and column subsetting.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Measurement type of a variable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    #[default]
    Continuous,
    Discrete,
}

/// A named variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    name: String,
    node_type: NodeType,
}

impl Node {
    pub fn new(name: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            name: name.into(),
            node_type,
        }
    }

    pub fn continuous(name: impl Into<String>) -> Self {
        Self::new(name, NodeType::Continuous)
    }

    pub fn discrete(name: impl Into<String>) -> Self {
        Self::new(name, NodeType::Discrete)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
