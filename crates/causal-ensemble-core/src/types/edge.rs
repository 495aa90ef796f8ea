//! Edges with typed endpoints (DAG, pattern and PAG marks).

use std::fmt;

use serde::{Deserialize, Serialize};

use super::node::Node;

/// Mark at one end of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    Tail,
    Arrow,
    Circle,
}

/// An edge between two distinct nodes.
///
/// Edges are stored normalized: `node1 < node2` by name, with the endpoints
/// swapped accordingly. `endpoint1` is the mark at `node1`. Two edges
/// describing the same connection therefore compare equal regardless of the
/// order their nodes were given in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    node1: Node,
    node2: Node,
    endpoint1: Endpoint,
    endpoint2: Endpoint,
}

impl Edge {
    pub fn new(a: Node, b: Node, endpoint_a: Endpoint, endpoint_b: Endpoint) -> Self {
        if a <= b {
            Self {
                node1: a,
                node2: b,
                endpoint1: endpoint_a,
                endpoint2: endpoint_b,
            }
        } else {
            Self {
                node1: b,
                node2: a,
                endpoint1: endpoint_b,
                endpoint2: endpoint_a,
            }
        }
    }

    /// `from --> to`
    pub fn directed(from: Node, to: Node) -> Self {
        Self::new(from, to, Endpoint::Tail, Endpoint::Arrow)
    }

    /// `a --- b`
    pub fn undirected(a: Node, b: Node) -> Self {
        Self::new(a, b, Endpoint::Tail, Endpoint::Tail)
    }

    /// `a o-o b`
    pub fn nondirected(a: Node, b: Node) -> Self {
        Self::new(a, b, Endpoint::Circle, Endpoint::Circle)
    }

    /// `from o-> to`
    pub fn partially_oriented(from: Node, to: Node) -> Self {
        Self::new(from, to, Endpoint::Circle, Endpoint::Arrow)
    }

    /// `a <-> b`
    pub fn bidirected(a: Node, b: Node) -> Self {
        Self::new(a, b, Endpoint::Arrow, Endpoint::Arrow)
    }

    pub fn node1(&self) -> &Node {
        &self.node1
    }

    pub fn node2(&self) -> &Node {
        &self.node2
    }

    pub fn endpoint1(&self) -> Endpoint {
        self.endpoint1
    }

    pub fn endpoint2(&self) -> Endpoint {
        self.endpoint2
    }

    /// Endpoint pair in normalized order.
    pub fn endpoints(&self) -> (Endpoint, Endpoint) {
        (self.endpoint1, self.endpoint2)
    }

    /// Normalized unordered node pair.
    pub fn pair(&self) -> (Node, Node) {
        (self.node1.clone(), self.node2.clone())
    }

    pub fn contains(&self, node: &Node) -> bool {
        &self.node1 == node || &self.node2 == node
    }

    /// Mark at `node`, if it is one of this edge's nodes.
    pub fn endpoint_at(&self, node: &Node) -> Option<Endpoint> {
        if &self.node1 == node {
            Some(self.endpoint1)
        } else if &self.node2 == node {
            Some(self.endpoint2)
        } else {
            None
        }
    }

    /// The node across the edge from `node`.
    pub fn other(&self, node: &Node) -> Option<&Node> {
        if &self.node1 == node {
            Some(&self.node2)
        } else if &self.node2 == node {
            Some(&self.node1)
        } else {
            None
        }
    }

    pub fn is_directed(&self) -> bool {
        matches!(
            self.endpoints(),
            (Endpoint::Tail, Endpoint::Arrow) | (Endpoint::Arrow, Endpoint::Tail)
        )
    }

    pub fn is_undirected(&self) -> bool {
        self.endpoints() == (Endpoint::Tail, Endpoint::Tail)
    }

    /// For a directed edge, its `(tail, head)`.
    pub fn direction(&self) -> Option<(&Node, &Node)> {
        match self.endpoints() {
            (Endpoint::Tail, Endpoint::Arrow) => Some((&self.node1, &self.node2)),
            (Endpoint::Arrow, Endpoint::Tail) => Some((&self.node2, &self.node1)),
            _ => None,
        }
    }

    /// Same connection with every node replaced by `lookup(node)`.
    pub fn map_nodes(&self, mut lookup: impl FnMut(&Node) -> Node) -> Edge {
        Edge::new(
            lookup(&self.node1),
            lookup(&self.node2),
            self.endpoint1,
            self.endpoint2,
        )
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let left = match self.endpoint1 {
            Endpoint::Tail => '-',
            Endpoint::Arrow => '<',
            Endpoint::Circle => 'o',
        };
        let right = match self.endpoint2 {
            Endpoint::Tail => '-',
            Endpoint::Arrow => '>',
            Endpoint::Circle => 'o',
        };
        write!(f, "{} {}-{} {}", self.node1, left, right, self.node2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(name: &str) -> Node {
        Node::continuous(name)
    }

    #[test]
    fn test_normalization_makes_order_irrelevant() {
        let e1 = Edge::directed(n("b"), n("a"));
        let e2 = Edge::new(n("a"), n("b"), Endpoint::Arrow, Endpoint::Tail);
        assert_eq!(e1, e2);
        assert_eq!(e1.node1().name(), "a");
        assert_eq!(e1.direction().map(|(t, h)| (t.name(), h.name())), Some(("b", "a")));
    }

    #[test]
    fn test_endpoint_at_and_other() {
        let e = Edge::partially_oriented(n("x"), n("y"));
        assert_eq!(e.endpoint_at(&n("x")), Some(Endpoint::Circle));
        assert_eq!(e.endpoint_at(&n("y")), Some(Endpoint::Arrow));
        assert_eq!(e.endpoint_at(&n("z")), None);
        assert_eq!(e.other(&n("x")), Some(&n("y")));
    }

    #[test]
    fn test_display() {
        assert_eq!(Edge::directed(n("a"), n("b")).to_string(), "a --> b");
        assert_eq!(Edge::directed(n("b"), n("a")).to_string(), "a <-- b");
        assert_eq!(Edge::bidirected(n("a"), n("b")).to_string(), "a <-> b");
        assert_eq!(Edge::nondirected(n("a"), n("b")).to_string(), "a o-o b");
        assert_eq!(Edge::undirected(n("a"), n("b")).to_string(), "a --- b");
    }
}
