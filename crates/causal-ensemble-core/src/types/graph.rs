//! Mixed graphs: DAGs, patterns (CPDAGs) and PAGs.
//!
//! At most one edge connects any unordered node pair. Nodes and edges are
//! kept in ordered collections so equality compares node sets and edge sets,
//! never insertion order, and iteration is deterministic.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;

use crate::error::{CoreError, CoreResult};

use super::edge::{Edge, Endpoint};
use super::node::Node;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    nodes: BTreeSet<Node>,
    edges: BTreeMap<(Node, Node), Edge>,
    adjacency: BTreeMap<Node, BTreeSet<Node>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Graph over `nodes` with no edges.
    pub fn with_nodes<I: IntoIterator<Item = Node>>(nodes: I) -> Self {
        let mut graph = Self::new();
        for node in nodes {
            graph.add_node(node);
        }
        graph
    }

    /// Graph over `nodes` with the given edges.
    pub fn from_edges<I, E>(nodes: I, edges: E) -> CoreResult<Self>
    where
        I: IntoIterator<Item = Node>,
        E: IntoIterator<Item = Edge>,
    {
        let mut graph = Self::with_nodes(nodes);
        for edge in edges {
            graph.add_edge(edge)?;
        }
        Ok(graph)
    }

    /// Adds a node. Returns `false` if a node with that name already exists.
    pub fn add_node(&mut self, node: Node) -> bool {
        if self.nodes.contains(&node) {
            return false;
        }
        self.adjacency.insert(node.clone(), BTreeSet::new());
        self.nodes.insert(node)
    }

    pub fn contains_node(&self, node: &Node) -> bool {
        self.nodes.contains(node)
    }

    pub fn node_named(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name() == name)
    }

    /// Adds an edge between two existing, distinct, not-yet-adjacent nodes.
    ///
    /// # Errors
    ///
    /// `InvalidEdge` for self loops, unknown nodes, or an already adjacent pair.
    pub fn add_edge(&mut self, edge: Edge) -> CoreResult<()> {
        let (a, b) = edge.pair();
        let invalid = |reason: &str| CoreError::InvalidEdge {
            from: a.name().to_string(),
            to: b.name().to_string(),
            reason: reason.to_string(),
        };

        if a == b {
            return Err(invalid("self loops are not allowed"));
        }
        if !self.nodes.contains(&a) || !self.nodes.contains(&b) {
            return Err(invalid("both endpoints must be nodes of the graph"));
        }
        if self.edges.contains_key(&(a.clone(), b.clone())) {
            return Err(invalid("nodes are already adjacent"));
        }

        self.link(edge);
        Ok(())
    }

    /// Adds `from --> to`.
    pub fn add_directed_edge(&mut self, from: &Node, to: &Node) -> CoreResult<()> {
        self.add_edge(Edge::directed(from.clone(), to.clone()))
    }

    /// Removes the edge between `a` and `b`, returning it.
    pub fn remove_edge(&mut self, a: &Node, b: &Node) -> Option<Edge> {
        let key = Self::key(a, b);
        let removed = self.edges.remove(&key)?;
        if let Some(adj) = self.adjacency.get_mut(a) {
            adj.remove(b);
        }
        if let Some(adj) = self.adjacency.get_mut(b) {
            adj.remove(a);
        }
        Some(removed)
    }

    pub fn edge_between(&self, a: &Node, b: &Node) -> Option<&Edge> {
        self.edges.get(&Self::key(a, b))
    }

    pub fn is_adjacent(&self, a: &Node, b: &Node) -> bool {
        self.edge_between(a, b).is_some()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn adjacent_nodes(&self, node: &Node) -> impl Iterator<Item = &Node> {
        self.adjacency.get(node).into_iter().flatten()
    }

    /// Nodes with a directed edge into `node`.
    pub fn parents(&self, node: &Node) -> Vec<Node> {
        self.adjacent_nodes(node)
            .filter(|other| self.is_directed_from_to(other, node))
            .cloned()
            .collect()
    }

    /// Whether `from --> to` is present.
    pub fn is_directed_from_to(&self, from: &Node, to: &Node) -> bool {
        self.edge_between(from, to)
            .and_then(Edge::direction)
            .is_some_and(|(tail, head)| tail == from && head == to)
    }

    /// Whether `a --- b` is present.
    pub fn is_undirected_between(&self, a: &Node, b: &Node) -> bool {
        self.edge_between(a, b).is_some_and(Edge::is_undirected)
    }

    /// Copy of this graph in which every node that has a same-named node in
    /// `replacements` is swapped for that instance. Edges follow their nodes.
    pub fn replace_nodes(&self, replacements: &[Node]) -> Graph {
        let by_name: BTreeMap<&str, &Node> =
            replacements.iter().map(|n| (n.name(), n)).collect();
        let swap = |n: &Node| by_name.get(n.name()).map_or_else(|| n.clone(), |r| (*r).clone());

        let mut graph = Graph::with_nodes(self.nodes.iter().map(swap));
        for edge in self.edges.values() {
            graph.link(edge.map_nodes(swap));
        }
        graph
    }

    /// Whether a semi-directed path leads from `from` into any of `targets`.
    ///
    /// A step from `u` to `v` is allowed when the mark at `u` is not an
    /// arrowhead (so `u --> v`, `u --- v`, `u o-> v`, `u o-o v` all qualify).
    /// Paths have at least one edge.
    pub fn exists_semi_directed_path(&self, from: &Node, targets: &BTreeSet<Node>) -> bool {
        let mut visited: BTreeSet<&Node> = BTreeSet::new();
        let mut queue: VecDeque<&Node> = VecDeque::new();
        queue.push_back(from);
        visited.insert(from);

        while let Some(current) = queue.pop_front() {
            for next in self.adjacent_nodes(current) {
                let Some(edge) = self.edge_between(current, next) else {
                    continue;
                };
                if edge.endpoint_at(current) == Some(Endpoint::Arrow) {
                    continue;
                }
                if targets.contains(next) {
                    return true;
                }
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        false
    }

    /// The pattern (CPDAG) of this DAG: same skeleton, unshielded colliders
    /// oriented, remaining orientations propagated with Meek rules R1-R3,
    /// everything else undirected.
    ///
    /// # Errors
    ///
    /// `ValidationError` if the graph has a non-directed edge or a cycle.
    pub fn pattern_for_dag(&self) -> CoreResult<Graph> {
        if let Some(edge) = self.edges.values().find(|e| !e.is_directed()) {
            return Err(CoreError::validation(
                "graph",
                format!("pattern_for_dag needs a DAG, found edge '{}'", edge),
            ));
        }
        if self.has_directed_cycle() {
            return Err(CoreError::validation("graph", "pattern_for_dag needs an acyclic graph"));
        }

        let mut compelled: BTreeSet<(Node, Node)> = BTreeSet::new();
        for child in &self.nodes {
            let parents = self.parents(child);
            for (i, a) in parents.iter().enumerate() {
                for b in &parents[i + 1..] {
                    if !self.is_adjacent(a, b) {
                        compelled.insert((a.clone(), child.clone()));
                        compelled.insert((b.clone(), child.clone()));
                    }
                }
            }
        }

        let mut pattern = Graph::with_nodes(self.nodes.iter().cloned());
        for edge in self.edges.values() {
            if let Some((tail, head)) = edge.direction() {
                if compelled.contains(&(tail.clone(), head.clone())) {
                    pattern.link(Edge::directed(tail.clone(), head.clone()));
                } else {
                    pattern.link(Edge::undirected(tail.clone(), head.clone()));
                }
            }
        }

        while pattern.apply_meek_rules() {}
        Ok(pattern)
    }

    fn has_directed_cycle(&self) -> bool {
        let mut in_degree: BTreeMap<&Node, usize> = self.nodes.iter().map(|n| (n, 0)).collect();
        for edge in self.edges.values() {
            if let Some((_, head)) = edge.direction() {
                *in_degree.entry(head).or_default() += 1;
            }
        }

        let mut ready: Vec<&Node> = in_degree
            .iter()
            .filter(|(_, d)| **d == 0)
            .map(|(n, _)| *n)
            .collect();
        let mut seen = 0;
        while let Some(node) = ready.pop() {
            seen += 1;
            for next in self.adjacent_nodes(node) {
                if self.is_directed_from_to(node, next) {
                    if let Some(d) = in_degree.get_mut(next) {
                        *d -= 1;
                        if *d == 0 {
                            ready.push(next);
                        }
                    }
                }
            }
        }
        seen != self.nodes.len()
    }

    /// One sweep of Meek rules R1-R3 over the undirected edges. Returns
    /// whether anything was oriented.
    fn apply_meek_rules(&mut self) -> bool {
        let undirected: Vec<(Node, Node)> = self
            .edges
            .values()
            .filter(|e| e.is_undirected())
            .map(Edge::pair)
            .collect();

        let mut changed = false;
        for (x, y) in undirected {
            for (a, b) in [(x.clone(), y.clone()), (y, x)] {
                if !self.is_undirected_between(&a, &b) {
                    continue;
                }
                if self.meek_r1(&a, &b) || self.meek_r2(&a, &b) || self.meek_r3(&a, &b) {
                    self.orient(&a, &b);
                    changed = true;
                }
            }
        }
        changed
    }

    // R1: c --> a --- b, c and b nonadjacent  =>  a --> b
    fn meek_r1(&self, a: &Node, b: &Node) -> bool {
        self.adjacent_nodes(a)
            .any(|c| c != b && self.is_directed_from_to(c, a) && !self.is_adjacent(c, b))
    }

    // R2: a --> c --> b, a --- b  =>  a --> b
    fn meek_r2(&self, a: &Node, b: &Node) -> bool {
        self.adjacent_nodes(a)
            .any(|c| c != b && self.is_directed_from_to(a, c) && self.is_directed_from_to(c, b))
    }

    // R3: a --- c --> b, a --- d --> b, c and d nonadjacent, a --- b  =>  a --> b
    fn meek_r3(&self, a: &Node, b: &Node) -> bool {
        let candidates: Vec<&Node> = self
            .adjacent_nodes(a)
            .filter(|c| *c != b && self.is_undirected_between(a, c) && self.is_directed_from_to(c, b))
            .collect();
        candidates.iter().enumerate().any(|(i, c)| {
            candidates[i + 1..]
                .iter()
                .any(|d| !self.is_adjacent(c, d))
        })
    }

    fn orient(&mut self, from: &Node, to: &Node) {
        self.edges.insert(Self::key(from, to), Edge::directed(from.clone(), to.clone()));
    }

    /// Inserts an edge whose nodes are known to exist, replacing any edge
    /// already between them.
    fn link(&mut self, edge: Edge) {
        let (a, b) = edge.pair();
        self.adjacency.entry(a.clone()).or_default().insert(b.clone());
        self.adjacency.entry(b.clone()).or_default().insert(a.clone());
        self.edges.insert((a, b), edge);
    }

    fn key(a: &Node, b: &Node) -> (Node, Node) {
        if a <= b {
            (a.clone(), b.clone())
        } else {
            (b.clone(), a.clone())
        }
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Graph Nodes:")?;
        let names: Vec<&str> = self.nodes.iter().map(Node::name).collect();
        writeln!(f, "{}", names.join(";"))?;
        writeln!(f)?;
        writeln!(f, "Graph Edges:")?;
        for (i, edge) in self.edges.values().enumerate() {
            writeln!(f, "{}. {}", i + 1, edge)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::node::NodeType;

    fn n(name: &str) -> Node {
        Node::continuous(name)
    }

    fn dag(names: &[&str], edges: &[(&str, &str)]) -> Graph {
        Graph::from_edges(
            names.iter().map(|s| n(s)),
            edges.iter().map(|(a, b)| Edge::directed(n(a), n(b))),
        )
        .expect("valid DAG")
    }

    #[test]
    fn test_add_edge_rejects_invalid() {
        let mut g = Graph::with_nodes([n("a"), n("b")]);
        assert!(g.add_edge(Edge::directed(n("a"), n("a"))).is_err());
        assert!(g.add_edge(Edge::directed(n("a"), n("z"))).is_err());
        g.add_directed_edge(&n("a"), &n("b")).expect("first edge");
        assert!(g.add_edge(Edge::undirected(n("b"), n("a"))).is_err());
        assert_eq!(g.num_edges(), 1);
    }

    #[test]
    fn test_equality_ignores_insertion_order() {
        let g1 = dag(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
        let g2 = dag(&["c", "b", "a"], &[("b", "c"), ("a", "b")]);
        assert_eq!(g1, g2);
        println!("[PASS] test_equality_ignores_insertion_order");
    }

    #[test]
    fn test_remove_edge() {
        let mut g = dag(&["a", "b"], &[("a", "b")]);
        assert!(g.remove_edge(&n("b"), &n("a")).is_some());
        assert!(!g.is_adjacent(&n("a"), &n("b")));
        assert_eq!(g.adjacent_nodes(&n("a")).count(), 0);
    }

    #[test]
    fn test_replace_nodes_swaps_instances() {
        let g = dag(&["a", "b"], &[("a", "b")]);
        let replaced = g.replace_nodes(&[Node::discrete("a")]);
        let a = replaced.node_named("a").expect("kept");
        assert_eq!(a.node_type(), NodeType::Discrete);
        assert!(replaced.is_directed_from_to(&n("a"), &n("b")));
    }

    #[test]
    fn test_semi_directed_path() {
        // a --> b --- c <-- d
        let mut g = Graph::with_nodes([n("a"), n("b"), n("c"), n("d")]);
        g.add_directed_edge(&n("a"), &n("b")).unwrap();
        g.add_edge(Edge::undirected(n("b"), n("c"))).unwrap();
        g.add_directed_edge(&n("d"), &n("c")).unwrap();

        let target: BTreeSet<Node> = [n("c")].into_iter().collect();
        assert!(g.exists_semi_directed_path(&n("a"), &target));
        assert!(g.exists_semi_directed_path(&n("d"), &target));

        let target_a: BTreeSet<Node> = [n("a")].into_iter().collect();
        assert!(!g.exists_semi_directed_path(&n("c"), &target_a));
        println!("[PASS] test_semi_directed_path");
    }

    #[test]
    fn test_pattern_keeps_collider() {
        let g = dag(&["a", "b", "c"], &[("a", "c"), ("b", "c")]);
        let p = g.pattern_for_dag().expect("DAG");
        assert!(p.is_directed_from_to(&n("a"), &n("c")));
        assert!(p.is_directed_from_to(&n("b"), &n("c")));
    }

    #[test]
    fn test_pattern_chain_is_undirected() {
        let g = dag(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
        let p = g.pattern_for_dag().expect("DAG");
        assert!(p.is_undirected_between(&n("a"), &n("b")));
        assert!(p.is_undirected_between(&n("b"), &n("c")));
    }

    #[test]
    fn test_pattern_meek_r1_propagates() {
        // a --> c <-- b, c --> d  : c --> d is compelled by R1
        let g = dag(&["a", "b", "c", "d"], &[("a", "c"), ("b", "c"), ("c", "d")]);
        let p = g.pattern_for_dag().expect("DAG");
        assert!(p.is_directed_from_to(&n("c"), &n("d")));
        println!("[PASS] test_pattern_meek_r1_propagates");
    }

    #[test]
    fn test_pattern_rejects_non_dag() {
        let mut g = Graph::with_nodes([n("a"), n("b")]);
        g.add_edge(Edge::undirected(n("a"), n("b"))).unwrap();
        assert!(g.pattern_for_dag().is_err());

        let cyclic = dag(&["a", "b", "c"], &[("a", "b"), ("b", "c"), ("c", "a")]);
        assert!(cyclic.pattern_for_dag().is_err());
    }

    #[test]
    fn test_display_lists_edges() {
        let g = dag(&["a", "b"], &[("a", "b")]);
        let text = g.to_string();
        assert!(text.contains("a;b"));
        assert!(text.contains("1. a --> b"));
    }
}
