//! Consensus of many candidate graphs.
//!
//! Counting is keyed by normalized node pairs and edge variants, so the
//! result depends only on how often each variant occurs, never on the
//! order the graphs arrive in.

use std::collections::BTreeMap;

use causal_ensemble_core::{CoreError, CoreResult, Edge, EdgeEnsemble, Graph, Node};
use tracing::debug;

use super::policy::{decide, EdgeVariant};

type PairCounts = BTreeMap<(Node, Node), BTreeMap<EdgeVariant, usize>>;

/// Observed frequencies for one node pair.
#[derive(Debug, Clone, PartialEq)]
pub struct PairProbabilities {
    /// Variants seen at least once, most frequent first.
    pub variants: Vec<(EdgeVariant, f64)>,
    /// Share of graphs with no edge between the pair.
    pub no_edge: f64,
}

/// Per-pair edge-type frequencies across an ensemble. Only pairs adjacent in
/// at least one graph are listed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeProbabilities {
    pairs: BTreeMap<(Node, Node), PairProbabilities>,
    num_graphs: usize,
}

impl EdgeProbabilities {
    pub fn num_graphs(&self) -> usize {
        self.num_graphs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn get(&self, a: &Node, b: &Node) -> Option<&PairProbabilities> {
        let key = if a <= b {
            (a.clone(), b.clone())
        } else {
            (b.clone(), a.clone())
        };
        self.pairs.get(&key)
    }

    /// Share of graphs containing exactly `edge`.
    pub fn probability_of(&self, edge: &Edge) -> f64 {
        let variant = EdgeVariant::of(edge);
        self.get(edge.node1(), edge.node2())
            .and_then(|p| p.variants.iter().find(|(v, _)| *v == variant))
            .map_or(0.0, |(_, p)| *p)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&(Node, Node), &PairProbabilities)> {
        self.pairs.iter()
    }
}

/// Consensus graph plus the frequencies it was derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleSummary {
    pub graph: Graph,
    pub probabilities: EdgeProbabilities,
    pub policy: EdgeEnsemble,
}

/// Merges candidate graphs under an [`EdgeEnsemble`] policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeEnsembleCombiner;

impl EdgeEnsembleCombiner {
    /// Consensus graph only. See [`summarize`](Self::summarize).
    pub fn combine(graphs: &[Graph], policy: EdgeEnsemble) -> CoreResult<Graph> {
        Self::summarize(graphs, policy).map(|s| s.graph)
    }

    /// The output node set is the union of the input node sets, matched by
    /// name. For every pair adjacent somewhere, `policy` picks at most one
    /// edge variant.
    ///
    /// # Errors
    ///
    /// - `EmptyEnsemble` if `graphs` is empty.
    /// - `ValidationError` if two graphs give the same node name different
    ///   types.
    pub fn summarize(graphs: &[Graph], policy: EdgeEnsemble) -> CoreResult<EnsembleSummary> {
        if graphs.is_empty() {
            return Err(CoreError::EmptyEnsemble {
                submitted: 0,
                failed: 0,
            });
        }

        let nodes = union_nodes(graphs)?;
        let counts = count_variants(graphs);
        let total = graphs.len();

        let mut graph = Graph::with_nodes(nodes.values().cloned());
        let mut pairs = BTreeMap::new();
        for ((a, b), variants) in &counts {
            let (first, second) = (canonical(&nodes, a), canonical(&nodes, b));

            if let Some(winner) = decide(policy, variants, total) {
                graph.add_edge(winner.to_edge(first.clone(), second.clone()))?;
            }

            let seen: usize = variants.values().sum();
            let mut shares: Vec<(EdgeVariant, f64)> = variants
                .iter()
                .map(|(v, c)| (*v, *c as f64 / total as f64))
                .collect();
            shares.sort_by(|(va, pa), (vb, pb)| pb.total_cmp(pa).then_with(|| va.rank().cmp(&vb.rank())));
            pairs.insert(
                (first, second),
                PairProbabilities {
                    variants: shares,
                    no_edge: (total - seen) as f64 / total as f64,
                },
            );
        }

        debug!(
            graphs = total,
            pairs = counts.len(),
            edges = graph.num_edges(),
            policy = %policy,
            "Combined ensemble"
        );

        Ok(EnsembleSummary {
            graph,
            probabilities: EdgeProbabilities {
                pairs,
                num_graphs: total,
            },
            policy,
        })
    }
}

fn union_nodes(graphs: &[Graph]) -> CoreResult<BTreeMap<String, Node>> {
    let mut nodes: BTreeMap<String, Node> = BTreeMap::new();
    for node in graphs.iter().flat_map(Graph::nodes) {
        match nodes.get(node.name()) {
            Some(existing) if existing.node_type() != node.node_type() => {
                return Err(CoreError::validation(
                    "graphs",
                    format!(
                        "node '{}' is {:?} in one graph and {:?} in another",
                        node.name(),
                        existing.node_type(),
                        node.node_type()
                    ),
                ));
            }
            Some(_) => {}
            None => {
                nodes.insert(node.name().to_string(), node.clone());
            }
        }
    }
    Ok(nodes)
}

fn count_variants(graphs: &[Graph]) -> PairCounts {
    let mut counts = PairCounts::new();
    for edge in graphs.iter().flat_map(Graph::edges) {
        *counts
            .entry(edge.pair())
            .or_default()
            .entry(EdgeVariant::of(edge))
            .or_insert(0) += 1;
    }
    counts
}

fn canonical(nodes: &BTreeMap<String, Node>, node: &Node) -> Node {
    nodes.get(node.name()).cloned().unwrap_or_else(|| node.clone())
}
