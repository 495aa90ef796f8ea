//! Reference [`SearchAlgorithm`]s for harness tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use causal_ensemble_core::{
    CoreError, CoreResult, Dataset, Edge, Graph, Knowledge, Node, Parameters, SearchAlgorithm,
};

use crate::stats::pearson;

/// Directed edge `earlier --> later` (column order) for every pair with
/// `|corr| >= threshold`. Knowledge is honoured: a forbidden orientation is
/// flipped, a pair forbidden both ways is skipped, required edges are added.
#[derive(Debug, Clone, Copy)]
pub struct CorrelationSkeletonSearch {
    pub threshold: f64,
}

impl CorrelationSkeletonSearch {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    fn orient(knowledge: &Knowledge, a: &Node, b: &Node) -> Option<Edge> {
        match (
            knowledge.is_forbidden(a.name(), b.name()),
            knowledge.is_forbidden(b.name(), a.name()),
        ) {
            (false, _) => Some(Edge::directed(a.clone(), b.clone())),
            (true, false) => Some(Edge::directed(b.clone(), a.clone())),
            (true, true) => None,
        }
    }
}

impl SearchAlgorithm for CorrelationSkeletonSearch {
    fn description(&self) -> String {
        format!("correlation skeleton (|r| >= {})", self.threshold)
    }

    fn search(&self, data: &Dataset, _params: &Parameters, knowledge: &Knowledge) -> CoreResult<Graph> {
        let variables = data.variables();
        let columns = variables
            .iter()
            .map(|v| data.column(v))
            .collect::<CoreResult<Vec<_>>>()?;

        let mut graph = Graph::with_nodes(variables.iter().cloned());
        for (from, to) in knowledge.required_edges() {
            let (Some(a), Some(b)) = (data.variable(from), data.variable(to)) else {
                continue;
            };
            if graph.is_adjacent(a, b) {
                continue;
            }
            graph.add_edge(Edge::directed(a.clone(), b.clone()))?;
        }

        for i in 0..variables.len() {
            for j in (i + 1)..variables.len() {
                let (a, b) = (&variables[i], &variables[j]);
                if graph.is_adjacent(a, b) || pearson(&columns[i], &columns[j]).abs() < self.threshold {
                    continue;
                }
                if let Some(edge) = Self::orient(knowledge, a, b) {
                    graph.add_edge(edge)?;
                }
            }
        }
        Ok(graph)
    }
}

/// Returns the same graph for every dataset.
#[derive(Debug, Clone)]
pub struct FixedGraphAlgorithm {
    pub graph: Graph,
}

impl SearchAlgorithm for FixedGraphAlgorithm {
    fn description(&self) -> String {
        "fixed graph".into()
    }

    fn search(&self, _data: &Dataset, _params: &Parameters, _knowledge: &Knowledge) -> CoreResult<Graph> {
        Ok(self.graph.clone())
    }
}

/// Always returns an error.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingAlgorithm;

impl SearchAlgorithm for FailingAlgorithm {
    fn description(&self) -> String {
        "always failing".into()
    }

    fn search(&self, _data: &Dataset, _params: &Parameters, _knowledge: &Knowledge) -> CoreResult<Graph> {
        Err(CoreError::TaskExecution {
            task: "search".into(),
            message: "algorithm configured to fail".into(),
        })
    }
}

/// Always panics.
#[derive(Debug, Default, Clone, Copy)]
pub struct PanickingAlgorithm;

impl SearchAlgorithm for PanickingAlgorithm {
    fn description(&self) -> String {
        "always panicking".into()
    }

    fn search(&self, _data: &Dataset, _params: &Parameters, _knowledge: &Knowledge) -> CoreResult<Graph> {
        panic!("algorithm configured to panic")
    }
}

/// Delegates to `inner`, but every `fail_every`-th call (1-based) fails.
pub struct FlakyAlgorithm<A> {
    inner: A,
    fail_every: usize,
    calls: AtomicUsize,
}

impl<A: SearchAlgorithm> FlakyAlgorithm<A> {
    pub fn new(inner: A, fail_every: usize) -> Self {
        Self {
            inner,
            fail_every: fail_every.max(1),
            calls: AtomicUsize::new(0),
        }
    }
}

impl<A: SearchAlgorithm> SearchAlgorithm for FlakyAlgorithm<A> {
    fn description(&self) -> String {
        format!("flaky({})", self.inner.description())
    }

    fn search(&self, data: &Dataset, params: &Parameters, knowledge: &Knowledge) -> CoreResult<Graph> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call % self.fail_every == 0 {
            return Err(CoreError::TaskExecution {
                task: format!("search call {}", call),
                message: "flaky failure".into(),
            });
        }
        self.inner.search(data, params, knowledge)
    }
}
