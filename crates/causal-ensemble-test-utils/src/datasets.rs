//! Synthetic datasets with known structure.

use causal_ensemble_core::{Dataset, Edge, Graph, Node};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Name of the target variable in [`signal_and_noise_dataset`].
pub const TARGET: &str = "T";

/// A generated dataset together with its ground truth.
#[derive(Debug, Clone)]
pub struct SyntheticData {
    pub dataset: Dataset,
    pub target: Node,
    /// Variables that cause the target.
    pub signals: Vec<Node>,
    /// Variables independent of everything else.
    pub noise: Vec<Node>,
    /// Generating DAG: every signal points into the target.
    pub true_dag: Graph,
}

/// `A`, `B` and `noise` independent uniform(-1, 1) variables, plus
/// `T = A + B + 0.1 * e`. Deterministic for a given seed.
pub fn signal_and_noise_dataset(rows: usize, noise: usize, seed: u64) -> SyntheticData {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let signals = vec![Node::continuous("A"), Node::continuous("B")];
    let noise_nodes: Vec<Node> = (1..=noise).map(|i| Node::continuous(format!("N{}", i))).collect();
    let target = Node::continuous(TARGET);

    let mut names: Vec<String> = signals.iter().map(|n| n.name().to_string()).collect();
    names.extend(noise_nodes.iter().map(|n| n.name().to_string()));
    names.push(TARGET.to_string());

    let data: Vec<Vec<f64>> = (0..rows)
        .map(|_| {
            let a: f64 = rng.gen_range(-1.0..1.0);
            let b: f64 = rng.gen_range(-1.0..1.0);
            let mut row = vec![a, b];
            row.extend((0..noise).map(|_| rng.gen_range(-1.0..1.0)));
            let e: f64 = rng.gen_range(-1.0..1.0);
            row.push(a + b + 0.1 * e);
            row
        })
        .collect();

    let dataset = Dataset::continuous(names, data).expect("generated rows have uniform width");

    let mut true_dag = Graph::with_nodes(dataset.variables().iter().cloned());
    for signal in &signals {
        true_dag
            .add_edge(Edge::directed(signal.clone(), target.clone()))
            .expect("signal and target are distinct nodes of the DAG");
    }

    SyntheticData {
        dataset,
        target,
        signals,
        noise: noise_nodes,
        true_dag,
    }
}

/// `rows` x `cols` dataset where every value in row `r` equals `r`, so the
/// source row of any resampled row can be read back from its values.
pub fn indexed_dataset(rows: usize, cols: usize) -> Dataset {
    let names: Vec<String> = (0..cols).map(|c| format!("X{}", c)).collect();
    let data = (0..rows).map(|r| vec![r as f64; cols]).collect();
    Dataset::continuous(names, data).expect("indexed rows have uniform width")
}
