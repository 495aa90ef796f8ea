//! Shared helpers for the search integration tests.

#![allow(dead_code)]

use causal_ensemble_core::logging::init_tracing;
use causal_ensemble_core::params::keys;
use causal_ensemble_core::{EdgeEnsemble, Graph, LoggingConfig, Parameters};

/// Installs the test subscriber once per binary; later calls are no-ops.
pub fn setup() {
    let _ = init_tracing(&LoggingConfig::default());
}

/// Seeded ensemble settings with four workers.
pub fn ensemble_params(tasks: usize, ensemble: EdgeEnsemble) -> Parameters {
    Parameters::new()
        .with(keys::NUMBER_SUB_SAMPLING, tasks)
        .with(keys::SUB_SAMPLING_ENSEMBLE, ensemble.code())
        .with(keys::PARALLELISM, 4)
        .with(keys::SEED, 2024)
}

/// Edges rendered as strings, in graph order.
pub fn edge_strings(graph: &Graph) -> Vec<String> {
    graph.edges().map(ToString::to_string).collect()
}
