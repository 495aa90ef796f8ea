//! End-to-end runs of the bootstrap / subsampling harness.

mod common;

use std::sync::Arc;

use causal_ensemble_core::params::keys;
use causal_ensemble_core::{
    CoreError, Dataset, Edge, EdgeEnsemble, Graph, Knowledge, Node, Parameters, SearchAlgorithm,
};
use causal_ensemble_search::{CancellationToken, SubsamplingSearch};
use causal_ensemble_test_utils::{
    signal_and_noise_dataset, CorrelationSkeletonSearch, FailingAlgorithm, FixedGraphAlgorithm,
    FlakyAlgorithm, PanickingAlgorithm,
};

use common::{edge_strings, ensemble_params, setup};

fn skeleton() -> Arc<dyn SearchAlgorithm> {
    Arc::new(CorrelationSkeletonSearch::new(0.3))
}

// ============================================================================
// DIRECT (PASS-THROUGH) MODE
// ============================================================================

#[test]
fn test_zero_subsamples_returns_direct_result() {
    setup();
    let synthetic = signal_and_noise_dataset(200, 3, 1);

    // A graph no resample could produce proves the result is untouched.
    let (x, y) = (Node::continuous("x"), Node::continuous("y"));
    let fixed = Graph::from_edges([x.clone(), y.clone()], [Edge::bidirected(x, y)]).unwrap();

    let harness = SubsamplingSearch::new(Arc::new(FixedGraphAlgorithm { graph: fixed.clone() }))
        .with_parameters(Parameters::new().with(keys::NUMBER_SUB_SAMPLING, 0))
        .unwrap();
    let outcome = harness.search(&[synthetic.dataset.clone()]).unwrap();

    assert!(!outcome.is_ensemble());
    assert_eq!(outcome.graph, fixed);
    assert!(outcome.probabilities.is_none());

    let direct = CorrelationSkeletonSearch::new(0.3)
        .search(&synthetic.dataset, &Parameters::new(), &Knowledge::new())
        .unwrap();
    let passthrough = SubsamplingSearch::new(skeleton()).search(&[synthetic.dataset]).unwrap();
    assert_eq!(passthrough.graph, direct);
    println!("[PASS] test_zero_subsamples_returns_direct_result");
}

#[test]
fn test_direct_mode_propagates_algorithm_error() {
    let synthetic = signal_and_noise_dataset(20, 0, 1);
    let result = SubsamplingSearch::new(Arc::new(FailingAlgorithm)).search(&[synthetic.dataset]);
    assert!(matches!(result, Err(CoreError::TaskExecution { .. })));
}

// ============================================================================
// ENSEMBLE MODE
// ============================================================================

#[test]
fn test_majority_ensemble_recovers_signals() {
    setup();
    let synthetic = signal_and_noise_dataset(400, 4, 8);
    let harness = SubsamplingSearch::new(skeleton())
        .with_parameters(ensemble_params(12, EdgeEnsemble::Majority))
        .unwrap();

    let outcome = harness.search(&[synthetic.dataset.clone()]).unwrap();
    let batch = outcome.batch.as_ref().unwrap();
    assert_eq!(batch.submitted, 12);
    assert!(batch.is_complete());
    assert_eq!(outcome.ensemble, Some(EdgeEnsemble::Majority));

    assert_eq!(edge_strings(&outcome.graph), vec!["A --> T", "B --> T"]);
    assert_eq!(outcome.graph.num_nodes(), 7);

    let probabilities = outcome.probabilities.as_ref().unwrap();
    let a_t = Edge::directed(Node::continuous("A"), synthetic.target.clone());
    assert_eq!(probabilities.probability_of(&a_t), 1.0);
    println!("[PASS] test_majority_ensemble_recovers_signals");
}

#[test]
fn test_seeded_ensembles_are_reproducible() {
    let synthetic = signal_and_noise_dataset(150, 6, 4);
    let run = || {
        SubsamplingSearch::new(Arc::new(CorrelationSkeletonSearch::new(0.15)))
            .with_parameters(ensemble_params(8, EdgeEnsemble::Highest))
            .unwrap()
            .search(&[synthetic.dataset.clone()])
            .unwrap()
    };
    let (first, second) = (run(), run());
    assert_eq!(first.graph, second.graph);
    assert_eq!(first.probabilities, second.probabilities);
}

#[test]
fn test_bootstrap_with_explicit_size() {
    let synthetic = signal_and_noise_dataset(100, 2, 6);
    let params = ensemble_params(5, EdgeEnsemble::Highest)
        .with(keys::SUB_SAMPLING_WITH_REPLACEMENT, true)
        .with(keys::SUB_SAMPLE_SIZE, 250);
    let outcome = SubsamplingSearch::new(skeleton())
        .with_parameters(params)
        .unwrap()
        .search(&[synthetic.dataset])
        .unwrap();
    assert_eq!(outcome.batch.unwrap().completed, 5);
}

#[test]
fn test_oversized_subsample_fails_before_running() {
    let synthetic = signal_and_noise_dataset(100, 2, 6);
    let params = ensemble_params(5, EdgeEnsemble::Highest).with(keys::SUB_SAMPLE_SIZE, 101);
    let result = SubsamplingSearch::new(Arc::new(PanickingAlgorithm))
        .with_parameters(params)
        .unwrap()
        .search(&[synthetic.dataset]);
    assert!(matches!(
        result,
        Err(CoreError::InvalidSampleSize { requested: 101, available: 100, with_replacement: false })
    ));
}

// ============================================================================
// FAILURE ISOLATION
// ============================================================================

#[test]
fn test_every_task_failing_is_empty_ensemble() {
    setup();
    let synthetic = signal_and_noise_dataset(50, 1, 3);

    let algorithms: Vec<Arc<dyn SearchAlgorithm>> =
        vec![Arc::new(FailingAlgorithm), Arc::new(PanickingAlgorithm)];
    for algorithm in algorithms {
        let result = SubsamplingSearch::new(algorithm)
            .with_parameters(ensemble_params(4, EdgeEnsemble::Highest))
            .unwrap()
            .search(&[synthetic.dataset.clone()]);
        assert!(matches!(
            result,
            Err(CoreError::EmptyEnsemble { submitted: 4, failed: 4 })
        ));
    }
    println!("[PASS] test_every_task_failing_is_empty_ensemble");
}

#[test]
fn test_partial_failures_are_reported() {
    let synthetic = signal_and_noise_dataset(300, 2, 10);
    let flaky = FlakyAlgorithm::new(CorrelationSkeletonSearch::new(0.3), 3);
    let outcome = SubsamplingSearch::new(Arc::new(flaky))
        .with_parameters(ensemble_params(9, EdgeEnsemble::Majority))
        .unwrap()
        .search(&[synthetic.dataset])
        .unwrap();

    let batch = outcome.batch.unwrap();
    assert_eq!(batch.submitted, 9);
    assert_eq!(batch.completed, 6);
    assert_eq!(batch.failed(), 3);
    assert!(batch.failures.iter().all(|f| !f.panicked && f.cause.contains("flaky")));
    assert_eq!(outcome.probabilities.unwrap().num_graphs(), 6);
    assert_eq!(edge_strings(&outcome.graph), vec!["A --> T", "B --> T"]);
}

#[test]
fn test_cancelled_batch() {
    let synthetic = signal_and_noise_dataset(50, 1, 3);
    let token = CancellationToken::new();
    token.cancel();
    let result = SubsamplingSearch::new(skeleton())
        .with_parameters(ensemble_params(4, EdgeEnsemble::Highest))
        .unwrap()
        .with_cancellation(token)
        .search(&[synthetic.dataset]);
    assert!(matches!(result, Err(CoreError::Cancelled)));
}

// ============================================================================
// MULTIPLE DATASETS AND KNOWLEDGE
// ============================================================================

#[test]
fn test_multiple_datasets_are_resampled_together() {
    let synthetic = signal_and_noise_dataset(400, 2, 21);
    let first: Vec<usize> = (0..150).collect();
    let second: Vec<usize> = (150..400).collect();
    let parts = [
        synthetic.dataset.select_rows(&first).unwrap(),
        synthetic.dataset.select_rows(&second).unwrap(),
    ];

    let outcome = SubsamplingSearch::new(skeleton())
        .with_parameters(ensemble_params(6, EdgeEnsemble::Majority))
        .unwrap()
        .search(&parts)
        .unwrap();
    assert_eq!(edge_strings(&outcome.graph), vec!["A --> T", "B --> T"]);

    let other = Dataset::continuous(vec!["P", "Q"], vec![vec![0.0, 1.0]]).unwrap();
    let mismatched = SubsamplingSearch::new(skeleton()).search(&[parts[0].clone(), other.clone()]);
    assert!(matches!(mismatched, Err(CoreError::IncompatibleDatasets(_))));

    assert!(matches!(
        SubsamplingSearch::new(skeleton()).search(&[]),
        Err(CoreError::IncompatibleDatasets(_))
    ));

    // Resampled mode validates the sources without concatenating them.
    let resampled = SubsamplingSearch::new(skeleton())
        .with_parameters(ensemble_params(4, EdgeEnsemble::Highest))
        .unwrap();
    assert!(matches!(
        resampled.search(&[parts[0].clone(), other]),
        Err(CoreError::IncompatibleDatasets(_))
    ));
    assert!(matches!(resampled.search(&[]), Err(CoreError::IncompatibleDatasets(_))));
    println!("[PASS] test_multiple_datasets_are_resampled_together");
}

#[test]
fn test_knowledge_reaches_every_search() {
    let synthetic = signal_and_noise_dataset(300, 1, 13);
    let outcome = SubsamplingSearch::new(skeleton())
        .with_parameters(ensemble_params(6, EdgeEnsemble::Preserved))
        .unwrap()
        .with_knowledge(Knowledge::new().forbid("A", "T"))
        .unwrap()
        .search(&[synthetic.dataset])
        .unwrap();
    assert_eq!(edge_strings(&outcome.graph), vec!["A <-- T", "B --> T"]);

    let contradictory = SubsamplingSearch::new(skeleton())
        .with_knowledge(Knowledge::new().forbid("A", "T").require("A", "T"));
    assert!(matches!(contradictory, Err(CoreError::ValidationError { .. })));
}
