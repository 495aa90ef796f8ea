//! CStaS: stability selection of the causes of a target variable.
//!
//! # Pipeline
//!
//! 1. Screen the variables against the target (see [`screening`](super::screening)).
//! 2. Draw `num_subsamples` subsamples of the screened data, without
//!    replacement. For each, build an independence test, search a pattern
//!    and rank the minimal effects on the target. One task per subsample.
//! 3. Search the neighbourhood size q (see [`threshold`](super::threshold)).
//! 4. Emit one [`Record`] per retained variable.
//!
//! Steps 2 and 4 only ever see immutable per-task rankings; every count and
//! average is computed after the parallel barrier.

use std::collections::BTreeSet;
use std::sync::Arc;

use causal_ensemble_core::{
    CoreError, CoreResult, Dataset, EffectEstimator, EffectRanking, Graph, IndependenceTestFactory,
    Node, PatternSearch, StabilityConfig, TestSettings, TestType,
};
use tracing::{info, warn};

use super::bounds::{er, pcer};
use super::record::{sort_records, Record};
use super::screening::screen_variables;
use super::threshold::{search_threshold, Selection};
use crate::executor::{BatchReport, CancellationToken, ParallelExecutor, TaskFailure};
use crate::resample::{task_rng, Resampler};
use crate::task::SearchTask;

// ============================================================================
// PER-SUBSAMPLE TASK
// ============================================================================

/// Subsample, pattern search and effect ranking for one draw.
pub struct EffectRankingTask<'a> {
    index: usize,
    data: &'a Dataset,
    size: usize,
    seed: Option<u64>,
    target: &'a Node,
    test_type: TestType,
    settings: TestSettings,
    factory: &'a dyn IndependenceTestFactory,
    pattern_search: &'a dyn PatternSearch,
    estimator: &'a dyn EffectEstimator,
}

impl SearchTask for EffectRankingTask<'_> {
    type Output = EffectRanking;

    fn label(&self) -> String {
        format!("subsample-{}", self.index)
    }

    fn run(self) -> CoreResult<EffectRanking> {
        let mut rng = task_rng(self.seed, self.index);
        let sample = Resampler::subsample().sample(self.data, self.size, &mut rng)?;
        let test = self.factory.build(self.test_type, &sample, &self.settings)?;
        let pattern = self.pattern_search.search(test.as_ref())?;
        self.estimator.estimate(&sample, &pattern, self.target)
    }
}

// ============================================================================
// REPORT
// ============================================================================

/// Result of [`StabilitySelector::select`].
#[derive(Debug, Clone)]
pub struct StabilityReport {
    pub target: Node,
    /// Retained variables, best first.
    pub records: Vec<Record>,
    /// Every non-target input variable evaluated at `best_q`, best first.
    /// Variables dropped by screening have `pi = 0` and infinite bounds.
    pub candidates: Vec<Record>,
    /// `None` when screening kept nothing.
    pub best_q: Option<usize>,
    /// Number of variables that passed screening (the `p` of the bounds).
    pub num_screened: usize,
    /// Subsample batch counts. `None` when screening kept nothing.
    pub subsamples: Option<BatchReport>,
    pub screening_failures: Vec<TaskFailure>,
}

impl StabilityReport {
    pub fn selected(&self) -> impl Iterator<Item = &Node> {
        self.records.iter().map(|r| &r.variable)
    }

    /// Successful subsamples the statistics are based on.
    pub fn completed_subsamples(&self) -> usize {
        self.subsamples.as_ref().map_or(0, |b| b.completed)
    }

    pub fn record_for(&self, name: &str) -> Option<&Record> {
        self.candidates.iter().find(|r| r.variable.name() == name)
    }
}

// ============================================================================
// SELECTOR
// ============================================================================

pub struct StabilitySelector {
    config: StabilityConfig,
    factory: Arc<dyn IndependenceTestFactory>,
    pattern_search: Arc<dyn PatternSearch>,
    estimator: Arc<dyn EffectEstimator>,
    true_graph: Option<Graph>,
    cancel: Option<CancellationToken>,
}

impl StabilitySelector {
    /// FAIL FAST: the configuration is validated and both test types are
    /// checked against `factory` before anything runs.
    ///
    /// # Errors
    ///
    /// - `ValidationError` for an invalid configuration.
    /// - `UnsupportedTestConfiguration` if `factory` cannot build the
    ///   search or screening test.
    pub fn new(
        config: StabilityConfig,
        factory: Arc<dyn IndependenceTestFactory>,
        pattern_search: Arc<dyn PatternSearch>,
        estimator: Arc<dyn EffectEstimator>,
    ) -> CoreResult<Self> {
        config.validate()?;
        factory.ensure_supported(config.test_type)?;
        factory.ensure_supported(config.screening_test)?;
        Ok(Self {
            config,
            factory,
            pattern_search,
            estimator,
            true_graph: None,
            cancel: None,
        })
    }

    /// Ground-truth DAG used only to flag true ancestors in the records.
    #[must_use]
    pub fn with_true_graph(mut self, graph: Graph) -> Self {
        self.true_graph = Some(graph);
        self
    }

    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn config(&self) -> &StabilityConfig {
        &self.config
    }

    fn executor(&self) -> ParallelExecutor {
        let executor = ParallelExecutor::new(self.config.parallelism);
        match &self.cancel {
            Some(token) => executor.with_cancellation(token.clone()),
            None => executor,
        }
    }

    /// Ranks the variables of `data` as causes of `target`.
    ///
    /// # Errors
    ///
    /// - `NodeNotFound` if `target` is not a variable of `data`.
    /// - `InvalidSampleSize` if the subsample size works out to zero rows.
    /// - `EmptyEnsemble` if every subsample task failed.
    /// - `Cancelled` if the token was cancelled during screening, or
    ///   cancellation left no subsample results.
    /// - `ValidationError` if the ground-truth graph is not a DAG.
    pub fn select(&self, data: &Dataset, target: &Node) -> CoreResult<StabilityReport> {
        let target = data
            .variable(target.name())
            .cloned()
            .ok_or_else(|| CoreError::NodeNotFound {
                name: target.name().to_string(),
            })?;
        let executor = self.executor();
        let settings = self.config.test_settings();

        info!(
            target = %target,
            variables = data.num_columns(),
            rows = data.num_rows(),
            subsamples = self.config.num_subsamples,
            "Starting stability selection"
        );

        let screening_test = self.factory.build(self.config.screening_test, data, &settings)?;
        let screening = screen_variables(
            data,
            &target,
            screening_test.as_ref(),
            self.config.screening_chunk,
            &executor,
        )?;
        if self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
            return Err(CoreError::Cancelled);
        }
        let candidates = screening.candidates;

        if candidates.is_empty() {
            warn!(target = %target, "Screening kept no variables, nothing to rank");
            return Ok(StabilityReport {
                candidates: self.evaluate(data, &target, &[], None, &[], &BTreeSet::new()),
                target,
                records: Vec::new(),
                best_q: None,
                num_screened: 0,
                subsamples: None,
                screening_failures: screening.failures,
            });
        }

        let screened = &screening.dataset;
        let rows = screened.num_rows();
        let size = (rows as f64 * self.config.subsample_fraction).floor() as usize;
        Resampler::subsample().check_size(size, rows)?;

        let tasks: Vec<EffectRankingTask<'_>> = (0..self.config.num_subsamples)
            .map(|index| EffectRankingTask {
                index,
                data: screened,
                size,
                seed: self.config.seed,
                target: &target,
                test_type: self.config.test_type,
                settings,
                factory: self.factory.as_ref(),
                pattern_search: self.pattern_search.as_ref(),
                estimator: self.estimator.as_ref(),
            })
            .collect();
        let (rankings, batch) = executor.run_all(tasks)?.require_results()?;
        if !batch.is_complete() {
            warn!(
                completed = batch.completed,
                submitted = batch.submitted,
                "Some subsamples produced no ranking; statistics use the rest"
            );
        }

        let selection = search_threshold(&rankings, &candidates, self.config.max_er);
        let ancestors = self.true_ancestors(screened, &target)?;
        let evaluated = self.evaluate(data, &target, &candidates, selection.as_ref(), &rankings, &ancestors);
        let records: Vec<Record> = evaluated
            .iter()
            .filter(|r| r.er <= self.config.max_er)
            .cloned()
            .collect();

        info!(
            target = %target,
            screened = candidates.len(),
            best_q = selection.as_ref().map(|s| s.q),
            selected = records.len(),
            completed = batch.completed,
            "Stability selection finished"
        );

        Ok(StabilityReport {
            target,
            records,
            candidates: evaluated,
            best_q: selection.map(|s| s.q),
            num_screened: candidates.len(),
            subsamples: Some(batch),
            screening_failures: screening.failures,
        })
    }

    /// One record per non-target variable of `data`, sorted.
    fn evaluate(
        &self,
        data: &Dataset,
        target: &Node,
        candidates: &[Node],
        selection: Option<&Selection>,
        rankings: &[EffectRanking],
        ancestors: &BTreeSet<String>,
    ) -> Vec<Record> {
        let p = candidates.len() as f64;
        let mut records: Vec<Record> = data
            .variables()
            .iter()
            .filter(|v| *v != target)
            .map(|v| {
                let pi = selection
                    .and_then(|s| s.pis.iter().find(|(n, _)| n == v))
                    .map_or(0.0, |(_, pi)| *pi);
                let (pcer, er) = match selection {
                    Some(s) if candidates.contains(v) => {
                        (pcer(pi, s.q as f64, p), er(pi, s.q as f64, p))
                    }
                    _ => (f64::INFINITY, f64::INFINITY),
                };
                Record {
                    variable: v.clone(),
                    pi,
                    effect: average_effect(rankings, v),
                    pcer,
                    er,
                    true_ancestor: ancestors.contains(v.name()),
                }
            })
            .collect();
        sort_records(&mut records);
        records
    }

    /// Names of the variables with a semi-directed path into the target in
    /// the pattern of the ground-truth DAG.
    fn true_ancestors(&self, screened: &Dataset, target: &Node) -> CoreResult<BTreeSet<String>> {
        let Some(dag) = &self.true_graph else {
            return Ok(BTreeSet::new());
        };

        let pattern = dag.replace_nodes(screened.variables()).pattern_for_dag()?;
        let Some(target) = pattern.node_named(target.name()).cloned() else {
            return Ok(BTreeSet::new());
        };
        let targets = BTreeSet::from([target]);
        Ok(pattern
            .nodes()
            .filter(|n| !targets.contains(*n) && pattern.exists_semi_directed_path(n, &targets))
            .map(|n| n.name().to_string())
            .collect())
    }
}

/// Mean effect over all rankings, counting 0 where the variable is absent.
fn average_effect(rankings: &[EffectRanking], node: &Node) -> f64 {
    if rankings.is_empty() {
        return 0.0;
    }
    let sum: f64 = rankings.iter().map(|r| r.effect_of(node).unwrap_or(0.0)).sum();
    sum / rankings.len() as f64
}
