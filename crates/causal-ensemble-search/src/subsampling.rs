//! Bootstrap / subsampling ensemble around an arbitrary discovery algorithm.
//!
//! With `number_subsampling == 0` the algorithm runs once on the
//! (concatenated) source data and its graph is returned untouched.
//! Otherwise each of the `number_subsampling` tasks resamples every source,
//! searches the draw, and the graphs are merged by the configured
//! [`EdgeEnsemble`] policy.

use std::sync::Arc;

use causal_ensemble_core::{
    CoreResult, Dataset, EdgeEnsemble, Graph, Knowledge, Parameters, SearchAlgorithm,
    SubsamplingConfig,
};
use tracing::{info, warn};

use crate::ensemble::{EdgeEnsembleCombiner, EdgeProbabilities};
use crate::executor::{BatchReport, CancellationToken, ParallelExecutor};
use crate::resample::{default_subsample_size, proportional_sizes, Resampler};
use crate::task::GraphSearchTask;

/// Result of [`SubsamplingSearch::search`].
#[derive(Debug, Clone)]
pub struct SubsamplingOutcome {
    pub graph: Graph,
    /// Edge-type frequencies. `None` for a direct search.
    pub probabilities: Option<EdgeProbabilities>,
    /// Policy used to merge. `None` for a direct search.
    pub ensemble: Option<EdgeEnsemble>,
    /// Batch counts and failures. `None` for a direct search.
    pub batch: Option<BatchReport>,
}

impl SubsamplingOutcome {
    pub fn is_ensemble(&self) -> bool {
        self.batch.is_some()
    }
}

pub struct SubsamplingSearch {
    algorithm: Arc<dyn SearchAlgorithm>,
    config: SubsamplingConfig,
    parameters: Parameters,
    knowledge: Knowledge,
    cancel: Option<CancellationToken>,
}

impl SubsamplingSearch {
    /// Default configuration: no ensembling.
    pub fn new(algorithm: Arc<dyn SearchAlgorithm>) -> Self {
        Self {
            algorithm,
            config: SubsamplingConfig::default(),
            parameters: Parameters::new(),
            knowledge: Knowledge::new(),
            cancel: None,
        }
    }

    /// Reads the harness settings from `parameters`, which are also passed
    /// through to every algorithm invocation.
    ///
    /// # Errors
    ///
    /// `ValidationError` if an option has the wrong type or an invalid value.
    pub fn with_parameters(mut self, parameters: Parameters) -> CoreResult<Self> {
        self.config = SubsamplingConfig::from_parameters(&parameters)?;
        self.parameters = parameters;
        Ok(self)
    }

    /// Replaces the harness settings, keeping the parameters.
    pub fn with_config(mut self, config: SubsamplingConfig) -> CoreResult<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// # Errors
    ///
    /// `ValidationError` if a required edge is also forbidden.
    pub fn with_knowledge(mut self, knowledge: Knowledge) -> CoreResult<Self> {
        knowledge.validate()?;
        self.knowledge = knowledge;
        Ok(self)
    }

    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn config(&self) -> &SubsamplingConfig {
        &self.config
    }

    /// Searches `datasets`, which must share the same variables.
    ///
    /// # Errors
    ///
    /// - `IncompatibleDatasets` for an empty slice or mismatched sources.
    /// - `InvalidSampleSize` if the configured draw size cannot be taken,
    ///   checked before any task runs.
    /// - `EmptyEnsemble` if every resampled search failed.
    /// - `Cancelled` if cancellation left no results.
    /// - Any error of the algorithm in direct mode.
    pub fn search(&self, datasets: &[Dataset]) -> CoreResult<SubsamplingOutcome> {
        if !self.config.is_ensemble() {
            let combined = Dataset::concatenate(datasets)?;
            info!(
                algorithm = %self.algorithm.description(),
                rows = combined.num_rows(),
                "Ensembling disabled, running a single direct search"
            );
            let graph = self.algorithm.search(&combined, &self.parameters, &self.knowledge)?;
            return Ok(SubsamplingOutcome {
                graph,
                probabilities: None,
                ensemble: None,
                batch: None,
            });
        }

        Dataset::check_compatible(datasets)?;
        let rows: Vec<usize> = datasets.iter().map(Dataset::num_rows).collect();
        let available: usize = rows.iter().sum();

        let resampler = Resampler::new(self.config.with_replacement);
        let size = self
            .config
            .subsample_size
            .unwrap_or_else(|| default_subsample_size(available, self.config.with_replacement));
        resampler.check_size(size, available)?;

        let sizes = proportional_sizes(&rows, size, self.config.with_replacement);

        info!(
            algorithm = %self.algorithm.description(),
            tasks = self.config.number_subsampling,
            size,
            with_replacement = self.config.with_replacement,
            ensemble = %self.config.ensemble,
            "Starting resampled search"
        );

        let tasks: Vec<GraphSearchTask<'_>> = (0..self.config.number_subsampling)
            .map(|index| {
                GraphSearchTask::new(
                    index,
                    self.algorithm.as_ref(),
                    datasets,
                    &sizes,
                    resampler,
                    self.config.seed,
                    &self.parameters,
                    &self.knowledge,
                )
            })
            .collect();

        let mut executor = ParallelExecutor::new(self.config.parallelism);
        if let Some(token) = &self.cancel {
            executor = executor.with_cancellation(token.clone());
        }
        let (graphs, batch) = executor.run_all(tasks)?.require_results()?;
        if !batch.is_complete() {
            warn!(
                completed = batch.completed,
                submitted = batch.submitted,
                failed = batch.failed(),
                cancelled = batch.cancelled,
                "Ensemble built from a partial batch"
            );
        }

        let summary = EdgeEnsembleCombiner::summarize(&graphs, self.config.ensemble)?;
        Ok(SubsamplingOutcome {
            graph: summary.graph,
            probabilities: Some(summary.probabilities),
            ensemble: Some(summary.policy),
            batch: Some(batch),
        })
    }
}
