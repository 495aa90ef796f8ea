//! Self-contained units of work for the [`ParallelExecutor`](crate::ParallelExecutor).

use causal_ensemble_core::{CoreResult, Dataset, Graph, Knowledge, Parameters, SearchAlgorithm};

use crate::resample::{task_rng, Resampler};

/// One independent job. Everything a task needs is captured at
/// construction; `run` consumes it on a worker thread.
pub trait SearchTask: Send {
    type Output: Send;

    /// Short name used in logs and failure reports.
    fn label(&self) -> String;

    fn run(self) -> CoreResult<Self::Output>;
}

/// Resamples every source dataset, concatenates the draws and runs the
/// discovery algorithm on the result.
pub struct GraphSearchTask<'a> {
    index: usize,
    algorithm: &'a dyn SearchAlgorithm,
    sources: &'a [Dataset],
    sizes: &'a [usize],
    resampler: Resampler,
    seed: Option<u64>,
    parameters: &'a Parameters,
    knowledge: &'a Knowledge,
}

impl<'a> GraphSearchTask<'a> {
    /// `sizes[i]` rows are drawn from `sources[i]`; sources with a zero
    /// share are skipped.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        index: usize,
        algorithm: &'a dyn SearchAlgorithm,
        sources: &'a [Dataset],
        sizes: &'a [usize],
        resampler: Resampler,
        seed: Option<u64>,
        parameters: &'a Parameters,
        knowledge: &'a Knowledge,
    ) -> Self {
        Self {
            index,
            algorithm,
            sources,
            sizes,
            resampler,
            seed,
            parameters,
            knowledge,
        }
    }
}

impl SearchTask for GraphSearchTask<'_> {
    type Output = Graph;

    fn label(&self) -> String {
        format!("resample-{}", self.index)
    }

    fn run(self) -> CoreResult<Graph> {
        let mut rng = task_rng(self.seed, self.index);
        let mut draws = self
            .sources
            .iter()
            .zip(self.sizes)
            .filter(|(_, size)| **size > 0)
            .map(|(data, &size)| self.resampler.sample(data, size, &mut rng))
            .collect::<CoreResult<Vec<_>>>()?;

        let sample = if draws.len() == 1 {
            draws.swap_remove(0)
        } else {
            Dataset::concatenate(&draws)?
        };

        self.algorithm.search(&sample, self.parameters, self.knowledge)
    }
}
