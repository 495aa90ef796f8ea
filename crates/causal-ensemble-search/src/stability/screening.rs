//! Marginal plus iterated independence screening against a target.
//!
//! Pass one keeps every variable dependent on the target. Pass two adds
//! every variable dependent on something pass one kept. Both passes split
//! the variable list into fixed-size chunks, one task per chunk and anchor.
//! The per-task selections are merged sequentially afterwards.

use std::collections::BTreeSet;
use std::ops::Range;

use causal_ensemble_core::{CoreResult, Dataset, IndependenceTest, Node};
use tracing::{debug, info};

use crate::executor::{ParallelExecutor, TaskFailure};
use crate::task::SearchTask;

/// Tests `variables[range]` against `anchor`.
pub struct ScreeningTask<'a> {
    test: &'a dyn IndependenceTest,
    variables: &'a [Node],
    range: Range<usize>,
    anchor: Node,
}

impl SearchTask for ScreeningTask<'_> {
    type Output = Vec<Node>;

    fn label(&self) -> String {
        format!("screen-{}-{}..{}", self.anchor, self.range.start, self.range.end)
    }

    fn run(self) -> CoreResult<Vec<Node>> {
        let mut dependent = Vec::new();
        for node in &self.variables[self.range] {
            if *node != self.anchor && !self.test.is_independent(node, &self.anchor, &[])? {
                dependent.push(node.clone());
            }
        }
        Ok(dependent)
    }
}

/// Variables that survived screening.
#[derive(Debug, Clone)]
pub struct Screening {
    /// Screened dataset: the kept variables plus the target, in source
    /// column order.
    pub dataset: Dataset,
    /// Kept variables without the target.
    pub candidates: Vec<Node>,
    pub failures: Vec<TaskFailure>,
}

/// Runs both screening passes over `data` with `test`.
pub fn screen_variables(
    data: &Dataset,
    target: &Node,
    test: &dyn IndependenceTest,
    chunk: usize,
    executor: &ParallelExecutor,
) -> CoreResult<Screening> {
    let variables = data.variables();
    let mut failures = Vec::new();

    let direct = run_pass(variables, std::slice::from_ref(target), test, chunk, executor, &mut failures)?;
    debug!(target = %target, selected = direct.len(), "Marginal screening finished");

    let anchors: Vec<Node> = direct.iter().cloned().collect();
    let indirect = run_pass(variables, &anchors, test, chunk, executor, &mut failures)?;

    let kept: BTreeSet<Node> = direct.into_iter().chain(indirect).collect();
    let columns: Vec<Node> = variables
        .iter()
        .filter(|v| kept.contains(*v) || *v == target)
        .cloned()
        .collect();
    let candidates: Vec<Node> = columns.iter().filter(|v| *v != target).cloned().collect();

    info!(
        target = %target,
        variables = variables.len(),
        selected = candidates.len(),
        failed_chunks = failures.len(),
        "Screening finished"
    );

    Ok(Screening {
        dataset: data.subset_columns(&columns)?,
        candidates,
        failures,
    })
}

fn run_pass(
    variables: &[Node],
    anchors: &[Node],
    test: &dyn IndependenceTest,
    chunk: usize,
    executor: &ParallelExecutor,
    failures: &mut Vec<TaskFailure>,
) -> CoreResult<BTreeSet<Node>> {
    let chunk = chunk.max(1);
    let tasks: Vec<ScreeningTask<'_>> = anchors
        .iter()
        .flat_map(|anchor| {
            (0..variables.len()).step_by(chunk).map(move |from| ScreeningTask {
                test,
                variables,
                range: from..(from + chunk).min(variables.len()),
                anchor: anchor.clone(),
            })
        })
        .collect();

    let (selections, report) = executor.run_all(tasks)?.split();
    failures.extend(report.failures);
    Ok(selections.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use causal_ensemble_test_utils::{signal_and_noise_dataset, CorrelationTest};
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_screening_keeps_signals_and_target() {
        let synthetic = signal_and_noise_dataset(400, 8, 11);
        let test = CorrelationTest::new(&synthetic.dataset, 0.3).unwrap();
        let screening =
            screen_variables(&synthetic.dataset, &synthetic.target, &test, 3, &ParallelExecutor::new(4))
                .unwrap();

        let names: Vec<_> = screening.candidates.iter().map(Node::name).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert!(screening.dataset.contains(&synthetic.target));
        assert_eq!(screening.dataset.num_columns(), 3);
        assert!(screening.failures.is_empty());
        println!("[PASS] test_screening_keeps_signals_and_target");
    }

    #[test]
    fn test_iterated_pass_adds_indirect_variables() {
        // Chain X -> M -> T with corr(X, M) = corr(M, T) = 0.8, so
        // corr(X, T) = 0.64 stays below the 0.72 threshold. X is only
        // reachable through M.
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let rows: Vec<Vec<f64>> = (0..2000)
            .map(|_| {
                let x: f64 = rng.gen_range(-1.0..1.0);
                let m = x + 0.75 * rng.gen_range(-1.0..1.0);
                let t = m + 0.9375 * rng.gen_range(-1.0..1.0);
                vec![x, m, t]
            })
            .collect();
        let data = Dataset::continuous(vec!["X", "M", "T"], rows).unwrap();
        let target = Node::continuous("T");
        let test = CorrelationTest::new(&data, 0.72).unwrap();
        assert!(test.is_independent(&Node::continuous("X"), &target, &[]).unwrap());

        let screening = screen_variables(&data, &target, &test, 50, &ParallelExecutor::new(2)).unwrap();
        let names: Vec<_> = screening.candidates.iter().map(Node::name).collect();
        assert_eq!(names, vec!["X", "M"]);
    }
}
